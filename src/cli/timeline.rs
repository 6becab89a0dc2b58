//! Timeline command - monthly volume of the most common descriptions

use super::Session;
use crate::dataset::{Column, Dataset};
use crate::models::{NamedSeries, Report, TimelineReport};
use crate::stats::MonthlyPivot;
use anyhow::{Context, Result};
use tracing::info;

pub(crate) fn run(session: &Session, top: usize, series: &[String]) -> Result<()> {
    let (dataset, _, _) = session.load()?;
    let pivot = description_pivot(&dataset)?;

    let names = if series.is_empty() {
        pivot.top_categories(top)
    } else {
        series.to_vec()
    };
    let selected = pivot
        .select(&names)
        .context("Unknown description in --series")?;
    info!(
        "Charting {} descriptions over {} months",
        selected.len(),
        pivot.months().len()
    );

    let (months, totals): (Vec<String>, Vec<usize>) = pivot
        .totals()
        .into_iter()
        .map(|(month, n)| (month.to_string(), n))
        .unzip();

    session.emit(&Report::Timeline(TimelineReport {
        months,
        series: selected
            .into_iter()
            .map(|(name, counts)| NamedSeries { name, counts })
            .collect(),
        totals,
    }))
}

/// Month x description counts for the whole dataset.
pub(crate) fn description_pivot(dataset: &Dataset) -> Result<MonthlyPivot> {
    let pivot = MonthlyPivot::build(&dataset.dates(), &dataset.column(Column::Description))?;
    Ok(pivot)
}
