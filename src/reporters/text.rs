//! Text (terminal) reporter with colors and formatting

use super::truncate;
use crate::models::{
    CorrelationReport, GTestReport, Report, SummaryReport, TimelineReport,
};
use anyhow::Result;
use console::style;

const RULE: &str = "──────────────────────────────────────";
/// Width of category labels in tables
const LABEL_WIDTH: usize = 28;
/// Width of matrix / pivot cells
const CELL_WIDTH: usize = 12;

/// Render report as formatted terminal output
pub fn render(report: &Report) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", style(report.title()).bold()));
    out.push_str(&format!("{}\n", style(RULE).dim()));

    match report {
        Report::Summary(r) => render_summary(&mut out, r),
        Report::GTest(r) => render_gtest(&mut out, r),
        Report::Timeline(r) => render_timeline(&mut out, r),
        Report::Correlation(r) => render_correlation(&mut out, r),
    }
    Ok(out)
}

fn render_summary(out: &mut String, r: &SummaryReport) {
    out.push_str(&format!(
        "Source: {}  Rows: {}  (read {}, malformed {})\n\n",
        style(&r.source).cyan(),
        style(r.rows).bold(),
        r.ingest.accepted,
        r.ingest.malformed
    ));

    let c = &r.cleaning;
    out.push_str(&format!("{}\n", style("CLEANING").bold()));
    out.push_str(&format!("  input rows          {:>8}\n", c.input_rows));
    out.push_str(&format!("  missing fields      {:>8}\n", c.dropped_missing));
    out.push_str(&format!("  placeholder values  {:>8}\n", c.dropped_placeholder));
    out.push_str(&format!("  unparsable dates    {:>8}\n", c.dropped_bad_date));
    out.push_str(&format!("  domain fallbacks    {:>8}\n", c.domain_fallbacks));
    out.push_str(&format!("  kept                {:>8}\n\n", c.output_rows));

    let shrunk: Vec<String> = c
        .normalized_uniques
        .iter()
        .filter(|d| d.after < d.before)
        .map(|d| format!("{} {}→{}", d.column, d.before, d.after))
        .collect();
    if !shrunk.is_empty() {
        out.push_str(&format!(
            "  {}\n\n",
            style(format!("normalization merged values: {}", shrunk.join(", "))).dim()
        ));
    }

    out.push_str(&format!("{}\n", style("COLUMNS").bold()));
    out.push_str(&format!(
        "{}\n",
        style(format!(
            "  {:<12} {:>8} {:>8}  {:<30} {:>6}",
            "COLUMN", "COUNT", "UNIQUE", "TOP", "FREQ"
        ))
        .dim()
    ));
    for col in &r.columns {
        let s = &col.summary;
        out.push_str(&format!(
            "  {:<12} {:>8} {:>8}  {:<30} {:>6}\n",
            col.column.name(),
            s.count,
            s.unique,
            truncate(s.top.as_deref().unwrap_or("-"), 30),
            s.freq
        ));
    }
    out.push('\n');

    if !r.top_descriptions.is_empty() {
        out.push_str(&format!("{}\n", style("TOP DESCRIPTIONS").bold()));
        for (name, n) in &r.top_descriptions {
            out.push_str(&format!(
                "  {:<width$} {:>8}\n",
                truncate(name, LABEL_WIDTH),
                n,
                width = LABEL_WIDTH
            ));
        }
        out.push('\n');
    }

    if !r.numeric.is_empty() {
        out.push_str(&format!("{}\n", style("NUMERIC COLUMNS").bold()));
        for col in &r.numeric {
            let s = &col.summary;
            out.push_str(&format!(
                "  {:<12} mean={:.3} std={:.3} min={} p50={} max={} n={}\n",
                col.column.name(),
                s.mean,
                s.std,
                s.min,
                s.p50,
                s.max,
                s.count
            ));
        }
        out.push('\n');
    }

    if !r.redundant_columns.is_empty() {
        out.push_str(&format!("{}\n", style("DUPLICATED COLUMNS").bold()));
        for p in &r.redundant_columns {
            out.push_str(&format!(
                "  {} {} and {} (r = {:.4})\n",
                style("!").yellow(),
                style(&p.a).cyan(),
                style(&p.b).cyan(),
                p.r
            ));
        }
        out.push('\n');
    }
}

fn render_gtest(out: &mut String, r: &GTestReport) {
    let ranking = &r.ranking;
    let mode = if r.options.reverse {
        "least associated"
    } else {
        "most associated"
    };
    out.push_str(&format!(
        "{} vs {}: {} ({} rows, {} × {} categories)\n",
        style(r.row_column).cyan(),
        style(r.col_column).cyan(),
        mode,
        ranking.total_records,
        ranking.row_categories,
        ranking.column_categories
    ));
    if r.options.min_volume > 0 {
        out.push_str(&format!("Minimum volume: {}\n", r.options.min_volume));
    }
    if !r.filters.is_empty() {
        out.push_str(&format!("Filters: {}\n", r.filters.join(" AND ")));
    }
    out.push('\n');

    if ranking.ranked.is_empty() {
        out.push_str(&format!(
            "{}\n",
            style("No categories met the volume threshold.").dim()
        ));
        return;
    }

    out.push_str(&format!(
        "{}\n",
        style(format!(
            "  {:>3}  {:<width$} {:>10} {:>10} {:>8}",
            "#",
            "CATEGORY",
            "G",
            "P-VALUE",
            "TOTAL",
            width = LABEL_WIDTH
        ))
        .dim()
    ));
    for (i, row) in ranking.ranked.iter().enumerate() {
        out.push_str(&format!(
            "  {:>3}  {:<width$} {:>10.2} {:>10.2e} {:>8}\n",
            i + 1,
            truncate(&row.category, LABEL_WIDTH),
            row.score,
            row.p_value,
            row.total,
            width = LABEL_WIDTH
        ));
    }
    out.push('\n');

    let grid = &ranking.reduced;
    out.push_str(&format!(
        "{} (top {} {} values)\n",
        style("OCCURRENCES").bold(),
        grid.columns.len(),
        r.col_column
    ));
    out.push_str(&format!("  {:<width$}", "", width = LABEL_WIDTH));
    for col in &grid.columns {
        out.push_str(&format!(
            " {:>width$}",
            truncate(col, CELL_WIDTH),
            width = CELL_WIDTH
        ));
    }
    out.push('\n');
    for (row, counts) in grid.rows.iter().zip(&grid.counts) {
        out.push_str(&format!(
            "  {:<width$}",
            truncate(row, LABEL_WIDTH),
            width = LABEL_WIDTH
        ));
        for n in counts {
            let cell = format!("{:>width$}", n, width = CELL_WIDTH);
            if *n == 0 {
                out.push_str(&format!(" {}", style(cell).dim()));
            } else {
                out.push_str(&format!(" {}", cell));
            }
        }
        out.push('\n');
    }

    let omitted = ranking.full.columns.len().saturating_sub(grid.columns.len());
    if omitted > 0 {
        out.push_str(&format!(
            "\n  {}\n",
            style(format!("...and {} more {} values (raise --matches)", omitted, r.col_column)).dim()
        ));
    }
    out.push_str(&format!(
        "\n  {} records matched the selected categories\n",
        ranking.match_count
    ));
}

fn render_timeline(out: &mut String, r: &TimelineReport) {
    if r.months.is_empty() {
        out.push_str("No dated records.\n");
        return;
    }

    out.push_str(&format!("  {:<8}", "MONTH"));
    for s in &r.series {
        out.push_str(&format!(
            " {:>width$}",
            truncate(&s.name, CELL_WIDTH),
            width = CELL_WIDTH
        ));
    }
    out.push_str(&format!(" {:>8}\n", "TOTAL"));

    for (i, month) in r.months.iter().enumerate() {
        out.push_str(&format!("  {:<8}", month));
        for s in &r.series {
            out.push_str(&format!(" {:>width$}", s.counts[i], width = CELL_WIDTH));
        }
        out.push_str(&format!(" {:>8}\n", style(r.totals[i]).bold()));
    }

    let grand: usize = r.totals.iter().sum();
    out.push_str(&format!(
        "\n  {} months, {} records\n",
        r.months.len(),
        grand
    ));
}

fn render_correlation(out: &mut String, r: &CorrelationReport) {
    out.push_str(&format!(
        "Pearson r of monthly volume over {} months\n\n",
        r.months
    ));

    let m = &r.matrix;
    out.push_str(&format!("  {:<width$}", "", width = LABEL_WIDTH));
    for i in 0..m.names.len() {
        out.push_str(&format!(" {:>6}", format!("[{}]", i + 1)));
    }
    out.push('\n');
    for (i, name) in m.names.iter().enumerate() {
        out.push_str(&format!(
            "  {:<width$}",
            truncate(&format!("[{}] {}", i + 1, name), LABEL_WIDTH),
            width = LABEL_WIDTH
        ));
        for value in &m.values[i] {
            let cell = match value {
                Some(v) => format!("{:>6.2}", v),
                None => format!("{:>6}", "n/a"),
            };
            let styled = match value {
                Some(v) if v.abs() >= 0.8 => style(cell).red().to_string(),
                Some(_) => cell,
                None => style(cell).dim().to_string(),
            };
            out.push_str(&format!(" {}", styled));
        }
        out.push('\n');
    }

    if !r.strongest.is_empty() {
        out.push_str(&format!("\n{}\n", style("STRONGEST PAIRS").bold()));
        for p in &r.strongest {
            out.push_str(&format!("  {:>6.3}  {} / {}\n", p.r, p.a, p.b));
        }
    }
}
