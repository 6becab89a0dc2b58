//! Markdown reporter
//!
//! GitHub-flavored tables, suitable for pasting into an issue or a notebook.

use crate::models::{CorrelationReport, GTestReport, Report, SummaryReport, TimelineReport};
use anyhow::Result;
use std::fmt::Write;

/// Render report as Markdown
pub fn render(report: &Report) -> Result<String> {
    let mut md = String::new();
    writeln!(md, "# {}\n", report.title())?;

    match report {
        Report::Summary(r) => render_summary(&mut md, r)?,
        Report::GTest(r) => render_gtest(&mut md, r)?,
        Report::Timeline(r) => render_timeline(&mut md, r)?,
        Report::Correlation(r) => render_correlation(&mut md, r)?,
    }
    Ok(md)
}

/// Escape characters that would break a table cell
fn cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn table_header(md: &mut String, headers: &[String], numeric_from: usize) -> std::fmt::Result {
    writeln!(md, "| {} |", headers.join(" | "))?;
    let aligns: Vec<&str> = (0..headers.len())
        .map(|i| if i >= numeric_from { "---:" } else { "---" })
        .collect();
    writeln!(md, "|{}|", aligns.join("|"))
}

fn render_summary(md: &mut String, r: &SummaryReport) -> std::fmt::Result {
    writeln!(md, "**Source:** `{}`  ", r.source)?;
    writeln!(
        md,
        "**Rows:** {} clean of {} read ({} malformed lines skipped)\n",
        r.rows, r.ingest.accepted, r.ingest.malformed
    )?;

    let c = &r.cleaning;
    writeln!(md, "## Cleaning\n")?;
    writeln!(md, "| Step | Rows |")?;
    writeln!(md, "|---|---:|")?;
    writeln!(md, "| Input | {} |", c.input_rows)?;
    writeln!(md, "| Dropped: missing field | {} |", c.dropped_missing)?;
    writeln!(md, "| Dropped: placeholder | {} |", c.dropped_placeholder)?;
    writeln!(md, "| Dropped: bad date | {} |", c.dropped_bad_date)?;
    writeln!(md, "| Domain fallbacks | {} |", c.domain_fallbacks)?;
    writeln!(md, "| Output | {} |\n", c.output_rows)?;

    writeln!(md, "## Columns\n")?;
    writeln!(md, "| Column | Count | Unique | Top | Freq |")?;
    writeln!(md, "|---|---:|---:|---|---:|")?;
    for col in &r.columns {
        let s = &col.summary;
        writeln!(
            md,
            "| {} | {} | {} | {} | {} |",
            col.column,
            s.count,
            s.unique,
            cell(s.top.as_deref().unwrap_or("")),
            s.freq
        )?;
    }
    md.push('\n');

    if !r.top_descriptions.is_empty() {
        writeln!(md, "## Top Descriptions\n")?;
        writeln!(md, "| Description | Records |")?;
        writeln!(md, "|---|---:|")?;
        for (name, n) in &r.top_descriptions {
            writeln!(md, "| {} | {} |", cell(name), n)?;
        }
        md.push('\n');
    }

    if !r.numeric.is_empty() {
        writeln!(md, "## Numeric Columns\n")?;
        writeln!(md, "| Column | Mean | Std | Min | 25% | 50% | 75% | Max |")?;
        writeln!(md, "|---|---:|---:|---:|---:|---:|---:|---:|")?;
        for col in &r.numeric {
            let s = &col.summary;
            writeln!(
                md,
                "| {} | {:.3} | {:.3} | {} | {} | {} | {} | {} |",
                col.column, s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.max
            )?;
        }
        md.push('\n');
    }

    if !r.redundant_columns.is_empty() {
        writeln!(md, "## Duplicated Columns\n")?;
        for p in &r.redundant_columns {
            writeln!(md, "- `{}` and `{}` (r = {:.4})", p.a, p.b, p.r)?;
        }
        md.push('\n');
    }
    Ok(())
}

fn render_gtest(md: &mut String, r: &GTestReport) -> std::fmt::Result {
    let ranking = &r.ranking;
    writeln!(
        md,
        "**{}** vs **{}**, {} rows, {} × {} categories  ",
        r.row_column,
        r.col_column,
        ranking.total_records,
        ranking.row_categories,
        ranking.column_categories
    )?;
    writeln!(
        md,
        "**Mode:** {}{}  ",
        if r.options.reverse { "least associated" } else { "most associated" },
        if r.options.min_volume > 0 {
            format!(", minimum volume {}", r.options.min_volume)
        } else {
            String::new()
        }
    )?;
    if !r.filters.is_empty() {
        let quoted: Vec<String> = r.filters.iter().map(|f| format!("`{}`", f)).collect();
        writeln!(md, "**Filters:** {}  ", quoted.join(", "))?;
    }
    md.push('\n');

    if ranking.ranked.is_empty() {
        writeln!(md, "_No categories met the volume threshold._")?;
        return Ok(());
    }

    writeln!(md, "## Ranking\n")?;
    writeln!(md, "| # | {} | G | p-value | Records |", r.row_column)?;
    writeln!(md, "|---:|---|---:|---:|---:|")?;
    for (i, row) in ranking.ranked.iter().enumerate() {
        writeln!(
            md,
            "| {} | {} | {:.2} | {:.2e} | {} |",
            i + 1,
            cell(&row.category),
            row.score,
            row.p_value,
            row.total
        )?;
    }
    md.push('\n');

    writeln!(md, "## Occurrences\n")?;
    let grid = &ranking.reduced;
    let mut headers = vec![r.row_column.to_string()];
    headers.extend(grid.columns.iter().map(|c| cell(c)));
    table_header(md, &headers, 1)?;
    for (row, counts) in grid.rows.iter().zip(&grid.counts) {
        let values: Vec<String> = counts.iter().map(|n| n.to_string()).collect();
        writeln!(md, "| {} | {} |", cell(row), values.join(" | "))?;
    }
    writeln!(
        md,
        "\n{} records matched the selected categories.",
        ranking.match_count
    )
}

fn render_timeline(md: &mut String, r: &TimelineReport) -> std::fmt::Result {
    if r.months.is_empty() {
        return writeln!(md, "_No dated records._");
    }

    let mut headers = vec!["Month".to_string()];
    headers.extend(r.series.iter().map(|s| cell(&s.name)));
    headers.push("Total".to_string());
    table_header(md, &headers, 1)?;

    for (i, month) in r.months.iter().enumerate() {
        let mut row = vec![month.clone()];
        row.extend(r.series.iter().map(|s| s.counts[i].to_string()));
        row.push(r.totals[i].to_string());
        writeln!(md, "| {} |", row.join(" | "))?;
    }
    Ok(())
}

fn render_correlation(md: &mut String, r: &CorrelationReport) -> std::fmt::Result {
    writeln!(md, "Pearson r of monthly volume over {} months.\n", r.months)?;

    let m = &r.matrix;
    let mut headers = vec![String::new()];
    headers.extend(m.names.iter().map(|n| cell(n)));
    table_header(md, &headers, 1)?;
    for (name, values) in m.names.iter().zip(&m.values) {
        let cells: Vec<String> = values
            .iter()
            .map(|v| v.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "n/a".into()))
            .collect();
        writeln!(md, "| **{}** | {} |", cell(name), cells.join(" | "))?;
    }

    if !r.strongest.is_empty() {
        writeln!(md, "\n## Strongest Pairs\n")?;
        writeln!(md, "| A | B | r |")?;
        writeln!(md, "|---|---|---:|")?;
        for p in &r.strongest {
            writeln!(md, "| {} | {} | {:.3} |", cell(&p.a), cell(&p.b), p.r)?;
        }
    }
    Ok(())
}
