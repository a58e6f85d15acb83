use crate::detail::EntityDetail;
use crate::model::{AnalysisMode, MONTH_LABELS};
use crate::statistics::HistoricalStatistics;
use crate::styling::{StyleMap, StyleTag};
use crate::table::{COMPANY_COLUMN, Table, TableRow};
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use std::path::Path;

const COMPACT_ROW_LIMIT: usize = 10;
const NAME_WIDTH: usize = 22;
const AVERAGE_WIDTH: usize = 12;
const CELL_WIDTH: usize = 9;
const VALUE_WIDTH: usize = 10;

pub struct SummaryPaths<'a> {
    pub csv: Option<&'a Path>,
    pub html: Option<&'a Path>,
}

pub struct SummaryContext<'a> {
    pub run_started_at: &'a DateTime<Local>,
    pub input: &'a Path,
    pub table: &'a Table,
    pub styles: &'a StyleMap,
    pub statistics: Option<&'a HistoricalStatistics>,
    pub paths: SummaryPaths<'a>,
    pub detail: Option<&'a EntityDetail>,
    pub full_output: bool,
}

pub fn print_summary(context: &SummaryContext<'_>) {
    println!();
    print_summary_header(context);
    print_summary_paths(&context.paths);
    println!();
    println!("{}", "Historical Variability".bold().bright_magenta());
    let table_width = print_variability_table(context.table, context.styles, context.full_output);
    if let Some(detail) = context.detail {
        println!();
        print_entity_detail(detail);
    }
    if table_width > 0 {
        let divider = "=".repeat(table_width);
        println!("{}", divider.bright_cyan());
    }
}

fn print_summary_header(context: &SummaryContext<'_>) {
    let mode = context.table.mode;
    println!(
        "{}",
        "================ Historical Variability Analyzer ================"
            .bold()
            .bright_cyan()
    );
    println!(
        "{} {}",
        "Run started".bright_yellow().bold(),
        context
            .run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white()
    );
    println!(
        "{} {}",
        "Input".bright_yellow().bold(),
        format!("{}", context.input.display()).bright_white()
    );
    let overall = context.statistics.map_or_else(
        || "-".to_string(),
        |stats| stats.overall_average_label(mode),
    );
    println!(
        "{} {} | {} | {} | {}",
        "Analysis".bright_yellow().bold(),
        format!("Mode: {}", mode.label()).bright_white(),
        format!("Companies: {}", context.table.rows.len()).bright_white(),
        format!("Overall average: {overall}").bright_white(),
        "Period: 12 months".bright_white()
    );
    if let Some(stats) = context.statistics {
        println!(
            "{} {}",
            "Total variability".bright_yellow().bold(),
            format!("{:.2} {}", stats.total_variability, unit_hint(mode)).bright_white()
        );
    }
}

const fn unit_hint(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Percentage => "pp",
        AnalysisMode::Absolute => "calls",
    }
}

fn print_summary_paths(paths: &SummaryPaths<'_>) {
    print_path_line("Variability CSV", paths.csv, "not saved (use --save-csv)");
    print_path_line("HTML Report", paths.html, "not saved (use --save-html)");
}

fn print_path_line(label: &str, path: Option<&Path>, hint: &str) {
    let label_colored = label.bright_yellow().bold();
    match path {
        Some(path) => println!(
            "{} {}",
            label_colored,
            format!("{}", path.display()).bright_white()
        ),
        None => println!("{} {}", label_colored, hint.bright_black()),
    }
}

fn print_variability_table(table: &Table, styles: &StyleMap, full_output: bool) -> usize {
    if table.is_empty() {
        let message = "No company data available.";
        println!("{}", message.bright_black());
        return message.len();
    }

    if full_output {
        print_full_table(table, styles)
    } else {
        print_compact_table(table, styles)
    }
}

/// Company, average and every month's value and deviation.
fn print_full_table(table: &Table, styles: &StyleMap) -> usize {
    let mut header = format!(
        "{:<NAME_WIDTH$} | {:>AVERAGE_WIDTH$}",
        COMPANY_COLUMN, "Avg Mix"
    );
    for month in MONTH_LABELS {
        header.push_str(&format!(" | {month:>VALUE_WIDTH$} {:>CELL_WIDTH$}", "var"));
    }
    let separator = "-".repeat(header.chars().count());
    println!("{}", header.bold().bright_white());
    println!("{}", separator.bright_black());

    for (index, row) in table.rows.iter().enumerate() {
        let Some(tags) = styles.row(index) else {
            continue;
        };
        let cells = row.cells();
        let mut line = leading_cells(row, tags);
        for month in 0..MONTH_LABELS.len() {
            let value_col = 2 + 2 * month;
            let deviation_col = value_col + 1;
            line.push_str(&format!(
                " | {} {}",
                paint(&format!("{:>VALUE_WIDTH$}", cells[value_col]), tags[value_col]),
                paint(
                    &format!("{:>CELL_WIDTH$}", cells[deviation_col]),
                    tags[deviation_col]
                )
            ));
        }
        println!("{line}");
    }

    separator.len()
}

/// Company, average and the twelve deviations for the first rows only.
fn print_compact_table(table: &Table, styles: &StyleMap) -> usize {
    let mut header = format!(
        "{:<NAME_WIDTH$} | {:>AVERAGE_WIDTH$} |",
        COMPANY_COLUMN, "Avg Mix"
    );
    for month in MONTH_LABELS {
        header.push_str(&format!(" {month:>CELL_WIDTH$}"));
    }
    let separator = "-".repeat(header.chars().count());
    println!("{}", header.bold().bright_white());
    println!("{}", separator.bright_black());

    for (index, row) in table.rows.iter().enumerate().take(COMPACT_ROW_LIMIT) {
        let Some(tags) = styles.row(index) else {
            continue;
        };
        let mut line = leading_cells(row, tags);
        line.push_str(" |");
        for (month, cells) in row.months.iter().enumerate() {
            let deviation_col = 3 + 2 * month;
            line.push_str(&format!(
                " {}",
                paint(
                    &format!("{:>CELL_WIDTH$}", cells.deviation),
                    tags[deviation_col]
                )
            ));
        }
        println!("{line}");
    }

    let mut width = separator.len();
    if table.rows.len() > COMPACT_ROW_LIMIT {
        let message = format!(
            "... {} more companies (use --full-output to display all).",
            table.rows.len() - COMPACT_ROW_LIMIT
        );
        width = width.max(message.len());
        println!("{}", message.bright_black());
    }
    width
}

fn leading_cells(row: &TableRow, tags: &[StyleTag]) -> String {
    format!(
        "{} | {}",
        paint(&format!("{:<NAME_WIDTH$}", fit(&row.entity_name, NAME_WIDTH)), tags[0]),
        paint(&format!("{:>AVERAGE_WIDTH$}", row.average_cell), tags[1])
    )
}

fn print_entity_detail(detail: &EntityDetail) {
    println!(
        "{} {}",
        "Company".bold().bright_magenta(),
        format!("{} (id {})", detail.name, detail.id).bright_white()
    );
    println!(
        "{} {}",
        detail.average_label.bright_yellow().bold(),
        paint(&detail.average_cell, StyleTag::AverageCell)
    );
    println!(
        "{}",
        format!(
            "{:<5} | {:>20} | {:>20}",
            "Month", detail.value_label, detail.variability_label
        )
        .bold()
        .bright_white()
    );
    for month in &detail.months {
        println!(
            "{:<5} | {} | {}",
            month.month,
            paint(&format!("{:>20}", month.value), StyleTag::ValueCell),
            paint(&format!("{:>20}", month.deviation), month.tag)
        );
    }
}

fn paint(text: &str, tag: StyleTag) -> ColoredString {
    match tag {
        StyleTag::Header => text.bold().bright_white(),
        StyleTag::AverageCell => text.bold().bright_yellow(),
        StyleTag::ValueCell => text.bright_blue(),
        StyleTag::DeviationPositive => text.bright_green(),
        StyleTag::DeviationNegative => text.bright_red(),
        StyleTag::DeviationZero => text.bright_black(),
    }
}

fn fit(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut truncated: String = name.chars().take(width.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(fit("Monarch HVAC", 22), "Monarch HVAC");
        let fitted = fit("Premium Electric & Plumbing Services", 22);
        assert_eq!(fitted.chars().count(), 22);
        assert!(fitted.ends_with('…'));
    }

    #[test]
    fn unit_hint_follows_mode() {
        assert_eq!(unit_hint(AnalysisMode::Percentage), "pp");
        assert_eq!(unit_hint(AnalysisMode::Absolute), "calls");
    }
}
