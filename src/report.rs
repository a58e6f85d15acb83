use crate::export::write_output_file;
use crate::statistics::HistoricalStatistics;
use crate::styling::{StyleMap, StyleTag};
use crate::table::Table;
use anyhow::Result;
use chrono::{DateTime, Local};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use minify_html::{Cfg, minify};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

pub struct HtmlReportContext<'a> {
    pub run_started_at: &'a DateTime<Local>,
    pub table: &'a Table,
    pub styles: &'a StyleMap,
    pub statistics: Option<&'a HistoricalStatistics>,
    pub csv_path: Option<&'a Path>,
    pub output_path: &'a Path,
}

pub async fn save_html_report(output_path: &Path, context: &HtmlReportContext<'_>) -> Result<()> {
    let html = render_html_report(context).into_string();
    let mut cfg = Cfg::new();
    cfg.minify_css = true;
    let minified = minify(html.as_bytes(), &cfg);
    write_output_file(output_path, &minified).await?;
    info!(path = %output_path.display(), "saved HTML report");
    Ok(())
}

pub fn render_html_report(context: &HtmlReportContext<'_>) -> Markup {
    let mode = context.table.mode;
    let generated_at = context
        .run_started_at
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    let title = format!(
        "Historical Variability - {} - {}",
        mode.label(),
        context.run_started_at.format("%Y-%m-%d")
    );
    let overall = context.statistics.map_or_else(
        || "-".to_string(),
        |stats| stats.overall_average_label(mode),
    );

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style {
                    (PreEscaped(REPORT_STYLE))
                    (PreEscaped(style_tag_rules()))
                }
            }
            body {
                div class="page" {
                    header class="hero" {
                        div class="pill" { "varmix v" (env!("CARGO_PKG_VERSION")) }
                        h1 { "Historical Variability" }
                        p class="subtitle" {
                            "Monthly volume of every company measured against its own yearly average."
                        }
                        div class="meta" {
                            div {
                                span class="label" { "Generated" }
                                span class="value mono" { (generated_at) }
                            }
                            div {
                                span class="label" { "Analysis mode" }
                                span class="value mono" { (mode.label()) }
                            }
                        }
                    }
                    section class="cards" {
                        (card("Companies", &context.table.rows.len().to_string()))
                        (card("Overall average", &overall))
                        (card("Period", "12 months"))
                        @if let Some(stats) = context.statistics {
                            (card("Total variability", &format!("{:.2}", stats.total_variability)))
                        }
                    }
                    section class="legend" {
                        @for tag in StyleTag::ALL {
                            span class=(format!("swatch {}", tag.css_class())) { (tag.legend()) }
                        }
                    }
                    section class="table-section" {
                        h2 { "Variability by company" }
                        @if context.table.is_empty() {
                            p class="muted" { "No company data was available for this run." }
                        }
                        div class="table-wrap" {
                            table {
                                thead {
                                    tr {
                                        @for column in &context.table.columns {
                                            th { (column) }
                                        }
                                    }
                                }
                                tbody {
                                    @for (row, tags) in context.table.rows.iter().zip(context.styles.rows()) {
                                        tr {
                                            @for (cell, tag) in row.cells().into_iter().zip(tags) {
                                                td class=(tag.css_class()) { (cell) }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    (render_download(context))
                    footer class="footer" {
                        "Deviations in percentage mode are expressed in percentage points (pp)."
                    }
                }
            }
        }
    }
}

fn card(label: &str, value: &str) -> Markup {
    html! {
        div class="card" {
            div class="card-label" { (label) }
            div class="card-value" { (value) }
        }
    }
}

fn render_download(context: &HtmlReportContext<'_>) -> Markup {
    html! {
        section class="downloads" {
            h3 { "Downloads" }
            @match context.csv_path {
                Some(path) => {
                    @let display_name = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .map_or_else(|| path.display().to_string(), str::to_string);
                    @if let Some(rel) = relative_link(context.output_path, path) {
                        a class="download-link" href=(rel) title=(path.display().to_string()) { (display_name) }
                    } @else {
                        span class="download-path" title=(path.display().to_string()) { (display_name) }
                    }
                }
                None => {
                    p class="muted" { "No CSV file was saved. Use --save-csv." }
                }
            }
        }
    }
}

fn relative_link(html_path: &Path, target: &Path) -> Option<String> {
    let html_dir = html_path.parent()?;
    let target_dir = target.parent()?;
    if html_dir == target_dir {
        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(std::string::ToString::to_string)
    } else {
        None
    }
}

fn style_tag_rules() -> String {
    let mut rules = String::new();
    for tag in StyleTag::ALL {
        let _ = writeln!(rules, "td.{0}, .swatch.{0} {{ {1}; }}", tag.css_class(), tag.css_rule());
    }
    rules
}

const REPORT_STYLE: &str = r"
:root {
  --ink: #1f2933;
  --muted: #616e7c;
  --border: #d9e2ec;
  --card: #ffffff;
  --accent: #243b53;
}

* { box-sizing: border-box; }

body {
  margin: 0;
  font-family: 'Segoe UI', Helvetica, Arial, sans-serif;
  color: var(--ink);
  background: #f5f7fa;
}

.page { max-width: 1400px; margin: 0 auto; padding: 40px 24px 56px; }

.hero {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 16px;
  padding: 28px 32px;
}

.pill {
  display: inline-block;
  padding: 4px 12px;
  border-radius: 999px;
  background: rgba(36, 59, 83, 0.1);
  color: var(--accent);
  font-size: 12px;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.08em;
}

h1 { margin: 12px 0 6px; font-size: 2.2rem; }
.subtitle { margin: 0 0 16px; color: var(--muted); }

.meta { display: flex; gap: 32px; flex-wrap: wrap; }
.label {
  display: block;
  font-size: 11px;
  text-transform: uppercase;
  letter-spacing: 0.1em;
  color: var(--muted);
}
.value { font-weight: 600; }
.mono { font-family: ui-monospace, 'SFMono-Regular', monospace; }

.cards {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
  gap: 14px;
  margin: 24px 0;
}
.card {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 12px;
  padding: 14px 18px;
}
.card-label { font-size: 11px; text-transform: uppercase; color: var(--muted); }
.card-value { font-size: 22px; font-weight: 600; color: var(--accent); }

.legend { display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 16px; }
.swatch { padding: 4px 10px; border-radius: 6px; font-size: 12px; border: 1px solid var(--border); }

.table-wrap {
  overflow: auto;
  max-height: 75vh;
  border: 1px solid var(--border);
  border-radius: 12px;
  background: var(--card);
}
table { border-collapse: collapse; width: 100%; }
thead th {
  position: sticky;
  top: 0;
  background: var(--accent);
  color: #f0f4f8;
  font-size: 11px;
  text-transform: uppercase;
  padding: 10px 12px;
  white-space: nowrap;
}
tbody td {
  padding: 8px 12px;
  border-bottom: 1px solid var(--border);
  font-size: 13px;
  text-align: right;
  white-space: nowrap;
  font-variant-numeric: tabular-nums;
}
tbody td.cell-company { text-align: left; }

.downloads {
  margin-top: 24px;
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 12px;
  padding: 16px 20px;
}
.downloads h3 { margin: 0 0 8px; }
.download-link, .download-path { color: var(--accent); font-weight: 600; word-break: break-all; }
.muted { color: var(--muted); }
.footer { margin-top: 24px; color: var(--muted); font-size: 12px; text-align: center; }
";
