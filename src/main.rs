use anyhow::{Result, anyhow};
use chrono::Local;
use clap::Parser;
use std::io::IsTerminal;
use tracing::{info, warn};
use varmix::cli::{Cli, handle_command, resolve_csv_path};
use varmix::export::save_table_csv;
use varmix::progress::{ProgressState, Stage, run_with_spinner};
use varmix::report::{HtmlReportContext, save_html_report};
use varmix::sources::load_entities;
use varmix::summary::{SummaryContext, SummaryPaths, print_summary};
use varmix::{build, calculate_statistics, describe_entity, find_entity, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let use_color = std::io::stdout().is_terminal();
    colored::control::set_override(use_color);

    let mut cli = Cli::parse();

    if let Some(command) = cli.command.take() {
        handle_command(command)?;
        return Ok(());
    }

    logging::init();

    let Cli {
        input,
        mode,
        save_csv,
        save_html,
        archive_csv,
        entity,
        full_output,
        no_progress,
        ..
    } = cli;
    let input = input.ok_or_else(|| anyhow!("--input is required"))?;
    let csv_path = resolve_csv_path(save_csv, mode);

    let run_started_at = Local::now();
    let progress = ProgressState::new(use_color, !no_progress);

    let entities = run_with_spinner(
        &progress,
        Stage::Load,
        "monthly counts",
        load_entities(&input),
    )
    .await?;
    if entities.is_empty() {
        warn!(path = %input.display(), "input contains no companies");
    }

    let (table, styles, statistics, detail) =
        run_with_spinner(&progress, Stage::Compute, mode.label(), async {
            let (table, styles) = build(&entities, mode)?;
            let statistics = calculate_statistics(&entities, mode)?;
            let detail = match entity.as_deref() {
                Some(key) => {
                    let record = find_entity(&entities, key).ok_or_else(|| {
                        anyhow!("no company named or numbered '{key}' in {}", input.display())
                    })?;
                    Some(describe_entity(record, mode)?)
                }
                None => None,
            };
            Ok::<_, anyhow::Error>((table, styles, statistics, detail))
        })
        .await?;
    info!(rows = table.rows.len(), mode = mode.as_str(), "built variability table");

    let written_csv = match csv_path.as_deref() {
        Some(path) => Some(
            run_with_spinner(
                &progress,
                Stage::Export,
                "variability CSV",
                save_table_csv(path, &table, archive_csv),
            )
            .await?,
        ),
        None => None,
    };

    if let Some(path) = save_html.as_deref() {
        let html_context = HtmlReportContext {
            run_started_at: &run_started_at,
            table: &table,
            styles: &styles,
            statistics: statistics.as_ref(),
            csv_path: written_csv.as_deref(),
            output_path: path,
        };
        run_with_spinner(
            &progress,
            Stage::Export,
            "HTML report",
            save_html_report(path, &html_context),
        )
        .await?;
    }

    progress.clear();

    print_summary(&SummaryContext {
        run_started_at: &run_started_at,
        input: &input,
        table: &table,
        styles: &styles,
        statistics: statistics.as_ref(),
        paths: SummaryPaths {
            csv: written_csv.as_deref(),
            html: save_html.as_deref(),
        },
        detail: detail.as_ref(),
        full_output,
    });

    Ok(())
}
