use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate, generate_to};

use crate::model::AnalysisMode;

pub const DEFAULT_OUTPUT_DIR: &str = "data/output";
pub const DEFAULT_HTML_PATH: &str = "data/output/historical_variability.html";

pub const INPUT_HELP: &str = "Monthly counts to analyze: a CSV with company_id, company_name, month and calls columns, or a JSON array of entity records (.json). Gzip-compressed files (.gz) are accepted.";
pub const MODE_HELP: &str = "Analysis mode: 'percentage' compares each month's share of the year, 'absolute' compares raw call counts.";
pub const SAVE_CSV_HELP: &str = "Save the variability table to the given CSV file (defaults to data/output/historical_variability_<mode>.csv when no path is provided). Use --archive-csv to store a .gz instead.";
pub const SAVE_HTML_HELP: &str = "Save the HTML report to the given file (defaults to data/output/historical_variability.html when no path is provided).";
pub const ARCHIVE_CSV_HELP: &str = "Archive the saved CSV output into a .gz file.";
pub const ENTITY_HELP: &str = "Print a month-by-month breakdown for the company with this exact name or id.";

#[derive(Debug, Parser)]
#[command(
    name = "varmix",
    about = "Report how each company's monthly call volume deviates from its own yearly average.",
    version = env!("CARGO_PKG_VERSION"),
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[arg(long, short, value_name = "FILE", required = true, help = INPUT_HELP)]
    pub input: Option<PathBuf>,
    #[arg(long, short, value_name = "MODE", default_value = "percentage", help = MODE_HELP)]
    pub mode: AnalysisMode,
    #[arg(long, value_name = "FILE", num_args = 0..=1, help = SAVE_CSV_HELP)]
    pub save_csv: Option<Option<PathBuf>>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_HTML_PATH,
        help = SAVE_HTML_HELP
    )]
    pub save_html: Option<PathBuf>,
    #[arg(long, help = ARCHIVE_CSV_HELP)]
    pub archive_csv: bool,
    #[arg(long, value_name = "NAME_OR_ID", help = ENTITY_HELP)]
    pub entity: Option<String>,
    #[arg(
        long,
        help = "Print every company with all monthly values and deviations instead of the abbreviated summary."
    )]
    pub full_output: bool,
    #[arg(long, help = "Disable progress spinner output.")]
    pub no_progress: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// `--save-csv` without a value resolves to a mode-specific default name.
pub fn resolve_csv_path(
    requested: Option<Option<PathBuf>>,
    mode: AnalysisMode,
) -> Option<PathBuf> {
    requested.map(|path| path.unwrap_or_else(|| default_csv_path(mode)))
}

pub fn default_csv_path(mode: AnalysisMode) -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR).join(format!("historical_variability_{}.csv", mode.as_str()))
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Completions {
            shell,
            output_dir,
            install,
        } => generate_completions(shell, output_dir, install),
    }
}

fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    let target_dir = if let Some(dir) = output_dir {
        Some(dir)
    } else if install {
        Some(default_install_dir(shell)?)
    } else {
        None
    };

    if let Some(dir) = target_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create completion directory {}", dir.display()))?;
        let path = generate_to(shell, &mut command, bin_name, &dir)
            .context("failed to write completion file")?;
        println!("Installed {shell:?} completions to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate(shell, &mut command, bin_name, &mut stdout);
        stdout
            .flush()
            .context("failed to flush completion output")?;
    }

    Ok(())
}

fn default_install_dir(shell: Shell) -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        anyhow!("HOME environment variable is not set; use --output-dir to specify a path")
    })?;
    let mut path = PathBuf::from(home);

    match shell {
        Shell::Bash => path.push(".local/share/bash-completion/completions"),
        Shell::Elvish => path.push(".elvish/lib/completions"),
        Shell::Fish => path.push(".config/fish/completions"),
        Shell::PowerShell => path.push(".local/share/powershell/Scripts"),
        Shell::Zsh => path.push(".local/share/zsh/site-functions"),
        other => {
            return Err(anyhow!(
                "no default install location for {other:?}; specify --output-dir"
            ));
        }
    }
    Ok(path)
}
