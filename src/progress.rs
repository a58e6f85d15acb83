use anyhow::Result;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::future::Future;
use std::time::Duration;

const BRAILLE_TICKS: [&str; 9] = ["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", "✔"];
const ASCII_TICKS: &str = "|/-\\+";
const TEMPLATE: &str = "{spinner} {msg} {elapsed:.dim}";
const TICK_RATE: Duration = Duration::from_millis(100);

/// Pipeline stages in the order a run goes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Compute,
    Export,
}

impl Stage {
    const ALL: [Self; 3] = [Self::Load, Self::Compute, Self::Export];

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|stage| *stage == self)
            .map_or(0, |index| index + 1)
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Load => "Loading data",
            Self::Compute => "Computing",
            Self::Export => "Exporting",
        }
    }

    fn headline(self, detail: &str) -> String {
        let step = format!("[{}/{}]", self.position(), Self::ALL.len());
        format!(
            "{} {}: {}",
            step.bright_yellow().bold(),
            self.title().bright_cyan().bold(),
            detail.bright_white().bold()
        )
    }
}

enum Outcome {
    Done,
    Failed,
}

impl Outcome {
    fn badge(&self) -> String {
        match self {
            Self::Done => "done".bright_green().bold().to_string(),
            Self::Failed => "failed".bright_red().bold().to_string(),
        }
    }
}

/// Stage spinners drawn on stderr; a hidden target when disabled.
pub struct ProgressState {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl ProgressState {
    pub fn new(use_color: bool, enabled: bool) -> Self {
        let target = if enabled {
            ProgressDrawTarget::stderr_with_hz(15)
        } else {
            ProgressDrawTarget::hidden()
        };
        let multi = MultiProgress::with_draw_target(target);

        let base = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let style = if dumb_terminal() {
            base.tick_chars(ASCII_TICKS)
        } else if use_color {
            let painted: Vec<String> = BRAILLE_TICKS
                .iter()
                .map(|tick| tick.bright_cyan().bold().to_string())
                .collect();
            let ticks: Vec<&str> = painted.iter().map(String::as_str).collect();
            base.tick_strings(&ticks)
        } else {
            base.tick_strings(&BRAILLE_TICKS)
        };

        Self { multi, style }
    }

    fn start(&self, headline: String) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(self.style.clone());
        bar.set_message(headline);
        bar.enable_steady_tick(TICK_RATE);
        bar
    }

    pub fn clear(&self) {
        let _ = self.multi.clear();
    }
}

fn dumb_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

/// Awaits `fut` behind a spinner for `stage`, then marks it done or failed.
pub async fn run_with_spinner<T>(
    progress: &ProgressState,
    stage: Stage,
    detail: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    let headline = stage.headline(detail);
    let bar = progress.start(headline.clone());
    let result = fut.await;
    let outcome = if result.is_ok() {
        Outcome::Done
    } else {
        Outcome::Failed
    };
    bar.finish_with_message(format!("{headline} {}", outcome.badge()));
    result
}
