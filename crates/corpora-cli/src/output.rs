//! Terminal rendering: phase spinners, dataset list and the final report.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

use corpora_core::{DatasetRegistry, Error, FieldCategory, Phase, SystemStatus};
use corpora_workflows::{LoadReport, ProgressObserver};

const DOCUMENT_PREVIEW_CHARS: usize = 120;

/// Renders workflow progress on stderr.
///
/// One spinner per running phase; finished phases leave a single line.
pub struct ConsoleObserver {
    quiet: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    /// Creates an observer. A quiet observer prints nothing.
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinner: Mutex::new(None),
        }
    }

    fn new_spinner(&self, phase: Phase) -> ProgressBar {
        let bar = if self.quiet || !std::io::stderr().is_terminal() {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new_spinner()
        };
        let style = ProgressStyle::with_template("{prefix:18} {spinner:.dim} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["|", "/", "-", "\\", " "]);
        bar.set_style(style);
        bar.set_prefix(format!("{}", phase.to_string().green().bold()));
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut slot| slot.take())
    }

    fn line(&self, text: String) {
        if self.quiet {
            return;
        }
        let current = self.spinner.lock().ok().and_then(|slot| slot.clone());
        match current {
            Some(bar) => bar.suspend(|| eprintln!("{text}")),
            None => eprintln!("{text}"),
        }
    }
}

impl ProgressObserver for ConsoleObserver {
    fn phase_started(&self, dataset: &str, phase: Phase) {
        let bar = self.new_spinner(phase);
        bar.set_message(dataset.to_string());
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(bar)
        {
            previous.finish_and_clear();
        }
    }

    fn phase_finished(&self, _dataset: &str, phase: Phase, elapsed: Duration) {
        if let Some(bar) = self.take_spinner() {
            bar.finish_and_clear();
        }
        self.line(format!(
            "{:>7} {phase} ({:.2}s)",
            "ok".green(),
            elapsed.as_secs_f64()
        ));
    }

    fn phase_failed(&self, _dataset: &str, phase: Phase, _error: &Error) {
        if let Some(bar) = self.take_spinner() {
            bar.finish_and_clear();
        }
        self.line(format!("{:>7} {phase}", "FAILED".red().bold()));
    }

    fn status_polled(&self, dataset: &str, _phase: Phase, status: &SystemStatus) {
        if let Ok(slot) = self.spinner.lock()
            && let Some(bar) = slot.as_ref()
        {
            bar.set_message(format!(
                "{dataset}: {} ({} documents)",
                status.system_state, status.document_count
            ));
        }
    }

    fn warning(&self, _dataset: &str, phase: Phase, message: &str) {
        self.line(format!("{} {phase}: {message}", "warning:".yellow().bold()));
    }
}

/// Prints the registered datasets for `--list`.
pub fn print_datasets(registry: &DatasetRegistry) {
    for descriptor in registry.iter() {
        let filters = if descriptor.example_filters.is_some() {
            ", example filters"
        } else {
            ""
        };
        println!(
            "{:<10} {}  ({} searchable fields{filters}, test query '{}')",
            descriptor.name.bold(),
            descriptor.file_path.display(),
            descriptor.field_count(FieldCategory::Searchable),
            descriptor.test_query
        );
    }
}

/// Prints the outcome of a successful run on stdout.
///
/// Quiet mode prints only the summary block.
pub fn print_report(report: &LoadReport, quiet: bool) {
    println!("{}", report.summary());
    if quiet {
        return;
    }

    if let Some(fields) = &report.discovered_fields {
        println!("\n{} {}", "Discovered fields:".bold(), fields.join(", "));
    }

    println!("\n{}", "Top results:".bold());
    for (rank, record) in report.verification.iter().enumerate() {
        let document = record
            .document
            .as_deref()
            .map(|d| preview(d, DOCUMENT_PREVIEW_CHARS))
            .unwrap_or_else(|| "<unavailable>".dimmed().to_string());
        println!(
            "  {:>2}. key {} score {:.3}  {document}",
            rank + 1,
            record.document_key,
            record.score
        );
    }

    if !report.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }
}

/// First `max` characters of `text` on one line, with an ellipsis if cut.
fn preview(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max {
        return flat;
    }
    let mut cut: String = flat.chars().take(max).collect();
    cut.push_str("...");
    cut
}
