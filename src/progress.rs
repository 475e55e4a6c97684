//! Progress indicators and confirmation for reconcile runs

use crate::ui;
use colored::Colorize;
use declarative::{ApplyResult, ConfirmCallback, ProgressCallback, ResourceDiff};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Spinner for a single remote call
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(TICK);
    spinner
}

fn bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar.enable_steady_tick(TICK);
    bar
}

/// Terminal progress for `declarative::execute`
///
/// Shows a spinner while refreshing, prints the plan, then a bar while
/// applying. With `quiet` only the plan is printed.
#[derive(Debug, Default)]
pub struct TerminalProgress {
    quiet: bool,
    current: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, current: None }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.current.take() {
            bar.finish_and_clear();
        }
    }

    fn println(&self, line: &str) {
        match &self.current {
            Some(bar) => bar.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_refresh_start(&mut self, count: usize) {
        if self.quiet || count == 0 {
            return;
        }
        self.current = Some(spinner(&format!("Refreshing {count} outpost(s)...")));
    }

    fn on_plan(&mut self, diffs: &[ResourceDiff]) {
        self.finish();
        ui::display_diff(diffs);
    }

    fn on_batch_start(&mut self, count: usize) {
        if self.quiet {
            return;
        }
        println!();
        println!("  {} Applying {} change(s)...", "→".cyan(), count);
        self.current = Some(bar(count));
    }

    fn on_resource_start(&mut self, address: &str, description: &str) {
        if let Some(bar) = &self.current {
            bar.set_message(format!("{address} ({description})"));
        }
    }

    fn on_resource_complete(&mut self, address: &str, result: &ApplyResult) {
        if self.quiet {
            return;
        }
        let symbol = match result {
            ApplyResult::Failed { .. } => "✗".red(),
            ApplyResult::Skipped { .. } => "○".dimmed(),
            _ => "✓".green(),
        };
        self.println(&format!("    {symbol} {address} {result}"));
        if let Some(bar) = &self.current {
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        self.finish();
    }
}

/// Confirmation through a terminal prompt, or none with `--yes`
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    assume_yes: bool,
}

impl Prompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl ConfirmCallback for Prompt {
    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        println!();
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}
