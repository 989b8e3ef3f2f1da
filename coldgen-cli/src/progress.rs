//! Console progress reporting.

use coldgen::{EmitReport, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{prefix:>8.cyan.bold} [{bar:30.green/white}] {pos}/{len} {wide_msg}";

/// A progress bar per emitter run.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: None,
            hidden: true,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }

    /// Current position of the active bar.
    pub fn position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }
}

impl ProgressSink for BarProgress {
    fn on_start(&mut self, target: &str, total: usize) {
        let bar = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total as u64)
        };
        bar.set_length(total as u64);
        bar.set_style(Self::style());
        bar.set_prefix(target.to_string());
        self.bar = Some(bar);
    }

    fn on_class(&mut self, processed: usize, _total: usize, label: &str) {
        if let Some(bar) = &self.bar {
            bar.set_position(processed as u64);
            bar.set_message(label.to_string());
        }
    }

    fn on_finish(&mut self, _target: &str, _report: &EmitReport) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_tracks_position() {
        let mut progress = BarProgress::hidden();
        progress.on_start("model", 3);
        progress.on_class(1, 3, "zoo/Animal");
        progress.on_class(2, 3, "zoo/Keeper");
        assert_eq!(progress.position(), Some(2));
    }

    #[test]
    fn test_no_bar_before_start() {
        let mut progress = BarProgress::hidden();
        progress.on_class(1, 1, "Animal");
        assert_eq!(progress.position(), None);
    }
}
