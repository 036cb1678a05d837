use crate::facts::Progress;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Instant;

/// Refresh rate for the spinner (10 Hz).
const REFRESH_INTERVAL_MS: u64 = 100;

const DETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {msg}";
const DETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {msg}";
const INDETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{spinner}] {elapsed}";
const INDETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{spinner}] {elapsed}";

/// A progress bar on stderr that delays showing itself until a threshold is reached.
#[derive(Debug)]
pub struct ProgressReporter {
    bar: ProgressBar,
    visible_after: Instant,
    visible: AtomicBool,
    determinate: AtomicBool,
    use_colors: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// The progress bar only becomes visible once an update arrives after `delay` has passed.
    /// When `use_colors` is false, progress bar chrome is rendered without ANSI styling.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()),
            visible_after: Instant::now() + delay,
            visible: AtomicBool::new(false),
            determinate: AtomicBool::new(false),
            use_colors,
        }
    }

    fn reveal_if_due(&self) {
        if !self.visible.load(Ordering::Relaxed) && Instant::now() >= self.visible_after {
            self.visible.store(true, Ordering::Relaxed);
            self.bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }
    }

    fn style(&self, colored: &str, plain: &str) -> ProgressStyle {
        let template = if self.use_colors { colored } else { plain };
        ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.determinate.store(false, Ordering::Relaxed);
        self.bar.set_style(self.style(INDETERMINATE_TEMPLATE, INDETERMINATE_TEMPLATE_NO_COLOR));
        self.bar.set_prefix(phase.to_string());
        self.bar.reset_elapsed();
        self.bar.enable_steady_tick(Duration::from_millis(REFRESH_INTERVAL_MS));
        self.reveal_if_due();
    }

    fn set_position(&self, current: u64, total: u64, message: &str) {
        if !self.determinate.swap(true, Ordering::Relaxed) {
            self.bar.disable_steady_tick();
            self.bar
                .set_style(self.style(DETERMINATE_TEMPLATE, DETERMINATE_TEMPLATE_NO_COLOR).progress_chars("=> "));
        }

        self.bar.set_length(total);
        self.bar.set_position(current);
        self.bar.set_message(format!("{current}/{total}: {message}"));
        self.reveal_if_due();
    }

    fn done(&self) {
        self.bar.disable_steady_tick();
        if self.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}
