use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Spinner shown on stderr while a tool's external sources are loading.
pub struct LoadSpinner {
    pb: ProgressBar,
}

impl LoadSpinner {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A spinner that tracks state without drawing anything.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new_spinner().with_style(Self::spinner_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();
        Self { pb }
    }

    /// Starts spinning with a message naming what is being loaded.
    pub fn start(&self, what: &str) {
        self.pb.reset();
        self.pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        self.pb.set_message(format!("Loading {}...", what));
    }

    pub fn finish(&self, applied: usize) {
        self.pb.disable_steady_tick();
        if applied == 0 {
            self.pb.finish_and_clear();
        } else {
            self.pb.finish_with_message("✓ Loaded");
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        !self.pb.is_finished()
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for LoadSpinner {
    fn default() -> Self {
        Self::new()
    }
}
