use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A one-line activity indicator. Disabled spinners draw nothing.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: impl Into<String>, enabled: bool) -> Self {
        let message = message.into();
        let bar = if enabled {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(message);
        Spinner { bar }
    }

    pub fn update(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn succeed(self, message: impl Into<String>) {
        self.bar
            .finish_with_message(format!("\u{2714} {}", message.into()));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.bar
            .abandon_with_message(format!("\u{2716} {}", message.into()));
    }

    pub fn stop(self) {
        self.bar.finish_and_clear();
    }

    /// Hide the spinner while `f` uses the terminal.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_spinner_tracks_message() {
        let spinner = Spinner::start("Saving", false);
        assert_eq!(spinner.message(), "Saving");
        spinner.update("Still saving");
        assert_eq!(spinner.message(), "Still saving");
        assert_eq!(spinner.suspend(|| 7), 7);
        spinner.succeed("Saved");
    }
}
