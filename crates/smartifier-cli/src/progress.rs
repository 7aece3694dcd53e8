//! Progress feedback for long-running transformation phases.
//!
//! Per-line progress (every million records) goes through `tracing`; these
//! helpers wrap a whole phase in a spinner that keeps the elapsed time
//! visible, since multi-pass edge runs can take a while with no line output
//! in between. Suppressed when --quiet is set.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Start a phase spinner showing the elapsed time next to the message.
pub fn phase(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {spinner} {msg}")
            .expect("phase spinner template is valid"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

/// Finish a phase, keeping the total elapsed time in the completion line.
pub fn finish_phase(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {msg}")
                .expect("phase completion template is valid"),
        );
        pb.finish_with_message(message.to_string());
    }
}
