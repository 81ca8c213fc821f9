//! Interactive progressive ray tracer.
//!
//! Drag with the left mouse button to orbit, `1`-`9` set the samples per frame, keypad `+`/`-`
//! (or Page Up/Down) change the bounce count and `Esc` quits. Settings are read from
//! `res/config.toml` when it exists.
use raytracing_lib::run;

/// Formats a start-up failure with its whole cause chain.
fn failure_message(error: &anyhow::Error) -> String {
    format!("Error: {:?}", error)
}

/// Entry point for the application.
///
/// Blocks on `run` and exits with status 1 if the renderer couldn't start.
fn main() {
    let result: anyhow::Result<()> = pollster::block_on(run(None));
    if let Err(error) = result {
        log::error!("{:?}", error);
        // Also reaches the terminal when logging is filtered out
        eprintln!("{}", failure_message(&error));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_has_cause_chain() {
        let error = anyhow::anyhow!("no adapter found").context("GPU setup failed");
        let message = failure_message(&error);
        assert!(message.starts_with("Error: GPU setup failed"));
        assert!(message.contains("no adapter found"));
    }
}
