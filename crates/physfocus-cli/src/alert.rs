//! Terminal rendition of the completion alerts.

use std::io::{IsTerminal, Write};

use physfocus_core::error::AlertError;
use physfocus_core::Alerter;

pub struct TerminalAlerter {
    sound: bool,
}

impl TerminalAlerter {
    pub fn new(sound: bool) -> Self {
        Self { sound }
    }
}

impl Alerter for TerminalAlerter {
    fn play_alarm(&mut self) -> Result<(), AlertError> {
        if !self.sound {
            return Ok(());
        }
        let mut stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Err(AlertError::Unavailable("stderr is not a terminal".into()));
        }
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }

    fn announce(&mut self, message: &str) {
        let rule = "=".repeat(message.chars().count() + 8);
        println!("\n{rule}\n    {message}\n{rule}");
    }

    fn warn(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muted_alarm_is_silent_success() {
        assert!(TerminalAlerter::new(false).play_alarm().is_ok());
    }
}
