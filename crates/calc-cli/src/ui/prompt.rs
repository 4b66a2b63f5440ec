//! Interactive update confirmation.

use std::io::Write;

use calc_core::Prompt;
use calc_schema::{Channel, Release};
use crossterm::style::Stylize;

/// Asks on stdin. Anything but `y`/`yes` (including EOF) declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm_update(&self, release: &Release) -> bool {
        let label = match release.channel() {
            Ok(Channel::Alpha) => " (ALPHA RELEASE)".red().to_string(),
            Ok(Channel::Beta) => " (BETA RELEASE)".yellow().to_string(),
            _ => String::new(),
        };
        print!(
            "New version {}{label} available, would you like to update? (y/N) ",
            release.version.as_str().bold()
        );
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(_) => is_yes(&input),
            Err(_) => false,
        }
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
