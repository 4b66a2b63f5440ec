//! Terminal implementation of [`Reporter`].

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use calc_core::Reporter;
use crossterm::style::Stylize;

use super::theme::{Icons, format_progress};

/// Prints update status lines to stdout.
#[derive(Debug)]
pub struct Output {
    icons: Icons,
    quiet: bool,
    interactive: bool,
    /// A `\r` progress line is on screen and needs terminating.
    progress_open: AtomicBool,
}

impl Output {
    /// `quiet` hides sections, info lines and progress; outcomes still print.
    pub fn new(quiet: bool) -> Self {
        Self {
            icons: Icons::default(),
            quiet,
            interactive: std::io::stdout().is_terminal(),
            progress_open: AtomicBool::new(false),
        }
    }

    fn close_progress(&self) {
        if self.progress_open.swap(false, Ordering::Relaxed) {
            println!();
        }
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        self.close_progress();
        println!("{} {}", self.icons.active.cyan(), title.bold());
    }

    fn downloading(&self, current: u64, total: Option<u64>) {
        if self.quiet || !self.interactive {
            return;
        }
        print!(
            "\r  {} Downloading {}",
            self.icons.active.cyan(),
            format_progress(current, total)
        );
        let _ = std::io::stdout().flush();
        self.progress_open.store(true, Ordering::Relaxed);
    }

    fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.close_progress();
        println!("  {} {}", self.icons.info.blue(), msg);
    }

    fn success(&self, msg: &str) {
        self.close_progress();
        println!("{} {}", self.icons.success.green(), msg.green());
    }

    fn warning(&self, msg: &str) {
        self.close_progress();
        println!("{} {}", self.icons.warning.yellow(), msg.yellow());
    }

    fn error(&self, msg: &str) {
        self.close_progress();
        println!("{} {}", self.icons.error.red(), msg.red());
    }
}
