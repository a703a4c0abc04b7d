//! Progress reporting
//!
//! The engine never prints directly. It talks to a [`Reporter`], which the
//! binary picks (plain console or cliclack) and configures for verbosity.

use colored::Colorize;

/// Sink for progress messages and fatal errors
pub trait Reporter {
    /// Progress step (file created, command set started)
    fn info(&self, message: &str);

    /// Secondary detail (individual command lines, subprocess output)
    fn detail(&self, message: &str);

    /// Something the operator should see even in quiet mode
    fn warn(&self, message: &str);

    /// Print the error and terminate the process with a non-zero status
    fn fatal(&self, message: &str) -> !;
}

/// Reporter writing to stderr with `colored` styling
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        if self.verbose {
            eprintln!("{} {}", "->".blue(), message);
        }
    }

    fn detail(&self, message: &str) {
        if self.verbose {
            eprintln!("   {}", message.dimmed());
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {}", "Warning:".yellow(), message);
    }

    fn fatal(&self, message: &str) -> ! {
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(1);
    }
}
