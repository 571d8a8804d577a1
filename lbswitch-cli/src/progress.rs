//! Colored, numbered step output on stdout.

use colored::Colorize;

use lbswitch_client::Progress;

/// Renders pipeline progress as `Step N: ...` headings with ✔ / ✖ / * / ➜ lines.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    steps: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for ConsoleProgress {
    fn step(&mut self, title: &str) {
        self.steps += 1;
        println!("\nStep {}: {}", self.steps, title);
    }

    fn ok(&mut self, message: &str) {
        println!("{}", format!("✔ {message}").green());
    }

    fn note(&mut self, message: &str) {
        println!("{}", format!("* {message}").yellow());
    }

    fn action(&mut self, message: &str) {
        println!("{}", format!("➜ {message}").bright_black());
    }

    fn fail(&mut self, message: &str) {
        println!("{}", format!("✖ {message}").red());
    }
}
