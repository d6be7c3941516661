//! One cargo invocation with timing and coloured pass/fail output.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// What to do when a step's command fails.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Print the error output and abort
    Abort,
    /// Print a warning and carry on
    Warn,
}

/// A named `cargo` invocation.
pub struct Step<'a> {
    pub label: &'a str,
    pub args: &'a [&'a str],
    pub on_failure: OnFailure,
}

impl Step<'_> {
    /// Run the step. Returns the command output when it succeeded.
    pub fn run(&self) -> Result<Option<Output>> {
        println!("{}", format!("  {}...", self.label).cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(self.args)
            .output()
            .with_context(|| format!("Failed to run {}", self.label))?;

        if output.status.success() {
            println!(
                "{}",
                format!(
                    "  ✓ {} passed in {:.2}s",
                    self.label,
                    start.elapsed().as_secs_f64()
                )
                .green()
            );
            println!();
            return Ok(Some(output));
        }

        match self.on_failure {
            OnFailure::Abort => {
                eprintln!("{}", format!("  ✗ {} failed", self.label).red().bold());
                eprintln!();
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                for line in String::from_utf8_lossy(&output.stdout).lines() {
                    eprintln!("  {line}");
                }
                anyhow::bail!("{} failed", self.label);
            }
            OnFailure::Warn => {
                eprintln!("{}", format!("  ⚠ {} reported problems", self.label).yellow().bold());
                println!();
                Ok(None)
            }
        }
    }
}
