use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{OnFailure, Step};

const NO_STD_TARGET: &str = "thumbv7em-none-eabihf";

pub fn run(host_only: bool) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let mut steps = vec![Step {
        label: "Host build",
        args: &["check", "--workspace", "--all-targets"],
        on_failure: OnFailure::Abort,
    }];

    if !host_only {
        // Collaborator traits and the driver must build without std.
        steps.push(Step {
            label: "codec-platform (no_std)",
            args: &["check", "-p", "codec-platform", "--target", NO_STD_TARGET, "--no-default-features"],
            on_failure: OnFailure::Abort,
        });
        steps.push(Step {
            label: "micsupp (no_std, defmt)",
            args: &[
                "check",
                "-p",
                "micsupp",
                "--target",
                NO_STD_TARGET,
                "--no-default-features",
                "--features",
                "defmt",
            ],
            on_failure: OnFailure::Abort,
        });
    }

    steps.push(Step {
        label: "Clippy",
        args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        on_failure: OnFailure::Warn,
    });
    steps.push(Step {
        label: "Formatting",
        args: &["fmt", "--all", "--check"],
        on_failure: OnFailure::Warn,
    });

    for step in &steps {
        step.run()?;
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
