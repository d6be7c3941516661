use anyhow::Result;
use colored::Colorize;

use crate::step::{OnFailure, Step};

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building documentation...".cyan().bold());
    println!();

    let mut args = vec!["doc", "--workspace", "--no-deps", "--document-private-items"];
    if open {
        args.push("--open");
    }

    Step {
        label: "Documentation",
        args: &args,
        on_failure: OnFailure::Abort,
    }
    .run()?;

    if !open {
        println!(
            "   {}",
            "Open target/doc/micsupp/index.html in your browser".dimmed()
        );
        println!(
            "   {}",
            "Or run 'cargo run -p xtask -- doc --open'".dimmed()
        );
        println!();
    }

    Ok(())
}
