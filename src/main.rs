use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::Path;

use receipt_processor::{NewReceipt, RuleEngine, VERSION};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 2 && args[1] == "score" {
        // Offline scoring mode
        let engine = RuleEngine::new();
        for path in &args[2..] {
            run_score(&engine, Path::new(path))?;
        }
    } else {
        print_usage();
        if args.len() > 1 {
            bail!("unrecognized arguments: {}", args[1..].join(" "));
        }
    }

    Ok(())
}

fn run_score(engine: &RuleEngine, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read receipt file: {:?}", path))?;
    let receipt: NewReceipt = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse receipt JSON: {:?}", path))?;

    let breakdown = engine.score(&receipt);

    println!("🧾 {} ({})", receipt.retailer, path.display());
    for contribution in &breakdown.contributions {
        println!("   {:<20} {:>6}", contribution.rule.name(), contribution.points);
    }
    for skipped in &breakdown.skipped {
        eprintln!("   ⚠️  {} skipped: {}", skipped.rule.name(), skipped.error);
    }
    println!("   {:<20} {:>6}\n", "TOTAL", breakdown.total());

    Ok(())
}

fn print_usage() {
    println!("receipt-processor {}", VERSION);
    println!();
    println!("Usage:");
    println!("   receipt-processor score <receipt.json>...   Print the points breakdown");
    println!("   receipt-server                              Run the HTTP API");
}
