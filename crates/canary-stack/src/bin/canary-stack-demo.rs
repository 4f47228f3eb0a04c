//! Demo: push 100, 200, ..., 3000, pop once and write the data listing.
//!
//! Usage: `canary-stack-demo [LOG_PATH]` (defaults to `log.txt`).

use anyhow::Context;
use canary_stack::{canary_stack, render_data, StackConfig, TextFileSink, TextLayout};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "log.txt".to_owned());
    let sink = TextFileSink::new(&path, TextLayout::Data);
    let mut stk = canary_stack!(stk, StackConfig::default(), sink)?;

    for i in 1..=30 {
        stk.push(f64::from(i) * 100.0)?;
    }
    let top = stk.pop()?;
    println!("popped {top}");

    let snapshot = stk
        .report()
        .with_context(|| format!("writing {path}"))?;
    print!("{}", render_data(&snapshot));

    let stats = *stk.stats();
    println!(
        "pushes={} pops={} grows={} shrinks={} peak_capacity={}",
        stats.pushes, stats.pops, stats.grows, stats.shrinks, stats.peak_capacity
    );

    stk.destroy()?;
    Ok(())
}
