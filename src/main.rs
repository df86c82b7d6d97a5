// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Inspect the page (fetch + scan); link checks start in the background
// 3. Print the first report right away, then a progress line every
//    --interval-secs until the link checks finish or the deadline passes
// 4. Print the final report and exit with a proper code
//    (0 = all good, 1 = page or links broken, 2 = error)
//
// Ctrl-C stops the link checks early; the final report is still printed.
// =============================================================================

mod cli;
mod logger;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use log::warn;
use tokio::time::Instant;

use cli::Cli;
use page_inspector::{Inspection, Inspector, LinkRecord, ReportSnapshot, WaitOutcome};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logger::init_logger(cli.log_level).context("failed to set up logging")?;

    let inspector = Inspector::new(cli.inspector_config()).context("invalid settings")?;
    let deadline = cli.deadline().map(|after| Instant::now() + after);

    if !cli.json {
        println!("🔍 Inspecting: {}", cli.url);
    }

    let inspection = inspector.inspect(&cli.url, deadline).await;

    // First report: page details are final, links are mostly unchecked
    print_progress(&inspection.snapshot(), cli.json)?;

    let outcome = wait_with_progress(&inspection, cli.interval(), cli.json).await?;
    if outcome == WaitOutcome::DeadlineElapsed {
        warn!("deadline reached before every link was checked, the report is incomplete");
    }

    let snapshot = inspection.snapshot();
    print_results(&snapshot, cli.json)?;

    let broken = snapshot.status_code >= 400 || snapshot.inaccessible_link_count > 0;
    Ok(if broken { 1 } else { 0 })
}

// Waits for the link checks, printing a progress report on every tick
async fn wait_with_progress(
    inspection: &Inspection,
    interval: Duration,
    json: bool,
) -> Result<WaitOutcome> {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    let mut interrupted = false;

    let wait = inspection.wait();
    tokio::pin!(wait);

    loop {
        tokio::select! {
            outcome = &mut wait => return Ok(outcome),
            _ = ticker.tick() => print_progress(&inspection.snapshot(), json)?,
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                warn!("interrupted, cancelling the remaining link checks");
                interrupted = true;
                inspection.cancel();
            }
        }
    }
}

// One line of progress: a JSON object, or a short status line
fn print_progress(snapshot: &ReportSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        let checked = snapshot.accessible_link_count + snapshot.inaccessible_link_count;
        println!(
            "⏳ {} link(s) checked, {} waiting ({} found)",
            checked, snapshot.not_analysed_link_count, snapshot.total_link_count
        );
    }
    Ok(())
}

// Prints the final report either as a table or JSON
fn print_results(snapshot: &ReportSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        print_table(snapshot);
    }
    Ok(())
}

// Prints the report as a human-readable summary and link table
fn print_table(snapshot: &ReportSnapshot) {
    println!();
    println!("🌐 {} ({})", snapshot.url, snapshot.status_msg);
    println!("   HTML version: {}", snapshot.html_version);
    println!("   Title:        {}", snapshot.page_title);
    println!("   Login fields: {}", snapshot.login_field_count);
    if snapshot.body_truncated {
        println!("   ⚠️  Page body was cut short, only the first part was scanned");
    }

    for (level, texts) in &snapshot.headings {
        for text in texts {
            println!("   {:<13} {}", format!("{}:", level), text);
        }
    }

    if !snapshot.links.is_empty() {
        println!();
        println!("{:<60} {:<12} {:<10}", "URL", "TYPE", "STATUS");
        println!("{}", "=".repeat(84));

        for link in &snapshot.links {
            println!(
                "{:<60} {:<12} {:<10}",
                truncate(&link.url, 57),
                link.link_type,
                format_status(link)
            );
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Accessible: {}", snapshot.accessible_link_count);
    println!("   ❌ Inaccessible: {}", snapshot.inaccessible_link_count);
    println!("   ⏳ Not analysed: {}", snapshot.not_analysed_link_count);
    println!(
        "   📋 Total: {} ({} internal, {} external)",
        snapshot.total_link_count, snapshot.internal_link_count, snapshot.external_link_count
    );
}

// Shortens long URLs for display, on a char boundary
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let short: String = text.chars().take(max_chars).collect();
        format!("{}...", short)
    } else {
        text.to_string()
    }
}

fn format_status(link: &LinkRecord) -> String {
    match link.status_code {
        0 => "-".to_string(),
        code if link.is_accessible() => format!("✅ {}", code),
        code => format!("❌ {}", code),
    }
}
