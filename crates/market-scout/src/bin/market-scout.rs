//! Market Scout terminal
//!
//! ```bash
//! export GOOGLE_API_KEY="..."
//! cargo run --bin market-scout -- --ticker TSLA
//! ```

use async_trait::async_trait;
use clap::Parser;
use market_scout::{Command, ScoutConfig, ScoutError, ScoutService, Ticker, escape_dollars};
use scout_agent::{CapabilityCall, RunObserver};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Interactive market analyst
#[derive(Debug, Parser)]
#[command(name = "market-scout", version, about)]
struct Args {
    /// Gemini model (overrides SCOUT_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Turn budget per analysis (overrides SCOUT_MAX_TURNS)
    #[arg(long)]
    max_turns: Option<usize>,

    /// Scout this ticker immediately on startup
    #[arg(long)]
    ticker: Option<String>,
}

/// Prints a "working" line for each step of the analysis loop
struct ProgressPrinter;

#[async_trait]
impl RunObserver for ProgressPrinter {
    async fn on_turn(&self, turn: usize, max_turns: usize) {
        println!("  ... thinking (turn {turn}/{max_turns})");
    }

    async fn on_capability_start(&self, name: &str, argument: &str) {
        println!("  ... {name} on {argument}");
    }

    async fn on_capability_done(&self, call: &CapabilityCall) {
        if call.rejected {
            println!("  ... {} rejected, asking the model to retry", call.capability);
        }
    }
}

fn print_banner() {
    println!(
        r"
=== Market Scout AI Terminal ===
Type /scout <TICKER> to generate a report, then ask questions about it.
Type /help for all commands.
"
    );
}

async fn scout(service: &ScoutService, ticker: &Ticker) {
    println!("Scouting {ticker}... Analyzing charts and reading news...");

    match service.snapshot(ticker).await {
        Ok(snap) => {
            let change = snap
                .change
                .map_or_else(|| "n/a".to_string(), |c| format!("{c:+.2}"));
            println!(
                "Current Price: ${:.2} ({change})   Trading Volume: {}   Data Period: 1 Month",
                snap.price, snap.volume
            );
        }
        Err(e) => println!("(no market snapshot: {e})"),
    }

    match service.scout_observed(ticker, Arc::new(ProgressPrinter)).await {
        Ok(outcome) => {
            if outcome.cached {
                println!("(served from cache)");
            }
            println!(
                "\n### Scout's Final Recommendation\n{}\n",
                escape_dollars(&outcome.report.synthesized_text)
            );
            if let Some(greeting) = service.session().await.chat_log().first() {
                println!("Scout: {}\n", greeting.content);
            }
        }
        Err(e) if e.is_timeout() => {
            eprintln!("Analysis failed: the analyst could not finish a report ({e}).\n");
        }
        Err(e) => eprintln!("An error occurred: {e}\n"),
    }
}

/// Returns false when the terminal should exit
async fn handle(service: &ScoutService, command: Command) -> bool {
    match command {
        Command::Scout { ticker } => scout(service, &ticker).await,
        Command::Ask { question } => {
            println!("Thinking...");
            match service.ask(&question).await {
                Ok(answer) => println!("Scout: {}\n", escape_dollars(&answer)),
                Err(ScoutError::NoContext) => println!(
                    "Generate a market report first so I have context to chat with you about!\n"
                ),
                Err(e) => eprintln!("Error: {e}\n"),
            }
        }
        Command::Trade { action, shares } => match service.paper_trade(action, shares).await {
            Ok(trade) => println!("{}\n", trade.confirmation()),
            Err(ScoutError::NoContext) => println!(
                "Run a scan on a ticker first to unlock trading options.\n"
            ),
            Err(e) => eprintln!("Error: {e}\n"),
        },
        Command::Report => match service.latest_report().await {
            Some(report) => println!(
                "Report on {} ({}):\n{}\n",
                report.ticker,
                report.generated_at.format("%Y-%m-%d %H:%M UTC"),
                escape_dollars(&report.synthesized_text)
            ),
            None => println!("No report yet. Try /scout TSLA\n"),
        },
        Command::Trace => match service.last_trace().await {
            Some(trace) if !trace.is_empty() => {
                for (i, call) in trace.calls().iter().enumerate() {
                    let status = if call.rejected { "rejected" } else { "ok" };
                    println!(
                        "{}. {}({}) [{status}, {} ms]\n{}",
                        i + 1,
                        call.capability,
                        call.input,
                        call.duration_ms,
                        call.output.trim_end()
                    );
                }
                println!();
            }
            _ => println!("No capability calls recorded yet.\n"),
        },
        Command::Help => println!("{}", Command::help_text()),
        Command::Exit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scout_utils::init_tracing();
    let args = Args::parse();

    let mut builder = ScoutConfig::builder();
    if let Some(model) = args.model {
        builder = builder.model(model);
    }
    if let Some(turns) = args.max_turns {
        builder = builder.max_turns(turns);
    }
    let config = builder.with_env()?.build()?;

    print_banner();
    println!("Model: {}  Turn budget: {}\n", config.model, config.max_turns);

    let service = ScoutService::from_config(config)?;

    if let Some(raw) = args.ticker {
        match Ticker::parse(&raw) {
            Ok(ticker) => scout(&service, &ticker).await,
            Err(e) => eprintln!("Error: {e}\n"),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("scout> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        if input.trim().is_empty() {
            continue;
        }

        match Command::parse(&input) {
            Ok(command) => {
                if !handle(&service, command).await {
                    println!("Goodbye!");
                    break;
                }
            }
            Err(e) => eprintln!("{e}\n"),
        }
    }

    Ok(())
}
