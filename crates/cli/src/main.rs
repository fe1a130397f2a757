//! Terminal front-end for the watchlist core.
//!
//! Drives one session end to end: optionally creates a watchlist, runs a
//! catalog search, selects a symbol into the current watchlist and prints
//! live quotes until `--ticks` quotes have arrived or Ctrl-C is pressed.
//! Errors from any part of the session are printed as they are published.
use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use watchlist_core::errors::CoreError;
use watchlist_core::models::settings::Settings;
use watchlist_core::models::symbol::Symbol;
use watchlist_core::models::watchlist::Watchlist;
use watchlist_core::WatchlistSession;

mod args;
mod telemetry;

use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_logging();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "watchlist client failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), CoreError> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::default(),
    };
    if let Some(store) = args.store {
        settings.store_path = Some(store);
    }
    if let Some(ms) = args.interval_ms {
        settings.poll_interval_ms = ms;
    }

    let session = WatchlistSession::from_settings(settings).await?;
    let mut errors = session.subscribe_errors();
    let mut quotes = session.subscribe_quotes();

    if let Some(name) = args.watchlist {
        let watchlist = Watchlist::new(name);
        match session.add_watchlist(watchlist.clone()).wait().await {
            Ok(stored) => println!("Watchlist: {} (id {})", stored.name, stored.id),
            // Reuse an existing watchlist of the same name.
            Err(CoreError::DuplicateWatchlist(_)) => {
                let _ = errors.try_next();
                session
                    .subscribe_watchlists()
                    .wait_for(|all| all.contains(&watchlist))
                    .await;
                session.select_watchlist(watchlist.clone())?;
                println!("Watchlist: {}", watchlist.name);
            }
            Err(e) => return Err(e),
        }
    }

    let mut symbol = args.symbol;
    if let Some(query) = args.search {
        let results = session.search(query).wait().await?;
        for found in &results {
            println!(
                "  {:<8} {}",
                found.name,
                found.description.as_deref().unwrap_or("")
            );
        }
        if symbol.is_none() {
            symbol = results.first().map(|s| s.name.clone());
        }
    }

    let Some(symbol) = symbol else {
        println!("Nothing to poll; pass --symbol or --search.");
        session.shutdown();
        return Ok(());
    };

    let current = session.current_watchlist();
    session.select_symbol(Symbol::new(symbol.as_str(), current.clone()));
    println!(
        "Polling {symbol} in \"{}\" every {} ms",
        current.name,
        session.settings().poll_interval_ms
    );
    session.start_quote_polling(&symbol);

    let mut received = 0;
    while received < args.ticks {
        tokio::select! {
            update = quotes.next() => match update {
                Some(update) => {
                    received += 1;
                    println!(
                        "{} {:<6} last {:>10.2}  ask {:>10.2}  bid {:>10.2}",
                        update.received_at.format("%H:%M:%S"),
                        update.symbol,
                        update.quote.last_price,
                        update.quote.ask_price,
                        update.quote.bid_price,
                    );
                }
                None => break,
            },
            notice = errors.next() => match notice {
                Some(notice) => eprintln!("error: {notice}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.shutdown();
    Ok(())
}
