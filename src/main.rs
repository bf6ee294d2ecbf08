use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use mdx_rs::engine::types::History;
use mdx_rs::engine::walk::RandomWalkEngine;
use mdx_rs::instruments;
use mdx_rs::market_data::adapters::indian_api::{IndianStockApi, DEFAULT_BASE_URL};
use mdx_rs::market_data::adapters::{MarketDataSource, Offline};
use mdx_rs::market_data::aggregator::Aggregator;
use mdx_rs::market_data::cache::FreshnessCache;
use mdx_rs::market_data::selector::SourceSelector;

fn print_history(history: &History) {
    println!(
        "{} [{}] - {} candles ({})",
        history.symbol,
        history.period,
        history.candles.len(),
        history.source
    );
    if let (Some(first), Some(last)) = (history.candles.first(), history.candles.last()) {
        println!(
            "  first: t={} o={:.2} h={:.2} l={:.2} c={:.2} v={}",
            first.time, first.open, first.high, first.low, first.close, first.volume
        );
        println!(
            "  last:  t={} o={:.2} h={:.2} l={:.2} c={:.2} v={}",
            last.time, last.open, last.high, last.low, last.close, last.volume
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env
    mdx_rs::telemetry::init_tracing("info");
    mdx_rs::telemetry::init_metrics();

    // With no api key configured every request is served synthetically.
    let source: Arc<dyn MarketDataSource> = match env::var("MDX_API_KEY") {
        Ok(key) => {
            let base = env::var("MDX_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
            println!("Using external market data api at {base}");
            Arc::new(IndianStockApi::new(base, key)?)
        }
        Err(_) => {
            println!("No MDX_API_KEY set - running in offline educational mode");
            Arc::new(Offline)
        }
    };

    let selector = Arc::new(SourceSelector::new(
        source,
        FreshnessCache::default(),
        RandomWalkEngine::new(),
    ));
    let aggregator = Aggregator::new(Arc::clone(&selector));

    loop {
        print!("\nMDX CLI> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let parts: Vec<&str> = input.trim().split_whitespace().collect();
        let command = parts.first().map(|c| c.to_lowercase()).unwrap_or_default();

        match command.as_str() {
            "help" | "h" => {
                println!("Available commands:");
                println!("  quote <SYMBOL>            - Current quote (api or synthetic)");
                println!("  history <SYMBOL> [period] - Candle history (1d 1w 1m 3m 1y)");
                println!("  chart <SYMBOL> [period]   - Educational chart series");
                println!("  trending                  - Top gainers and losers");
                println!("  news                      - Market news");
                println!("  bulk <SYM,SYM,...>        - Composite quotes+trending+news");
                println!("  tip                       - Random educational tip");
                println!("  quit, q                   - Exit");
            }
            "quote" => {
                if let Some(symbol) = parts.get(1) {
                    let quote = selector.get_quote(symbol).await;
                    println!("{}", serde_json::to_string_pretty(&quote)?);
                } else {
                    println!("Usage: quote <SYMBOL>");
                }
            }
            "history" => {
                if let Some(symbol) = parts.get(1) {
                    let period = parts.get(2).copied().unwrap_or("1d");
                    let history = selector.get_history(symbol, period).await;
                    print_history(&history);
                } else {
                    println!("Usage: history <SYMBOL> [period]");
                }
            }
            "chart" => {
                if let Some(symbol) = parts.get(1) {
                    let period = parts.get(2).copied().unwrap_or("1d");
                    let chart = selector.get_chart(symbol, period);
                    print_history(&chart);
                } else {
                    println!("Usage: chart <SYMBOL> [period]");
                }
            }
            "trending" => {
                let trending = selector.get_trending().await;
                println!("{}", serde_json::to_string_pretty(&trending)?);
            }
            "news" => {
                let news = selector.get_news().await;
                for item in &news.items {
                    println!("[{}] {} - {}", item.timestamp, item.title, item.summary);
                }
                println!("(source: {})", news.source);
            }
            "bulk" => {
                if let Some(list) = parts.get(1) {
                    let symbols: Vec<String> = list
                        .split(',')
                        .map(|s| s.trim().to_uppercase())
                        .filter(|s| !s.is_empty())
                        .collect();
                    let response = aggregator.bulk(&symbols).await;
                    println!("{}", serde_json::to_string_pretty(&response)?);
                } else {
                    println!("Usage: bulk <SYM,SYM,...>");
                }
            }
            "tip" => {
                println!("{}", instruments::random_tip());
            }
            "quit" | "q" | "exit" => {
                println!("Goodbye!");
                break;
            }
            "" => continue,
            _ => {
                println!("Unknown command. Type 'help' for available commands.");
            }
        }
    }

    Ok(())
}
