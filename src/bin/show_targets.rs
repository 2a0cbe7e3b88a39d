//! Print the configured watchlist and its price targets
//!
//! Usage:
//!   cargo run --bin show_targets
//!   CONFIG_PATH=other.yaml cargo run --bin show_targets
//!
//! Loads and validates the same YAML file the monitor uses, so this also
//! works as a configuration check.

use std::path::Path;

use price_watch::config::{self, constants, AppConfig};
use price_watch::core::format_usd;

fn render_table(config: &AppConfig) -> String {
    let rows: Vec<(String, String, String)> = config
        .items
        .iter()
        .flat_map(|item| {
            item.thresholds.iter().enumerate().map(move |(index, level)| {
                let label = if index == 0 {
                    format!("{} ({})", item.symbol, item.display_name())
                } else {
                    String::new()
                };
                (label, level.title(), format_usd(level.price))
            })
        })
        .collect();

    let width = |f: fn(&(String, String, String)) -> &String, header: &str| {
        rows.iter()
            .map(|r| f(r).chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0)
    };
    let coin_w = width(|r| &r.0, "Coin");
    let level_w = width(|r| &r.1, "Level");
    let price_w = width(|r| &r.2, "Target");

    let mut out = String::new();
    out.push_str(&format!(
        "{:<coin_w$}  {:<level_w$}  {:>price_w$}\n",
        "Coin", "Level", "Target"
    ));
    out.push_str(&format!("{}\n", "=".repeat(coin_w + level_w + price_w + 4)));
    for (coin, level, price) in &rows {
        out.push_str(&format!("{:<coin_w$}  {:<level_w$}  {:>price_w$}\n", coin, level, price));
    }
    out.push_str(&format!(
        "\nChecking every {} minutes against {} ({})\n",
        config.check_interval_minutes, config.quotes.base_url, config.quotes.vs_currency
    ));
    out
}

fn main() {
    dotenvy::dotenv().ok();

    let path = constants::config_path();
    match config::load_config(Path::new(&path)) {
        Ok(config) => {
            println!("📊 Current Cryptocurrency Configuration ({})\n", path);
            print!("{}", render_table(&config));
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
