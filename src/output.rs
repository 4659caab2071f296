use itertools::Itertools;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::analysis::{MarketAnalysis, ScoredAnalysis};
use crate::data::ScoredLevel;

#[derive(Tabled)]
struct LevelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Strength")]
    strength: &'static str,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Confluence")]
    description: String,
    #[tabled(rename = "Sources")]
    sources: String,
}

#[derive(Tabled)]
struct AdjustmentRow {
    #[tabled(rename = "Adjustment")]
    name: &'static str,
    #[tabled(rename = "Impact")]
    impact: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Both engine outputs, as handed to downstream consumers.
#[derive(Serialize)]
pub struct Report<'a> {
    pub market: &'a MarketAnalysis,
    pub levels: &'a ScoredAnalysis,
}

pub fn render_json(market: &MarketAnalysis, levels: &ScoredAnalysis) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Report { market, levels })
}

fn level_table(levels: &[ScoredLevel]) -> Table {
    let rows: Vec<LevelRow> = levels
        .iter()
        .map(|level| LevelRow {
            id: level.id.clone(),
            price: format!("{:.2}", level.price),
            zone: format!("{:.2} - {:.2}", level.zone.low, level.zone.high),
            score: format!("{:.1}", level.score),
            strength: level.strength.as_str(),
            distance: format!("{:.2}%", level.distance_percent),
            description: level.factors.highlights().join(", "),
            sources: level.sources.iter().map(|source| source.as_str()).join("+"),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table
}

pub fn print_report(market: &MarketAnalysis, levels: &ScoredAnalysis) {
    let indicators = &market.indicators;
    println!("\n=== Confluence Levels: {} ({}) ===\n", market.symbol, market.timeframe);
    println!(
        "Current Price: {:.2} ({:+.2}, {:+.2}%) over {} bars",
        market.current_price, market.price_change, market.price_change_percent, market.bar_count
    );
    println!(
        "Trend: {} (strength {}) | Bias: {:?} | {}",
        indicators.trend.direction.as_str(),
        indicators.trend.strength,
        indicators.trend.bias,
        indicators.trend.bias_reason
    );
    println!(
        "ATR: {:.2} ({:.2}%, {:?} volatility)",
        indicators.atr.atr, indicators.atr.atr_percent, indicators.atr.regime
    );
    println!(
        "Bollinger: {:.2} / {:.2} / {:.2} | %B {:.2}{}",
        indicators.bollinger.lower,
        indicators.bollinger.middle,
        indicators.bollinger.upper,
        indicators.bollinger.percent_b,
        if indicators.bollinger.squeeze { " | squeeze" } else { "" }
    );
    println!(
        "Extension vs EMA{}: {:+.2} ATR ({:?})",
        indicators.overextension.ema_period,
        indicators.overextension.atr_distance,
        indicators.overextension.status
    );
    if let Some(fib) = &indicators.fibonacci {
        println!(
            "Fibonacci: {:.2} ({}) -> {:.2} ({}) | retraced {:.1}%",
            fib.swing_low,
            fib.swing_low_date,
            fib.swing_high,
            fib.swing_high_date,
            fib.current_retracement * 100.0
        );
    }

    for (title, side) in [
        ("Resistance", &levels.display_resistance),
        ("Support", &levels.display_support),
    ] {
        if side.is_empty() {
            println!("\nNo {} levels identified.", title.to_lowercase());
        } else {
            println!("\n{title}\n{}", level_table(side));
        }
    }

    let rows: Vec<AdjustmentRow> = levels
        .confidence
        .adjustments
        .iter()
        .map(|adj| AdjustmentRow {
            name: adj.name,
            impact: format!("{:+.0}", adj.impact),
            reason: adj.reason.clone(),
        })
        .collect();
    println!(
        "\nConfidence: {:.0} ({})",
        levels.confidence.score,
        levels.confidence.label.as_str()
    );
    if !rows.is_empty() {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}\n");
    }
}
