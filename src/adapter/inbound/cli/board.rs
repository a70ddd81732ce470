//! Rendering of the ranked board.

use serde_json::{json, Value};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::trade_url;
use crate::application::{AdapterState, DashboardView};
use crate::domain::{format_percent, ArbitrageRow};

const PERCENT_DECIMALS: usize = 4;

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Long")]
    long_exchange: String,
    #[tabled(rename = "Long 1h")]
    long_rate: String,
    #[tabled(rename = "Period")]
    long_period: String,
    #[tabled(rename = "Short")]
    short_exchange: String,
    #[tabled(rename = "Short 1h")]
    short_rate: String,
    #[tabled(rename = "Period")]
    short_period: String,
    #[tabled(rename = "Diff 1h")]
    diff: String,
}

impl From<&ArbitrageRow> for BoardRow {
    fn from(row: &ArbitrageRow) -> Self {
        let diff = format_percent(row.diff_per_hour, PERCENT_DECIMALS);
        Self {
            symbol: row.symbol.clone(),
            long_exchange: row.long_exchange.clone(),
            long_rate: format_percent(row.long_rate_per_hour, PERCENT_DECIMALS),
            long_period: row.long_period.clone(),
            short_exchange: row.short_exchange.clone(),
            short_rate: format_percent(row.short_rate_per_hour, PERCENT_DECIMALS),
            short_period: row.short_period.clone(),
            diff: if row.diff_per_hour >= 0.0 {
                output::positive(diff)
            } else {
                output::negative(diff)
            },
        }
    }
}

fn visible_rows(rows: &[ArbitrageRow], max_rows: usize) -> &[ArbitrageRow] {
    if max_rows == 0 {
        rows
    } else {
        &rows[..rows.len().min(max_rows)]
    }
}

/// Render the ranked rows as a table.
#[must_use]
pub fn render_table(rows: &[ArbitrageRow], max_rows: usize) -> String {
    let rows: Vec<BoardRow> = visible_rows(rows, max_rows).iter().map(BoardRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// One status entry, e.g. `● Lighter: open`.
#[must_use]
pub fn render_status(state: &AdapterState) -> String {
    let dot = if state.status.is_healthy() {
        output::positive("●")
    } else {
        output::negative("●")
    };
    format!("{dot} {}: {}", state.label, state.status)
}

/// Board payload for JSON output, with trading links per leg.
#[must_use]
pub fn board_json(view: &DashboardView, max_rows: usize) -> Value {
    let rows: Vec<Value> = visible_rows(&view.rows, max_rows)
        .iter()
        .map(|row| {
            json!({
                "symbol": row.symbol,
                "long_exchange": row.long_exchange,
                "long_rate_per_hour": row.long_rate_per_hour,
                "long_period": row.long_period,
                "long_url": trade_url(&row.long_exchange, &row.symbol),
                "short_exchange": row.short_exchange,
                "short_rate_per_hour": row.short_rate_per_hour,
                "short_period": row.short_period,
                "short_url": trade_url(&row.short_exchange, &row.symbol),
                "diff_per_hour": row.diff_per_hour,
            })
        })
        .collect();

    json!({
        "type": "board",
        "payload": {
            "rows": rows,
            "total_rows": view.rows.len(),
            "adapters": view.adapters,
            "interval_secs": view.interval_secs,
            "ranking": view.ranking,
            "last_update": view.last_update,
        },
    })
}

/// Print the board for `view`.
pub fn print(view: &DashboardView, max_rows: usize) {
    if output::is_json() {
        output::json_output(board_json(view, max_rows));
        return;
    }

    output::section(&format!("Funding arbitrage ({})", view.ranking));
    if view.rows.is_empty() {
        output::hint("waiting for data...");
    } else {
        output::lines(&render_table(&view.rows, max_rows));
        let shown = visible_rows(&view.rows, max_rows).len();
        if shown < view.rows.len() {
            output::hint(&format!("{shown} of {} rows shown", view.rows.len()));
        }
    }

    let statuses: Vec<String> = view.adapters.iter().map(render_status).collect();
    output::field("Adapters", statuses.join("  "));
    let updated = view.last_update.map_or_else(
        || output::muted("waiting"),
        |t| t.format("%H:%M:%S UTC").to_string(),
    );
    output::field("Updated", updated);
}
