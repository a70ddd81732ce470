//! Handler for the `adapters` command.

use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::DEFAULT_ENABLED;
use crate::application::AdapterInfo;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::factory::{build_adapters, build_transports};

#[derive(Tabled)]
struct AdapterRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Venue")]
    label: &'static str,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Default")]
    default: &'static str,
}

/// Registered adapters; `enabled` marks the default selection.
pub fn catalog() -> Result<Vec<AdapterInfo>> {
    let transports = build_transports()?;
    Ok(build_adapters(&Config::default(), &transports)
        .iter()
        .map(|adapter| AdapterInfo {
            id: adapter.id().clone(),
            label: adapter.label(),
            kind: adapter.kind(),
            enabled: DEFAULT_ENABLED.contains(&adapter.id().as_str()),
        })
        .collect())
}

/// List registered adapters.
pub fn execute() -> Result<()> {
    let adapters = catalog()?;

    if output::is_json() {
        for info in &adapters {
            output::json_output(json!({ "type": "adapter", "payload": info }));
        }
        return Ok(());
    }

    let rows: Vec<AdapterRow> = adapters
        .iter()
        .map(|info| AdapterRow {
            id: info.id.to_string(),
            label: info.label,
            kind: info.kind.as_str(),
            default: if info.enabled { "yes" } else { "no" },
        })
        .collect();

    output::section("Adapters");
    output::lines(&Table::new(rows).with(Style::rounded()).to_string());
    Ok(())
}
