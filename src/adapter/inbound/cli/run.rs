//! Handler for the `run` command.

use std::path::Path;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::command::{RunArgs, DEFAULT_CONFIG};
use crate::adapter::inbound::cli::{board, output};
use crate::application::DashboardView;
use crate::domain::AdapterId;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::{Config, REFRESH_INTERVAL_CHOICES};
use crate::infrastructure::factory::{build_monitor, build_transports};

/// Minimum gap between two printed boards.
const RENDER_THROTTLE: Duration = Duration::from_secs(1);

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, args);
    config.validate()?;

    config.init_logging();
    if !config.monitor.has_standard_interval() {
        warn!(
            interval_secs = config.monitor.refresh_interval_secs,
            choices = ?REFRESH_INTERVAL_CHOICES,
            "Refresh interval is not one of the offered choices"
        );
    }

    if !output::is_quiet() {
        print_startup(&config);
    }

    let transports = build_transports()?;
    let (monitor, handle) = build_monitor(&config, &transports);
    let task = tokio::spawn(monitor.run());
    info!("fundarb started");

    tokio::select! {
        () = render_loop(handle.subscribe(), config.monitor.max_rows) => {
            warn!("Monitor stopped unexpectedly");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Shutdown signal received");
        }
    }

    handle.shutdown();
    if let Err(e) = task.await {
        warn!(error = %e, "Monitor task failed");
    }
    info!("fundarb stopped");
    Ok(())
}

/// Load the config file; a missing default file means defaults.
fn load_config(path: &Path) -> Result<Config> {
    match Config::load(path) {
        Err(crate::error::Error::Config(ConfigError::ReadFile(e)))
            if e.kind() == std::io::ErrorKind::NotFound && path == Path::new(DEFAULT_CONFIG) =>
        {
            Ok(Config::default())
        }
        other => other,
    }
}

/// Fold command-line flags into `config`.
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(secs) = args.interval {
        config.monitor.refresh_interval_secs = secs;
    }
    if let Some(ranking) = args.ranking {
        config.monitor.ranking = ranking;
    }
    if let Some(enable) = &args.enable {
        config.monitor.enabled = enable
            .iter()
            .map(|id| id.trim().to_ascii_lowercase())
            .filter(|id| !id.is_empty())
            .map(AdapterId::new)
            .collect();
    }
    if let Some(max_rows) = args.max_rows {
        config.monitor.max_rows = max_rows;
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
}

fn print_startup(config: &Config) {
    let monitor = &config.monitor;
    let enabled: Vec<&str> = monitor.enabled.iter().map(AdapterId::as_str).collect();

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Adapters", enabled.join(", "));
    output::field("Ranking", monitor.ranking);
    if monitor.refresh_interval_secs == 0 {
        output::field("Interval", "off");
    } else {
        output::field("Interval", format!("{}s", monitor.refresh_interval_secs));
    }
    output::hint("press Ctrl-C to stop");
}

/// Print the board on every view change, at most once per [`RENDER_THROTTLE`].
///
/// Returns when the monitor drops its side of the channel.
async fn render_loop(mut views: watch::Receiver<DashboardView>, max_rows: usize) {
    while views.changed().await.is_ok() {
        let view = views.borrow_and_update().clone();
        board::print(&view, max_rows);
        tokio::time::sleep(RENDER_THROTTLE).await;
    }
}
