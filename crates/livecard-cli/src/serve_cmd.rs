//! `livecard serve`: run the request protocol over stdin/stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;

use livecard_core::protocol;
use livecard_core::{LiveActivities, SimulatedHost};

use crate::config::LivecardConfig;

/// Build the facade for the resolved config.
pub fn build_facade(config: &LivecardConfig) -> LiveActivities {
    let host = SimulatedHost::with_version(&config.host_platform, config.host_version);
    LiveActivities::new(Arc::new(host), config.capability.clone())
}

pub async fn run_serve(config: &LivecardConfig) -> Result<()> {
    let facade = build_facade(config);
    info!(
        platform = %config.host_platform,
        version = %config.host_version,
        supported = facade.is_supported(),
        "serving live activity requests on stdin"
    );

    protocol::serve(&facade, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("request stream failed")?;

    let left = facade.get_all_activities().await.len();
    info!(live = left, "input closed, discarding live activities");
    Ok(())
}
