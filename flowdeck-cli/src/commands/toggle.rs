//! `flowdeck toggle`

use anyhow::Context;

use flowdeck_lib::model::FlowStatus;

use crate::config::Settings;

pub async fn run(settings: &Settings, flow_id: &str, status: FlowStatus) -> anyhow::Result<()> {
    let client = super::client(settings).context("failed to create API client")?;
    let flow = client
        .change_status(flow_id, status)
        .await
        .with_context(|| format!("failed to change status of flow {}", flow_id))?;

    println!(
        "{} ({}) is now {}",
        flow.display_name(),
        flow.id,
        flow.status.label()
    );
    Ok(())
}
