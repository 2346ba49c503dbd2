use anyhow::{Context, Result};
use colored::*;
use flasharray_client::api::FlashArrayClient;

pub fn version_command(client: &FlashArrayClient) -> Result<()> {
    println!("{}", client.get_rest_version());
    Ok(())
}

/// Supported REST versions, marking the one this client uses
pub async fn versions_command(client: &FlashArrayClient) -> Result<()> {
    let versions = client
        .supported_rest_versions()
        .await
        .with_context(|| format!("Failed to query REST versions of {}", client.target()))?;

    for version in versions {
        if version == client.get_rest_version() {
            println!("{} {}", version.bright_green().bold(), "(in use)".dimmed());
        } else {
            println!("{}", version);
        }
    }
    Ok(())
}
