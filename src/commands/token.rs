use anyhow::{Context, Result};
use flasharray_client::api::FlashArrayClient;

pub async fn token_command(client: &FlashArrayClient, refresh: bool) -> Result<()> {
    let token = client
        .get_access_token(refresh)
        .await
        .context("Failed to obtain access token")?;
    println!("{}", token);
    Ok(())
}
