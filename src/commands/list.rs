use crate::cli::app::ListArgs;
use anyhow::{Context, Result};
use colored::*;
use flasharray_client::api::endpoints::list_endpoint;
use flasharray_client::api::{ApiResult, CallArguments, FlashArrayClient};
use log::info;
use serde_json::{Value, json};

/// List the items of a resource group as pretty JSON
pub async fn list_command(client: &FlashArrayClient, args: ListArgs) -> Result<()> {
    info!("Listing {}", args.group);

    let mut call = CallArguments::new();
    if !args.names.is_empty() {
        call = call.names(args.names);
    }
    if !args.ids.is_empty() {
        call = call.ids(args.ids);
    }
    if !args.sort.is_empty() {
        call = call.sort(args.sort);
    }
    if let Some(filter) = args.filter {
        call = call.filter(filter);
    }
    if let Some(limit) = args.limit {
        call = call.limit(limit);
    }

    let result = client
        .call(list_endpoint(args.group), call)
        .await
        .with_context(|| format!("Failed to list {}", args.group))?;

    let valid = match result {
        ApiResult::Valid(valid) => valid,
        ApiResult::Error(error) => {
            eprintln!("{} HTTP {}", "✗".bright_red().bold(), error.status_code);
            for entry in &error.errors {
                eprintln!("  {}", entry.to_string().red());
            }
            anyhow::bail!("Listing {} failed with HTTP {}", args.group, error.status_code);
        }
    };

    if let Some(errors) = &valid.errors {
        for entry in errors {
            eprintln!("{} {}", "!".bright_yellow().bold(), entry.to_string().yellow());
        }
    }

    let total_item_count = valid.total_item_count;
    let continuation_token = valid.continuation_token.clone();
    let items: Vec<Value> = match valid.into_items() {
        Some(mut pager) if args.all => {
            let mut items = Vec::new();
            while let Some(item) = pager.next().await? {
                items.push(item);
            }
            items
        }
        Some(mut pager) => {
            let mut items = Vec::with_capacity(pager.buffered());
            while pager.buffered() > 0 {
                if let Some(item) = pager.next().await? {
                    items.push(item);
                }
            }
            items
        }
        None => Vec::new(),
    };

    println!("{}", serde_json::to_string_pretty(&json!(items))?);

    let mut summary = format!("{} {} item(s)", "✓".bright_green().bold(), items.len());
    if let Some(total) = total_item_count {
        summary.push_str(&format!(" of {}", total));
    }
    if !args.all {
        if let Some(token) = continuation_token {
            summary.push_str(&format!(", more available (token {})", token.dimmed()));
        }
    }
    eprintln!("{}", summary);

    Ok(())
}
