use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::Value;

use crate::cli::config::ApiTarget;
use crate::cli::utils::account_line;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "List accounts visible to the token's caller")]
    List {
        #[arg(long, help = "JSON object of field filters, e.g. '{\"city\":\"Pune\",\"limit\":20}'")]
        filters: Option<String>,
        #[arg(long = "filter-op", help = "JSON object of field operators, e.g. '{\"city\":\"eq\"}'")]
        filter_op: Option<String>,
        #[arg(long, help = "Bearer token (defaults to CRM_TOKEN)")]
        token: Option<String>,
    },
}

pub async fn handle(cmd: AccountCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AccountCommands::List { filters, filter_op, token } => {
            let target = ApiTarget::from_env().with_token(token);
            let body = list(&target, filters, filter_op).await?;
            print_listing(&body, &output_format)
        }
    }
}

async fn list(target: &ApiTarget, filters: Option<String>, filter_op: Option<String>) -> anyhow::Result<Value> {
    let token = target.token.as_deref().ok_or_else(|| anyhow!("No token: pass --token or set CRM_TOKEN"))?;

    let mut query = Vec::new();
    if let Some(filters) = filters {
        query.push(("filters", filters));
    }
    if let Some(filter_op) = filter_op {
        query.push(("filter_op", filter_op));
    }

    let response = reqwest::Client::new()
        .get(target.url("/api/accounts/list"))
        .bearer_auth(token)
        .query(&query)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", target.base_url))?;

    let status = response.status();
    let body: Value = response.json().await.context("Response was not JSON")?;
    if !status.is_success() {
        let message = body.get("message").and_then(Value::as_str).unwrap_or("request failed");
        return Err(anyhow!("{} ({})", message, status));
    }
    Ok(body)
}

fn print_listing(body: &Value, output_format: &OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(body)?),
        OutputFormat::Text => {
            let rows = body.get("data").and_then(Value::as_array).cloned().unwrap_or_default();
            if rows.is_empty() {
                println!("No accounts found");
                return Ok(());
            }
            for row in &rows {
                println!("{}", account_line(row));
            }
            println!(
                "{} of {} (offset {}, limit {})",
                rows.len(),
                body.get("total").unwrap_or(&Value::Null),
                body.get("offset").unwrap_or(&Value::Null),
                body.get("limit").unwrap_or(&Value::Null)
            );
        }
    }
    Ok(())
}
