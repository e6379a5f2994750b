use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from the /health endpoint")]
    Health {
        #[arg(long, default_value = "http://127.0.0.1:3000", help = "Server base URL")]
        url: String,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let endpoint = format!("{}/health", url.trim_end_matches('/'));
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()?;

            let response = client
                .get(&endpoint)
                .send()
                .await
                .with_context(|| format!("could not reach {}", endpoint))?;
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);

            if status.is_success() {
                output_success(
                    output_format,
                    &format!("{} is healthy", url),
                    Some(json!({ "status": status.as_u16(), "health": body })),
                )
            } else {
                output_error(output_format, &format!("{} answered {}", endpoint, status))?;
                anyhow::bail!("server unhealthy")
            }
        }
    }
}
