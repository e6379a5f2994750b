use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply pending migrations")]
    Migrate,

    #[command(about = "Check that the database accepts connections")]
    Ping,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let db = DatabaseManager::connect(config)
        .await
        .context("failed to connect to database")?;

    match cmd {
        DbCommands::Migrate => {
            db.run_migrations().await.context("migration failed")?;
            output_success(output_format, "Migrations applied", None)
        }
        DbCommands::Ping => match db.health_check().await {
            Ok(()) => output_success(output_format, "Database reachable", Some(json!({ "database": "ok" }))),
            Err(e) => {
                output_error(output_format, &format!("Database unreachable: {}", e))?;
                anyhow::bail!("database ping failed")
            }
        },
    }
}
