use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::types::Role;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a bearer token for a user id and role")]
    Issue {
        #[arg(long, help = "User id placed in the token")]
        user_id: i64,
        #[arg(long, help = "STUDENT, INSTRUCTOR or ADMIN")]
        role: String,
        #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user_id, role, hours } => {
            let role: Role = role.parse().map_err(anyhow::Error::msg)?;
            let claims = match hours {
                Some(hours) => Claims::with_expiry(user_id, role, hours),
                None => Claims::new(user_id, role),
            };
            let token = generate_jwt(&claims).context("failed to sign token")?;

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Token issued",
                    Some(json!({ "token": token, "userId": user_id, "role": role, "exp": claims.exp })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}
