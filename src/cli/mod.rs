pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coursehub")]
#[command(about = "CourseHub operator CLI")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Database migrations and connectivity")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Sign access tokens with the configured secret")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Check a running API server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_issue_with_global_json_flag() {
        let cli = Cli::try_parse_from(["coursehub", "token", "issue", "--user-id", "7", "--role", "ADMIN", "--json"])
            .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Token {
                cmd: commands::token::TokenCommands::Issue { user_id, role, .. },
            } => {
                assert_eq!(user_id, 7);
                assert_eq!(role, "ADMIN");
            }
            _ => panic!("expected token issue"),
        }
    }

    #[test]
    fn server_health_has_default_url() {
        let cli = Cli::try_parse_from(["coursehub", "server", "health"]).unwrap();
        match cli.command {
            Commands::Server {
                cmd: commands::server::ServerCommands::Health { url },
            } => assert_eq!(url, "http://127.0.0.1:3000"),
            _ => panic!("expected server health"),
        }
    }
}
