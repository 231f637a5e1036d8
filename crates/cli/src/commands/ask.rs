//! Ask command handler.
//!
//! Answers a single query and exits.

use clap::Args;
use mandi_core::{config::AppConfig, AppError, AppResult};

/// Answer a single query
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The query, e.g. "rate of kanda"
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Print links as text instead of HTML markup
    #[arg(long)]
    pub plain: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "plain")]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = self.query.join(" ");
        if query.trim().is_empty() {
            return Err(AppError::Config("No query provided".to_string()));
        }

        let responder = super::build_responder(config)?;
        let reply = responder.respond(&query).await;

        if self.json {
            println!("{}", super::to_json(&reply)?);
        } else {
            println!("{}", reply.text(!self.plain));
        }

        Ok(())
    }
}
