//! Chat command handler.
//!
//! Line-by-line conversation over stdin/stdout. Each line is answered
//! before the next is read.

use clap::Args;
use mandi_core::{config::AppConfig, AppResult};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Instrument;

const GREETING: &str = "🙏 Namaskar! Ask me for crop rates (e.g. 'rate of kanda'), \
                        the weather, or the latest agriculture news. Type 'exit' to leave.";

/// Interactive conversation on stdin/stdout
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Print links as text instead of HTML markup
    #[arg(long)]
    pub plain: bool,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let responder = super::build_responder(config)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut count = 0usize;

        println!("{}", GREETING);
        prompt()?;

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if is_exit(line) {
                break;
            }

            if !line.is_empty() {
                count += 1;
                let reply = responder
                    .respond(line)
                    .instrument(tracing::debug_span!("message", n = count))
                    .await;
                println!("{}\n", reply.text(!self.plain));
            }

            prompt()?;
        }

        tracing::info!("Chat ended after {} messages", count);
        Ok(())
    }
}

fn prompt() -> AppResult<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit" | "bye")
}
