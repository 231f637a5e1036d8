//! News command handler.

use clap::Args;
use mandi_core::{config::AppConfig, AppResult};
use mandi_feeds::{create_news_cache, create_news_source, NewsSource};
use mandi_reply::render_news;

/// Show the latest agriculture headlines
#[derive(Args, Debug)]
pub struct NewsCommand {
    /// Print links as text instead of HTML markup
    #[arg(long)]
    pub plain: bool,
}

impl NewsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing news command");

        let source = create_news_source(config)?;
        let cache = create_news_cache(config);

        let rendered = cache
            .get(|| async move { source.fetch_digest().await.map(|d| render_news(&d)) })
            .await;

        if self.plain {
            println!("{}", rendered.plain);
        } else {
            println!("{}", rendered.rich);
        }

        Ok(())
    }
}
