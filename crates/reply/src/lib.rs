//! Query understanding and reply rendering.
//!
//! [`QueryParser`] turns free text into an [`Intent`], the `format` module
//! renders tables, digests and prompts, and [`Responder`] ties both to the
//! rate index and the external feeds.

pub mod format;
pub mod intent;
pub mod responder;

pub use format::{
    render_clarification_prompt, render_lookup, render_news, render_rate_table,
    render_unknown_item, render_unrecognized_prompt, render_weather,
};
pub use intent::{Intent, QueryParser, Rule};
pub use responder::{Reply, Responder};
