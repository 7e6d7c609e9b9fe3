//! # Command Registry
//!
//! A fixed table from command name to handler, built once at startup.
//!
//! | Command | Handler |
//! |---------|---------|
//! | `status` | runtime summary |
//! | `article_create` | create an article |
//! | `article_publish` | publish one revision |
//! | `article_accept` | accept the review outcome |
//! | `article_show` | article, metadata and manuscripts |
//! | `review_sign` | sign a review as a reviewer channel |
//! | `review_verify` | check a signed review |
//! | `review_list` | reviews written locally |
//! | `review_round_publish` | seal and publish a review round |
//! | `review_open` | decrypt a sealed round |
//! | `server_register` | register with a review server |
//! | `server_status` | article status on its review server |
//! | `server_recommend` | suggest a reviewer to a review server |

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Value};
use shared_types::Classified;
use tracing::{debug, warn};

use crate::context::PaprContext;
use crate::error::CommandError;
use crate::handlers::{articles, reviews, servers};

/// Future returned by a handler.
pub type CommandFuture = Pin<Box<dyn Future<Output = Result<Value, CommandError>> + Send>>;

/// Command handler.
pub type Handler = fn(Arc<PaprContext>, Value) -> CommandFuture;

/// Static map of commands.
pub struct CommandRegistry {
    handlers: BTreeMap<&'static str, Handler>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: BTreeMap::new(),
        };
        registry.register("status", |ctx, p| Box::pin(status(ctx, p)));
        registry.register("article_create", |ctx, p| Box::pin(articles::create(ctx, p)));
        registry.register("article_publish", |ctx, p| Box::pin(articles::publish(ctx, p)));
        registry.register("article_accept", |ctx, p| Box::pin(articles::accept(ctx, p)));
        registry.register("article_show", |ctx, p| Box::pin(articles::show(ctx, p)));
        registry.register("review_sign", |ctx, p| Box::pin(reviews::sign(ctx, p)));
        registry.register("review_verify", |ctx, p| Box::pin(reviews::verify(ctx, p)));
        registry.register("review_list", |ctx, p| Box::pin(reviews::list(ctx, p)));
        registry.register("review_round_publish", |ctx, p| {
            Box::pin(reviews::publish_round(ctx, p))
        });
        registry.register("review_open", |ctx, p| Box::pin(reviews::open(ctx, p)));
        registry.register("server_register", |ctx, p| Box::pin(servers::register(ctx, p)));
        registry.register("server_status", |ctx, p| Box::pin(servers::status(ctx, p)));
        registry.register("server_recommend", |ctx, p| Box::pin(servers::recommend(ctx, p)));
        registry
    }

    fn register(&mut self, name: &'static str, handler: Handler) {
        self.handlers.insert(name, handler);
    }

    /// Command names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run `name` with `params`.
    pub async fn dispatch(
        &self,
        ctx: Arc<PaprContext>,
        name: &str,
        params: Value,
    ) -> Result<Value, CommandError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        debug!(command = name, "dispatching command");
        let result = handler(ctx, params).await;
        if let Err(e) = &result {
            warn!(command = name, kind = %e.kind(), stage = %e.stage(), error = %e, "command failed");
        }
        result
    }
}

async fn status(ctx: Arc<PaprContext>, _params: Value) -> Result<Value, CommandError> {
    let channels = ctx.ledger.list_channels().await?;
    let reviews = ctx.articles.reviews().await?;
    let sent = reviews.iter().filter(|r| r.is_sent()).count();

    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "daemon_url": ctx.config.ledger.daemon_url,
        "submission_dir": ctx.config.paths.submission_dir,
        "review_dir": ctx.config.paths.review_dir,
        "channels": channels.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "reviews": { "total": reviews.len(), "sent": sent },
    }))
}
