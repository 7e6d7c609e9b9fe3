//! Review-server commands.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::wire::RecommendRequest;
use shared_types::Server;
use tracing::info;

use super::{params, to_json};
use crate::context::PaprContext;
use crate::error::CommandError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegisterParams {
    url: String,
    channel_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatusParams {
    base_claim_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecommendParams {
    server: String,
    claim_name: String,
    reviewer_name: String,
    recommender_channel: String,
    #[serde(default)]
    reviewer_channel: Option<String>,
    #[serde(default)]
    reviewer_email: Option<String>,
}

/// Register a channel with a server, then record the server locally under
/// the name it reports.
pub async fn register(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: RegisterParams = params("server_register", value)?;
    if !(p.url.starts_with("http://") || p.url.starts_with("https://")) {
        return Err(CommandError::InvalidParams {
            command: "server_register".into(),
            message: format!("{} is not an http(s) URL", p.url),
        });
    }

    let registered = ctx.gateway.register(&p.url, &p.channel_name).await?;
    let server = Server {
        name: registered.name.clone(),
        channel_name: registered.channel_name.clone(),
        url: p.url,
        public_key: None,
    };
    ctx.articles.register_server(server.clone()).await?;
    info!(server = %server.name, channel = %p.channel_name, "review server registered");

    Ok(json!({ "server": to_json(&server)? }))
}

/// Ask an article's review server for its status, as the article's channel.
pub async fn status(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: StatusParams = params("server_status", value)?;
    let article = ctx.articles.article(&p.base_claim_name).await?;
    let Some(server_name) = article.review_server else {
        return Err(CommandError::InvalidParams {
            command: "server_status".into(),
            message: format!("article {} has no review server", p.base_claim_name),
        });
    };

    let server = ctx.articles.server(&server_name).await?;
    let status = ctx
        .gateway
        .status(&server, &article.channel_name, &p.base_claim_name)
        .await?;
    ctx.remember_server_key(&server_name).await;

    Ok(json!({ "server": server_name, "status": status }))
}

pub async fn recommend(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: RecommendParams = params("server_recommend", value)?;
    let server = ctx.articles.server(&p.server).await?;
    let request = RecommendRequest {
        claim_name: p.claim_name,
        reviewer_name: p.reviewer_name,
        recommender_channel: p.recommender_channel,
        reviewer_channel: p.reviewer_channel,
        reviewer_email: p.reviewer_email,
    };

    let reply = ctx.gateway.recommend(&server, &request).await?;
    ctx.remember_server_key(&server.name).await;
    info!(server = %server.name, claim_name = %request.claim_name, "reviewer recommended");

    Ok(json!({ "server": server.name, "reply": reply }))
}
