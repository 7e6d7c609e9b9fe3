//! Article lifecycle commands.

use std::path::PathBuf;
use std::sync::Arc;

use papr_02_article_revisions::{CreateArticle, PublishRevision};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::ArticleMetadata;
use tracing::info;

use super::{params, to_json, ArticleView};
use crate::context::PaprContext;
use crate::error::CommandError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateParams {
    base_claim_name: String,
    channel_name: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "abstract")]
    abstract_text: String,
    #[serde(default)]
    authors: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    encrypt: bool,
    #[serde(default)]
    review_server: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublishParams {
    base_claim_name: String,
    revision: u32,
    file_path: PathBuf,
    #[serde(default)]
    metadata: Option<ArticleMetadata>,
    #[serde(default)]
    encrypt: bool,
    #[serde(default)]
    skip_claim_check: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArticleParams {
    base_claim_name: String,
}

pub async fn create(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: CreateParams = params("article_create", value)?;
    let created = ctx
        .articles
        .create(CreateArticle {
            base_claim_name: p.base_claim_name,
            channel_name: p.channel_name,
            metadata: ArticleMetadata {
                title: p.title,
                abstract_text: p.abstract_text,
                authors: p.authors,
                tags: p.tags,
            },
            encrypt: p.encrypt,
            review_server: p.review_server,
        })
        .await?;

    Ok(json!({
        "article": to_json(&ArticleView::new(&created.article, &[]))?,
        "review_passphrase": created.review_passphrase,
        "encryption_passphrase": created.encryption_passphrase,
    }))
}

pub async fn publish(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: PublishParams = params("article_publish", value)?;
    let base = p.base_claim_name.clone();

    let outcome = ctx
        .articles
        .publish(PublishRevision {
            base_claim_name: p.base_claim_name,
            revision: p.revision,
            file_path: p.file_path,
            metadata: p.metadata,
            encrypt: p.encrypt,
            skip_claim_check: p.skip_claim_check,
        })
        .await?;

    for warning in &outcome.warnings {
        warning.log();
    }
    remember_key_of(&ctx, &base).await?;

    Ok(json!({
        "manuscript": to_json(&outcome.manuscript)?,
        "warnings": to_json(&outcome.warnings)?,
    }))
}

pub async fn accept(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: ArticleParams = params("article_accept", value)?;
    let outcome = ctx.articles.accept(&p.base_claim_name).await?;
    remember_key_of(&ctx, &p.base_claim_name).await?;

    let manuscripts = ctx.articles.manuscripts(&p.base_claim_name).await?;
    info!(article = %p.base_claim_name, "article accepted");
    Ok(json!({
        "article": to_json(&ArticleView::new(&outcome.article, &manuscripts))?,
        "encryption_passphrase": outcome.encryption_passphrase,
    }))
}

pub async fn show(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: ArticleParams = params("article_show", value)?;
    let article = ctx.articles.article(&p.base_claim_name).await?;
    let manuscripts = ctx.articles.manuscripts(&p.base_claim_name).await?;
    let metadata = ctx.articles.metadata(&p.base_claim_name).await?;

    Ok(json!({
        "article": to_json(&ArticleView::new(&article, &manuscripts))?,
        "metadata": to_json(&metadata)?,
        "manuscripts": to_json(&manuscripts)?,
    }))
}

async fn remember_key_of(ctx: &PaprContext, base_claim_name: &str) -> Result<(), CommandError> {
    let article = ctx.articles.article(base_claim_name).await?;
    if let Some(server) = &article.review_server {
        ctx.remember_server_key(server).await;
    }
    Ok(())
}
