//! Review commands: reviewer side (sign, list), server side (verify,
//! publish a round) and author side (open a sealed round).

use std::path::PathBuf;
use std::sync::Arc;

use papr_01_signature_verification::ReviewSignatureApi;
use papr_03_review_rounds::{read_author_key, ReviewRound, ReviewRoundApi};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::Review;

use super::{params, to_json};
use crate::context::PaprContext;
use crate::error::CommandError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SignParams {
    submission_claim_name: String,
    submission_channel_name: String,
    #[serde(default)]
    submission_url: Option<String>,
    reviewer_channel: String,
    review_text: String,
    #[serde(default)]
    server: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VerifyParams {
    artifact: String,
    channel: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoundReview {
    reviewer_channel: String,
    artifact: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoundParams {
    submission_name: String,
    round: u32,
    author_channel: String,
    server: String,
    reviews: Vec<RoundReview>,
    #[serde(default)]
    author_key: Option<String>,
    #[serde(default)]
    author_key_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OpenParams {
    base_claim_name: String,
    bundle_path: PathBuf,
}

/// Sign a review as the reviewer channel and keep a local record of it.
pub async fn sign(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: SignParams = params("review_sign", value)?;
    let mut review = Review::draft(
        p.submission_claim_name,
        p.submission_channel_name,
        p.reviewer_channel,
        p.review_text,
    );
    review.submission_url = p.submission_url;
    review.server = p.server;

    let artifact = ctx.signatures.sign_review(&mut review).await?;
    ctx.articles.save_review(review.clone()).await?;

    Ok(json!({
        "review_id": review.id.to_string(),
        "signing_ts": review.review_signature_timestamp,
        "artifact": artifact,
    }))
}

pub async fn verify(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: VerifyParams = params("review_verify", value)?;
    let valid = ctx.signatures.verify(&p.artifact, &p.channel).await?;
    Ok(json!({ "channel": p.channel, "valid": valid }))
}

pub async fn list(ctx: Arc<PaprContext>, _value: Value) -> Result<Value, CommandError> {
    let reviews = ctx.articles.reviews().await?;
    to_json(&reviews)
}

/// Verify, seal and publish a review round under the server's channel.
pub async fn publish_round(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: RoundParams = params("review_round_publish", value)?;
    let server = ctx.articles.server(&p.server).await?;

    let mut round = ReviewRound::new(p.submission_name, p.round, p.author_channel);
    for review in p.reviews {
        round.add_review(review.reviewer_channel, review.artifact);
    }
    match (p.author_key, p.author_key_path) {
        (Some(pem), _) => round.set_author_key(pem),
        (None, Some(path)) => {
            let pem = read_author_key(&round.submission_name, &path)?;
            round.set_author_key(pem);
        }
        (None, None) => {}
    }

    let published = ctx.rounds.publish(&round, &server).await?;
    Ok(json!({
        "claim_name": published.claim_name,
        "file_path": published.file_path,
        "txid": published.receipt.txid,
        "claim_id": published.receipt.claim_id,
    }))
}

/// Decrypt a sealed review round addressed to one of our articles.
pub async fn open(ctx: Arc<PaprContext>, value: Value) -> Result<Value, CommandError> {
    let p: OpenParams = params("review_open", value)?;
    let ciphertext = tokio::fs::read(&p.bundle_path)
        .await
        .map_err(|source| CommandError::Io {
            path: p.bundle_path.clone(),
            source,
        })?;
    let text = ctx
        .articles
        .open_review_bundle(&p.base_claim_name, &ciphertext)
        .await?;
    Ok(json!({ "base_claim_name": p.base_claim_name, "text": text }))
}
