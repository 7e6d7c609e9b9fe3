//! # Command Handlers
//!
//! Each handler takes the shared context and a JSON parameter object and
//! returns a JSON result. Parameters are typed with serde; unknown fields are
//! rejected so a misspelled option never goes unnoticed.

pub mod articles;
pub mod reviews;
pub mod servers;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::{Article, ArticleState, Manuscript};

use crate::error::CommandError;

/// Decode the parameters of `command`.
pub(crate) fn params<T: DeserializeOwned>(command: &str, value: Value) -> Result<T, CommandError> {
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|e| CommandError::InvalidParams {
        command: command.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError::InvalidParams {
        command: "result".to_string(),
        message: e.to_string(),
    })
}

/// Public view of an article. Never carries passphrases or key material.
#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub base_claim_name: String,
    pub channel_name: String,
    pub revision: u32,
    pub reviewed: bool,
    pub encrypted: bool,
    pub review_server: Option<String>,
    pub state: ArticleState,
    pub next_claim_name: String,
}

impl ArticleView {
    pub fn new(article: &Article, manuscripts: &[Manuscript]) -> Self {
        let in_phase = manuscripts.iter().any(|m| m.reviewed == article.reviewed);
        let next_revision = if in_phase {
            article.revision + 1
        } else {
            article.revision
        };
        Self {
            base_claim_name: article.base_claim_name.clone(),
            channel_name: article.channel_name.clone(),
            revision: article.revision,
            reviewed: article.reviewed,
            encrypted: article.encryption_passphrase.is_some(),
            review_server: article.review_server.clone(),
            state: article.state(in_phase),
            next_claim_name: article.claim_name_for(next_revision),
        }
    }
}
