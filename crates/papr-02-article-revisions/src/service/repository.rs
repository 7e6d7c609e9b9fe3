//! # Article Repository
//!
//! Typed rows over a [`KeyValueStore`], JSON-encoded.
//!
//! | Key | Value |
//! |-----|-------|
//! | `article:{base}:{channel}` | `Article` |
//! | `manuscript:{base}:{claim}` | `Manuscript` |
//! | `claim:{claim}` | base name owning the claim |
//! | `server:{name}` | `Server` |
//! | `review:{id}` | `Review` |
//!
//! Uniqueness of claim names is re-checked inside the store lock at commit
//! time, so a stale check earlier in a publish cannot produce a duplicate.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{Article, Manuscript, Review, Server};

use crate::domain::errors::{ArticleError, KVStoreError};
use crate::ports::outbound::{BatchOperation, KeyValueStore};

fn article_prefix(base: &str) -> String {
    format!("article:{base}:")
}

fn article_key(article: &Article) -> String {
    format!("article:{}:{}", article.base_claim_name, article.channel_name)
}

fn manuscript_prefix(base: &str) -> String {
    format!("manuscript:{base}:")
}

fn manuscript_key(manuscript: &Manuscript) -> String {
    format!(
        "manuscript:{}:{}",
        manuscript.base_claim_name, manuscript.claim_name
    )
}

fn claim_key(claim: &str) -> String {
    format!("claim:{claim}")
}

fn server_key(name: &str) -> String {
    format!("server:{name}")
}

fn review_key(review: &Review) -> String {
    format!("review:{}", review.id)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, KVStoreError> {
    serde_json::to_vec(value).map_err(|e| KVStoreError::CorruptionError {
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, KVStoreError> {
    serde_json::from_slice(bytes).map_err(|e| KVStoreError::CorruptionError {
        message: e.to_string(),
    })
}

/// Typed access to the local store.
pub struct ArticleRepository<KV: KeyValueStore> {
    pub(super) store: Mutex<KV>,
}

impl<KV: KeyValueStore> ArticleRepository<KV> {
    pub fn new(store: KV) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// All article rows stored under `base`. More than one is corruption.
    pub fn articles_named(&self, base: &str) -> Result<Vec<Article>, ArticleError> {
        let store = self.store.lock();
        let rows = store.prefix_scan(article_prefix(base).as_bytes())?;
        rows.iter()
            .map(|(_, v)| decode(v).map_err(ArticleError::from))
            .collect()
    }

    /// The single article named `base`.
    pub fn get_article(&self, base: &str) -> Result<Article, ArticleError> {
        let mut rows = self.articles_named(base)?;
        match rows.len() {
            0 => Err(ArticleError::UnknownArticle {
                base: base.to_string(),
            }),
            1 => Ok(rows.remove(0)),
            count => Err(ArticleError::CorruptedStore {
                base: base.to_string(),
                count,
            }),
        }
    }

    /// Insert a new article; fails if the base name is taken.
    pub fn insert_article(&self, article: &Article) -> Result<(), ArticleError> {
        let mut store = self.store.lock();
        let prefix = article_prefix(&article.base_claim_name);
        if !store.prefix_scan(prefix.as_bytes())?.is_empty() {
            return Err(ArticleError::AlreadyExists {
                base: article.base_claim_name.clone(),
            });
        }
        store.put(article_key(article).as_bytes(), &encode(article)?)?;
        Ok(())
    }

    /// Overwrite an existing article row.
    pub fn update_article(&self, article: &Article) -> Result<(), ArticleError> {
        let mut store = self.store.lock();
        store.put(article_key(article).as_bytes(), &encode(article)?)?;
        Ok(())
    }

    /// Manuscripts of `base`, unreviewed first, then by revision.
    pub fn manuscripts_of(&self, base: &str) -> Result<Vec<Manuscript>, ArticleError> {
        let store = self.store.lock();
        let rows = store.prefix_scan(manuscript_prefix(base).as_bytes())?;
        let mut manuscripts = rows
            .iter()
            .map(|(_, v)| decode::<Manuscript>(v))
            .collect::<Result<Vec<_>, _>>()?;
        manuscripts.sort_by_key(|m| (m.reviewed, m.revision));
        Ok(manuscripts)
    }

    /// Whether any manuscript holds `claim`.
    pub fn claim_recorded(&self, claim: &str) -> Result<bool, ArticleError> {
        Ok(self.store.lock().exists(claim_key(claim).as_bytes())?)
    }

    /// Record a published manuscript and the advanced article in one batch.
    pub fn commit_publish(
        &self,
        article: &Article,
        manuscript: &Manuscript,
    ) -> Result<(), ArticleError> {
        let mut store = self.store.lock();
        let claim = claim_key(&manuscript.claim_name);
        if store.exists(claim.as_bytes())? {
            return Err(ArticleError::DuplicateClaim {
                claim: manuscript.claim_name.clone(),
            });
        }

        store.atomic_batch_write(vec![
            BatchOperation::put(manuscript_key(manuscript), encode(manuscript)?),
            BatchOperation::put(claim, manuscript.base_claim_name.as_bytes()),
            BatchOperation::put(article_key(article), encode(article)?),
        ])?;
        Ok(())
    }

    /// Insert a server; fails if the name is taken.
    pub fn insert_server(&self, server: &Server) -> Result<(), ArticleError> {
        let mut store = self.store.lock();
        let key = server_key(&server.name);
        if store.exists(key.as_bytes())? {
            return Err(ArticleError::ServerExists {
                name: server.name.clone(),
            });
        }
        store.put(key.as_bytes(), &encode(server)?)?;
        Ok(())
    }

    pub fn get_server(&self, name: &str) -> Result<Server, ArticleError> {
        let store = self.store.lock();
        let bytes = store
            .get(server_key(name).as_bytes())?
            .ok_or_else(|| ArticleError::UnknownServer {
                name: name.to_string(),
            })?;
        Ok(decode(&bytes)?)
    }

    pub fn list_servers(&self) -> Result<Vec<Server>, ArticleError> {
        let store = self.store.lock();
        store
            .prefix_scan(b"server:")?
            .iter()
            .map(|(_, v)| decode(v).map_err(ArticleError::from))
            .collect()
    }

    /// Fill in a server's public key.
    pub fn set_server_public_key(&self, name: &str, public_key: String) -> Result<(), ArticleError> {
        let mut store = self.store.lock();
        let key = server_key(name);
        let bytes = store
            .get(key.as_bytes())?
            .ok_or_else(|| ArticleError::UnknownServer {
                name: name.to_string(),
            })?;
        let mut server: Server = decode(&bytes)?;
        server.public_key = Some(public_key);
        store.put(key.as_bytes(), &encode(&server)?)?;
        Ok(())
    }

    pub fn save_review(&self, review: &Review) -> Result<(), ArticleError> {
        let mut store = self.store.lock();
        store.put(review_key(review).as_bytes(), &encode(review)?)?;
        Ok(())
    }

    /// Reviews, oldest review date first; unsent drafts last.
    pub fn list_reviews(&self) -> Result<Vec<Review>, ArticleError> {
        let store = self.store.lock();
        let mut reviews = store
            .prefix_scan(b"review:")?
            .iter()
            .map(|(_, v)| decode::<Review>(v))
            .collect::<Result<Vec<_>, _>>()?;
        reviews.sort_by_key(|r| (r.review_date.is_none(), r.review_date));
        Ok(reviews)
    }
}
