//! Reading the author public key shipped with a submission.
//!
//! Accepts either the `{claim}_key.pub` file itself or a submission bundle
//! that carries it as an entry.

use std::io::Read;
use std::path::Path;

use papr_02_article_revisions::domain::bundle::public_key_file_name;

use crate::domain::errors::ReviewRoundError;

/// Read the author key of `submission` from `path`.
pub fn read_author_key(submission: &str, path: &Path) -> Result<String, ReviewRoundError> {
    let unavailable = |message: String| ReviewRoundError::AuthorKeyUnavailable {
        submission: submission.to_string(),
        message,
    };

    let is_bundle = path.extension().is_some_and(|ext| ext == "zip");
    if !is_bundle {
        return std::fs::read_to_string(path)
            .map_err(|e| unavailable(format!("{}: {e}", path.display())));
    }

    let file = std::fs::File::open(path).map_err(|e| unavailable(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| unavailable(e.to_string()))?;
    let entry_name = public_key_file_name(submission);
    let mut entry = archive
        .by_name(&entry_name)
        .map_err(|_| unavailable(format!("bundle has no {entry_name} entry")))?;

    let mut pem = String::new();
    entry
        .read_to_string(&mut pem)
        .map_err(|e| unavailable(e.to_string()))?;
    Ok(pem)
}
