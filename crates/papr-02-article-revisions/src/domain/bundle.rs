//! # Submission Artifacts
//!
//! Files written to the submission directory for one claim:
//!
//! | File | Content |
//! |------|---------|
//! | `{claim}.zip` | the published bundle |
//! | `{claim}_key` | article private key, passphrase-encrypted PEM |
//! | `{claim}_key.pub` | article public key, PEM |
//!
//! Bundle entries:
//!
//! | Mode | Entries |
//! |------|---------|
//! | serverless | `Manuscript_{claim}.pdf`, `{claim}_key.pub` |
//! | server-linked | `Manuscript_{claim}.pdf`, `server.json` |

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use shared_types::ServerDescriptor;
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundle file name.
pub fn bundle_file_name(claim: &str) -> String {
    format!("{claim}.zip")
}

/// Manuscript entry name inside a bundle.
pub fn manuscript_entry_name(claim: &str) -> String {
    format!("Manuscript_{claim}.pdf")
}

/// Private key file name.
pub fn private_key_file_name(claim: &str) -> String {
    format!("{claim}_key")
}

/// Public key file (and bundle entry) name.
pub fn public_key_file_name(claim: &str) -> String {
    format!("{claim}_key.pub")
}

/// Server descriptor entry name.
pub const SERVER_ENTRY: &str = "server.json";

/// Second bundle entry.
#[derive(Debug, Clone)]
pub enum BundleLink {
    /// Serverless: ship the article public key.
    PublicKey(String),
    /// Server-linked: ship the coordinator descriptor.
    Server(ServerDescriptor),
}

/// Write `{claim}.zip` into `dir`. Fails if the bundle already exists.
///
/// The bundle is tracked by `guard` as soon as it is created, so a failure
/// while writing its entries leaves no partial archive behind.
pub fn write_bundle(
    dir: &Path,
    claim: &str,
    manuscript: &[u8],
    link: &BundleLink,
    guard: &mut ArtifactGuard,
) -> std::io::Result<PathBuf> {
    let path = dir.join(bundle_file_name(claim));
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)?;
    guard.track(path.clone());

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(file);

    zip.start_file(manuscript_entry_name(claim), options)
        .map_err(std::io::Error::other)?;
    zip.write_all(manuscript)?;

    match link {
        BundleLink::PublicKey(pem) => {
            zip.start_file(public_key_file_name(claim), options)
                .map_err(std::io::Error::other)?;
            zip.write_all(pem.as_bytes())?;
        }
        BundleLink::Server(server) => {
            let json = serde_json::to_vec_pretty(server).map_err(std::io::Error::other)?;
            zip.start_file(SERVER_ENTRY, options)
                .map_err(std::io::Error::other)?;
            zip.write_all(&json)?;
        }
    }

    zip.finish().map_err(std::io::Error::other)?;
    Ok(path)
}

/// Write the article key pair files for `claim` into `dir`. Each file is
/// tracked by `guard` once opened.
pub fn write_key_files(
    dir: &Path,
    claim: &str,
    encrypted_private_key: &str,
    public_key_pem: &str,
    guard: &mut ArtifactGuard,
) -> std::io::Result<(PathBuf, PathBuf)> {
    let private = dir.join(private_key_file_name(claim));
    let public = dir.join(public_key_file_name(claim));
    write_tracked(&private, encrypted_private_key.as_bytes(), guard)?;
    write_tracked(&public, public_key_pem.as_bytes(), guard)?;
    Ok((private, public))
}

fn write_tracked(path: &Path, content: &[u8], guard: &mut ArtifactGuard) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    guard.track(path.to_path_buf());
    file.write_all(content)?;
    file.sync_all()
}

/// Removes the files it tracks when dropped, unless disarmed.
///
/// Covers every exit from a publish: errors, early returns and a dropped
/// (cancelled) future.
#[derive(Debug, Default)]
pub struct ArtifactGuard {
    paths: Vec<PathBuf>,
    armed: bool,
}

impl ArtifactGuard {
    /// Empty, armed guard.
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            armed: true,
        }
    }

    /// Track `path`.
    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Keep the files.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove artifact"),
            }
        }
    }
}
