//! # Service Layer

mod client;
mod session;
#[cfg(test)]
mod tests;

pub use client::ReviewServerClient;
pub use session::SessionManager;
