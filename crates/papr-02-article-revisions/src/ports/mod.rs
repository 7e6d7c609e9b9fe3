//! # Ports Layer
//!
//! - `inbound`: the API this subsystem offers
//! - `outbound`: persistence and review-server notification

pub mod inbound;
pub mod outbound;
