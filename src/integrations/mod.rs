//! # Integrations Module
//!
//! Artist connections to YouTube and Instagram:
//! - OAuth connect flow with a timestamped `state`
//! - token storage on the artist row and refresh-before-use
//! - shorts/reels import into the moderated video catalogue

pub mod connect;
pub mod refresher;
pub mod state;
pub mod store;
pub mod syncer;

#[cfg(test)]
mod tests;

pub use refresher::get_valid_token;
pub use syncer::{sync, SyncReport};
