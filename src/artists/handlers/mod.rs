// src/artists/handlers/mod.rs

pub mod dashboard;
pub mod integrations;
pub mod profile;

pub use dashboard::*;
pub use integrations::*;
pub use profile::*;
