// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., B_K7NP3X for bookings)
//!
//! The alphabet excludes I, L, O and U so IDs can be read out over the
//! phone when an artist and a client discuss a booking.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User account (U_)
    User,
    /// Artist profile (A_)
    Artist,
    /// Video or short (V_)
    Video,
    /// Booking (B_)
    Booking,
    /// Bookmark (M_) - M for Mark
    Bookmark,
    /// Verification token row (K_) - K for Key
    Token,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Artist => "A",
            EntityPrefix::Video => "V",
            EntityPrefix::Booking => "B",
            EntityPrefix::Bookmark => "M",
            EntityPrefix::Token => "K",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// Returns a string in format "PREFIX_XXXXXX" (e.g., "B_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix
/// Used for object-storage keys and opaque tokens
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_artist_id() -> String {
    generate_id(EntityPrefix::Artist)
}

pub fn generate_video_id() -> String {
    generate_id(EntityPrefix::Video)
}

pub fn generate_booking_id() -> String {
    generate_id(EntityPrefix::Booking)
}

pub fn generate_bookmark_id() -> String {
    generate_id(EntityPrefix::Bookmark)
}

pub fn generate_token_id() -> String {
    generate_id(EntityPrefix::Token)
}
