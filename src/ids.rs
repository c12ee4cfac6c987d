//! Identifier generation
//!
//! Every row in the store is keyed by a random UUID v4 rendered as text.
//! Identifiers are never reused, even after deletion.

use uuid::Uuid;

/// Generate a fresh primary-key identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
