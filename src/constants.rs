use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Sweep interval for the in-memory rate-limit store.
pub const MEMORY_STORE_PURGE_SECS: u64 = 60;

/// Upper bound on a contact request body.
pub const MAX_CONTACT_BODY_BYTES: usize = 64 * 1024;
