//! Application configuration constants
//!
//! Central location for tuning values used by the data layer.

// ===== Database =====

/// Default database file name inside the app data directory.
pub const DB_FILE_NAME: &str = "atelier.db";

// ===== Delivery Reminders =====

/// Look-ahead window before a delivery date, in days. An undelivered order
/// is reminded only while its delivery date is strictly in the future and
/// at most this many days away.
pub const REMINDER_LOOKAHEAD_DAYS: i64 = 5;

/// How often the background sweep re-checks open orders, in seconds.
/// The embedding shell may additionally run a sweep on every focus event;
/// the per-day dedup makes redundant sweeps harmless.
pub const REMINDER_SWEEP_INTERVAL_SECS: u64 = 3_600;

/// Title used for every delivery reminder notification.
pub const REMINDER_TITLE: &str = "Delivery reminder";
