//! Services module
//!
//! Business logic services that sit between the UI layer and the repository.

pub mod orders;
pub mod reminders;

pub use orders::OrdersService;
pub use reminders::{LogNotifier, Notifier, ReminderService};
