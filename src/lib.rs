//! atelier-orders
//!
//! Offline order-tracking data layer for a tailoring workshop: clients,
//! orders, garments, measurements and delivery-reminder notifications in a
//! local SQLite store. The presentation layer lives elsewhere and drives
//! this crate through [`OrdersService`] and [`ReminderService`].

pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod ids;
pub mod services;

pub use database::{create_pool, initialize_schema, reset_schema, Repository};
pub use error::{AppError, Result};
pub use services::{LogNotifier, Notifier, OrdersService, ReminderService};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the embedding shell. Call once at startup.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_orders=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
