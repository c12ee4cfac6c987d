//! Delivery reminders service
//!
//! Sweeps open orders with an upcoming delivery date and raises at most one
//! notification per order per calendar day. Intended to run on every app
//! focus event and periodically in the background; redundant sweeps are
//! harmless because of the per-day dedup.

use crate::config::{REMINDER_LOOKAHEAD_DAYS, REMINDER_SWEEP_INTERVAL_SECS, REMINDER_TITLE};
use crate::database::{Notification, ReminderCandidate, Repository};
use crate::error::Result;
use chrono::{DateTime, Duration, Local, Utc};
use std::sync::Arc;

/// Local notification collaborator. Submitting is fire-and-forget: the OS
/// may still drop the alert, only the request is guaranteed.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Default notifier for shells without a system notification service wired
/// up; records the alert in the log instead.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        tracing::info!("Notification: {} - {}", title, body);
        Ok(())
    }
}

/// Reminder engine over the order store.
#[derive(Clone)]
pub struct ReminderService {
    repo: Repository,
    notifier: Arc<dyn Notifier>,
}

impl ReminderService {
    pub fn new(repo: Repository, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// One sweep over all open orders. A failure on one order is logged and
    /// does not stop the rest; orders already processed stay marked.
    pub async fn check_delivery_reminders(&self) -> Result<()> {
        let now = Utc::now();
        let candidates = self.repo.reminder_candidates().await?;

        tracing::debug!("Reminder sweep over {} open order(s)", candidates.len());

        for order in candidates {
            if let Err(e) = self.remind_if_due(&order, now).await {
                tracing::error!("Reminder failed for order {}: {}", order.id, e);
            }
        }

        Ok(())
    }

    async fn remind_if_due(&self, order: &ReminderCandidate, now: DateTime<Utc>) -> Result<()> {
        let until_delivery = order.delivery_date - now;

        // Strictly in the future and at most five days out. An order whose
        // delivery date has already passed is not re-reminded.
        if until_delivery <= Duration::zero()
            || until_delivery > Duration::days(REMINDER_LOOKAHEAD_DAYS)
        {
            return Ok(());
        }

        // Already notified today? Compared on the local calendar day, so a
        // sweep on every app focus stays quiet until midnight.
        if let Some(last) = order.last_reminder_date {
            if last.with_timezone(&Local).date_naive() == now.with_timezone(&Local).date_naive() {
                return Ok(());
            }
        }

        let cloth_types = dedup_preserving_order(self.repo.cloth_types(&order.id).await?);
        let message = compose_message(
            &order.client_name,
            &cloth_types,
            order.delivery_date,
            until_delivery,
        );

        self.notifier.notify(REMINDER_TITLE, &message)?;

        // Stamp before writing history: the stamp is the dedup authority,
        // so a crash between the two cannot duplicate the history row on
        // the next sweep.
        self.repo.set_last_reminder(&order.id, now).await?;
        self.repo
            .create_notification(&order.id, REMINDER_TITLE, &message, now)
            .await?;

        tracing::info!("Delivery reminder sent for order {}", order.id);
        Ok(())
    }

    /// Notification history, most recent first.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        self.repo.list_notifications().await
    }

    /// Mark a notification read once the user opens it.
    pub async fn mark_notification_as_read(&self, id: &str) -> Result<()> {
        self.repo.mark_notification_as_read(id).await
    }

    /// Unread notifications for orders due within the reminder window,
    /// for the home screen badge.
    pub async fn unread_notification_count(&self) -> Result<i64> {
        self.repo.unread_notification_count().await
    }

    /// Start the background sweep loop.
    pub fn start_scheduler(self) {
        tokio::spawn(async move {
            tracing::info!("Starting delivery reminder scheduler");

            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(REMINDER_SWEEP_INTERVAL_SECS));

            loop {
                interval.tick().await;

                if let Err(e) = self.check_delivery_reminders().await {
                    tracing::error!("Error checking delivery reminders: {}", e);
                }
            }
        });
    }
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

fn compose_message(
    client_name: &str,
    cloth_types: &[String],
    delivery_date: DateTime<Utc>,
    until_delivery: Duration,
) -> String {
    let days_left = (until_delivery.num_seconds() as f64 / 86_400.0).ceil() as i64;
    let formatted_date = delivery_date.with_timezone(&Local).format("%A, %B %-d");

    format!(
        "Delivery due in {} day(s): {}'s order ({}) must be delivered on {}. Finish any remaining alterations.",
        days_left,
        client_name,
        cloth_types.join(", "),
        formatted_date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{
        initialize_schema, ClientInput, CreateOrderRequest, MeasurementInput, OrderItemInput,
    };
    use crate::error::AppError;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Mutex;

    /// Captures submitted notifications instead of touching the OS.
    #[derive(Default)]
    struct CaptureNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for CaptureNotifier {
        fn notify(&self, title: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    /// Always refuses, to exercise the log-and-continue path.
    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _title: &str, _body: &str) -> Result<()> {
            Err(AppError::Reminder("notification service unavailable".to_string()))
        }
    }

    async fn create_test_setup(
        notifier: Arc<dyn Notifier>,
    ) -> (ReminderService, Repository) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_schema(&pool).await.unwrap();

        let repo = Repository::new(pool);
        let service = ReminderService::new(repo.clone(), notifier);

        (service, repo)
    }

    fn order_due_in(name: &str, days: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            client: ClientInput {
                name: name.to_string(),
                phone: "0700000000".to_string(),
            },
            delivery_date: Utc::now() + Duration::days(days),
            order_date: None,
            notes: None,
            order_items: vec![
                OrderItemInput {
                    cloth_type: "robe".to_string(),
                    model_image: None,
                    fabric_image: None,
                    measurements: vec![MeasurementInput {
                        label: "chest".to_string(),
                        value: 92.0,
                    }],
                },
                OrderItemInput {
                    cloth_type: "robe".to_string(),
                    model_image: None,
                    fabric_image: None,
                    measurements: vec![],
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_reminder_fires_once_per_day() {
        let notifier = Arc::new(CaptureNotifier::default());
        let (service, repo) = create_test_setup(notifier.clone()).await;

        repo.create_order(order_due_in("Marie Kouassi", 3)).await.unwrap();

        service.check_delivery_reminders().await.unwrap();
        service.check_delivery_reminders().await.unwrap();

        // One alert, one history row, despite two sweeps the same day.
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
        assert_eq!(repo.list_notifications().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reminder_fires_again_next_day() {
        let notifier = Arc::new(CaptureNotifier::default());
        let (service, repo) = create_test_setup(notifier.clone()).await;

        let order = repo.create_order(order_due_in("Marie", 3)).await.unwrap();

        service.check_delivery_reminders().await.unwrap();
        assert_eq!(repo.list_notifications().await.unwrap().len(), 1);

        // Pretend yesterday's sweep stamped the order.
        repo.set_last_reminder(&order.id, Utc::now() - Duration::days(1))
            .await
            .unwrap();

        service.check_delivery_reminders().await.unwrap();
        assert_eq!(repo.list_notifications().await.unwrap().len(), 2);
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stamp_alone_suppresses_resend() {
        let notifier = Arc::new(CaptureNotifier::default());
        let (service, repo) = create_test_setup(notifier.clone()).await;

        let order = repo.create_order(order_due_in("Marie", 3)).await.unwrap();

        // An order stamped today but with no history row (a crash after the
        // stamp) stays quiet until the next day; no duplicate is possible.
        repo.set_last_reminder(&order.id, Utc::now()).await.unwrap();

        service.check_delivery_reminders().await.unwrap();

        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(repo.list_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_window_boundaries() {
        let notifier = Arc::new(CaptureNotifier::default());
        let (service, repo) = create_test_setup(notifier.clone()).await;

        repo.create_order(order_due_in("TooFar", 6)).await.unwrap();
        repo.create_order(order_due_in("Past", -1)).await.unwrap();
        repo.create_order(order_due_in("OnEdge", 5)).await.unwrap();

        service.check_delivery_reminders().await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("OnEdge"));
    }

    #[tokio::test]
    async fn test_delivered_orders_are_not_reminded() {
        let notifier = Arc::new(CaptureNotifier::default());
        let (service, repo) = create_test_setup(notifier.clone()).await;

        let order = repo.create_order(order_due_in("Marie", 3)).await.unwrap();
        repo.mark_order_as_delivered(&order.id).await.unwrap();

        service.check_delivery_reminders().await.unwrap();

        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(repo.list_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_message_mentions_client_and_distinct_cloth_types() {
        let notifier = Arc::new(CaptureNotifier::default());
        let (service, repo) = create_test_setup(notifier.clone()).await;

        repo.create_order(order_due_in("Marie Kouassi", 3)).await.unwrap();

        service.check_delivery_reminders().await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].0, REMINDER_TITLE);
        assert!(sent[0].1.contains("Marie Kouassi"));
        // Two items of the same type appear once.
        assert_eq!(sent[0].1.matches("robe").count(), 1);
        assert!(sent[0].1.contains("3 day(s)"));
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_poison_the_order() {
        let (service, repo) = create_test_setup(Arc::new(FailingNotifier)).await;

        let order = repo.create_order(order_due_in("Marie", 3)).await.unwrap();

        // Sweep itself succeeds; the per-order failure is logged.
        service.check_delivery_reminders().await.unwrap();

        // Nothing was recorded, so the next sweep retries this order.
        assert!(repo.list_notifications().await.unwrap().is_empty());
        let candidates = repo.reminder_candidates().await.unwrap();
        assert_eq!(candidates[0].id, order.id);
        assert!(candidates[0].last_reminder_date.is_none());
    }

    #[tokio::test]
    async fn test_mark_notification_read() {
        let notifier = Arc::new(CaptureNotifier::default());
        let (service, repo) = create_test_setup(notifier).await;

        repo.create_order(order_due_in("Marie", 2)).await.unwrap();
        service.check_delivery_reminders().await.unwrap();

        let history = service.list_notifications().await.unwrap();
        assert_eq!(service.unread_notification_count().await.unwrap(), 1);

        service.mark_notification_as_read(&history[0].id).await.unwrap();

        let history = service.list_notifications().await.unwrap();
        assert!(history[0].read);
        assert_eq!(service.unread_notification_count().await.unwrap(), 0);
    }
}
