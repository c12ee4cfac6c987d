//! Repository layer for database operations
//!
//! All multi-row writes run inside a single transaction; a failure in any
//! step rolls the whole operation back. Reads nest items and measurements
//! with one lookup per order and per item, which is fine at the data scale
//! of a single workshop.

use super::models::*;
use crate::config::REMINDER_LOOKAHEAD_DAYS;
use crate::error::{AppError, Result};
use crate::ids::new_id;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

/// Flat shape of the orders-joined-to-clients query.
#[derive(Debug, FromRow)]
#[sqlx(rename_all = "camelCase")]
struct OrderClientRow {
    id: String,
    status: String,
    order_date: DateTime<Utc>,
    delivery_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    client_name: String,
    client_phone: String,
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Order Writer =====

    /// Atomically persist a whole order graph: client, order, items and
    /// their measurements. On success the returned details are already
    /// readable through [`Repository::get_order_by_id`].
    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<OrderDetails> {
        let client_id = new_id();
        let order_id = new_id();
        let now = Utc::now();
        let order_date = req.order_date.unwrap_or(now);

        let mut tx = self.pool.begin().await.map_err(AppError::Write)?;

        sqlx::query(
            r#"
            INSERT INTO clients (id, name, phone, createdAt, synced)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(&client_id)
        .bind(&req.client.name)
        .bind(&req.client.phone)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Write)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, status, orderDate, deliveryDate, notes, clientId, lastReminderDate, synced)
            VALUES (?, ?, ?, ?, ?, ?, NULL, 0)
            "#,
        )
        .bind(&order_id)
        .bind(OrderStatus::New.as_str())
        .bind(order_date)
        .bind(req.delivery_date)
        .bind(&req.notes)
        .bind(&client_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Write)?;

        for item in &req.order_items {
            let item_id = new_id();

            sqlx::query(
                r#"
                INSERT INTO order_items (id, clothType, modelImage, fabricImage, orderId)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item_id)
            .bind(&item.cloth_type)
            .bind(&item.model_image)
            .bind(&item.fabric_image)
            .bind(&order_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Write)?;

            for measurement in &item.measurements {
                sqlx::query(
                    r#"
                    INSERT INTO measurements (id, label, value, orderItemId)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(new_id())
                .bind(&measurement.label)
                .bind(measurement.value)
                .bind(&item_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Write)?;
            }
        }

        tx.commit().await.map_err(AppError::Write)?;

        tracing::debug!(
            "Created order {} with {} item(s) for client {}",
            order_id,
            req.order_items.len(),
            client_id
        );

        self.get_order_by_id(&order_id)
            .await?
            .ok_or_else(|| AppError::Read(sqlx::Error::RowNotFound))
    }

    // ===== Order Reader =====

    /// Every order joined with its client, most recent first, items and
    /// measurements nested in insertion order.
    pub async fn list_orders(&self) -> Result<Vec<OrderDetails>> {
        let rows = sqlx::query_as::<_, OrderClientRow>(
            r#"
            SELECT o.id, o.status, o.orderDate, o.deliveryDate, o.notes,
                   c.name AS clientName, c.phone AS clientPhone
            FROM orders o
            JOIN clients c ON c.id = o.clientId
            ORDER BY o.orderDate DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Read)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.load_details(row).await?);
        }

        Ok(orders)
    }

    /// A single order in the same nested shape. `None` means not found,
    /// never an error.
    pub async fn get_order_by_id(&self, id: &str) -> Result<Option<OrderDetails>> {
        let row = sqlx::query_as::<_, OrderClientRow>(
            r#"
            SELECT o.id, o.status, o.orderDate, o.deliveryDate, o.notes,
                   c.name AS clientName, c.phone AS clientPhone
            FROM orders o
            JOIN clients c ON c.id = o.clientId
            WHERE o.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Read)?;

        match row {
            Some(row) => Ok(Some(self.load_details(row).await?)),
            None => Ok(None),
        }
    }

    async fn load_details(&self, row: OrderClientRow) -> Result<OrderDetails> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, clothType, modelImage, fabricImage, orderId
            FROM order_items WHERE orderId = ? ORDER BY rowid
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Read)?;

        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            let measurements = sqlx::query_as::<_, Measurement>(
                r#"
                SELECT id, label, value, orderItemId
                FROM measurements WHERE orderItemId = ? ORDER BY rowid
                "#,
            )
            .bind(&item.id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Read)?;

            order_items.push(OrderItemDetails {
                id: item.id,
                cloth_type: item.cloth_type,
                // Older app versions stored "" for a missing photo.
                model_image: item.model_image.filter(|uri| !uri.is_empty()),
                fabric_image: item.fabric_image.filter(|uri| !uri.is_empty()),
                measurements,
            });
        }

        Ok(OrderDetails {
            // The read boundary is the single normalization point for the
            // mixed-case and legacy status spellings older writes left behind.
            status: OrderStatus::from_db(&row.status),
            id: row.id,
            order_date: row.order_date,
            delivery_date: row.delivery_date,
            notes: row.notes,
            client_name: row.client_name,
            client_phone: row.client_phone,
            order_items,
        })
    }

    // ===== Sync stubs =====

    /// Raw order rows not yet reconciled with a server. No consumer today.
    pub async fn get_unsynced_orders(&self) -> Result<Vec<Order>> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, status, orderDate, deliveryDate, notes, clientId, lastReminderDate, synced
            FROM orders WHERE synced = 0
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Read)
    }

    pub async fn mark_order_as_synced(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE orders SET synced = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Write)?;

        tracing::debug!("Marked order {} as synced", id);
        Ok(())
    }

    // ===== Mutations =====

    /// Idempotent: marking an already-delivered order again is a no-op, as
    /// is an unknown id.
    pub async fn mark_order_as_delivered(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(OrderStatus::Delivered.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Write)?;

        tracing::debug!("Marked order {} as delivered", id);
        Ok(())
    }

    /// Delete an order with its items and measurements, one transaction.
    /// The client row and any notification history are intentionally left
    /// behind.
    pub async fn delete_order(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Write)?;

        sqlx::query(
            r#"
            DELETE FROM measurements
            WHERE orderItemId IN (SELECT id FROM order_items WHERE orderId = ?)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Write)?;

        sqlx::query("DELETE FROM order_items WHERE orderId = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Write)?;

        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Write)?;

        tx.commit().await.map_err(AppError::Write)?;

        tracing::debug!("Deleted order {}", id);
        Ok(())
    }

    // ===== Reminders =====

    /// Undelivered orders with a delivery date, joined to the client name.
    pub async fn reminder_candidates(&self) -> Result<Vec<ReminderCandidate>> {
        sqlx::query_as::<_, ReminderCandidate>(
            r#"
            SELECT o.id, c.name AS clientName, o.deliveryDate, o.lastReminderDate
            FROM orders o
            JOIN clients c ON c.id = o.clientId
            WHERE lower(o.status) NOT IN ('delivered', 'done')
              AND o.deliveryDate IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Read)
    }

    /// Cloth type of every item in an order, in insertion order.
    pub async fn cloth_types(&self, order_id: &str) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT clothType FROM order_items WHERE orderId = ? ORDER BY rowid")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Read)
    }

    /// Stamp the per-day reminder dedup marker.
    pub async fn set_last_reminder(&self, order_id: &str, when: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE orders SET lastReminderDate = ? WHERE id = ?")
            .bind(when)
            .bind(order_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Write)?;

        Ok(())
    }

    // ===== Notifications =====

    pub async fn create_notification(
        &self,
        order_id: &str,
        title: &str,
        description: &str,
        date: DateTime<Utc>,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, orderId, title, description, date, read)
            VALUES (?, ?, ?, ?, ?, 0)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(order_id)
        .bind(title)
        .bind(description)
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Write)?;

        tracing::debug!("Created notification {} for order {}", notification.id, order_id);
        Ok(notification)
    }

    /// Notification history, most recent first.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications ORDER BY date DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Read)
    }

    pub async fn mark_notification_as_read(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Write)?;

        tracing::debug!("Marked notification {} as read", id);
        Ok(())
    }

    /// Unread notifications for orders due within the reminder window,
    /// for the dashboard badge.
    pub async fn unread_notification_count(&self) -> Result<i64> {
        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM notifications n
            JOIN orders o ON o.id = n.orderId
            WHERE n.read = 0
              AND o.deliveryDate IS NOT NULL
              AND datetime(o.deliveryDate) <= datetime('now', '+{} days')
            "#,
            REMINDER_LOOKAHEAD_DAYS
        );

        sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Read)
    }
}
