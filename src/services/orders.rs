//! Orders service
//!
//! High-level business logic for the order lifecycle. This is the surface
//! the UI layer calls; it adds lifecycle logging over the repository.

use crate::database::{CreateOrderRequest, Order, OrderDetails, Repository};
use crate::error::Result;

/// Service for managing orders
#[derive(Clone)]
pub struct OrdersService {
    repo: Repository,
}

impl OrdersService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Save a whole order graph from the creation form in one call.
    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<OrderDetails> {
        tracing::info!("Creating new order for client: {}", req.client.name);

        let order = self.repo.create_order(req).await?;

        tracing::info!("Order created successfully: {}", order.id);

        Ok(order)
    }

    /// List all orders, most recent first.
    pub async fn list_orders(&self) -> Result<Vec<OrderDetails>> {
        self.repo.list_orders().await
    }

    /// Fetch one order; `None` if it does not exist.
    pub async fn get_order(&self, id: &str) -> Result<Option<OrderDetails>> {
        self.repo.get_order_by_id(id).await
    }

    /// Mark an order delivered. Safe to repeat.
    pub async fn mark_delivered(&self, id: &str) -> Result<()> {
        tracing::info!("Marking order as delivered: {}", id);
        self.repo.mark_order_as_delivered(id).await
    }

    /// Delete an order with its items and measurements.
    pub async fn delete_order(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting order: {}", id);
        self.repo.delete_order(id).await
    }

    /// Orders awaiting a future server sync. Currently has no consumer.
    pub async fn unsynced_orders(&self) -> Result<Vec<Order>> {
        self.repo.get_unsynced_orders().await
    }

    pub async fn mark_synced(&self, id: &str) -> Result<()> {
        self.repo.mark_order_as_synced(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_schema, ClientInput, MeasurementInput, OrderItemInput};
    use chrono::{Duration, Utc};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> OrdersService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_schema(&pool).await.unwrap();

        OrdersService::new(Repository::new(pool))
    }

    fn simple_order(name: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            client: ClientInput {
                name: name.to_string(),
                phone: "0102030405".to_string(),
            },
            delivery_date: Utc::now() + Duration::days(3),
            order_date: None,
            notes: None,
            order_items: vec![OrderItemInput {
                cloth_type: "Pantalon".to_string(),
                model_image: None,
                fabric_image: None,
                measurements: vec![MeasurementInput {
                    label: "Taille".to_string(),
                    value: 80.0,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_create_and_get_order() {
        let service = create_test_service().await;

        let order = service.create_order(simple_order("Kouadio Yao")).await.unwrap();

        let fetched = service.get_order(&order.id).await.unwrap().unwrap();
        assert_eq!(fetched.client_name, "Kouadio Yao");
        assert_eq!(fetched.order_items[0].measurements[0].value, 80.0);
    }

    #[tokio::test]
    async fn test_deliver_and_delete_lifecycle() {
        let service = create_test_service().await;

        let order = service.create_order(simple_order("Awa")).await.unwrap();

        service.mark_delivered(&order.id).await.unwrap();
        let delivered = service.get_order(&order.id).await.unwrap().unwrap();
        assert_eq!(delivered.status.as_str(), "delivered");

        service.delete_order(&order.id).await.unwrap();
        assert!(service.get_order(&order.id).await.unwrap().is_none());
        assert!(service.list_orders().await.unwrap().is_empty());
    }
}
