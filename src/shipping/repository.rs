//! The repository seam and its in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::error::ShippingError;
use super::model::{NewShipping, ShippingFilter, ShippingRecord, ShippingStatus};

/// The only component that touches persistent shipping state.
///
/// Every method performs one atomic operation against the store, so
/// concurrent requests need no coordination beyond what the store provides.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShippingRepository: Send + Sync {
    /// Inserts a new `pending` record and returns it with its assigned id.
    async fn create(&self, shipping: NewShipping) -> Result<ShippingRecord, ShippingError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<ShippingRecord>, ShippingError>;

    /// Sets the record's status to `cancelled`.
    ///
    /// Returns [`ShippingError::NotFound`] when no record has this id.
    async fn cancel(&self, id: i32) -> Result<ShippingRecord, ShippingError>;

    /// Returns every record matching `filter`, ordered by id.
    async fn find_many(&self, filter: ShippingFilter) -> Result<Vec<ShippingRecord>, ShippingError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), ShippingError> {
        Ok(())
    }

    /// Releases connections held by the repository.
    async fn close(&self) {}
}

#[derive(Default)]
struct Store {
    records: Vec<ShippingRecord>,
    last_id: i32,
}

/// Process-local storage for development and tests. Contents are lost on
/// restart.
#[derive(Default)]
pub struct InMemoryShippingRepository {
    store: Mutex<Store>,
}

impl InMemoryShippingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShippingRepository for InMemoryShippingRepository {
    async fn create(&self, shipping: NewShipping) -> Result<ShippingRecord, ShippingError> {
        let mut store = self.store.lock().await;
        store.last_id += 1;
        let record = ShippingRecord {
            id: store.last_id,
            user_id: shipping.user_id,
            product_id: shipping.product_id,
            count: shipping.count,
            status: ShippingStatus::Pending,
            created_at: Utc::now(),
        };
        store.records.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ShippingRecord>, ShippingError> {
        let store = self.store.lock().await;
        Ok(store.records.iter().find(|r| r.id == id).cloned())
    }

    async fn cancel(&self, id: i32) -> Result<ShippingRecord, ShippingError> {
        let mut store = self.store.lock().await;
        let record = store.records.iter_mut()
            .find(|r| r.id == id)
            .ok_or(ShippingError::NotFound(id))?;
        record.cancel();
        Ok(record.clone())
    }

    async fn find_many(&self, filter: ShippingFilter) -> Result<Vec<ShippingRecord>, ShippingError> {
        let store = self.store.lock().await;
        Ok(store.records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }
}
