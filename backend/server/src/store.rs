//! # Store
//!
//! Document persistence behind one trait so handlers never see the driver.
//!
//! - [`crate::database::MongoStore`] is the production backend.
//! - [`crate::memory::MemoryStore`] keeps everything in process and backs the
//!   test-suite.
//!
//! Listing methods take the already validated query and return one page plus
//! the total number of matching documents. Pages are ordered newest first.
use async_trait::async_trait;
use catalog::{
    admins::{Admin, AdminStatus, Role},
    notifications::{Notification, NotificationKind},
    products::{Availability, ColorName, Product},
    sections::{Section, SectionSeed},
    traffic::Visit,
};
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Duplicate value for {0}")]
    Duplicate(String),
}

/// Mints a new document identifier.
pub fn new_id() -> String {
    ObjectId::new().to_hex()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    /// Cuts the current page out of an already filtered, ordered list.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.skip() as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub availability: Option<Availability>,
    pub color: Option<ColorName>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default)]
pub struct AdminQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AdminStatus>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
    pub kind: Option<NotificationKind>,
    pub read: Option<bool>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub sender_id: Option<String>,
    pub pagination: Pagination,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_product(&self, product: &Product) -> StoreResult<()>;
    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>>;
    /// Products with the given ids, in the order of `ids`; unknown ids are skipped.
    async fn find_products(&self, ids: &[String]) -> StoreResult<Vec<Product>>;
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<(Vec<Product>, u64)>;
    /// Returns false when no product with that id exists.
    async fn replace_product(&self, product: &Product) -> StoreResult<bool>;
    /// Deletes the product and pulls its id out of every section.
    async fn delete_product(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Inserts the seeds whose name is not taken yet, returning how many were added.
    async fn seed_sections(&self, seeds: &[SectionSeed]) -> StoreResult<usize>;
    async fn list_sections(&self) -> StoreResult<Vec<Section>>;
    async fn find_section(&self, id: &str) -> StoreResult<Option<Section>>;
    async fn set_section_items(&self, id: &str, items: &[String]) -> StoreResult<Option<Section>>;
    async fn remove_section_item(
        &self,
        id: &str,
        product_id: &str,
    ) -> StoreResult<Option<Section>>;

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()>;
    async fn find_admin(&self, id: &str) -> StoreResult<Option<Admin>>;
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;
    async fn list_admins(&self, query: &AdminQuery) -> StoreResult<(Vec<Admin>, u64)>;
    async fn replace_admin(&self, admin: &Admin) -> StoreResult<bool>;

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;
    async fn list_notifications(
        &self,
        query: &NotificationQuery,
    ) -> StoreResult<(Vec<Notification>, u64)>;
    async fn count_unread(&self) -> StoreResult<u64>;
    async fn mark_notification_read(&self, id: &str) -> StoreResult<Option<Notification>>;
    async fn mark_all_read(&self) -> StoreResult<u64>;

    async fn record_visit(&self, visit: &Visit) -> StoreResult<()>;
    /// Visits in the half-open range `[from, to)`.
    async fn count_visits(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let page = Pagination { page: 3, limit: 4 };
        assert_eq!(page.skip(), 8);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(8), 2);
        assert_eq!(page.total_pages(9), 3);

        let items: Vec<u32> = (0..10).collect();
        assert_eq!(page.slice(&items), vec![8, 9]);
        assert!(Pagination { page: 4, limit: 4 }.slice(&items).is_empty());

        let far = Pagination { page: u64::MAX, limit: 100 };
        assert_eq!(far.skip(), u64::MAX);
        assert!(far.slice(&items).is_empty());
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, new_id());
    }
}
