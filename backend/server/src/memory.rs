use async_trait::async_trait;
use catalog::{
    Vocabulary,
    admins::Admin,
    notifications::Notification,
    products::Product,
    sections::{Section, SectionSeed},
    traffic::Visit,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    search::contains_text,
    store::{
        AdminQuery, NotificationQuery, Pagination, ProductQuery, Store, StoreError, StoreResult,
        new_id,
    },
};

/// In-process [`Store`] with the same filtering and ordering rules as MongoDB.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    sections: Vec<Section>,
    admins: Vec<Admin>,
    notifications: Vec<Notification>,
    visits: Vec<Visit>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first. Between equal timestamps the later insert wins.
fn page<T: Clone>(
    mut matches: Vec<&T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    pagination: &Pagination,
) -> (Vec<T>, u64) {
    matches.reverse();
    matches.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    let owned: Vec<T> = matches.into_iter().cloned().collect();

    (pagination.slice(&owned), owned.len() as u64)
}

fn product_matches(product: &Product, query: &ProductQuery) -> bool {
    query
        .search
        .as_deref()
        .is_none_or(|search| contains_text(&product.name, search))
        && query
            .availability
            .is_none_or(|availability| product.availability == availability)
        && query
            .color
            .is_none_or(|color| product.colors.iter().any(|option| option.name == color))
}

fn admin_matches(admin: &Admin, query: &AdminQuery) -> bool {
    query.search.as_deref().is_none_or(|search| {
        contains_text(&admin.full_name, search) || contains_text(&admin.email, search)
    }) && query.role.is_none_or(|role| admin.role == role)
        && query.status.is_none_or(|status| admin.status == status)
}

fn notification_matches(notification: &Notification, query: &NotificationQuery) -> bool {
    query.kind.is_none_or(|kind| notification.kind == kind)
        && query.read.is_none_or(|read| notification.read == read)
        && query
            .search
            .as_deref()
            .is_none_or(|search| contains_text(notification.title.as_str(), search))
        && query
            .sender_id
            .as_deref()
            .is_none_or(|sender_id| notification.sender_id == sender_id)
        && query.from.is_none_or(|from| notification.created_at >= from)
        && query.to.is_none_or(|to| notification.created_at <= to)
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.inner.write().await.products.push(product.clone());
        Ok(())
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|product| product.id == id).cloned())
    }

    async fn find_products(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        let inner = self.inner.read().await;

        Ok(ids
            .iter()
            .filter_map(|id| inner.products.iter().find(|product| &product.id == id))
            .cloned()
            .collect())
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<(Vec<Product>, u64)> {
        let inner = self.inner.read().await;
        let matches = inner
            .products
            .iter()
            .filter(|product| product_matches(product, query))
            .collect();

        Ok(page(matches, |product| product.created_at, &query.pagination))
    }

    async fn replace_product(&self, product: &Product) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        match inner.products.iter_mut().find(|stored| stored.id == product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let mut inner = self.inner.write().await;

        let Some(position) = inner.products.iter().position(|product| product.id == id) else {
            return Ok(None);
        };
        let removed = inner.products.remove(position);

        let now = Utc::now();
        for section in inner.sections.iter_mut().filter(|section| section.contains(id)) {
            section.items.retain(|item| item != id);
            section.updated_at = now;
        }

        Ok(Some(removed))
    }

    async fn seed_sections(&self, seeds: &[SectionSeed]) -> StoreResult<usize> {
        let mut inner = self.inner.write().await;
        let mut inserted = 0;

        for seed in seeds {
            if inner.sections.iter().any(|section| section.name == seed.name) {
                continue;
            }

            inner
                .sections
                .push(Section::from_seed(new_id(), seed, Utc::now()));
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn list_sections(&self) -> StoreResult<Vec<Section>> {
        Ok(self.inner.read().await.sections.clone())
    }

    async fn find_section(&self, id: &str) -> StoreResult<Option<Section>> {
        let inner = self.inner.read().await;
        Ok(inner.sections.iter().find(|section| section.id == id).cloned())
    }

    async fn set_section_items(&self, id: &str, items: &[String]) -> StoreResult<Option<Section>> {
        let mut inner = self.inner.write().await;

        Ok(inner
            .sections
            .iter_mut()
            .find(|section| section.id == id)
            .map(|section| {
                section.items = items.to_vec();
                section.updated_at = Utc::now();
                section.clone()
            }))
    }

    async fn remove_section_item(
        &self,
        id: &str,
        product_id: &str,
    ) -> StoreResult<Option<Section>> {
        let mut inner = self.inner.write().await;

        Ok(inner
            .sections
            .iter_mut()
            .find(|section| section.id == id && section.contains(product_id))
            .map(|section| {
                section.items.retain(|item| item != product_id);
                section.updated_at = Utc::now();
                section.clone()
            }))
    }

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        let mut inner = self.inner.write().await;

        if inner.admins.iter().any(|stored| stored.email == admin.email) {
            return Err(StoreError::Duplicate("email".to_string()));
        }

        inner.admins.push(admin.clone());
        Ok(())
    }

    async fn find_admin(&self, id: &str) -> StoreResult<Option<Admin>> {
        let inner = self.inner.read().await;
        Ok(inner.admins.iter().find(|admin| admin.id == id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let email = email.to_lowercase();
        let inner = self.inner.read().await;

        Ok(inner.admins.iter().find(|admin| admin.email == email).cloned())
    }

    async fn list_admins(&self, query: &AdminQuery) -> StoreResult<(Vec<Admin>, u64)> {
        let inner = self.inner.read().await;
        let matches = inner
            .admins
            .iter()
            .filter(|admin| admin_matches(admin, query))
            .collect();

        Ok(page(matches, |admin| admin.created_at, &query.pagination))
    }

    async fn replace_admin(&self, admin: &Admin) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        if inner
            .admins
            .iter()
            .any(|stored| stored.id != admin.id && stored.email == admin.email)
        {
            return Err(StoreError::Duplicate("email".to_string()));
        }

        match inner.admins.iter_mut().find(|stored| stored.id == admin.id) {
            Some(stored) => {
                *stored = admin.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn list_notifications(
        &self,
        query: &NotificationQuery,
    ) -> StoreResult<(Vec<Notification>, u64)> {
        let inner = self.inner.read().await;
        let matches = inner
            .notifications
            .iter()
            .filter(|notification| notification_matches(notification, query))
            .collect();

        Ok(page(
            matches,
            |notification| notification.created_at,
            &query.pagination,
        ))
    }

    async fn count_unread(&self) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.notifications.iter().filter(|n| !n.read).count() as u64)
    }

    async fn mark_notification_read(&self, id: &str) -> StoreResult<Option<Notification>> {
        let mut inner = self.inner.write().await;

        Ok(inner
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
            .map(|notification| {
                notification.read = true;
                notification.clone()
            }))
    }

    async fn mark_all_read(&self) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let mut changed = 0;

        for notification in inner.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }

        Ok(changed)
    }

    async fn record_visit(&self, visit: &Visit) -> StoreResult<()> {
        self.inner.write().await.visits.push(visit.clone());
        Ok(())
    }

    async fn count_visits(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<u64> {
        let inner = self.inner.read().await;

        Ok(inner
            .visits
            .iter()
            .filter(|visit| visit.visited_at >= from && visit.visited_at < to)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use catalog::{
        products::{Availability, ColorName, ColorOption, ProductImages},
        sections::SEED_SECTIONS,
    };
    use chrono::NaiveDate;

    use super::*;

    fn product(name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: new_id(),
            name: name.to_string(),
            description: "Soft".to_string(),
            description_text: "Soft and warm".to_string(),
            unisex: false,
            wool_percentage: 80.0,
            price: 120.0,
            release_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            availability: Availability::InStock,
            seasons: vec![],
            colors: vec![ColorOption {
                name: ColorName::Navy,
                sizes: vec![],
            }],
            images: ProductImages::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        assert_eq!(store.seed_sections(&SEED_SECTIONS).await.unwrap(), 5);
        assert_eq!(store.seed_sections(&SEED_SECTIONS).await.unwrap(), 0);
        assert_eq!(store.list_sections().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_delete_product_cascades() {
        let store = MemoryStore::new();
        store.seed_sections(&SEED_SECTIONS).await.unwrap();
        let kept = product("Kept");
        let gone = product("Gone");
        store.insert_product(&kept).await.unwrap();
        store.insert_product(&gone).await.unwrap();

        let sections = store.list_sections().await.unwrap();
        for section in &sections[..2] {
            store
                .set_section_items(&section.id, &[gone.id.clone(), kept.id.clone()])
                .await
                .unwrap();
        }

        assert!(store.delete_product(&gone.id).await.unwrap().is_some());
        assert!(store.delete_product(&gone.id).await.unwrap().is_none());

        for section in store.list_sections().await.unwrap() {
            assert!(!section.contains(&gone.id));
        }
        let first = store.find_section(&sections[0].id).await.unwrap().unwrap();
        assert_eq!(first.items, vec![kept.id.clone()]);
    }

    #[tokio::test]
    async fn test_list_products_filters_and_pages() {
        let store = MemoryStore::new();
        for name in ["Cable Jumper", "Cable Cardigan", "Plain Beanie"] {
            store.insert_product(&product(name)).await.unwrap();
        }

        let (items, total) = store
            .list_products(&ProductQuery {
                search: Some("cable".to_string()),
                pagination: Pagination { page: 1, limit: 1 },
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.len(), 1);

        let (_, total) = store
            .list_products(&ProductQuery {
                color: Some(ColorName::Red),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_find_products_keeps_order() {
        let store = MemoryStore::new();
        let a = product("A");
        let b = product("B");
        store.insert_product(&a).await.unwrap();
        store.insert_product(&b).await.unwrap();

        let found = store
            .find_products(&[b.id.clone(), new_id(), a.id.clone()])
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
