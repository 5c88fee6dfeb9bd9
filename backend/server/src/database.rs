//! # MongoDB
//!
//! Document database holding every collection of the back-office.
//!
//! ## Collections
//!
//! - `products`: one document per product, colour/size matrix embedded
//! - `sections`: seeded at startup, only `items` changes afterwards
//! - `admins`: unique index on `email`
//! - `notifications`: append-only apart from the `read` flag
//! - `traffic`: one document per page view
//!
//! ## Product deletion
//!
//! Deleting a product also pulls its id out of every section. With
//! transactions enabled (replica set or Atlas) both writes commit together.
//! Standalone servers cannot run transactions, so the sections are cleaned
//! first and the product removed last: if the second step fails the product
//! is still there and deleting it again finishes the job.
use async_trait::async_trait;
use catalog::{
    admins::Admin,
    notifications::Notification,
    products::Product,
    sections::{Section, SectionSeed},
    timestamp,
    traffic::Visit,
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use tracing::{info, warn};

use crate::{
    search::{admin_filter, newest_first, notification_filter, product_filter},
    store::{
        AdminQuery, NotificationQuery, Pagination, ProductQuery, Store, StoreError, StoreResult,
        new_id,
    },
};

const PRODUCTS: &str = "products";
const SECTIONS: &str = "sections";
const ADMINS: &str = "admins";
const NOTIFICATIONS: &str = "notifications";
const TRAFFIC: &str = "traffic";

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    client: Client,
    database: Database,
    transactions: bool,
}

pub async fn init_mongo(
    mongo_url: &str,
    database: &str,
    transactions: bool,
) -> StoreResult<MongoStore> {
    let client = Client::with_uri_str(mongo_url).await?;
    let database = client.database(database);

    database.run_command(doc! { "ping": 1 }, None).await?;
    info!("Connected to MongoDB database {}", database.name());

    let store = MongoStore {
        client,
        database,
        transactions,
    };
    store.create_indexes().await?;

    Ok(store)
}

fn by_id(id: &str) -> Document {
    doc! { "_id": id }
}

fn after_update() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

fn page_options(pagination: &Pagination) -> FindOptions {
    FindOptions::builder()
        .sort(newest_first())
        .skip(pagination.skip())
        .limit(pagination.limit as i64)
        .build()
}

fn duplicate_or(error: mongodb::error::Error, field: &str) -> StoreError {
    let duplicate = matches!(
        *error.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write)) if write.code == DUPLICATE_KEY
    );

    if duplicate {
        StoreError::Duplicate(field.to_string())
    } else {
        StoreError::Database(error)
    }
}

fn now() -> String {
    timestamp::format(&Utc::now())
}

impl MongoStore {
    fn products(&self) -> Collection<Product> {
        self.database.collection(PRODUCTS)
    }

    fn sections(&self) -> Collection<Section> {
        self.database.collection(SECTIONS)
    }

    fn admins(&self) -> Collection<Admin> {
        self.database.collection(ADMINS)
    }

    fn notifications(&self) -> Collection<Notification> {
        self.database.collection(NOTIFICATIONS)
    }

    fn traffic(&self) -> Collection<Visit> {
        self.database.collection(TRAFFIC)
    }

    async fn create_indexes(&self) -> StoreResult<()> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.admins().create_index(unique_email, None).await?;

        let newest = IndexModel::builder().keys(newest_first()).build();
        self.notifications().create_index(newest, None).await?;

        let visited = IndexModel::builder().keys(doc! { "visitedAt": 1 }).build();
        self.traffic().create_index(visited, None).await?;

        Ok(())
    }

    async fn delete_product_in_transaction(&self, id: &str) -> StoreResult<Option<Product>> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let result = async {
            let removed = self
                .products()
                .find_one_and_delete_with_session(by_id(id), None, &mut session)
                .await?;

            if removed.is_some() {
                self.sections()
                    .update_many_with_session(
                        doc! { "items": id },
                        doc! { "$pull": { "items": id }, "$set": { "updatedAt": now() } },
                        None,
                        &mut session,
                    )
                    .await?;
            }

            Ok::<_, mongodb::error::Error>(removed)
        }
        .await;

        match result {
            Ok(removed) => {
                session.commit_transaction().await?;
                Ok(removed)
            }
            Err(e) => {
                if let Err(abort) = session.abort_transaction().await {
                    warn!("Failed to abort product delete transaction: {abort}");
                }
                Err(e.into())
            }
        }
    }

    async fn delete_product_sections_first(&self, id: &str) -> StoreResult<Option<Product>> {
        if self.find_product(id).await?.is_none() {
            return Ok(None);
        }

        let cleaned = self
            .sections()
            .update_many(
                doc! { "items": id },
                doc! { "$pull": { "items": id }, "$set": { "updatedAt": now() } },
                None,
            )
            .await?;
        info!("Removed product {id} from {} sections", cleaned.modified_count);

        Ok(self.products().find_one_and_delete(by_id(id), None).await?)
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.products().insert_one(product, None).await?;
        Ok(())
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products().find_one(by_id(id), None).await?)
    }

    async fn find_products(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        let found: Vec<Product> = self
            .products()
            .find(doc! { "_id": { "$in": ids } }, None)
            .await?
            .try_collect()
            .await?;

        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|product| &product.id == id).cloned())
            .collect())
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<(Vec<Product>, u64)> {
        let filter = product_filter(query);
        let total = self.products().count_documents(filter.clone(), None).await?;
        let items = self
            .products()
            .find(filter, page_options(&query.pagination))
            .await?
            .try_collect()
            .await?;

        Ok((items, total))
    }

    async fn replace_product(&self, product: &Product) -> StoreResult<bool> {
        let result = self
            .products()
            .replace_one(by_id(&product.id), product, None)
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete_product(&self, id: &str) -> StoreResult<Option<Product>> {
        if self.transactions {
            self.delete_product_in_transaction(id).await
        } else {
            self.delete_product_sections_first(id).await
        }
    }

    async fn seed_sections(&self, seeds: &[SectionSeed]) -> StoreResult<usize> {
        let mut inserted = 0;

        for seed in seeds {
            let existing = self
                .sections()
                .find_one(doc! { "name": seed.name }, None)
                .await?;

            if existing.is_none() {
                let section = Section::from_seed(new_id(), seed, Utc::now());
                self.sections().insert_one(&section, None).await?;
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    async fn list_sections(&self) -> StoreResult<Vec<Section>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();

        Ok(self
            .sections()
            .find(None, options)
            .await?
            .try_collect()
            .await?)
    }

    async fn find_section(&self, id: &str) -> StoreResult<Option<Section>> {
        Ok(self.sections().find_one(by_id(id), None).await?)
    }

    async fn set_section_items(&self, id: &str, items: &[String]) -> StoreResult<Option<Section>> {
        Ok(self
            .sections()
            .find_one_and_update(
                by_id(id),
                doc! { "$set": { "items": items, "updatedAt": now() } },
                after_update(),
            )
            .await?)
    }

    async fn remove_section_item(
        &self,
        id: &str,
        product_id: &str,
    ) -> StoreResult<Option<Section>> {
        Ok(self
            .sections()
            .find_one_and_update(
                doc! { "_id": id, "items": product_id },
                doc! { "$pull": { "items": product_id }, "$set": { "updatedAt": now() } },
                after_update(),
            )
            .await?)
    }

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        self.admins()
            .insert_one(admin, None)
            .await
            .map_err(|e| duplicate_or(e, "email"))?;

        Ok(())
    }

    async fn find_admin(&self, id: &str) -> StoreResult<Option<Admin>> {
        Ok(self.admins().find_one(by_id(id), None).await?)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        Ok(self
            .admins()
            .find_one(doc! { "email": email.to_lowercase() }, None)
            .await?)
    }

    async fn list_admins(&self, query: &AdminQuery) -> StoreResult<(Vec<Admin>, u64)> {
        let filter = admin_filter(query);
        let total = self.admins().count_documents(filter.clone(), None).await?;
        let items = self
            .admins()
            .find(filter, page_options(&query.pagination))
            .await?
            .try_collect()
            .await?;

        Ok((items, total))
    }

    async fn replace_admin(&self, admin: &Admin) -> StoreResult<bool> {
        let result = self
            .admins()
            .replace_one(by_id(&admin.id), admin, None)
            .await
            .map_err(|e| duplicate_or(e, "email"))?;

        Ok(result.matched_count > 0)
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.notifications().insert_one(notification, None).await?;
        Ok(())
    }

    async fn list_notifications(
        &self,
        query: &NotificationQuery,
    ) -> StoreResult<(Vec<Notification>, u64)> {
        let filter = notification_filter(query);
        let total = self
            .notifications()
            .count_documents(filter.clone(), None)
            .await?;
        let items = self
            .notifications()
            .find(filter, page_options(&query.pagination))
            .await?
            .try_collect()
            .await?;

        Ok((items, total))
    }

    async fn count_unread(&self) -> StoreResult<u64> {
        Ok(self
            .notifications()
            .count_documents(doc! { "read": false }, None)
            .await?)
    }

    async fn mark_notification_read(&self, id: &str) -> StoreResult<Option<Notification>> {
        Ok(self
            .notifications()
            .find_one_and_update(by_id(id), doc! { "$set": { "read": true } }, after_update())
            .await?)
    }

    async fn mark_all_read(&self) -> StoreResult<u64> {
        let result = self
            .notifications()
            .update_many(doc! { "read": false }, doc! { "$set": { "read": true } }, None)
            .await?;

        Ok(result.modified_count)
    }

    async fn record_visit(&self, visit: &Visit) -> StoreResult<()> {
        self.traffic().insert_one(visit, None).await?;
        Ok(())
    }

    async fn count_visits(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<u64> {
        let filter = doc! {
            "visitedAt": { "$gte": timestamp::format(&from), "$lt": timestamp::format(&to) }
        };

        Ok(self.traffic().count_documents(filter, None).await?)
    }
}
