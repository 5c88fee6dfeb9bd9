//! # Search
//!
//! Translates listing queries into MongoDB filter documents.
//!
//! Free-text search is a case-insensitive substring match. The user's text is
//! escaped before it becomes a `$regex`, so `"navy (slim)"` matches literally
//! instead of being read as a pattern. The in-memory store applies the same
//! rule through [`contains_text`].
//!
//! Date bounds compare the fixed-width timestamp strings written by
//! [`catalog::timestamp`].
use catalog::{Vocabulary, timestamp};
use mongodb::bson::{Document, doc};

use crate::store::{AdminQuery, NotificationQuery, ProductQuery};

pub const PRODUCT_NAME: &str = "name";
pub const PRODUCT_AVAILABILITY: &str = "availability";
pub const PRODUCT_COLOR: &str = "colors.name";
pub const ADMIN_EMAIL: &str = "email";
pub const ADMIN_NAME: &str = "fullName";
pub const CREATED_AT: &str = "createdAt";

fn pattern(text: &str) -> Document {
    doc! { "$regex": regex::escape(text.trim()), "$options": "i" }
}

pub fn contains_text(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}

pub fn newest_first() -> Document {
    doc! { CREATED_AT: -1 }
}

pub fn product_filter(query: &ProductQuery) -> Document {
    let mut filter = Document::new();

    if let Some(search) = &query.search {
        filter.insert(PRODUCT_NAME, pattern(search));
    }
    if let Some(availability) = query.availability {
        filter.insert(PRODUCT_AVAILABILITY, availability.as_str());
    }
    if let Some(color) = query.color {
        filter.insert(PRODUCT_COLOR, color.as_str());
    }

    filter
}

pub fn admin_filter(query: &AdminQuery) -> Document {
    let mut filter = Document::new();

    if let Some(search) = &query.search {
        filter.insert(
            "$or",
            vec![
                doc! { ADMIN_NAME: pattern(search) },
                doc! { ADMIN_EMAIL: pattern(search) },
            ],
        );
    }
    if let Some(role) = query.role {
        filter.insert("role", role.as_str());
    }
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }

    filter
}

pub fn notification_filter(query: &NotificationQuery) -> Document {
    let mut filter = Document::new();

    if let Some(kind) = query.kind {
        filter.insert("type", kind.as_str());
    }
    if let Some(read) = query.read {
        filter.insert("read", read);
    }
    if let Some(search) = &query.search {
        filter.insert("title", pattern(search));
    }
    if let Some(sender_id) = &query.sender_id {
        filter.insert("senderId", sender_id.as_str());
    }

    let mut created_at = Document::new();
    if let Some(from) = &query.from {
        created_at.insert("$gte", timestamp::format(from));
    }
    if let Some(to) = &query.to {
        created_at.insert("$lte", timestamp::format(to));
    }
    if !created_at.is_empty() {
        filter.insert(CREATED_AT, created_at);
    }

    filter
}
