//! # Notifications
//!
//! Every mutating admin action leaves one record behind. The same records
//! serve as the activity log (who did what) and as the dashboard alert feed
//! (what has not been read yet).
//!
//! `recipient_id` exists on the document but is never set: the feed is shared
//! by every admin.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Product,
    Section,
    Admin,
}

impl Vocabulary for NotificationKind {
    const ALL: &'static [Self] = &[Self::Product, Self::Section, Self::Admin];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Section => "section",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationTitle {
    #[serde(rename = "Product Added")]
    ProductAdded,
    #[serde(rename = "Product Updated")]
    ProductUpdated,
    #[serde(rename = "Product Deleted")]
    ProductDeleted,
    #[serde(rename = "Product Image Updated")]
    ProductImageUpdated,
    #[serde(rename = "Section Updated")]
    SectionUpdated,
    #[serde(rename = "Section Item Removed")]
    SectionItemRemoved,
    #[serde(rename = "Admin Added")]
    AdminAdded,
    #[serde(rename = "Admin Suspended")]
    AdminSuspended,
    #[serde(rename = "Admin Activated")]
    AdminActivated,
    #[serde(rename = "Admin Deleted")]
    AdminDeleted,
    #[serde(rename = "Admin Upgraded")]
    AdminUpgraded,
    #[serde(rename = "Admin Downgraded")]
    AdminDowngraded,
    #[serde(rename = "Profile Updated")]
    ProfileUpdated,
    #[serde(rename = "Password Updated")]
    PasswordUpdated,
}

impl Vocabulary for NotificationTitle {
    const ALL: &'static [Self] = &[
        Self::ProductAdded,
        Self::ProductUpdated,
        Self::ProductDeleted,
        Self::ProductImageUpdated,
        Self::SectionUpdated,
        Self::SectionItemRemoved,
        Self::AdminAdded,
        Self::AdminSuspended,
        Self::AdminActivated,
        Self::AdminDeleted,
        Self::AdminUpgraded,
        Self::AdminDowngraded,
        Self::ProfileUpdated,
        Self::PasswordUpdated,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::ProductAdded => "Product Added",
            Self::ProductUpdated => "Product Updated",
            Self::ProductDeleted => "Product Deleted",
            Self::ProductImageUpdated => "Product Image Updated",
            Self::SectionUpdated => "Section Updated",
            Self::SectionItemRemoved => "Section Item Removed",
            Self::AdminAdded => "Admin Added",
            Self::AdminSuspended => "Admin Suspended",
            Self::AdminActivated => "Admin Activated",
            Self::AdminDeleted => "Admin Deleted",
            Self::AdminUpgraded => "Admin Upgraded",
            Self::AdminDowngraded => "Admin Downgraded",
            Self::ProfileUpdated => "Profile Updated",
            Self::PasswordUpdated => "Password Updated",
        }
    }
}

impl NotificationTitle {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::ProductAdded
            | Self::ProductUpdated
            | Self::ProductDeleted
            | Self::ProductImageUpdated => NotificationKind::Product,
            Self::SectionUpdated | Self::SectionItemRemoved => NotificationKind::Section,
            Self::AdminAdded
            | Self::AdminSuspended
            | Self::AdminActivated
            | Self::AdminDeleted
            | Self::AdminUpgraded
            | Self::AdminDowngraded
            | Self::ProfileUpdated
            | Self::PasswordUpdated => NotificationKind::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub sender_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: NotificationTitle,
    pub message: String,
    pub read: bool,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}
