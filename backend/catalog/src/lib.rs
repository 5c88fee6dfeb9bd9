//! # Catalog
//!
//! Domain vocabulary shared by the API server and the smoke tester.
//!
//! Every document stored by the back-office lives here: products and their
//! colour/size matrix, the curated sections, admin accounts, the notification
//! feed and page-view counters. Closed value sets (availability, seasons,
//! colours, sizes, roles, notification titles) are plain enums implementing
//! [`Vocabulary`], so the validator can check raw payload strings against the
//! exact same lists the typed documents serialize to.
//!
//! ## Identifiers
//!
//! Documents are keyed by an opaque 24 hex digit string stored in `_id`. The
//! server mints them; this crate only carries them around.
//!
//! ## Timestamps
//!
//! Stored and returned as RFC 3339 strings with millisecond precision in UTC,
//! see [`timestamp`]. Fixed width keeps them ordered under plain string
//! comparison, which the document store relies on for date range filters.

pub mod admins;
pub mod notifications;
pub mod products;
pub mod sections;
pub mod timestamp;
pub mod traffic;

/// A closed set of string values.
pub trait Vocabulary: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|item| item.as_str() == value)
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}
