//! # Sections
//!
//! Curated, ordered lists of products shown together on the storefront.
//!
//! The set of sections is fixed: [`SEED_SECTIONS`] is inserted at startup and
//! admins only ever change which products a section lists.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub struct SectionSeed {
    pub name: &'static str,
    pub description: &'static str,
}

pub const SEED_SECTIONS: [SectionSeed; 5] = [
    SectionSeed {
        name: "New Arrivals",
        description: "The latest pieces to land in the shop.",
    },
    SectionSeed {
        name: "Best Sellers",
        description: "What customers keep coming back for.",
    },
    SectionSeed {
        name: "Winter Collection",
        description: "Heavy knits for the coldest months.",
    },
    SectionSeed {
        name: "Summer Essentials",
        description: "Light blends for warm evenings.",
    },
    SectionSeed {
        name: "Staff Picks",
        description: "Favourites chosen by the team.",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub items: Vec<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Section {
    pub fn from_seed(id: String, seed: &SectionSeed, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|item| item == product_id)
    }
}
