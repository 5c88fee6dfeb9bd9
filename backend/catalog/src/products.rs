//! # Products
//!
//! A product is sold in one or more colours, and every colour carries the full
//! size run of the product's grouping:
//! - men's products list [`MEN_SIZES`]
//! - unisex products list [`MEN_SIZES`] followed by [`WOMEN_SIZES`]
//!
//! Stock is tracked per colour and size, each with its own availability.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Vocabulary;

pub const MEN_SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];
pub const WOMEN_SIZES: [&str; 6] = ["34", "36", "38", "40", "42", "44"];

/// Size names every colour option of a product must list.
pub fn expected_sizes(unisex: bool) -> Vec<&'static str> {
    let mut sizes = MEN_SIZES.to_vec();

    if unisex {
        sizes.extend(WOMEN_SIZES);
    }

    sizes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Discounted,
    ComingSoon,
    OutOfSeason,
    Unavailable,
}

impl Vocabulary for Availability {
    const ALL: &'static [Self] = &[
        Self::InStock,
        Self::OutOfStock,
        Self::Discounted,
        Self::ComingSoon,
        Self::OutOfSeason,
        Self::Unavailable,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Discounted => "discounted",
            Self::ComingSoon => "coming_soon",
            Self::OutOfSeason => "out_of_season",
            Self::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Vocabulary for Season {
    const ALL: &'static [Self] = &[Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorName {
    Black,
    White,
    Grey,
    Charcoal,
    Navy,
    Blue,
    Green,
    Olive,
    Red,
    Burgundy,
    Beige,
    Camel,
    Brown,
    Cream,
}

impl Vocabulary for ColorName {
    const ALL: &'static [Self] = &[
        Self::Black,
        Self::White,
        Self::Grey,
        Self::Charcoal,
        Self::Navy,
        Self::Blue,
        Self::Green,
        Self::Olive,
        Self::Red,
        Self::Burgundy,
        Self::Beige,
        Self::Camel,
        Self::Brown,
        Self::Cream,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Grey => "grey",
            Self::Charcoal => "charcoal",
            Self::Navy => "navy",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Olive => "olive",
            Self::Red => "red",
            Self::Burgundy => "burgundy",
            Self::Beige => "beige",
            Self::Camel => "camel",
            Self::Brown => "brown",
            Self::Cream => "cream",
        }
    }
}

/// Which photo of a product an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageAngle {
    Front,
    Back,
    Side,
    Detail,
}

impl Vocabulary for ImageAngle {
    const ALL: &'static [Self] = &[Self::Front, Self::Back, Self::Side, Self::Detail];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Side => "side",
            Self::Detail => "detail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub name: String,
    pub quantity: u32,
    pub availability: Availability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    pub name: ColorName,
    pub sizes: Vec<Size>,
}

impl ColorOption {
    /// Expected size names this option does not list, in size-run order.
    pub fn missing_sizes(&self, unisex: bool) -> Vec<&'static str> {
        expected_sizes(unisex)
            .into_iter()
            .filter(|expected| !self.sizes.iter().any(|size| size.name == *expected))
            .collect()
    }

    /// Listed sizes that do not belong to the run, with their index.
    pub fn unexpected_sizes(&self, unisex: bool) -> Vec<(usize, &str)> {
        let allowed = expected_sizes(unisex);

        self.sizes
            .iter()
            .enumerate()
            .filter(|(_, size)| !allowed.contains(&size.name.as_str()))
            .map(|(index, size)| (index, size.name.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProductImages {
    fn slot(&mut self, angle: ImageAngle) -> &mut Option<String> {
        match angle {
            ImageAngle::Front => &mut self.front,
            ImageAngle::Back => &mut self.back,
            ImageAngle::Side => &mut self.side,
            ImageAngle::Detail => &mut self.detail,
        }
    }

    /// Stores `path` for `angle`, returning the path it replaced.
    pub fn replace(&mut self, angle: ImageAngle, path: String) -> Option<String> {
        self.slot(angle).replace(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub description_text: String,
    pub unisex: bool,
    pub wool_percentage: f64,
    pub price: f64,
    pub release_date: NaiveDate,
    pub availability: Availability,
    pub seasons: Vec<Season>,
    pub colors: Vec<ColorOption>,
    #[serde(default)]
    pub images: ProductImages,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}
