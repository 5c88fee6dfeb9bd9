use std::collections::HashSet;

use catalog::{
    Vocabulary,
    products::{
        Availability, ColorName, ColorOption, Product, ProductImages, Season, expected_sizes,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{
    DUPLICATE, EMPTY, INVALID_ENUM, INVALID_TYPE, MISSING_SIZE, Mode, REQUIRED, Validator,
    check_array, check_enum, check_quantity, deserialize_date, deserialize_optional_date,
    validated,
};
use crate::error::{AppError, ValidationError};

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 300;
pub const DESCRIPTION_TEXT_MAX: usize = 5000;

/// Checks a product payload. `existing` is the stored product on update and
/// `None` on create.
pub fn validate_product(payload: &Value, existing: Option<&Product>) -> Vec<ValidationError> {
    let mode = match existing {
        Some(_) => Mode::Update,
        None => Mode::Create,
    };
    let mut validator = Validator::new(payload, mode);

    validator.string("name", NAME_MAX);
    validator.string("description", DESCRIPTION_MAX);
    validator.string("descriptionText", DESCRIPTION_TEXT_MAX);
    let unisex = validator.boolean("unisex");
    validator.number("woolPercentage", 0.0, 100.0, true);
    validator.number("price", 0.0, f64::INFINITY, false);
    validator.date("releaseDate");
    validator.enumeration::<Availability>("availability");

    if let Some(seasons) = validator.array("seasons") {
        check_seasons(validator.errors_mut(), seasons);
    }

    // Size completeness follows the submitted grouping, falling back to the
    // stored one on update. An unusable `unisex` on create already failed above.
    let grouping = unisex.or(existing.map(|product| product.unisex));

    if let Some(colors) = validator.array("colors") {
        check_colors(validator.errors_mut(), colors, grouping);
    } else if let (Some(product), Some(unisex)) = (existing, unisex) {
        if unisex != product.unisex {
            check_stored_colors(validator.errors_mut(), &product.colors, unisex);
        }
    }

    validator.finish()
}

fn check_seasons(errors: &mut Vec<ValidationError>, seasons: &[Value]) {
    if seasons.is_empty() {
        errors.push(ValidationError::new(
            "seasons",
            EMPTY,
            "seasons must list at least one season",
        ));
        return;
    }

    let mut seen = HashSet::new();
    for (index, value) in seasons.iter().enumerate() {
        let path = format!("seasons[{index}]");

        if let Some(season) = check_enum::<Season>(errors, &path, value) {
            if !seen.insert(season.as_str()) {
                errors.push(ValidationError::new(
                    path,
                    DUPLICATE,
                    format!("Season {} is listed twice", season.as_str()),
                ));
            }
        }
    }
}

fn check_colors(errors: &mut Vec<ValidationError>, colors: &[Value], unisex: Option<bool>) {
    if colors.is_empty() {
        errors.push(ValidationError::new(
            "colors",
            EMPTY,
            "colors must list at least one color",
        ));
        return;
    }

    let mut seen = HashSet::new();
    for (index, option) in colors.iter().enumerate() {
        let path = format!("colors[{index}]");

        let Some(option) = option.as_object() else {
            errors.push(ValidationError::new(
                path.clone(),
                INVALID_TYPE,
                format!("{path} must be an object with name and sizes"),
            ));
            continue;
        };

        let name_path = format!("{path}.name");
        let color = match option.get("name") {
            Some(value) => check_enum::<ColorName>(errors, &name_path, value),
            None => {
                errors.push(ValidationError::new(
                    name_path.clone(),
                    REQUIRED,
                    format!("{name_path} is required"),
                ));
                None
            }
        };

        if let Some(color) = color {
            if !seen.insert(color.as_str()) {
                errors.push(ValidationError::new(
                    name_path,
                    DUPLICATE,
                    format!("Color {} is listed twice", color.as_str()),
                ));
            }
        }

        let sizes_path = format!("{path}.sizes");
        let sizes = match option.get("sizes") {
            Some(value) => check_array(errors, &sizes_path, value),
            None => {
                errors.push(ValidationError::new(
                    sizes_path.clone(),
                    REQUIRED,
                    format!("{sizes_path} is required"),
                ));
                None
            }
        };

        if let Some(sizes) = sizes {
            check_sizes(errors, &sizes_path, sizes, color, unisex);
        }
    }
}

fn check_sizes(
    errors: &mut Vec<ValidationError>,
    path: &str,
    sizes: &[Value],
    color: Option<ColorName>,
    unisex: Option<bool>,
) {
    // Without a usable grouping accept any known size and skip completeness.
    let allowed = expected_sizes(unisex.unwrap_or(true));
    let mut listed = HashSet::new();

    for (index, size) in sizes.iter().enumerate() {
        let size_path = format!("{path}[{index}]");

        let Some(size) = size.as_object() else {
            errors.push(ValidationError::new(
                size_path.clone(),
                INVALID_TYPE,
                format!("{size_path} must be an object with name, quantity and availability"),
            ));
            continue;
        };

        let name_path = format!("{size_path}.name");
        match size.get("name").and_then(Value::as_str).map(str::trim) {
            Some(name) if allowed.contains(&name) => {
                if !listed.insert(name.to_string()) {
                    errors.push(ValidationError::new(
                        name_path,
                        DUPLICATE,
                        format!("Size {name} is listed twice"),
                    ));
                }
            }
            Some(name) => errors.push(unoffered_size(name_path, name, &allowed)),
            None => errors.push(ValidationError::new(
                name_path.clone(),
                REQUIRED,
                format!("{name_path} is required"),
            )),
        }

        let quantity_path = format!("{size_path}.quantity");
        match size.get("quantity") {
            Some(value) => {
                check_quantity(errors, &quantity_path, value);
            }
            None => errors.push(ValidationError::new(
                quantity_path.clone(),
                REQUIRED,
                format!("{quantity_path} is required"),
            )),
        }

        let availability_path = format!("{size_path}.availability");
        match size.get("availability") {
            Some(value) => {
                check_enum::<Availability>(errors, &availability_path, value);
            }
            None => errors.push(ValidationError::new(
                availability_path.clone(),
                REQUIRED,
                format!("{availability_path} is required"),
            )),
        }
    }

    if let Some(unisex) = unisex {
        let label = color.map(|c| c.as_str()).unwrap_or("this color");

        for expected in expected_sizes(unisex) {
            if !listed.contains(expected) {
                errors.push(missing_size(path, expected, label));
            }
        }
    }
}

fn check_stored_colors(errors: &mut Vec<ValidationError>, colors: &[ColorOption], unisex: bool) {
    let allowed = expected_sizes(unisex);

    for (index, option) in colors.iter().enumerate() {
        for (position, name) in option.unexpected_sizes(unisex) {
            errors.push(unoffered_size(
                format!("colors[{index}].sizes[{position}].name"),
                name,
                &allowed,
            ));
        }
        for expected in option.missing_sizes(unisex) {
            errors.push(missing_size(
                &format!("colors[{index}].sizes"),
                expected,
                option.name.as_str(),
            ));
        }
    }
}

fn unoffered_size(path: String, name: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::new(
        path,
        INVALID_ENUM,
        format!(
            "Size {name} is not offered for this product, expected one of: {}",
            allowed.join(", ")
        ),
    )
}

fn missing_size(path: &str, size: &str, color: &str) -> ValidationError {
    ValidationError::new(
        path,
        MISSING_SIZE,
        format!("Missing size \"{size}\" for color \"{color}\""),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub description_text: String,
    pub unisex: bool,
    pub wool_percentage: f64,
    pub price: f64,
    #[serde(deserialize_with = "deserialize_date")]
    pub release_date: NaiveDate,
    pub availability: Availability,
    pub seasons: Vec<Season>,
    pub colors: Vec<ColorOption>,
}

impl NewProduct {
    pub fn parse(payload: Value) -> Result<Self, AppError> {
        let errors = validate_product(&payload, None);
        validated(payload, errors)
    }

    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            description_text: self.description_text.trim().to_string(),
            unisex: self.unisex,
            wool_percentage: self.wool_percentage,
            price: self.price,
            release_date: self.release_date,
            availability: self.availability,
            seasons: self.seasons,
            colors: trim_sizes(self.colors),
            images: ProductImages::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub description_text: Option<String>,
    pub unisex: Option<bool>,
    pub wool_percentage: Option<f64>,
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
    pub availability: Option<Availability>,
    pub seasons: Option<Vec<Season>>,
    pub colors: Option<Vec<ColorOption>>,
}

impl ProductPatch {
    pub fn parse(payload: Value, existing: &Product) -> Result<Self, AppError> {
        let errors = validate_product(&payload, Some(existing));
        validated(payload, errors)
    }

    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            product.description = description.trim().to_string();
        }
        if let Some(description_text) = self.description_text {
            product.description_text = description_text.trim().to_string();
        }
        if let Some(unisex) = self.unisex {
            product.unisex = unisex;
        }
        if let Some(wool_percentage) = self.wool_percentage {
            product.wool_percentage = wool_percentage;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(release_date) = self.release_date {
            product.release_date = release_date;
        }
        if let Some(availability) = self.availability {
            product.availability = availability;
        }
        if let Some(seasons) = self.seasons {
            product.seasons = seasons;
        }
        if let Some(colors) = self.colors {
            product.colors = trim_sizes(colors);
        }

        product.updated_at = now;
    }
}

fn trim_sizes(mut colors: Vec<ColorOption>) -> Vec<ColorOption> {
    for option in &mut colors {
        for size in &mut option.sizes {
            size.name = size.name.trim().to_string();
        }
    }

    colors
}

#[cfg(test)]
mod tests {
    use catalog::products::{MEN_SIZES, WOMEN_SIZES};
    use serde_json::json;

    use super::*;

    fn sizes(names: &[&str]) -> Value {
        Value::Array(
            names
                .iter()
                .map(|name| json!({ "name": name, "quantity": 3, "availability": "in_stock" }))
                .collect(),
        )
    }

    fn payload(unisex: bool) -> Value {
        let run = if unisex {
            [MEN_SIZES.as_slice(), WOMEN_SIZES.as_slice()].concat()
        } else {
            MEN_SIZES.to_vec()
        };

        json!({
            "name": "Fisherman Jumper",
            "description": "Chunky cable knit",
            "descriptionText": "Knitted from undyed wool in a traditional cable pattern.",
            "unisex": unisex,
            "woolPercentage": 90,
            "price": 149.5,
            "releaseDate": "2026-09-01",
            "availability": "in_stock",
            "seasons": ["autumn", "winter"],
            "colors": [
                { "name": "navy", "sizes": sizes(&run) },
                { "name": "cream", "sizes": sizes(&run) }
            ]
        })
    }

    fn fields(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_payloads() {
        assert!(validate_product(&payload(false), None).is_empty());
        assert!(validate_product(&payload(true), None).is_empty());
    }

    #[test]
    fn test_every_missing_field_is_named() {
        let required = [
            "name",
            "description",
            "descriptionText",
            "unisex",
            "woolPercentage",
            "price",
            "releaseDate",
            "availability",
            "seasons",
            "colors",
        ];

        for field in required {
            let mut body = payload(false);
            body.as_object_mut().unwrap().remove(field);

            let errors = validate_product(&body, None);
            assert!(
                errors
                    .iter()
                    .any(|e| e.field == field && e.code == REQUIRED),
                "no required error for {field}: {errors:?}"
            );
        }
    }

    #[test]
    fn test_unisex_requires_both_size_runs() {
        let mut body = payload(true);
        body["colors"][0]["sizes"] = sizes(&MEN_SIZES);

        let errors = validate_product(&body, None);
        assert_eq!(errors.len(), WOMEN_SIZES.len());
        for (error, size) in errors.iter().zip(WOMEN_SIZES) {
            assert_eq!(error.field, "colors[0].sizes");
            assert_eq!(error.code, MISSING_SIZE);
            assert!(error.message.contains(&format!("\"{size}\"")));
            assert!(error.message.contains("navy"));
        }
    }

    #[test]
    fn test_women_sizes_rejected_for_mens_product() {
        let mut body = payload(false);
        body["colors"][1]["sizes"] =
            sizes(&["XS", "S", "M", "L", "XL", "XXL", "38"]);

        let errors = validate_product(&body, None);
        assert_eq!(fields(&errors), vec!["colors[1].sizes[6].name"]);
        assert_eq!(errors[0].code, INVALID_ENUM);
    }

    #[test]
    fn test_nested_errors_accumulate_in_order() {
        let mut body = payload(false);
        body["price"] = json!(0);
        body["woolPercentage"] = json!(120);
        body["colors"][0]["sizes"][2]["quantity"] = json!(-4);
        body["colors"][0]["sizes"][3]["availability"] = json!("sold");
        body["colors"][1]["name"] = json!("navy");

        let errors = validate_product(&body, None);
        assert_eq!(
            fields(&errors),
            vec![
                "woolPercentage",
                "price",
                "colors[0].sizes[2].quantity",
                "colors[0].sizes[3].availability",
                "colors[1].name",
            ]
        );
        assert_eq!(validate_product(&body, None), errors);
    }

    #[test]
    fn test_duplicate_sizes_and_seasons() {
        let mut body = payload(false);
        body["seasons"] = json!(["winter", "winter"]);
        body["colors"][0]["sizes"] = sizes(&["XS", "S", "M", "L", "XL", "XL"]);

        let errors = validate_product(&body, None);
        let codes: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.code)).collect();
        assert_eq!(
            codes,
            vec![
                ("seasons[1]", DUPLICATE),
                ("colors[0].sizes[5].name", DUPLICATE),
                ("colors[0].sizes", MISSING_SIZE),
            ]
        );
    }

    #[test]
    fn test_update_is_partial_but_checked() {
        let stored = NewProduct::parse(payload(false))
            .unwrap()
            .into_product("a".repeat(24), Utc::now());

        assert!(validate_product(&json!({}), Some(&stored)).is_empty());
        assert!(validate_product(&json!({ "price": 99 }), Some(&stored)).is_empty());

        let errors = validate_product(&json!({ "price": -1, "name": "" }), Some(&stored));
        assert_eq!(fields(&errors), vec!["name", "price"]);
    }

    #[test]
    fn test_switching_to_unisex_rechecks_stored_colors() {
        let stored = NewProduct::parse(payload(false))
            .unwrap()
            .into_product("a".repeat(24), Utc::now());

        let errors = validate_product(&json!({ "unisex": true }), Some(&stored));
        assert_eq!(errors.len(), 2 * WOMEN_SIZES.len());
        assert!(errors.iter().all(|e| e.code == MISSING_SIZE));

        let mut body = payload(true);
        body.as_object_mut().unwrap().retain(|k, _| k == "unisex" || k == "colors");
        assert!(validate_product(&body, Some(&stored)).is_empty());
    }

    #[test]
    fn test_switching_to_mens_rejects_stored_womens_sizes() {
        let stored = NewProduct::parse(payload(true))
            .unwrap()
            .into_product("a".repeat(24), Utc::now());

        let errors = validate_product(&json!({ "unisex": false }), Some(&stored));
        assert_eq!(errors.len(), 2 * WOMEN_SIZES.len());
        assert!(errors.iter().all(|e| e.code == INVALID_ENUM));
        assert_eq!(errors[0].field, "colors[0].sizes[6].name");
        assert_eq!(errors[11].field, "colors[1].sizes[11].name");
        assert!(errors[0].message.starts_with("Size 34 is not offered"));

        let mut body = payload(false);
        body.as_object_mut().unwrap().retain(|k, _| k == "unisex" || k == "colors");
        assert!(validate_product(&body, Some(&stored)).is_empty());

        // Leaving the grouping alone does not revisit stored colours.
        assert!(validate_product(&json!({ "unisex": true }), Some(&stored)).is_empty());
    }

    #[test]
    fn test_patch_apply() {
        let mut product = NewProduct::parse(payload(false))
            .unwrap()
            .into_product("a".repeat(24), Utc::now());

        let patch = ProductPatch::parse(
            json!({ "name": "  Gansey  ", "availability": "discounted" }),
            &product,
        )
        .unwrap();
        patch.apply(&mut product, Utc::now());

        assert_eq!(product.name, "Gansey");
        assert_eq!(product.availability, Availability::Discounted);
        assert_eq!(product.price, 149.5);
    }
}
