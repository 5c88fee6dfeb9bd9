use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::{DUPLICATE, Mode, Validator, check_string, validated};
use crate::error::{AppError, ValidationError};

/// Product ids are opaque; anything longer than this cannot resolve.
const ITEM_MAX: usize = 64;

/// Checks a wholesale replacement of a section's items. An empty list clears
/// the section.
pub fn validate_section_items(payload: &Value) -> Vec<ValidationError> {
    let mut validator = Validator::new(payload, Mode::Create);

    if let Some(items) = validator.array("items") {
        let errors = validator.errors_mut();
        let mut seen = HashSet::new();

        for (index, item) in items.iter().enumerate() {
            let path = format!("items[{index}]");

            if let Some(id) = check_string(errors, &path, item, ITEM_MAX) {
                if !seen.insert(id) {
                    errors.push(ValidationError::new(
                        path,
                        DUPLICATE,
                        format!("Product {id} is listed twice"),
                    ));
                }
            }
        }
    }

    validator.finish()
}

#[derive(Debug, Deserialize)]
pub struct SectionItems {
    pub items: Vec<String>,
}

impl SectionItems {
    pub fn parse(payload: Value) -> Result<Self, AppError> {
        let errors = validate_section_items(&payload);
        let mut section: Self = validated(payload, errors)?;

        for item in &mut section.items {
            *item = item.trim().to_string();
        }

        Ok(section)
    }
}
