//! Input validation for the administration endpoints.

use std::sync::LazyLock;

use regex::Regex;
use serialvault_core::ErrorKind;

use super::response::ApiError;
use crate::storage::{NewModel, NewSubstore};

const MAX_NAME_LENGTH: usize = 128;

static MODEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9](?:-?[a-z0-9])*$").expect("static regex is valid")
});

/// Lowercase letters and digits, single inner hyphens, at most 128 chars.
pub fn is_valid_model_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LENGTH && MODEL_NAME.is_match(name)
}

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorKind::MalformedInput, message)
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("The {field} must be entered")));
    }
    Ok(())
}

pub fn validate_model(model: &NewModel) -> Result<(), ApiError> {
    require("brand-id", &model.brand_id)?;
    if !is_valid_model_name(&model.name) {
        return Err(invalid(format!("Invalid model name '{}'", model.name)));
    }
    if model.revision < 0 {
        return Err(invalid("The revision must not be negative"));
    }
    Ok(())
}

pub fn validate_substore(substore: &NewSubstore) -> Result<(), ApiError> {
    require("store", &substore.store)?;
    require("serial number", &substore.serial_number)?;
    if !is_valid_model_name(&substore.model_name) {
        return Err(invalid(format!(
            "Invalid model name '{}'",
            substore.model_name
        )));
    }
    Ok(())
}
