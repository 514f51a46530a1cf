//! Input validation for the FFI boundary.
//!
//! The managers assume validated input; everything arriving from the
//! presentation layer passes through here first.

use thiserror::Error;

use crate::models::{Coordinate, InventoryItem, PharmacyDetails};

/// Maximum length of a medicine or pharmacy name.
pub const MAX_NAME_LEN: usize = 200;

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("price must be a positive number, got {0}")]
    InvalidPrice(f64),

    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a medicine name.
pub fn validate_medicine_name(name: &str) -> ValidationResult<()> {
    validate_name("medicine_name", name)
}

/// Validate an uploaded price: finite and strictly positive.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::InvalidPrice(price));
    }
    Ok(())
}

/// Validate latitude/longitude ranges.
pub fn validate_coordinate(location: Coordinate) -> ValidationResult<()> {
    let Coordinate { lat, lon } = location;
    let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
    let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
    if !(lat_ok && lon_ok) {
        return Err(ValidationError::InvalidCoordinate { lat, lon });
    }
    Ok(())
}

/// Validate one row of an inventory upload.
pub fn validate_item(item: &InventoryItem) -> ValidationResult<()> {
    validate_medicine_name(&item.medicine_name)?;
    validate_price(item.price)
}

/// Validate registration details. Address and phone are free-form.
pub fn validate_details(details: &PharmacyDetails) -> ValidationResult<()> {
    validate_name("name", &details.name)
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}
