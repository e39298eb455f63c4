//! Input validation for new orders.

use shared_types::ServiceError;

/// Longest accepted product name.
pub const MAX_PRODUCT_LEN: usize = 256;

/// Check the order fields and return the trimmed product name.
pub fn validate_new_order(product: &str, amount: f64) -> Result<String, ServiceError> {
    let product = product.trim();
    if product.is_empty() {
        return Err(ServiceError::Validation("product must not be empty".into()));
    }
    if product.len() > MAX_PRODUCT_LEN {
        return Err(ServiceError::Validation(format!(
            "product exceeds {MAX_PRODUCT_LEN} bytes"
        )));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ServiceError::Validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(product.to_string())
}
