//! Input validation for user registration.

use shared_types::ServiceError;

/// Longest accepted name or email.
pub const MAX_FIELD_LEN: usize = 256;

/// A registration request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Trim and check the registration fields.
pub fn validate_new_user(name: &str, email: &str) -> Result<NewUser, ServiceError> {
    let name = name.trim();
    let email = email.trim();

    if name.is_empty() {
        return Err(ServiceError::Validation("name must not be empty".into()));
    }
    if name.len() > MAX_FIELD_LEN {
        return Err(ServiceError::Validation(format!(
            "name exceeds {MAX_FIELD_LEN} bytes"
        )));
    }
    if email.len() > MAX_FIELD_LEN {
        return Err(ServiceError::Validation(format!(
            "email exceeds {MAX_FIELD_LEN} bytes"
        )));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(ServiceError::Validation(format!(
                "invalid email address: {email:?}"
            )))
        }
    }

    Ok(NewUser {
        name: name.to_string(),
        email: email.to_string(),
    })
}
