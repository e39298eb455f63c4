//! User domain rules.

pub mod validation;

pub use validation::{validate_new_user, NewUser};
