//! Request validation, run before a request reaches the service layer.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::contracts::{CustomerBatchRequest, CustomerOrderRequest, CustomerRequest};
use crate::errors::{CustomerError, ValidationFailure};

static FULL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z ,.'-]+$").expect("valid full name regex"));

// GitHub logins: alphanumerics separated by single hyphens, at most 39 chars.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z\d](?:-?[a-z\d])*$").expect("valid username regex"));

const MAX_USERNAME_LEN: usize = 39;

pub fn is_valid_full_name(name: &str) -> bool {
    FULL_NAME_RE.is_match(name)
}

pub fn is_valid_github_username(username: &str) -> bool {
    username.len() <= MAX_USERNAME_LEN && USERNAME_RE.is_match(username)
}

/// Loose e-mail check: exactly one `@` that is neither first nor last.
pub fn is_valid_email(email: &str) -> bool {
    let Some(at) = email.find('@') else {
        return false;
    };
    at > 0 && at < email.len() - 1 && email.matches('@').count() == 1
}

fn check_customer_fields(
    failures: &mut Vec<ValidationFailure>,
    prefix: &str,
    full_name: &str,
    email: &str,
    github_username: &str,
    date_of_birth: DateTime<Utc>,
) {
    if !is_valid_full_name(full_name) {
        failures.push(ValidationFailure::new(
            format!("{prefix}FullName"),
            format!("'{full_name}' is not a valid full name"),
        ));
    }
    if !is_valid_email(email) {
        failures.push(ValidationFailure::new(
            format!("{prefix}Email"),
            format!("'{email}' is not a valid email address"),
        ));
    }
    if !is_valid_github_username(github_username) {
        failures.push(ValidationFailure::new(
            format!("{prefix}GitHubUsername"),
            format!("'{github_username}' is not a valid GitHub username"),
        ));
    }
    if date_of_birth >= Utc::now() {
        failures.push(ValidationFailure::new(
            format!("{prefix}DateOfBirth"),
            "Your date of birth cannot be in the future",
        ));
    }
}

fn into_result(failures: Vec<ValidationFailure>) -> Result<(), CustomerError> {
    if failures.is_empty() {
        return Ok(());
    }
    let message = failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Err(CustomerError::Validation { message, failures })
}

/// # Errors
///
/// Returns `Validation` listing every field that failed.
pub fn validate_customer_request(request: &CustomerRequest) -> Result<(), CustomerError> {
    let mut failures = Vec::new();
    check_customer_fields(
        &mut failures,
        "",
        &request.full_name,
        &request.email,
        &request.github_username,
        request.date_of_birth,
    );
    into_result(failures)
}

/// # Errors
///
/// Returns `Validation` for an empty batch or for any invalid entry.
pub fn validate_batch(batch: &[CustomerBatchRequest]) -> Result<(), CustomerError> {
    if batch.is_empty() {
        return Err(CustomerError::validation("Batch", "The batch must not be empty"));
    }
    let mut failures = Vec::new();
    for (index, entry) in batch.iter().enumerate() {
        check_customer_fields(
            &mut failures,
            &format!("[{index}]."),
            &entry.full_name,
            &entry.email,
            &entry.github_username,
            entry.date_of_birth,
        );
    }
    into_result(failures)
}

/// # Errors
///
/// Returns `Validation` listing every field that failed.
pub fn validate_order(request: &CustomerOrderRequest) -> Result<(), CustomerError> {
    let mut failures = Vec::new();
    if !is_valid_full_name(&request.full_name) {
        failures.push(ValidationFailure::new(
            "FullName",
            format!("'{}' is not a valid full name", request.full_name),
        ));
    }
    if !is_valid_email(&request.email) {
        failures.push(ValidationFailure::new(
            "Email",
            format!("'{}' is not a valid email address", request.email),
        ));
    }
    if request.order_details.is_empty() {
        failures.push(ValidationFailure::new(
            "OrderDetails",
            "'Order Details' must not be empty",
        ));
    }
    if request.shipping_address.is_none() {
        failures.push(ValidationFailure::new(
            "ShippingAddress",
            "'Shipping Address' must not be empty",
        ));
    }
    if request.billing_address.is_none() {
        failures.push(ValidationFailure::new(
            "BillingAddress",
            "'Billing Address' must not be empty",
        ));
    }
    into_result(failures)
}
