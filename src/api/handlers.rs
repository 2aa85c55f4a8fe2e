//! Customer CRUD, batch and order endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::AppState;
use super::extract::JsonBody;
use super::contracts::{
    CustomerBatchRequest, CustomerOrderRequest, CustomerRequest, CustomerResponse,
    CustomersResponse,
};
use crate::core::{mapping, validation};
use crate::errors::CustomerError;

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "An internal server error occurred" })),
    )
        .into_response()
}

pub async fn create_customer(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CustomerRequest>,
) -> Result<Response, CustomerError> {
    validation::validate_customer_request(&request)?;
    let customer = mapping::request_to_customer(&request);

    state.customers.create(&customer).await?;

    let response = mapping::customer_to_response(&customer);
    let location = format!("/customers/{}", response.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    )
        .into_response())
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, CustomerError> {
    match state.customers.get(id).await? {
        Some(customer) => Ok(Json(mapping::customer_to_response(&customer))),
        None => Err(CustomerError::NotFound(format!("customer {id}"))),
    }
}

pub async fn get_customer_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CustomerResponse>, CustomerError> {
    match state.customers.get_by_email(&email).await? {
        Some(customer) => Ok(Json(mapping::customer_to_response(&customer))),
        None => Err(CustomerError::NotFound(format!("customer with email {email}"))),
    }
}

pub async fn get_all_customers(
    State(state): State<AppState>,
) -> Result<Json<CustomersResponse>, CustomerError> {
    let customers = state.customers.get_all().await?;
    Ok(Json(mapping::customers_to_response(&customers)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<CustomerRequest>,
) -> Result<Json<CustomerResponse>, CustomerError> {
    // Must precede the read below; the conditional write compares against it.
    let request_started = Utc::now();
    validation::validate_customer_request(&request)?;

    if state.customers.get(id).await?.is_none() {
        return Err(CustomerError::NotFound(format!("customer {id}")));
    }

    let customer = mapping::request_to_customer_with_id(id, &request);
    state.customers.update(&customer, request_started).await?;
    Ok(Json(mapping::customer_to_response(&customer)))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CustomerError> {
    if state.customers.delete(id).await? {
        Ok(StatusCode::OK)
    } else {
        Err(CustomerError::NotFound(format!("customer {id}")))
    }
}

pub async fn process_batch(
    State(state): State<AppState>,
    JsonBody(batch): JsonBody<Vec<CustomerBatchRequest>>,
) -> Result<Response, CustomerError> {
    validation::validate_batch(&batch)?;
    if state.customers.process_batch(&batch).await? {
        Ok(StatusCode::OK.into_response())
    } else {
        Ok(internal_error())
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CustomerOrderRequest>,
) -> Result<Response, CustomerError> {
    validation::validate_order(&request)?;
    if state.customers.create_order(&request).await? {
        Ok(StatusCode::OK.into_response())
    } else {
        Ok(internal_error())
    }
}
