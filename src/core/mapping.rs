//! Conversions between API contracts, domain types, storage rows and messages.

use chrono::Utc;
use uuid::Uuid;

use crate::api::contracts::{
    ActionType, AddressRequest, CustomerBatchRequest, CustomerOrderRequest, CustomerRequest,
    CustomerResponse, CustomersResponse, OrderItemRequest,
};
use crate::core::messages::{CustomerCreated, CustomerDeleted, CustomerMessage, CustomerUpdated};
use crate::core::models::{AddressDto, Customer, CustomerDto, OrderDto, OrderItemDto};

/// Maps a create request to a new customer with a fresh id.
pub fn request_to_customer(request: &CustomerRequest) -> Customer {
    request_to_customer_with_id(Uuid::new_v4(), request)
}

pub fn request_to_customer_with_id(id: Uuid, request: &CustomerRequest) -> Customer {
    Customer {
        id,
        email: request.email.clone(),
        full_name: request.full_name.clone(),
        github_username: request.github_username.clone(),
        date_of_birth: request.date_of_birth,
    }
}

pub fn customer_to_response(customer: &Customer) -> CustomerResponse {
    CustomerResponse {
        id: customer.id,
        github_username: customer.github_username.clone(),
        full_name: customer.full_name.clone(),
        email: customer.email.clone(),
        date_of_birth: customer.date_of_birth,
    }
}

pub fn customers_to_response(customers: &[Customer]) -> CustomersResponse {
    CustomersResponse {
        customers: customers.iter().map(customer_to_response).collect(),
    }
}

/// `updated_at` is stamped by the repository at write time.
pub fn customer_to_dto(customer: &Customer) -> CustomerDto {
    CustomerDto {
        id: customer.id,
        email: customer.email.clone(),
        github_username: customer.github_username.clone(),
        full_name: customer.full_name.clone(),
        date_of_birth: customer.date_of_birth,
        updated_at: Utc::now(),
    }
}

pub fn dto_to_customer(dto: CustomerDto) -> Customer {
    Customer {
        id: dto.id,
        email: dto.email,
        full_name: dto.full_name,
        github_username: dto.github_username,
        date_of_birth: dto.date_of_birth,
    }
}

pub fn customer_created(customer: &Customer) -> CustomerMessage {
    CustomerMessage::Created(CustomerCreated {
        id: customer.id,
        email: customer.email.clone(),
        full_name: customer.full_name.clone(),
        github_username: customer.github_username.clone(),
        date_of_birth: customer.date_of_birth,
    })
}

pub fn customer_updated(customer: &Customer) -> CustomerMessage {
    CustomerMessage::Updated(CustomerUpdated {
        id: customer.id,
        email: customer.email.clone(),
        full_name: customer.full_name.clone(),
        github_username: customer.github_username.clone(),
        date_of_birth: customer.date_of_birth,
    })
}

pub fn customer_deleted(id: Uuid) -> CustomerMessage {
    CustomerMessage::Deleted(CustomerDeleted { id })
}

/// Selects the batch entries with `action` and maps them to storage rows.
/// Entries without an id get a fresh one.
pub fn batch_to_dtos(batch: &[CustomerBatchRequest], action: ActionType) -> Vec<CustomerDto> {
    batch
        .iter()
        .filter(|entry| entry.action == action)
        .map(|entry| CustomerDto {
            id: entry.customer_id.unwrap_or_else(Uuid::new_v4),
            email: entry.email.clone(),
            github_username: entry.github_username.clone(),
            full_name: entry.full_name.clone(),
            date_of_birth: entry.date_of_birth,
            updated_at: Utc::now(),
        })
        .collect()
}

/// Customer row created alongside an order; only name and e-mail are known.
pub fn order_request_to_customer_dto(request: &CustomerOrderRequest) -> CustomerDto {
    CustomerDto {
        id: Uuid::new_v4(),
        email: request.email.clone(),
        github_username: String::new(),
        full_name: request.full_name.clone(),
        date_of_birth: Default::default(),
        updated_at: Utc::now(),
    }
}

/// Returns `None` when either address is missing.
pub fn order_request_to_order_dto(
    request: &CustomerOrderRequest,
    customer_id: Uuid,
) -> Option<OrderDto> {
    let shipping = request.shipping_address.as_ref()?;
    let billing = request.billing_address.as_ref()?;
    Some(OrderDto::new(
        Uuid::new_v4(),
        customer_id,
        address_to_dto(shipping),
        address_to_dto(billing),
        request.order_details.iter().map(order_item_to_dto).collect(),
    ))
}

fn address_to_dto(address: &AddressRequest) -> AddressDto {
    AddressDto {
        address1: address.address1.clone(),
        address2: address.address2.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.zip.clone(),
    }
}

fn order_item_to_dto(item: &OrderItemRequest) -> OrderItemDto {
    OrderItemDto {
        product_id: item.product_id,
        price: item.price,
    }
}
