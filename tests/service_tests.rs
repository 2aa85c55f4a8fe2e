use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use customers::api::contracts::{
    ActionType, AddressRequest, CustomerBatchRequest, CustomerOrderRequest, OrderItemRequest,
};
use customers::clients::GitHubService;
use customers::core::mapping;
use customers::core::messages::{CustomerMessage, MessageType};
use customers::core::models::Customer;
use customers::errors::CustomerError;
use customers::messaging::Messenger;
use customers::repository::{CustomerRepository, InMemoryCustomerRepository};
use customers::service::CustomerService;
use tokio::sync::Mutex;
use uuid::Uuid;

struct KnownUsers(HashSet<String>);

#[async_trait]
impl GitHubService for KnownUsers {
    async fn is_valid_github_user(&self, username: &str) -> Result<bool, CustomerError> {
        Ok(self.0.contains(username))
    }
}

#[derive(Default)]
struct RecordingMessenger {
    published: Mutex<Vec<CustomerMessage>>,
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn publish(&self, message: &CustomerMessage) -> Result<String, CustomerError> {
        let mut published = self.published.lock().await;
        published.push(message.clone());
        Ok(format!("msg-{}", published.len()))
    }
}

struct Fixture {
    service: CustomerService,
    repository: Arc<InMemoryCustomerRepository>,
    messenger: Arc<RecordingMessenger>,
}

fn fixture() -> Fixture {
    let repository = Arc::new(InMemoryCustomerRepository::new());
    let messenger = Arc::new(RecordingMessenger::default());
    let github = Arc::new(KnownUsers(HashSet::from(["octocat".to_string()])));
    let service =
        CustomerService::new(repository.clone(), github).with_messenger(messenger.clone());
    Fixture {
        service,
        repository,
        messenger,
    }
}

fn customer(github_username: &str) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        email: "mona@example.com".to_string(),
        full_name: "Mona Lisa".to_string(),
        github_username: github_username.to_string(),
        date_of_birth: Utc.with_ymd_and_hms(1990, 1, 2, 0, 0, 0).unwrap(),
    }
}

fn validation_property(error: &CustomerError) -> Option<&str> {
    match error {
        CustomerError::Validation { failures, .. } => {
            failures.first().map(|f| f.property.as_str())
        }
        _ => None,
    }
}

#[tokio::test]
async fn test_create_publishes_event_and_duplicate_is_rejected() {
    let f = fixture();
    let customer = customer("octocat");

    assert!(f.service.create(&customer).await.unwrap());
    assert_eq!(
        *f.messenger.published.lock().await,
        vec![mapping::customer_created(&customer)]
    );

    let err = f.service.create(&customer).await.unwrap_err();
    assert_eq!(validation_property(&err), Some("Customer"));
    assert!(err.to_string().contains("already exists"));
    assert_eq!(f.messenger.published.lock().await.len(), 1);
}

#[tokio::test]
async fn test_create_rejects_unknown_github_user() {
    let f = fixture();
    let err = f.service.create(&customer("ghost")).await.unwrap_err();

    assert_eq!(validation_property(&err), Some("GitHubUsername"));
    assert!(
        err.to_string()
            .contains("There is no GitHub user with username ghost")
    );
    assert!(f.repository.get_all().await.unwrap().is_empty());
    assert!(f.messenger.published.lock().await.is_empty());
}

#[tokio::test]
async fn test_update_with_stale_request_is_rejected() {
    let f = fixture();
    let customer = customer("octocat");
    let mut stored = mapping::customer_to_dto(&customer);
    stored.updated_at = Utc::now();
    f.repository.seed(stored).await;

    let request_started = Utc::now() - Duration::minutes(1);
    let err = f.service.update(&customer, request_started).await.unwrap_err();

    assert!(matches!(err, CustomerError::Conflict(_)));
    assert!(f.messenger.published.lock().await.is_empty());
}

#[tokio::test]
async fn test_update_after_last_write_succeeds() {
    let f = fixture();
    let mut customer = customer("octocat");
    let mut stored = mapping::customer_to_dto(&customer);
    stored.updated_at = Utc::now() - Duration::hours(1);
    f.repository.seed(stored).await;

    customer.full_name = "Mona L".to_string();
    assert!(f.service.update(&customer, Utc::now()).await.unwrap());

    let reloaded = f.service.get(customer.id).await.unwrap().unwrap();
    assert_eq!(reloaded.full_name, "Mona L");
    let published = f.messenger.published.lock().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].message_type(), MessageType::CustomerUpdated);
}

#[tokio::test]
async fn test_delete_publishes_only_when_something_was_deleted() {
    let f = fixture();
    let customer = customer("octocat");
    f.service.create(&customer).await.unwrap();

    assert!(f.service.delete(customer.id).await.unwrap());
    assert!(!f.service.delete(customer.id).await.unwrap());

    let published = f.messenger.published.lock().await;
    assert_eq!(
        *published,
        vec![
            mapping::customer_created(&customer),
            mapping::customer_deleted(customer.id)
        ]
    );
}

#[tokio::test]
async fn test_get_by_email_and_get_all() {
    let f = fixture();
    let first = customer("octocat");
    let mut second = customer("octocat");
    second.email = "ada@example.com".to_string();
    f.service.create(&first).await.unwrap();
    f.service.create(&second).await.unwrap();

    let found = f.service.get_by_email("ada@example.com").await.unwrap();
    assert_eq!(found.map(|c| c.id), Some(second.id));
    assert!(f.service.get_by_email("nobody@example.com").await.unwrap().is_none());
    assert_eq!(f.service.get_all().await.unwrap().len(), 2);
}

fn batch_entry(action: ActionType, customer_id: Option<Uuid>) -> CustomerBatchRequest {
    CustomerBatchRequest {
        action,
        customer_id,
        github_username: "octocat".to_string(),
        full_name: "Batch Person".to_string(),
        email: "batch@example.com".to_string(),
        date_of_birth: Utc.with_ymd_and_hms(1985, 5, 5, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_process_batch_applies_each_action() {
    let f = fixture();
    let existing = customer("octocat");
    let doomed = customer("octocat");
    f.service.create(&existing).await.unwrap();
    f.service.create(&doomed).await.unwrap();

    let batch = vec![
        batch_entry(ActionType::Create, None),
        batch_entry(ActionType::Update, Some(existing.id)),
        batch_entry(ActionType::Delete, Some(doomed.id)),
    ];
    assert!(f.service.process_batch(&batch).await.unwrap());

    let all = f.service.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|c| c.id != doomed.id));
    let updated = f.service.get(existing.id).await.unwrap().unwrap();
    assert_eq!(updated.full_name, "Batch Person");
}

fn address() -> AddressRequest {
    AddressRequest {
        address1: "1 Main St".to_string(),
        address2: String::new(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip: "62701".to_string(),
    }
}

#[tokio::test]
async fn test_create_order_writes_customer_and_order() {
    let f = fixture();
    let request = CustomerOrderRequest {
        full_name: "Order Person".to_string(),
        email: "order@example.com".to_string(),
        shipping_address: Some(address()),
        billing_address: Some(address()),
        order_details: vec![
            OrderItemRequest {
                product_id: Uuid::new_v4(),
                price: 10.5,
            },
            OrderItemRequest {
                product_id: Uuid::new_v4(),
                price: 4.5,
            },
        ],
    };

    assert!(f.service.create_order(&request).await.unwrap());
    assert_eq!(f.repository.order_count().await, 1);
    let customer = f
        .service
        .get_by_email("order@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.full_name, "Order Person");
}

#[tokio::test]
async fn test_create_order_without_addresses_is_a_validation_error() {
    let f = fixture();
    let request = CustomerOrderRequest {
        full_name: "Order Person".to_string(),
        email: "order@example.com".to_string(),
        shipping_address: None,
        billing_address: Some(address()),
        order_details: vec![],
    };

    let err = f.service.create_order(&request).await.unwrap_err();
    assert!(matches!(err, CustomerError::Validation { .. }));
    assert_eq!(f.repository.order_count().await, 0);
}
