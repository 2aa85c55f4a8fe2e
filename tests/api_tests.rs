use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use customers::api::{AppState, build_router};
use customers::clients::GitHubService;
use customers::errors::CustomerError;
use customers::repository::InMemoryCustomerRepository;
use customers::service::CustomerService;
use customers::storage::InMemoryImageStore;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

struct KnownUsers(HashSet<String>);

#[async_trait]
impl GitHubService for KnownUsers {
    async fn is_valid_github_user(&self, username: &str) -> Result<bool, CustomerError> {
        Ok(self.0.contains(username))
    }
}

fn router() -> Router {
    let repository = Arc::new(InMemoryCustomerRepository::new());
    let github = Arc::new(KnownUsers(HashSet::from(["octocat".to_string()])));
    build_router(AppState {
        customers: Arc::new(CustomerService::new(repository, github)),
        images: Arc::new(InMemoryImageStore::new()),
    })
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn customer_body(full_name: &str) -> Value {
    json!({
        "gitHubUsername": "octocat",
        "fullName": full_name,
        "email": "mona@example.com",
        "dateOfBirth": "1990-01-02T00:00:00Z"
    })
}

async fn create(router: &Router) -> Value {
    let (status, headers, body) =
        send(router, json_request("POST", "/customers", &customer_body("Mona Lisa"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&body).unwrap();
    let id = created["id"].as_str().unwrap();
    assert_eq!(headers[header::LOCATION], format!("/customers/{id}").as_str());
    created
}

#[tokio::test]
async fn test_create_then_get() {
    let router = router();
    let created = create(&router).await;
    assert_eq!(created["gitHubUsername"], "octocat");
    assert_eq!(created["fullName"], "Mona Lisa");

    let id = created["id"].as_str().unwrap();
    let (status, headers, body) = send(&router, empty_request("GET", &format!("/customers/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("x-request-id"));
    let fetched: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_with_invalid_fields_returns_problem_details() {
    let router = router();
    let body = json!({
        "gitHubUsername": "-bad-",
        "fullName": "R2D2",
        "email": "nope",
        "dateOfBirth": "2999-01-01T00:00:00Z"
    });

    let (status, _, body) = send(&router, json_request("POST", "/customers", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem["status"], 400);
    for property in ["FullName", "Email", "GitHubUsername", "DateOfBirth"] {
        assert!(problem["errors"][property].is_array(), "missing {property}");
    }
}

#[tokio::test]
async fn test_malformed_json_returns_problem_details() {
    let router = router();
    let request = Request::builder()
        .method("POST")
        .uri("/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"fullName\": "))
        .unwrap();

    let (status, _, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["title"], "One or more validation errors occurred.");
    assert!(problem["errors"]["Body"][0].is_string());

    let (status, _, body) = send(
        &router,
        json_request("POST", "/customers/batch", &json!({ "not": "a list" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: Value = serde_json::from_slice(&body).unwrap();
    assert!(problem["errors"]["Body"].is_array());
}

#[tokio::test]
async fn test_create_with_unknown_github_user_is_bad_request() {
    let router = router();
    let mut body = customer_body("Mona Lisa");
    body["gitHubUsername"] = json!("ghost");

    let (status, _, body) = send(&router, json_request("POST", "/customers", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        problem["errors"]["GitHubUsername"][0],
        "There is no GitHub user with username ghost"
    );
}

#[tokio::test]
async fn test_missing_customer_is_not_found() {
    let router = router();
    let id = Uuid::new_v4();

    let (status, _, _) = send(&router, empty_request("GET", &format!("/customers/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &router,
        json_request("PUT", &format!("/customers/{id}"), &customer_body("Mona Lisa")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&router, empty_request("DELETE", &format!("/customers/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_get_by_email_and_delete() {
    let router = router();
    let created = create(&router).await;
    let id = created["id"].as_str().unwrap();

    let (status, _, body) = send(
        &router,
        json_request("PUT", &format!("/customers/{id}"), &customer_body("Mona L")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["fullName"], "Mona L");

    let (status, _, body) = send(
        &router,
        empty_request("GET", "/customers/GetByEmail/mona@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let by_email: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(by_email["id"], created["id"]);

    let (status, _, _) = send(&router, empty_request("DELETE", &format!("/customers/{id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&router, empty_request("GET", "/customers")).await;
    assert_eq!(status, StatusCode::OK);
    let all: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(all["customers"], json!([]));
}

#[tokio::test]
async fn test_batch_and_order_endpoints() {
    let router = router();
    let batch = json!([
        {
            "action": "Create",
            "gitHubUsername": "octocat",
            "fullName": "Batch Person",
            "email": "batch@example.com",
            "dateOfBirth": "1985-05-05T00:00:00Z"
        }
    ]);
    let (status, _, _) = send(&router, json_request("POST", "/customers/batch", &batch)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&router, json_request("POST", "/customers/batch", &json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let address = json!({
        "address1": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "zip": "62701"
    });
    let order = json!({
        "fullName": "Order Person",
        "email": "order@example.com",
        "shippingAddress": address,
        "billingAddress": address,
        "orderDetails": [{ "productId": Uuid::new_v4(), "price": 9.99 }]
    });
    let (status, _, _) = send(&router, json_request("POST", "/customers/Order", &order)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&router, empty_request("GET", "/customers")).await;
    assert_eq!(status, StatusCode::OK);
    let all: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(all["customers"].as_array().unwrap().len(), 2);
}

fn multipart_request(uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    let boundary = "X-CUSTOMERS-BOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_image_upload_get_and_delete() {
    let router = router();
    let id = Uuid::new_v4();
    let uri = format!("/customers/{id}/image");

    let (status, _, _) = send(&router, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&router, multipart_request(&uri, "Data", b"\x89PNG-bytes")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, headers, body) = send(&router, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(&body[..], b"\x89PNG-bytes");

    let (status, _, _) = send(&router, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&router, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_upload_requires_data_field() {
    let router = router();
    let uri = format!("/customers/{}/image", Uuid::new_v4());

    let (status, _, _) = send(&router, multipart_request(&uri, "Other", b"bytes")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
