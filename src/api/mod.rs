//! REST surface over [`CustomerService`] and the image store.

pub mod contracts;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod images;
pub mod middleware;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::service::CustomerService;
use crate::storage::CustomerImageStore;

#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<CustomerService>,
    pub images: Arc<dyn CustomerImageStore>,
}

/// Routes:
/// - `POST /customers`, `GET /customers`
/// - `GET|PUT|DELETE /customers/{id}`
/// - `GET /customers/GetByEmail/{email}`
/// - `POST /customers/batch`, `POST /customers/Order`
/// - `POST|GET|DELETE /customers/{id}/image`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/customers",
            post(handlers::create_customer).get(handlers::get_all_customers),
        )
        .route("/customers/batch", post(handlers::process_batch))
        .route("/customers/Order", post(handlers::create_order))
        .route(
            "/customers/GetByEmail/{email}",
            get(handlers::get_customer_by_email),
        )
        .route(
            "/customers/{id}",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route(
            "/customers/{id}/image",
            post(images::upload_image)
                .get(images::get_image)
                .delete(images::delete_image),
        )
        .layer(middleware::build_http_layers(middleware::REQUEST_TIMEOUT))
        .with_state(state)
}

/// Serves `router` until `shutdown` resolves, then drains in-flight requests.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
