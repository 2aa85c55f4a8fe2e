//! JSON body extractor whose rejections use the validation problem body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::errors::CustomerError;

/// Property name reported for a body that could not be read as JSON.
pub const BODY_PROPERTY: &str = "Body";

pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = CustomerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(CustomerError::validation(
                BODY_PROPERTY,
                rejection.body_text(),
            )),
        }
    }
}
