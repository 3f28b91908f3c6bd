use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ReservationError;

/// JSON body extractor that also runs `validator` rules.
///
/// Malformed bodies and failed rules both come back as a 400 with a JSON
/// `{"error": ...}` body, same as every other rejection in the API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ReservationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ReservationError::InvalidBody(rejection.body_text()))?;

        // Проверяем правила validator
        value
            .validate()
            .map_err(|errors| ReservationError::InvalidBody(errors.to_string()))?;

        Ok(ValidatedJson(value))
    }
}
