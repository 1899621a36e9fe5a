/**
 * Request Body Extraction
 *
 * Handlers take their bodies as untyped JSON and run their own shape checks,
 * so a missing or malformed body is not a rejection here: it reads as an
 * empty object and fails later with a field-specific message.
 */

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::BytesRejection;
use serde_json::{Map, Value};

/// Request body parsed as JSON, or `{}` when it is not JSON
#[derive(Debug, Clone, PartialEq)]
pub struct LenientJson(pub Value);

impl LenientJson {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self(value),
            Err(e) => {
                if !bytes.is_empty() {
                    tracing::debug!(error = %e, "Request body is not JSON, treating as empty object");
                }
                Self(Value::Object(Map::new()))
            }
        }
    }
}

impl<S> FromRequest<S> for LenientJson
where
    S: Send + Sync,
{
    type Rejection = BytesRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        Ok(Self::from_bytes(&bytes))
    }
}
