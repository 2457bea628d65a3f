//! Request body extractors that reject into the response envelope.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::response::ApiError;
use crate::storage::UploadedFile;

/// Multipart field carrying the photograph upload.
pub const PHOTOGRAPH_FIELD: &str = "photograph";

/// JSON body where an empty body means `T::default()`.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;
        parse_json(&bytes).map(JsonBody)
    }
}

fn parse_json<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))
}

fn body_error(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new("PAYLOAD_TOO_LARGE", text)
    } else {
        ApiError::validation(text)
    }
}

/// A faculty form submitted as multipart or as a JSON object.
///
/// Multipart text parts become string values; a name that repeats
/// collects into an array.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub fields: Value,
    pub photograph: Option<UploadedFile>,
}

impl<S> FromRequest<S> for SubmissionForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let JsonBody(fields) = JsonBody::<Value>::from_request(req, state).await?;
            let fields = match fields {
                Value::Null => Value::Object(Map::new()),
                obj @ Value::Object(_) => obj,
                _ => return Err(ApiError::validation("Faculty payload must be an object")),
            };
            return Ok(Self {
                fields,
                photograph: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;

        let mut fields = Map::new();
        let mut photograph = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == PHOTOGRAPH_FIELD {
                let file_name = field.file_name().map(str::to_string).unwrap_or_default();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| body_error(e.status(), e.body_text()))?;
                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() && !file_name.is_empty() {
                    photograph = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            push_field(&mut fields, name, Value::String(text));
        }

        Ok(Self {
            fields: Value::Object(fields),
            photograph,
        })
    }
}

fn push_field(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        None => {
            fields.insert(name, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_field_collects_repeats() {
        let mut fields = Map::new();
        push_field(&mut fields, "majorDomains".into(), json!("Radar"));
        push_field(&mut fields, "name".into(), json!("Asha"));
        push_field(&mut fields, "majorDomains".into(), json!("Sonar"));
        push_field(&mut fields, "majorDomains".into(), json!("Lidar"));

        assert_eq!(fields["name"], "Asha");
        assert_eq!(fields["majorDomains"], json!(["Radar", "Sonar", "Lidar"]));
    }

    #[test]
    fn test_parse_json_empty_is_default() {
        let value: Value = parse_json(b"  \n").unwrap();
        assert!(value.is_null());

        let err = parse_json::<Value>(b"{oops").unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }
}
