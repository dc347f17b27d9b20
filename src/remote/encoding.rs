//! Request payload encoders.

use serde_json::Value;

use crate::errors::{Error, Result};

/// Encodes a JSON payload into a request body.
pub trait PayloadEncoder: Send + Sync + std::fmt::Debug {
    /// `Content-Type` header value for encoded bodies.
    fn content_type(&self) -> &'static str;

    /// Encode the payload.
    fn encode(&self, payload: &Value) -> Result<Vec<u8>>;
}

/// `application/json` bodies. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl PayloadEncoder for JsonEncoder {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, payload: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(payload).map_err(|e| Error::serialization(e, "Failed to encode JSON payload"))
    }
}

/// `application/x-www-form-urlencoded` bodies.
///
/// Only flat objects are accepted. Strings are sent as-is, numbers and booleans
/// in their JSON text form, and `null` fields are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormEncoder;

impl PayloadEncoder for FormEncoder {
    fn content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn encode(&self, payload: &Value) -> Result<Vec<u8>> {
        let object = payload
            .as_object()
            .ok_or_else(|| Error::unsupported("form payloads must be JSON objects"))?;

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    serializer.append_pair(key, s);
                }
                Value::Bool(_) | Value::Number(_) => {
                    serializer.append_pair(key, &value.to_string());
                }
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::unsupported(format!(
                        "form payload field '{}' must be a scalar",
                        key
                    )));
                }
            }
        }

        Ok(serializer.finish().into_bytes())
    }
}
