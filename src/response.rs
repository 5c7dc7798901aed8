//! What a push source delivers for a wire.

use serde_json::Value;

/// A single delivery from the push source.
///
/// Either the two-field envelope, where `None` stands for an absent field, or
/// any other value, which is delivered as data verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<T, E> {
    Envelope { data: Option<T>, error: Option<E> },
    Value(T),
}

impl<T, E> Response<T, E> {
    /// Envelope carrying data.
    pub fn data(data: T) -> Self {
        Response::Envelope { data: Some(data), error: None }
    }

    /// Envelope carrying an error.
    pub fn error(error: E) -> Self {
        Response::Envelope { data: None, error: Some(error) }
    }

    /// Envelope with neither field set. Pushing it settles nothing.
    pub fn empty() -> Self {
        Response::Envelope { data: None, error: None }
    }

    /// A non-enveloped value.
    pub fn value(value: T) -> Self {
        Response::Value(value)
    }

    /// The settlement this delivery produces, if any. Data wins over error.
    pub fn into_settlement(self) -> Option<Result<T, E>> {
        match self {
            Response::Envelope { data: Some(data), .. } => Some(Ok(data)),
            Response::Envelope { data: None, error: Some(error) } => Some(Err(error)),
            Response::Envelope { data: None, error: None } => None,
            Response::Value(value) => Some(Ok(value)),
        }
    }
}

impl<T, E> From<Result<T, E>> for Response<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Response::data(data),
            Err(error) => Response::error(error),
        }
    }
}

impl Response<Value, Value> {
    /// Reads a JSON delivery.
    ///
    /// An object with both a `data` and an `error` key is an envelope, whatever
    /// the values are; `null` in either field counts as absent. Everything else
    /// is a plain value.
    ///
    /// ```
    /// use serde_json::json;
    /// use wire_promise::Response;
    ///
    /// let envelope = Response::from_json(json!({"data": null, "error": "E"}));
    /// assert_eq!(envelope, Response::error(json!("E")));
    ///
    /// let page = json!({"type": "standard__recordPage", "attributes": {}});
    /// assert_eq!(Response::from_json(page.clone()), Response::value(page));
    /// ```
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut fields) if fields.contains_key("data") && fields.contains_key("error") => {
                let data = fields.remove("data").filter(|v| !v.is_null());
                let error = fields.remove("error").filter(|v| !v.is_null());
                Response::Envelope { data, error }
            }
            other => Response::Value(other),
        }
    }
}

impl From<Value> for Response<Value, Value> {
    fn from(value: Value) -> Self {
        Response::from_json(value)
    }
}
