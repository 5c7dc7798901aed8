//! Typed access to wires fed with JSON.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{Error, NamedPromiseRegistry};

/// Registry for push sources delivering JSON records.
pub type JsonRegistry = NamedPromiseRegistry<Value, Value>;

impl NamedPromiseRegistry<Value, Value> {
    /// Waits for `name` and decodes the delivered data into `D`.
    ///
    /// ```
    /// use futures::executor::block_on;
    /// use serde_json::json;
    /// use wire_promise::JsonRegistry;
    ///
    /// let wires = JsonRegistry::new();
    /// wires.push("count", json!({"data": 3, "error": null}));
    /// let count: u32 = block_on(wires.pull_as("count")).unwrap();
    /// assert_eq!(count, 3);
    /// ```
    pub async fn pull_as<D: DeserializeOwned>(&self, name: &str) -> Result<D, Error> {
        let settled = self.pull(name).await;
        match settled.as_ref() {
            Ok(data) => D::deserialize(data).map_err(|source| {
                debug!(registry = self.label(), wire = name, error = %source, "wire data does not decode");
                Error::Decode { name: name.to_owned(), source }
            }),
            Err(reason) => Err(Error::Rejected {
                name: name.to_owned(),
                reason: reason.clone(),
            }),
        }
    }
}
