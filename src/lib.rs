//! Named, resettable promises for push-delivered data.
//!
//! A data source pushes results for a channel name whenever it has them; the
//! code that needs the data awaits a promise for the same name. The
//! [`NamedPromiseRegistry`] keeps one promise per name, settles it from the
//! pushed [`Response`] and starts a new generation when the source delivers
//! again or the consumer asks for a [`reset`](NamedPromiseRegistry::reset).
//!
//! # Examples
//!
//! ```
//! use futures::executor::block_on;
//! use wire_promise::{NamedPromiseRegistry, Response};
//!
//! let wires = NamedPromiseRegistry::<u32, String>::new();
//! let record = wires.pull("record");
//! wires.push("record", Response::data(5));
//! assert_eq!(*block_on(record), Ok(5));
//! ```
pub mod host;
pub mod json;
pub mod poly;
pub mod registry;
pub mod response;

pub use host::WireHost;
pub use json::JsonRegistry;
pub use registry::NamedPromiseRegistry;
pub use response::Response;

use thiserror::Error;

/// Errors raised when turning a settled wire into typed data.
#[derive(Error, Debug)]
pub enum Error {
    /// The push source delivered an error for the wire.
    #[error("wire `{name}` delivered an error: {reason}")]
    Rejected {
        name: String,
        reason: serde_json::Value,
    },
    /// The delivered data did not match the requested type.
    #[error("wire `{name}` data could not be decoded")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Settlement state of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    Pending,
    Resolved,
    Rejected,
}

/// A promise that is settled from the outside.
///
/// `new` hands out the settling half and a waiter; settling consumes the
/// producer so a promise can only be settled once.
pub trait Promise {
    type Output;
    type Error;
    type Waiter;

    fn new() -> (Self, Self::Waiter)
    where
        Self: Sized;

    fn resolve(self, value: Self::Output);

    fn reject(self, err: Self::Error);
}
