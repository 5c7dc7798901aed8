//! Wiring a registry into the type that owns it.

use crate::poly::Consumer;
use crate::{NamedPromiseRegistry, Response};

/// A type that owns a [`NamedPromiseRegistry`] and exposes its wires.
///
/// Implementors only point at their registry; the wire operations delegate
/// to it.
///
/// ```
/// use futures::executor::block_on;
/// use wire_promise::{NamedPromiseRegistry, Response, WireHost};
///
/// #[derive(Default)]
/// struct RecordPage {
///     wires: NamedPromiseRegistry<String, String>,
/// }
///
/// impl WireHost for RecordPage {
///     type Data = String;
///     type Error = String;
///
///     fn wires(&self) -> &NamedPromiseRegistry<String, String> {
///         &self.wires
///     }
/// }
///
/// let page = RecordPage::default();
/// page.push_wire("record", Response::data("Acme".to_string()));
/// assert_eq!(block_on(page.pull_wire("record").cloned()), Ok("Acme".to_string()));
/// ```
pub trait WireHost {
    type Data;
    type Error;

    fn wires(&self) -> &NamedPromiseRegistry<Self::Data, Self::Error>;

    fn push_wire(&self, name: &str, response: impl Into<Response<Self::Data, Self::Error>>) {
        self.wires().push(name, response)
    }

    fn pull_wire(&self, name: &str) -> Consumer<Self::Data, Self::Error> {
        self.wires().pull(name)
    }

    fn reset_wire(&self, name: &str) -> Consumer<Self::Data, Self::Error> {
        self.wires().reset(name)
    }
}
