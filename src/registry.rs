//! Named promises bridging push deliveries into awaitable results.

use std::collections::HashMap;
use std::fmt::{self, Debug};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::poly::{Consumer, Producer};
use crate::{Promise, PromiseState, Response};

/// Per-host registry of named promises.
///
/// Each name owns one channel: a promise, the producer that settles it and a
/// flag telling whether this generation already received a push. A push to a
/// channel that already received one starts a new generation first, so
/// consumers pulling afterwards only see the newest delivery.
///
/// # Examples
///
/// ```
/// use futures::executor::block_on;
/// use futures::FutureExt;
/// use wire_promise::{NamedPromiseRegistry, Response};
///
/// let wires = NamedPromiseRegistry::<&str, &str>::new();
/// let first = wires.pull("a");
/// wires.push("a", Response::data("v1"));
/// assert_eq!(*block_on(first), Ok("v1"));
///
/// let next = wires.reset("a");
/// assert!(next.clone().now_or_never().is_none());
/// wires.push("a", Response::data("v2"));
/// assert_eq!(*block_on(next), Ok("v2"));
/// ```
pub struct NamedPromiseRegistry<T, E> {
    label: Option<String>,
    channels: Mutex<HashMap<String, Channel<T, E>>>,
}

struct Channel<T, E> {
    promise: Consumer<T, E>,
    producer: Option<Producer<T, E>>,
    delivered: bool,
}

impl<T, E> Channel<T, E> {
    fn new() -> Self {
        let (producer, promise) = Producer::new();
        Self {
            promise,
            producer: Some(producer),
            delivered: false,
        }
    }
}

impl<T, E> NamedPromiseRegistry<T, E> {
    pub fn new() -> Self {
        Self {
            label: None,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// A registry whose log events carry `label`.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new()
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn ensure_channel<'a>(
        &self,
        channels: &'a mut HashMap<String, Channel<T, E>>,
        name: &str,
    ) -> &'a mut Channel<T, E> {
        channels.entry(name.to_owned()).or_insert_with(|| {
            trace!(registry = self.label(), wire = name, "creating wire");
            Channel::new()
        })
    }

    /// Delivers a response for `name`.
    ///
    /// If this generation already received a push, the channel is replaced
    /// by a fresh one before the response is applied. Envelope data resolves
    /// the promise, an envelope error rejects it, an empty envelope leaves it
    /// pending and any other value resolves it as is.
    pub fn push(&self, name: &str, response: impl Into<Response<T, E>>) {
        let settlement = response.into().into_settlement();
        let producer = {
            let mut channels = self.channels.lock();
            if channels.get(name).is_some_and(|channel| channel.delivered) {
                debug!(registry = self.label(), wire = name, "redelivery, starting new generation");
                channels.insert(name.to_owned(), Channel::new());
            }
            let channel = self.ensure_channel(&mut channels, name);
            channel.delivered = true;
            if settlement.is_some() {
                channel.producer.take()
            } else {
                None
            }
        };
        // Settled outside the registry lock so woken tasks can use the registry.
        match (settlement, producer) {
            (Some(settlement), Some(producer)) => {
                debug!(
                    registry = self.label(),
                    wire = name,
                    resolved = settlement.is_ok(),
                    "settling wire"
                );
                match settlement {
                    Ok(data) => producer.resolve(data),
                    Err(error) => producer.reject(error),
                }
            }
            // A generation that received a push is replaced before the next
            // one, so its producer is always still there.
            (Some(_), None) => {}
            (None, _) => debug!(registry = self.label(), wire = name, "empty delivery, wire stays pending"),
        }
    }

    /// The current promise for `name`, created pending if the name is new.
    ///
    /// Pulls between two generations return the same promise.
    pub fn pull(&self, name: &str) -> Consumer<T, E> {
        let mut channels = self.channels.lock();
        let channel = self.ensure_channel(&mut channels, name);
        trace!(registry = self.label(), wire = name, state = ?channel.promise.state(), "pulling wire");
        channel.promise.clone()
    }

    /// Replaces the channel for `name` with a fresh pending one and returns
    /// its promise.
    ///
    /// Consumers still waiting on the replaced promise are never woken.
    pub fn reset(&self, name: &str) -> Consumer<T, E> {
        let mut channels = self.channels.lock();
        if channels.remove(name).is_some() {
            debug!(registry = self.label(), wire = name, "resetting wire");
        }
        self.ensure_channel(&mut channels, name).promise.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.lock().contains_key(name)
    }

    /// State of the current generation for `name`, `None` if never touched.
    pub fn state(&self, name: &str) -> Option<PromiseState> {
        self.channels.lock().get(name).map(|channel| channel.promise.state())
    }

    pub fn names(&self) -> Vec<String> {
        self.channels.lock().keys().cloned().collect()
    }
}

impl<T, E> Default for NamedPromiseRegistry<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Debug for NamedPromiseRegistry<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedPromiseRegistry")
            .field("label", &self.label)
            .field("wires", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::NamedPromiseRegistry;
    use crate::poly::Consumer;
    use crate::{PromiseState, Response};
    use futures::task::{waker, ArcWake};
    use parking_lot::Mutex;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{mpsc, Arc};
    use std::task::Context;
    use std::{thread, time::Duration};

    struct StateOnWake {
        wires: Arc<NamedPromiseRegistry<u8, ()>>,
        seen: Mutex<Option<PromiseState>>,
    }

    impl ArcWake for StateOnWake {
        fn wake_by_ref(arc_self: &Arc<Self>) {
            *arc_self.seen.lock() = arc_self.wires.state("x");
        }
    }

    #[test]
    fn untouched_names_have_no_state() {
        let wires = NamedPromiseRegistry::<u8, ()>::new();
        assert_eq!(wires.state("x"), None);
        assert!(!wires.contains("x"));
    }

    #[test]
    fn pull_creates_pending_channel() {
        let wires = NamedPromiseRegistry::<u8, ()>::new();
        let _ = wires.pull("x");
        assert!(wires.contains("x"));
        assert_eq!(wires.state("x"), Some(PromiseState::Pending));
    }

    #[test]
    fn falsy_payload_counts_as_delivered() {
        let wires = NamedPromiseRegistry::<u8, ()>::new();
        let first = wires.pull("x");
        wires.push("x", Response::data(0));
        wires.push("x", Response::data(1));
        let second = wires.pull("x");
        assert!(!Consumer::ptr_eq(&first, &second));
        assert_eq!(*first.settled().expect("first generation settled"), Ok(0));
        assert_eq!(*second.settled().expect("second generation settled"), Ok(1));
    }

    #[test]
    fn empty_push_still_starts_next_generation() {
        let wires = NamedPromiseRegistry::<u8, ()>::new();
        let first = wires.pull("x");
        wires.push("x", Response::empty());
        assert_eq!(wires.state("x"), Some(PromiseState::Pending));
        wires.push("x", Response::data(2));
        assert_eq!(first.state(), PromiseState::Pending);
        assert_eq!(wires.state("x"), Some(PromiseState::Resolved));
    }

    #[test]
    fn reset_of_unknown_name_creates_it() {
        let wires = NamedPromiseRegistry::<u8, ()>::new();
        let promise = wires.reset("x");
        assert!(Consumer::ptr_eq(&promise, &wires.pull("x")));
    }

    #[test]
    fn push_after_reset_does_not_reset_again() {
        let wires = NamedPromiseRegistry::<u8, ()>::new();
        wires.push("x", Response::data(1));
        let fresh = wires.reset("x");
        wires.push("x", Response::data(2));
        assert_eq!(*fresh.settled().expect("fresh generation settled"), Ok(2));
    }

    #[test]
    fn label_is_kept() {
        let wires = NamedPromiseRegistry::<u8, ()>::with_label("record-page");
        assert_eq!(wires.label(), Some("record-page"));
        assert_eq!(NamedPromiseRegistry::<u8, ()>::default().label(), None);
    }

    #[test]
    fn rejected_generation_is_replaced_by_next_push() {
        let wires = NamedPromiseRegistry::<u8, &str>::new();
        let rejected = wires.pull("x");
        wires.push("x", Response::error("E"));
        wires.push("x", Response::data(4));
        let resolved = wires.pull("x");
        assert!(!Consumer::ptr_eq(&rejected, &resolved));
        assert_eq!(rejected.state(), PromiseState::Rejected);
        assert_eq!(*resolved.settled().expect("next generation settled"), Ok(4));
    }

    #[test]
    fn waker_can_call_back_into_registry() {
        let wires = Arc::new(NamedPromiseRegistry::<u8, ()>::new());
        let on_wake = Arc::new(StateOnWake { wires: wires.clone(), seen: Mutex::new(None) });
        let waker = waker(on_wake.clone());
        let mut pulled = wires.pull("x");
        assert!(Pin::new(&mut pulled).poll(&mut Context::from_waker(&waker)).is_pending());

        let (done, returned) = mpsc::channel();
        let source = wires.clone();
        thread::spawn(move || {
            source.push("x", Response::data(1));
            let _ = done.send(());
        });
        returned
            .recv_timeout(Duration::from_secs(2))
            .expect("push returned");
        assert_eq!(*on_wake.seen.lock(), Some(PromiseState::Resolved));
    }
}
