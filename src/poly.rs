use std::fmt::{self, Debug};
use std::sync::Arc;
use std::{future::Future, pin::Pin, task::{Context, Poll, Waker}};
use parking_lot::Mutex;
use crate::{Promise, PromiseState};

/// This `poly::Producer` promise can have many consumers. The consumers may be
/// cloned and all of them observe the same settlement as an
/// `Arc<Result<T, E>>`.
///
/// Dropping the producer without settling it leaves the consumers pending.
///
/// # Examples
///
/// ```
/// use wire_promise::{Promise, poly::Producer};
/// use futures::executor::block_on;
/// use std::thread;
/// let (promise, consumer) = Producer::<String, String>::new();
/// let consumer2 = consumer.clone();
/// let task1 = thread::spawn(move || block_on(async {
///     assert_eq!(*consumer.await, Ok("Hi".to_string()));
/// }));
/// let task2 = thread::spawn(move || block_on(async {
///     assert_eq!(*consumer2.await, Ok("Hi".to_string()));
/// }));
/// promise.resolve("Hi".into());
/// task1.join().expect("The task1 thread has panicked.");
/// task2.join().expect("The task2 thread has panicked.");
/// ```
pub struct Producer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

pub struct Consumer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

struct Inner<T, E> {
    value: Option<Arc<Result<T, E>>>,
    wakers: Vec<Waker>,
}

impl<T, E> Producer<T, E> {
    fn settle(self, value: Result<T, E>) {
        let wakers = {
            let mut promise = self.promise.lock();
            promise.value = Some(Arc::new(value));
            std::mem::take(&mut promise.wakers)
        };
        // Wake outside the lock: a waker may inspect the promise.
        for waker in wakers {
            waker.wake()
        }
    }
}

impl<T, E> Promise for Producer<T, E> {
    type Output = T;
    type Error = E;
    type Waiter = Consumer<T, E>;

    fn new() -> (Self, Self::Waiter) {
        let producer = Self {
            promise: Arc::new(Mutex::new(Inner {
                value: None,
                wakers: vec![],
            })),
        };
        let consumer = Consumer { promise: producer.promise.clone() };
        (producer, consumer)
    }

    fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    fn reject(self, err: E) {
        self.settle(Err(err));
    }
}

impl<T, E> Consumer<T, E> {
    /// Whether both consumers wait on the same promise.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.promise, &other.promise)
    }

    /// The settlement, if the promise is already settled.
    pub fn settled(&self) -> Option<Arc<Result<T, E>>> {
        self.promise.lock().value.clone()
    }

    pub fn state(&self) -> PromiseState {
        match self.promise.lock().value.as_deref() {
            None => PromiseState::Pending,
            Some(Ok(_)) => PromiseState::Resolved,
            Some(Err(_)) => PromiseState::Rejected,
        }
    }

    /// Waits for the settlement and returns an owned copy of it.
    pub async fn cloned(self) -> Result<T, E>
    where
        T: Clone,
        E: Clone,
    {
        let settled = self.await;
        (*settled).clone()
    }
}

impl<T, E> Clone for Consumer<T, E> {
    fn clone(&self) -> Self {
        Self { promise: self.promise.clone() }
    }
}

impl<T, E> Future for Consumer<T, E> {
    type Output = Arc<Result<T, E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut promise = self.promise.lock();
        if let Some(value) = &promise.value {
            return Poll::Ready(value.clone());
        }
        // One waker per task; clones awaited from other tasks add their own.
        if !promise.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            promise.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl<T, E> Debug for Producer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}

impl<T, E> Debug for Consumer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("state", &self.state()).finish()
    }
}
