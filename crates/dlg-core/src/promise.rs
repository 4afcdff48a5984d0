//! Deferred-value primitive
//!
//! [`Promise`] is a shared, one-shot settlement cell with:
//! - `then`-style continuation scheduling (the only capability delegation
//!   rules rely on)
//! - adoption of nested promises, so a continuation may return a
//!   [`Value::Deferred`] and the chained promise settles with its outcome
//! - an own-member table that delegation rules install synthetic members into
//!
//! # Scheduling
//!
//! Continuations never run inside the call that registers them. A promise
//! hands its reactions, in registration order, to the microtask queue of the
//! thread that created it. That queue is drained on the polling thread when
//! one of its promises is awaited, or by [`run_microtasks`]; a runtime worker
//! never runs reactions on its own. A panicking continuation rejects only its
//! own promise.
//!
//! [`run_microtasks`]: crate::run_microtasks

use crate::error::{ApplyError, DelegateError};
use crate::member::{Accessor, Member, MemberKind};
use crate::microtask::JobQueue;
use crate::value::Value;
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// Settlement of a promise
pub type Outcome = Result<Value, DelegateError>;

type Reaction = Box<dyn FnOnce(Outcome) + Send>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique promise identifier (log fields only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromiseId(u64);

impl PromiseId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "promise#{}", self.0)
    }
}

enum State {
    Pending {
        reactions: Vec<Reaction>,
        waiters: Vec<Waker>,
    },
    Settled {
        outcome: Outcome,
    },
}

struct Inner {
    id: PromiseId,
    queue: Arc<JobQueue>,
    state: Mutex<State>,
    members: RwLock<IndexMap<String, Member>>,
}

impl Inner {
    fn enqueue(&self, reaction: Reaction, outcome: Outcome) {
        self.queue.push(Box::new(move || reaction(outcome)));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("continuation panicked: {detail}")
}

/// Shared handle to a deferred value
///
/// Clones refer to the same settlement and the same member table.
#[derive(Clone)]
pub struct Promise {
    inner: Arc<Inner>,
}

impl Promise {
    /// Create pending promise and its resolver
    #[must_use]
    pub fn pending() -> (Self, Resolver) {
        let promise = Self {
            inner: Arc::new(Inner {
                id: PromiseId::next(),
                queue: JobQueue::current(),
                state: Mutex::new(State::Pending {
                    reactions: Vec::new(),
                    waiters: Vec::new(),
                }),
                members: RwLock::new(IndexMap::new()),
            }),
        };
        let resolver = Resolver {
            promise: Some(promise.clone()),
        };
        (promise, resolver)
    }

    /// Create promise resolved with `value`
    ///
    /// A deferred `value` is adopted rather than nested.
    #[must_use]
    pub fn resolved(value: impl Into<Value>) -> Self {
        let (promise, resolver) = Self::pending();
        resolver.resolve(value);
        promise
    }

    /// Create rejected promise
    #[must_use]
    pub fn rejected(error: DelegateError) -> Self {
        let (promise, resolver) = Self::pending();
        resolver.reject(error);
        promise
    }

    /// Drive `future` on the current tokio runtime and settle with its output
    ///
    /// # Panics
    /// When called outside a tokio runtime
    #[must_use]
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let (promise, resolver) = Self::pending();
        tokio::spawn(async move { resolver.settle(future.await) });
        promise
    }

    /// Promise id
    #[inline]
    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.inner.id
    }

    /// Reference identity
    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Check if settled (adoption in progress counts as pending)
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(*self.inner.state.lock(), State::Settled { .. })
    }

    /// Schedule `on_fulfilled` against the eventual value
    ///
    /// Returns a promise for the continuation's result. Rejections skip the
    /// continuation and carry over unchanged; a panic inside it rejects the
    /// returned promise with [`DelegateError::Target`].
    pub fn then<F>(&self, on_fulfilled: F) -> Promise
    where
        F: FnOnce(Value) -> Outcome + Send + 'static,
    {
        let (next, resolver) = Promise::pending();
        self.subscribe(Box::new(move |outcome: Outcome| {
            let outcome = outcome.and_then(|value| {
                panic::catch_unwind(AssertUnwindSafe(move || on_fulfilled(value)))
                    .unwrap_or_else(|payload| Err(DelegateError::target(panic_message(&*payload))))
            });
            resolver.settle(outcome);
        }));
        next
    }

    /// Future for the eventual outcome, without consuming the handle
    pub fn settled(&self) -> BoxFuture<'static, Outcome> {
        Settlement {
            promise: self.clone(),
        }
        .boxed()
    }

    fn subscribe(&self, reaction: Reaction) {
        let mut state = self.inner.state.lock();
        match &mut *state {
            State::Pending { reactions, .. } => reactions.push(reaction),
            // Queued under the state lock so concurrent settlement keeps
            // registration order
            State::Settled { outcome } => self.inner.enqueue(reaction, outcome.clone()),
        }
    }

    fn settle(&self, outcome: Outcome) {
        if let Ok(Value::Deferred(other)) = &outcome {
            if Promise::ptr_eq(self, other) {
                self.settle(Err(DelegateError::Cycle));
                return;
            }
            let me = self.clone();
            other.subscribe(Box::new(move |adopted: Outcome| me.settle(adopted)));
            return;
        }

        let mut state = self.inner.state.lock();
        let (reactions, waiters) = match &mut *state {
            State::Pending { reactions, waiters } => (std::mem::take(reactions), std::mem::take(waiters)),
            State::Settled { .. } => {
                tracing::trace!(promise = %self.id(), "ignoring second settlement");
                return;
            }
        };
        if !reactions.is_empty() {
            tracing::trace!(promise = %self.id(), reactions = reactions.len(), "queueing reactions");
        }
        for reaction in reactions {
            self.inner.enqueue(reaction, outcome.clone());
        }
        *state = State::Settled { outcome };
        drop(state);

        for waker in waiters {
            waker.wake();
        }
    }

    /// Install `member` under `name`
    ///
    /// # Errors
    /// `ApplyError::Redefinition` if the existing member is not configurable
    pub fn define(&self, name: impl Into<String>, member: impl Into<Member>) -> Result<(), ApplyError> {
        let name = name.into();
        let member = member.into();
        let mut members = self.inner.members.write();

        if members.get(&name).is_some_and(|existing| !existing.is_configurable()) {
            return Err(ApplyError::Redefinition { name });
        }

        tracing::debug!(promise = %self.id(), member = %name, kind = ?member.kind(), "defining member");
        members.insert(name, member);
        Ok(())
    }

    /// Check if member is installed
    #[inline]
    #[must_use]
    pub fn has_member(&self, name: &str) -> bool {
        self.inner.members.read().contains_key(name)
    }

    /// Installed member names, in first-definition order
    #[must_use]
    pub fn member_names(&self) -> Vec<String> {
        self.inner.members.read().keys().cloned().collect()
    }

    /// Kind of installed member
    #[must_use]
    pub fn member_kind(&self, name: &str) -> Option<MemberKind> {
        self.inner.members.read().get(name).map(Member::kind)
    }

    // Cloned out so member bodies can define or call members themselves
    fn member(&self, name: &str) -> Result<Member, DelegateError> {
        self.inner
            .members
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DelegateError::UnknownMember {
                name: name.to_string(),
            })
    }

    /// Call synthetic method `name`
    ///
    /// # Errors
    /// `UnknownMember` or `NotCallable`; failures of the delegated call
    /// itself reject the returned promise instead
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Promise, DelegateError> {
        match self.member(name)? {
            Member::Method(body) => Ok(body(self, args)),
            Member::Accessor(_) => Err(DelegateError::NotCallable {
                name: name.to_string(),
            }),
        }
    }

    /// Read synthetic property `name`
    ///
    /// # Errors
    /// `UnknownMember` or `NotReadable`
    pub fn get(&self, name: &str) -> Result<Promise, DelegateError> {
        match self.member(name)? {
            Member::Accessor(Accessor { get: Some(get), .. }) => Ok(get(self)),
            _ => Err(DelegateError::NotReadable {
                name: name.to_string(),
            }),
        }
    }

    /// Write synthetic property `name`, discarding the write's completion
    ///
    /// # Errors
    /// `UnknownMember` or `NotWritable`
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), DelegateError> {
        self.set_tracked(name, value).map(drop)
    }

    /// Write synthetic property `name`
    ///
    /// Returns a promise that settles once the write has been performed on
    /// the eventual result, or rejects if it could not be.
    ///
    /// # Errors
    /// `UnknownMember` or `NotWritable`
    pub fn set_tracked(&self, name: &str, value: impl Into<Value>) -> Result<Promise, DelegateError> {
        match self.member(name)? {
            Member::Accessor(Accessor { set: Some(set), .. }) => Ok(set(self, value.into())),
            _ => Err(DelegateError::NotWritable {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.inner.state.lock() {
            State::Pending { .. } => "pending",
            State::Settled { outcome: Ok(_) } => "fulfilled",
            State::Settled { outcome: Err(_) } => "rejected",
        };
        f.debug_struct("Promise")
            .field("id", &self.inner.id)
            .field("state", &state)
            .field("members", &self.member_names())
            .finish()
    }
}

impl IntoFuture for Promise {
    type Output = Outcome;
    type IntoFuture = BoxFuture<'static, Outcome>;

    fn into_future(self) -> Self::IntoFuture {
        self.settled()
    }
}

/// Future returned by [`Promise::settled`]
///
/// Each poll first drains the microtask queues of the polling thread and of
/// the promise, so reactions registered earlier have run by the time it
/// completes.
struct Settlement {
    promise: Promise,
}

impl Future for Settlement {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        let home = &self.promise.inner.queue;
        let local = JobQueue::current();

        home.register(cx.waker());
        home.drain();
        if !Arc::ptr_eq(home, &local) {
            local.register(cx.waker());
            local.drain();
        }

        let mut state = self.promise.inner.state.lock();
        match &mut *state {
            State::Settled { outcome } => Poll::Ready(outcome.clone()),
            State::Pending { waiters, .. } => {
                if !waiters.iter().any(|known| known.will_wake(cx.waker())) {
                    waiters.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

/// Settles its promise exactly once
///
/// Dropping an unused resolver rejects the promise with
/// [`DelegateError::Abandoned`].
#[derive(Debug)]
pub struct Resolver {
    promise: Option<Promise>,
}

impl Resolver {
    /// Fulfil with `value`; a deferred value is adopted
    pub fn resolve(self, value: impl Into<Value>) {
        self.settle(Ok(value.into()));
    }

    /// Reject with `error`
    pub fn reject(self, error: DelegateError) {
        self.settle(Err(error));
    }

    /// Settle with `outcome`
    pub fn settle(mut self, outcome: Outcome) {
        if let Some(promise) = self.promise.take() {
            promise.settle(outcome);
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        if let Some(promise) = self.promise.take() {
            tracing::debug!(promise = %promise.id(), "resolver dropped before settlement");
            promise.settle(Err(DelegateError::Abandoned));
        }
    }
}
