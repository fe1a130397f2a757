//! Explicit session state and the handles observers use to follow it.
//!
//! A [`SessionContext`] is created by the session facade and shared with
//! every controller by `Arc`. It owns one channel per observable stream:
//!
//! - state streams (`watch`): current watchlist, all watchlists, selected
//!   symbols, search results. Observers read the latest value and are
//!   notified of changes.
//! - event streams (`broadcast`): quotes and errors. Every item is delivered
//!   in order to every subscriber, up to the configured buffer.
//!
//! Shutdown is a single flag observed by all background tasks and
//! subscriptions; once set, nothing more is published.

pub mod context;
pub mod subscription;

pub use context::SessionContext;
pub use subscription::{CommandHandle, EventSubscription, ShutdownSignal, StateSubscription};
