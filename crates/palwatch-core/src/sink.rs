//! Where emitted events go.
//!
//! The pipeline only knows it must hand each event to an [`EventSink`].
//! The daemon implements it with a bridge that records the event in
//! history and fans it out to push subscribers.

use std::future::Future;

use palwatch_types::Event;

/// Receiver of every event the pipeline emits, in emission order.
pub trait EventSink: Send + Sync + 'static {
    /// Deliver one event. Must not fail; delivery problems are contained
    /// by the implementation.
    fn emit(&self, event: Event) -> impl Future<Output = ()> + Send;
}
