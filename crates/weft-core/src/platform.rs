//! Platform abstraction traits for the Weft runtime's scheduling services.
//!
//! These traits let the reconciler delegate time slicing to the host
//! environment, enabling integration with different event loops without
//! depending on a concrete clock.

use std::time::Duration;

/// One cooperative time slice granted by the host.
///
/// The work loop polls [`time_remaining`](IdleDeadline::time_remaining)
/// between fiber units and yields once the slice is nearly exhausted, so
/// implementations should be cheap to query repeatedly.
pub trait IdleDeadline {
    /// Returns how much of the current slice is left.
    fn time_remaining(&self) -> Duration;
}

/// Requests future idle turns from the host.
///
/// The renderer pings this whenever work remains at the end of a turn; the
/// host is expected to call [`Renderer::work`](crate::Renderer::work) again
/// with a fresh deadline. Implementations must tolerate redundant requests.
pub trait IdleScheduler {
    /// Request that the host grant another idle slice.
    fn request_idle(&self);
}
