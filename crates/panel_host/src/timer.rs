//! Timer capability used to bound network requests.

use std::{future::Future, pin::Pin};

use futures::future::{self, Either};

/// Object-safe boxed future used by [`Timer`].
pub type TimerFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a>>;

/// Host timer that resolves after a delay on the active event loop.
pub trait Timer {
    /// Returns a future that completes after `duration_ms` milliseconds.
    fn sleep<'a>(&'a self, duration_ms: u64) -> TimerFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Timer that never fires; requests are bounded only by the transport.
pub struct NeverTimer;

impl Timer for NeverTimer {
    fn sleep<'a>(&'a self, _duration_ms: u64) -> TimerFuture<'a> {
        Box::pin(future::pending())
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Timer that fires immediately, so any request that is not already complete times out.
pub struct ImmediateTimer;

impl Timer for ImmediateTimer {
    fn sleep<'a>(&'a self, _duration_ms: u64) -> TimerFuture<'a> {
        Box::pin(future::ready(()))
    }
}

/// Races `request` against `timer`; returns `None` when the timer wins.
///
/// The request is polled first, so a request that is ready on its first poll always wins.
pub async fn with_timeout<T, F>(timer: &dyn Timer, timeout_ms: u64, request: F) -> Option<T>
where
    F: Future<Output = T>,
{
    let request = Box::pin(request);
    match future::select(request, timer.sleep(timeout_ms)).await {
        Either::Left((value, _)) => Some(value),
        Either::Right(((), _)) => None,
    }
}
