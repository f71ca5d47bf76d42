// map/src/scheduler.rs

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type Task = Box<dyn FnOnce()>;
pub type Sleep = Pin<Box<dyn Future<Output = ()>>>;

/// Deferred execution on the page's event loop.
///
/// Deferred tasks are fire-and-forget: nothing cancels them, so a task must
/// re-check whatever state it depends on when it runs.
pub trait Scheduler {
    fn defer(&self, delay: Duration, task: Task);

    /// A future that resolves after `delay` without blocking the event loop.
    fn sleep(&self, delay: Duration) -> Sleep;
}
