// frontend/src/timers.rs

use estate_map::scheduler::{Scheduler, Sleep, Task};
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use std::time::Duration;

/// `setTimeout`-backed scheduler.
pub struct BrowserScheduler;

fn millis(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

impl Scheduler for BrowserScheduler {
    fn defer(&self, delay: Duration, task: Task) {
        // Fire-and-forget; the task re-checks its own preconditions.
        Timeout::new(millis(delay), task).forget();
    }

    fn sleep(&self, delay: Duration) -> Sleep {
        Box::pin(TimeoutFuture::new(millis(delay)))
    }
}
