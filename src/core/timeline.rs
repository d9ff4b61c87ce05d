use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// A single action scheduled at an offset from the start of a timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Cue<A> {
    pub at: Duration,
    pub action: A,
}

/// Ordered list of `{delay, action}` entries
///
/// Offsets are measured from the moment the timeline starts, not from the
/// previous cue. Cues sharing an offset fire in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<A> {
    cues: Vec<Cue<A>>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self { cues: Vec::new() }
    }
}

impl<A> Timeline<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, at: Duration, action: A) -> Self {
        self.push(at, action);
        self
    }

    pub fn push(&mut self, at: Duration, action: A) {
        let idx = self.cues.partition_point(|c| c.at <= at);
        self.cues.insert(idx, Cue { at, action });
    }

    /// Append another timeline shifted by `offset`
    pub fn chain(mut self, offset: Duration, other: Timeline<A>) -> Self {
        for cue in other.cues {
            self.push(offset + cue.at, cue.action);
        }
        self
    }

    pub fn cues(&self) -> &[Cue<A>] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Offset of the last cue
    pub fn duration(&self) -> Duration {
        self.cues.last().map(|c| c.at).unwrap_or_default()
    }

    /// Cues with `after < at <= until`
    pub fn due_between(&self, after: Option<Duration>, until: Duration) -> impl Iterator<Item = &Cue<A>> {
        self.cues
            .iter()
            .filter(move |c| after.map_or(true, |a| c.at > a) && c.at <= until)
    }
}

/// Flag plus task handle used to tear down a running timeline
#[derive(Debug, Clone)]
struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl CancelHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.abort.abort();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A timeline being executed by the scheduler
///
/// Once cancelled, [`TimelineRun::next`] yields `None` even if an action
/// was already queued, so no stale action reaches the caller.
#[derive(Debug)]
pub struct TimelineRun<A> {
    rx: mpsc::UnboundedReceiver<A>,
    handle: CancelHandle,
}

impl<A> TimelineRun<A> {
    pub async fn next(&mut self) -> Option<A> {
        if self.handle.is_cancelled() {
            return None;
        }
        let action = self.rx.recv().await?;
        if self.handle.is_cancelled() {
            return None;
        }
        Some(action)
    }

    pub fn cancel(&self) {
        self.handle.cancel();
        tracing::trace!("Timeline cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }
}

impl<A> Drop for TimelineRun<A> {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// Runs timelines on the tokio timer
pub struct Scheduler;

impl Scheduler {
    /// Spawn a task that emits each cue's action at its offset
    pub fn start<A>(timeline: Timeline<A>) -> TimelineRun<A>
    where
        A: Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let started = Instant::now();

        let task = tokio::spawn(async move {
            for cue in timeline.cues {
                tokio::time::sleep_until(started + cue.at).await;
                if flag.load(Ordering::SeqCst) || tx.send(cue.action).is_err() {
                    return;
                }
            }
        });

        TimelineRun {
            rx,
            handle: CancelHandle {
                cancelled,
                abort: task.abort_handle(),
            },
        }
    }
}
