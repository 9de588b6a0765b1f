use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Giveaways,
    Deals,
    News,
    Stores,
}

impl Source {
    /// Sources refreshed on every scheduler tick. The store map is fetched once.
    pub const REFRESHED: [Source; 3] = [Source::Giveaways, Source::Deals, Source::News];

    pub fn label(self) -> &'static str {
        match self {
            Source::Giveaways => "giveaways",
            Source::Deals => "game deals",
            Source::News => "news",
            Source::Stores => "store names",
        }
    }
}

/// Fires once immediately, then every `interval`.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: Duration,
    next_due: Instant,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval: interval.max(MIN_REFRESH_INTERVAL),
            next_due: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true when a refresh is due. Missed ticks are not replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

/// Handle to one in-flight fetch.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    request_id: u64,
    cancel: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// In-flight fetches, at most one per source. A newer request supersedes
/// the older one, whose response is then discarded on arrival.
#[derive(Debug)]
pub struct Tasks {
    next_request_id: u64,
    in_flight: HashMap<Source, TaskHandle>,
}

impl Default for Tasks {
    fn default() -> Self {
        Self {
            next_request_id: 1,
            in_flight: HashMap::new(),
        }
    }
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, source: Source) -> TaskHandle {
        let handle = TaskHandle {
            request_id: self.next_request_id,
            cancel: Arc::new(AtomicBool::new(false)),
        };
        self.next_request_id = self.next_request_id.wrapping_add(1);
        if let Some(previous) = self.in_flight.insert(source, handle.clone()) {
            previous.cancel();
        }
        handle
    }

    /// Marks `request_id` complete. Returns false for superseded requests.
    pub fn finish(&mut self, source: Source, request_id: u64) -> bool {
        match self.in_flight.get(&source) {
            Some(current) if current.request_id == request_id => {
                self.in_flight.remove(&source);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, source: Source) -> bool {
        self.in_flight.contains_key(&source)
    }

    pub fn any_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.cancel();
        }
    }
}
