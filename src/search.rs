//! Debounced location search
//!
//! Keystrokes reschedule a single timer; when the input has been quiet for the
//! configured period the query is resolved against a [`SuggestionSource`].
//! Timers and resolutions run as tokio tasks and report back through a
//! channel, so every state change happens on the caller's event loop.
//!
//! Two counters keep results ordered:
//! - the timer generation, bumped on every input, drops a timer that fired
//!   just before it was superseded;
//! - the dispatch sequence, stamped on each resolution, drops responses that
//!   arrive after a newer resolution was started.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::data::{Suggestion, SuggestionSource};

/// Default quiet period before a query is resolved
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Messages posted by timer and resolution tasks
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The quiet period elapsed for the input of `generation`
    TimerFired { generation: u64, query: String },
    /// A resolution stamped with `seq` completed
    Resolved {
        seq: u64,
        query: String,
        suggestions: Vec<Suggestion>,
    },
}

/// Immediate effect of an input change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchUpdate {
    /// Query is empty; the suggestion list must be cleared now
    Cleared,
    /// A resolution is scheduled after the quiet period
    Scheduled,
}

/// Owns the debounce timer and fences out-of-order resolutions
pub struct QueryController {
    source: Arc<dyn SuggestionSource>,
    quiet_period: Duration,
    /// At most one pending timer
    pending: Option<JoinHandle<()>>,
    generation: u64,
    /// Sequence of the latest dispatched resolution; only it may apply
    latest_seq: u64,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl QueryController {
    /// Creates a controller and the receiver its tasks report to.
    pub fn new(
        source: Arc<dyn SuggestionSource>,
        quiet_period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            source,
            quiet_period,
            pending: None,
            generation: 0,
            latest_seq: 0,
            events,
        };
        (controller, receiver)
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Whether a timer is waiting to fire
    pub fn has_pending_timer(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Sequence number of the most recently dispatched resolution
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Handles a change of the search text.
    ///
    /// Always cancels the pending timer first. Empty text clears immediately
    /// and also fences any resolution still in flight.
    pub fn on_input(&mut self, text: &str) -> SearchUpdate {
        self.abort_timer();
        self.generation += 1;

        if text.is_empty() {
            self.latest_seq += 1;
            return SearchUpdate::Cleared;
        }

        let generation = self.generation;
        let query = text.to_string();
        let quiet_period = self.quiet_period;
        let events = self.events.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let _ = events.send(SearchEvent::TimerFired { generation, query });
        }));

        SearchUpdate::Scheduled
    }

    /// Cancels the pending timer and discards anything still in flight.
    ///
    /// Called when a suggestion is chosen or the field is cleared.
    pub fn cancel(&mut self) {
        self.abort_timer();
        self.generation += 1;
        self.latest_seq += 1;
    }

    /// Processes a task event.
    ///
    /// Returns the suggestion list to publish when `event` is a response to
    /// the latest dispatched resolution; `None` otherwise.
    pub fn handle(&mut self, event: SearchEvent) -> Option<Vec<Suggestion>> {
        match event {
            SearchEvent::TimerFired { generation, query } => {
                if generation == self.generation {
                    self.pending = None;
                    self.dispatch(query);
                } else {
                    tracing::trace!(generation, current = self.generation, "superseded timer ignored");
                }
                None
            }
            SearchEvent::Resolved {
                seq,
                query,
                suggestions,
            } => {
                if seq == self.latest_seq {
                    tracing::debug!(seq, %query, count = suggestions.len(), "suggestions applied");
                    Some(suggestions)
                } else {
                    tracing::debug!(seq, latest = self.latest_seq, %query, "stale suggestions discarded");
                    None
                }
            }
        }
    }

    fn dispatch(&mut self, query: String) {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        let source = Arc::clone(&self.source);
        let events = self.events.clone();

        tracing::debug!(seq, %query, "resolving suggestions");
        // Not tracked: in-flight lookups are never cancelled, only fenced
        tokio::spawn(async move {
            let suggestions = source.suggest(&query).await;
            let _ = events.send(SearchEvent::Resolved {
                seq,
                query,
                suggestions,
            });
        });
    }

    fn abort_timer(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        self.abort_timer();
    }
}
