//! Background forecast fetching
//!
//! Forecast requests run as tokio tasks and report back over a channel so the
//! dashboard state is only ever replaced on the main event loop. An optional
//! ticker asks the loop to refresh the active location periodically.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::data::{Forecast, ForecastSource, Location};

/// Messages sent from background tasks to the main loop
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// A forecast request finished; `None` means it failed
    ForecastLoaded {
        seq: u64,
        location: Location,
        forecast: Option<Forecast>,
    },
    /// The auto-refresh interval elapsed
    Tick,
}

/// Configuration for automatic refresh
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between automatic refreshes
    pub interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600), // 10 minutes
            enabled: true,
        }
    }
}

impl RefreshConfig {
    /// Builds a config from minutes; 0 disables auto-refresh.
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            interval: Duration::from_secs(minutes.max(1) * 60),
            enabled: minutes > 0,
        }
    }
}

/// Spawns forecast fetches and the auto-refresh ticker
pub struct ForecastRefresher {
    source: Arc<dyn ForecastSource>,
    sender: mpsc::Sender<RefreshMessage>,
    ticker: Option<JoinHandle<()>>,
}

impl ForecastRefresher {
    /// Creates a refresher and the receiver its tasks report to.
    ///
    /// The ticker is started here when `config.enabled` is set, so this must be
    /// called inside a tokio runtime.
    pub fn spawn(
        source: Arc<dyn ForecastSource>,
        config: RefreshConfig,
    ) -> (Self, mpsc::Receiver<RefreshMessage>) {
        let (sender, receiver) = mpsc::channel(32);

        let ticker = config.enabled.then(|| {
            let tx = sender.clone();
            let period = config.interval;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                // Skip the first tick (immediate)
                interval.tick().await;
                loop {
                    interval.tick().await;
                    if tx.send(RefreshMessage::Tick).await.is_err() {
                        break;
                    }
                }
            })
        });

        let refresher = Self {
            source,
            sender,
            ticker,
        };
        (refresher, receiver)
    }

    /// Fetches the forecast for `location`, tagging the reply with `seq`.
    pub fn request(&self, seq: u64, location: Location) {
        let source = Arc::clone(&self.source);
        let tx = self.sender.clone();
        tracing::debug!(seq, location = %location.name, "forecast requested");
        tokio::spawn(async move {
            let forecast = source.forecast(&location).await;
            let _ = tx
                .send(RefreshMessage::ForecastLoaded {
                    seq,
                    location,
                    forecast,
                })
                .await;
        });
    }
}

impl Drop for ForecastRefresher {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
