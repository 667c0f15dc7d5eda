//! Periodic polling.
//!
//! Polling is the only way a device learns about other voters: there is no
//! push channel, so a watcher simply reloads its snapshot on a fixed interval.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument as _, Level, event, span};

/// Configuration for polling a backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poller {
    /// How long to wait between two polls
    #[serde(with = "humantime_serde")]
    pub every: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            every: Duration::from_secs(20),
        }
    }
}

impl Poller {
    /// Execute a function at regular intervals, starting immediately.
    ///
    /// The function receives the number of the tick, counting from zero. A
    /// tick that runs late delays the following ones rather than bunching
    /// them up. Polling only stops when the function fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use evdemo::Poller;
    ///
    /// # fn main() {
    /// let poller = Poller {
    ///     every: Duration::from_millis(10),
    /// };
    ///
    /// let mut seen = Vec::new();
    /// let result = tokio_test::block_on(poller.run(async |tick| {
    ///     seen.push(tick);
    ///     if tick == 2 { Err("done") } else { Ok(()) }
    /// }));
    ///
    /// assert_eq!(result, Err("done"));
    /// assert_eq!(seen, [0, 1, 2]);
    /// # }
    /// ```
    pub async fn run<E>(&self, mut f: impl AsyncFnMut(u64) -> Result<(), E>) -> Result<(), E> {
        let mut interval = tokio::time::interval(self.every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for tick in 0.. {
            interval.tick().await;

            let span = span!(Level::DEBUG, "poll", tick);
            async {
                event!(Level::DEBUG, "polling");
                f(tick).await
            }
            .instrument(span)
            .await?;
        }

        Ok(())
    }
}
