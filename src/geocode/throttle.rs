//! Pacing of live requests to the geocoding service.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum pause between a live response and the next request.
///
/// Only requests that actually go to the network call [`wait_turn`] and
/// [`mark_done`]; cache hits never touch the throttle and therefore never
/// wait. The pause is measured from the end of the previous exchange, so a
/// slow service does not shorten it.
///
/// [`wait_turn`]: RequestThrottle::wait_turn
/// [`mark_done`]: RequestThrottle::mark_done
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_response: Option<Instant>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        RequestThrottle {
            min_interval,
            last_response: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleeps until `min_interval` has passed since the previous exchange
    /// finished.
    pub async fn wait_turn(&self) {
        if let Some(last) = self.last_response {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                log::trace!("Pacing: waiting {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
    }

    /// Records the end of a live exchange, successful or not.
    pub fn mark_done(&mut self) {
        self.last_response = Some(Instant::now());
    }
}
