use rand::Rng;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Random pause taken before each call to the subtitle service.
#[derive(Debug, Clone, Copy)]
pub struct CourtesyDelay {
    min: Duration,
    max: Duration,
}

impl CourtesyDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    pub fn sample(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    pub fn wait(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        info!(
            "Waiting {:.2} seconds before next SubDL API call...",
            delay.as_secs_f64()
        );
        thread::sleep(delay);
    }
}
