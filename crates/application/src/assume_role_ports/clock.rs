use chrono::{DateTime, Utc};

/// Time source shared by issuance and expiry comparison.
pub trait Clock: Send + Sync {
    /// Returns the current UTC wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
