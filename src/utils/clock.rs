use chrono::{Local, NaiveDateTime};

/// Represents an entity responsible for providing dates across application. This allows commands
/// to be tested against a fixed point in time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Current wall clock time in the local timezone.
    fn now(&self) -> NaiveDateTime;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
