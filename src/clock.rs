use chrono::{Local, NaiveDateTime, Timelike};

/// Server-side notion of "now". Every date rule reads time through this.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock, truncated to whole seconds.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[cfg(test)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl FixedClock {
    pub fn at(date: &str, time: &str) -> Self {
        let raw = format!("{date} {time}");
        Self(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").unwrap())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
