use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresenceStatus {
    Present,
    Excused,
    Sick,
    Absent,
}

/// One attendance entry for one user on one date. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "user_id": 5,
    "date": "2024-06-01",
    "time": "07:45:12",
    "status": "present"
}))]
pub struct PresenceRecord {
    pub id: u64,
    pub user_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "07:45:12")]
    pub time: NaiveTime,
    pub status: PresenceStatus,
}

/// A record that has passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPresence {
    pub user_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: PresenceStatus,
}

impl NewPresence {
    pub fn into_record(self, id: u64) -> PresenceRecord {
        PresenceRecord {
            id,
            user_id: self.user_id,
            date: self.date,
            time: self.time,
            status: self.status,
        }
    }
}

/// Number of records per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub present: u64,
    pub excused: u64,
    pub sick: u64,
    pub absent: u64,
}

impl StatusCounts {
    pub fn get(&self, status: PresenceStatus) -> u64 {
        match status {
            PresenceStatus::Present => self.present,
            PresenceStatus::Excused => self.excused,
            PresenceStatus::Sick => self.sick,
            PresenceStatus::Absent => self.absent,
        }
    }

    pub fn with(mut self, status: PresenceStatus) -> Self {
        match status {
            PresenceStatus::Present => self.present += 1,
            PresenceStatus::Excused => self.excused += 1,
            PresenceStatus::Sick => self.sick += 1,
            PresenceStatus::Absent => self.absent += 1,
        }
        self
    }

    pub fn total(&self) -> u64 {
        PresenceStatus::iter().map(|s| self.get(s)).sum()
    }
}

impl std::ops::Add for StatusCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            present: self.present + rhs.present,
            excused: self.excused + rhs.excused,
            sick: self.sick + rhs.sick,
            absent: self.absent + rhs.absent,
        }
    }
}

impl std::iter::Sum for StatusCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, c| acc + c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_wire_form_is_lowercase() {
        assert_eq!(PresenceStatus::Excused.as_ref(), "excused");
        assert_eq!(
            PresenceStatus::from_str("sick").unwrap(),
            PresenceStatus::Sick
        );
        assert!(PresenceStatus::from_str("late").is_err());
        assert_eq!(
            serde_json::to_value(PresenceStatus::Absent).unwrap(),
            serde_json::json!("absent")
        );
    }

    #[test]
    fn counts_accumulate_and_sum() {
        let a = StatusCounts::default()
            .with(PresenceStatus::Present)
            .with(PresenceStatus::Present)
            .with(PresenceStatus::Sick);
        let b = StatusCounts::default().with(PresenceStatus::Absent);

        let total: StatusCounts = [a, b].into_iter().sum();
        assert_eq!(total.present, 2);
        assert_eq!(total.sick, 1);
        assert_eq!(total.absent, 1);
        assert_eq!(total.excused, 0);
        assert_eq!(total.total(), 4);
    }
}
