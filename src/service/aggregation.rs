use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use super::PresenceService;
use crate::error::{AppError, AppResult};
use crate::model::presence::{PresenceStatus, StatusCounts};
use crate::store::AnalysisRow;

/// User attribute the analysis partitions by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Class,
    Position,
}

impl GroupBy {
    pub fn key<'a>(&self, row: &'a AnalysisRow) -> Option<&'a str> {
        match self {
            GroupBy::Class => row.class.as_deref(),
            GroupBy::Position => row.position.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub user_id: u64,
    pub year: i32,
    pub month: u32,
    pub attendance_summary: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalysisPeriod {
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
}

/// Metrics of one group. Percentages are in [0, 100] and, when the group
/// has records, sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroupSummary {
    /// `null` collects users without the grouping attribute.
    pub group: Option<String>,
    pub total_users: usize,
    pub total_records: u64,
    pub attendance_rate: f64,
    pub present_percentage: f64,
    pub excused_percentage: f64,
    pub sick_percentage: f64,
    pub absent_percentage: f64,
    pub total_presence: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PresenceAnalysis {
    pub analysis_period: AnalysisPeriod,
    pub group_by: GroupBy,
    pub grouped_analysis: Vec<GroupSummary>,
    pub total_presence: StatusCounts,
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}

#[derive(Default)]
struct Tally {
    users: BTreeSet<u64>,
    counts: StatusCounts,
}

impl Tally {
    fn with(mut self, row: &AnalysisRow) -> Self {
        self.users.insert(row.user_id);
        self.counts = self.counts.with(row.status);
        self
    }

    fn into_summary(self, group: Option<String>) -> GroupSummary {
        let total = self.counts.total();
        let pct = |status| percentage(self.counts.get(status), total);
        GroupSummary {
            group,
            total_users: self.users.len(),
            total_records: total,
            attendance_rate: pct(PresenceStatus::Present),
            present_percentage: pct(PresenceStatus::Present),
            excused_percentage: pct(PresenceStatus::Excused),
            sick_percentage: pct(PresenceStatus::Sick),
            absent_percentage: pct(PresenceStatus::Absent),
            total_presence: self.counts,
        }
    }
}

/// `[first day of the month, first day of the next month)` around `day`.
fn month_bounds(day: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = day.with_day(1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((first, next))
}

/// Folds joined rows into one summary per group, ordered by group key.
pub fn summarize(rows: &[AnalysisRow], group_by: GroupBy) -> Vec<GroupSummary> {
    rows.iter()
        .fold(BTreeMap::<Option<&str>, Tally>::new(), |mut groups, row| {
            let key = group_by.key(row);
            let tally = groups.remove(&key).unwrap_or_default().with(row);
            groups.insert(key, tally);
            groups
        })
        .into_iter()
        .map(|(key, tally)| tally.into_summary(key.map(str::to_owned)))
        .collect()
}

impl PresenceService {
    /// Per-status counts for `user_id` in the current calendar month.
    #[instrument(skip(self))]
    pub async fn monthly_summary(&self, user_id: u64) -> AppResult<MonthlySummary> {
        let today = self.clock.now().date();
        let (first, next) = month_bounds(today).ok_or_else(|| {
            AppError::Unexpected(format!("month after {today} is out of range"))
        })?;

        let counts = self.store.count_by_status(user_id, first, next).await?;

        Ok(MonthlySummary {
            user_id,
            year: first.year(),
            month: first.month(),
            attendance_summary: counts,
        })
    }

    /// Attendance rates per class or position over `[start_date, end_date]`.
    #[instrument(skip(self))]
    pub async fn analyze_presence(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        group_by: GroupBy,
    ) -> AppResult<PresenceAnalysis> {
        if end_date < start_date {
            return Err(AppError::InvalidInput(
                "end_date must not be before start_date".into(),
            ));
        }

        let rows = self.store.rows_between(start_date, end_date).await?;
        let grouped_analysis = summarize(&rows, group_by);
        let total_presence: StatusCounts = grouped_analysis.iter().map(|g| g.total_presence).sum();

        Ok(PresenceAnalysis {
            analysis_period: AnalysisPeriod {
                start_date,
                end_date,
            },
            group_by,
            grouped_analysis,
            total_presence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::actor::Actor;
    use crate::model::role::Role;
    use crate::service::test_support::{service, service_at};

    const EPS: f64 = 1e-9;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(user_id: u64, status: PresenceStatus, class: Option<&str>) -> AnalysisRow {
        AnalysisRow {
            user_id,
            status,
            class: class.map(str::to_owned),
            position: None,
        }
    }

    fn percentage_sum(g: &GroupSummary) -> f64 {
        g.present_percentage + g.excused_percentage + g.sick_percentage + g.absent_percentage
    }

    #[test]
    fn every_group_is_reported() {
        let rows = vec![
            row(1, PresenceStatus::Present, Some("B")),
            row(2, PresenceStatus::Sick, Some("A")),
            row(3, PresenceStatus::Excused, None),
            row(1, PresenceStatus::Absent, Some("B")),
        ];
        let groups = summarize(&rows, GroupBy::Class);

        let keys: Vec<_> = groups.iter().map(|g| g.group.as_deref()).collect();
        assert_eq!(keys, vec![None, Some("A"), Some("B")]);

        let b = &groups[2];
        assert_eq!(b.total_users, 1);
        assert_eq!(b.total_records, 2);
        assert!((b.attendance_rate - 50.0).abs() < EPS);
        assert!((b.absent_percentage - 50.0).abs() < EPS);
    }

    #[test]
    fn group_percentages_sum_to_one_hundred() {
        let statuses = [
            PresenceStatus::Present,
            PresenceStatus::Present,
            PresenceStatus::Sick,
            PresenceStatus::Excused,
            PresenceStatus::Absent,
            PresenceStatus::Present,
            PresenceStatus::Sick,
        ];
        // group "g<n>" holds the first n statuses
        let mut rows = Vec::new();
        for n in 1..=statuses.len() {
            for (i, status) in statuses[..n].iter().enumerate() {
                rows.push(AnalysisRow {
                    user_id: i as u64,
                    status: *status,
                    class: Some(format!("g{n}")),
                    position: None,
                });
            }
        }

        let groups = summarize(&rows, GroupBy::Class);
        assert_eq!(groups.len(), 7);
        for g in &groups {
            assert!(g.total_records > 0);
            assert!((percentage_sum(g) - 100.0).abs() < 1e-6, "{g:?}");
            for p in [g.present_percentage, g.excused_percentage, g.sick_percentage, g.absent_percentage] {
                assert!((0.0..=100.0).contains(&p));
            }
        }
    }

    #[test]
    fn month_bounds_span_one_calendar_month() {
        assert_eq!(
            month_bounds(date("2024-02-29")),
            Some((date("2024-02-01"), date("2024-03-01")))
        );
        assert_eq!(
            month_bounds(date("2024-12-31")),
            Some((date("2024-12-01"), date("2025-01-01")))
        );
        assert_eq!(month_bounds(NaiveDate::MAX), None);
    }

    #[test]
    fn empty_group_reports_zero_percentages() {
        let g = Tally::default().into_summary(Some("B".into()));
        assert_eq!(g.total_records, 0);
        assert_eq!(g.total_users, 0);
        assert_eq!(percentage_sum(&g), 0.0);
        assert_eq!(g.attendance_rate, 0.0);
    }

    #[test]
    fn grouping_by_position_uses_position() {
        let rows = vec![
            AnalysisRow {
                user_id: 1,
                status: PresenceStatus::Present,
                class: Some("A".into()),
                position: Some("leader".into()),
            },
            AnalysisRow {
                user_id: 2,
                status: PresenceStatus::Present,
                class: Some("A".into()),
                position: Some("member".into()),
            },
        ];
        let groups = summarize(&rows, GroupBy::Position);
        let keys: Vec<_> = groups.iter().map(|g| g.group.clone().unwrap()).collect();
        assert_eq!(keys, vec!["leader", "member"]);
    }

    #[actix_web::test]
    async fn june_analysis_by_class() {
        let (service, store) = service();
        // user 8 belongs to class A too; class B (user 7) records nothing
        store.add_user(8, Role::STUDENT_ID, Some("A"), None);
        let admin = Actor::new(1, Role::Admin);

        for (user, day, status) in [
            (5, "2024-06-01", PresenceStatus::Present),
            (5, "2024-06-02", PresenceStatus::Present),
            (6, "2024-06-01", PresenceStatus::Present),
            (8, "2024-06-01", PresenceStatus::Absent),
            // outside the period
            (7, "2024-07-01", PresenceStatus::Present),
        ] {
            service
                .record(&admin, Some(user), status, Some(date(day)))
                .await
                .unwrap();
        }

        let report = service
            .analyze_presence(date("2024-06-01"), date("2024-06-30"), GroupBy::Class)
            .await
            .unwrap();

        assert_eq!(report.grouped_analysis.len(), 1);
        let a = &report.grouped_analysis[0];
        assert_eq!(a.group.as_deref(), Some("A"));
        assert_eq!(a.total_users, 3);
        assert_eq!(a.total_records, 4);
        assert!((a.attendance_rate - 75.0).abs() < EPS);
        assert!((a.present_percentage - 75.0).abs() < EPS);
        assert!((a.absent_percentage - 25.0).abs() < EPS);
        assert_eq!(a.sick_percentage, 0.0);
        assert_eq!(a.excused_percentage, 0.0);

        // class B has no records in June and is left out
        assert!(report.grouped_analysis.iter().all(|g| g.group.as_deref() != Some("B")));
        assert_eq!(report.total_presence.present, 3);
        assert_eq!(report.total_presence.absent, 1);
        assert_eq!(report.analysis_period.end_date, date("2024-06-30"));
    }

    #[actix_web::test]
    async fn range_bounds_are_inclusive() {
        let (service, _) = service();
        let admin = Actor::new(1, Role::Admin);
        service
            .record(&admin, Some(5), PresenceStatus::Sick, Some(date("2024-06-01")))
            .await
            .unwrap();

        let report = service
            .analyze_presence(date("2024-06-01"), date("2024-06-01"), GroupBy::Class)
            .await
            .unwrap();
        assert_eq!(report.total_presence.sick, 1);
    }

    #[actix_web::test]
    async fn reversed_range_is_invalid() {
        let (service, _) = service();
        let result = service
            .analyze_presence(date("2024-06-30"), date("2024-06-01"), GroupBy::Class)
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[actix_web::test]
    async fn monthly_summary_counts_current_month_only() {
        let (service, _) = service_at("2024-06-29", "09:00:00");
        let admin = Actor::new(1, Role::Admin);
        for (day, status) in [
            ("2024-06-29", PresenceStatus::Present),
            ("2024-06-30", PresenceStatus::Sick),
            ("2024-07-01", PresenceStatus::Present),
        ] {
            service
                .record(&admin, Some(5), status, Some(date(day)))
                .await
                .unwrap();
        }

        let summary = service.monthly_summary(5).await.unwrap();
        assert_eq!((summary.year, summary.month), (2024, 6));
        assert_eq!(summary.attendance_summary.present, 1);
        assert_eq!(summary.attendance_summary.sick, 1);
        assert_eq!(summary.attendance_summary.total(), 2);
    }

    #[actix_web::test]
    async fn monthly_summary_without_records_is_all_zero() {
        let (service, _) = service_at("2024-12-15", "09:00:00");
        let summary = service.monthly_summary(6).await.unwrap();
        assert_eq!((summary.year, summary.month), (2024, 12));
        assert_eq!(summary.attendance_summary, StatusCounts::default());
    }
}
