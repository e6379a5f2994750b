//! Revenue reports for admins and instructors.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::database::models::{CourseRevenue, InstructorCourseRevenue, RevenuePoint, RevenueSummary, TagRevenue};
use crate::database::repositories::RevenueRepository;

use super::{ServiceError, ServiceResult};

/// Window used when the caller gives no `from`
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Inclusive reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A bare `to`
    /// date covers that whole day. Missing bounds default to the last
    /// thirty days ending at `now`.
    pub fn resolve(from: Option<&str>, to: Option<&str>, now: DateTime<Utc>) -> ServiceResult<Self> {
        let to = match non_blank(to) {
            Some(raw) => parse_bound(raw, "to", true)?,
            None => now,
        };
        let from = match non_blank(from) {
            Some(raw) => parse_bound(raw, "from", false)?,
            None => to - Duration::days(DEFAULT_WINDOW_DAYS),
        };
        if from > to {
            return Err(ServiceError::validation("from", "must not be after to"));
        }
        Ok(Self { from, to })
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|r| !r.is_empty())
}

fn parse_bound(raw: &str, field: &'static str, end_of_day: bool) -> ServiceResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServiceError::validation(field, "must be a YYYY-MM-DD date or an RFC 3339 timestamp"))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        Some(NaiveTime::MIN)
    };
    let time = time.ok_or_else(|| ServiceError::validation(field, "is out of range"))?;
    Ok(date.and_time(time).and_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Day,
    Month,
}

impl GroupBy {
    pub fn parse(raw: Option<&str>) -> ServiceResult<Self> {
        match non_blank(raw).map(str::to_lowercase).as_deref() {
            None | Some("day") => Ok(GroupBy::Day),
            Some("month") => Ok(GroupBy::Month),
            Some(_) => Err(ServiceError::validation("groupBy", "must be day or month")),
        }
    }

    /// `date_trunc` unit and the label format of each bucket
    fn sql_parts(self) -> (&'static str, &'static str) {
        match self {
            GroupBy::Day => ("day", "YYYY-MM-DD"),
            GroupBy::Month => ("month", "YYYY-MM"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    #[serde(flatten)]
    pub summary: RevenueSummary,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeReport<T: Serialize> {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub data: Vec<T>,
}

impl<T: Serialize> RangeReport<T> {
    fn new(range: DateRange, data: Vec<T>) -> Self {
        Self {
            from: range.from,
            to: range.to,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorRevenue {
    pub total_revenue: i64,
    pub total_students: i64,
    pub courses: Vec<InstructorCourseRevenue>,
}

impl From<Vec<InstructorCourseRevenue>> for InstructorRevenue {
    fn from(courses: Vec<InstructorCourseRevenue>) -> Self {
        Self {
            total_revenue: courses.iter().map(|c| c.revenue).sum(),
            total_students: courses.iter().map(|c| c.students).sum(),
            courses,
        }
    }
}

pub struct RevenueService {
    repo: RevenueRepository,
}

impl RevenueService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: RevenueRepository::new(pool),
        }
    }

    pub async fn summary(&self, range: DateRange) -> ServiceResult<SummaryReport> {
        let summary = self.repo.summary(range.from, range.to).await?;
        Ok(SummaryReport {
            summary,
            from: range.from,
            to: range.to,
        })
    }

    pub async fn by_date(&self, range: DateRange, group_by: GroupBy) -> ServiceResult<RangeReport<RevenuePoint>> {
        let (unit, label) = group_by.sql_parts();
        let points = self.repo.by_date(range.from, range.to, unit, label).await?;
        Ok(RangeReport::new(range, points))
    }

    pub async fn by_course(&self, range: DateRange) -> ServiceResult<RangeReport<CourseRevenue>> {
        Ok(RangeReport::new(range, self.repo.by_course(range.from, range.to).await?))
    }

    pub async fn by_tag(&self, range: DateRange) -> ServiceResult<RangeReport<TagRevenue>> {
        Ok(RangeReport::new(range, self.repo.by_tag(range.from, range.to).await?))
    }

    /// Totals are summed over the instructor's course rows
    pub async fn instructor(&self, instructor_id: i64, range: DateRange) -> ServiceResult<InstructorRevenue> {
        let courses = self.repo.instructor_courses(instructor_id, range.from, range.to).await?;
        Ok(courses.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn missing_bounds_cover_the_last_thirty_days() {
        let range = DateRange::resolve(None, Some("  "), now()).unwrap();
        assert_eq!(range.to, now());
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn plain_dates_span_whole_days() {
        let range = DateRange::resolve(Some("2025-01-01"), Some("2025-01-31"), now()).unwrap();
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(range.to.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert!(range.to > Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn rfc3339_bounds_are_converted_to_utc() {
        let range = DateRange::resolve(Some("2025-02-01T07:00:00+07:00"), None, now()).unwrap();
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn inverted_or_garbled_ranges_are_rejected() {
        assert!(matches!(
            DateRange::resolve(Some("2025-02-01"), Some("2025-01-01"), now()),
            Err(ServiceError::Validation { field: "from", .. })
        ));
        assert!(matches!(
            DateRange::resolve(Some("yesterday"), None, now()),
            Err(ServiceError::Validation { field: "from", .. })
        ));
    }

    #[test]
    fn group_by_accepts_day_and_month() {
        assert_eq!(GroupBy::parse(None).unwrap(), GroupBy::Day);
        assert_eq!(GroupBy::parse(Some("Month")).unwrap(), GroupBy::Month);
        assert_eq!(GroupBy::Month.sql_parts(), ("month", "YYYY-MM"));
        assert!(GroupBy::parse(Some("week")).is_err());
    }

    #[test]
    fn instructor_totals_sum_course_rows() {
        let report = InstructorRevenue::from(vec![
            InstructorCourseRevenue {
                course_id: 1,
                title: "Rust".to_string(),
                revenue: 500_000,
                students: 2,
            },
            InstructorCourseRevenue {
                course_id: 2,
                title: "Go".to_string(),
                revenue: 250_000,
                students: 1,
            },
        ]);
        assert_eq!(report.total_revenue, 750_000);
        assert_eq!(report.total_students, 3);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["courses"][0]["courseId"], 1);
        assert_eq!(json["totalRevenue"], 750_000);
    }
}
