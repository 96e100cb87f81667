//! Rating service and statistics aggregator.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use regfeed_common::{AppError, AppResult, IdGenerator, Page, PageMeta};
use regfeed_db::entities::{rating, region};
use regfeed_db::repositories::{RatingRepository, RatingSortField, RegionRepository};
use sea_orm::{Order, Set};
use serde::{Deserialize, Serialize};

use crate::identity::RequestAdmin;
use crate::region_ref::{RegionRef, index_regions};
use crate::scope::RegionScope;
use crate::services::log::{LogService, actions};

/// Input for a public rating submission.
#[derive(Debug, Clone)]
pub struct CreateRatingInput {
    /// Target region id.
    pub region_id: String,
    /// Star value, validated to 1..=5 at the API boundary.
    pub rating: i32,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Query for admin rating listings.
#[derive(Debug, Clone)]
pub struct RatingListQuery {
    /// Page number (1-based).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Optional explicit region filter.
    pub region: Option<String>,
    /// Sort expression `field:direction` over `submittedAt` or `rating`.
    pub sort: Option<String>,
}

/// A rating together with its resolved region reference.
#[derive(Debug, Clone)]
pub struct RatingRecord {
    /// The rating row.
    pub rating: rating::Model,
    /// Resolved region reference (may be dangling).
    pub region: RegionRef,
}

/// Aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    /// The current day.
    Day,
    /// 7-day inclusive window ending today.
    #[default]
    Week,
    /// From the first of the current month.
    Month,
    /// From January 1 of the current year.
    Year,
}

impl StatsPeriod {
    /// Wire name of the period.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Query for rating statistics.
#[derive(Debug, Clone, Default)]
pub struct RatingStatsQuery {
    /// Aggregation period; defaults to a week.
    pub period: StatsPeriod,
    /// Optional single-region restriction.
    pub region: Option<String>,
    /// Explicit range start (`YYYY-MM-DD` or RFC 3339); overrides the
    /// period-derived start.
    pub start_date: Option<String>,
    /// Explicit range end; overrides `now`.
    pub end_date: Option<String>,
}

/// Counts of ratings at each star value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StarCounts {
    #[serde(rename = "1")]
    one: u64,
    #[serde(rename = "2")]
    two: u64,
    #[serde(rename = "3")]
    three: u64,
    #[serde(rename = "4")]
    four: u64,
    #[serde(rename = "5")]
    five: u64,
}

impl StarCounts {
    /// Count one star value; values outside 1..=5 are ignored.
    pub fn add(&mut self, value: i32) {
        match value {
            1 => self.one += 1,
            2 => self.two += 1,
            3 => self.three += 1,
            4 => self.four += 1,
            5 => self.five += 1,
            _ => {}
        }
    }

    /// Total counted ratings.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.one + self.two + self.three + self.four + self.five
    }

    /// Count at a specific star value (1..=5); 0 for anything else.
    #[must_use]
    pub const fn at(&self, value: i32) -> u64 {
        match value {
            1 => self.one,
            2 => self.two,
            3 => self.three,
            4 => self.four,
            5 => self.five,
            _ => 0,
        }
    }
}

/// Per-region star-value distribution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDistribution {
    /// Region id.
    pub region_id: String,
    /// Region name.
    pub region_name: String,
    /// Counts at each star value, zero-filled.
    pub counts: StarCounts,
    /// Total ratings in range for this region.
    pub total: u64,
}

/// One time-bucketed trend point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Calendar-day bucket, `YYYY-MM-DD`.
    pub date: String,
    /// Average rating in the bucket, rounded to 2 decimals.
    pub average: f64,
    /// Number of ratings in the bucket.
    pub count: u64,
}

/// Per-region chronological trend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTrend {
    /// Region id.
    pub region_id: String,
    /// Region name.
    pub region_name: String,
    /// Points ordered by ascending date bucket.
    pub points: Vec<TrendPoint>,
}

/// The full statistics payload.
#[derive(Debug, Clone, Serialize)]
pub struct RatingStats {
    /// The period the range was derived from.
    pub period: &'static str,
    /// The resolved closed date range.
    pub range: StatsRange,
    /// Distribution per in-scope region, in region-list order.
    pub distribution: Vec<RegionDistribution>,
    /// Trend per in-scope region, in region-list order.
    pub trend: Vec<RegionTrend>,
}

/// Resolved date range of a statistics query.
#[derive(Debug, Clone, Serialize)]
pub struct StatsRange {
    /// Range start (inclusive).
    pub start: DateTime<Utc>,
    /// Range end (inclusive).
    pub end: DateTime<Utc>,
}

/// Service for ratings and their aggregation.
#[derive(Clone)]
pub struct RatingService {
    rating_repo: RatingRepository,
    region_repo: RegionRepository,
    log_service: LogService,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(
        rating_repo: RatingRepository,
        region_repo: RegionRepository,
        log_service: LogService,
    ) -> Self {
        Self {
            rating_repo,
            region_repo,
            log_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new rating (public). The region must exist at creation
    /// time; no referential integrity is enforced afterwards.
    pub async fn create(&self, input: CreateRatingInput) -> AppResult<rating::Model> {
        if !self.region_repo.exists(&input.region_id).await? {
            return Err(AppError::NotFound("Region not found".to_string()));
        }

        let now = Utc::now();
        let model = rating::ActiveModel {
            id: Set(self.id_gen.generate()),
            region_id: Set(input.region_id),
            rating: Set(input.rating),
            comment: Set(input.comment),
            submitted_at: Set(now),
            created_at: Set(Some(now)),
        };

        let created = self.rating_repo.create(model).await?;

        self.log_service
            .record(actions::CREATE_RATING, Some(&created.id))
            .await;

        Ok(created)
    }

    /// List ratings visible to the caller.
    pub async fn list(
        &self,
        query: &RatingListQuery,
        caller: &RequestAdmin,
    ) -> AppResult<Page<RatingRecord>> {
        let scope = RegionScope::resolve(
            caller.role,
            &caller.allowed_regions,
            query.region.as_deref(),
        );

        if scope.is_empty() {
            return Ok(Page::empty(query.page, query.limit));
        }

        let (sort, order) = parse_sort(query.sort.as_deref())?;
        let region_ids = scope.region_ids();

        let total = self.rating_repo.count(region_ids.as_deref()).await?;
        let rows = self
            .rating_repo
            .find_page(region_ids.as_deref(), sort, order, query.page, query.limit)
            .await?;

        let data = self.resolve_regions(rows).await?;

        Ok(Page {
            meta: PageMeta::new(total, query.page, query.limit),
            data,
        })
    }

    /// Fetch one rating, enforcing the caller's scope after the fetch.
    pub async fn get(&self, id: &str, caller: &RequestAdmin) -> AppResult<RatingRecord> {
        let rating = self
            .rating_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rating not found".to_string()))?;

        let scope = RegionScope::resolve(caller.role, &caller.allowed_regions, None);
        if !scope.allows(&rating.region_id) {
            return Err(AppError::OutOfScope);
        }

        let regions = self.region_repo.find_by_ids(&[rating.region_id.clone()]).await?;
        let region = RegionRef::lookup(&rating.region_id, &index_regions(regions));

        Ok(RatingRecord { rating, region })
    }

    /// Compute distribution and trend statistics over the caller's scope.
    ///
    /// An empty scope (including an out-of-scope explicit region filter)
    /// yields an empty-but-successful result; region-scoped emptiness is a
    /// valid, common state.
    pub async fn stats(
        &self,
        query: &RatingStatsQuery,
        caller: &RequestAdmin,
    ) -> AppResult<RatingStats> {
        let (start, end) = resolve_range(
            query.period,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Utc::now(),
        )?;

        let empty = |start, end| RatingStats {
            period: query.period.as_str(),
            range: StatsRange { start, end },
            distribution: Vec::new(),
            trend: Vec::new(),
        };

        let scope = RegionScope::resolve(
            caller.role,
            &caller.allowed_regions,
            query.region.as_deref(),
        );

        if scope.is_empty() {
            return Ok(empty(start, end));
        }

        let region_ids = scope.region_ids();
        let regions = self.region_repo.find_all_scoped(region_ids.as_deref()).await?;

        if regions.is_empty() {
            return Ok(empty(start, end));
        }

        let rows = self
            .rating_repo
            .find_in_range(region_ids.as_deref(), start, end)
            .await?;

        Ok(RatingStats {
            period: query.period.as_str(),
            range: StatsRange { start, end },
            distribution: build_distribution(&regions, &rows),
            trend: build_trend(&regions, &rows),
        })
    }

    async fn resolve_regions(&self, rows: Vec<rating::Model>) -> AppResult<Vec<RatingRecord>> {
        let mut ids: Vec<String> = rows.iter().map(|r| r.region_id.clone()).collect();
        ids.sort_unstable();
        ids.dedup();

        let regions = index_regions(self.region_repo.find_by_ids(&ids).await?);

        Ok(rows
            .into_iter()
            .map(|rating| {
                let region = RegionRef::lookup(&rating.region_id, &regions);
                RatingRecord { rating, region }
            })
            .collect())
    }
}

fn parse_sort(sort: Option<&str>) -> AppResult<(RatingSortField, Order)> {
    let Some(sort) = sort else {
        return Ok((RatingSortField::SubmittedAt, Order::Desc));
    };

    let (field, direction) = sort.split_once(':').unwrap_or((sort, "desc"));

    let field = match field {
        "submittedAt" => RatingSortField::SubmittedAt,
        "rating" => RatingSortField::Rating,
        _ => return Err(AppError::Validation("Invalid sort field".to_string())),
    };

    let order = if direction == "asc" { Order::Asc } else { Order::Desc };

    Ok((field, order))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map_or_else(|| start_of_day(date), |t| t.and_utc())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Resolve the closed `[start, end]` range of a statistics query.
///
/// Explicit dates override the period-derived range; `end` defaults to
/// `now`. `start` is normalized to the start of its day, `end` to
/// 23:59:59.999.
fn resolve_range(
    period: StatsPeriod,
    start_date: Option<&str>,
    end_date: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let end_day = match end_date {
        Some(raw) => {
            parse_date(raw).ok_or_else(|| AppError::Validation("Invalid end date".to_string()))?
        }
        None => now.date_naive(),
    };
    let end = end_of_day(end_day);

    let start_day = match start_date {
        Some(raw) => {
            parse_date(raw).ok_or_else(|| AppError::Validation("Invalid start date".to_string()))?
        }
        None => match period {
            StatsPeriod::Day => end_day,
            StatsPeriod::Week => end_day - Duration::days(6),
            StatsPeriod::Month => NaiveDate::from_ymd_opt(end_day.year(), end_day.month(), 1)
                .unwrap_or(end_day),
            StatsPeriod::Year => {
                NaiveDate::from_ymd_opt(end_day.year(), 1, 1).unwrap_or(end_day)
            }
        },
    };
    let start = start_of_day(start_day);

    if start > end {
        return Err(AppError::Validation("Invalid date range".to_string()));
    }

    Ok((start, end))
}

/// Group in-range ratings into per-region star distributions.
///
/// Output follows the given region list order; regions with no ratings
/// appear with zero-filled counts.
fn build_distribution(
    regions: &[region::Model],
    rows: &[rating::Model],
) -> Vec<RegionDistribution> {
    regions
        .iter()
        .map(|region| {
            let mut counts = StarCounts::default();
            for row in rows.iter().filter(|r| r.region_id == region.id) {
                counts.add(row.rating);
            }

            RegionDistribution {
                region_id: region.id.clone(),
                region_name: region.name.clone(),
                total: counts.total(),
                counts,
            }
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group in-range ratings into per-region daily trends.
///
/// Buckets are calendar-day strings of the effective timestamp; the
/// zero-padded format makes lexicographic order chronological.
fn build_trend(regions: &[region::Model], rows: &[rating::Model]) -> Vec<RegionTrend> {
    regions
        .iter()
        .map(|region| {
            let mut buckets: BTreeMap<String, (i64, u64)> = BTreeMap::new();

            for row in rows.iter().filter(|r| r.region_id == region.id) {
                let date = row.effective_time().format("%Y-%m-%d").to_string();
                let bucket = buckets.entry(date).or_insert((0, 0));
                bucket.0 += i64::from(row.rating);
                bucket.1 += 1;
            }

            let points = buckets
                .into_iter()
                .map(|(date, (sum, count))| TrendPoint {
                    date,
                    average: round2(sum as f64 / count as f64),
                    count,
                })
                .collect();

            RegionTrend {
                region_id: region.id.clone(),
                region_name: region.name.clone(),
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regfeed_db::entities::admin::AdminRole;
    use regfeed_db::repositories::LogRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_region(id: &str, name: &str) -> region::Model {
        region::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn test_rating(region_id: &str, stars: i32, at: DateTime<Utc>) -> rating::Model {
        rating::Model {
            id: format!("rat-{stars}-{}", at.timestamp_nanos_opt().unwrap_or(0)),
            region_id: region_id.to_string(),
            rating: stars,
            comment: None,
            submitted_at: at,
            created_at: Some(at),
        }
    }

    fn admin_caller(allowed: &[&str]) -> RequestAdmin {
        RequestAdmin {
            id: "adm1".to_string(),
            email: "admin@example.com".to_string(),
            role: AdminRole::Admin,
            fullname: "Admin".to_string(),
            allowed_regions: allowed.iter().map(ToString::to_string).collect(),
        }
    }

    fn service_with_db(db: sea_orm::DatabaseConnection) -> RatingService {
        let db = Arc::new(db);
        RatingService::new(
            RatingRepository::new(Arc::clone(&db)),
            RegionRepository::new(Arc::clone(&db)),
            LogService::new(LogRepository::new(db)),
        )
    }

    #[test]
    fn test_distribution_counts_and_total() {
        let regions = vec![test_region("reg1", "Tashkent")];
        let at = Utc.with_ymd_and_hms(2026, 8, 3, 10, 0, 0).unwrap();
        let rows: Vec<rating::Model> = [1, 1, 2, 5, 5, 5]
            .iter()
            .map(|&stars| test_rating("reg1", stars, at))
            .collect();

        let distribution = build_distribution(&regions, &rows);

        assert_eq!(distribution.len(), 1);
        let d = &distribution[0];
        assert_eq!(d.counts.at(1), 2);
        assert_eq!(d.counts.at(2), 1);
        assert_eq!(d.counts.at(3), 0);
        assert_eq!(d.counts.at(4), 0);
        assert_eq!(d.counts.at(5), 3);
        assert_eq!(d.total, 6);
    }

    #[test]
    fn test_trend_single_bucket_average() {
        let regions = vec![test_region("reg1", "Tashkent")];
        let at = Utc.with_ymd_and_hms(2026, 8, 3, 10, 0, 0).unwrap();
        let rows: Vec<rating::Model> = [1, 1, 2, 5, 5, 5]
            .iter()
            .map(|&stars| test_rating("reg1", stars, at))
            .collect();

        let trend = build_trend(&regions, &rows);

        assert_eq!(trend.len(), 1);
        assert_eq!(
            trend[0].points,
            vec![TrendPoint {
                date: "2026-08-03".to_string(),
                average: 3.17,
                count: 6,
            }]
        );
    }

    #[test]
    fn test_trend_buckets_sorted_ascending() {
        let regions = vec![test_region("reg1", "Tashkent")];
        let rows = vec![
            test_rating("reg1", 4, Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap()),
            test_rating("reg1", 2, Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap()),
            test_rating("reg1", 3, Utc.with_ymd_and_hms(2026, 8, 4, 9, 0, 0).unwrap()),
        ];

        let trend = build_trend(&regions, &rows);
        let dates: Vec<&str> = trend[0].points.iter().map(|p| p.date.as_str()).collect();

        assert_eq!(dates, vec!["2026-08-03", "2026-08-04", "2026-08-05"]);
    }

    #[test]
    fn test_zero_rating_regions_still_appear() {
        let regions = vec![test_region("reg1", "Andijan"), test_region("reg2", "Bukhara")];
        let at = Utc.with_ymd_and_hms(2026, 8, 3, 10, 0, 0).unwrap();
        let rows = vec![test_rating("reg2", 5, at)];

        let distribution = build_distribution(&regions, &rows);
        let trend = build_trend(&regions, &rows);

        // Output follows region list order, zero-filled for reg1.
        assert_eq!(distribution[0].region_id, "reg1");
        assert_eq!(distribution[0].total, 0);
        assert_eq!(distribution[1].total, 1);
        assert!(trend[0].points.is_empty());
        assert_eq!(trend[1].points.len(), 1);
    }

    #[test]
    fn test_bucketing_uses_effective_time_fallback() {
        let regions = vec![test_region("reg1", "Tashkent")];
        let submitted = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
        let mut row = test_rating("reg1", 3, submitted);
        row.created_at = None;

        let trend = build_trend(&regions, &[row]);

        assert_eq!(trend[0].points[0].date, "2026-07-01");
    }

    #[test]
    fn test_resolve_range_week_is_seven_day_inclusive_window() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 30, 0).unwrap();
        let (start, end) = resolve_range(StatsPeriod::Week, None, None, now).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2026, 8, 7, 23, 59, 59).unwrap()
                + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_resolve_range_day_month_year() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();

        let (start, _) = resolve_range(StatsPeriod::Day, None, None, now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap());

        let (start, _) = resolve_range(StatsPeriod::Month, None, None, now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());

        let (start, _) = resolve_range(StatsPeriod::Year, None, None, now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_range_explicit_dates_override_period() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let (start, end) = resolve_range(
            StatsPeriod::Week,
            Some("2026-01-10"),
            Some("2026-02-20"),
            now,
        )
        .unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
    }

    #[test]
    fn test_resolve_range_rejects_inverted_and_malformed() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();

        assert!(
            resolve_range(StatsPeriod::Week, Some("2026-03-01"), Some("2026-02-01"), now).is_err()
        );
        assert!(resolve_range(StatsPeriod::Week, Some("soon"), None, now).is_err());
        assert!(resolve_range(StatsPeriod::Week, None, Some("later"), now).is_err());
    }

    #[test]
    fn test_parse_sort_policy() {
        assert_eq!(
            parse_sort(None).unwrap(),
            (RatingSortField::SubmittedAt, Order::Desc)
        );
        assert_eq!(
            parse_sort(Some("rating:asc")).unwrap(),
            (RatingSortField::Rating, Order::Asc)
        );
        assert_eq!(
            parse_sort(Some("submittedAt:desc")).unwrap(),
            (RatingSortField::SubmittedAt, Order::Desc)
        );
        // Unrecognized fields fail validation rather than silently
        // falling back.
        assert!(parse_sort(Some("comment:asc")).is_err());
    }

    #[tokio::test]
    async fn test_list_empty_scope_short_circuits() {
        // No query results appended: any storage access would fail.
        let service =
            service_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let query = RatingListQuery {
            page: 1,
            limit: 10,
            region: None,
            sort: None,
        };
        let page = service.list(&query, &admin_caller(&[])).await.unwrap();

        assert_eq!(page.meta.total, 0);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_stats_out_of_scope_region_is_empty_success() {
        let service =
            service_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let query = RatingStatsQuery {
            region: Some("reg9".to_string()),
            ..Default::default()
        };
        let stats = service.stats(&query, &admin_caller(&["reg1"])).await.unwrap();

        assert!(stats.distribution.is_empty());
        assert!(stats.trend.is_empty());
    }

    #[tokio::test]
    async fn test_get_out_of_scope_is_denied() {
        let at = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_rating("reg2", 4, at)]])
            .into_connection();
        let service = service_with_db(db);

        let err = service
            .get("rat1", &admin_caller(&["reg1"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::OutOfScope));
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_fields() {
        let at = Utc::now();
        let created = rating::Model {
            id: "rat1".to_string(),
            region_id: "reg1".to_string(),
            rating: 5,
            comment: Some("great".to_string()),
            submitted_at: at,
            created_at: Some(at),
        };
        let region = region::Model {
            id: "reg1".to_string(),
            name: "Tashkent".to_string(),
            created_at: at,
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // region existence check
            .append_query_results([[region.clone()]])
            // insert returning the created row
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[created.clone()]])
            // audit log append
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .append_query_results([[regfeed_db::entities::log_entry::Model {
                id: 1,
                action: "CREATE_RATING".to_string(),
                user_id: Some("rat1".to_string()),
                timestamp: at,
            }]])
            .into_connection();
        let service = service_with_db(db);

        let submitted = service
            .create(CreateRatingInput {
                region_id: "reg1".to_string(),
                rating: 5,
                comment: Some("great".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(submitted.rating, 5);
        assert_eq!(submitted.comment.as_deref(), Some("great"));
        assert_eq!(submitted.region_id, "reg1");

        // Fetching it back yields the same fields with the region resolved.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[created]])
            .append_query_results([[region]])
            .into_connection();
        let service = service_with_db(db);

        let record = service
            .get("rat1", &admin_caller(&["reg1"]))
            .await
            .unwrap();

        assert_eq!(record.rating.rating, 5);
        assert_eq!(record.rating.comment.as_deref(), Some("great"));
        assert_eq!(record.region.id(), "reg1");
        assert_eq!(record.region.name(), Some("Tashkent"));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_region() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<region::Model>::new()])
            .into_connection();
        let service = service_with_db(db);

        let err = service
            .create(CreateRatingInput {
                region_id: "gone".to_string(),
                rating: 5,
                comment: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
