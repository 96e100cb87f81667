//! Region directory service.

use regfeed_common::{AppError, AppResult, IdGenerator, Page, PageMeta};
use regfeed_db::entities::region;
use regfeed_db::repositories::{AdminRepository, RatingRepository, RegionRepository};
use sea_orm::Set;
use serde::Serialize;

use crate::identity::RequestAdmin;
use crate::scope::RegionScope;
use crate::services::rating::StarCounts;

/// Star counts with total and average for one region.
#[derive(Debug, Clone, Serialize)]
pub struct StarBreakdown {
    /// Counts at each star value.
    #[serde(flatten)]
    pub counts: StarCounts,
    /// Total ratings.
    pub total: u64,
    /// Average rating rounded to 2 decimals; 0 when there are no ratings.
    pub average: f64,
}

/// A region enriched with its rating breakdown and assigned-admin count.
#[derive(Debug, Clone)]
pub struct RegionDetail {
    /// The region record.
    pub region: region::Model,
    /// Non-super admins assigned to this region.
    pub admin_count: u64,
    /// Star breakdown over all ratings of this region.
    pub rating: StarBreakdown,
}

/// Service for the canonical region directory.
#[derive(Clone)]
pub struct RegionService {
    region_repo: RegionRepository,
    rating_repo: RatingRepository,
    admin_repo: AdminRepository,
    id_gen: IdGenerator,
}

impl RegionService {
    /// Create a new region service.
    #[must_use]
    pub const fn new(
        region_repo: RegionRepository,
        rating_repo: RatingRepository,
        admin_repo: AdminRepository,
    ) -> Self {
        Self {
            region_repo,
            rating_repo,
            admin_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a region; names are unique.
    pub async fn create(&self, name: &str) -> AppResult<region::Model> {
        if self.region_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict("Region already exists".to_string()));
        }

        let model = region::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        self.region_repo.create(model).await
    }

    /// List regions, restricted to the caller's scope when the caller is a
    /// non-super admin. Anonymous callers see everything.
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        caller: Option<&RequestAdmin>,
    ) -> AppResult<Page<region::Model>> {
        let scope = caller.map_or(RegionScope::Unrestricted, |c| {
            RegionScope::resolve(c.role, &c.allowed_regions, None)
        });

        if scope.is_empty() {
            return Ok(Page::empty(page, limit));
        }

        let region_ids = scope.region_ids();
        let total = self.region_repo.count(region_ids.as_deref()).await?;
        let data = self
            .region_repo
            .find_page(region_ids.as_deref(), page, limit)
            .await?;

        Ok(Page {
            meta: PageMeta::new(total, page, limit),
            data,
        })
    }

    /// Fetch one region with its rating breakdown and admin count.
    ///
    /// Admin callers may only see regions in their assigned set.
    pub async fn get(&self, id: &str, caller: Option<&RequestAdmin>) -> AppResult<RegionDetail> {
        let region = self
            .region_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Region not found".to_string()))?;

        if let Some(caller) = caller {
            let scope = RegionScope::resolve(caller.role, &caller.allowed_regions, None);
            if !scope.allows(&region.id) {
                return Err(AppError::OutOfScope);
            }
        }

        let values = self.rating_repo.star_values_for_region(id).await?;
        let admin_count = self.admin_repo.count_assigned_to_region(id).await?;

        Ok(RegionDetail {
            region,
            admin_count,
            rating: build_breakdown(&values),
        })
    }

    /// Rename a region.
    pub async fn update(&self, id: &str, name: &str) -> AppResult<region::Model> {
        let region = self
            .region_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Region not found".to_string()))?;

        let mut active: region::ActiveModel = region.into();
        active.name = Set(name.to_string());
        active.updated_at = Set(Some(chrono::Utc::now()));

        self.region_repo.update(active).await
    }

    /// Delete a region.
    ///
    /// Does not cascade: ratings, feedbacks and admin assignments keep
    /// their now-dangling region ids, which readers tolerate.
    pub async fn remove(&self, id: &str) -> AppResult<()> {
        if !self.region_repo.exists(id).await? {
            return Err(AppError::NotFound("Region not found".to_string()));
        }

        self.region_repo.delete(id).await
    }
}

fn build_breakdown(values: &[i32]) -> StarBreakdown {
    let mut counts = StarCounts::default();
    let mut sum: i64 = 0;

    for &value in values {
        counts.add(value);
        if (1..=5).contains(&value) {
            sum += i64::from(value);
        }
    }

    let total = counts.total();
    let average = if total == 0 {
        0.0
    } else {
        (sum as f64 / total as f64 * 100.0).round() / 100.0
    };

    StarBreakdown {
        counts,
        total,
        average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regfeed_db::entities::admin::AdminRole;
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

    fn admin_caller(allowed: &[&str]) -> RequestAdmin {
        RequestAdmin {
            id: "adm1".to_string(),
            email: "admin@example.com".to_string(),
            role: AdminRole::Admin,
            fullname: "Admin".to_string(),
            allowed_regions: allowed.iter().map(ToString::to_string).collect(),
        }
    }

    fn service_with_db(db: sea_orm::DatabaseConnection) -> RegionService {
        let db = Arc::new(db);
        RegionService::new(
            RegionRepository::new(Arc::clone(&db)),
            RatingRepository::new(Arc::clone(&db)),
            AdminRepository::new(db),
        )
    }

    #[test]
    fn test_breakdown_math() {
        let breakdown = build_breakdown(&[1, 1, 2, 5, 5, 5]);

        assert_eq!(breakdown.counts.at(1), 2);
        assert_eq!(breakdown.counts.at(5), 3);
        assert_eq!(breakdown.total, 6);
        assert_eq!(breakdown.average, 3.17);
    }

    #[test]
    fn test_breakdown_empty_is_zeroed() {
        let breakdown = build_breakdown(&[]);

        assert_eq!(breakdown.total, 0);
        assert_eq!(breakdown.average, 0.0);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_region("reg1", "Tashkent")]])
            .into_connection();
        let service = service_with_db(db);

        let err = service.create("Tashkent").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_empty_scope_short_circuits() {
        let service =
            service_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let page = service.list(1, 10, Some(&admin_caller(&[]))).await.unwrap();

        assert_eq!(page.meta.total, 0);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_get_out_of_scope_is_denied() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_region("reg2", "Bukhara")]])
            .into_connection();
        let service = service_with_db(db);

        let err = service
            .get("reg2", Some(&admin_caller(&["reg1"])))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::OutOfScope));
    }

    #[tokio::test]
    async fn test_remove_missing_region_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<region::Model>::new()])
            .into_connection();
        let service = service_with_db(db);

        let err = service.remove("gone").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
