//! Rating repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use regfeed_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{Rating, rating};

/// Sortable fields of rating listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSortField {
    /// Sort by submission time.
    SubmittedAt,
    /// Sort by star value.
    Rating,
}

impl RatingSortField {
    const fn column(self) -> rating::Column {
        match self {
            Self::SubmittedAt => rating::Column::SubmittedAt,
            Self::Rating => rating::Column::Rating,
        }
    }
}

/// The effective timestamp of a rating row: creation time, falling back to
/// the explicit submission time when the creation time is absent.
fn effective_time_expr() -> Expr {
    Expr::expr(Func::coalesce([
        Expr::col(rating::Column::CreatedAt).into(),
        Expr::col(rating::Column::SubmittedAt).into(),
    ]))
}

/// Repository for rating operations.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new rating.
    pub async fn create(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find rating by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<rating::Model>> {
        Rating::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find one page of ratings, optionally restricted to a region set.
    pub async fn find_page(
        &self,
        region_ids: Option<&[String]>,
        sort: RatingSortField,
        order: Order,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<rating::Model>> {
        let mut query = Rating::find();

        if let Some(ids) = region_ids {
            query = query.filter(rating::Column::RegionId.is_in(ids.iter().cloned()));
        }

        query
            .order_by(sort.column(), order)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count ratings, optionally restricted to a region set.
    pub async fn count(&self, region_ids: Option<&[String]>) -> AppResult<u64> {
        let mut query = Rating::find();

        if let Some(ids) = region_ids {
            query = query.filter(rating::Column::RegionId.is_in(ids.iter().cloned()));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ratings whose effective timestamp falls within `[start, end]`,
    /// optionally restricted to a region set. Feeds the aggregator.
    pub async fn find_in_range(
        &self,
        region_ids: Option<&[String]>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<rating::Model>> {
        let mut query = Rating::find().filter(effective_time_expr().between(start, end));

        if let Some(ids) = region_ids {
            query = query.filter(rating::Column::RegionId.is_in(ids.iter().cloned()));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All star values submitted for one region.
    pub async fn star_values_for_region(&self, region_id: &str) -> AppResult<Vec<i32>> {
        Rating::find()
            .select_only()
            .column(rating::Column::Rating)
            .filter(rating::Column::RegionId.eq(region_id))
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_rating(id: &str, region_id: &str, stars: i32) -> rating::Model {
        rating::Model {
            id: id.to_string(),
            region_id: region_id.to_string(),
            rating: stars,
            comment: None,
            submitted_at: Utc::now(),
            created_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_returns_rating() {
        let rating = create_test_rating("rat1", "reg1", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating.clone()]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let result = repo.find_by_id("rat1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().rating, 5);
    }

    #[tokio::test]
    async fn test_find_page_restricted_to_regions() {
        let rating = create_test_rating("rat1", "reg1", 4);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let regions = vec!["reg1".to_string()];
        let page = repo
            .find_page(
                Some(&regions),
                RatingSortField::SubmittedAt,
                Order::Desc,
                1,
                10,
            )
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].region_id, "reg1");
    }

    #[tokio::test]
    async fn test_find_in_range_returns_rows() {
        let rating = create_test_rating("rat1", "reg1", 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let start = Utc::now() - chrono::Duration::days(7);
        let end = Utc::now();
        let rows = repo.find_in_range(None, start, end).await.unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_effective_time_prefers_created_at() {
        let created = Utc::now() - chrono::Duration::days(3);
        let mut rating = create_test_rating("rat1", "reg1", 2);
        rating.created_at = Some(created);

        assert_eq!(rating.effective_time(), created);
    }

    #[test]
    fn test_effective_time_falls_back_to_submitted_at() {
        let mut rating = create_test_rating("rat1", "reg1", 2);
        rating.created_at = None;

        assert_eq!(rating.effective_time(), rating.submitted_at);
    }
}
