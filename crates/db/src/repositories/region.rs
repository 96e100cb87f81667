//! Region repository.

use std::sync::Arc;

use regfeed_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{Region, region};

/// Repository for region operations.
#[derive(Clone)]
pub struct RegionRepository {
    db: Arc<DatabaseConnection>,
}

impl RegionRepository {
    /// Create a new region repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find region by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<region::Model>> {
        Region::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find regions by a set of IDs.
    ///
    /// Missing ids are silently absent from the result; callers treat them
    /// as dangling references.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<region::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Region::find()
            .filter(region::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a region by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<region::Model>> {
        Region::find()
            .filter(region::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a region with the given id exists.
    pub async fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Count how many of the given ids reference existing regions.
    pub async fn count_existing(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        Region::find()
            .filter(region::Column::Id.is_in(ids.iter().cloned()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find one page of regions, optionally restricted to an id set.
    pub async fn find_page(
        &self,
        region_ids: Option<&[String]>,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<region::Model>> {
        let mut query = Region::find();

        if let Some(ids) = region_ids {
            query = query.filter(region::Column::Id.is_in(ids.iter().cloned()));
        }

        query
            .order_by(region::Column::CreatedAt, Order::Desc)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count regions, optionally restricted to an id set.
    pub async fn count(&self, region_ids: Option<&[String]>) -> AppResult<u64> {
        let mut query = Region::find();

        if let Some(ids) = region_ids {
            query = query.filter(region::Column::Id.is_in(ids.iter().cloned()));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All regions visible under the given restriction, in stable name
    /// order. This order defines the region order of aggregation output.
    pub async fn find_all_scoped(
        &self,
        region_ids: Option<&[String]>,
    ) -> AppResult<Vec<region::Model>> {
        let mut query = Region::find();

        if let Some(ids) = region_ids {
            query = query.filter(region::Column::Id.is_in(ids.iter().cloned()));
        }

        query
            .order_by(region::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new region.
    pub async fn create(&self, model: region::ActiveModel) -> AppResult<region::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a region.
    pub async fn update(&self, model: region::ActiveModel) -> AppResult<region::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a region.
    ///
    /// Deletion does not cascade to ratings, feedbacks or admin
    /// assignments; their region references are left dangling by design.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Region::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_region(id: &str, name: &str) -> region::Model {
        region::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_returns_region() {
        let region = create_test_region("reg1", "Tashkent");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[region.clone()]])
                .into_connection(),
        );

        let repo = RegionRepository::new(db);
        let result = repo.find_by_id("reg1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Tashkent");
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_input_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = RegionRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_all_scoped_returns_rows() {
        let reg1 = create_test_region("reg1", "Andijan");
        let reg2 = create_test_region("reg2", "Bukhara");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reg1, reg2]])
                .into_connection(),
        );

        let repo = RegionRepository::new(db);
        let result = repo.find_all_scoped(None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_count_existing_empty_is_zero() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = RegionRepository::new(db);
        assert_eq!(repo.count_existing(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_executes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = RegionRepository::new(db);
        assert!(repo.delete("reg1").await.is_ok());
    }
}
