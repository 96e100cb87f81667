//! Admin repository.

use std::sync::Arc;

use regfeed_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Query, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::like_pattern;
use crate::entities::{
    Admin, AdminRegion,
    admin::{self, AdminRole},
    admin_region,
};

/// Sortable fields of the admin directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSortField {
    /// Sort by full name.
    Fullname,
    /// Sort by creation time.
    CreatedAt,
}

impl AdminSortField {
    const fn column(self) -> admin::Column {
        match self {
            Self::Fullname => admin::Column::Fullname,
            Self::CreatedAt => admin::Column::CreatedAt,
        }
    }
}

/// Filter for admin directory listings.
#[derive(Debug, Clone, Default)]
pub struct AdminListFilter {
    /// Case-insensitive substring match over fullname and email.
    pub search: Option<String>,
    /// Exact role filter.
    pub role: Option<AdminRole>,
    /// Only admins assigned to this region.
    pub region: Option<String>,
    /// Only admins whose assigned regions overlap this set (scope
    /// restriction for non-super callers). `None` means unrestricted.
    pub visible_regions: Option<Vec<String>>,
}

/// Repository for admin directory operations.
#[derive(Clone)]
pub struct AdminRepository {
    db: Arc<DatabaseConnection>,
}

impl AdminRepository {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find admin by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<admin::Model>> {
        Admin::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find admin by email. Emails are stored lowercased, so the caller is
    /// expected to normalize before lookup.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<admin::Model>> {
        Admin::find()
            .filter(admin::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn list_condition(filter: &AdminListFilter) -> Condition {
        let mut condition = Condition::all();

        if let Some(search) = filter.search.as_deref() {
            let pattern = like_pattern(search);
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(admin::Column::Fullname).ilike(pattern.clone()))
                    .add(Expr::col(admin::Column::Email).ilike(pattern)),
            );
        }

        if let Some(role) = filter.role {
            condition = condition.add(admin::Column::Role.eq(role));
        }

        if let Some(region) = filter.region.as_deref() {
            condition = condition.add(
                admin::Column::Id.in_subquery(
                    Query::select()
                        .column(admin_region::Column::AdminId)
                        .from(AdminRegion)
                        .and_where(Expr::col(admin_region::Column::RegionId).eq(region))
                        .to_owned(),
                ),
            );
        }

        if let Some(visible) = filter.visible_regions.as_ref() {
            condition = condition.add(
                admin::Column::Id.in_subquery(
                    Query::select()
                        .column(admin_region::Column::AdminId)
                        .from(AdminRegion)
                        .and_where(
                            Expr::col(admin_region::Column::RegionId).is_in(visible.clone()),
                        )
                        .to_owned(),
                ),
            );
        }

        condition
    }

    /// Find one page of admins matching the filter.
    pub async fn find_page(
        &self,
        filter: &AdminListFilter,
        sort: AdminSortField,
        order: Order,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<admin::Model>> {
        Admin::find()
            .filter(Self::list_condition(filter))
            .order_by(sort.column(), order)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count admins matching the filter.
    pub async fn count(&self, filter: &AdminListFilter) -> AppResult<u64> {
        Admin::find()
            .filter(Self::list_condition(filter))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count non-super admins assigned to the given region.
    pub async fn count_assigned_to_region(&self, region_id: &str) -> AppResult<u64> {
        Admin::find()
            .filter(admin::Column::Role.ne(AdminRole::SuperAdmin))
            .filter(
                admin::Column::Id.in_subquery(
                    Query::select()
                        .column(admin_region::Column::AdminId)
                        .from(AdminRegion)
                        .and_where(Expr::col(admin_region::Column::RegionId).eq(region_id))
                        .to_owned(),
                ),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Assigned region ids of one admin.
    pub async fn region_ids_for(&self, admin_id: &str) -> AppResult<Vec<String>> {
        let rows = AdminRegion::find()
            .filter(admin_region::Column::AdminId.eq(admin_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.region_id).collect())
    }

    /// Assignment rows for a set of admins; callers group by `admin_id`.
    pub async fn assignments_for(
        &self,
        admin_ids: &[String],
    ) -> AppResult<Vec<admin_region::Model>> {
        if admin_ids.is_empty() {
            return Ok(Vec::new());
        }

        AdminRegion::find()
            .filter(admin_region::Column::AdminId.is_in(admin_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new admin together with its region assignments.
    pub async fn create(
        &self,
        model: admin::ActiveModel,
        assignments: Vec<admin_region::ActiveModel>,
    ) -> AppResult<admin::Model> {
        let created = model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !assignments.is_empty() {
            AdminRegion::insert_many(assignments)
                .exec(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        Ok(created)
    }

    /// Update an admin record.
    pub async fn update(&self, model: admin::ActiveModel) -> AppResult<admin::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the region assignments of an admin.
    pub async fn replace_assignments(
        &self,
        admin_id: &str,
        assignments: Vec<admin_region::ActiveModel>,
    ) -> AppResult<()> {
        AdminRegion::delete_many()
            .filter(admin_region::Column::AdminId.eq(admin_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !assignments.is_empty() {
            AdminRegion::insert_many(assignments)
                .exec(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        Ok(())
    }

    /// Delete an admin and its region assignments.
    pub async fn delete(&self, admin_id: &str) -> AppResult<()> {
        // First delete the assignment rows
        AdminRegion::delete_many()
            .filter(admin_region::Column::AdminId.eq(admin_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Then delete the admin
        Admin::delete_by_id(admin_id)
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

    fn create_test_admin(id: &str, email: &str, role: AdminRole) -> admin::Model {
        admin::Model {
            id: id.to_string(),
            fullname: "Test Admin".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_email_returns_admin() {
        let admin = create_test_admin("adm1", "admin@example.com", AdminRole::Admin);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin.clone()]])
                .into_connection(),
        );

        let repo = AdminRepository::new(db);
        let result = repo.find_by_email("admin@example.com").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "adm1");
    }

    #[tokio::test]
    async fn test_find_by_email_miss_returns_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<admin::Model>::new()])
                .into_connection(),
        );

        let repo = AdminRepository::new(db);
        let result = repo.find_by_email("nobody@example.com").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_region_ids_for_maps_rows() {
        let rows = vec![
            admin_region::Model {
                id: "ar1".to_string(),
                admin_id: "adm1".to_string(),
                region_id: "reg1".to_string(),
                created_at: Utc::now(),
            },
            admin_region::Model {
                id: "ar2".to_string(),
                admin_id: "adm1".to_string(),
                region_id: "reg2".to_string(),
                created_at: Utc::now(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = AdminRepository::new(db);
        let ids = repo.region_ids_for("adm1").await.unwrap();

        assert_eq!(ids, vec!["reg1".to_string(), "reg2".to_string()]);
    }

    #[tokio::test]
    async fn test_assignments_for_empty_input_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = AdminRepository::new(db);
        let rows = repo.assignments_for(&[]).await.unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_assignments_first() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2, // assignment rows deleted
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1, // admin deleted
                    },
                ])
                .into_connection(),
        );

        let repo = AdminRepository::new(db);
        assert!(repo.delete("adm1").await.is_ok());
    }

    #[tokio::test]
    async fn test_find_page_with_full_filter() {
        let admin = create_test_admin("adm1", "a@example.com", AdminRole::Admin);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );

        let repo = AdminRepository::new(db);
        let filter = AdminListFilter {
            search: Some("adm".to_string()),
            role: Some(AdminRole::Admin),
            region: Some("reg1".to_string()),
            visible_regions: Some(vec!["reg1".to_string(), "reg2".to_string()]),
        };

        let page = repo
            .find_page(&filter, AdminSortField::CreatedAt, Order::Desc, 1, 10)
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
    }
}
