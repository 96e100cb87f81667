//! Admin directory service.

use std::collections::HashMap;

use regfeed_common::{AppError, AppResult, IdGenerator, Page, PageMeta};
use regfeed_db::entities::{
    admin::{self, AdminRole},
    admin_region,
};
use regfeed_db::repositories::{
    AdminListFilter, AdminRepository, AdminSortField, RegionRepository,
};
use sea_orm::{Order, Set};

use crate::identity::RequestAdmin;
use crate::region_ref::{RegionRef, index_regions};
use crate::services::auth::hash_password;

/// Input for creating an admin.
#[derive(Debug, Clone)]
pub struct CreateAdminInput {
    /// Full display name.
    pub fullname: String,
    /// Login email.
    pub email: String,
    /// Plaintext password; policy is enforced at the API boundary.
    pub password: String,
    /// Role of the new account.
    pub role: AdminRole,
    /// Assigned region ids; validated against the region directory.
    pub allowed_regions: Vec<String>,
}

/// Input for updating an admin.
#[derive(Debug, Clone, Default)]
pub struct UpdateAdminInput {
    /// New display name.
    pub fullname: Option<String>,
    /// New login email.
    pub email: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
    /// New role.
    pub role: Option<AdminRole>,
    /// Replacement assigned-region set.
    pub allowed_regions: Option<Vec<String>>,
}

/// Query for admin directory listings.
#[derive(Debug, Clone, Default)]
pub struct AdminListQuery {
    /// Page number (1-based).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Case-insensitive substring search over fullname and email.
    pub search: Option<String>,
    /// Exact role filter.
    pub role: Option<AdminRole>,
    /// Only admins assigned to this region.
    pub region: Option<String>,
    /// Sort field, `fullname` or `created_at`, `-` prefix for descending.
    pub sort: Option<String>,
}

/// An admin together with its resolved assigned regions.
#[derive(Debug, Clone)]
pub struct AdminRecord {
    /// The admin row (password hash is never serialized).
    pub admin: admin::Model,
    /// Assigned regions; dangling ids stay unresolved.
    pub allowed_regions: Vec<RegionRef>,
}

/// Service for the admin directory.
#[derive(Clone)]
pub struct AdminService {
    admin_repo: AdminRepository,
    region_repo: RegionRepository,
    id_gen: IdGenerator,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(admin_repo: AdminRepository, region_repo: RegionRepository) -> Self {
        Self {
            admin_repo,
            region_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ensure exactly one super admin with the configured email exists.
    ///
    /// Idempotent bootstrap step, executed once during process startup.
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> AppResult<()> {
        let normalized = email.trim().to_lowercase();

        if self.admin_repo.find_by_email(&normalized).await?.is_some() {
            return Ok(());
        }

        let model = admin::ActiveModel {
            id: Set(self.id_gen.generate()),
            fullname: Set("Super Admin".to_string()),
            email: Set(normalized.clone()),
            password_hash: Set(hash_password(password)?),
            role: Set(AdminRole::SuperAdmin),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        self.admin_repo.create(model, Vec::new()).await?;
        tracing::info!(email = %normalized, "Created bootstrap super admin");

        Ok(())
    }

    /// Create an admin (super-admin only, gated at the API layer).
    pub async fn create(&self, input: CreateAdminInput) -> AppResult<AdminRecord> {
        let normalized = input.email.trim().to_lowercase();

        if self.admin_repo.find_by_email(&normalized).await?.is_some() {
            return Err(AppError::Conflict(
                "Admin with this email already exists".to_string(),
            ));
        }

        self.ensure_regions_exist(&input.allowed_regions).await?;

        let admin_id = self.id_gen.generate();
        let model = admin::ActiveModel {
            id: Set(admin_id.clone()),
            fullname: Set(input.fullname),
            email: Set(normalized),
            password_hash: Set(hash_password(&input.password)?),
            role: Set(input.role),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        let assignments = self.build_assignments(&admin_id, &input.allowed_regions);
        let created = self.admin_repo.create(model, assignments).await?;

        self.resolve_record(created, input.allowed_regions).await
    }

    /// List admins visible to the caller.
    ///
    /// Non-super callers only see admins whose assigned regions overlap
    /// their own; an empty assigned set sees nobody.
    pub async fn list(
        &self,
        query: &AdminListQuery,
        caller: &RequestAdmin,
    ) -> AppResult<Page<AdminRecord>> {
        let mut filter = AdminListFilter {
            search: query.search.clone(),
            role: query.role,
            region: query.region.clone(),
            visible_regions: None,
        };

        if !caller.role.is_super() {
            if caller.allowed_regions.is_empty() {
                return Ok(Page::empty(query.page, query.limit));
            }
            filter.visible_regions = Some(caller.allowed_regions.clone());
        }

        let (sort, order) = parse_sort(query.sort.as_deref())?;

        let total = self.admin_repo.count(&filter).await?;
        let rows = self
            .admin_repo
            .find_page(&filter, sort, order, query.page, query.limit)
            .await?;

        let data = self.resolve_records(rows).await?;

        Ok(Page {
            meta: PageMeta::new(total, query.page, query.limit),
            data,
        })
    }

    /// Fetch one admin, enforcing assigned-region overlap for non-super
    /// callers.
    pub async fn get(&self, id: &str, caller: &RequestAdmin) -> AppResult<AdminRecord> {
        let admin = self
            .admin_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        let region_ids = self.admin_repo.region_ids_for(&admin.id).await?;
        Self::ensure_access(&region_ids, caller)?;

        self.resolve_record(admin, region_ids).await
    }

    /// Update an admin within the caller's scope.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateAdminInput,
        caller: &RequestAdmin,
    ) -> AppResult<AdminRecord> {
        let admin = self
            .admin_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        let current_regions = self.admin_repo.region_ids_for(&admin.id).await?;
        Self::ensure_access(&current_regions, caller)?;

        if let Some(email) = input.email.as_deref() {
            let normalized = email.trim().to_lowercase();
            if normalized != admin.email
                && self.admin_repo.find_by_email(&normalized).await?.is_some()
            {
                return Err(AppError::Conflict("Email already taken".to_string()));
            }
        }

        let region_ids = match input.allowed_regions {
            Some(regions) => {
                self.ensure_regions_exist(&regions).await?;
                self.admin_repo
                    .replace_assignments(id, self.build_assignments(id, &regions))
                    .await?;
                regions
            }
            None => current_regions,
        };

        let mut active: admin::ActiveModel = admin.into();
        if let Some(fullname) = input.fullname {
            active.fullname = Set(fullname);
        }
        if let Some(email) = input.email {
            active.email = Set(email.trim().to_lowercase());
        }
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Some(chrono::Utc::now()));

        let updated = self.admin_repo.update(active).await?;

        self.resolve_record(updated, region_ids).await
    }

    /// Delete an admin within the caller's scope. Super admins cannot be
    /// deleted.
    pub async fn remove(&self, id: &str, caller: &RequestAdmin) -> AppResult<()> {
        let admin = self
            .admin_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        if admin.role.is_super() {
            return Err(AppError::BadRequest(
                "Cannot delete a super admin".to_string(),
            ));
        }

        let region_ids = self.admin_repo.region_ids_for(&admin.id).await?;
        Self::ensure_access(&region_ids, caller)?;

        self.admin_repo.delete(id).await
    }

    /// Overlap check for single-admin operations: non-super callers may
    /// only touch admins whose assigned regions intersect their own.
    fn ensure_access(target_regions: &[String], caller: &RequestAdmin) -> AppResult<()> {
        if caller.role.is_super() {
            return Ok(());
        }

        if caller.allowed_regions.is_empty() {
            return Err(AppError::OutOfScope);
        }

        let overlaps = target_regions
            .iter()
            .any(|region| caller.allowed_regions.contains(region));

        if overlaps { Ok(()) } else { Err(AppError::OutOfScope) }
    }

    async fn ensure_regions_exist(&self, region_ids: &[String]) -> AppResult<()> {
        if region_ids.is_empty() {
            return Ok(());
        }

        let count = self.region_repo.count_existing(region_ids).await?;
        if count as usize != region_ids.len() {
            return Err(AppError::BadRequest(
                "One or more regions are invalid".to_string(),
            ));
        }

        Ok(())
    }

    fn build_assignments(
        &self,
        admin_id: &str,
        region_ids: &[String],
    ) -> Vec<admin_region::ActiveModel> {
        region_ids
            .iter()
            .map(|region_id| admin_region::ActiveModel {
                id: Set(self.id_gen.generate()),
                admin_id: Set(admin_id.to_string()),
                region_id: Set(region_id.clone()),
                created_at: Set(chrono::Utc::now()),
            })
            .collect()
    }

    async fn resolve_record(
        &self,
        admin: admin::Model,
        region_ids: Vec<String>,
    ) -> AppResult<AdminRecord> {
        let regions = index_regions(self.region_repo.find_by_ids(&region_ids).await?);
        let allowed_regions = region_ids
            .iter()
            .map(|id| RegionRef::lookup(id, &regions))
            .collect();

        Ok(AdminRecord {
            admin,
            allowed_regions,
        })
    }

    async fn resolve_records(&self, rows: Vec<admin::Model>) -> AppResult<Vec<AdminRecord>> {
        let admin_ids: Vec<String> = rows.iter().map(|a| a.id.clone()).collect();
        let assignments = self.admin_repo.assignments_for(&admin_ids).await?;

        let mut by_admin: HashMap<String, Vec<String>> = HashMap::new();
        for assignment in assignments {
            by_admin
                .entry(assignment.admin_id)
                .or_default()
                .push(assignment.region_id);
        }

        let mut all_region_ids: Vec<String> =
            by_admin.values().flatten().cloned().collect();
        all_region_ids.sort_unstable();
        all_region_ids.dedup();
        let regions = index_regions(self.region_repo.find_by_ids(&all_region_ids).await?);

        Ok(rows
            .into_iter()
            .map(|admin| {
                let allowed_regions = by_admin
                    .get(&admin.id)
                    .map(|ids| {
                        ids.iter()
                            .map(|id| RegionRef::lookup(id, &regions))
                            .collect()
                    })
                    .unwrap_or_default();

                AdminRecord {
                    admin,
                    allowed_regions,
                }
            })
            .collect())
    }
}

fn parse_sort(sort: Option<&str>) -> AppResult<(AdminSortField, Order)> {
    let Some(sort) = sort else {
        return Ok((AdminSortField::CreatedAt, Order::Desc));
    };

    let (order, field) = sort
        .strip_prefix('-')
        .map_or((Order::Asc, sort), |rest| (Order::Desc, rest));

    let field = match field {
        "fullname" => AdminSortField::Fullname,
        "created_at" => AdminSortField::CreatedAt,
        _ => return Err(AppError::Validation("Invalid sort field".to_string())),
    };

    Ok((field, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regfeed_db::entities::region;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_admin(id: &str, email: &str, role: AdminRole) -> admin::Model {
        admin::Model {
            id: id.to_string(),
            fullname: "Test Admin".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$x".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn caller(role: AdminRole, allowed: &[&str]) -> RequestAdmin {
        RequestAdmin {
            id: "caller".to_string(),
            email: "caller@example.com".to_string(),
            role,
            fullname: "Caller".to_string(),
            allowed_regions: allowed.iter().map(ToString::to_string).collect(),
        }
    }

    fn service_with_db(db: sea_orm::DatabaseConnection) -> AdminService {
        let db = Arc::new(db);
        AdminService::new(
            AdminRepository::new(Arc::clone(&db)),
            RegionRepository::new(db),
        )
    }

    #[test]
    fn test_parse_sort_prefix_form() {
        assert_eq!(
            parse_sort(None).unwrap(),
            (AdminSortField::CreatedAt, Order::Desc)
        );
        assert_eq!(
            parse_sort(Some("fullname")).unwrap(),
            (AdminSortField::Fullname, Order::Asc)
        );
        assert_eq!(
            parse_sort(Some("-created_at")).unwrap(),
            (AdminSortField::CreatedAt, Order::Desc)
        );
        assert!(parse_sort(Some("email")).is_err());
    }

    #[test]
    fn test_ensure_access_rules() {
        let target = vec!["reg1".to_string(), "reg2".to_string()];

        // Super admins always pass.
        assert!(AdminService::ensure_access(&target, &caller(AdminRole::SuperAdmin, &[])).is_ok());

        // Overlap passes, disjoint and empty fail closed.
        assert!(
            AdminService::ensure_access(&target, &caller(AdminRole::Admin, &["reg2"])).is_ok()
        );
        assert!(matches!(
            AdminService::ensure_access(&target, &caller(AdminRole::Admin, &["reg9"])),
            Err(AppError::OutOfScope)
        ));
        assert!(matches!(
            AdminService::ensure_access(&target, &caller(AdminRole::Admin, &[])),
            Err(AppError::OutOfScope)
        ));

        // A target with no regions (e.g. a super admin) is out of scope
        // for every non-super caller.
        assert!(matches!(
            AdminService::ensure_access(&[], &caller(AdminRole::Admin, &["reg1"])),
            Err(AppError::OutOfScope)
        ));
    }

    #[tokio::test]
    async fn test_list_empty_scope_short_circuits() {
        let service =
            service_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let query = AdminListQuery {
            page: 1,
            limit: 10,
            ..Default::default()
        };
        let page = service
            .list(&query, &caller(AdminRole::Admin, &[]))
            .await
            .unwrap();

        assert_eq!(page.meta.total, 0);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_admin("adm1", "taken@example.com", AdminRole::Admin)]])
            .into_connection();
        let service = service_with_db(db);

        let err = service
            .create(CreateAdminInput {
                fullname: "New Admin".to_string(),
                email: "Taken@Example.com".to_string(),
                password: "Sup3r$ecretPass!".to_string(),
                role: AdminRole::Admin,
                allowed_regions: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_regions() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // email lookup misses
            .append_query_results([Vec::<admin::Model>::new()])
            // only one of two regions exists
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(1))
            }]])
            .into_connection();
        let service = service_with_db(db);

        let err = service
            .create(CreateAdminInput {
                fullname: "New Admin".to_string(),
                email: "new@example.com".to_string(),
                password: "Sup3r$ecretPass!".to_string(),
                role: AdminRole::Admin,
                allowed_regions: vec!["reg1".to_string(), "ghost".to_string()],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_remove_refuses_super_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_admin("adm1", "root@example.com", AdminRole::SuperAdmin)]])
            .into_connection();
        let service = service_with_db(db);

        let err = service
            .remove("adm1", &caller(AdminRole::SuperAdmin, &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_ensure_bootstrap_admin_is_idempotent() {
        // Existing admin with the configured email: nothing is inserted.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_admin(
                "adm1",
                "root@example.com",
                AdminRole::SuperAdmin,
            )]])
            .into_connection();
        let service = service_with_db(db);

        assert!(
            service
                .ensure_bootstrap_admin("root@example.com", "Sup3r$ecretPass!")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_ensure_bootstrap_admin_creates_when_missing() {
        let created = test_admin("adm1", "root@example.com", AdminRole::SuperAdmin);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<admin::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[created]])
            .into_connection();
        let service = service_with_db(db);

        assert!(
            service
                .ensure_bootstrap_admin("Root@Example.com", "Sup3r$ecretPass!")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_get_resolves_region_names() {
        let admin = test_admin("adm1", "a@example.com", AdminRole::Admin);
        let assignment = admin_region::Model {
            id: "ar1".to_string(),
            admin_id: "adm1".to_string(),
            region_id: "reg1".to_string(),
            created_at: Utc::now(),
        };
        let region = region::Model {
            id: "reg1".to_string(),
            name: "Tashkent".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[admin]])
            .append_query_results([[assignment]])
            .append_query_results([[region]])
            .into_connection();
        let service = service_with_db(db);

        let record = service
            .get("adm1", &caller(AdminRole::SuperAdmin, &[]))
            .await
            .unwrap();

        assert_eq!(record.allowed_regions.len(), 1);
        assert_eq!(record.allowed_regions[0].name(), Some("Tashkent"));
    }
}
