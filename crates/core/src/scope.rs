//! Region access scope resolution.
//!
//! Every region-scoped query in the system goes through [`RegionScope`]:
//! given the caller's role, its assigned region set and an optional
//! explicit region filter, it computes the effective restriction. The
//! policy is fail closed: any ambiguity (empty assigned set, requested
//! region outside the assigned set) resolves to "see nothing", never to
//! "see everything".

use regfeed_db::entities::admin::AdminRole;

/// The effective region restriction of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionScope {
    /// Super-admin with no explicit filter: no restriction at all.
    Unrestricted,
    /// Restricted to a single region (explicit filter, validated against
    /// the caller's assigned set for non-super callers).
    Single(String),
    /// Admin caller with no explicit filter: restricted to its assigned
    /// set.
    Many(Vec<String>),
    /// Nothing is visible. Short-circuits to an empty result set without
    /// touching storage; region-scoped emptiness is a valid state, not an
    /// error.
    Empty,
}

impl RegionScope {
    /// Resolve the scope for a caller.
    #[must_use]
    pub fn resolve(
        role: AdminRole,
        allowed_regions: &[String],
        requested: Option<&str>,
    ) -> Self {
        if role.is_super() {
            return match requested {
                // Requested filter is passed through as-is for super admins.
                Some(region) => Self::Single(region.to_string()),
                None => Self::Unrestricted,
            };
        }

        if allowed_regions.is_empty() {
            return Self::Empty;
        }

        match requested {
            Some(region) => {
                if allowed_regions.iter().any(|r| r == region) {
                    Self::Single(region.to_string())
                } else {
                    // Requested region outside the assigned set: fail closed.
                    Self::Empty
                }
            }
            None => Self::Many(allowed_regions.to_vec()),
        }
    }

    /// Whether the scope yields nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Whether a concrete region is visible under this scope.
    ///
    /// Used for the after-the-fact check on single-entity lookups: a fetched
    /// entity whose region is not allowed must be reported out of scope
    /// rather than leaked.
    #[must_use]
    pub fn allows(&self, region_id: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Single(region) => region == region_id,
            Self::Many(regions) => regions.iter().any(|r| r == region_id),
            Self::Empty => false,
        }
    }

    /// The region id set to hand to repositories: `None` means
    /// unrestricted, `Some(ids)` restricts to the listed regions.
    ///
    /// [`RegionScope::Empty`] is expected to be short-circuited before
    /// storage is consulted; if it still reaches a repository the returned
    /// empty set matches no rows.
    #[must_use]
    pub fn region_ids(&self) -> Option<Vec<String>> {
        match self {
            Self::Unrestricted => None,
            Self::Single(region) => Some(vec![region.clone()]),
            Self::Many(regions) => Some(regions.clone()),
            Self::Empty => Some(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_super_admin_without_filter_is_unrestricted() {
        let scope = RegionScope::resolve(AdminRole::SuperAdmin, &[], None);
        assert_eq!(scope, RegionScope::Unrestricted);
        assert!(scope.allows("anything"));
        assert_eq!(scope.region_ids(), None);
    }

    #[test]
    fn test_super_admin_filter_passes_through_unvalidated() {
        // Super admins ignore their assigned set entirely.
        let scope = RegionScope::resolve(AdminRole::SuperAdmin, &regions(&["reg1"]), Some("reg9"));
        assert_eq!(scope, RegionScope::Single("reg9".to_string()));
    }

    #[test]
    fn test_admin_without_filter_restricted_to_assigned_set() {
        let allowed = regions(&["reg1", "reg2"]);
        let scope = RegionScope::resolve(AdminRole::Admin, &allowed, None);
        assert_eq!(scope, RegionScope::Many(allowed.clone()));
        assert!(scope.allows("reg1"));
        assert!(!scope.allows("reg3"));
        assert_eq!(scope.region_ids(), Some(allowed));
    }

    #[test]
    fn test_admin_with_allowed_filter_narrows_to_single() {
        let scope =
            RegionScope::resolve(AdminRole::Admin, &regions(&["reg1", "reg2"]), Some("reg2"));
        assert_eq!(scope, RegionScope::Single("reg2".to_string()));
        assert!(!scope.allows("reg1"));
    }

    #[test]
    fn test_admin_with_out_of_scope_filter_fails_closed() {
        let scope = RegionScope::resolve(AdminRole::Admin, &regions(&["reg1"]), Some("reg3"));
        assert_eq!(scope, RegionScope::Empty);
        assert!(!scope.allows("reg3"));
    }

    #[test]
    fn test_admin_with_empty_assigned_set_sees_nothing() {
        let scope = RegionScope::resolve(AdminRole::Admin, &[], None);
        assert!(scope.is_empty());
        assert!(!scope.allows("reg1"));

        // Even with an explicit filter.
        let scope = RegionScope::resolve(AdminRole::Admin, &[], Some("reg1"));
        assert!(scope.is_empty());
    }

    #[test]
    fn test_empty_scope_region_ids_match_no_rows() {
        assert_eq!(RegionScope::Empty.region_ids(), Some(Vec::new()));
    }
}
