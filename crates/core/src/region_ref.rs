//! Region reference resolution.

use std::collections::HashMap;

use regfeed_db::entities::region;

/// A reference to a region that may or may not resolve to a live record.
///
/// Regions are deleted without cascading, so any stored `region_id` can
/// dangle. Readers resolve references in bulk and carry the result as this
/// tagged union instead of re-inspecting shapes at every use site; the
/// single [`RegionRef::id`] accessor works for both variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionRef {
    /// The referenced region no longer exists (or was never loaded).
    Unresolved(String),
    /// The referenced region with its display name.
    Resolved {
        /// Region id.
        id: String,
        /// Region name.
        name: String,
    },
}

impl RegionRef {
    /// The referenced region id, regardless of resolution state.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Unresolved(id) | Self::Resolved { id, .. } => id,
        }
    }

    /// The region name, when the reference resolved.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Unresolved(_) => None,
            Self::Resolved { name, .. } => Some(name),
        }
    }

    /// Resolve one id against a preloaded region map.
    #[must_use]
    pub fn lookup(id: &str, regions: &HashMap<String, region::Model>) -> Self {
        regions.get(id).map_or_else(
            || Self::Unresolved(id.to_string()),
            |region| Self::Resolved {
                id: region.id.clone(),
                name: region.name.clone(),
            },
        )
    }
}

/// Index region models by id for bulk reference resolution.
#[must_use]
pub fn index_regions(regions: Vec<region::Model>) -> HashMap<String, region::Model> {
    regions.into_iter().map(|r| (r.id.clone(), r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn region(id: &str, name: &str) -> region::Model {
        region::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_lookup_resolves_live_region() {
        let map = index_regions(vec![region("reg1", "Samarkand")]);
        let re = RegionRef::lookup("reg1", &map);

        assert_eq!(re.id(), "reg1");
        assert_eq!(re.name(), Some("Samarkand"));
    }

    #[test]
    fn test_lookup_keeps_dangling_id() {
        let map = index_regions(vec![]);
        let re = RegionRef::lookup("gone", &map);

        assert_eq!(re, RegionRef::Unresolved("gone".to_string()));
        assert_eq!(re.id(), "gone");
        assert_eq!(re.name(), None);
    }
}
