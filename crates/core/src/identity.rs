//! Verified caller identity.

use regfeed_db::entities::admin::AdminRole;

/// The authenticated admin behind a request, as carried by the access
/// credential claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAdmin {
    /// Admin id (`sub` claim).
    pub id: String,
    /// Login email.
    pub email: String,
    /// Role at credential issue time.
    pub role: AdminRole,
    /// Full display name.
    pub fullname: String,
    /// Assigned region ids at credential issue time; ignored for super
    /// admins.
    pub allowed_regions: Vec<String>,
}
