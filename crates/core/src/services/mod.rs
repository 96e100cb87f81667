//! Business logic services.

pub mod admin;
pub mod auth;
pub mod feedback;
pub mod log;
pub mod rating;
pub mod region;
pub mod user;

pub use admin::{AdminListQuery, AdminRecord, AdminService, CreateAdminInput, UpdateAdminInput};
pub use auth::{AuthService, AuthTokens, Claims, TokenConfig};
pub use feedback::{
    CreateFeedbackInput, FeedbackListQuery, FeedbackRecord, FeedbackService, SubmitterInfo,
    UpdateFeedbackInput,
};
pub use log::{LogCursor, LogPage, LogService, actions};
pub use rating::{
    CreateRatingInput, RatingListQuery, RatingRecord, RatingService, RatingStats,
    RatingStatsQuery, RegionDistribution, RegionTrend, StarCounts, StatsPeriod, TrendPoint,
};
pub use region::{RegionDetail, RegionService, StarBreakdown};
pub use user::{UserService, UserWithFeedbackCount};
