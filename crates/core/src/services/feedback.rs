//! Feedback service.

use regfeed_common::{AppError, AppResult, IdGenerator, Page, PageMeta};
use regfeed_db::entities::{
    feedback::{self, FeedbackStatus},
    rating,
};
use regfeed_db::repositories::{
    FeedbackListFilter, FeedbackRepository, FeedbackSortField, RatingRepository, RegionRepository,
};
use sea_orm::{Order, Set};

use crate::identity::RequestAdmin;
use crate::region_ref::{RegionRef, index_regions};
use crate::scope::RegionScope;
use crate::services::log::{LogService, actions};
use crate::services::user::UserService;

/// Submitter identity attached to non-anonymous feedback.
#[derive(Debug, Clone)]
pub struct SubmitterInfo {
    /// Full name.
    pub full_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Email; when present the submitter is deduplicated into the user
    /// directory.
    pub email: Option<String>,
}

/// Input for a public feedback submission.
#[derive(Debug, Clone)]
pub struct CreateFeedbackInput {
    /// Target region id.
    pub region_id: String,
    /// The rating this feedback accompanies.
    pub rating_id: String,
    /// Whether the submitter stays anonymous.
    pub anonymous: bool,
    /// The feedback message.
    pub message: String,
    /// Optional short subject.
    pub subject: Option<String>,
    /// Submitter identity; ignored entirely when `anonymous` is set.
    pub submitter: Option<SubmitterInfo>,
}

/// Query for admin feedback listings.
#[derive(Debug, Clone)]
pub struct FeedbackListQuery {
    /// Page number (1-based).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Optional explicit region filter.
    pub region: Option<String>,
    /// Exact status filter.
    pub status: Option<FeedbackStatus>,
    /// Case-insensitive substring search.
    pub search: Option<String>,
    /// Sort expression `field:direction` over `submittedAt` or `status`.
    pub sort: Option<String>,
}

/// Input for an admin status update.
#[derive(Debug, Clone)]
pub struct UpdateFeedbackInput {
    /// New workflow status.
    pub status: FeedbackStatus,
    /// Optional response text.
    pub response: Option<String>,
}

/// A feedback together with its resolved references.
#[derive(Debug, Clone)]
pub struct FeedbackRecord {
    /// The feedback row.
    pub feedback: feedback::Model,
    /// Resolved region reference (may be dangling).
    pub region: RegionRef,
    /// The accompanying rating, when it still exists.
    pub rating: Option<rating::Model>,
}

/// Service for feedback submissions and their admin workflow.
#[derive(Clone)]
pub struct FeedbackService {
    feedback_repo: FeedbackRepository,
    region_repo: RegionRepository,
    rating_repo: RatingRepository,
    user_service: UserService,
    log_service: LogService,
    id_gen: IdGenerator,
}

impl FeedbackService {
    /// Create a new feedback service.
    #[must_use]
    pub const fn new(
        feedback_repo: FeedbackRepository,
        region_repo: RegionRepository,
        rating_repo: RatingRepository,
        user_service: UserService,
        log_service: LogService,
    ) -> Self {
        Self {
            feedback_repo,
            region_repo,
            rating_repo,
            user_service,
            log_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new feedback (public).
    ///
    /// When not anonymous and an email is present, the submitter is
    /// find-or-created in the user directory and linked. Anonymous
    /// feedback never persists identity fields, regardless of what was
    /// sent.
    pub async fn create(&self, input: CreateFeedbackInput) -> AppResult<feedback::Model> {
        if !self.region_repo.exists(&input.region_id).await? {
            return Err(AppError::NotFound("Region not found".to_string()));
        }
        if self.rating_repo.find_by_id(&input.rating_id).await?.is_none() {
            return Err(AppError::NotFound("Rating not found".to_string()));
        }

        let submitter = if input.anonymous {
            None
        } else {
            input.submitter
        };

        let user_id = match submitter
            .as_ref()
            .and_then(|s| s.email.as_deref().map(|email| (s, email)))
        {
            Some((info, email)) => Some(
                self.user_service
                    .find_or_create(email, &info.full_name, info.phone.as_deref())
                    .await?
                    .id,
            ),
            None => None,
        };

        let now = chrono::Utc::now();
        let model = feedback::ActiveModel {
            id: Set(self.id_gen.generate()),
            region_id: Set(input.region_id),
            rating_id: Set(input.rating_id),
            user_id: Set(user_id),
            anonymous: Set(input.anonymous),
            message: Set(input.message),
            subject: Set(input.subject),
            contact_name: Set(submitter.as_ref().map(|s| s.full_name.clone())),
            contact_phone: Set(submitter.as_ref().and_then(|s| s.phone.clone())),
            contact_email: Set(submitter.as_ref().and_then(|s| s.email.clone())),
            status: Set(FeedbackStatus::Pending),
            response: Set(None),
            submitted_at: Set(now),
            created_at: Set(now),
            updated_at: Set(None),
        };

        let created = self.feedback_repo.create(model).await?;

        self.log_service
            .record(actions::CREATE_FEEDBACK, Some(&created.id))
            .await;

        Ok(created)
    }

    /// List feedbacks visible to the caller.
    pub async fn list(
        &self,
        query: &FeedbackListQuery,
        caller: &RequestAdmin,
    ) -> AppResult<Page<FeedbackRecord>> {
        let scope = RegionScope::resolve(
            caller.role,
            &caller.allowed_regions,
            query.region.as_deref(),
        );

        if scope.is_empty() {
            return Ok(Page::empty(query.page, query.limit));
        }

        let (sort, order) = parse_sort(query.sort.as_deref())?;

        let filter = FeedbackListFilter {
            region_ids: scope.region_ids(),
            status: query.status,
            search: query.search.clone(),
        };

        let total = self.feedback_repo.count(&filter).await?;
        let rows = self
            .feedback_repo
            .find_page(&filter, sort, order, query.page, query.limit)
            .await?;

        let data = self.resolve_references(rows).await?;

        Ok(Page {
            meta: PageMeta::new(total, query.page, query.limit),
            data,
        })
    }

    /// Fetch one feedback, enforcing the caller's scope after the fetch.
    pub async fn get(&self, id: &str, caller: &RequestAdmin) -> AppResult<FeedbackRecord> {
        let feedback = self
            .feedback_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Feedback not found".to_string()))?;

        let scope = RegionScope::resolve(caller.role, &caller.allowed_regions, None);
        if !scope.allows(&feedback.region_id) {
            return Err(AppError::OutOfScope);
        }

        let mut records = self.resolve_references(vec![feedback]).await?;
        records
            .pop()
            .ok_or_else(|| AppError::Internal("Resolved feedback vanished".to_string()))
    }

    /// Update status/response of a feedback within the caller's scope.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateFeedbackInput,
        caller: &RequestAdmin,
    ) -> AppResult<FeedbackRecord> {
        let feedback = self
            .feedback_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Feedback not found".to_string()))?;

        let scope = RegionScope::resolve(caller.role, &caller.allowed_regions, None);
        if !scope.allows(&feedback.region_id) {
            return Err(AppError::OutOfScope);
        }

        let mut active: feedback::ActiveModel = feedback.into();
        active.status = Set(input.status);
        active.response = Set(input.response);
        active.updated_at = Set(Some(chrono::Utc::now()));

        let updated = self.feedback_repo.update(active).await?;

        self.log_service
            .record(actions::UPDATE_FEEDBACK, Some(&updated.id))
            .await;

        let mut records = self.resolve_references(vec![updated]).await?;
        records
            .pop()
            .ok_or_else(|| AppError::Internal("Resolved feedback vanished".to_string()))
    }

    /// All feedbacks of one user with references resolved, newest first.
    pub async fn records_for_user(&self, user_id: &str) -> AppResult<Vec<FeedbackRecord>> {
        let rows = self.feedback_repo.find_by_user(user_id).await?;
        self.resolve_references(rows).await
    }

    /// Resolve region and rating references for a batch of feedbacks,
    /// tolerating dangling ids.
    pub(crate) async fn resolve_references(
        &self,
        rows: Vec<feedback::Model>,
    ) -> AppResult<Vec<FeedbackRecord>> {
        let mut region_ids: Vec<String> = rows.iter().map(|f| f.region_id.clone()).collect();
        region_ids.sort_unstable();
        region_ids.dedup();

        let regions = index_regions(self.region_repo.find_by_ids(&region_ids).await?);

        let mut records = Vec::with_capacity(rows.len());
        for feedback in rows {
            let region = RegionRef::lookup(&feedback.region_id, &regions);
            // Ratings are fetched one by one: feedback pages are small and
            // most share no rating.
            let rating = self.rating_repo.find_by_id(&feedback.rating_id).await?;
            records.push(FeedbackRecord {
                feedback,
                region,
                rating,
            });
        }

        Ok(records)
    }
}

fn parse_sort(sort: Option<&str>) -> AppResult<(FeedbackSortField, Order)> {
    let Some(sort) = sort else {
        return Ok((FeedbackSortField::SubmittedAt, Order::Desc));
    };

    let (field, direction) = sort.split_once(':').unwrap_or((sort, "desc"));

    let field = match field {
        "submittedAt" => FeedbackSortField::SubmittedAt,
        "status" => FeedbackSortField::Status,
        _ => return Err(AppError::Validation("Invalid sort field".to_string())),
    };

    let order = if direction == "asc" { Order::Asc } else { Order::Desc };

    Ok((field, order))
}
