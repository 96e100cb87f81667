//! User directory service.

use regfeed_common::{AppResult, IdGenerator};
use regfeed_db::entities::user;
use regfeed_db::repositories::{FeedbackRepository, UserRepository};
use sea_orm::Set;

/// A user annotated with how many feedbacks it submitted.
#[derive(Debug, Clone)]
pub struct UserWithFeedbackCount {
    /// The user record.
    pub user: user::Model,
    /// Number of feedbacks linked to this user.
    pub feedback_count: u64,
}

/// Service for deduplicated feedback submitters.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    feedback_repo: FeedbackRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, feedback_repo: FeedbackRepository) -> Self {
        Self {
            user_repo,
            feedback_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find the user with this email or create it.
    ///
    /// On a match, name and phone are overwritten with the submitted
    /// values (last write wins); exactly one record ever exists per email.
    pub async fn find_or_create(
        &self,
        email: &str,
        full_name: &str,
        phone: Option<&str>,
    ) -> AppResult<user::Model> {
        let normalized = email.trim().to_lowercase();

        if let Some(existing) = self.user_repo.find_by_email(&normalized).await? {
            let mut active: user::ActiveModel = existing.into();
            active.full_name = Set(full_name.to_string());
            active.phone = Set(phone.map(ToString::to_string));
            active.updated_at = Set(Some(chrono::Utc::now()));

            return self.user_repo.update(active).await;
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(normalized),
            full_name: Set(full_name.to_string()),
            phone: Set(phone.map(ToString::to_string)),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// All users, newest first, each with its feedback count.
    pub async fn list_with_counts(&self) -> AppResult<Vec<UserWithFeedbackCount>> {
        let users = self.user_repo.find_all().await?;

        let mut result = Vec::with_capacity(users.len());
        for user in users {
            let feedback_count = self.feedback_repo.count_by_user(&user.id).await?;
            result.push(UserWithFeedbackCount {
                user,
                feedback_count,
            });
        }

        Ok(result)
    }

    /// Find one user by id.
    pub async fn get(&self, id: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(id).await
    }
}
