use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{ProfileId, UserId},
};

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    Db(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("username already taken")]
    UsernameTaken,

    #[error("email already registered")]
    EmailTaken,
}

/// Profile fields settable through [`UsersService::_upsert_profile`].
/// `None` leaves the stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about: Option<String>,
    pub primary_language: Option<String>,
    pub proficiency_level: Option<String>,
}

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
}

impl UsersService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn _create_user(
        &self,
        username: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<UserModel, UsersServiceError> {
        let username_taken = User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .is_some();
        if username_taken {
            return Err(UsersServiceError::UsernameTaken);
        }

        let email_taken = User::find()
            .filter(UserColumn::Email.eq(email))
            .one(&self.db)
            .await?
            .is_some();
        if email_taken {
            return Err(UsersServiceError::EmailTaken);
        }

        let user = UserActiveModel {
            id: Set(UserId::new()),
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            is_active: Set(true),
            is_admin: Set(is_admin),
            created_at: Set(chrono::Utc::now()),
        };

        let result = User::insert(user).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    pub async fn _get_user(&self, user_id: UserId) -> Result<UserModel, UsersServiceError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::UserNotFound)
    }

    /// Create or update the user's 1:1 profile row.
    pub async fn _upsert_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<ProfileModel, UsersServiceError> {
        self._get_user(user_id).await?;

        let existing = Profile::find()
            .filter(ProfileColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let profile = match existing {
            Some(profile) => {
                let mut active: ProfileActiveModel = profile.into();
                if let Some(v) = update.first_name {
                    active.first_name = Set(Some(v));
                }
                if let Some(v) = update.last_name {
                    active.last_name = Set(Some(v));
                }
                if let Some(v) = update.about {
                    active.about = Set(Some(v));
                }
                if let Some(v) = update.primary_language {
                    active.primary_language = Set(Some(v));
                }
                if let Some(v) = update.proficiency_level {
                    active.proficiency_level = Set(Some(v));
                }
                active.update(&self.db).await?
            }
            None => {
                let active = ProfileActiveModel {
                    id: Set(ProfileId::new()),
                    user_id: Set(user_id),
                    first_name: Set(update.first_name),
                    last_name: Set(update.last_name),
                    about: Set(update.about),
                    primary_language: Set(update.primary_language),
                    proficiency_level: Set(update.proficiency_level),
                };
                Profile::insert(active)
                    .exec_with_returning(&self.db)
                    .await?
            }
        };

        Ok(profile)
    }

    /// Display label for a single user: profile first name when present and
    /// non-empty, otherwise the email. Same rule the comment tree applies
    /// in batch.
    pub async fn _display_label(&self, user_id: UserId) -> Result<String, UsersServiceError> {
        let user = self._get_user(user_id).await?;

        let first_name = Profile::find()
            .filter(ProfileColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .and_then(|p| p.first_name)
            .filter(|name| !name.is_empty());

        Ok(first_name.unwrap_or(user.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    async fn setup_test_service() -> UsersService {
        let db = test_utils::create_test_db_with_migrations().await;
        UsersService::new(db)
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let service = setup_test_service().await;

        let user = service
            ._create_user("ana", "ana@example.com", false)
            .await
            .unwrap();
        assert!(!user.is_admin);
        assert!(user.is_active);

        let fetched = service._get_user(user.id).await.unwrap();
        assert_eq!(fetched.username, "ana");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let service = setup_test_service().await;

        service
            ._create_user("ana", "ana@example.com", false)
            .await
            .unwrap();
        let result = service._create_user("ana", "other@example.com", false).await;
        assert!(matches!(result, Err(UsersServiceError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let service = setup_test_service().await;

        service
            ._create_user("ana", "ana@example.com", false)
            .await
            .unwrap();
        let result = service._create_user("ana2", "ana@example.com", false).await;
        assert!(matches!(result, Err(UsersServiceError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_upsert_profile_creates_then_updates() {
        let service = setup_test_service().await;
        let user = service
            ._create_user("ana", "ana@example.com", false)
            .await
            .unwrap();

        let created = service
            ._upsert_profile(
                user.id,
                ProfileUpdate {
                    first_name: Some("Ana".into()),
                    primary_language: Some("Spanish".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.first_name.as_deref(), Some("Ana"));

        let updated = service
            ._upsert_profile(
                user.id,
                ProfileUpdate {
                    about: Some("phonology nerd".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Untouched fields survive the second upsert
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name.as_deref(), Some("Ana"));
        assert_eq!(updated.about.as_deref(), Some("phonology nerd"));
    }

    #[tokio::test]
    async fn test_display_label_prefers_first_name() {
        let service = setup_test_service().await;
        let user = service
            ._create_user("ana", "ana@example.com", false)
            .await
            .unwrap();

        assert_eq!(
            service._display_label(user.id).await.unwrap(),
            "ana@example.com"
        );

        service
            ._upsert_profile(
                user.id,
                ProfileUpdate {
                    first_name: Some("Ana".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(service._display_label(user.id).await.unwrap(), "Ana");
    }
}
