//! User repository for database operations.

use chrono::Utc;
use ona_core::payments::{self, CreateUserInput, PaymentError, User};
use ona_shared::Role;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::payment_err;
use crate::entities::users;

/// User repository backed by the `users` table.
///
/// Emails are stored lowercased; lookups are therefore case-insensitive.
#[derive(Debug, Clone)]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PaymentError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(payment_err)?
            .map(to_user)
            .transpose()
    }

    /// Promotes an existing user to admin, or creates one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn ensure_admin(&self, email: &str, name: &str) -> Result<User, PaymentError> {
        let email = email.trim().to_lowercase();
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .map_err(payment_err)?;

        let model = match existing {
            Some(model) => {
                let mut active: users::ActiveModel = model.into();
                active.role = Set(Role::Admin.as_str().to_string());
                active.email_verified = Set(true);
                active.updated_at = Set(Utc::now().into());
                active.update(&self.db).await.map_err(payment_err)?
            }
            None => insert(
                &self.db,
                CreateUserInput {
                    email,
                    name: name.to_string(),
                    role: Role::Admin,
                    email_verified: true,
                },
            )
            .await?,
        };

        to_user(model)
    }
}

impl payments::UserRepository for UserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PaymentError> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(payment_err)?
            .map(to_user)
            .transpose()
    }

    async fn create(&self, input: CreateUserInput) -> Result<User, PaymentError> {
        let model = insert(&self.db, input).await?;
        to_user(model)
    }
}

async fn insert(
    db: &DatabaseConnection,
    input: CreateUserInput,
) -> Result<users::Model, PaymentError> {
    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(input.email.trim().to_lowercase()),
        name: Set(input.name),
        role: Set(input.role.as_str().to_string()),
        email_verified: Set(input.email_verified),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user.insert(db).await.map_err(payment_err)
}

fn to_user(model: users::Model) -> Result<User, PaymentError> {
    let role = model
        .role
        .parse::<Role>()
        .map_err(|e| PaymentError::repository(format!("user {}: {e}", model.id)))?;

    Ok(User {
        id: model.id,
        email: model.email,
        name: model.name,
        role,
        email_verified: model.email_verified,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
