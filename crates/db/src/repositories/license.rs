//! License repository for database operations.

use chrono::Utc;
use ona_core::payments::{
    self, CreateLicenseInput, License, LicenseTier, PaymentError, PaymentStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::payment_err;
use crate::entities::licenses;

/// License repository backed by the `licenses` table.
#[derive(Debug, Clone)]
pub struct LicenseStore {
    db: DatabaseConnection,
}

impl LicenseStore {
    /// Creates a new license repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's licenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<License>, PaymentError> {
        licenses::Entity::find()
            .filter(licenses::Column::UserId.eq(user_id))
            .order_by_desc(licenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(payment_err)?
            .into_iter()
            .map(to_license)
            .collect()
    }
}

impl payments::LicenseRepository for LicenseStore {
    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<License>, PaymentError> {
        licenses::Entity::find()
            .filter(licenses::Column::StripePaymentIntentId.eq(payment_intent_id))
            .one(&self.db)
            .await
            .map_err(payment_err)?
            .map(to_license)
            .transpose()
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<License>, PaymentError> {
        licenses::Entity::find()
            .filter(licenses::Column::StripeCheckoutSessionId.eq(session_id))
            .one(&self.db)
            .await
            .map_err(payment_err)?
            .map(to_license)
            .transpose()
    }

    async fn create(&self, input: CreateLicenseInput) -> Result<License, PaymentError> {
        let now = Utc::now().into();
        let license = licenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            license_key: Set(input.license_key),
            tier: Set(input.tier.as_str().to_string()),
            payment_status: Set(input.payment_status.as_str().to_string()),
            stripe_payment_intent_id: Set(input.stripe_payment_intent_id),
            stripe_checkout_session_id: Set(input.stripe_checkout_session_id),
            amount_cents: Set(input.amount_cents),
            currency: Set(input.currency),
            is_lifetime: Set(input.is_lifetime),
            is_active: Set(input.is_active),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = license.insert(&self.db).await.map_err(payment_err)?;
        to_license(model)
    }

    async fn update_payment_status(
        &self,
        license_id: Uuid,
        status: PaymentStatus,
        is_active: bool,
    ) -> Result<License, PaymentError> {
        let model = licenses::Entity::find_by_id(license_id)
            .one(&self.db)
            .await
            .map_err(payment_err)?
            .ok_or_else(|| PaymentError::repository(format!("license {license_id} not found")))?;

        let mut active: licenses::ActiveModel = model.into();
        active.payment_status = Set(status.as_str().to_string());
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.db).await.map_err(payment_err)?;
        to_license(model)
    }

    async fn has_active_license(&self, user_id: Uuid) -> Result<bool, PaymentError> {
        let count = licenses::Entity::find()
            .filter(licenses::Column::UserId.eq(user_id))
            .filter(licenses::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(payment_err)?;

        Ok(count > 0)
    }
}

fn to_license(model: licenses::Model) -> Result<License, PaymentError> {
    let tier = LicenseTier::parse(&model.tier).ok_or_else(|| {
        PaymentError::repository(format!("license {}: unknown tier {}", model.id, model.tier))
    })?;
    let payment_status = PaymentStatus::parse(&model.payment_status).ok_or_else(|| {
        PaymentError::repository(format!(
            "license {}: unknown payment status {}",
            model.id, model.payment_status
        ))
    })?;

    Ok(License {
        id: model.id,
        user_id: model.user_id,
        license_key: model.license_key,
        tier,
        payment_status,
        stripe_payment_intent_id: model.stripe_payment_intent_id,
        stripe_checkout_session_id: model.stripe_checkout_session_id,
        amount_cents: model.amount_cents,
        currency: model.currency,
        is_lifetime: model.is_lifetime,
        is_active: model.is_active,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
