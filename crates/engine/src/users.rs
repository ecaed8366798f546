//! Users table and credential helpers.
//!
//! Transactions reference a user through `users.id`.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTimeUtc,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Public view of a registered user. Credentials never leave the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("user not exists".to_string()))?,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Opaque single-use token.
pub(crate) fn new_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

type PasswordMac = Hmac<Sha256>;

/// HMAC-SHA256 of the password keyed by the salt.
fn password_mac(salt: &str, password: &str) -> ResultEngine<PasswordMac> {
    let mut mac = PasswordMac::new_from_slice(salt.as_bytes())
        .map_err(|err| EngineError::Credential(err.to_string()))?;
    mac.update(password.as_bytes());
    Ok(mac)
}

/// Hex-encoded digest stored in `password_hash`.
pub(crate) fn hash_password(salt: &str, password: &str) -> ResultEngine<String> {
    let mac = password_mac(salt, password)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of `password` against the stored digest.
pub(crate) fn verify_password(model: &Model, password: &str) -> bool {
    let Ok(expected) = hex::decode(&model.password_hash) else {
        return false;
    };
    match password_mac(&model.password_salt, password) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(err) => {
            tracing::error!("password check failed: {err}");
            false
        }
    }
}

pub(crate) fn user_id(model: &Model) -> ResultEngine<Uuid> {
    Uuid::parse_str(&model.id).map_err(|_| EngineError::KeyNotFound("user not exists".to_string()))
}
