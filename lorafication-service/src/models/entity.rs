use chrono::{DateTime, Utc};
use serde::Serialize;
use service_core::error::AppError;
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("entity name must not be empty")]
    EmptyName,

    #[error("entity requires an email or sms contact channel")]
    NoContactChannel,
}

impl From<EntityError> for AppError {
    fn from(err: EntityError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

/// The ways an entity can be reached. There is no variant without a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactChannels {
    Email(String),
    Sms(i64),
    EmailAndSms { email: String, sms: i64 },
}

impl ContactChannels {
    /// Blank email strings count as absent.
    pub fn new(email: Option<String>, sms: Option<i64>) -> Result<Self, EntityError> {
        let email = email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        match (email, sms) {
            (Some(email), Some(sms)) => Ok(Self::EmailAndSms { email, sms }),
            (Some(email), None) => Ok(Self::Email(email)),
            (None, Some(sms)) => Ok(Self::Sms(sms)),
            (None, None) => Err(EntityError::NoContactChannel),
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Email(email) | Self::EmailAndSms { email, .. } => Some(email),
            Self::Sms(_) => None,
        }
    }

    pub fn sms(&self) -> Option<i64> {
        match self {
            Self::Sms(sms) | Self::EmailAndSms { sms, .. } => Some(*sms),
            Self::Email(_) => None,
        }
    }
}

/// A validated entity that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub name: String,
    pub channels: ContactChannels,
}

impl NewEntity {
    pub fn new(
        name: impl Into<String>,
        email: Option<String>,
        sms: Option<i64>,
    ) -> Result<Self, EntityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EntityError::EmptyName);
        }

        Ok(Self {
            name,
            channels: ContactChannels::new(email, sms)?,
        })
    }
}

/// A row of the `entity` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Entity {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub sms: Option<i64>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}
