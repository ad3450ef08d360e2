use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::SubscriptionStatus;

/// Domain model of a user profile.
///
/// The identity service owns creation; this side only reads identity fields
/// and re-derives gating from the subscription fields, which the payment
/// webhook may rewrite at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub subscription_status: SubscriptionStatus,
    pub subscription_end_date: Option<DateTime<Utc>>,
}

impl Profile {
    /// Fallback profile for a session whose subscription fields could not be
    /// fetched: a plain trial user with no end date, never treated as
    /// expired.
    pub fn fallback(user_id: &str, name: &str, email: &str) -> Self {
        Self {
            id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            is_admin: false,
            subscription_status: SubscriptionStatus::Trial,
            subscription_end_date: None,
        }
    }

    pub fn from_dto(dto: shared::UserProfile) -> Result<Self> {
        let subscription_end_date = match dto.subscription_end_date {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .context("Invalid subscription end date")?
                    .with_timezone(&Utc),
            ),
            None => None,
        };
        Ok(Self {
            id: dto.id,
            name: dto.name,
            email: dto.email,
            is_admin: dto.is_admin,
            subscription_status: dto.subscription_status,
            subscription_end_date,
        })
    }
}

impl From<Profile> for shared::UserProfile {
    fn from(profile: Profile) -> Self {
        shared::UserProfile {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            is_admin: profile.is_admin,
            subscription_status: profile.subscription_status,
            subscription_end_date: profile.subscription_end_date.map(|t| t.to_rfc3339()),
        }
    }
}
