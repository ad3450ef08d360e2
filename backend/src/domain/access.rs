//! Subscription access gate.
//!
//! Expiry is derived from the profile on every evaluation and never cached;
//! the payment webhook can rewrite subscription fields at any moment, and a
//! stale verdict would either lock out a paying user or let an expired one
//! through.

use chrono::{DateTime, Utc};
use log::debug;
use shared::{SubscriptionStatus, View};

use crate::domain::models::Profile;

/// Whether the profile's subscription access has lapsed at `now`.
///
/// Admins are never expired. Everyone else is expired when the stored status
/// says so, or when an end date exists and has passed.
pub fn is_expired(profile: &Profile, now: DateTime<Utc>) -> bool {
    if profile.is_admin {
        return false;
    }

    if profile.subscription_status == SubscriptionStatus::Expired {
        return true;
    }

    match profile.subscription_end_date {
        Some(end_date) => end_date < now,
        None => false,
    }
}

/// Resolve which view a navigation request actually lands on.
///
/// An expired user can only reach Settings and Subscription; every other
/// request resolves to Subscription. This is an explicit state transition so
/// the caller stores the resolved view rather than the requested one.
pub fn resolve_view(profile: &Profile, requested: View, now: DateTime<Utc>) -> View {
    if !is_expired(profile, now) {
        return requested;
    }

    match requested {
        View::Settings | View::Subscription => requested,
        other => {
            debug!("Expired user {} redirected from {:?} to subscription view", profile.id, other);
            View::Subscription
        }
    }
}
