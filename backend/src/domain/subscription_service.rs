use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::models::Profile;
use crate::storage::csv::{CsvConnection, ProfileRepository};
use crate::storage::traits::ProfileStorage;
use shared::{PaymentWebhookPayload, SubscriptionStatus};

/// What a payment-provider webhook call amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// Subscription fields were rewritten for this profile
    Applied { user_id: String, status: SubscriptionStatus },
    /// Recognized payload, but nothing to do (unknown event type)
    Ignored { event: String },
    /// Event recognized but no matching profile exists
    UserNotFound,
    /// Payload identifies neither a user id nor an email: caller error
    MissingIdentification,
}

/// The subscription change a recognized event maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SubscriptionUpdate {
    status: SubscriptionStatus,
    end_date_days_from_now: i64,
}

/// Map a provider event type to the subscription change it implies.
/// Payment events grant 31 days (a monthly cycle plus a day of slack);
/// cancellation-class events end access immediately.
fn map_event(event: &str) -> Option<SubscriptionUpdate> {
    match event {
        "payment_approved" | "subscription_paid" => Some(SubscriptionUpdate {
            status: SubscriptionStatus::Active,
            end_date_days_from_now: 31,
        }),
        "subscription_canceled" | "payment_refunded" | "payment_chargeback" => Some(SubscriptionUpdate {
            status: SubscriptionStatus::Canceled,
            end_date_days_from_now: 0,
        }),
        _ => None,
    }
}

/// Service applying payment-provider webhook events to user profiles
#[derive(Clone)]
pub struct SubscriptionService {
    profile_repository: ProfileRepository,
}

impl SubscriptionService {
    /// Create a new SubscriptionService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            profile_repository: ProfileRepository::new(csv_conn),
        }
    }

    /// Process a payment webhook payload.
    ///
    /// The profile is matched by external user id first, then by email.
    /// Unknown event types are acknowledged and ignored so the provider
    /// does not retry them.
    pub fn process_webhook(&self, payload: PaymentWebhookPayload) -> Result<WebhookOutcome> {
        self.process_webhook_at(payload, Utc::now())
    }

    fn process_webhook_at(
        &self,
        payload: PaymentWebhookPayload,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome> {
        info!("Processing payment webhook event: {}", payload.event);

        let user_id = payload.customer.as_ref().and_then(|c| c.external_id.clone());
        let email = payload.customer.as_ref().and_then(|c| c.email.clone());

        if user_id.is_none() && email.is_none() {
            warn!("Webhook payload identifies no user, rejecting");
            return Ok(WebhookOutcome::MissingIdentification);
        }

        let update = match map_event(&payload.event) {
            Some(update) => update,
            None => {
                info!("Ignoring unrecognized webhook event: {}", payload.event);
                return Ok(WebhookOutcome::Ignored { event: payload.event });
            }
        };

        let profile = match self.find_profile(user_id.as_deref(), email.as_deref())? {
            Some(profile) => profile,
            None => {
                warn!("Webhook matched no profile (id={:?}, email={:?})", user_id, email);
                return Ok(WebhookOutcome::UserNotFound);
            }
        };

        let updated = Profile {
            subscription_status: update.status,
            subscription_end_date: Some(now + Duration::days(update.end_date_days_from_now)),
            ..profile
        };
        self.profile_repository.store_profile(&updated)?;

        info!(
            "Applied webhook event {} to user {}: status {:?}, ends {:?}",
            payload.event, updated.id, updated.subscription_status, updated.subscription_end_date
        );

        Ok(WebhookOutcome::Applied {
            user_id: updated.id,
            status: update.status,
        })
    }

    fn find_profile(&self, user_id: Option<&str>, email: Option<&str>) -> Result<Option<Profile>> {
        if let Some(id) = user_id {
            if let Some(profile) = self.profile_repository.get_profile(id)? {
                return Ok(Some(profile));
            }
        }
        if let Some(email) = email {
            return self.profile_repository.find_profile_by_email(email);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use shared::WebhookCustomer;

    fn setup() -> (SubscriptionService, ProfileRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let service = SubscriptionService::new(connection.clone());
        let repo = ProfileRepository::new(connection);
        (service, repo, temp_dir)
    }

    fn store_profile(repo: &ProfileRepository, id: &str, email: &str) {
        repo.store_profile(&Profile {
            id: id.to_string(),
            name: "Test".to_string(),
            email: email.to_string(),
            is_admin: false,
            subscription_status: SubscriptionStatus::Trial,
            subscription_end_date: None,
        })
        .unwrap();
    }

    fn payload(event: &str, external_id: Option<&str>, email: Option<&str>) -> PaymentWebhookPayload {
        PaymentWebhookPayload {
            event: event.to_string(),
            customer: Some(WebhookCustomer {
                email: email.map(str::to_string),
                external_id: external_id.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_payment_grants_thirty_one_days() {
        let (service, repo, _temp_dir) = setup();
        store_profile(&repo, "user-1", "a@example.com");

        let now = Utc::now();
        let outcome = service
            .process_webhook_at(payload("payment_approved", Some("user-1"), None), now)
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Applied {
                user_id: "user-1".to_string(),
                status: SubscriptionStatus::Active,
            }
        );

        let profile = repo.get_profile("user-1").unwrap().unwrap();
        assert_eq!(profile.subscription_status, SubscriptionStatus::Active);
        assert_eq!(profile.subscription_end_date, Some(now + Duration::days(31)));
    }

    #[test]
    fn test_cancellation_ends_access_now() {
        let (service, repo, _temp_dir) = setup();
        store_profile(&repo, "user-1", "a@example.com");

        let now = Utc::now();
        for event in ["subscription_canceled", "payment_refunded", "payment_chargeback"] {
            service
                .process_webhook_at(payload(event, Some("user-1"), None), now)
                .unwrap();
            let profile = repo.get_profile("user-1").unwrap().unwrap();
            assert_eq!(profile.subscription_status, SubscriptionStatus::Canceled);
            assert_eq!(profile.subscription_end_date, Some(now));
        }
    }

    #[test]
    fn test_unknown_event_is_acknowledged_and_ignored() {
        let (service, repo, _temp_dir) = setup();
        store_profile(&repo, "user-1", "a@example.com");

        let outcome = service
            .process_webhook(payload("pix_generated", Some("user-1"), None))
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event: "pix_generated".to_string()
            }
        );

        // Profile untouched
        let profile = repo.get_profile("user-1").unwrap().unwrap();
        assert_eq!(profile.subscription_status, SubscriptionStatus::Trial);
    }

    #[test]
    fn test_unidentified_payload_is_rejected() {
        let (service, _repo, _temp_dir) = setup();

        let outcome = service
            .process_webhook(PaymentWebhookPayload {
                event: "payment_approved".to_string(),
                customer: None,
            })
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::MissingIdentification);
    }

    #[test]
    fn test_matches_by_id_before_email() {
        let (service, repo, _temp_dir) = setup();
        store_profile(&repo, "user-1", "a@example.com");
        store_profile(&repo, "user-2", "b@example.com");

        // id points at user-1, email at user-2; id wins
        service
            .process_webhook(payload("payment_approved", Some("user-1"), Some("b@example.com")))
            .unwrap();

        let one = repo.get_profile("user-1").unwrap().unwrap();
        let two = repo.get_profile("user-2").unwrap().unwrap();
        assert_eq!(one.subscription_status, SubscriptionStatus::Active);
        assert_eq!(two.subscription_status, SubscriptionStatus::Trial);
    }

    #[test]
    fn test_falls_back_to_email_match() {
        let (service, repo, _temp_dir) = setup();
        store_profile(&repo, "user-1", "a@example.com");

        let outcome = service
            .process_webhook(payload("payment_approved", Some("provider-opaque-id"), Some("a@example.com")))
            .unwrap();
        assert!(matches!(outcome, WebhookOutcome::Applied { ref user_id, .. } if user_id == "user-1"));
    }

    #[test]
    fn test_no_matching_profile() {
        let (service, _repo, _temp_dir) = setup();
        let outcome = service
            .process_webhook(payload("payment_approved", Some("ghost"), None))
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::UserNotFound);
    }
}
