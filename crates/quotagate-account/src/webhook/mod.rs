//! Payment-provider webhook ingestion.
//!
//! [`WebhookIngestor::ingest`] authenticates a delivery, parses it and
//! dispatches it to the [`AccountLedger`]. The [`Ack`] is produced only after
//! the ledger call returned, so a store failure leaves the event
//! unacknowledged and the provider redelivers it.

mod event;
mod signature;

pub use event::{EventKind, ProviderEvent};
pub use signature::{SIGNATURE_HEADER, SignatureVerifier};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::GateError;
use crate::ledger::{AccountLedger, LedgerOutcome};

/// Receipt for a processed delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub event_id: String,
    pub kind: &'static str,
    pub outcome: &'static str,
}

/// Verifies and applies provider events.
#[derive(Clone)]
pub struct WebhookIngestor {
    ledger: AccountLedger,
    verifier: Option<SignatureVerifier>,
}

impl WebhookIngestor {
    /// `verifier = None` accepts unsigned deliveries (development only).
    pub fn new(ledger: AccountLedger, verifier: Option<SignatureVerifier>) -> Self {
        if verifier.is_none() {
            warn!("webhook signing secret not configured, deliveries will not be verified");
        }
        Self { ledger, verifier }
    }

    #[inline]
    pub fn verifies_signatures(&self) -> bool {
        self.verifier.is_some()
    }

    pub async fn ingest(&self, payload: &[u8], signature: Option<&str>) -> Result<Ack, GateError> {
        self.ingest_at(payload, signature, OffsetDateTime::now_utc())
            .await
    }

    /// [`ingest`](Self::ingest) with an explicit clock reading for the
    /// timestamp tolerance check.
    pub async fn ingest_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<Ack, GateError> {
        match &self.verifier {
            Some(verifier) => verifier.verify(payload, signature, now)?,
            None => warn!("accepting unverified webhook delivery"),
        }

        let event = ProviderEvent::parse(payload)?;
        let kind = event.kind();

        // Customer-scoped events without a customer are acknowledged, never
        // rejected into the provider's retry loop.
        let customer = event.customer_id().filter(|c| !c.is_empty());
        let outcome = match (kind, customer) {
            (EventKind::SubscriptionCreated | EventKind::PaymentSucceeded, None) => {
                warn!(event_id = %event.id, kind = kind.label(), "event without customer, ignoring");
                LedgerOutcome::Ignored
            }
            (EventKind::SubscriptionCreated, Some(customer)) => {
                self.ledger
                    .apply_subscription_created(customer, event.customer_email())
                    .await?
            }
            (EventKind::PaymentSucceeded, Some(customer)) => {
                self.ledger.apply_payment_succeeded(customer).await?
            }
            (EventKind::Other, _) => {
                debug!(event_id = %event.id, event_type = %event.event_type, "unhandled event type");
                LedgerOutcome::Ignored
            }
        };

        info!(
            event_id = %event.id,
            kind = kind.label(),
            outcome = outcome.label(),
            "webhook processed"
        );
        Ok(Ack {
            event_id: event.id,
            kind: kind.label(),
            outcome: outcome.label(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use time::macros::datetime;

    use super::*;
    use crate::store::{AccountStore, MemoryStore};
    use crate::test_util::{BrokenStore, account};

    const NOW: OffsetDateTime = datetime!(2024-06-10 12:00 UTC);
    const SECRET: &[u8] = b"whsec_test";

    fn subscription_payload(email: &str) -> Vec<u8> {
        serde_json::json!({
            "id": "evt_sub",
            "type": "customer.subscription.created",
            "data": {"object": {"customer": "cus_1", "customer_email": email}}
        })
        .to_string()
        .into_bytes()
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET, Duration::from_secs(300)).unwrap()
    }

    fn ingestor(signed: bool) -> (WebhookIngestor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_accounts([account("u1", "a@x", NOW)]));
        let ledger = AccountLedger::new(store.clone());
        let verifier = signed.then(verifier);
        (WebhookIngestor::new(ledger, verifier), store)
    }

    #[tokio::test]
    async fn signed_subscription_is_applied() {
        let (ingestor, store) = ingestor(true);
        let payload = subscription_payload("a@x");
        let header = verifier().sign(&payload, NOW.unix_timestamp());

        let ack = ingestor.ingest_at(&payload, Some(&header), NOW).await.unwrap();
        assert_eq!(
            ack,
            Ack {
                event_id: "evt_sub".into(),
                kind: "subscription_created",
                outcome: "applied",
            }
        );
        assert!(store.find("u1").await.unwrap().unwrap().is_paying);
    }

    #[tokio::test]
    async fn bad_signature_mutates_nothing() {
        let (ingestor, store) = ingestor(true);
        let before = store.list().await.unwrap();
        let payload = subscription_payload("a@x");
        let forged = SignatureVerifier::new(b"wrong", Duration::from_secs(300))
            .unwrap()
            .sign(&payload, NOW.unix_timestamp());

        for header in [Some(forged.as_str()), None] {
            let err = ingestor.ingest_at(&payload, header, NOW).await.unwrap_err();
            assert!(matches!(err, GateError::SignatureInvalid(_)));
        }
        assert_eq!(store.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn unsigned_mode_accepts_without_header() {
        let (ingestor, store) = ingestor(false);
        assert!(!ingestor.verifies_signatures());
        ingestor
            .ingest_at(&subscription_payload("a@x"), None, NOW)
            .await
            .unwrap();
        assert!(store.find("u1").await.unwrap().unwrap().is_paying);
    }

    #[tokio::test]
    async fn unknown_email_is_acknowledged() {
        let (ingestor, store) = ingestor(false);
        let ack = ingestor
            .ingest_at(&subscription_payload("nobody@x"), None, NOW)
            .await
            .unwrap();
        assert_eq!(ack.outcome, "no_match");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn redelivery_is_idempotent() {
        let (ingestor, store) = ingestor(false);
        let payload = subscription_payload("a@x");
        ingestor.ingest_at(&payload, None, NOW).await.unwrap();
        let once = store.list().await.unwrap();
        ingestor.ingest_at(&payload, None, NOW).await.unwrap();
        assert_eq!(store.list().await.unwrap(), once);
    }

    #[tokio::test]
    async fn unknown_types_are_ignored() {
        let (ingestor, _) = ingestor(false);
        let ack = ingestor
            .ingest_at(br#"{"id":"evt_x","type":"charge.refunded"}"#, None, NOW)
            .await
            .unwrap();
        assert_eq!(ack.kind, "other");
        assert_eq!(ack.outcome, "ignored");
    }

    #[tokio::test]
    async fn payment_succeeded_is_informational() {
        let (ingestor, _) = ingestor(false);
        let ack = ingestor
            .ingest_at(
                br#"{"id":"evt_p","type":"invoice.payment_succeeded","data":{"object":{"customer":"cus_1"}}}"#,
                None,
                NOW,
            )
            .await
            .unwrap();
        assert_eq!(ack.outcome, "informational");
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let (ingestor, _) = ingestor(false);
        let err = ingestor.ingest_at(b"{oops", None, NOW).await.unwrap_err();
        assert!(matches!(err, GateError::MalformedEvent(_)));
    }

    #[tokio::test]
    async fn signed_event_without_customer_is_acknowledged() {
        let (ingestor, store) = ingestor(true);
        let before = store.list().await.unwrap();

        for event_type in ["customer.subscription.created", "invoice.payment_succeeded"] {
            let payload = serde_json::json!({
                "id": "evt_nocus",
                "type": event_type,
                "data": {"object": {"customer_email": "a@x"}}
            })
            .to_string()
            .into_bytes();
            let header = verifier().sign(&payload, NOW.unix_timestamp());

            let ack = ingestor.ingest_at(&payload, Some(&header), NOW).await.unwrap();
            assert_eq!(ack.outcome, "ignored");
        }
        assert_eq!(store.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn store_failure_withholds_ack() {
        let ledger = AccountLedger::new(Arc::new(BrokenStore));
        let ingestor = WebhookIngestor::new(ledger, None);
        let err = ingestor
            .ingest_at(&subscription_payload("a@x"), None, NOW)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
