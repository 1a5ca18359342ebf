//! Provider event envelope.

use serde::Deserialize;
use serde_json::Value;

use crate::error::GateError;

/// Event kinds the ledger reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SubscriptionCreated,
    PaymentSucceeded,
    Other,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "customer.subscription.created" | "subscription.created" => {
                Self::SubscriptionCreated
            }
            "invoice.payment_succeeded" => Self::PaymentSucceeded,
            _ => Self::Other,
        }
    }

    /// Stable label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Self::SubscriptionCreated => "subscription_created",
            Self::PaymentSucceeded => "payment_succeeded",
            Self::Other => "other",
        }
    }
}

/// Minimal view of a provider event. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: Value,
}

impl ProviderEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, GateError> {
        serde_json::from_slice(payload).map_err(|e| GateError::MalformedEvent(e.to_string()))
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }

    /// `data.object.customer`, either a bare id or an expanded object.
    pub fn customer_id(&self) -> Option<&str> {
        let customer = self.data.object.get("customer")?;
        customer
            .as_str()
            .or_else(|| customer.get("id").and_then(Value::as_str))
    }

    /// `data.object.customer_email`, falling back to `metadata.email`.
    pub fn customer_email(&self) -> Option<&str> {
        let object = &self.data.object;
        object
            .get("customer_email")
            .and_then(Value::as_str)
            .or_else(|| object.pointer("/metadata/email").and_then(Value::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscription_event() {
        let event = ProviderEvent::parse(
            br#"{
                "id": "evt_1",
                "type": "customer.subscription.created",
                "data": {"object": {"customer": "cus_1", "customer_email": "a@x"}}
            }"#,
        )
        .unwrap();
        assert_eq!(event.kind(), EventKind::SubscriptionCreated);
        assert_eq!(event.customer_id(), Some("cus_1"));
        assert_eq!(event.customer_email(), Some("a@x"));
    }

    #[test]
    fn expanded_customer_and_metadata_email() {
        let event = ProviderEvent::parse(
            br#"{
                "type": "subscription.created",
                "data": {"object": {"customer": {"id": "cus_9"}, "metadata": {"email": "m@x"}}}
            }"#,
        )
        .unwrap();
        assert_eq!(event.kind(), EventKind::SubscriptionCreated);
        assert_eq!(event.id, "");
        assert_eq!(event.customer_id(), Some("cus_9"));
        assert_eq!(event.customer_email(), Some("m@x"));
    }

    #[test]
    fn unknown_type_is_other() {
        let event = ProviderEvent::parse(br#"{"id":"evt","type":"charge.refunded"}"#).unwrap();
        assert_eq!(event.kind(), EventKind::Other);
        assert_eq!(event.customer_id(), None);
    }

    #[test]
    fn malformed_payloads() {
        let payloads: [&[u8]; 4] = [b"not json", b"{}", b"[]", br#"{"type": 7}"#];
        for payload in payloads {
            assert!(matches!(
                ProviderEvent::parse(payload),
                Err(GateError::MalformedEvent(_))
            ));
        }
    }
}
