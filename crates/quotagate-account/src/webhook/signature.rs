//! Provider webhook signatures.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>…]`. The MAC
//! is HMAC-SHA256 over `"{t}.{payload}"` keyed by the endpoint secret.

use std::time::Duration;

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::error::GateError;

type HmacSha256 = Hmac<Sha256>;

/// Request header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Verifies (and, for tooling, produces) webhook signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    keyed: HmacSha256,
    tolerance: Duration,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(secret: &[u8], tolerance: Duration) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret)?,
            tolerance,
        })
    }

    #[inline]
    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }

    /// Check `header` against `payload` at time `now`.
    pub fn verify(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<(), GateError> {
        let header = header.ok_or_else(|| invalid("missing signature header"))?;

        let mut timestamp = None;
        let mut candidates = Vec::new();
        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                "v1" => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| invalid("missing or invalid timestamp"))?;
        if candidates.is_empty() {
            return Err(invalid("no v1 signature"));
        }

        let age = now.unix_timestamp().abs_diff(timestamp);
        if age > self.tolerance.as_secs() {
            return Err(invalid("timestamp outside tolerance"));
        }

        let matched = candidates.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|sig| self.mac(timestamp, payload).verify_slice(&sig).is_ok())
                .unwrap_or(false)
        });
        if matched {
            Ok(())
        } else {
            Err(invalid("signature mismatch"))
        }
    }

    /// Build a header value for `payload` signed at `timestamp`.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        let sig = self.mac(timestamp, payload).finalize().into_bytes();
        format!("t={timestamp},v1={}", hex::encode(sig))
    }
}

#[inline]
fn invalid(reason: &str) -> GateError {
    GateError::SignatureInvalid(reason.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    const NOW: OffsetDateTime = datetime!(2024-06-10 12:00 UTC);
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"invoice.payment_succeeded"}"#;

    fn verifier(secret: &str) -> SignatureVerifier {
        SignatureVerifier::new(secret.as_bytes(), Duration::from_secs(300)).unwrap()
    }

    #[test]
    fn accepts_own_signature() {
        let v = verifier("whsec_test");
        let header = v.sign(PAYLOAD, NOW.unix_timestamp());
        assert!(header.starts_with(&format!("t={},v1=", NOW.unix_timestamp())));
        v.verify(PAYLOAD, Some(&header), NOW).unwrap();
    }

    #[test]
    fn known_vector() {
        let v = verifier("secret");
        assert_eq!(
            v.sign(b"{}", 1_700_000_000),
            "t=1700000000,v1=b8569b78799ff9e3cbff0fc2d63a33a2b57f3282abd07c37ae5e8e7d79a5f163"
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = verifier("other").sign(PAYLOAD, NOW.unix_timestamp());
        let err = verifier("whsec_test")
            .verify(PAYLOAD, Some(&header), NOW)
            .unwrap_err();
        assert_eq!(err, GateError::SignatureInvalid("signature mismatch".into()));
    }

    #[test]
    fn rejects_tampered_body() {
        let v = verifier("whsec_test");
        let header = v.sign(PAYLOAD, NOW.unix_timestamp());
        assert!(v.verify(b"{\"id\":\"evt_2\"}", Some(&header), NOW).is_err());
    }

    #[test]
    fn rejects_stale_and_future_timestamps() {
        let v = verifier("whsec_test");
        let stale = v.sign(PAYLOAD, NOW.unix_timestamp() - 301);
        let future = v.sign(PAYLOAD, NOW.unix_timestamp() + 301);
        let edge = v.sign(PAYLOAD, NOW.unix_timestamp() - 300);
        assert!(v.verify(PAYLOAD, Some(&stale), NOW).is_err());
        assert!(v.verify(PAYLOAD, Some(&future), NOW).is_err());
        v.verify(PAYLOAD, Some(&edge), NOW).unwrap();
    }

    #[test]
    fn rejects_missing_or_garbled_header() {
        let v = verifier("whsec_test");
        assert!(v.verify(PAYLOAD, None, NOW).is_err());
        assert!(v.verify(PAYLOAD, Some(""), NOW).is_err());
        assert!(v.verify(PAYLOAD, Some("t=abc,v1=00"), NOW).is_err());
        let ts_only = format!("t={}", NOW.unix_timestamp());
        assert!(v.verify(PAYLOAD, Some(&ts_only), NOW).is_err());
        let not_hex = format!("t={},v1=zz", NOW.unix_timestamp());
        assert!(v.verify(PAYLOAD, Some(&not_hex), NOW).is_err());
    }

    #[test]
    fn any_matching_v1_is_enough() {
        let v = verifier("whsec_test");
        let good = v.sign(PAYLOAD, NOW.unix_timestamp());
        let (_, sig) = good.split_once(",v1=").unwrap();
        let rotated = format!("t={},v1={},v0=legacy,v1={sig}", NOW.unix_timestamp(), "00".repeat(32));
        v.verify(PAYLOAD, Some(&rotated), NOW).unwrap();
    }

    #[test]
    fn debug_hides_secret() {
        let rendered = format!("{:?}", verifier("whsec_topsecret"));
        assert!(!rendered.contains("topsecret"));
    }
}
