//! `Stripe-Signature` checking.
//!
//! The signed message is `"<t>.<raw body>"` keyed with the endpoint secret.
//! Deliveries older than five minutes, or more than a minute in the future,
//! are refused even when the MAC matches.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

const MAX_EVENT_AGE_SECS: i64 = 300;

const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// A decoded `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Several while a signing secret is being rolled.
    pub v1_signatures: Vec<Vec<u8>>,
    /// Legacy scheme, decoded but never trusted.
    pub v0_signature: Option<Vec<u8>>,
}

impl SignatureHeader {
    /// `t=<unix>,v1=<hex>[,v1=<hex>...][,v0=<hex>]`. Unknown schemes are
    /// skipped.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures: Vec<Vec<u8>> = Vec::new();
        let mut v0_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key.trim() {
                "t" => {
                    timestamp = Some(value.trim().parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value.trim()).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                "v0" => {
                    v0_signature = Some(hex::decode(value.trim()).map_err(|_| {
                        WebhookError::ParseError("invalid v0 signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
            v0_signature,
        })
    }
}

/// Checks deliveries against one endpoint secret.
pub struct StripeWebhookVerifier {
    secret: SecretString,
    require_livemode: bool,
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            require_livemode: false,
        }
    }

    /// Reject events that were not created in live mode.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    /// Authenticate `payload` and decode it.
    ///
    /// The body is only parsed after a v1 signature matches, so a forged
    /// request never reaches serde.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_and_parse_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify_and_parse`](Self::verify_and_parse) with an explicit
    /// current time.
    pub fn verify_and_parse_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        validate_timestamp(header.timestamp, now)?;

        let expected = self.compute_signature(header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        if self.require_livemode && !event.is_live() {
            return Err(WebhookError::LivemodeRequired);
        }

        Ok(event)
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), WebhookError> {
    // `t=` is untrusted and may sit anywhere in the i64 range
    let age = now.saturating_sub(timestamp);

    if age > MAX_EVENT_AGE_SECS {
        return Err(WebhookError::TimestampOutOfRange);
    }
    if age < -MAX_CLOCK_SKEW_SECS {
        return Err(WebhookError::InvalidTimestamp);
    }

    Ok(())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Hex v1 signature for a fixture body.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";
    const NOW: i64 = 1_704_067_200;

    fn payload(livemode: bool) -> String {
        serde_json::json!({
            "id": "evt_test123",
            "type": "checkout.session.completed",
            "created": NOW,
            "data": { "object": {} },
            "livemode": livemode
        })
        .to_string()
    }

    fn signed_header(secret: &str, timestamp: i64, body: &str) -> String {
        format!(
            "t={},v1={}",
            timestamp,
            compute_test_signature(secret, timestamp, body)
        )
    }


    #[test]
    fn parse_header_with_v1_only() {
        let header = SignatureHeader::parse(&format!("t=1234567890,v1={}", "a".repeat(64))).unwrap();

        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signatures.len(), 1);
        assert_eq!(header.v1_signatures[0].len(), 32);
        assert!(header.v0_signature.is_none());
    }

    #[test]
    fn parse_header_with_multiple_v1_and_v0() {
        let header_str = format!(
            "t=1234567890,v1={},v1={},v0={}",
            "a".repeat(64),
            "c".repeat(64),
            "b".repeat(64)
        );

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.v1_signatures.len(), 2);
        assert!(header.v0_signature.is_some());
    }

    #[test]
    fn parse_header_ignores_unknown_fields() {
        let header_str = format!("t=1234567890,v1={},v2=future", "a".repeat(64));
        assert!(SignatureHeader::parse(&header_str).is_ok());
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_missing_v1_fails() {
        let result = SignatureHeader::parse("t=1234567890,v0=abcd");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        let result = SignatureHeader::parse("t=1234567890,v1=not_valid_hex");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_no_equals_fails() {
        let result = SignatureHeader::parse("t1234567890");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    proptest! {
        #[test]
        fn parse_never_panics(input in ".{0,200}") {
            let _ = SignatureHeader::parse(&input);
        }

        #[test]
        fn parse_recovers_timestamp_and_signatures(
            timestamp in 0i64..=4_102_444_800,
            sigs in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 32), 1..4),
        ) {
            let mut header = format!("t={}", timestamp);
            for sig in &sigs {
                header.push_str(&format!(",v1={}", hex::encode(sig)));
            }

            let parsed = SignatureHeader::parse(&header).unwrap();
            prop_assert_eq!(parsed.timestamp, timestamp);
            prop_assert_eq!(parsed.v1_signatures, sigs);
        }
    }


    #[test]
    fn verify_valid_signature() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = payload(false);
        let header = signed_header(TEST_SECRET, NOW, &body);

        let event = verifier
            .verify_and_parse_at(body.as_bytes(), &header, NOW)
            .unwrap();

        assert_eq!(event.id, "evt_test123");
    }

    #[test]
    fn verify_accepts_any_matching_v1() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = payload(false);
        let header = format!(
            "t={},v1={},v1={}",
            NOW,
            compute_test_signature("whsec_old_secret", NOW, &body),
            compute_test_signature(TEST_SECRET, NOW, &body)
        );

        assert!(verifier
            .verify_and_parse_at(body.as_bytes(), &header, NOW)
            .is_ok());
    }

    #[test]
    fn verify_v0_alone_is_not_trusted() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = payload(false);
        let header = format!(
            "t={},v1={},v0={}",
            NOW,
            "a".repeat(64),
            compute_test_signature(TEST_SECRET, NOW, &body)
        );

        let result = verifier.verify_and_parse_at(body.as_bytes(), &header, NOW);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = StripeWebhookVerifier::new("whsec_wrong");
        let body = payload(false);
        let header = signed_header(TEST_SECRET, NOW, &body);

        let result = verifier.verify_and_parse_at(body.as_bytes(), &header, NOW);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = payload(false);
        let header = signed_header(TEST_SECRET, NOW, &body);
        let tampered = body.replace("evt_test123", "evt_hacked");

        let result = verifier.verify_and_parse_at(tampered.as_bytes(), &header, NOW);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_signs_raw_bytes_not_reformatted_json() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = "{ \"id\": \"evt_ws\", \"type\": \"x\", \"data\": {\"object\": {}} }";
        let header = signed_header(TEST_SECRET, NOW, body);

        let event = verifier
            .verify_and_parse_at(body.as_bytes(), &header, NOW)
            .unwrap();
        assert_eq!(event.id, "evt_ws");
    }


    #[test]
    fn timestamp_at_boundary_succeeds() {
        assert!(validate_timestamp(NOW - 300, NOW).is_ok());
        assert!(validate_timestamp(NOW + 60, NOW).is_ok());
    }

    #[test]
    fn timestamp_too_old_fails() {
        assert!(matches!(
            validate_timestamp(NOW - 301, NOW),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn extreme_timestamps_are_out_of_range() {
        assert!(matches!(
            validate_timestamp(i64::MIN, NOW),
            Err(WebhookError::TimestampOutOfRange)
        ));
        assert!(matches!(
            validate_timestamp(i64::MAX, NOW),
            Err(WebhookError::InvalidTimestamp)
        ));

        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        for t in [i64::MIN, i64::MAX] {
            let header = format!("t={t},v1=00");
            assert!(verifier.verify_and_parse_at(b"{}", &header, NOW).is_err());
        }
    }

    #[test]
    fn timestamp_from_future_beyond_skew_fails() {
        assert!(matches!(
            validate_timestamp(NOW + 61, NOW),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn stale_but_correctly_signed_event_is_rejected() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = payload(false);
        let header = signed_header(TEST_SECRET, NOW - 600, &body);

        let result = verifier.verify_and_parse_at(body.as_bytes(), &header, NOW);
        assert!(matches!(result, Err(WebhookError::TimestampOutOfRange)));
    }


    #[test]
    fn verify_invalid_json_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = "not valid json";
        let header = signed_header(TEST_SECRET, NOW, body);

        let result = verifier.verify_and_parse_at(body.as_bytes(), &header, NOW);
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn require_livemode_rejects_test_events() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET).with_require_livemode(true);
        let body = payload(false);
        let header = signed_header(TEST_SECRET, NOW, &body);

        let result = verifier.verify_and_parse_at(body.as_bytes(), &header, NOW);
        assert!(matches!(result, Err(WebhookError::LivemodeRequired)));
    }

    #[test]
    fn require_livemode_accepts_live_events() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET).with_require_livemode(true);
        let body = payload(true);
        let header = signed_header(TEST_SECRET, NOW, &body);

        let event = verifier
            .verify_and_parse_at(body.as_bytes(), &header, NOW)
            .unwrap();
        assert!(event.is_live());
    }

    #[test]
    fn verify_uses_wall_clock() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let body = payload(false);
        let now = chrono::Utc::now().timestamp();
        let header = signed_header(TEST_SECRET, now, &body);

        assert!(verifier.verify_and_parse(body.as_bytes(), &header).is_ok());
    }


    #[test]
    fn constant_time_compare_cases() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }
}
