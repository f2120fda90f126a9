//! Bearer-token inspection.
//!
//! The dashboard never verifies signatures; it only reads the `exp` claim so an
//! expired session is dropped before any request is made with it. Anything that
//! cannot be read counts as expired.

use crate::config::CLOCK_SKEW_SECS;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Decodes the middle segment of a three-part token into JSON.
pub fn decode_payload(token: &str) -> Option<serde_json::Value> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return None;
    };

    // Accept both alphabets and optional padding.
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.is_object().then_some(value)
}

/// `exp` claim in seconds since the epoch.
pub fn expiry_secs(token: &str) -> Option<i64> {
    let exp = decode_payload(token)?.get("exp")?.as_f64()?.floor();
    // `as` saturates; anything outside i64 is garbage, not a far deadline.
    (exp.is_finite() && exp >= i64::MIN as f64 && exp < i64::MAX as f64).then_some(exp as i64)
}

pub fn is_expired_at(token: &str, now_secs: i64) -> bool {
    match expiry_secs(token) {
        Some(exp) => now_secs >= exp.saturating_sub(CLOCK_SKEW_SECS),
        None => true,
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, now_secs())
}

pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) fn make_token(exp: Option<i64>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = match exp {
        Some(exp) => serde_json::json!({"sub": "1", "exp": exp}),
        None => serde_json::json!({"sub": "1"}),
    };
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use rstest::rstest;

    const NOW: i64 = 1_700_000_000;

    #[rstest]
    #[case::empty("")]
    #[case::one_segment("abc")]
    #[case::two_segments("a.b")]
    #[case::four_segments("a.b.c.d")]
    #[case::not_base64("x.!!!!.y")]
    #[case::not_json("x.bm90IGpzb24.y")]
    fn malformed_tokens_are_expired(#[case] token: &str) {
        assert!(is_expired_at(token, NOW));
    }

    #[test]
    fn missing_or_non_numeric_exp_is_expired() {
        assert!(is_expired_at(&make_token(None), NOW));

        let payload = URL_SAFE_NO_PAD.encode(r#"{"exp":"soon"}"#);
        assert!(is_expired_at(&format!("h.{payload}.s"), NOW));
    }

    #[rstest]
    #[case::huge_negative(r#"{"exp":-1e300}"#)]
    #[case::huge_positive(r#"{"exp":1e300}"#)]
    #[case::at_i64_min(r#"{"exp":-9223372036854775808}"#)]
    fn out_of_range_exp_is_expired(#[case] claims: &str) {
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(claims));
        assert!(is_expired_at(&token, NOW));
    }

    #[test]
    fn past_expiry_is_expired() {
        assert!(is_expired_at(&make_token(Some(NOW - 600)), NOW));
    }

    #[test]
    fn skew_window_counts_as_expired() {
        assert!(is_expired_at(&make_token(Some(NOW + 10)), NOW));
        assert!(is_expired_at(&make_token(Some(NOW + CLOCK_SKEW_SECS)), NOW));
        assert!(!is_expired_at(&make_token(Some(NOW + CLOCK_SKEW_SECS + 1)), NOW));
    }

    #[test]
    fn future_expiry_is_valid() {
        assert!(!is_expired_at(&make_token(Some(NOW + 3600)), NOW));
        assert!(!is_expired(&make_token(Some(now_secs() + 3600))));
    }

    #[test]
    fn padded_standard_alphabet_payload_decodes() {
        let payload = STANDARD.encode(r#"{"exp":1700003600,"n":"??>"}"#);
        assert!(payload.ends_with('=') || payload.contains('+') || payload.contains('/'));
        let token = format!("h.{payload}.s");
        assert_eq!(expiry_secs(&token), Some(1_700_003_600));
    }
}
