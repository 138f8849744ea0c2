use crate::types::*;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, matching
/// `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decode an optional URL-encoded JSON payload.
///
/// Never panics. An absent payload is [`DecodeFailure::Missing`]; any
/// escape, UTF-8 or JSON problem is [`DecodeFailure::ParseError`]. A
/// successful decode is handed back without schema checks.
pub fn decode_payload(raw: Option<&str>) -> DecodeOutcome {
    let Some(raw) = raw else {
        return DecodeOutcome::Failure(DecodeFailure::Missing);
    };

    match parse_payload(raw) {
        Ok(record) => DecodeOutcome::Success(record),
        Err(kind) => DecodeOutcome::Failure(DecodeFailure::ParseError(kind)),
    }
}

/// Serialize `value` to JSON and percent-encode it for a query string.
pub fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<String, PayloadError> {
    let json = serde_json::to_string(value)?;
    Ok(utf8_percent_encode(&json, URI_COMPONENT).to_string())
}

fn parse_payload(raw: &str) -> Result<ProfileRecord, ParseErrorKind> {
    check_escapes(raw)?;

    let text = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ParseErrorKind::InvalidUtf8)?;

    let value: Value = serde_json::from_str(&text).map_err(|e| ParseErrorKind::InvalidJson {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;

    Ok(ProfileRecord::new(value))
}

// percent_decode_str passes stray '%' through, decodeURIComponent rejects them.
fn check_escapes(raw: &str) -> Result<(), ParseErrorKind> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1..i + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
            _ => return Err(ParseErrorKind::MalformedEscape { offset: i }),
        }
    }
    Ok(())
}
