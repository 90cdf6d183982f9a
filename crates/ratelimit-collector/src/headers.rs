//! Rate-limit header parsing
//!
//! The registry reports quota as `RateLimit-Limit: 100;m21600`, i.e. the
//! request count followed by a `;`-separated window descriptor. Only the
//! leading number is kept.

use reqwest::header::HeaderMap;

use crate::error::{Error, Result};
use crate::snapshot::QuotaObservation;

pub const LIMIT_HEADER: &str = "ratelimit-limit";
pub const REMAINING_HEADER: &str = "ratelimit-remaining";
/// Optional; names the address the quota is accounted against
pub const SOURCE_HEADER: &str = "docker-ratelimit-source";

/// Parse the leading number of a `<number>;<window>` header value.
///
/// Non-finite values (`inf`, `NaN`) are rejected along with anything else
/// that does not parse as a float.
pub fn parse_quota_value(header: &'static str, raw: &str) -> Result<f64> {
    let number = raw.split(';').next().unwrap_or_default().trim();
    let invalid = |reason: String| Error::InvalidHeader {
        header,
        value: raw.to_owned(),
        reason,
    };

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(invalid("not a finite number".into())),
        Err(e) => Err(invalid(e.to_string())),
    }
}

fn required(headers: &HeaderMap, name: &'static str) -> Result<f64> {
    let value = headers.get(name).ok_or(Error::MissingHeader(name))?;
    let raw = value.to_str().map_err(|e| Error::InvalidHeader {
        header: name,
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        reason: e.to_string(),
    })?;
    parse_quota_value(name, raw)
}

/// Build an observation from a quota response's headers.
///
/// Both quota headers must be present and valid; there is no partial
/// result.
pub fn parse_quota(headers: &HeaderMap) -> Result<QuotaObservation> {
    let limit = required(headers, LIMIT_HEADER)?;
    let remaining = required(headers, REMAINING_HEADER)?;
    let source = headers
        .get(SOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    Ok(QuotaObservation {
        limit,
        remaining,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn parses_leading_number() {
        assert_eq!(parse_quota_value(LIMIT_HEADER, "100;w=21600").unwrap(), 100.0);
        assert_eq!(parse_quota_value(LIMIT_HEADER, "76;m21600").unwrap(), 76.0);
        assert_eq!(parse_quota_value(LIMIT_HEADER, "  42  ").unwrap(), 42.0);
        assert_eq!(parse_quota_value(LIMIT_HEADER, "0").unwrap(), 0.0);
    }

    #[test]
    fn window_descriptor_is_ignored() {
        assert_eq!(
            parse_quota_value(REMAINING_HEADER, "5;w=21600;comment=\"x\"").unwrap(),
            5.0
        );
    }

    #[test]
    fn rejects_unparsable_values() {
        for raw in ["", ";w=21600", "abc;w=21600", "1O0", "inf", "NaN;w=1"] {
            let err = parse_quota_value(LIMIT_HEADER, raw).unwrap_err();
            assert!(
                matches!(err, Error::InvalidHeader { header: LIMIT_HEADER, .. }),
                "{raw:?} gave {err}"
            );
        }
    }

    #[test]
    fn parses_full_header_set() {
        let map = headers(&[
            ("ratelimit-limit", "100;w=21600"),
            ("ratelimit-remaining", "76;w=21600"),
            ("docker-ratelimit-source", "203.0.113.7"),
        ]);
        let observation = parse_quota(&map).unwrap();
        assert_eq!(observation.limit, 100.0);
        assert_eq!(observation.remaining, 76.0);
        assert_eq!(observation.source.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn source_is_optional() {
        let map = headers(&[
            ("ratelimit-limit", "100;w=21600"),
            ("ratelimit-remaining", "76;w=21600"),
        ]);
        assert_eq!(parse_quota(&map).unwrap().source, None);

        let map = headers(&[
            ("ratelimit-limit", "100;w=21600"),
            ("ratelimit-remaining", "76;w=21600"),
            ("docker-ratelimit-source", "  "),
        ]);
        assert_eq!(parse_quota(&map).unwrap().source, None);
    }

    #[test]
    fn no_headers_is_missing_limit() {
        let err = parse_quota(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingHeader(LIMIT_HEADER)), "got: {err}");
    }

    #[test]
    fn limit_without_remaining_fails() {
        let map = headers(&[("ratelimit-limit", "100;w=21600")]);
        let err = parse_quota(&map).unwrap_err();
        assert!(
            matches!(err, Error::MissingHeader(REMAINING_HEADER)),
            "got: {err}"
        );
    }

    #[test]
    fn invalid_remaining_fails_whole_parse() {
        let map = headers(&[
            ("ratelimit-limit", "100;w=21600"),
            ("ratelimit-remaining", "lots;w=21600"),
        ]);
        assert!(matches!(
            parse_quota(&map),
            Err(Error::InvalidHeader {
                header: REMAINING_HEADER,
                ..
            })
        ));
    }

    #[test]
    fn non_ascii_value_is_invalid() {
        let mut map = headers(&[("ratelimit-remaining", "76;w=21600")]);
        map.insert(
            LIMIT_HEADER,
            HeaderValue::from_bytes(b"10\xff0;w=1").unwrap(),
        );
        assert!(matches!(
            parse_quota(&map),
            Err(Error::InvalidHeader {
                header: LIMIT_HEADER,
                ..
            })
        ));
    }
}
