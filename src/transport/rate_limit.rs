use crate::domain::RateLimitInfo;

const LIMIT: &str = "x-rate-limit-limit";
const REMAINING: &str = "x-rate-limit-remaining";
const RESET: &str = "x-rate-limit-reset";
const RETRY_AFTER: &str = "retry-after";

/// Read rate-limit metadata; header names are matched case-insensitively and
/// unparsable values are ignored.
pub fn decode_rate_limit_headers(headers: &[(String, String)]) -> RateLimitInfo {
    let find = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    };

    RateLimitInfo {
        limit: find(LIMIT).and_then(|value| value.parse().ok()),
        remaining: find(REMAINING).and_then(|value| value.parse().ok()),
        reset: find(RESET).and_then(|value| value.parse().ok()),
        retry_after: find(RETRY_AFTER).and_then(|value| value.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn reads_all_headers() {
        let info = decode_rate_limit_headers(&headers(&[
            ("X-Rate-Limit-Limit", "100"),
            ("X-Rate-Limit-Remaining", "0"),
            ("X-Rate-Limit-Reset", "1700000060"),
            ("Retry-After", " 30 "),
        ]));
        assert_eq!(
            info,
            RateLimitInfo {
                limit: Some(100),
                remaining: Some(0),
                reset: Some(1_700_000_060),
                retry_after: Some(30),
            }
        );
    }

    #[test]
    fn ignores_missing_and_garbage() {
        let info = decode_rate_limit_headers(&headers(&[
            ("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT"),
            ("content-type", "application/json"),
        ]));
        assert_eq!(info, RateLimitInfo::default());
    }
}
