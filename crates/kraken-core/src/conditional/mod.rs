//! Conditional GET: `ETag` / `Last-Modified` validators and the 304 decision.
//!
//! Evaluation follows RFC 7232 precedence. When `If-None-Match` is present
//! it alone decides; otherwise `If-Modified-Since` is compared against the
//! resource's modification time at one-second precision.

mod etag;
mod http_date;

pub use etag::etag_for;
pub use http_date::{format_http_date, parse_http_date};

use chrono::{DateTime, SubsecRound, Utc};
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Validators describing the current version of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    /// Strong, quoted entity tag.
    pub etag: String,
    /// Modification time truncated to whole seconds.
    pub last_modified: DateTime<Utc>,
}

impl Validators {
    pub fn for_file(path: &Path, meta: &Metadata) -> Self {
        let modified = meta.modified().unwrap_or(UNIX_EPOCH);
        let last_modified = DateTime::<Utc>::from(modified).trunc_subsecs(0);
        Self {
            etag: etag_for(path, meta.len(), last_modified.timestamp()),
            last_modified,
        }
    }

    /// `Last-Modified` header value.
    pub fn last_modified_header(&self) -> String {
        format_http_date(self.last_modified)
    }
}

/// Validators sent by the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preconditions<'a> {
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

/// True when the client's copy is current and the answer is 304.
pub fn is_not_modified(current: &Validators, pre: &Preconditions<'_>) -> bool {
    if let Some(if_none_match) = pre.if_none_match {
        return etag_list_matches(if_none_match, &current.etag);
    }
    if let Some(since) = pre.if_modified_since.and_then(parse_http_date) {
        return current.last_modified <= since;
    }
    false
}

/// Weak comparison of `etag` against an `If-None-Match` list.
fn etag_list_matches(header: &str, etag: &str) -> bool {
    let header = header.trim();
    if header == "*" {
        return true;
    }
    let ours = strip_weak(etag);
    header
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .any(|t| strip_weak(t) == ours)
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn current() -> Validators {
        Validators {
            etag: "\"abc123\"".to_string(),
            last_modified: Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap(),
        }
    }

    #[test]
    fn no_preconditions_means_full_response() {
        assert!(!is_not_modified(&current(), &Preconditions::default()));
    }

    #[test]
    fn matching_etag() {
        let pre = Preconditions {
            if_none_match: Some("\"abc123\""),
            ..Default::default()
        };
        assert!(is_not_modified(&current(), &pre));
    }

    #[test]
    fn etag_lists_wildcard_and_weak_tags() {
        for header in ["\"zzz\", \"abc123\"", "*", "W/\"abc123\""] {
            let pre = Preconditions {
                if_none_match: Some(header),
                ..Default::default()
            };
            assert!(is_not_modified(&current(), &pre), "header={header}");
        }
    }

    #[test]
    fn mismatched_etag_wins_over_matching_date() {
        let pre = Preconditions {
            if_none_match: Some("\"other\""),
            if_modified_since: Some("Wed, 21 Oct 2015 07:28:00 GMT"),
        };
        assert!(!is_not_modified(&current(), &pre));
    }

    #[test]
    fn both_validators_matching() {
        let pre = Preconditions {
            if_none_match: Some("\"abc123\""),
            if_modified_since: Some("Wed, 21 Oct 2015 07:28:00 GMT"),
        };
        assert!(is_not_modified(&current(), &pre));
    }

    #[test]
    fn modified_since_comparison() {
        let at = |s| Preconditions {
            if_modified_since: Some(s),
            ..Default::default()
        };
        assert!(is_not_modified(&current(), &at("Wed, 21 Oct 2015 07:28:00 GMT")));
        assert!(is_not_modified(&current(), &at("Thu, 22 Oct 2015 00:00:00 GMT")));
        assert!(!is_not_modified(&current(), &at("Wed, 21 Oct 2015 07:27:59 GMT")));
        assert!(!is_not_modified(&current(), &at("not a date")));
    }

    #[test]
    fn validators_for_file_roundtrip_through_header() {
        let f = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(f.path(), b"0123456789").unwrap();
        let meta = std::fs::metadata(f.path()).unwrap();
        let v = Validators::for_file(f.path(), &meta);
        assert!(v.etag.starts_with('"') && v.etag.ends_with('"'));

        let header = v.last_modified_header();
        let pre = Preconditions {
            if_modified_since: Some(&header),
            ..Default::default()
        };
        assert!(is_not_modified(&v, &pre));
    }
}
