//! Request DTOs for the blob API.

use serde_json::Value;
use std::collections::HashMap;

/// Default page size for listings.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Delete request body.
///
/// `path` wins over `filename`; non-string values are ignored.
#[derive(Debug, Default)]
pub struct DeleteRequest {
    /// Path relative to the blob root.
    pub path: Option<Value>,
    /// Legacy alias for `path`.
    pub filename: Option<Value>,
}

impl DeleteRequest {
    /// Parse a JSON body. Only a JSON object is a request; arrays, scalars
    /// and malformed JSON yield `None`.
    pub fn from_json(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(body).ok()? {
            Value::Object(mut fields) => Some(Self {
                path: fields.remove("path"),
                filename: fields.remove("filename"),
            }),
            _ => None,
        }
    }

    /// The requested blob path, if any string was supplied.
    pub fn target(&self) -> Option<&str> {
        self.path
            .as_ref()
            .and_then(Value::as_str)
            .or_else(|| self.filename.as_ref().and_then(Value::as_str))
    }
}

/// List query parameters.
///
/// Kept as raw strings so malformed numbers never reject the request.
#[derive(Debug, Default)]
pub struct ListQuery {
    /// Folder to list, empty for the root.
    pub folder: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub per_page: Option<String>,
}

impl From<HashMap<String, String>> for ListQuery {
    /// Build from decoded query pairs. A repeated name keeps its last value.
    fn from(mut params: HashMap<String, String>) -> Self {
        Self {
            folder: params.remove("folder"),
            page: params.remove("page"),
            per_page: params.remove("per_page"),
        }
    }
}

impl ListQuery {
    /// Page number, at least 1.
    pub fn page(&self) -> u32 {
        Self::at_least_one(self.page.as_deref(), 1)
    }

    /// Page size, at least 1.
    pub fn per_page(&self) -> u32 {
        Self::at_least_one(self.per_page.as_deref(), DEFAULT_PER_PAGE)
    }

    fn at_least_one(raw: Option<&str>, default: u32) -> u32 {
        raw.map(parse_int_prefix)
            .unwrap_or(i64::from(default))
            .clamp(1, i64::from(u32::MAX)) as u32
    }
}

/// Integer value of the leading `[+-]digits` of `s`, 0 if there are none.
fn parse_int_prefix(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    let value = digits
        .chars()
        .fold(0i64, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(c as u8 - b'0'))
        });

    if negative {
        -value
    } else {
        value
    }
}
