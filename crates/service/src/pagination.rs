//! Pagination utilities for service layer
//!
//! Pages walk a key-ordered result set. The position is carried between
//! requests as an opaque token: URL-safe base64 of the JSON key object,
//! e.g. `{"CompetencyId":"12"}`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Pagination parameters as received from the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// maximum items per page; `None` returns everything after the start key
    pub limit: Option<u32>,
    /// token returned as `last_evaluated_key` by the previous page
    pub exclusive_start_key: Option<String>,
}

impl PageRequest {
    /// Parse raw query values. Empty strings count as absent.
    pub fn from_query(limit: Option<&str>, start_key: Option<&str>) -> Result<Self, ServiceError> {
        let limit = match limit.map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ServiceError::Validation(
                        "Limit must be a positive number if it is provided".into(),
                    ))
                }
            },
        };
        let exclusive_start_key = start_key.filter(|s| !s.is_empty()).map(str::to_string);
        Ok(Self { limit, exclusive_start_key })
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Page<T> {
    #[serde(rename = "Items")]
    pub items: Vec<T>,
    #[serde(rename = "LastEvaluatedKey", skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<String>,
}

pub fn encode_start_key(attr: &str, key: &str) -> String {
    let mut obj = Map::new();
    obj.insert(attr.to_string(), Value::String(key.to_string()));
    URL_SAFE_NO_PAD.encode(Value::Object(obj).to_string())
}

pub fn decode_start_key(attr: &str, token: &str) -> Result<String, ServiceError> {
    let invalid = || ServiceError::Validation("ExclusiveStartKey is not a valid pagination token".into());
    let bytes = URL_SAFE_NO_PAD.decode(token.trim_end_matches('=')).map_err(|_| invalid())?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
    value
        .get(attr)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(invalid)
}

/// Slice a key-ordered result set according to `req`.
pub fn paginate<T>(items: Vec<(String, T)>, req: &PageRequest, key_attr: &str) -> Result<Page<T>, ServiceError> {
    let start = req
        .exclusive_start_key
        .as_deref()
        .map(|t| decode_start_key(key_attr, t))
        .transpose()?;

    let mut rest = items
        .into_iter()
        .filter(|(k, _)| start.as_deref().map_or(true, |s| k.as_str() > s))
        .peekable();

    let limit = req.limit.map(|n| n as usize).unwrap_or(usize::MAX);
    let mut page = Vec::new();
    let mut last_key = None;
    while page.len() < limit {
        match rest.next() {
            Some((k, v)) => {
                last_key = Some(k);
                page.push(v);
            }
            None => break,
        }
    }

    let last_evaluated_key = match (rest.peek(), last_key) {
        (Some(_), Some(k)) => Some(encode_start_key(key_attr, &k)),
        _ => None,
    };
    Ok(Page { items: page, last_evaluated_key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: u32) -> Vec<(String, u32)> {
        (1..=n).map(|i| (format!("{i:02}"), i)).collect()
    }

    #[test]
    fn limit_must_be_positive() {
        assert!(PageRequest::from_query(Some("0"), None).is_err());
        assert!(PageRequest::from_query(Some("-3"), None).is_err());
        assert!(PageRequest::from_query(Some("ten"), None).is_err());
        assert_eq!(PageRequest::from_query(Some(""), Some("")).unwrap(), PageRequest::default());
        assert_eq!(PageRequest::from_query(Some("5"), None).unwrap().limit, Some(5));
    }

    #[test]
    fn walks_all_pages() {
        let mut req = PageRequest { limit: Some(2), exclusive_start_key: None };
        let mut seen = Vec::new();
        loop {
            let page = paginate(rows(5), &req, "CompetencyId").unwrap();
            seen.extend(page.items);
            match page.last_evaluated_key {
                Some(t) => req.exclusive_start_key = Some(t),
                None => break,
            }
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn exact_fit_has_no_continuation() {
        let page = paginate(rows(2), &PageRequest { limit: Some(2), exclusive_start_key: None }, "K").unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.last_evaluated_key.is_none());
    }

    #[test]
    fn token_round_trips_and_rejects_garbage() {
        let t = encode_start_key("CompetencyId", "12");
        assert_eq!(decode_start_key("CompetencyId", &t).unwrap(), "12");
        assert!(decode_start_key("Other", &t).is_err());
        assert!(decode_start_key("CompetencyId", "%%%").is_err());
    }

    #[test]
    fn page_serializes_with_table_style_names() {
        let page = Page { items: vec![1], last_evaluated_key: None };
        assert_eq!(serde_json::to_value(&page).unwrap(), serde_json::json!({"Items": [1]}));
    }
}
