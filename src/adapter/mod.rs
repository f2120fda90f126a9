//! Response adapter.
//!
//! The backend has been observed wrapping the same collection in half a dozen
//! envelopes (`[...]`, `{items: [...]}`, `{data: {docs: [...]}}`, ...) and naming
//! the same field several ways. Everything here is pure: raw JSON goes in,
//! canonical records come out, and nothing is ever missing from the output.

pub(crate) mod records;
pub(crate) mod schema;

pub use records::{normalize, FromCanonical, BLOG_STATUS, INQUIRY_STATUS, TESTIMONIAL_STATUS};
pub use schema::{
    normalize_record, resolve_image_url, AdapterContext, AliasSchema, CanonicalRecord, DatePart,
    FieldRule, FieldSpec, FieldValue, StatusTable,
};

use crate::models::EntityKind;
use serde_json::Value;

/// Envelope keys probed after the entity's own key, in priority order.
const GENERIC_LIST_KEYS: [&str; 4] = ["items", "results", "docs", "data"];

/// Keys probed under `data`, after `data.<entity>`.
const NESTED_LIST_KEYS: [&str; 3] = ["items", "results", "docs"];

/// Result of locating the entity array inside an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ListExtraction<'a> {
    pub items: &'a [Value],
    /// `false` when no known envelope matched; `items` is then empty.
    pub found: bool,
}

impl ListExtraction<'_> {
    fn missing() -> Self {
        ListExtraction {
            items: &[],
            found: false,
        }
    }
}

/// Ordered key paths tried by [`extract_list`]. The empty path is the payload itself.
pub fn list_paths(kind: EntityKind) -> Vec<Vec<&'static str>> {
    let mut paths: Vec<Vec<&'static str>> = vec![
        vec![],
        vec![kind.collection_key()],
        vec![kind.singular_key()],
    ];
    paths.extend(GENERIC_LIST_KEYS.iter().map(|k| vec![*k]));
    paths.push(vec!["data", kind.collection_key()]);
    paths.extend(NESTED_LIST_KEYS.iter().map(|k| vec!["data", *k]));
    paths
}

/// Finds the entity array in `payload`. The first matching path wins.
pub fn extract_list(payload: &Value, kind: EntityKind) -> ListExtraction<'_> {
    for path in list_paths(kind) {
        if let Some(Value::Array(items)) = value_at(payload, &path) {
            return ListExtraction {
                items: items.as_slice(),
                found: true,
            };
        }
    }
    ListExtraction::missing()
}

/// Finds a single resource object in `payload`.
///
/// Tries `<singular>`, `data.<singular>`, `data`, `result`, `item`, then the
/// payload itself. Returns `None` when the winner is not an object.
pub fn extract_single(payload: &Value, kind: EntityKind) -> Option<&Value> {
    let key = kind.singular_key();
    let candidates: [&[&str]; 5] = [&[key], &["data", key], &["data"], &["result"], &["item"]];

    for path in candidates {
        if let Some(found @ Value::Object(_)) = value_at(payload, path) {
            return Some(found);
        }
    }
    payload.is_object().then_some(payload)
}

pub(crate) fn value_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(payload, |v, key| v.get(*key))
}

/// Application-level failure inside an otherwise successful HTTP response.
pub fn has_failure_marker(body: &Value) -> bool {
    let is = |key: &str, expected: &Value| body.get(key) == Some(expected);
    is("success", &Value::Bool(false))
        || is("status", &Value::Bool(false))
        || is("status", &Value::String("fail".into()))
        || is("ok", &Value::Bool(false))
}

/// Most specific message the backend put in a body: `message`, then `error`.
pub fn body_message(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outer_wrapping_does_not_change_the_list() {
        let list = json!([{"id": 1}, {"id": 2}]);
        let keyed = json!({"appointments": list.clone()});
        let nested = json!({"data": {"items": list.clone()}});

        let bare = extract_list(&list, EntityKind::Appointments);
        assert!(bare.found);
        assert_eq!(bare, extract_list(&keyed, EntityKind::Appointments));
        assert_eq!(bare, extract_list(&nested, EntityKind::Appointments));
        assert_eq!(bare.items.len(), 2);
    }

    #[test]
    fn unknown_shape_is_not_found() {
        let payload = json!({"foo": "bar"});
        let out = extract_list(&payload, EntityKind::Faqs);
        assert!(!out.found);
        assert!(out.items.is_empty());

        assert!(!extract_list(&json!("text"), EntityKind::Faqs).found);
        assert!(!extract_list(&json!(null), EntityKind::Faqs).found);
    }

    #[test]
    fn nested_results() {
        let payload = json!({"data": {"results": [{"id": 1}]}});
        let out = extract_list(&payload, EntityKind::Blogs);
        assert!(out.found);
        assert_eq!(out.items, &[json!({"id": 1})]);
    }

    #[test]
    fn first_match_wins() {
        let payload = json!({
            "items": [{"id": "items"}],
            "faqs": [{"id": "faqs"}],
            "data": [{"id": "data"}],
        });
        let out = extract_list(&payload, EntityKind::Faqs);
        assert_eq!(out.items[0]["id"], "faqs");

        let payload = json!({"data": {"docs": [{"id": "docs"}]}, "results": [{"id": "results"}]});
        let out = extract_list(&payload, EntityKind::Faqs);
        assert_eq!(out.items[0]["id"], "results");
    }

    #[test]
    fn non_array_values_under_known_keys_are_skipped() {
        let payload = json!({"appointments": {"count": 2}, "data": {"appointments": [{"id": 9}]}});
        let out = extract_list(&payload, EntityKind::Appointments);
        assert!(out.found);
        assert_eq!(out.items[0]["id"], 9);
    }

    #[test]
    fn singular_key_is_accepted_for_lists() {
        let payload = json!({"appointment": [{"id": 1}]});
        let out = extract_list(&payload, EntityKind::Appointments);
        assert!(out.found);
    }

    #[test]
    fn single_resource_cascade() {
        let blog = json!({"id": 1, "title": "t"});
        assert_eq!(
            extract_single(&json!({"blog": blog.clone()}), EntityKind::Blogs),
            Some(&blog)
        );
        assert_eq!(
            extract_single(&json!({"data": {"blog": blog.clone()}}), EntityKind::Blogs),
            Some(&blog)
        );
        assert_eq!(
            extract_single(&json!({"data": blog.clone()}), EntityKind::Blogs),
            Some(&blog)
        );
        assert_eq!(
            extract_single(&json!({"result": blog.clone()}), EntityKind::Blogs),
            Some(&blog)
        );
        assert_eq!(
            extract_single(&json!({"item": blog.clone()}), EntityKind::Blogs),
            Some(&blog)
        );
        assert_eq!(extract_single(&blog, EntityKind::Blogs), Some(&blog));
        assert_eq!(extract_single(&json!([blog]), EntityKind::Blogs), None);
    }

    #[test]
    fn failure_markers() {
        assert!(has_failure_marker(&json!({"success": false})));
        assert!(has_failure_marker(&json!({"status": false})));
        assert!(has_failure_marker(&json!({"status": "fail"})));
        assert!(has_failure_marker(&json!({"ok": false})));

        assert!(!has_failure_marker(&json!({"success": true})));
        assert!(!has_failure_marker(&json!({"status": "ok"})));
        assert!(!has_failure_marker(&json!({"status": 200})));
        assert!(!has_failure_marker(&json!([])));
    }

    #[test]
    fn message_precedes_error() {
        assert_eq!(
            body_message(&json!({"error": "e", "message": "m"})).as_deref(),
            Some("m")
        );
        assert_eq!(body_message(&json!({"error": "e", "message": ""})).as_deref(), Some("e"));
        assert_eq!(body_message(&json!({"error": {"code": 1}})), None);
    }
}
