use crate::models::RecordId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Case-insensitive synonym table for status-like fields.
#[derive(Debug)]
pub struct StatusTable {
    pub synonyms: &'static [(&'static str, &'static str)],
    pub default: &'static str,
}

impl StatusTable {
    pub fn canonical(&self, raw: Option<&str>) -> &'static str {
        let needle = raw.unwrap_or_default().trim().to_lowercase();
        self.synonyms
            .iter()
            .find(|(synonym, _)| *synonym == needle)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Time,
}

/// How one canonical field is resolved from a raw object.
#[derive(Debug)]
pub enum FieldRule {
    Id {
        aliases: &'static [&'static str],
    },
    Text {
        aliases: &'static [&'static str],
        fallback: &'static str,
    },
    /// `first + " " + last`, else a full-name alias, else `fallback`.
    FullName {
        first: &'static [&'static str],
        last: &'static [&'static str],
        aliases: &'static [&'static str],
        fallback: &'static str,
    },
    /// Zero and non-finite values resolve to `fallback`.
    Number {
        aliases: &'static [&'static str],
        fallback: f64,
    },
    Status {
        aliases: &'static [&'static str],
        table: &'static StatusTable,
    },
    Image {
        aliases: &'static [&'static str],
    },
    /// Leading `YYYY-MM-DD` of whatever date string the backend sent.
    DatePrefix {
        aliases: &'static [&'static str],
    },
    /// Parsed timestamp rendered as a date or a time of day.
    ///
    /// Always UTC, so the same record reads the same for every admin
    /// regardless of the browser's zone. Offsetless inputs are taken as UTC.
    Timestamp {
        aliases: &'static [&'static str],
        part: DatePart,
    },
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: FieldRule,
}

/// Canonical field list for one entity kind.
#[derive(Debug)]
pub struct AliasSchema {
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Id(Option<RecordId>),
    Text(String),
    Number(f64),
    Url(Option<String>),
}

/// Every field of the schema, resolved. Keys are never missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalRecord {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl CanonicalRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn take_id(&mut self, name: &str) -> Option<RecordId> {
        match self.fields.remove(name) {
            Some(FieldValue::Id(id)) => id,
            _ => None,
        }
    }

    pub fn take_text(&mut self, name: &str) -> String {
        match self.fields.remove(name) {
            Some(FieldValue::Text(s)) => s,
            _ => String::new(),
        }
    }

    pub fn take_number(&mut self, name: &str) -> f64 {
        match self.fields.remove(name) {
            Some(FieldValue::Number(n)) => n,
            _ => 0.0,
        }
    }

    pub fn take_url(&mut self, name: &str) -> Option<String> {
        match self.fields.remove(name) {
            Some(FieldValue::Url(url)) => url,
            _ => None,
        }
    }
}

/// Inputs the adapter needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterContext {
    /// Prefix for relative image keys, e.g. `https://api.example.com/uploads/`.
    pub asset_base: String,
}

impl AdapterContext {
    pub fn new(asset_base: impl Into<String>) -> Self {
        Self {
            asset_base: asset_base.into(),
        }
    }
}

pub fn normalize_record(raw: &Value, schema: &AliasSchema, ctx: &AdapterContext) -> CanonicalRecord {
    let fields = schema
        .fields
        .iter()
        .map(|spec| (spec.name, resolve(raw, &spec.rule, ctx)))
        .collect();
    CanonicalRecord { fields }
}

fn resolve(raw: &Value, rule: &FieldRule, ctx: &AdapterContext) -> FieldValue {
    match rule {
        FieldRule::Id { aliases } => FieldValue::Id(
            aliases
                .iter()
                .find_map(|k| raw.get(*k).and_then(RecordId::from_value)),
        ),
        FieldRule::Text { aliases, fallback } => {
            FieldValue::Text(first_text(raw, aliases).unwrap_or_else(|| fallback.to_string()))
        }
        FieldRule::FullName {
            first,
            last,
            aliases,
            fallback,
        } => {
            let joined = format!(
                "{} {}",
                first_text(raw, first).unwrap_or_default(),
                first_text(raw, last).unwrap_or_default()
            );
            let joined = joined.trim();
            let name = if joined.is_empty() {
                first_text(raw, aliases).unwrap_or_else(|| fallback.to_string())
            } else {
                joined.to_string()
            };
            FieldValue::Text(name)
        }
        FieldRule::Number { aliases, fallback } => {
            let n = aliases
                .iter()
                .find_map(|k| raw.get(*k).filter(|v| !v.is_null()))
                .map(coerce_number)
                .unwrap_or(0.0);
            FieldValue::Number(if n.is_finite() && n != 0.0 { n } else { *fallback })
        }
        FieldRule::Status { aliases, table } => FieldValue::Text(
            table
                .canonical(first_text(raw, aliases).as_deref())
                .to_string(),
        ),
        FieldRule::Image { aliases } => FieldValue::Url(resolve_image_url(
            first_text(raw, aliases).as_deref(),
            &ctx.asset_base,
        )),
        FieldRule::DatePrefix { aliases } => FieldValue::Text(
            first_text(raw, aliases)
                .map(|s| s.chars().take(10).collect())
                .unwrap_or_default(),
        ),
        FieldRule::Timestamp { aliases, part } => {
            let parsed = aliases
                .iter()
                .find_map(|k| raw.get(*k).filter(|v| is_present(v)))
                .and_then(parse_timestamp);
            let text = match (parsed, part) {
                (Some(ts), DatePart::Date) => ts.format("%Y-%m-%d").to_string(),
                (Some(ts), DatePart::Time) => ts.format("%H:%M").to_string(),
                (None, _) => String::new(),
            };
            FieldValue::Text(text)
        }
    }
}

fn is_present(v: &Value) -> bool {
    match v {
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(_) => true,
        _ => false,
    }
}

/// First alias holding a non-empty string or a number (stringified).
fn first_text(raw: &Value, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|k| match raw.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn coerce_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        _ => f64::NAN,
    }
}

fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

/// Absolute URLs and data URIs pass through; anything else is a storage key
/// under `asset_base`. Empty input yields `None`.
pub fn resolve_image_url(raw: Option<&str>, asset_base: &str) -> Option<String> {
    let value = raw.map(str::trim).filter(|s| !s.is_empty())?;
    if value.starts_with("http://") || value.starts_with("https://") || value.starts_with("data:") {
        return Some(value.to_string());
    }
    Some(format!("{asset_base}{}", value.trim_start_matches('/')))
}
