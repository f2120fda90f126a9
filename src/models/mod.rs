use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// Identifier as the backend sends it.
///
/// Relational backends hand out integers, document stores hand out `_id`
/// strings. Both are kept verbatim so they can be echoed back in paths.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Reads an id out of a raw JSON value. Empty strings and non-integral
    /// numbers are not ids.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(RecordId::Number),
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                Some(RecordId::Text(s.trim().to_string()))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

/// Display profile of the signed-in administrator.
///
/// Persisted as JSON under the `user` storage key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AdminUser {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// The resource collections the dashboard manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum EntityKind {
    #[strum(serialize = "appointments")]
    Appointments,
    #[strum(serialize = "blogs")]
    Blogs,
    #[strum(serialize = "testimonials")]
    Testimonials,
    #[strum(serialize = "faqs")]
    Faqs,
    #[strum(serialize = "inquiries")]
    Inquiries,
}

impl EntityKind {
    /// Envelope key holding the collection, e.g. `{"appointments": [...]}`.
    pub fn collection_key(self) -> &'static str {
        match self {
            EntityKind::Appointments => "appointments",
            EntityKind::Blogs => "blogs",
            EntityKind::Testimonials => "testimonials",
            EntityKind::Faqs => "faqs",
            EntityKind::Inquiries => "inquiries",
        }
    }

    /// Singular envelope key, used for single-resource payloads and by
    /// backends that name the array in the singular.
    pub fn singular_key(self) -> &'static str {
        match self {
            EntityKind::Appointments => "appointment",
            EntityKind::Blogs => "blog",
            EntityKind::Testimonials => "testimonial",
            EntityKind::Faqs => "faq",
            EntityKind::Inquiries => "inquiry",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Appointments => "Appointments",
            EntityKind::Blogs => "Blogs",
            EntityKind::Testimonials => "Testimonials",
            EntityKind::Faqs => "FAQs",
            EntityKind::Inquiries => "Inquiries",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub treatment_type: String,
    pub city: String,
    /// Display name: first + last, else a full-name alias, else `Unknown`.
    pub patient: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Option<RecordId>,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub date: String,
    pub status: String,
    pub views: f64,
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: Option<RecordId>,
    pub patient: String,
    pub rating: f64,
    pub date: String,
    pub status: String,
    pub comment: String,
    pub likes: f64,
    pub image: Option<String>,
    pub youtube_link: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Faq {
    pub id: Option<RecordId>,
    pub question: String,
    pub answer: String,
    pub category: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Inquiry {
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    /// `YYYY-MM-DD`, empty when the source date did not parse.
    pub date: String,
    /// `HH:MM`, empty when the source date did not parse.
    pub time: String,
    pub status: String,
}
