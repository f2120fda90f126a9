use crate::models::{EntityKind, RecordId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Tokens whose `exp` falls within this many seconds are already treated as expired.
pub const CLOCK_SKEW_SECS: i64 = 30;

/// Upper bound on each session verification call during bootstrap.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

pub const LOGIN_ROUTE: &str = "/login";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        // Deployments inject `window.ENV.API_URL`; `api_url` is accepted too.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    for key in ["API_URL", "api_url"] {
                        if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                            if let Some(url_str) = api_url.as_string() {
                                if !url_str.trim().is_empty() {
                                    return Self::with_api_url(&url_str);
                                }
                            }
                        }
                    }
                }
            }
        }

        Self::with_api_url(DEFAULT_API_URL)
    }

    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_base(&self.api_url)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute URLs for every backend call the dashboard makes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub base: String,
    pub appointments: String,
    pub blogs: String,
    pub testimonials: String,
    pub faqs: String,
    pub inquiries: String,
    pub login: String,
    pub change_password: String,
    pub dashboard_stats: String,
    /// Prefix for relative image keys returned by the backend.
    pub uploads: String,
    /// Tried in order by session verification.
    pub verify_candidates: Vec<String>,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Self {
        let base = base.trim().trim_end_matches('/').to_string();
        let api = |path: &str| format!("{base}/api/{path}");

        Self {
            appointments: api("appointments"),
            blogs: api("blogs"),
            testimonials: api("testimonials"),
            faqs: api("faqs"),
            inquiries: api("inquiries"),
            login: api("admin/login"),
            change_password: api("admin/change-password"),
            dashboard_stats: api("dashboard/stats"),
            uploads: format!("{base}/uploads/"),
            verify_candidates: vec![
                api("admin/me"),
                api("admin/profile"),
                api("dashboard/stats"),
            ],
            base,
        }
    }

    pub fn collection(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Appointments => &self.appointments,
            EntityKind::Blogs => &self.blogs,
            EntityKind::Testimonials => &self.testimonials,
            EntityKind::Faqs => &self.faqs,
            EntityKind::Inquiries => &self.inquiries,
        }
    }

    pub fn item(&self, kind: EntityKind, id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.collection(kind),
            urlencoding::encode(&id.to_string())
        )
    }
}
