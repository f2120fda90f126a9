//! Form drafts and the checks they must pass before anything is sent.

use crate::adapter::records::PUBLISHED;
use crate::adapter::{BLOG_STATUS, TESTIMONIAL_STATUS};
use crate::api::{ApiError, FormValue};
use serde_json::{json, Value};
use url::Url;

pub const FAQ_CATEGORIES: [&str; 4] = ["General", "Surgery", "Treatment", "Appointment"];

const PATIENT_MIN: usize = 3;
const PATIENT_MAX: usize = 50;
const COMMENT_MIN: usize = 10;
const COMMENT_MAX: usize = 500;
const QUESTION_MIN: usize = 10;
const ANSWER_MIN: usize = 20;
const OLD_PASSWORD_MIN: usize = 6;
const NEW_PASSWORD_MIN: usize = 8;
const NEW_PASSWORD_MAX: usize = 20;

const YOUTUBE_HOST: &str = "www.youtube.com";

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError::Validation(message.into())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// File picked in a form, ready for a multipart part.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    fn to_form_value(&self) -> FormValue {
        FormValue::File {
            file_name: self.file_name.clone(),
            mime: self.mime.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TestimonialDraft {
    pub patient: String,
    pub rating: f64,
    pub comment: String,
    pub status: String,
    pub youtube_link: String,
    pub image: Option<ImageUpload>,
}

impl Default for TestimonialDraft {
    fn default() -> Self {
        Self {
            patient: String::new(),
            rating: 5.0,
            comment: String::new(),
            status: TESTIMONIAL_STATUS.default.to_string(),
            youtube_link: String::new(),
            image: None,
        }
    }
}

impl TestimonialDraft {
    /// `creating` is false when updating an existing testimonial, which
    /// keeps its current image if none is attached.
    pub fn validate(&self, creating: bool) -> Result<(), ApiError> {
        let patient = self.patient.trim();
        let comment = self.comment.trim();

        if patient.is_empty() {
            return Err(invalid("Patient name is required."));
        }
        if char_len(patient) < PATIENT_MIN {
            return Err(invalid(format!(
                "Patient name must be at least {PATIENT_MIN} characters."
            )));
        }
        if char_len(patient) > PATIENT_MAX {
            return Err(invalid(format!(
                "Patient name cannot be more than {PATIENT_MAX} characters."
            )));
        }
        if comment.is_empty() {
            return Err(invalid("Comment is required."));
        }
        if char_len(comment) < COMMENT_MIN {
            return Err(invalid(format!(
                "Comment must be at least {COMMENT_MIN} characters."
            )));
        }
        if char_len(comment) > COMMENT_MAX {
            return Err(invalid(format!(
                "Comment cannot be more than {COMMENT_MAX} characters."
            )));
        }
        if !self.rating.is_finite() || !(1.0..=5.0).contains(&self.rating) {
            return Err(invalid("Rating must be between 1 and 5."));
        }
        if creating && self.image.is_none() {
            return Err(invalid("Patient image is required."));
        }
        if !is_youtube_watch_url(&self.youtube_link) {
            return Err(invalid(
                "Invalid YouTube URL. Use this format: https://www.youtube.com/watch?v=VIDEO_ID",
            ));
        }
        Ok(())
    }

    pub fn is_published(&self) -> bool {
        TESTIMONIAL_STATUS.canonical(Some(self.status.as_str())) == PUBLISHED
    }

    pub(crate) fn to_multipart(&self) -> Vec<(String, FormValue)> {
        let flag = if self.is_published() { "true" } else { "" };
        let text = |name: &str, value: &str| (name.to_string(), FormValue::Text(value.to_string()));

        let mut fields = vec![
            text("patient", self.patient.trim()),
            text("rating", &self.rating.to_string()),
            text("comment", self.comment.trim()),
            text("status", TESTIMONIAL_STATUS.canonical(Some(self.status.as_str()))),
            text("isPublished", flag),
            text("published", flag),
            text("approved", flag),
        ];
        let youtube = self.youtube_link.trim();
        if !youtube.is_empty() {
            fields.push(text("youtubeLink", youtube));
        }
        if let Some(image) = &self.image {
            fields.push(("image".to_string(), image.to_form_value()));
        }
        fields
    }
}

/// Empty is allowed. Otherwise only `https://www.youtube.com/watch?v=<id>`
/// with an 11-character video id.
pub fn is_youtube_watch_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return true;
    }
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if url.scheme() != "https" || url.host_str() != Some(YOUTUBE_HOST) || url.path() != "/watch" {
        return false;
    }

    url.query_pairs()
        .find(|(key, _)| key == "v")
        .is_some_and(|(_, id)| {
            id.len() == 11
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaqDraft {
    pub question: String,
    pub answer: String,
    pub category: String,
}

impl Default for FaqDraft {
    fn default() -> Self {
        Self {
            question: String::new(),
            answer: String::new(),
            category: FAQ_CATEGORIES[0].to_string(),
        }
    }
}

impl FaqDraft {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !FAQ_CATEGORIES.contains(&self.category.as_str()) {
            return Err(invalid("Please select a valid category."));
        }
        let question = self.question.trim();
        if question.is_empty() {
            return Err(invalid("Question is required."));
        }
        if char_len(question) < QUESTION_MIN {
            return Err(invalid(format!(
                "Question must be at least {QUESTION_MIN} characters."
            )));
        }
        let answer = self.answer.trim();
        if answer.is_empty() {
            return Err(invalid("Answer is required."));
        }
        if char_len(answer) < ANSWER_MIN {
            return Err(invalid(format!(
                "Answer must be at least {ANSWER_MIN} characters."
            )));
        }
        Ok(())
    }

    pub(crate) fn to_json(&self) -> Value {
        json!({
            "question": self.question.trim(),
            "answer": self.answer.trim(),
            "category": self.category,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlogDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub status: String,
    pub image: Option<ImageUpload>,
}

impl Default for BlogDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            excerpt: String::new(),
            content: String::new(),
            author: "Admin".to_string(),
            status: BLOG_STATUS.default.to_string(),
            image: None,
        }
    }
}

impl BlogDraft {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (value, label) in [
            (&self.title, "Title"),
            (&self.excerpt, "Excerpt"),
            (&self.content, "Content"),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{label} is required.")));
            }
        }
        Ok(())
    }

    fn status(&self) -> &'static str {
        BLOG_STATUS.canonical(Some(self.status.as_str()))
    }

    pub(crate) fn to_json(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "excerpt": self.excerpt.trim(),
            "content": self.content.trim(),
            "author": self.author.trim(),
            "status": self.status(),
        })
    }

    pub(crate) fn to_multipart(&self) -> Vec<(String, FormValue)> {
        let text = |name: &str, value: &str| (name.to_string(), FormValue::Text(value.to_string()));
        let mut fields = vec![
            text("title", self.title.trim()),
            text("excerpt", self.excerpt.trim()),
            text("content", self.content.trim()),
            text("author", self.author.trim()),
            text("status", self.status()),
        ];
        if let Some(image) = &self.image {
            fields.push(("image".to_string(), image.to_form_value()));
        }
        fields
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PasswordChange {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

impl PasswordChange {
    /// Returns the trimmed form on success.
    pub fn validate(&self) -> Result<PasswordChange, ApiError> {
        let email = self.email.trim();
        let old_password = self.old_password.trim();
        let new_password = self.new_password.trim();

        if email.is_empty() || old_password.is_empty() || new_password.is_empty() {
            return Err(invalid("All fields are required."));
        }
        if !is_valid_email(email) {
            return Err(invalid("Please enter a valid email address."));
        }
        if char_len(old_password) < OLD_PASSWORD_MIN {
            return Err(invalid(format!(
                "Old password must be at least {OLD_PASSWORD_MIN} characters."
            )));
        }
        new_password_rules(new_password)?;
        if new_password == old_password {
            return Err(invalid("New password must be different from old password."));
        }

        Ok(PasswordChange {
            email: email.to_string(),
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        })
    }

    /// Looser checks for the login page's reset form: the backend judges
    /// the passwords, only the shape of the request is checked here.
    pub fn validate_reset(&self) -> Result<PasswordChange, ApiError> {
        let email = self.email.trim();
        let old_password = self.old_password.trim();
        let new_password = self.new_password.trim();

        if email.is_empty() || old_password.is_empty() || new_password.is_empty() {
            return Err(invalid("All fields are required."));
        }
        if !is_valid_email(email) {
            return Err(invalid("Please enter a valid email address."));
        }
        if new_password == old_password {
            return Err(invalid("New password must be different from old password."));
        }

        Ok(PasswordChange {
            email: email.to_string(),
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        })
    }

    pub(crate) fn to_json(&self) -> Value {
        json!({
            "email": self.email,
            "oldPassword": self.old_password,
            "newPassword": self.new_password,
        })
    }
}

fn new_password_rules(password: &str) -> Result<(), ApiError> {
    let len = char_len(password);
    if len < NEW_PASSWORD_MIN {
        return Err(invalid(format!(
            "New password must be at least {NEW_PASSWORD_MIN} characters."
        )));
    }
    if len > NEW_PASSWORD_MAX {
        return Err(invalid(format!(
            "New password must be at most {NEW_PASSWORD_MAX} characters."
        )));
    }
    if password.chars().any(char::is_whitespace) {
        return Err(invalid("New password must not contain spaces."));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid(
            "New password must include at least 1 uppercase letter (A-Z).",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(invalid(
            "New password must include at least 1 lowercase letter (a-z).",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("New password must include at least 1 number (0-9)."));
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(
            "New password must include at least 1 special character (e.g., @ # $ % & * ! _).",
        ));
    }
    Ok(())
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
