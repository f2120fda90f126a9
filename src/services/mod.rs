//! Dashboard operations on each backend collection.

pub mod forms;

use crate::adapter::{
    body_message, extract_list, extract_single, has_failure_marker, normalize, AdapterContext,
    FromCanonical,
};
use crate::api::{ApiError, ApiRequest, ApiResult, Method, RequestBody};
use crate::models::{Appointment, Blog, EntityKind, Faq, Inquiry, RecordId, Testimonial};
use crate::session::SessionManager;
use forms::{BlogDraft, FaqDraft, PasswordChange, TestimonialDraft};
use serde_json::{json, Value};
use std::sync::Arc;

/// Records from a list call. `warning` is set when the backend answered but
/// no known envelope held an array.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing<T> {
    pub records: Vec<T>,
    pub warning: Option<String>,
}

impl<T> Listing<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-collection figures shown on the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionSummary {
    pub kind: EntityKind,
    pub count: usize,
    pub warning: Option<String>,
}

#[derive(Clone)]
pub struct AdminApi {
    session: Arc<SessionManager>,
    ctx: AdapterContext,
}

impl AdminApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        let ctx = AdapterContext::new(session.endpoints().uploads.clone());
        Self { session, ctx }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Authorized call. Non-2xx statuses become errors.
    async fn call(&self, request: ApiRequest) -> ApiResult<Value> {
        let resp = self.session.dispatch(request).await?;
        if !resp.is_success() {
            return Err(ApiError::from_status(&resp));
        }
        Ok(resp.body)
    }

    /// Like [`call`](Self::call), and a 2xx body with a failure marker is an error too.
    async fn write(&self, request: ApiRequest, fallback: &str) -> ApiResult<Value> {
        let body = self.call(request).await?;
        if has_failure_marker(&body) {
            return Err(ApiError::Application {
                message: body_message(&body).unwrap_or_else(|| fallback.to_string()),
            });
        }
        Ok(body)
    }

    /// Tries each `(method, url)` in order with the same body until one succeeds.
    /// An authorization failure ends the attempt immediately.
    async fn write_first(
        &self,
        attempts: &[(Method, String)],
        body: RequestBody,
        fallback: &str,
    ) -> ApiResult<Value> {
        let mut last = ApiError::Application {
            message: fallback.to_string(),
        };
        for (method, url) in attempts {
            let request = ApiRequest {
                body: body.clone(),
                ..ApiRequest::new(method.clone(), url.as_str())
            };
            match self.write(request, fallback).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_unauthorized() => return Err(e),
                Err(e) => {
                    tracing::debug!(%method, %url, error = %e, "update attempt failed");
                    last = e;
                }
            }
        }
        Err(last)
    }

    async fn update(&self, url: String, body: RequestBody, fallback: &str) -> ApiResult<Value> {
        let attempts = [(Method::PUT, url.clone()), (Method::PATCH, url)];
        self.write_first(&attempts, body, fallback).await
    }

    async fn list<T: FromCanonical>(&self) -> ApiResult<Listing<T>> {
        let kind = T::KIND;
        let url = self.session.endpoints().collection(kind).to_string();
        let body = self.call(ApiRequest::get(url)).await?;

        let extracted = extract_list(&body, kind);
        let warning = if extracted.found {
            None
        } else {
            tracing::warn!(%kind, "response held no recognizable array");
            Some(
                ApiError::ShapeMismatch {
                    entity: kind.singular_key(),
                }
                .to_string(),
            )
        };

        Ok(Listing {
            records: extracted
                .items
                .iter()
                .map(|raw| normalize::<T>(raw, &self.ctx))
                .collect(),
            warning,
        })
    }

    pub async fn list_appointments(&self) -> ApiResult<Listing<Appointment>> {
        self.list().await
    }

    pub async fn list_blogs(&self) -> ApiResult<Listing<Blog>> {
        self.list().await
    }

    pub async fn list_testimonials(&self) -> ApiResult<Listing<Testimonial>> {
        self.list().await
    }

    pub async fn list_faqs(&self) -> ApiResult<Listing<Faq>> {
        self.list().await
    }

    pub async fn list_inquiries(&self) -> ApiResult<Listing<Inquiry>> {
        self.list().await
    }

    pub async fn summarize(&self, kind: EntityKind) -> ApiResult<CollectionSummary> {
        fn summary<T>(kind: EntityKind, listing: Listing<T>) -> CollectionSummary {
            CollectionSummary {
                kind,
                count: listing.len(),
                warning: listing.warning,
            }
        }

        Ok(match kind {
            EntityKind::Appointments => summary(kind, self.list_appointments().await?),
            EntityKind::Blogs => summary(kind, self.list_blogs().await?),
            EntityKind::Testimonials => summary(kind, self.list_testimonials().await?),
            EntityKind::Faqs => summary(kind, self.list_faqs().await?),
            EntityKind::Inquiries => summary(kind, self.list_inquiries().await?),
        })
    }

    /// `None` when the response holds no blog object.
    pub async fn get_blog(&self, id: &RecordId) -> ApiResult<Option<Blog>> {
        let url = self.session.endpoints().item(EntityKind::Blogs, id);
        let body = self.call(ApiRequest::get(url)).await?;
        Ok(extract_single(&body, EntityKind::Blogs).map(|raw| normalize::<Blog>(raw, &self.ctx)))
    }

    pub async fn delete(&self, kind: EntityKind, id: &RecordId) -> ApiResult<()> {
        let url = self.session.endpoints().item(kind, id);
        self.call(ApiRequest::delete(url)).await?;
        tracing::info!(%kind, %id, "record deleted");
        Ok(())
    }

    pub async fn create_faq(&self, draft: &FaqDraft) -> ApiResult<()> {
        draft.validate()?;
        let url = self.session.endpoints().faqs.clone();
        self.write(ApiRequest::post(url).json(draft.to_json()), "Unable to save FAQ")
            .await?;
        Ok(())
    }

    pub async fn update_faq(&self, id: &RecordId, draft: &FaqDraft) -> ApiResult<()> {
        draft.validate()?;
        let url = self.session.endpoints().item(EntityKind::Faqs, id);
        let request = ApiRequest::new(Method::PUT, url).json(draft.to_json());
        self.write(request, "Unable to save FAQ").await?;
        Ok(())
    }

    /// Creates when `existing` is `None`, otherwise updates that testimonial.
    pub async fn save_testimonial(
        &self,
        draft: &TestimonialDraft,
        existing: Option<&RecordId>,
    ) -> ApiResult<()> {
        const FALLBACK: &str = "Unable to save testimonial";
        draft.validate(existing.is_none())?;
        let body = RequestBody::Multipart(draft.to_multipart());
        let endpoints = self.session.endpoints();

        match existing {
            Some(id) => {
                let url = endpoints.item(EntityKind::Testimonials, id);
                self.update(url, body, FALLBACK).await?;
            }
            None => {
                let request = ApiRequest {
                    body,
                    ..ApiRequest::post(endpoints.testimonials.as_str())
                };
                self.write(request, FALLBACK).await?;
            }
        }
        Ok(())
    }

    pub async fn publish_testimonial(&self, id: &RecordId) -> ApiResult<()> {
        let url = self.session.endpoints().item(EntityKind::Testimonials, id);
        let body = RequestBody::Json(json!({
            "status": "Published",
            "isPublished": true,
            "published": true,
            "approved": true,
        }));
        self.update(url, body, "Unable to publish testimonial").await?;
        Ok(())
    }

    /// JSON unless an image is attached, in which case multipart.
    pub async fn save_blog(&self, draft: &BlogDraft, existing: Option<&RecordId>) -> ApiResult<()> {
        const FALLBACK: &str = "Unable to save blog";
        draft.validate()?;
        let body = if draft.image.is_some() {
            RequestBody::Multipart(draft.to_multipart())
        } else {
            RequestBody::Json(draft.to_json())
        };
        let endpoints = self.session.endpoints();

        match existing {
            Some(id) => {
                self.update(endpoints.item(EntityKind::Blogs, id), body, FALLBACK)
                    .await?;
            }
            None => {
                let request = ApiRequest {
                    body,
                    ..ApiRequest::post(endpoints.blogs.as_str())
                };
                self.write(request, FALLBACK).await?;
            }
        }
        Ok(())
    }

    /// Backends differ on where status lives, so four shapes are tried.
    pub async fn update_inquiry_status(&self, id: &RecordId, status: &str) -> ApiResult<()> {
        let item = self.session.endpoints().item(EntityKind::Inquiries, id);
        let status_url = format!("{item}/status");
        let attempts = [
            (Method::PUT, status_url.clone()),
            (Method::PATCH, status_url),
            (Method::PUT, item.clone()),
            (Method::PATCH, item),
        ];
        self.write_first(
            &attempts,
            RequestBody::Json(json!({ "status": status })),
            "Unable to update inquiry status",
        )
        .await?;
        Ok(())
    }

    pub async fn change_password(&self, form: &PasswordChange) -> ApiResult<()> {
        let form = form.validate()?;

        if self.session.token().is_none() {
            self.session.logout();
            return Err(ApiError::Validation(
                "Session expired. Please login again.".to_string(),
            ));
        }

        let url = self.session.endpoints().change_password.clone();
        self.write(
            ApiRequest::post(url).json(form.to_json()),
            "Unable to change password.",
        )
        .await?;
        tracing::info!("password changed");
        Ok(())
    }

    /// Password change from the login page, for an admin who is not signed in.
    /// Returns the backend's confirmation message.
    pub async fn reset_password(&self, form: &PasswordChange) -> ApiResult<String> {
        let form = form.validate_reset()?;
        let url = self.session.endpoints().change_password.clone();

        let resp = self
            .session
            .send_unauthenticated(ApiRequest::post(url).json(form.to_json()))
            .await?;
        if !resp.is_success() {
            return Err(ApiError::from_status(&resp));
        }
        if has_failure_marker(&resp.body) {
            return Err(ApiError::Application {
                message: body_message(&resp.body)
                    .unwrap_or_else(|| "Unable to change password.".to_string()),
            });
        }

        tracing::info!("password reset from login page");
        Ok(resp
            .body
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("Password changed successfully.")
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FormValue;
    use crate::config::Endpoints;
    use crate::storage::{MemoryStore, SessionStore};
    use crate::test_support::{RecordingNavigator, StubTransport};
    use crate::token::{make_token, now_secs};
    use forms::ImageUpload;

    const BASE: &str = "http://api.test";

    struct Harness {
        api: AdminApi,
        transport: Arc<StubTransport>,
        navigator: RecordingNavigator,
    }

    async fn harness() -> Harness {
        let transport = Arc::new(StubTransport::new());
        let navigator = RecordingNavigator::default();
        let session = Arc::new(SessionManager::new(
            transport.clone(),
            SessionStore::new(MemoryStore::new()),
            navigator.clone(),
            Endpoints::from_base(BASE),
        ));
        transport.respond(
            Method::POST,
            &format!("{BASE}/api/admin/login"),
            200,
            json!({"token": make_token(Some(now_secs() + 3600))}),
        );
        session.login("a@b.com", "secret").await.unwrap();
        transport.clear_requests();

        Harness {
            api: AdminApi::new(session),
            transport,
            navigator,
        }
    }

    fn url(path: &str) -> String {
        format!("{BASE}{path}")
    }

    #[tokio::test]
    async fn lists_normalize_and_authorize() {
        let h = harness().await;
        h.transport.respond(
            Method::GET,
            &url("/api/testimonials"),
            200,
            json!({"data": {"docs": [{"_id": "t1", "name": "Ann", "status": "approved", "photo": "ann.png"}]}}),
        );

        let listing = h.api.list_testimonials().await.unwrap();

        assert_eq!(listing.warning, None);
        assert_eq!(listing.len(), 1);
        let t = &listing.records[0];
        assert_eq!(t.id, Some(RecordId::Text("t1".into())));
        assert_eq!(t.patient, "Ann");
        assert_eq!(t.status, "Published");
        assert_eq!(t.rating, 5.0);
        assert_eq!(t.image.as_deref(), Some("http://api.test/uploads/ann.png"));
        assert!(h.transport.requests()[0].bearer.is_some());
    }

    #[tokio::test]
    async fn unrecognized_envelope_is_a_warning() {
        let h = harness().await;
        h.transport
            .respond(Method::GET, &url("/api/appointments"), 200, json!({"foo": "bar"}));

        let listing = h.api.list_appointments().await.unwrap();

        assert!(listing.is_empty());
        assert_eq!(
            listing.warning.as_deref(),
            Some("API connected, but no appointment array found in response.")
        );
    }

    #[tokio::test]
    async fn list_errors_surface_the_body_message() {
        let h = harness().await;
        h.transport.respond(
            Method::GET,
            &url("/api/faqs"),
            500,
            json!({"message": "database offline"}),
        );

        let err = h.api.list_faqs().await.unwrap_err();
        assert_eq!(err.to_string(), "database offline");
        assert!(h.api.session().status().is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_list_ends_the_session() {
        let h = harness().await;
        h.transport
            .respond(Method::GET, &url("/api/blogs"), 401, json!({}));

        let err = h.api.list_blogs().await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!h.api.session().status().is_authenticated());
        assert_eq!(h.navigator.visits(), vec!["/login"]);
    }

    #[tokio::test]
    async fn summaries_count_records() {
        let h = harness().await;
        h.transport.respond(
            Method::GET,
            &url("/api/inquiries"),
            200,
            json!({"inquiries": [{"id": 1}, {"id": 2}]}),
        );

        let summary = h.api.summarize(EntityKind::Inquiries).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.warning, None);
    }

    #[tokio::test]
    async fn get_blog_reads_nested_object() {
        let h = harness().await;
        h.transport.respond(
            Method::GET,
            &url("/api/blogs/9"),
            200,
            json!({"data": {"blog": {"id": 9, "name": "Hip care", "status": "live"}}}),
        );

        let blog = h.api.get_blog(&RecordId::Number(9)).await.unwrap().unwrap();
        assert_eq!(blog.title, "Hip care");
        assert_eq!(blog.status, "Published");
    }

    #[tokio::test]
    async fn delete_uses_item_path() {
        let h = harness().await;
        h.transport
            .respond(Method::DELETE, &url("/api/faqs/abc"), 204, Value::Null);

        h.api
            .delete(EntityKind::Faqs, &RecordId::from("abc"))
            .await
            .unwrap();
        assert_eq!(h.transport.requests()[0].url, url("/api/faqs/abc"));
    }

    #[tokio::test]
    async fn invalid_faq_never_reaches_the_network() {
        let h = harness().await;
        let err = h.api.create_faq(&FaqDraft::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failure_marker_on_write_is_an_error() {
        let h = harness().await;
        h.transport.respond(
            Method::POST,
            &url("/api/faqs"),
            201,
            json!({"success": false, "error": "duplicate question"}),
        );
        let draft = FaqDraft {
            question: "Do you take insurance?".into(),
            answer: "Yes, most major providers are accepted.".into(),
            category: "General".into(),
        };

        let err = h.api.create_faq(&draft).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Application {
                message: "duplicate question".into()
            }
        );
    }

    #[tokio::test]
    async fn testimonial_update_falls_back_to_patch() {
        let h = harness().await;
        h.transport
            .respond(Method::PUT, &url("/api/testimonials/5"), 405, json!({}));
        h.transport
            .respond(Method::PATCH, &url("/api/testimonials/5"), 200, json!({}));

        let draft = TestimonialDraft {
            patient: "Jane Doe".into(),
            comment: "Wonderful care from everyone.".into(),
            ..TestimonialDraft::default()
        };
        h.api
            .save_testimonial(&draft, Some(&RecordId::Number(5)))
            .await
            .unwrap();

        let requests = h.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, Method::PATCH);
        let RequestBody::Multipart(fields) = &requests[1].body else {
            panic!("expected multipart body");
        };
        assert!(fields.contains(&("status".to_string(), FormValue::Text("Pending".into()))));
    }

    #[tokio::test]
    async fn testimonial_create_posts_image() {
        let h = harness().await;
        h.transport
            .respond(Method::POST, &url("/api/testimonials"), 201, json!({"success": true}));

        let draft = TestimonialDraft {
            patient: "Jane Doe".into(),
            comment: "Wonderful care from everyone.".into(),
            image: Some(ImageUpload {
                file_name: "j.jpg".into(),
                mime: "image/jpeg".into(),
                bytes: vec![0xff, 0xd8],
            }),
            ..TestimonialDraft::default()
        };
        h.api.save_testimonial(&draft, None).await.unwrap();

        let RequestBody::Multipart(fields) = &h.transport.requests()[0].body else {
            panic!("expected multipart body");
        };
        assert_eq!(fields.last().map(|(n, _)| n.as_str()), Some("image"));
    }

    #[tokio::test]
    async fn publish_stops_after_unauthorized_put() {
        let h = harness().await;
        h.transport
            .respond(Method::PUT, &url("/api/testimonials/5"), 403, json!({}));

        let err = h
            .api
            .publish_testimonial(&RecordId::Number(5))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(h.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn blog_with_image_is_multipart() {
        let h = harness().await;
        h.transport
            .respond(Method::POST, &url("/api/blogs"), 201, json!({}));

        let draft = BlogDraft {
            title: "T".into(),
            excerpt: "E".into(),
            content: "C".into(),
            image: Some(ImageUpload {
                file_name: "c.png".into(),
                mime: "image/png".into(),
                bytes: vec![1],
            }),
            ..BlogDraft::default()
        };
        h.api.save_blog(&draft, None).await.unwrap();
        assert!(matches!(
            h.transport.requests()[0].body,
            RequestBody::Multipart(_)
        ));

        h.transport.clear_requests();
        let draft = BlogDraft { image: None, ..draft };
        h.api.save_blog(&draft, None).await.unwrap();
        assert!(matches!(h.transport.requests()[0].body, RequestBody::Json(_)));
    }

    #[tokio::test]
    async fn inquiry_status_tries_each_shape_in_order() {
        let h = harness().await;
        h.transport
            .respond(Method::PUT, &url("/api/inquiries/3"), 200, json!({}));

        h.api
            .update_inquiry_status(&RecordId::Number(3), "Resolved")
            .await
            .unwrap();

        let tried: Vec<(Method, String)> = h
            .transport
            .requests()
            .into_iter()
            .map(|r| (r.method, r.url))
            .collect();
        assert_eq!(
            tried,
            vec![
                (Method::PUT, url("/api/inquiries/3/status")),
                (Method::PATCH, url("/api/inquiries/3/status")),
                (Method::PUT, url("/api/inquiries/3")),
            ]
        );
    }

    #[tokio::test]
    async fn inquiry_status_reports_last_failure() {
        let h = harness().await;
        h.transport.respond(
            Method::PATCH,
            &url("/api/inquiries/3"),
            422,
            json!({"message": "unknown status"}),
        );

        let err = h
            .api
            .update_inquiry_status(&RecordId::Number(3), "Archived")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown status");
        assert_eq!(h.transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn change_password_posts_trimmed_form() {
        let h = harness().await;
        h.transport.respond(
            Method::POST,
            &url("/api/admin/change-password"),
            200,
            json!({"success": true}),
        );

        let form = PasswordChange {
            email: "a@b.com".into(),
            old_password: "oldpass ".into(),
            new_password: "N3w-Pass!".into(),
        };
        h.api.change_password(&form).await.unwrap();

        let request = &h.transport.requests()[0];
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"email": "a@b.com", "oldPassword": "oldpass", "newPassword": "N3w-Pass!"}))
        );
    }

    #[tokio::test]
    async fn change_password_without_session_redirects() {
        let h = harness().await;
        h.api.session().logout();
        h.transport.clear_requests();

        let form = PasswordChange {
            email: "a@b.com".into(),
            old_password: "oldpass".into(),
            new_password: "N3w-Pass!".into(),
        };
        let err = h.api.change_password(&form).await.unwrap_err();

        assert_eq!(err.to_string(), "Session expired. Please login again.");
        assert!(h.transport.requests().is_empty());
        assert_eq!(h.navigator.visits(), vec!["/login", "/login"]);
    }

    fn reset_form() -> PasswordChange {
        PasswordChange {
            email: " a@b.com ".into(),
            old_password: "old".into(),
            new_password: "new".into(),
        }
    }

    #[tokio::test]
    async fn reset_password_needs_no_session() {
        let h = harness().await;
        h.api.session().logout();
        h.transport.clear_requests();
        h.transport.respond(
            Method::POST,
            &url("/api/admin/change-password"),
            200,
            json!({"message": "Password updated"}),
        );

        let message = h.api.reset_password(&reset_form()).await.unwrap();

        assert_eq!(message, "Password updated");
        let request = &h.transport.requests()[0];
        assert_eq!(request.bearer, None);
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"email": "a@b.com", "oldPassword": "old", "newPassword": "new"}))
        );
    }

    #[tokio::test]
    async fn reset_password_rejection_does_not_redirect() {
        let h = harness().await;
        h.api.session().logout();
        h.transport.respond(
            Method::POST,
            &url("/api/admin/change-password"),
            401,
            json!({"message": "Old password is incorrect"}),
        );

        let err = h.api.reset_password(&reset_form()).await.unwrap_err();

        assert_eq!(err.to_string(), "Old password is incorrect");
        assert_eq!(h.navigator.visits(), vec!["/login"]);
    }

    #[tokio::test]
    async fn reset_password_failure_marker() {
        let h = harness().await;
        h.transport.respond(
            Method::POST,
            &url("/api/admin/change-password"),
            200,
            json!({"ok": false}),
        );

        let err = h.api.reset_password(&reset_form()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to change password.");

        h.transport.respond(
            Method::POST,
            &url("/api/admin/change-password"),
            200,
            json!({"success": true}),
        );
        assert_eq!(
            h.api.reset_password(&reset_form()).await.unwrap(),
            "Password changed successfully."
        );
    }
}
