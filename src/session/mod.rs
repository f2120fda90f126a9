//! Session lifecycle.
//!
//! `SessionManager` owns the signed-in state for the whole app. It is built
//! once at startup and shared through context; every authorized request goes
//! through [`SessionManager::dispatch`] so a 401/403 from anywhere ends the
//! session.

use crate::adapter::{body_message, has_failure_marker, value_at};
use crate::api::{ApiError, ApiRequest, ApiResponse, ApiResult, Transport};
use crate::config::{Endpoints, LOGIN_ROUTE, VERIFY_TIMEOUT};
use crate::models::{AdminUser, RecordId};
use crate::storage::SessionStore;
use crate::token;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const TOKEN_PATHS: [&[&str]; 4] = [
    &["token"],
    &["accessToken"],
    &["data", "token"],
    &["data", "accessToken"],
];

const USER_PATHS: [&[&str]; 4] = [
    &["admin"],
    &["user"],
    &["data", "admin"],
    &["data", "user"],
];

const MISSING_CREDENTIALS: &str = "Email and password are required.";
const INVALID_CREDENTIALS: &str = "Invalid credentials";
const UNUSABLE_TOKEN: &str = "Login response did not include a valid session token.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: AdminUser,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Bootstrapping,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionStatus {
    pub fn user(&self) -> Option<&AdminUser> {
        match self {
            SessionStatus::Authenticated(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }
}

/// Outcome of asking the backend whether a stored token is still good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    Accepted,
    Rejected,
}

/// User-facing login failure message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct LoginError(pub String);

/// Client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Full page navigation via `window.location`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(path);
        }
    }
}

type Observer = Box<dyn Fn(&SessionStatus) + Send + Sync>;

struct SessionInner {
    status: SessionStatus,
    /// Bumped on every committed transition.
    epoch: u64,
}

pub struct SessionManager {
    transport: Arc<dyn Transport>,
    store: SessionStore,
    navigator: Box<dyn Navigator>,
    endpoints: Endpoints,
    verify_timeout: Duration,
    inner: Mutex<SessionInner>,
    observers: Mutex<Vec<Observer>>,
}

impl SessionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: SessionStore,
        navigator: impl Navigator + 'static,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            transport,
            store,
            navigator: Box::new(navigator),
            endpoints,
            verify_timeout: VERIFY_TIMEOUT,
            inner: Mutex::new(SessionInner {
                status: SessionStatus::Bootstrapping,
                epoch: 0,
            }),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the per-candidate limit used by [`verify_with_backend`](Self::verify_with_backend).
    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn status(&self) -> SessionStatus {
        self.inner().status.clone()
    }

    /// True until [`bootstrap`](Self::bootstrap) settles the initial state.
    pub fn is_loading(&self) -> bool {
        self.inner().status == SessionStatus::Bootstrapping
    }

    pub fn epoch(&self) -> u64 {
        self.inner().epoch
    }

    pub fn current_user(&self) -> Option<AdminUser> {
        self.inner().status.user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        match &self.inner().status {
            SessionStatus::Authenticated(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    /// Registers a callback run after every committed transition.
    pub fn watch(&self, observer: impl Fn(&SessionStatus) + Send + Sync + 'static) {
        self.observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(observer));
    }

    fn notify(&self, status: &SessionStatus) {
        let observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
        for observer in observers.iter() {
            observer(status);
        }
    }

    /// Moves to `status` and bumps the epoch, unless `expected_epoch` is given
    /// and no longer current. Returns whether the transition happened.
    fn commit(&self, status: SessionStatus, expected_epoch: Option<u64>) -> bool {
        self.commit_with(status, expected_epoch, || {})
    }

    /// Like [`commit`](Self::commit), running `effect` under the same epoch
    /// check so a superseded transition leaves storage alone too.
    fn commit_with(
        &self,
        status: SessionStatus,
        expected_epoch: Option<u64>,
        effect: impl FnOnce(),
    ) -> bool {
        {
            let mut inner = self.inner();
            if expected_epoch.is_some_and(|e| e != inner.epoch) {
                return false;
            }
            effect();
            inner.status = status.clone();
            inner.epoch += 1;
        }
        self.notify(&status);
        true
    }

    /// Restores the persisted session. Settles `loading` exactly once.
    pub async fn bootstrap(&self) {
        let started = {
            let inner = self.inner();
            if inner.status != SessionStatus::Bootstrapping {
                tracing::debug!("bootstrap skipped; session already settled");
                return;
            }
            inner.epoch
        };

        // (status, whether the stored pair must go)
        let (outcome, clear) = match self.store.load() {
            None => {
                tracing::info!("no stored session");
                (SessionStatus::Unauthenticated, false)
            }
            Some((token, _)) if token::is_expired(&token) => {
                tracing::info!("stored session token expired; clearing");
                (SessionStatus::Unauthenticated, true)
            }
            Some((token, user)) => match self.verify_with_backend(&token).await {
                Verification::Accepted => {
                    tracing::info!(user = %user.email, "session restored");
                    (SessionStatus::Authenticated(Session { token, user }), false)
                }
                Verification::Rejected => {
                    tracing::info!("stored session rejected by backend; clearing");
                    (SessionStatus::Unauthenticated, true)
                }
            },
        };

        let committed = self.commit_with(outcome, Some(started), || {
            if clear {
                self.store.clear();
            }
        });
        if !committed {
            tracing::debug!("bootstrap result discarded; session changed while verifying");
        }
    }

    /// Asks each verification endpoint in turn whether `token` is still valid.
    ///
    /// Only an explicit 401/403 or a timeout rejects. A backend without any
    /// of the endpoints is accepted.
    pub async fn verify_with_backend(&self, token: &str) -> Verification {
        for url in &self.endpoints.verify_candidates {
            let request = ApiRequest::get(url.as_str())
                .bearer(token)
                .timeout(self.verify_timeout);

            match self.transport.send(request).await {
                Ok(resp) if resp.is_success() => {
                    tracing::debug!(%url, status = resp.status, "session verified");
                    return Verification::Accepted;
                }
                Ok(resp) if resp.is_unauthorized() => {
                    tracing::debug!(%url, status = resp.status, "session rejected");
                    return Verification::Rejected;
                }
                Ok(resp) => {
                    tracing::debug!(%url, status = resp.status, "verification inconclusive");
                }
                Err(ApiError::Transport {
                    timed_out: true, ..
                }) => {
                    tracing::warn!(%url, "session verification timed out");
                    return Verification::Rejected;
                }
                Err(e) => {
                    tracing::debug!(%url, error = %e, "verification inconclusive");
                }
            }
        }

        tracing::debug!("no verification endpoint answered; accepting stored session");
        Verification::Accepted
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<AdminUser, LoginError> {
        let identifier = identifier.trim();
        let secret = secret.trim();
        if identifier.is_empty() || secret.is_empty() {
            return Err(LoginError(MISSING_CREDENTIALS.to_string()));
        }

        let request = ApiRequest::post(self.endpoints.login.as_str()).json(json!({
            "email": identifier,
            "password": secret,
            "username": identifier,
            "adminEmail": identifier,
        }));

        let result = self
            .transport
            .send(request)
            .await
            .map_err(|e| LoginError(fallback_message(&e.to_string())))
            .and_then(|resp| Self::accept_login(&resp, identifier));

        let (token, user) = match result {
            Ok(pair) => pair,
            Err(e) => {
                tracing::info!(error = %e, "login failed");
                return Err(e);
            }
        };

        if let Err(e) = self.store.save(&token, &user) {
            tracing::warn!(error = %e, "could not persist session");
            return Err(LoginError(
                "Could not save the session in this browser.".to_string(),
            ));
        }

        tracing::info!(user = %user.email, "login succeeded");
        self.commit(
            SessionStatus::Authenticated(Session {
                token,
                user: user.clone(),
            }),
            None,
        );
        Ok(user)
    }

    fn accept_login(resp: &ApiResponse, identifier: &str) -> Result<(String, AdminUser), LoginError> {
        if !resp.is_success() {
            let message = body_message(&resp.body)
                .unwrap_or_else(|| format!("Request failed with status code {}", resp.status));
            return Err(LoginError(message));
        }
        if has_failure_marker(&resp.body) {
            let message =
                body_message(&resp.body).unwrap_or_else(|| INVALID_CREDENTIALS.to_string());
            return Err(LoginError(message));
        }

        let token = TOKEN_PATHS
            .iter()
            .find_map(|path| {
                value_at(&resp.body, path)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
            })
            .map(str::to_string);

        let token = match token {
            Some(token) if !token::is_expired(&token) => token,
            _ => return Err(LoginError(UNUSABLE_TOKEN.to_string())),
        };

        Ok((token, login_user(&resp.body, identifier)))
    }

    /// Clears the session and sends the browser to the login page.
    pub fn logout(&self) {
        self.store.clear();
        let was_authenticated = self.inner().status.is_authenticated();
        self.commit(SessionStatus::Unauthenticated, None);
        if was_authenticated {
            tracing::info!("logged out");
        }
        self.navigator.navigate(LOGIN_ROUTE);
    }

    /// Adds the bearer credential when a session is active.
    pub fn attach_authorization(&self, request: &mut ApiRequest) {
        if let Some(token) = self.token() {
            request.bearer = Some(token);
        }
    }

    /// Ends the session on a 401/403, unless the response belongs to an
    /// older session than the current one.
    pub fn on_unauthorized_response(&self, sent_epoch: u64, response: &ApiResponse) {
        if !response.is_unauthorized() {
            return;
        }

        let current = self.epoch();
        if sent_epoch != current {
            tracing::debug!(
                status = response.status,
                sent_epoch,
                current,
                "ignoring unauthorized response from a previous session"
            );
            return;
        }

        tracing::warn!(status = response.status, "request unauthorized; ending session");
        let ended = self.commit_with(SessionStatus::Unauthenticated, Some(current), || {
            self.store.clear()
        });
        if ended {
            self.navigator.navigate(LOGIN_ROUTE);
        }
    }

    /// Sends `request` outside the session: no bearer, and a 401/403 is just
    /// a response. For calls made from the login page.
    pub async fn send_unauthenticated(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        self.transport.send(request).await
    }

    /// Sends `request` on the authorized path.
    ///
    /// Non-2xx statuses are returned as `Ok`; callers classify them.
    pub async fn dispatch(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let epoch = self.epoch();
        self.attach_authorization(&mut request);
        let response = self.transport.send(request).await?;
        self.on_unauthorized_response(epoch, &response);
        Ok(response)
    }
}

fn fallback_message(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        INVALID_CREDENTIALS.to_string()
    } else {
        message.to_string()
    }
}

/// Builds the profile from a login response, filling in defaults.
fn login_user(body: &Value, identifier: &str) -> AdminUser {
    let empty = Value::Null;
    let source = USER_PATHS
        .iter()
        .find_map(|path| value_at(body, path).filter(|v| v.is_object()))
        .unwrap_or(&empty);

    let text = |keys: &[&str]| {
        keys.iter().find_map(|k| {
            source
                .get(*k)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };

    AdminUser {
        id: ["id", "_id"]
            .iter()
            .find_map(|k| source.get(*k).and_then(RecordId::from_value))
            .unwrap_or(RecordId::Number(1)),
        name: text(&["name", "fullName"]).unwrap_or_else(|| "Admin".to_string()),
        email: text(&["email"]).unwrap_or_else(|| identifier.to_string()),
        role: text(&["role"]).unwrap_or_else(|| "admin".to_string()),
    }
}
