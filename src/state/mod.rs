use crate::api::ReqwestTransport;
use crate::config::EnvConfig;
use crate::services::AdminApi;
use crate::session::{BrowserNavigator, SessionManager, SessionStatus};
use crate::storage::{BrowserStorage, SessionStore};
use leptos::prelude::*;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub session: Arc<SessionManager>,
    pub api: AdminApi,

    /// Mirrors `session.status()`; updated on every committed transition.
    pub status: RwSignal<SessionStatus>,
}

impl AppState {
    pub fn new() -> Self {
        let endpoints = EnvConfig::new().endpoints();
        let session = Arc::new(SessionManager::new(
            Arc::new(ReqwestTransport::new()),
            SessionStore::new(BrowserStorage),
            BrowserNavigator,
            endpoints,
        ));

        let status = RwSignal::new(session.status());
        session.watch(move |s| status.set(s.clone()));

        Self {
            api: AdminApi::new(session.clone()),
            session,
            status,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

/// What a protected route renders for a given session status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Gate {
    Wait,
    Render,
    Redirect,
}

impl Gate {
    pub fn for_status(status: &SessionStatus) -> Self {
        match status {
            SessionStatus::Bootstrapping => Gate::Wait,
            SessionStatus::Authenticated(_) => Gate::Render,
            SessionStatus::Unauthenticated => Gate::Redirect,
        }
    }
}
