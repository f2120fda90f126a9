use crate::pages::{ChangePasswordPage, DashboardPage, LoginPage, RequireSession};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    let session = state.session.clone();
    provide_context(AppContext(state));

    // Settles the `loading` gate; guarded routes render nothing protected until then.
    spawn_local(async move {
        session.bootstrap().await;
    });

    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("change-password") view=move || view! {
                    <RequireSession>
                        <ChangePasswordPage />
                    </RequireSession>
                } />
                <Route path=path!("") view=move || view! {
                    <RequireSession>
                        <DashboardPage />
                    </RequireSession>
                } />
            </Routes>
        </Router>
    }
}
