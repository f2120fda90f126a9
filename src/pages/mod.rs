use crate::components::ui::{
    Alert, AlertTone, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardHeader, CardTitle, LoadingScreen, Spinner, StatCard, TextField,
};
use crate::config::LOGIN_ROUTE;
use crate::models::EntityKind;
use crate::services::forms::PasswordChange;
use crate::state::{AppContext, Gate};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_navigate;
use strum::IntoEnumIterator;

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let submitting: RwSignal<bool> = RwSignal::new(false);

    let show_reset: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let status = app_state.0.status;
    let session = app_state.0.session.clone();
    let navigate = StoredValue::new(use_navigate());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        let session = session.clone();

        submitting.set(true);
        error.set(None);

        spawn_local(async move {
            match session.login(&email_val, &password_val).await {
                Ok(_) => navigate.with_value(|nav| nav("/", Default::default())),
                Err(e) => {
                    error.set(Some(e.0));
                    submitting.set(false);
                }
            }
        });
    };

    view! {
        <Show when=move || status.with(|s| s.is_authenticated())>
            <Redirect path="/" />
        </Show>
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 text-center text-sm font-medium text-foreground">"Hospital Admin"</div>

                <Card>
                    <CardHeader>
                        <CardTitle>"Sign in"</CardTitle>
                        <CardDescription>"Use your administrator email and password."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <TextField
                                id="email"
                                label="Email"
                                r#type="email"
                                placeholder="admin@example.com"
                                autocomplete="username"
                                bind_value=email
                                required=true
                            />
                            <TextField
                                id="password"
                                label="Password"
                                r#type="password"
                                autocomplete="current-password"
                                bind_value=password
                                required=true
                            />

                            <Alert message=error />

                            <Button size=ButtonSize::Block attr:disabled=move || submitting.get()>
                                <Show when=move || submitting.get()>
                                    <Spinner />
                                </Show>
                                {move || if submitting.get() { "Signing in..." } else { "Sign in" }}
                            </Button>
                        </form>

                        <button
                            type="button"
                            class="mt-3 text-xs text-muted-foreground hover:text-foreground"
                            on:click=move |_| show_reset.update(|open| *open = !*open)
                        >
                            "Forgot password?"
                        </button>
                    </CardContent>
                </Card>

                <Show when=move || show_reset.get()>
                    <ResetPasswordCard email=email.get_untracked() open=show_reset />
                </Show>
            </div>
        </div>
    }
}

/// Password change for an admin who cannot sign in with the current password.
#[component]
fn ResetPasswordCard(email: String, open: RwSignal<bool>) -> impl IntoView {
    let api = expect_context::<AppContext>().0.api.clone();

    let email: RwSignal<String> = RwSignal::new(email);
    let old_password: RwSignal<String> = RwSignal::new(String::new());
    let new_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let success: RwSignal<Option<String>> = RwSignal::new(None);
    let saving: RwSignal<bool> = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let form = PasswordChange {
            email: email.get_untracked(),
            old_password: old_password.get_untracked(),
            new_password: new_password.get_untracked(),
        };
        let api = api.clone();

        saving.set(true);
        error.set(None);
        success.set(None);

        spawn_local(async move {
            match api.reset_password(&form).await {
                Ok(message) => {
                    success.set(Some(message));
                    old_password.set(String::new());
                    new_password.set(String::new());
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    view! {
        <Card class="mt-4">
            <CardHeader>
                <CardTitle>"Change password"</CardTitle>
                <CardDescription>"Enter your current password and a new one."</CardDescription>
            </CardHeader>
            <CardContent>
                <form class="flex flex-col gap-3" on:submit=on_submit>
                    <TextField id="reset-email" label="Email" r#type="email" bind_value=email required=true />
                    <TextField
                        id="reset-old-password"
                        label="Old password"
                        r#type="password"
                        autocomplete="current-password"
                        bind_value=old_password
                        required=true
                    />
                    <TextField
                        id="reset-new-password"
                        label="New password"
                        r#type="password"
                        autocomplete="new-password"
                        bind_value=new_password
                        required=true
                    />

                    <Alert message=error />
                    <Alert message=success tone=AlertTone::Success />

                    <div class="flex gap-2">
                        <button
                            type="button"
                            class="inline-flex h-9 items-center rounded-md border px-4 text-sm"
                            on:click=move |_| open.set(false)
                        >
                            "Close"
                        </button>
                        <Button attr:disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Change password" }}
                        </Button>
                    </div>
                </form>
            </CardContent>
        </Card>
    }
}

/// Renders `children` only for a signed-in admin.
///
/// While the stored session is being restored nothing protected is shown.
#[component]
pub fn RequireSession(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let status = app_state.0.status;

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    move || match status.with(Gate::for_status) {
        Gate::Wait => view! { <LoadingScreen label="Restoring session..." /> }.into_any(),
        Gate::Redirect => view! { <Redirect path=LOGIN_ROUTE /> }.into_any(),
        Gate::Render => children.with_value(|c| c()).into_any(),
    }
}

#[component]
fn AdminHeader() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let status = app_state.0.status;
    let session = app_state.0.session.clone();

    let name = move || {
        status.with(|s| s.user().map(|u| u.name.clone()).unwrap_or_default())
    };

    view! {
        <header class="flex items-center justify-between border-b px-6 py-3">
            <a href="/" class="text-sm font-semibold">"Hospital Admin"</a>
            <div class="flex items-center gap-3 text-xs">
                <span class="text-muted-foreground">{name}</span>
                <a href="/change-password" class="text-muted-foreground hover:text-foreground">
                    "Change password"
                </a>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| session.logout()
                >
                    "Log out"
                </Button>
            </div>
        </header>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let tiles: Vec<(EntityKind, RwSignal<Option<usize>>, RwSignal<Option<String>>)> =
        EntityKind::iter()
            .map(|kind| (kind, RwSignal::new(None), RwSignal::new(None)))
            .collect();

    for (kind, count, warning) in tiles.iter().copied() {
        let api = app_state.0.api.clone();
        spawn_local(async move {
            match api.summarize(kind).await {
                Ok(summary) => {
                    count.set(Some(summary.count));
                    warning.set(summary.warning);
                }
                // The session hook already redirected.
                Err(e) if e.is_unauthorized() => {}
                Err(e) => {
                    tracing::warn!(%kind, error = %e, "could not load collection");
                    error.set(Some(format!("{}: {e}", kind.label())));
                }
            }
        });
    }

    view! {
        <div class="min-h-screen bg-background">
            <AdminHeader />
            <main class="mx-auto w-full max-w-5xl px-6 py-8">
                <h1 class="mb-6 text-lg font-semibold">"Dashboard"</h1>
                <Alert message=error class="mb-4" />
                <div class="grid grid-cols-2 gap-4 md:grid-cols-3 lg:grid-cols-5">
                    {tiles
                        .into_iter()
                        .map(|(kind, count, warning)| {
                            view! { <StatCard label=kind.label() value=count note=warning /> }
                        })
                        .collect_view()}
                </div>
            </main>
        </div>
    }
}

#[component]
pub fn ChangePasswordPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let api = app_state.0.api.clone();

    let saved_email = app_state
        .0
        .session
        .current_user()
        .map(|u| u.email)
        .unwrap_or_default();
    let email: RwSignal<String> = RwSignal::new(saved_email);
    let old_password: RwSignal<String> = RwSignal::new(String::new());
    let new_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let success: RwSignal<Option<String>> = RwSignal::new(None);
    let saving: RwSignal<bool> = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let form = PasswordChange {
            email: email.get_untracked(),
            old_password: old_password.get_untracked(),
            new_password: new_password.get_untracked(),
        };
        let api = api.clone();

        saving.set(true);
        error.set(None);
        success.set(None);

        spawn_local(async move {
            match api.change_password(&form).await {
                Ok(()) => {
                    success.set(Some("Password changed successfully.".to_string()));
                    old_password.set(String::new());
                    new_password.set(String::new());
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <AdminHeader />
            <main class="mx-auto w-full max-w-md px-6 py-8">
                <Card>
                    <CardHeader>
                        <CardTitle>"Change password"</CardTitle>
                        <CardDescription>
                            "8-20 characters with upper and lower case letters, a number, and a symbol."
                        </CardDescription>
                    </CardHeader>
                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <TextField id="email" label="Email" r#type="email" bind_value=email required=true />
                            <TextField
                                id="old-password"
                                label="Current password"
                                r#type="password"
                                autocomplete="current-password"
                                bind_value=old_password
                                required=true
                            />
                            <TextField
                                id="new-password"
                                label="New password"
                                r#type="password"
                                autocomplete="new-password"
                                bind_value=new_password
                                required=true
                            />

                            <Alert message=error />
                            <Alert message=success tone=AlertTone::Success />

                            <div class="flex gap-2">
                                <a href="/" class="inline-flex h-9 items-center rounded-md border px-4 text-sm">
                                    "Back"
                                </a>
                                <Button attr:disabled=move || saving.get()>
                                    {move || if saving.get() { "Saving..." } else { "Save" }}
                                </Button>
                            </div>
                        </form>
                    </CardContent>
                </Card>
            </main>
        </div>
    }
}
