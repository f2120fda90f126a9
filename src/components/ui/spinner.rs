use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Full-screen placeholder shown while the session is being restored.
#[component]
pub fn LoadingScreen(#[prop(into, optional)] label: Option<String>) -> impl IntoView {
    let label = label.unwrap_or_else(|| "Loading...".to_string());

    view! {
        <div class="flex min-h-screen items-center justify-center gap-2 text-sm text-muted-foreground">
            <Spinner />
            <span>{label}</span>
        </div>
    }
}
