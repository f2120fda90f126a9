use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::tw_merge;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-4 rounded-xl border py-5 shadow-sm"}
    clx! {CardHeader, div, "flex flex-col gap-1.5 px-5"}
    clx! {CardTitle, h2, "text-base leading-none font-semibold"}
    clx! {CardDescription, p, "text-muted-foreground text-xs"}
    clx! {CardContent, div, "px-5"}
}

pub use components::*;

/// Dashboard tile: a label, a count, and an optional advisory line.
#[component]
pub fn StatCard(
    #[prop(into)] label: String,
    #[prop(into)] value: Signal<Option<usize>>,
    #[prop(into, optional)] note: Signal<Option<String>>,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let merged_class = tw_merge!("rounded-xl border bg-card p-4 shadow-sm", class);

    view! {
        <div class=merged_class data-name="StatCard">
            <div class="text-xs text-muted-foreground">{label}</div>
            <div class="mt-1 text-2xl font-semibold tabular-nums">
                {move || value.get().map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())}
            </div>
            {move || {
                note.get().map(|n| view! { <div class="mt-2 text-xs text-amber-600">{n}</div> })
            }}
        </div>
    }
}
