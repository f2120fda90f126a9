use leptos::prelude::*;
use tw_merge::tw_merge;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlertTone {
    #[default]
    Error,
    Warning,
    Success,
}

impl AlertTone {
    fn classes(self) -> &'static str {
        match self {
            AlertTone::Error => "border-destructive/30 text-destructive",
            AlertTone::Warning => "border-amber-300 text-amber-700",
            AlertTone::Success => "border-emerald-300 text-emerald-700",
        }
    }
}

/// Inline message box. Renders nothing while `message` is `None`.
#[component]
pub fn Alert(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(optional)] tone: AlertTone,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let merged_class = tw_merge!("w-full rounded-lg border px-3 py-2 text-xs", tone.classes(), class);

    move || {
        message.get().map(|m| {
            view! {
                <div class=merged_class.clone() role="alert">
                    {m}
                </div>
            }
        })
    }
}
