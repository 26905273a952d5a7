use leptos::prelude::*;
use thaw::{MessageBar, MessageBarIntent, Spinner, SpinnerSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTone {
    Error,
    Neutral,
}

impl ScreenTone {
    fn classes(self) -> (&'static str, &'static str) {
        match self {
            ScreenTone::Error => ("status-screen status-screen-error", "⚠️"),
            ScreenTone::Neutral => ("status-screen status-screen-neutral", "🔍"),
        }
    }
}

#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="status-screen status-screen-loading">
            <div class="loading-container">
                <Spinner size=SpinnerSize::Large />
                <p class="loading-message">"Loading trip details..."</p>
            </div>
        </div>
    }
}

/// Full page card shown instead of the tracker when there is nothing to track.
#[component]
pub fn StatusScreen(
    tone: ScreenTone,
    title: &'static str,
    message: String,
) -> impl IntoView {
    let (screen_class, icon) = tone.classes();

    view! {
        <div class=screen_class>
            <div class="status-card">
                <div class="status-icon">{icon}</div>
                <h2>{title}</h2>
                {match tone {
                    ScreenTone::Error => view! {
                        <MessageBar intent=MessageBarIntent::Error>{message}</MessageBar>
                    }.into_any(),
                    ScreenTone::Neutral => view! { <p class="status-message">{message}</p> }.into_any(),
                }}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_pick_distinct_screens() {
        assert_ne!(ScreenTone::Error.classes(), ScreenTone::Neutral.classes());
        assert!(ScreenTone::Error.classes().0.ends_with("status-screen-error"));
    }
}
