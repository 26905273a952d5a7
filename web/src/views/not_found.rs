use leptos::prelude::*;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="status-screen status-screen-neutral">
            <div class="status-card">
                <div class="status-icon">"🗺️"</div>
                <h2>"Page Not Found"</h2>
                <p class="status-message">
                    "Open the tracking link you were sent to follow your cab."
                </p>
            </div>
        </div>
    }
}
