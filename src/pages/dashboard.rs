//! Dashboard page: the default landing route for any signed-in user.
//!
//! Role denials elsewhere land here with `reason=insufficient_permissions`,
//! which is shown as a dismissible notice.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::net::api::AuthClient;
use crate::net::types::Role;
use crate::state::auth::AuthState;
use crate::util::auth::{REASON_INSUFFICIENT_PERMISSIONS, REASON_PARAM, RouteAccess, use_route_guard};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let client = expect_context::<AuthClient>();
    let query = use_query_map();
    let navigate = use_navigate();
    let admitted = use_route_guard(RouteAccess::authenticated());

    let dismissed = RwSignal::new(false);
    let denied = move || {
        !dismissed.get() && query.with(|q| q.get(REASON_PARAM).as_deref() == Some(REASON_INSUFFICIENT_PERMISSIONS))
    };

    let identity = move || {
        auth.get()
            .user
            .map(|user| (user.display_name(), user.role))
            .unwrap_or_else(|| ("Loading profile...".to_owned(), String::new()))
    };

    let login_path = client.config().login_path.clone();
    let on_logout = move |_| {
        client.logout();
        navigate(&login_path, NavigateOptions { replace: true, ..NavigateOptions::default() });
    };

    view! {
        <Show
            when=move || admitted.get()
            fallback=|| view! { <div class="dashboard-page dashboard-page--pending">"Checking your session..."</div> }
        >
            <div class="dashboard-page">
                <header class="dashboard-header">
                    <h1>"Projects"</h1>
                    <div class="dashboard-identity">
                        <span class="dashboard-identity__name">{move || identity().0}</span>
                        <span class="dashboard-identity__role">{move || identity().1}</span>
                    </div>
                </header>
                <Show when=denied>
                    <p class="dashboard-notice" role="alert">
                        "You do not have permission to open that page."
                        <button class="dashboard-notice__close" type="button" on:click=move |_| dismissed.set(true)>
                            "Dismiss"
                        </button>
                    </p>
                </Show>
                <Show when=move || auth.get().is(Role::Admin)>
                    <a class="dashboard-link" href="/admin">"User administration"</a>
                </Show>
            </div>
        </Show>
        <button class="dashboard-logout" type="button" hidden=move || !admitted.get() on:click=on_logout>
            "Sign Out"
        </button>
    }
}
