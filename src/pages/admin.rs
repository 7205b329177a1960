//! Administration page, restricted to the `ADMIN` role.

use leptos::prelude::*;

use crate::net::types::Role;
use crate::state::auth::AuthState;
use crate::util::auth::{RouteAccess, use_route_guard};

/// Lists the role vocabulary the route guard understands.
#[component]
pub fn AdminPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let admitted = use_route_guard(RouteAccess::roles(&[Role::Admin]));

    let admin_name = move || auth.get().user.map(|u| u.display_name()).unwrap_or_default();

    view! {
        <Show
            when=move || admitted.get()
            fallback=|| view! { <div class="admin-page admin-page--pending">"Checking your access..."</div> }
        >
            <div class="admin-page">
                <h1>"User administration"</h1>
                <p class="admin-page__who">"Signed in as " {admin_name}</p>
                <table class="admin-roles">
                    <thead>
                        <tr>
                            <th>"Role"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {Role::ALL
                            .iter()
                            .map(|role| view! { <tr><td>{role.as_str()}</td></tr> })
                            .collect_view()}
                    </tbody>
                </table>
                <a class="admin-page__back" href="/">"Back to projects"</a>
            </div>
        </Show>
    }
}
