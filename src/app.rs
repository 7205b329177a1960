//! Root application component with routing and context providers.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::config::ClientConfig;
use crate::net::api::AuthClient;
use crate::net::transport::BrowserTransport;
use crate::pages::{admin::AdminPage, dashboard::DashboardPage, login::LoginPage};
use crate::state::session::Session;
use crate::state::token_store::TokenStore;
use crate::util::auth::RouteGuard;
use crate::util::storage::LocalStorage;

/// Root application component.
///
/// Restores the session from `localStorage`, mirrors it into an
/// `RwSignal<AuthState>`, and provides the signal, the [`AuthClient`] and the
/// [`RouteGuard`] as contexts for every page.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::from_build_env();
    let guard = RouteGuard::new(&config);
    let session = Session::restore(TokenStore::new(Arc::new(LocalStorage)));

    let auth = RwSignal::new(session.state());
    session.subscribe(move |state| auth.set(state.clone()));

    let client = AuthClient::new(config, Arc::new(BrowserTransport), session);

    provide_context(auth);
    provide_context(client.clone());
    provide_context(guard);

    // A restored token without a cached profile needs one round trip before
    // role-gated pages can decide.
    leptos::task::spawn_local(async move {
        if let Err(e) = client.restore_profile().await {
            log::warn!("profile restore failed: {e}");
        }
    });

    view! {
        <Title text="Chantier"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("") view=DashboardPage/>
                <Route path=StaticSegment("admin") view=AdminPage/>
            </Routes>
        </Router>
    }
}
