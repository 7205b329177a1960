//! Login page: credential sign-in and password reset.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard sends visitors here with `redirect=<attempted url>` and an
//! optional `reason`. A successful sign-in chains the profile fetch so
//! role-gated targets can decide immediately, then returns to the preserved
//! target (local paths only).

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::error::AuthError;
use crate::net::api::AuthClient;
use crate::net::types::UserProfile;
use crate::util::auth::{REASON_EXPIRED, REASON_PARAM, REDIRECT_PARAM, safe_return_target};

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn validate_login_input(identifier: &str, password: &str) -> Result<(String, String), &'static str> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err("Enter your email or phone number.");
    }
    if password.is_empty() {
        return Err("Enter your password.");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters.");
    }
    Ok((identifier.to_owned(), password.to_owned()))
}

pub(crate) fn validate_reset_input(email: &str) -> Result<String, &'static str> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email.to_owned()),
        _ => Err("Enter the email address of your account."),
    }
}

pub(crate) fn reason_notice(reason: Option<&str>) -> Option<&'static str> {
    match reason {
        Some(REASON_EXPIRED) => Some("Your session has expired. Please sign in again."),
        _ => None,
    }
}

/// Sign in and load the profile in one step.
///
/// # Errors
///
/// Returns the first failing step's error. A profile failure leaves the
/// session authenticated unless the server rejected the new token.
pub async fn sign_in(client: &AuthClient, identifier: &str, password: &str) -> Result<UserProfile, AuthError> {
    client.login(identifier, password).await?;
    client.fetch_current_user().await
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let client = expect_context::<AuthClient>();
    let query = use_query_map();
    let navigate = use_navigate();

    let identifier = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let reset_email = RwSignal::new(String::new());
    let show_reset = RwSignal::new(false);
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let notice = move || query.with(|q| reason_notice(q.get(REASON_PARAM).as_deref()));

    let sign_in_client = client.clone();
    let on_sign_in = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (id_value, password_value) = match validate_login_input(&identifier.get(), &password.get()) {
            Ok(values) => values,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        let target = query.with_untracked(|q| {
            safe_return_target(q.get(REDIRECT_PARAM).as_deref(), &sign_in_client.config().default_path)
        });
        busy.set(true);
        info.set("Signing in...".to_owned());

        let client = sign_in_client.clone();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match sign_in(&client, &id_value, &password_value).await {
                Ok(_) => {
                    password.set(String::new());
                    info.set(String::new());
                    navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
                }
                Err(e) => info.set(e.user_message()),
            }
            busy.set(false);
        });
    };

    let on_reset = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let email_value = match validate_reset_input(&reset_email.get()) {
            Ok(value) => value,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Sending reset link...".to_owned());

        let client = client.clone();
        leptos::task::spawn_local(async move {
            match client.reset_password(&email_value).await {
                Ok(()) => {
                    show_reset.set(false);
                    info.set("If an account exists for that address, a reset link is on its way.".to_owned());
                }
                Err(e) => info.set(e.user_message()),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Chantier"</h1>
                <p class="login-card__subtitle">"Sign in to your projects"</p>
                {move || notice().map(|text| view! { <p class="login-message login-message--notice">{text}</p> })}
                <form class="login-form" hidden=move || show_reset.get() on:submit=on_sign_in>
                    <input
                        class="login-input"
                        type="text"
                        autocomplete="username"
                        placeholder="Email or phone number"
                        prop:value=move || identifier.get()
                        on:input=move |ev| identifier.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <form class="login-form" hidden=move || !show_reset.get() on:submit=on_reset>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || reset_email.get()
                        on:input=move |ev| reset_email.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Send Reset Link"
                    </button>
                </form>
                <button
                    class="login-link"
                    type="button"
                    on:click=move |_| {
                        show_reset.update(|v| *v = !*v);
                        info.set(String::new());
                    }
                >
                    {move || if show_reset.get() { "Back to sign in" } else { "Forgot your password?" }}
                </button>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}
