//! # chantier
//!
//! Leptos + WASM authentication layer for the construction-project
//! management front end.
//!
//! This crate owns the bearer-token lifecycle (persist, validate, evict),
//! the shared session state every page observes, the REST client for the
//! auth endpoints, and the route guard that gates pages by login state and
//! role.

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_helpers;

/// Browser entry point: install console logging and mount [`app::App`].
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("console logger unavailable: {e}").into());
    }
    leptos::mount::mount_to_body(app::App);
}
