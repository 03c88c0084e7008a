//! Leptos web frontend for the candidate-screening service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Built as a client-side rendered WASM bundle (`csr` feature). The session
//! core lives in the `session` crate; this crate supplies the browser pieces
//! it is generic over (localStorage, `gloo-net`) and the routed pages.
//!
//! Without `csr` everything still compiles natively so page helpers and
//! state bridging can be unit tested on the host.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install panic/log hooks and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
