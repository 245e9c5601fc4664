//! Gigboard frontend: Leptos app rendered on the server and hydrated in the
//! browser.
//!
//! ARCHITECTURE
//! ============
//! `state` owns the reactive auth context, `net` and `util` adapt the
//! platform-neutral `access` crate to the browser (fetch, `localStorage`,
//! `document.cookie`), `components` holds the dashboard guard, and `pages`
//! the route-level screens. Browser-only code sits behind the `hydrate`
//! feature; the `ssr` build gets inert stubs.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install panic/log hooks and hydrate the SSR markup.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
