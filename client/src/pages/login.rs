//! Login page: email, password and account type.
//!
//! On success the browser does a full navigation to the post-login target so
//! the edge guard sees the freshly written cookies. The `redirect` query
//! parameter set by the edge guard is honoured when the chosen role may open
//! it; `role` preselects the account type.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use access::Role;
use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::pages::auth_flow::AuthFlow;
use crate::state::auth::AuthHandle;

/// Trim inputs and require both fields.
fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter your email and password.");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

/// Account type from the select value or `role` query param; students by
/// default.
fn parse_role_choice(raw: Option<&str>) -> Role {
    raw.and_then(Role::parse).unwrap_or(Role::User)
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let handle = expect_context::<AuthHandle>();
    let query = use_query_map();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let role = RwSignal::new(parse_role_choice(query.read_untracked().get("role").as_deref()));
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(pair) => pair,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        let chosen = role.get();
        let redirect = query.read_untracked().get(access::routes::REDIRECT_PARAM);
        busy.set(true);
        info.set("Signing in...".to_owned());

        #[cfg(feature = "hydrate")]
        {
            let ctx = handle.get_value();
            leptos::task::spawn_local(async move {
                match ctx.login(&email_value, &password_value, chosen, redirect.as_deref()).await {
                    Ok(target) => {
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().set_href(&target);
                        }
                    }
                    Err(e) => {
                        log::warn!("login failed: {e}");
                        info.set(e.user_message());
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (handle, email_value, password_value, chosen, redirect);
        }
    };

    let role_options = Role::ALL
        .into_iter()
        .map(|r| {
            view! {
                <option value=r.as_str() selected=move || role.get() == r>
                    {r.label()}
                </option>
            }
        })
        .collect_view();

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Gigboard"</h1>
                <p class="login-card__subtitle">"Sign in to your account"</p>
                <form class="login-form" on:submit=on_submit>
                    <select
                        class="login-input"
                        on:change=move |ev| role.set(parse_role_choice(Some(&event_target_value(&ev))))
                    >
                        {role_options}
                    </select>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    <a href=AuthFlow::ForgotPassword.path()>"Forgot password?"</a>
                    " · "
                    <a href=AuthFlow::Register.path()>"Create an account"</a>
                </p>
            </div>
        </div>
    }
}
