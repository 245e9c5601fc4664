//! Application shell and route table.
//!
//! SYSTEM CONTEXT
//! ==============
//! `shell` is the SSR document wrapper handed to `leptos_axum`; `App` is the
//! hydrated root. `App` provides the auth context before any route renders,
//! so every page and the dashboard guard can read it.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::{StaticSegment, WildcardSegment};

use crate::pages::auth_flow::{ForgotPasswordPage, RegisterPage, ResetPasswordPage, VerifyOtpPage};
use crate::pages::dashboard::{AdminDashboard, EmployerDashboard, StudentDashboard};
use crate::pages::landing::LandingPage;
use crate::pages::login::LoginPage;
use crate::state::auth::provide_auth;

/// SSR document wrapper.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_auth();

    view! {
        <Stylesheet id="leptos" href="/pkg/gigboard.css"/>
        <Title text="Gigboard"/>
        <Router>
            <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }>
                <Route path=StaticSegment("") view=LandingPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("login")) view=LoginPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("register")) view=RegisterPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("forgot-password")) view=ForgotPasswordPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("verify-otp")) view=VerifyOtpPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("reset-password")) view=ResetPasswordPage/>
                <Route path=StaticSegment("admin") view=AdminDashboard/>
                <Route path=(StaticSegment("admin"), WildcardSegment("section")) view=AdminDashboard/>
                <Route path=StaticSegment("employer") view=EmployerDashboard/>
                <Route path=(StaticSegment("employer"), WildcardSegment("section")) view=EmployerDashboard/>
                <Route path=StaticSegment("undergraduate") view=StudentDashboard/>
                <Route path=(StaticSegment("undergraduate"), WildcardSegment("section")) view=StudentDashboard/>
            </Routes>
        </Router>
    }
}
