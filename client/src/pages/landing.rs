//! Public landing page. Signed-in visitors never see it: the edge guard
//! sends them to their dashboard first.

#[cfg(test)]
#[path = "landing_test.rs"]
mod landing_test;

use access::{LOGIN_PATH, Role};
use leptos::prelude::*;

/// Login link with the account type preselected.
fn login_link(role: Role) -> String {
    format!("{LOGIN_PATH}?role={}", role.as_str())
}

#[component]
pub fn LandingPage() -> impl IntoView {
    let entries = [
        (Role::User, "Find paid gigs that fit around your studies."),
        (Role::Employer, "Post jobs and hire student talent."),
    ]
    .into_iter()
    .map(|(role, blurb)| {
        view! {
            <a class="landing-card" href=login_link(role)>
                <h2>{role.label()}</h2>
                <p>{blurb}</p>
            </a>
        }
    })
    .collect_view();

    view! {
        <div class="landing">
            <h1>"Gigboard"</h1>
            <p class="landing__tagline">"Short-term work for undergraduates."</p>
            <div class="landing__cards">{entries}</div>
            <a class="landing__signin" href=LOGIN_PATH>"Sign in"</a>
        </div>
    }
}
