//! Shared chrome for the role dashboards: header with identity and logout,
//! a section nav, and the routed content.

#[cfg(test)]
#[path = "dashboard_shell_test.rs"]
mod dashboard_shell_test;

use access::{AuthState, Role};
use leptos::prelude::*;

use crate::state::auth::{AuthHandle, identity_label, sign_out};

/// Section links for each role's dashboard.
#[must_use]
pub fn nav_links(role: Role) -> &'static [(&'static str, &'static str)] {
    match role {
        Role::Admin => &[
            ("Overview", "/admin"),
            ("Users", "/admin/users"),
            ("Employers", "/admin/employers"),
            ("Gigs", "/admin/gigs"),
        ],
        Role::Employer => &[
            ("Overview", "/employer"),
            ("Jobs", "/employer/jobs"),
            ("Applications", "/employer/applications"),
            ("Company", "/employer/profile"),
        ],
        Role::User => &[
            ("Overview", "/undergraduate"),
            ("Browse Gigs", "/undergraduate/gigs"),
            ("My Applications", "/undergraduate/applications"),
            ("Profile", "/undergraduate/profile"),
        ],
    }
}

#[component]
pub fn DashboardShell(role: Role, children: Children) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let handle = expect_context::<AuthHandle>();
    let busy = RwSignal::new(false);

    let on_logout = move |_| {
        if busy.get() {
            return;
        }
        busy.set(true);
        sign_out(handle);
    };

    let links = nav_links(role)
        .iter()
        .map(|(label, href)| view! { <a class="dashboard-nav__link" href=*href>{*label}</a> })
        .collect_view();

    view! {
        <div class="dashboard">
            <header class="dashboard__header">
                <span class="dashboard__title">{format!("{} Dashboard", role.label())}</span>
                <span class="dashboard__identity">{move || identity_label(&auth.get()).unwrap_or_default()}</span>
                <button class="dashboard__logout" on:click=on_logout disabled=move || busy.get()>
                    "Log out"
                </button>
            </header>
            <nav class="dashboard-nav">{links}</nav>
            <main class="dashboard__content">{children()}</main>
        </div>
    }
}
