//! Role dashboards.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each dashboard is a shell wrapped in `DashboardGuard`. Content is an
//! overview placeholder; the section pages beyond it belong to the wider
//! product and are outside this layer.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use access::{AuthState, Role};
use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::components::dashboard_guard::DashboardGuard;
use crate::components::dashboard_shell::{DashboardShell, nav_links};

/// Title of the nav section `path` belongs to, falling back to the overview.
fn section_title(role: Role, path: &str) -> &'static str {
    nav_links(role)
        .iter()
        .skip(1)
        .find(|(_, href)| path == *href || path.starts_with(&format!("{href}/")))
        .map_or("Overview", |(label, _)| *label)
}

#[component]
fn RoleDashboard(role: Role) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let pathname = use_location().pathname;
    let title = move || section_title(role, &pathname.get());
    let greeting = move || {
        auth.get()
            .display_name()
            .map(|name| format!("Welcome back, {name}."))
            .unwrap_or_default()
    };

    view! {
        <DashboardGuard allowed_roles=vec![role]>
            <DashboardShell role=role>
                <h1>{title}</h1>
                <p class="dashboard__greeting">{greeting}</p>
            </DashboardShell>
        </DashboardGuard>
    }
}

#[component]
pub fn AdminDashboard() -> impl IntoView {
    view! { <RoleDashboard role=Role::Admin /> }
}

#[component]
pub fn EmployerDashboard() -> impl IntoView {
    view! { <RoleDashboard role=Role::Employer /> }
}

#[component]
pub fn StudentDashboard() -> impl IntoView {
    view! { <RoleDashboard role=Role::User /> }
}
