//! Render-time guard around dashboard content.
//!
//! SYSTEM CONTEXT
//! ==============
//! The edge server redirects most wrong-role visits before anything renders.
//! This component covers client-side navigation and stale cookies by reading
//! the auth signal. It never navigates by itself: each non-granted outcome
//! renders a screen with a link the visitor follows.

#[cfg(test)]
#[path = "dashboard_guard_test.rs"]
mod dashboard_guard_test;

use access::guard::{DashboardView, evaluate};
use access::{AuthState, LOGIN_PATH, Role};
use leptos::prelude::*;

/// Explanation shown on the access-denied screen.
fn denial_text(view: &DashboardView) -> String {
    let DashboardView::AccessDenied { actual, .. } = view else {
        return String::new();
    };
    let required = view.required_labels();
    match actual {
        Some(role) => format!("This area is for {required} accounts. You are signed in as {}.", role.label()),
        None => format!("This area is for {required} accounts."),
    }
}

/// Renders `children` only when the auth state admits one of
/// `allowed_roles` (any signed-in role when omitted).
#[component]
pub fn DashboardGuard(#[prop(optional, into)] allowed_roles: Option<Vec<Role>>, children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    move || {
        let decision = evaluate(&auth.get(), allowed_roles.as_deref());
        match decision {
            DashboardView::Loading => view! {
                <div class="guard guard--loading" aria-busy="true">
                    <div class="guard__spinner"></div>
                    <p>"Loading..."</p>
                </div>
            }
            .into_any(),
            DashboardView::AuthenticationRequired => view! {
                <div class="guard">
                    <div class="guard__card">
                        <h2>"Authentication Required"</h2>
                        <p>"You need to be signed in to view this page."</p>
                        <a href=LOGIN_PATH class="guard__action">"Go to Login"</a>
                    </div>
                </div>
            }
            .into_any(),
            DashboardView::AccessDenied { .. } => {
                let home = decision.home_path();
                let message = denial_text(&decision);
                view! {
                    <div class="guard">
                        <div class="guard__card">
                            <h2>"Access Denied"</h2>
                            <p>{message}</p>
                            <a href=home class="guard__action">"Go to my dashboard"</a>
                        </div>
                    </div>
                }
                .into_any()
            }
            DashboardView::Granted => children().into_any(),
        }
    }
}
