//! Account-flow pages next to login: register, forgot password, verify OTP
//! and reset password.
//!
//! Each page names the step and links back to sign in; the forms for these
//! steps post to backend endpoints outside the session layer.

#[cfg(test)]
#[path = "auth_flow_test.rs"]
mod auth_flow_test;

use access::LOGIN_PATH;
use leptos::prelude::*;

/// One account-flow step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFlow {
    Register,
    ForgotPassword,
    VerifyOtp,
    ResetPassword,
}

impl AuthFlow {
    pub const ALL: [AuthFlow; 4] = [Self::Register, Self::ForgotPassword, Self::VerifyOtp, Self::ResetPassword];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Register => "/auth/register",
            Self::ForgotPassword => "/auth/forgot-password",
            Self::VerifyOtp => "/auth/verify-otp",
            Self::ResetPassword => "/auth/reset-password",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Register => "Create an account",
            Self::ForgotPassword => "Forgot your password?",
            Self::VerifyOtp => "Verify your email",
            Self::ResetPassword => "Choose a new password",
        }
    }

    fn blurb(self) -> &'static str {
        match self {
            Self::Register => "Sign up as a student or an employer to start using Gigboard.",
            Self::ForgotPassword => "We will email you a one-time code to reset your password.",
            Self::VerifyOtp => "Enter the one-time code we sent to your email address.",
            Self::ResetPassword => "Set a new password, then sign in again.",
        }
    }
}

#[component]
fn AuthFlowPage(flow: AuthFlow) -> impl IntoView {
    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>{flow.title()}</h1>
                <p class="login-card__subtitle">{flow.blurb()}</p>
                <p class="login-card__footer">
                    <a href=LOGIN_PATH>"Back to sign in"</a>
                </p>
            </div>
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    view! { <AuthFlowPage flow=AuthFlow::Register /> }
}

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    view! { <AuthFlowPage flow=AuthFlow::ForgotPassword /> }
}

#[component]
pub fn VerifyOtpPage() -> impl IntoView {
    view! { <AuthFlowPage flow=AuthFlow::VerifyOtp /> }
}

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    view! { <AuthFlowPage flow=AuthFlow::ResetPassword /> }
}
