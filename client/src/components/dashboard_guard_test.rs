use super::*;

#[test]
fn denial_text_names_both_roles() {
    let view = DashboardView::AccessDenied { required: vec![Role::Employer], actual: Some(Role::User) };
    assert_eq!(denial_text(&view), "This area is for Employer accounts. You are signed in as Student.");
}

#[test]
fn denial_text_without_actual_role() {
    let view = DashboardView::AccessDenied { required: vec![Role::Admin, Role::Employer], actual: None };
    assert_eq!(denial_text(&view), "This area is for Administrator, Employer accounts.");
}

#[test]
fn denial_text_empty_for_other_views() {
    assert!(denial_text(&DashboardView::Granted).is_empty());
}
