use super::*;

#[test]
fn section_title_matches_nested_paths() {
    assert_eq!(section_title(Role::Employer, "/employer/jobs/42"), "Jobs");
    assert_eq!(section_title(Role::Employer, "/employer"), "Overview");
    assert_eq!(section_title(Role::User, "/undergraduate/gigs"), "Browse Gigs");
}

#[test]
fn section_title_ignores_lookalike_prefixes() {
    assert_eq!(section_title(Role::Admin, "/admin/usersettings"), "Overview");
}
