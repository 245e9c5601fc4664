use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn default_policy_matches_documented_ttls() {
    let policy = CookiePolicy::default();
    assert_eq!(policy.access_max_age, Duration::days(30));
    assert_eq!(policy.role_max_age, Duration::days(30));
    assert_eq!(policy.refresh_max_age, Duration::days(7));
}

#[test]
fn from_lookup_overrides_each_cookie() {
    let policy = CookiePolicy::from_lookup(lookup(&[
        ("ACCESS_COOKIE_DAYS", "1"),
        ("REFRESH_COOKIE_DAYS", "14"),
        ("ROLE_COOKIE_DAYS", "2"),
    ]));
    assert_eq!(policy.access_max_age, Duration::days(1));
    assert_eq!(policy.refresh_max_age, Duration::days(14));
    assert_eq!(policy.role_max_age, Duration::days(2));
}

#[test]
fn from_lookup_ignores_invalid_values() {
    let policy = CookiePolicy::from_lookup(lookup(&[("ACCESS_COOKIE_DAYS", "soon"), ("REFRESH_COOKIE_DAYS", "0")]));
    assert_eq!(policy, CookiePolicy::default());
}

#[test]
fn from_lookup_rejects_out_of_range_days() {
    let policy = CookiePolicy::from_lookup(lookup(&[
        ("ACCESS_COOKIE_DAYS", "999999999999999"),
        ("REFRESH_COOKIE_DAYS", "3651"),
        ("ROLE_COOKIE_DAYS", "-5"),
    ]));
    assert_eq!(policy, CookiePolicy::default());
}

#[test]
fn from_lookup_accepts_the_upper_bound() {
    let policy = CookiePolicy::from_lookup(lookup(&[("REFRESH_COOKIE_DAYS", "3650")]));
    assert_eq!(policy.refresh_max_age, Duration::days(MAX_COOKIE_DAYS));
}
