//! Candidate endpoint lists, in the order they are tried.
//!
//! `base` is the configured base URL without a trailing `/`.

use crate::resolver::CandidateRequest;
use crate::status::ResourceType;

/// Current user profile.
pub fn profile(base: &str) -> Vec<CandidateRequest> {
    ["/clients/me", "/app/me", "/me", "/user"]
        .iter()
        .map(|p| CandidateRequest::get(format!("{base}{p}")))
        .collect()
}

/// Current contract.
pub fn contract(base: &str) -> Vec<CandidateRequest> {
    [
        "/app/contract",
        "/app/contracts/me",
        "/clients/contract",
        "/contract",
        "/contracts/me",
        "/client/contract",
    ]
    .iter()
    .map(|p| CandidateRequest::get(format!("{base}{p}")))
    .collect()
}

/// Account deletion. Destructive: resolution must stop at the first success.
pub fn delete_account(base: &str) -> Vec<CandidateRequest> {
    vec![
        CandidateRequest::delete(format!("{base}/app/me")),
        CandidateRequest::delete(format!("{base}/me")),
        CandidateRequest::delete(format!("{base}/clients/me")),
        CandidateRequest::delete(format!("{base}/user")),
        CandidateRequest::post(format!("{base}/app/delete-account")),
        CandidateRequest::post(format!("{base}/delete-account")),
    ]
}

/// Status dictionary for `kind`. `History` and `None` probe every family.
pub fn statuses(base: &str, kind: Option<ResourceType>) -> Vec<CandidateRequest> {
    let families: &[&str] = match kind {
        Some(ResourceType::Responses) => &["responses"],
        Some(ResourceType::Repairs) => &["repairs"],
        Some(ResourceType::Services) => &["services"],
        Some(ResourceType::History) | None => &["responses", "repairs", "services"],
    };

    let mut urls = Vec::with_capacity(families.len() * 3 + 3);
    for family in families {
        urls.push(format!("{base}/app/{family}/statuses"));
        urls.push(format!("{base}/app/statuses/{family}"));
        urls.push(format!("{base}/app/{family}-statuses"));
    }
    urls.push(format!("{base}/app/statuses"));
    urls.push(format!("{base}/statuses"));
    urls.push(format!("{base}/status"));

    urls.into_iter().map(CandidateRequest::get).collect()
}

/// Session logout.
pub fn logout(base: &str) -> CandidateRequest {
    CandidateRequest::post(format!("{base}/app/logout"))
}

pub fn login(base: &str) -> CandidateRequest {
    CandidateRequest::post(format!("{base}/app/login"))
}

pub fn register(base: &str) -> CandidateRequest {
    CandidateRequest::post(format!("{base}/app/clients/register"))
}

pub fn forgot_password(base: &str) -> CandidateRequest {
    CandidateRequest::post(format!("{base}/app/clients/forgot-password"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::HttpMethod;

    fn urls(list: &[CandidateRequest]) -> Vec<&str> {
        list.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn repairs_statuses_then_generic_fallbacks() {
        let list = statuses("http://h/api", Some(ResourceType::Repairs));
        assert_eq!(
            urls(&list),
            vec![
                "http://h/api/app/repairs/statuses",
                "http://h/api/app/statuses/repairs",
                "http://h/api/app/repairs-statuses",
                "http://h/api/app/statuses",
                "http://h/api/statuses",
                "http://h/api/status",
            ]
        );
        assert!(list.iter().all(|c| c.method == HttpMethod::Get));
    }

    #[test]
    fn history_probes_all_three_families() {
        let list = statuses("http://h", Some(ResourceType::History));
        assert_eq!(list.len(), 12);
        assert_eq!(list[0].url, "http://h/app/responses/statuses");
        assert_eq!(list[3].url, "http://h/app/repairs/statuses");
        assert_eq!(list[6].url, "http://h/app/services/statuses");
        assert_eq!(urls(&statuses("http://h", None)), urls(&list));
    }

    #[test]
    fn delete_account_tries_deletes_before_posts() {
        let list = delete_account("http://h");
        let methods: Vec<_> = list.iter().map(|c| c.method).collect();
        assert_eq!(
            methods,
            vec![
                HttpMethod::Delete,
                HttpMethod::Delete,
                HttpMethod::Delete,
                HttpMethod::Delete,
                HttpMethod::Post,
                HttpMethod::Post,
            ]
        );
        assert_eq!(list[0].url, "http://h/app/me");
    }

    #[test]
    fn profile_order() {
        assert_eq!(
            urls(&profile("http://h")),
            vec!["http://h/clients/me", "http://h/app/me", "http://h/me", "http://h/user"]
        );
        assert_eq!(contract("http://h").len(), 6);
    }
}
