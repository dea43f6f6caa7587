pub mod auth;
pub mod change_requests;
pub mod client_workouts;
pub mod exercises;
pub mod health;
pub mod plans;
pub mod statistics;
pub mod trainers;
pub mod users;

/// Page size used when a list request does not give one.
pub(crate) const DEFAULT_PAGE_LIMIT: u64 = 10;

/// `(page, limit)` with defaults applied; both are at least 1.
pub(crate) fn page_params(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> (u64, u64) {
    (page.unwrap_or(1).max(1), limit.unwrap_or(default_limit).max(1))
}

/// Splits a comma separated query value, dropping blanks.
pub(crate) fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_apply_defaults() {
        assert_eq!(page_params(None, None, 20), (1, 20));
        assert_eq!(page_params(Some(3), Some(5), 20), (3, 5));
        assert_eq!(page_params(Some(0), Some(0), 20), (1, 1));
    }

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv("legs, chest,,  "), vec!["legs", "chest"]);
        assert!(split_csv("").is_empty());
    }
}
