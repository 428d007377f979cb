//! Application configuration

use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub search_url: String,
    pub search_username: Option<String>,
    pub search_password: Option<String>,
    /// GitHub organization that owns the tracked repositories
    pub github_org: String,
    /// Repositories to compute metrics for
    pub repos: Vec<String>,
    pub webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            search_url: env::var("SEARCH_URL")
                .unwrap_or_else(|_| "http://localhost:9200".to_string()),
            search_username: env::var("SEARCH_USERNAME").ok(),
            search_password: env::var("SEARCH_PASSWORD").ok(),
            github_org: env::var("GITHUB_ORG").unwrap_or_else(|_| "opensearch-project".to_string()),
            repos: env::var("REPOS")
                .map(|v| parse_repo_list(&v))
                .unwrap_or_default(),
            webhook_url: env::var("WEBHOOK_URL").ok(),
        }
    }
}

fn parse_repo_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| r.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_list() {
        assert_eq!(
            parse_repo_list("OpenSearch, opensearch-py ,,job-scheduler"),
            vec!["OpenSearch", "opensearch-py", "job-scheduler"]
        );
    }

    #[test]
    fn test_parse_repo_list_empty() {
        assert!(parse_repo_list("").is_empty());
        assert!(parse_repo_list(" , ").is_empty());
    }
}
