//! Maintainer roster fetching and parsing
//!
//! Each repository publishes its maintainers as a pipe-delimited markdown
//! table in MAINTAINERS.md: `| Name | [login](profile url) | Affiliation |`.
//! Rows under an "Emeritus" section header are former maintainers and are
//! skipped; the section ends at the first non-empty line that is not a table
//! row. A missing or unreadable document yields an empty roster, never an
//! error, so one repository without a roster cannot abort a whole run.

use common::models::Maintainer;
use regex::Regex;
use tracing::{debug, warn};

/// Fetches maintainer rosters from raw.githubusercontent.com
pub struct RosterClient {
    client: reqwest::Client,
    org: String,
}

impl RosterClient {
    pub fn new(org: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            org: org.to_string(),
        }
    }

    /// Fetch and parse the active maintainers of `repo`
    pub async fn repo_maintainers(&self, repo: &str) -> Vec<Maintainer> {
        let url = format!(
            "https://raw.githubusercontent.com/{}/{}/main/MAINTAINERS.md",
            self.org, repo
        );
        debug!("GET {}", url);
        let text = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read MAINTAINERS.md for {}: {}", repo, e);
                    return Vec::new();
                }
            },
            Ok(resp) => {
                warn!(
                    "No readable MAINTAINERS.md for {} (status {})",
                    repo,
                    resp.status()
                );
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to fetch MAINTAINERS.md for {}: {}", repo, e);
                return Vec::new();
            }
        };
        parse_roster(repo, &text)
    }
}

/// Parse the active maintainer rows out of a MAINTAINERS.md document
pub fn parse_roster(repo: &str, document: &str) -> Vec<Maintainer> {
    // Bracketed github login in a markdown link: [login](url)
    let login_re = Regex::new(r"\[(.*?)\]").expect("static login pattern");
    let mut maintainers = Vec::new();
    let mut in_emeritus_section = false;

    for line in document.lines() {
        let line = line.trim();
        if line.starts_with('|') {
            let columns: Vec<&str> = line.split('|').collect();
            if columns.len() >= 4 {
                let name = columns[1].trim();
                let login = login_re
                    .captures(columns[2])
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str())
                    .unwrap_or("");
                let affiliation = columns[3].trim();
                if !in_emeritus_section
                    && !name.to_lowercase().contains("emeritus")
                    && !login.is_empty()
                {
                    maintainers.push(Maintainer {
                        repository: repo.to_string(),
                        name: name.to_string(),
                        github_login: login.to_string(),
                        affiliation: affiliation.to_string(),
                    });
                }
            }
        } else if line.contains("Emeritus") {
            in_emeritus_section = true;
        } else if !line.is_empty() && in_emeritus_section {
            in_emeritus_section = false;
        }
    }
    maintainers
}
