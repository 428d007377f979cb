//! Metric definition registry
//!
//! The closed set of general metrics. Every variant is a pure function of a
//! repository name: a display name (also the record identity key), a boolean
//! filter, and the source index to count against. Adding a metric means
//! adding a variant here; the general pipeline iterates [`GeneralMetric::ALL`]
//! and needs no change.

use search::BoolQuery;

use crate::{EVENTS_INDEX, ISSUES_INDEX, PULLS_INDEX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralMetric {
    UntriagedIssues,
    UncommentedPullRequests,
    UnlabelledPullRequests,
    UnlabelledIssues,
    MergedPullRequests,
    OpenPullRequests,
    OpenIssues,
    ClosedIssues,
    CreatedIssues,
    IssueComments,
    PullComments,
    IssuePositiveReactions,
    IssueNegativeReactions,
}

impl GeneralMetric {
    pub const ALL: [GeneralMetric; 13] = [
        GeneralMetric::UntriagedIssues,
        GeneralMetric::UncommentedPullRequests,
        GeneralMetric::UnlabelledPullRequests,
        GeneralMetric::UnlabelledIssues,
        GeneralMetric::MergedPullRequests,
        GeneralMetric::OpenPullRequests,
        GeneralMetric::OpenIssues,
        GeneralMetric::ClosedIssues,
        GeneralMetric::CreatedIssues,
        GeneralMetric::IssueComments,
        GeneralMetric::PullComments,
        GeneralMetric::IssuePositiveReactions,
        GeneralMetric::IssueNegativeReactions,
    ];

    /// Display name, also used as the record identity key
    pub fn name(&self) -> &'static str {
        match self {
            GeneralMetric::UntriagedIssues => "Untriaged Issues",
            GeneralMetric::UncommentedPullRequests => "Uncommented Pull Requests",
            GeneralMetric::UnlabelledPullRequests => "Unlabelled Pull Requests",
            GeneralMetric::UnlabelledIssues => "Unlabelled Issues",
            GeneralMetric::MergedPullRequests => "Pull Requests Merged",
            GeneralMetric::OpenPullRequests => "Open Pull Requests",
            GeneralMetric::OpenIssues => "Open Issues",
            GeneralMetric::ClosedIssues => "Closed Issues",
            GeneralMetric::CreatedIssues => "Created Issues",
            GeneralMetric::IssueComments => "Issue Comments",
            GeneralMetric::PullComments => "Pull Comments",
            GeneralMetric::IssuePositiveReactions => "Issue Positive Reactions",
            GeneralMetric::IssueNegativeReactions => "Issue Negative Reactions",
        }
    }

    /// Boolean filter for this metric scoped to `repo`
    pub fn query(&self, repo: &str) -> BoolQuery {
        let base = BoolQuery::new().must_term("repository.keyword", repo);
        match self {
            GeneralMetric::UntriagedIssues => base
                .must_term("issue_labels.keyword", "untriaged")
                .must_term("state.keyword", "open"),
            GeneralMetric::UncommentedPullRequests => base
                .must_count("comment_count", 0)
                .must_term("state.keyword", "open"),
            GeneralMetric::UnlabelledPullRequests => base
                .must_not_exist("pull_labels.keyword")
                .must_term("state.keyword", "open"),
            GeneralMetric::UnlabelledIssues => base
                .must_not_exist("issue_labels.keyword")
                .must_term("state.keyword", "open"),
            GeneralMetric::MergedPullRequests => base.must_bool("merged", true),
            GeneralMetric::OpenPullRequests => base.must_term("state.keyword", "open"),
            GeneralMetric::OpenIssues => base.must_term("state.keyword", "open"),
            GeneralMetric::ClosedIssues => base.must_term("state.keyword", "closed"),
            GeneralMetric::CreatedIssues => base,
            GeneralMetric::IssueComments => base.must_term("type.keyword", "IssueCommentEvent"),
            GeneralMetric::PullComments => {
                base.must_term("type.keyword", "PullRequestReviewCommentEvent")
            }
            GeneralMetric::IssuePositiveReactions => base.must_exist("reactions_plus"),
            GeneralMetric::IssueNegativeReactions => base.must_exist("reactions_minus"),
        }
    }

    /// Source index the filter counts against
    pub fn index(&self) -> &'static str {
        match self {
            GeneralMetric::UntriagedIssues
            | GeneralMetric::UnlabelledIssues
            | GeneralMetric::OpenIssues
            | GeneralMetric::ClosedIssues
            | GeneralMetric::CreatedIssues
            | GeneralMetric::IssuePositiveReactions
            | GeneralMetric::IssueNegativeReactions => ISSUES_INDEX,
            GeneralMetric::UncommentedPullRequests
            | GeneralMetric::UnlabelledPullRequests
            | GeneralMetric::MergedPullRequests
            | GeneralMetric::OpenPullRequests => PULLS_INDEX,
            GeneralMetric::IssueComments | GeneralMetric::PullComments => EVENTS_INDEX,
        }
    }
}
