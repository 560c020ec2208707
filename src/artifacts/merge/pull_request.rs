use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullStatus {
    Open,
    Draft,
    Closed,
    Merged,
}

impl std::fmt::Display for PullStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PullStatus::Open => "open",
            PullStatus::Draft => "draft",
            PullStatus::Closed => "closed",
            PullStatus::Merged => "merged",
        };
        write!(f, "{}", label)
    }
}

/// Strategy used to integrate a pull request into its target branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// One merge commit carrying both heads as parents
    Merge,
    /// One single-parent commit collapsing the source history
    Squash,
    /// Labelled rebase: still one integrating commit with both heads as
    /// parents, no commit replay
    Rebase,
}

impl MergeStrategy {
    pub fn try_parse(value: &str) -> Option<MergeStrategy> {
        match value {
            "merge" => Some(MergeStrategy::Merge),
            "squash" => Some(MergeStrategy::Squash),
            "rebase" => Some(MergeStrategy::Rebase),
            _ => None,
        }
    }
}

/// Persisted pull-request record (`pulls/<number>.json`)
///
/// Numbers are assigned per repository starting at 1. Head and base shas are
/// snapshots of the branch heads taken when the pull request was opened;
/// `head_sha` is refreshed to the source head at merge time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author: String,
    pub source_branch: String,
    pub target_branch: String,
    pub head_sha: String,
    pub base_sha: String,
    pub status: PullStatus,
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        matches!(self.status, PullStatus::Open | PullStatus::Draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PullStatus::Merged).unwrap(), "\"merged\"");
        let parsed: PullStatus = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(parsed, PullStatus::Draft);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(MergeStrategy::try_parse("squash"), Some(MergeStrategy::Squash));
        assert_eq!(MergeStrategy::try_parse("octopus"), None);
    }

    #[test]
    fn test_record_round_trip() {
        let pull = PullRequest {
            number: 3,
            title: "Add parser".into(),
            description: None,
            author: "bob".into(),
            source_branch: "feature/parser".into(),
            target_branch: "main".into(),
            head_sha: "a".repeat(40),
            base_sha: "b".repeat(40),
            status: PullStatus::Open,
            reviewers: vec!["carol".into()],
            merge_commit_sha: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&pull).unwrap();
        let parsed: PullRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.number, 3);
        assert!(parsed.is_open());
        assert_eq!(parsed.reviewers, vec!["carol".to_string()]);
    }
}
