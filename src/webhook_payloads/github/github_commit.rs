use chrono::{DateTime, FixedOffset};

use super::GithubUser;

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct GithubCommit {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<FixedOffset>,
    pub author: GithubUser,
    pub url: String,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

impl GithubCommit {
    /// Plain sum of the three path lists. A path listed twice counts twice.
    pub fn files_changed(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}
