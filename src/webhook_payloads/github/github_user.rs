/// Commit author as embedded in push payloads.
///
/// `username` is only present when the author email maps to a GitHub account.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct GithubUser {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
}
