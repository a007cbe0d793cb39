#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct GithubRepository {
    /// `owner/name`
    pub full_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
}
