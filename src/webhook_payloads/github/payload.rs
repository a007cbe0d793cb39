use super::{GithubCommit, GithubRepository};

const BRANCH_REF_PREFIX: &str = "refs/heads/";

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug)]
pub struct GithubPushWebhookPayload {
    #[serde(rename = "ref")]
    pub reference: String,
    pub repository: GithubRepository,
    #[serde(default)]
    pub commits: Vec<GithubCommit>,
}

impl GithubPushWebhookPayload {
    /// Branch name for `refs/heads/*` refs, the raw ref otherwise.
    pub fn branch(&self) -> &str {
        self.reference
            .strip_prefix(BRANCH_REF_PREFIX)
            .unwrap_or(&self.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_with_ref(reference: &str) -> GithubPushWebhookPayload {
        serde_json::from_value(json!({
            "ref": reference,
            "repository": { "full_name": "acme/shop", "html_url": "https://github.com/acme/shop" },
            "commits": []
        }))
        .unwrap()
    }

    #[test]
    fn branch_strips_heads_prefix() {
        assert_eq!(payload_with_ref("refs/heads/main").branch(), "main");
        assert_eq!(
            payload_with_ref("refs/heads/feature/login").branch(),
            "feature/login"
        );
    }

    #[test]
    fn branch_keeps_other_refs() {
        assert_eq!(payload_with_ref("refs/tags/v1.0").branch(), "refs/tags/v1.0");
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let payload: GithubPushWebhookPayload = serde_json::from_value(json!({
            "ref": "refs/heads/main",
            "before": "000",
            "after": "111",
            "pusher": { "name": "ada" },
            "repository": { "full_name": "acme/shop", "private": true },
            "commits": []
        }))
        .unwrap();

        assert_eq!(payload.repository.full_name, "acme/shop");
        assert!(payload.repository.html_url.is_none());
    }
}
