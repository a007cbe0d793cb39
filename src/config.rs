use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "issue-hook", version, about = "Links pushed commits to tracker issues")]
pub struct Cli {
    #[arg(long, env = "ISSUE_HOOK_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: String,
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_service_key: Option<String>,
    #[arg(long, env = "ISSUE_HOOK_STORE_TIMEOUT_SECS", default_value_t = 10)]
    pub store_timeout_secs: u64,
    /// Marker required in front of issue references, e.g. `BUG-`.
    #[arg(long, env = "ISSUE_HOOK_REFERENCE_TAG")]
    pub reference_tag: Option<String>,
    #[arg(long, env = "ISSUE_HOOK_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Cli {
    /// Store URL and service key, if both are set and non-empty.
    pub fn store_credentials(&self) -> Option<(&str, &str)> {
        let url = self.supabase_url.as_deref().filter(|v| !v.is_empty())?;
        let key = self
            .supabase_service_key
            .as_deref()
            .filter(|v| !v.is_empty())?;

        Some((url, key))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_need_url_and_key() {
        let cli = Cli::try_parse_from([
            "issue-hook",
            "--supabase-url",
            "https://db.example.test",
            "--supabase-service-key",
            "service",
        ])
        .unwrap();
        assert_eq!(
            cli.store_credentials(),
            Some(("https://db.example.test", "service"))
        );

        let cli = Cli::try_parse_from([
            "issue-hook",
            "--supabase-url",
            "https://db.example.test",
            "--supabase-service-key",
            "",
        ])
        .unwrap();
        assert_eq!(cli.store_credentials(), None);
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["issue-hook", "--listen", "127.0.0.1:8080"]).unwrap();

        assert_eq!(cli.listen, "127.0.0.1:8080");
        assert_eq!(cli.store_timeout(), Duration::from_secs(10));
        assert!(!cli.log_json);
    }
}
