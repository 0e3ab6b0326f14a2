use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Where the API lives and where the session token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token_file: PathBuf,
}

impl ClientConfig {
    /// Reads `TASKBOARD_API_URL` and `TASKBOARD_TOKEN_FILE`, falling back to
    /// `http://localhost:8080` and `<data dir>/taskboard/token`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("TASKBOARD_API_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token_file = lookup("TASKBOARD_TOKEN_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_token_file);
        Self { api_url, token_file }
    }
}

fn default_token_file() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("taskboard");
    p.push("token");
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.token_file.ends_with("taskboard/token"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ClientConfig::from_lookup(|key| match key {
            "TASKBOARD_API_URL" => Some("https://tasks.example.com".to_string()),
            "TASKBOARD_TOKEN_FILE" => Some("/tmp/tb-token".to_string()),
            _ => None,
        });
        assert_eq!(config.api_url, "https://tasks.example.com");
        assert_eq!(config.token_file, PathBuf::from("/tmp/tb-token"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = ClientConfig::from_lookup(|_| Some(String::new()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
