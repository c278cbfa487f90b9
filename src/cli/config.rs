use std::env;

/// Where the CLI finds the API and which token it presents
#[derive(Debug, Clone)]
pub struct ApiTarget {
    pub base_url: String,
    pub token: Option<String>,
}

impl ApiTarget {
    /// `CRM_API_URL` / `CRM_TOKEN`, falling back to the local server
    pub fn from_env() -> Self {
        let base_url = env::var("CRM_API_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", crate::config::config().api.port));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: env::var("CRM_TOKEN").ok().filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.token = token;
        }
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
