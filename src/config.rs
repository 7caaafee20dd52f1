/// Service configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Base URL of the search engine.
    pub es_url: String,
    /// Profile page URL template; `{username}` is substituted per probe.
    pub profile_url_template: String,
    /// Attach the permissive CORS layer.
    pub enable_cors: bool,
    /// Skip author visibility resolution entirely.
    pub disable_user_check: bool,
}

impl Config {
    /// Load config from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("SIFTER_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            es_url: std::env::var("SIFTER_ES_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:9200".to_string()),
            profile_url_template: std::env::var("SIFTER_PROFILE_URL")
                .unwrap_or_else(|_| "https://www.v2ex.com/member/{username}".to_string()),
            enable_cors: std::env::var("SIFTER_ENABLE_CORS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            disable_user_check: std::env::var("SIFTER_DISABLE_USER_CHECK")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            es_url: "http://127.0.0.1:9200".to_string(),
            profile_url_template: "https://www.v2ex.com/member/{username}".to_string(),
            enable_cors: true,
            disable_user_check: false,
        }
    }
}
