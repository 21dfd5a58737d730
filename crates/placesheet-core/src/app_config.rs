use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub sheet_id: Option<String>,
    pub search_url: String,
    pub result_limit: usize,
    pub sheet_range: String,
    pub wait_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub client_secrets_path: PathBuf,
    pub token_path: PathBuf,
    pub http_timeout_secs: u64,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("sheet_id", &self.sheet_id.as_ref().map(|_| "[redacted]"))
            .field("search_url", &self.search_url)
            .field("result_limit", &self.result_limit)
            .field("sheet_range", &self.sheet_range)
            .field("wait_timeout_ms", &self.wait_timeout_ms)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("headless", &self.headless)
            .field("chrome_path", &self.chrome_path)
            .field("client_secrets_path", &self.client_secrets_path)
            .field("token_path", &self.token_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}
