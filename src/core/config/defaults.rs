pub const DEFAULT_MODEL: &str = "llama2";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_KNOWLEDGE_FILE: &str = "knowledge_base.json";
pub const DEFAULT_LANGUAGE: &str = "繁體中文";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE_NAME: &str = "assistant.log";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
// Model downloads can run for a long time.
pub const DEFAULT_PULL_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

pub const DEFAULT_PERSONA: &str = "你是一個捐贈諮詢助手，協助民眾找到合適的物資捐贈地點。";

pub fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

pub fn default_base_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

pub fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

pub fn default_pull_timeout_secs() -> u64 {
    DEFAULT_PULL_TIMEOUT_SECS
}

pub fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

pub fn default_knowledge_path() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_KNOWLEDGE_FILE)
}

pub fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

pub fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

pub fn default_log_file_name() -> String {
    DEFAULT_LOG_FILE_NAME.to_string()
}

pub fn default_true() -> bool {
    true
}
