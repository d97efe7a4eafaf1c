pub mod chat;

pub const DEFAULT_API_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_MODEL: &str = "sonar-pro";

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub completion_model: Option<String>,
}
