use super::prompt::SYSTEM_PROMPT;
use crate::config::Tunables;
use crate::error::{upstream_error, PrepResult};
use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::openai::Client as OpenAiClient;
use tracing::info;

/// Text-generation backend used to write briefs
#[async_trait]
pub trait BriefGenerator: Send + Sync + 'static {
    /// Complete a single prompt and return the raw generated text
    async fn complete(&self, prompt: &str) -> PrepResult<String>;
}

/// OpenAI-compatible completion through Rig
pub struct RigBriefGenerator {
    client: OpenAiClient,
    model: String,
    temperature: f64,
    max_tokens: u64,
}

impl RigBriefGenerator {
    pub fn new(api_key: &str, base_url: Option<&str>, tunables: &Tunables) -> Self {
        let client = match base_url {
            Some(url) => OpenAiClient::from_url(api_key, url),
            None => OpenAiClient::new(api_key),
        };

        Self {
            client,
            model: tunables.model.clone(),
            temperature: tunables.temperature,
            max_tokens: tunables.max_tokens,
        }
    }
}

#[async_trait]
impl BriefGenerator for RigBriefGenerator {
    async fn complete(&self, prompt: &str) -> PrepResult<String> {
        info!("Requesting brief from model {}", self.model);

        let agent = self
            .client
            .agent(&self.model)
            .preamble(SYSTEM_PROMPT)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let response = agent
            .chat(prompt.to_string(), Vec::<Message>::new())
            .await
            .map_err(|e| upstream_error(&format!("Completion request failed: {}", e)))?;

        info!("Received {} characters from model", response.len());
        Ok(response)
    }
}
