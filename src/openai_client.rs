// src/openai_client.rs
// OpenAI chat-completions client for YouTube metadata generation.
//
// Metadata is best-effort: every failure mode (missing key, request error,
// malformed JSON) falls back to deterministic defaults built from the prompt,
// and a parsed response only overrides the fields it actually carries.

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl VideoMetadata {
    /// Deterministic defaults: title embeds today's date, description embeds
    /// the original prompt verbatim.
    pub fn defaults(prompt: &str) -> Self {
        Self {
            title: format!("Amazing Dog Video - {}", Utc::now().format("%Y-%m-%d")),
            description: format!(
                "Check out this amazing dog video!\n\n{}\n\n#Shorts #Dogs #Pets #Cute",
                prompt
            ),
            tags: ["shorts", "dogs", "pets", "cute", "animals"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    /// Override each field independently from a parsed model response.
    /// Missing or mis-typed fields keep their defaults.
    fn apply_overrides(mut self, parsed: &Value) -> Self {
        if let Some(title) = parsed["title"].as_str() {
            self.title = title.to_string();
        }
        if let Some(description) = parsed["description"].as_str() {
            self.description = description.to_string();
        }
        if let Some(tags) = parsed["tags"].as_array() {
            let tags: Vec<String> = tags
                .iter()
                .filter_map(|t| t.as_str().map(|s| s.to_string()))
                .collect();
            if !tags.is_empty() {
                self.tags = tags;
            }
        }
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Generate Shorts metadata for a prompt. Never fails; falls back to
    /// `VideoMetadata::defaults` on any error.
    pub async fn generate_metadata(&self, prompt: &str) -> VideoMetadata {
        let defaults = VideoMetadata::defaults(prompt);

        match self.request_metadata(prompt).await {
            Ok(parsed) => {
                info!("✅ Generated metadata via OpenAI for prompt: '{}'", prompt);
                defaults.apply_overrides(&parsed)
            }
            Err(e) => {
                warn!("OpenAI metadata generation failed, using defaults: {}", e);
                defaults
            }
        }
    }

    async fn request_metadata(
        &self,
        prompt: &str,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/chat/completions", self.base_url);

        let instruction = format!(
            "Generate YouTube Shorts metadata for this video prompt: \"{}\"\n\n\
             Return a JSON object with:\n\
             - title (max 100 chars, catchy and engaging)\n\
             - description (include hashtags, engaging copy)\n\
             - tags (array of 10-15 relevant tags)\n\n\
             Make it optimized for YouTube Shorts discovery.",
            prompt
        );

        let body = json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": instruction }],
            "response_format": { "type": "json_object" }
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(format!("OpenAI API error: {}", error_text).into());
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("{}");

        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_embed_prompt_in_description() {
        let metadata = VideoMetadata::defaults("golden retriever puppy");
        assert!(metadata.description.contains("golden retriever puppy"));
        assert!(metadata.description.contains("#Shorts"));
        assert!(metadata.title.starts_with("Amazing Dog Video - "));
        assert_eq!(metadata.tags.len(), 5);
    }

    #[test]
    fn overrides_apply_per_field() {
        let parsed = json!({ "title": "Custom Title" });
        let defaults = VideoMetadata::defaults("a corgi");
        let merged = defaults.clone().apply_overrides(&parsed);

        assert_eq!(merged.title, "Custom Title");
        assert_eq!(merged.description, defaults.description);
        assert_eq!(merged.tags, defaults.tags);
    }

    #[test]
    fn mistyped_fields_keep_defaults() {
        let parsed = json!({ "title": 42, "tags": "not-an-array", "description": ["nope"] });
        let defaults = VideoMetadata::defaults("a husky");
        let merged = defaults.clone().apply_overrides(&parsed);
        assert_eq!(merged, defaults);
    }

    #[test]
    fn full_override_replaces_everything() {
        let parsed = json!({
            "title": "T",
            "description": "D",
            "tags": ["a", "b", "c"]
        });
        let merged = VideoMetadata::defaults("x").apply_overrides(&parsed);
        assert_eq!(merged.title, "T");
        assert_eq!(merged.description, "D");
        assert_eq!(merged.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_tags_array_keeps_defaults() {
        let parsed = json!({ "tags": [] });
        let merged = VideoMetadata::defaults("x").apply_overrides(&parsed);
        assert_eq!(merged.tags.len(), 5);
    }
}
