use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::career::SeasonTables;
use crate::http_client::http_client;
use crate::standings::STAT_COLUMNS;

pub const NO_STATS: &str = "No stats found.";
pub const PLACEHOLDER: &str = "this player";

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "openrouter/auto";
const GIST_API_BASE: &str = "https://api.github.com/gists/";

/// One line per season the player appears in, raw cell values for the
/// recognized stat columns present in that season's table.
pub fn stats_summary(player: &str, tables: &SeasonTables) -> String {
    let mut lines = Vec::new();
    for (season, table) in tables {
        let Some(idx) = table.find_player(player) else {
            continue;
        };
        let stats: Vec<String> = STAT_COLUMNS
            .iter()
            .filter_map(|name| {
                let col = table.column(name)?;
                Some(format!("{name}: {}", table.cell(idx, col)))
            })
            .collect();
        lines.push(format!("{season}: {}", stats.join(", ")));
    }
    if lines.is_empty() {
        return NO_STATS.to_string();
    }
    lines.join("\n")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptConfig {
    pub system_message: String,
    pub user_template: String,
    pub ai_settings: HashMap<String, String>,
}

impl PromptConfig {
    pub fn builtin() -> Self {
        Self {
            system_message: "You are a witty football pundit. Keep it short and good-natured."
                .to_string(),
            user_template: "Roast this player based on their league stats:\n{stats}".to_string(),
            ai_settings: HashMap::new(),
        }
    }

    pub fn render_user(&self, stats: &str) -> String {
        self.user_template.replace("{stats}", stats)
    }
}

/// Reads `## System Message`, `## User Template` and `## AI Settings`
/// sections; settings lines are `- key: value`. Code fences are ignored.
pub fn parse_prompt_markdown(doc: &str) -> PromptConfig {
    enum Section {
        None,
        System,
        User,
        Settings,
    }

    let mut system = Vec::new();
    let mut user = Vec::new();
    let mut ai_settings = HashMap::new();
    let mut section = Section::None;

    for line in doc.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("## System Message") {
            section = Section::System;
        } else if trimmed.starts_with("## User Template") {
            section = Section::User;
        } else if trimmed.starts_with("## AI Settings") {
            section = Section::Settings;
        } else if trimmed.starts_with("```") {
            continue;
        } else {
            match section {
                Section::System if !trimmed.is_empty() => system.push(line.trim_end().to_string()),
                Section::User if !trimmed.is_empty() => user.push(line.trim_end().to_string()),
                Section::Settings => {
                    if let Some((key, value)) = line.split_once(':') {
                        let key = key.trim().trim_start_matches(['-', ' ']).trim();
                        ai_settings.insert(key.to_string(), value.trim().to_string());
                    }
                }
                _ => {}
            }
        }
    }

    PromptConfig {
        system_message: system.join("\n"),
        user_template: user.join("\n"),
        ai_settings,
    }
}

#[derive(Debug, Clone)]
pub struct RoastConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub prompts_url: Option<String>,
}

impl RoastConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let base_url = env::var("OPENROUTER_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = env::var("ROAST_MODEL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let max_tokens = env::var("ROAST_MAX_TOKENS")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(300)
            .clamp(16, 4096);
        let temperature = env::var("ROAST_TEMPERATURE")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.9)
            .clamp(0.0, 2.0);
        let prompts_url = env::var("ROAST_PROMPTS_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
            prompts_url,
        }
    }

    /// Settings from a prompt document win over the environment.
    fn with_prompt_settings(&self, prompts: &PromptConfig) -> (String, u32, f64) {
        let model = prompts
            .ai_settings
            .get("model")
            .cloned()
            .unwrap_or_else(|| self.model.clone());
        let max_tokens = prompts
            .ai_settings
            .get("max_tokens")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.max_tokens);
        let temperature = prompts
            .ai_settings
            .get("temperature")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.temperature);
        (model, max_tokens, temperature)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// Fetch the prompt document. Gist page URLs go through the GitHub API and
/// use the gist's first file.
pub fn fetch_prompts(url: &str) -> Result<PromptConfig> {
    let client = http_client()?;
    if url.contains("gist.github.com") {
        let gist_id = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        let body: Value = client
            .get(format!("{GIST_API_BASE}{gist_id}"))
            .send()
            .context("gist request failed")?
            .error_for_status()
            .context("gist request rejected")?
            .json()
            .context("invalid gist json")?;
        let content = body
            .get("files")
            .and_then(|files| files.as_object())
            .and_then(|files| files.values().next())
            .and_then(|file| file.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| anyhow!("gist has no file content"))?;
        return Ok(parse_prompt_markdown(content));
    }
    let doc = client
        .get(url)
        .send()
        .context("prompt request failed")?
        .error_for_status()
        .context("prompt request rejected")?
        .text()
        .context("failed reading prompt document")?;
    Ok(parse_prompt_markdown(&doc))
}

/// Ask the model for a roast of `summary`. The player's name is never sent;
/// the placeholder is swapped back in the reply.
pub fn roast_player(cfg: &RoastConfig, player: &str, summary: &str) -> Result<String> {
    let api_key = cfg
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow!("OPENROUTER_API_KEY is not set"))?;
    let prompts = match cfg.prompts_url.as_deref() {
        Some(url) => fetch_prompts(url).unwrap_or_else(|err| {
            log::warn!("prompt document unavailable, using built-in prompts: {err:#}");
            PromptConfig::builtin()
        }),
        None => PromptConfig::builtin(),
    };
    let (model, max_tokens, temperature) = cfg.with_prompt_settings(&prompts);
    let user = prompts.render_user(summary);
    let request = ChatRequest {
        model: &model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: &prompts.system_message,
            },
            ChatMessage {
                role: "user",
                content: &user,
            },
        ],
        max_tokens,
        temperature,
    };

    let client = http_client()?;
    let resp: ChatResponse = client
        .post(format!("{}/chat/completions", cfg.base_url))
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .context("roast request failed")?
        .error_for_status()
        .context("roast request rejected")?
        .json()
        .context("invalid roast response")?;
    let content = resp
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| anyhow!("roast response had no choices"))?;
    Ok(clean_roast(&content, player))
}

fn clean_roast(content: &str, player: &str) -> String {
    content.replace('@', "").replace(PLACEHOLDER, player)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_markdown_sections() {
        let doc = "# Prompts\n## System Message\nBe funny.\n\n## User Template\n```\nStats:\n{stats}\n```\n## AI Settings\n- model: some/model\n- max_tokens: 200\n- temperature: 0.7\n";
        let prompts = parse_prompt_markdown(doc);
        assert_eq!(prompts.system_message, "Be funny.");
        assert_eq!(prompts.user_template, "Stats:\n{stats}");
        assert_eq!(prompts.ai_settings.get("model").map(String::as_str), Some("some/model"));
        assert_eq!(prompts.ai_settings.get("max_tokens").map(String::as_str), Some("200"));
        assert_eq!(prompts.render_user("S1: MP: 3"), "Stats:\nS1: MP: 3");
    }

    #[test]
    fn roast_reply_is_cleaned() {
        assert_eq!(
            clean_roast("Oh @this player, again?", "amy"),
            "Oh amy, again?"
        );
    }
}
