//! Clue generation: prompt construction and strict reply parsing.

use std::sync::Arc;

use cinematoday_llm::{ChatRequest, LlmProvider};

use crate::error::PipelineError;

/// Identifies the prompt wording below in tracking runs.
pub const PROMPT_VERSION: &str = "v3";

/// Model used when `OPENAI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Exact number of clues a reply must contain.
pub const CLUE_COUNT: usize = 4;

pub const MAX_COMPLETION_TOKENS: u32 = 2000;

pub const SYSTEM_PROMPT: &str = "You generate guessing-game clues for cinema films.

Rules:
- Output exactly 4 clues.
- Clues start very vague and get more specific.
- In terms of difficulty level, from 1 to 10, the first clue needs to be difficulty 10, \
the second difficulty 8, the third difficulty 5, and the fourth difficulty 3.
- Never include the film title, actor names, or director names.
- Refer to plot, themes, setting, genre, or iconic imagery.
- Avoid big spoilers.
- Each clue must be a single sentence under 35 words.
- Respond ONLY in JSON with structure:
  {\"clues\": [\"clue 1\", \"clue 2\", \"clue 3\", \"clue 4\"]}.";

/// Reasons a model reply is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ClueError {
    #[error("model returned empty content")]
    Empty,

    #[error("reply is not valid JSON ({source}); raw content: {raw:?}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("expected {} clues, got {}: {:?}", CLUE_COUNT, .clues.len(), .clues)]
    WrongCount { clues: Vec<String> },
}

/// User message for one film.
pub fn user_prompt(title: &str, overview: Option<&str>) -> String {
    let description = overview
        .filter(|o| !o.trim().is_empty())
        .unwrap_or("No description available.");
    format!("Film title: \"{title}\"\n\nShort description:\n{description}\n\nGenerate clues now.")
}

/// Parse a model reply into exactly [`CLUE_COUNT`] clues.
///
/// Only string entries of the `clues` array are kept (trimmed); a missing
/// or non-array `clues` value counts as no clues.
pub fn parse_clue_reply(content: &str) -> Result<Vec<String>, ClueError> {
    if content.trim().is_empty() {
        return Err(ClueError::Empty);
    }

    let data: serde_json::Value =
        serde_json::from_str(content).map_err(|source| ClueError::InvalidJson {
            source,
            raw: content.to_string(),
        })?;

    let clues: Vec<String> = data
        .get("clues")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(|s| s.trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    if clues.len() != CLUE_COUNT {
        return Err(ClueError::WrongCount { clues });
    }
    Ok(clues)
}

/// Generates clues for one film with a single, unretried model call.
#[derive(Clone)]
pub struct ClueGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl ClueGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: String) -> Self {
        Self { provider, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, title: &str, overview: Option<&str>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            user: user_prompt(title, overview),
            max_completion_tokens: Some(MAX_COMPLETION_TOKENS),
            json_response: true,
            reasoning_effort: Some("low".into()),
        }
    }

    /// Ask the model for clues, ordered from vaguest to most specific.
    pub async fn generate(
        &self,
        title: &str,
        overview: Option<&str>,
    ) -> Result<Vec<String>, PipelineError> {
        let reply = self.provider.chat(self.request(title, overview)).await?;
        parse_clue_reply(&reply.text).map_err(|source| PipelineError::Clues {
            title: title.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use cinematoday_llm::{ChatResponse, LlmError};
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn accepts_exactly_four_string_clues() {
        let clues =
            parse_clue_reply(r#"{"clues": ["  one ", "two", "three", "four"]}"#).unwrap();
        assert_eq!(clues, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn non_string_entries_are_dropped_before_counting() {
        let err = parse_clue_reply(r#"{"clues": ["one", 2, "three", "four"]}"#).unwrap_err();
        assert_matches!(err, ClueError::WrongCount { clues } if clues.len() == 3);

        let ok = parse_clue_reply(r#"{"clues": ["a", null, "b", "c", {"x": 1}, "d"]}"#).unwrap();
        assert_eq!(ok, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn wrong_counts_are_rejected() {
        assert_matches!(
            parse_clue_reply(r#"{"clues": ["a", "b", "c"]}"#),
            Err(ClueError::WrongCount { .. })
        );
        assert_matches!(
            parse_clue_reply(r#"{"clues": ["a", "b", "c", "d", "e"]}"#),
            Err(ClueError::WrongCount { .. })
        );
    }

    #[test]
    fn missing_or_malformed_clues_key_counts_as_none() {
        assert_matches!(
            parse_clue_reply(r#"{"hints": ["a", "b", "c", "d"]}"#),
            Err(ClueError::WrongCount { clues }) if clues.is_empty()
        );
        assert_matches!(
            parse_clue_reply(r#"{"clues": "a b c d"}"#),
            Err(ClueError::WrongCount { .. })
        );
        assert_matches!(
            parse_clue_reply(r#"["a", "b", "c", "d"]"#),
            Err(ClueError::WrongCount { .. })
        );
    }

    #[test]
    fn non_json_and_empty_replies_are_rejected() {
        assert_matches!(
            parse_clue_reply("Here are your clues!"),
            Err(ClueError::InvalidJson { .. })
        );
        assert_matches!(parse_clue_reply(""), Err(ClueError::Empty));
        assert_matches!(parse_clue_reply("  \n "), Err(ClueError::Empty));
    }

    #[test]
    fn user_prompt_falls_back_without_overview() {
        let prompt = user_prompt("Jaws", None);
        assert!(prompt.starts_with("Film title: \"Jaws\""));
        assert!(prompt.contains("No description available."));

        let prompt = user_prompt("Jaws", Some("A shark terrorises a town."));
        assert!(prompt.contains("A shark terrorises a town."));
        assert!(prompt.ends_with("Generate clues now."));
    }

    #[test]
    fn system_prompt_states_the_rules() {
        assert!(SYSTEM_PROMPT.contains("exactly 4 clues"));
        assert!(SYSTEM_PROMPT.contains("under 35 words"));
        assert!(SYSTEM_PROMPT.contains("difficulty 10"));
        assert!(SYSTEM_PROMPT.contains("{\"clues\":"));
    }

    struct CannedProvider {
        reply: String,
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
            self.seen.lock().unwrap().push(req);
            Ok(ChatResponse {
                text: self.reply.clone(),
            })
        }
    }

    #[tokio::test]
    async fn generator_sends_json_mode_request() {
        let provider = Arc::new(CannedProvider {
            reply: r#"{"clues": ["a", "b", "c", "d"]}"#.into(),
            seen: Mutex::new(Vec::new()),
        });
        let generator = ClueGenerator::new(provider.clone(), DEFAULT_MODEL.into());

        let clues = generator.generate("Jaws", Some("Shark.")).await.unwrap();
        assert_eq!(clues.len(), CLUE_COUNT);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, DEFAULT_MODEL);
        assert!(seen[0].json_response);
        assert_eq!(seen[0].max_completion_tokens, Some(MAX_COMPLETION_TOKENS));
        assert_eq!(seen[0].reasoning_effort.as_deref(), Some("low"));
        assert_eq!(seen[0].system, SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn generator_reports_film_on_bad_reply() {
        let provider = Arc::new(CannedProvider {
            reply: "not json".into(),
            seen: Mutex::new(Vec::new()),
        });
        let generator = ClueGenerator::new(provider, DEFAULT_MODEL.into());

        let err = generator.generate("Jaws", None).await.unwrap_err();
        assert_matches!(
            err,
            PipelineError::Clues { title, source: ClueError::InvalidJson { .. } } if title == "Jaws"
        );
    }
}
