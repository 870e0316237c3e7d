//! Unified request parameters and chat-completion wire types

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::{HistoryEntry, Speaker};

// ===== Caller Parameters =====

/// Parameters for one completion cycle.
/// `base_url` is the fully-qualified completions URL; no
/// path suffix is ever appended to it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams
{   /// Full completions URL, http or https
    pub base_url: String
  , /// Model identifier, non-empty
    pub model: String
  , /// System prompt; None synthesizes a dated default
    pub system_prompt: Option<String>
  , /// The user's turn, non-empty after trimming
    pub user_prompt: String
  , /// Sampling temperature
    pub temperature: f32
  , /// Maximum tokens to generate
    pub max_tokens: usize
  , /// Optional bearer credential, never logged
    pub api_key: Option<String>
}

impl fmt::Debug for CompletionParams
{   // credential is redacted so params can be traced safely
    fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   f.debug_struct("CompletionParams")
          .field("base_url", &self.base_url)
          .field("model", &self.model)
          .field("system_prompt", &self.system_prompt)
          .field("user_prompt", &self.user_prompt)
          .field("temperature", &self.temperature)
          .field("max_tokens", &self.max_tokens)
          .field(
            "api_key",
            &self.api_key.as_ref().map(|_| "<redacted>")
          )
          .finish()
    }
}

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , pub max_tokens: usize
}

// Response types are lenient on purpose: every level of the
// choices[0].message.content path is optional so a missing
// level maps to its own format error instead of a blanket
// deserialization failure.

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub choices: Option<Vec<Choice>>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

// ===== Message Assembly =====

/// Default system prompt with the current date resolved
pub fn default_system_prompt() -> String
{   let now = chrono::Local::now();
    let today = now.format("%Y-%m-%d");
    let yesterday
      = (now - chrono::Duration::days(1))
        .format("%Y-%m-%d");

    format!(
      "You are an AI assistant powered by a large language \
       model.\n\
       The current date is {today}.\n\n\
       When you're not sure about some information, you say \
       that you don't have the information and don't make up \
       anything.\n\
       If the user's question is not clear, ambiguous, or \
       does not provide enough context for you to accurately \
       answer the question, you do not try to answer it right \
       away and you rather ask the user to clarify their \
       request.\n\
       You are always very attentive to dates, in particular \
       you try to resolve dates (e.g. \"yesterday\" is \
       {yesterday}) and when asked about information at \
       specific dates, you discard information that is at \
       another date.\n\
       You follow these instructions in all languages, and \
       always respond to the user in the language they use \
       or request."
    )
}

/// Build the ordered wire message sequence: one system
/// message, prior turns, then the current user turn.
/// Notice entries are display bookkeeping and are skipped.
pub fn build_messages(
  params: &CompletionParams
, history: &[HistoryEntry]
) -> Vec<ChatMessage>
{   let system_prompt = match &params.system_prompt
    {   Some(prompt) => prompt.clone()
      , None => default_system_prompt()
    };

    let mut messages = vec![
      ChatMessage
      {   role: "system".to_string()
        , content: system_prompt
      }
    ];

    for entry in history
    {   let role = match entry.speaker
        {   Speaker::User => "user"
          , Speaker::Assistant => "assistant"
          , Speaker::Notice => continue
        };
        messages.push(ChatMessage
        {   role: role.to_string()
          , content: entry.text.clone()
        });
    }

    messages.push(ChatMessage
    {   role: "user".to_string()
      , content: params.user_prompt.clone()
    });

    messages
}

/// Extract the assistant text from a parsed response.
/// Each missing level of the expected path yields its own
/// message to aid debugging against non-compliant servers.
pub fn extract_reply(
  response: ChatCompletionResponse
) -> Result<String, Error>
{   let choice = response.choices
      .and_then(|mut choices| {
        if choices.is_empty()
        {   None
        } else
        {   Some(choices.remove(0))
        }
      })
      .ok_or_else(|| Error::Format(
        "Could not find 'choices' in the response."
          .to_string()
      ))?;

    let message = choice.message
      .ok_or_else(|| Error::Format(
        "Could not find 'message' in the response."
          .to_string()
      ))?;

    message.content
      .ok_or_else(|| Error::Format(
        "Could not find 'message.content' in the response."
          .to_string()
      ))
}
