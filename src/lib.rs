pub mod error;
pub mod config;
pub mod validate;
pub mod request;
pub mod retry;
pub mod client;
use serde::{Deserialize, Serialize};

/*

chatwire is an async-only rust library that performs one validated
request/response cycle against an OpenAI-compatible chat-completion
HTTP endpoint; it checks the caller-supplied parameters, builds the
message sequence (system prompt, prior turns, current user turn),
issues the POST with a bounded timeout, retries transient failures
on a fixed budget, and hands back either the assistant's reply text
or a classified, human-readable error.

chatwire/
├── Cargo.toml          # Main manifest
├── src/
│   ├── lib.rs          # Re-exports and main documentation
│   ├── error.rs        # Custom error types and handling
│   ├── config.rs       # Limits, timeout and retry configuration
│   ├── validate.rs     # Fail-fast parameter validation
│   ├── request.rs      # Unified request and wire types
│   ├── retry.rs        # Retry budget and delay policy
│   └── client.rs       # Core client and backend interface
└── tests/              # Integration tests

The caller always supplies the fully-qualified completions URL
(e.g. "http://localhost:8000/v1/chat/completions"); chatwire never
appends a path suffix to it.

*/

/// CHATWIRE API INTERFACE:

// ===== SendChat =====

pub type SendChatReply = Result<String, crate::error::Error>;
pub type SendChatReplySender
  = tokio::sync::mpsc::UnboundedSender<SendChatReply>;

pub struct SendChatArgs
{   pub request_id: usize
  , pub params: crate::request::CompletionParams
  , pub history: ChatHistory
  , pub reply: SendChatReplySender
}

// ===== CancelChat =====

pub type CancelChatReply = Result<(), crate::error::Error>;
pub type CancelChatReplySender
  = tokio::sync::mpsc::UnboundedSender<CancelChatReply>;

pub struct CancelChatArgs
{   pub request_id: usize
  , pub reply: CancelChatReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== ChatwireHand (sender side) =====

pub struct ChatwireHand
{   pub send_chat_tx
      : tokio::sync::mpsc::UnboundedSender<SendChatArgs>
  , pub cancel_chat_tx
      : tokio::sync::mpsc::UnboundedSender<CancelChatArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== ChatwireFoot (receiver side) =====

pub struct ChatwireFoot
{   pub send_chat_rx
      : tokio::sync::mpsc::UnboundedReceiver<SendChatArgs>
  , pub cancel_chat_rx
      : tokio::sync::mpsc::UnboundedReceiver<CancelChatArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// CHATWIRE STRUCTURES:

/// Who produced one transcript entry.
/// Notice entries record failed turns for the caller's display
/// and are never sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Speaker
{   User
  , Assistant
  , Notice
}

/// One (speaker, text) pair in a session transcript
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryEntry
{   pub speaker: Speaker
  , pub text: String
}

/// Append-only session transcript.
/// Grows by exactly one entry per turn; entries are never
/// mutated in place or pruned. Lifetime is the session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChatHistory
{   entries: Vec<HistoryEntry>
}

impl ChatHistory
{   /// Create an empty transcript
    pub fn new() -> Self
    {   ChatHistory
        {   entries: vec![]
        }
    }

    /// Append the user's turn
    pub fn push_user(&mut self, text: String)
    {   self.entries.push(HistoryEntry
        {   speaker: Speaker::User
          , text
        });
    }

    /// Append the assistant's reply
    pub fn push_assistant(&mut self, text: String)
    {   self.entries.push(HistoryEntry
        {   speaker: Speaker::Assistant
          , text
        });
    }

    /// Append a notice recording a failed turn
    pub fn push_notice(&mut self, text: String)
    {   self.entries.push(HistoryEntry
        {   speaker: Speaker::Notice
          , text
        });
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[HistoryEntry]
    {   &self.entries
    }

    pub fn len(&self) -> usize
    {   self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.entries.is_empty()
    }
}
