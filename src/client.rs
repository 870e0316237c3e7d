use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use log::{debug, trace, error, info};
use crate::ChatwireFoot;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::request::{
  build_messages, extract_reply,
  ChatCompletionRequest, ChatCompletionResponse,
  CompletionParams
};
use crate::retry::RetryPolicy;

/// Longest response-body excerpt carried in a protocol error
const BODY_EXCERPT_MAX: usize = 600;

// ===== Core Client =====

/// Chat completion client: one validated request/response
/// cycle against an OpenAI-compatible endpoint, with
/// transient failures retried on a fixed budget.
///
/// Cloning is cheap; clones share the underlying HTTP
/// connection pool and no other state.
#[derive(Debug, Clone)]
pub struct ChatClient
{   config: ClientConfig
  , retry: RetryPolicy
  , http_client: reqwest::Client
}

impl ChatClient
{   /// Create a client with the given configuration
    pub fn new(config: ClientConfig)
      -> Result<Self, Error>
    {   debug!("Creating ChatClient");
        let retry = RetryPolicy::from_config(&config.retry);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_millis(config.timeout_ms))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::Other(e.to_string())
          })?;

        Ok(ChatClient
        {   config
          , retry
          , http_client
        })
    }

    /// Check parameters against the configured bounds
    /// without touching the network
    pub fn validate(
      &self
    , params: &CompletionParams
    ) -> Result<(), Error>
    {   crate::validate::validate(params, &self.config)
    }

    /// Run one completion cycle: validate, build the message
    /// sequence, POST, parse, and retry transient failures
    /// up to the budget. Returns the assistant's reply text
    /// or the final attempt's classified error.
    pub async fn complete(
      &self
    , params: &CompletionParams
    , history: &crate::ChatHistory
    ) -> Result<String, Error>
    {   self.validate(params)?;

        let request = ChatCompletionRequest
        {   model: params.model.clone()
          , messages: build_messages(
              params,
              history.entries()
            )
          , temperature: params.temperature
          , max_tokens: params.max_tokens
        };

        let mut attempts = 0;
        loop
        {   attempts += 1;
            match self.send_once(params, &request).await
            {   Ok(text) => {
                  debug!(
                    "Completion succeeded on attempt {}",
                    attempts
                  );
                  return Ok(text);
                }
              , Err(e) => {
                  if !e.is_transient()
                    || !self.retry.has_budget(attempts)
                  {   error!("Completion failed: {}", e);
                      return Err(e);
                  }
                  let delay = self.retry
                    .delay_for_attempt(attempts - 1);
                  debug!(
                    "Attempt {} failed ({}), retrying in {:?}",
                    attempts, e, delay
                  );
                  tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Issue a single POST and classify the outcome
    async fn send_once(
      &self
    , params: &CompletionParams
    , request: &ChatCompletionRequest
    ) -> Result<String, Error>
    {   trace!("Chat request: {:?}", request);

        let mut builder = self.http_client
          .post(&params.base_url)
          .header("Content-Type", "application/json")
          .json(request);

        if let Some(key) = &params.api_key
        {   builder = builder.header(
              "Authorization",
              format!("Bearer {}", key)
            );
        }

        let response = builder
          .send()
          .await
          .map_err(classify_error)?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Endpoint error {}: {}", status, body);
            return Err(Error::Protocol
            {   status: status.as_u16()
              , body: excerpt(&body)
            });
        }

        let parsed: ChatCompletionResponse
          = response.json().await
            .map_err(classify_error)?;

        extract_reply(parsed)
    }
}

/// Map a reqwest failure onto the error taxonomy
fn classify_error(e: reqwest::Error) -> Error
{   if e.is_timeout()
    {   error!("Request timed out: {}", e);
        Error::Timeout
    } else if e.is_decode()
    {   error!("Response decode failed: {}", e);
        Error::Format(
          "Could not parse the response as JSON."
            .to_string()
        )
    } else
    {   error!("Transport failure: {}", e);
        Error::Transport(e.to_string())
    }
}

/// Bound a body excerpt to BODY_EXCERPT_MAX bytes on a
/// char boundary
fn excerpt(body: &str) -> String
{   if body.len() <= BODY_EXCERPT_MAX
    {   return body.to_string();
    }
    let mut end = BODY_EXCERPT_MAX;
    while !body.is_char_boundary(end)
    {   end -= 1;
    }
    format!("{}...", &body[..end])
}

// ===== Backend Actor =====

/// One spawned completion cycle awaiting its outcome
pub struct InFlightChat
{   pub handle: tokio::task::JoinHandle<()>
  , pub reply: crate::SendChatReplySender
}

/// Backend state tracking in-flight requests
pub struct ChatBackendState
{   pub client: ChatClient
  , pub in_flight: HashMap<usize, InFlightChat>
}

impl ChatBackendState
{   /// Create a new backend state around a core client
    pub fn new(client: ChatClient) -> Self
    {   debug!("Initializing ChatBackendState");
        ChatBackendState
        {   client
          , in_flight: HashMap::new()
        }
    }
}

/// Public API for the chatwire backend - owns the task
pub struct ChatBackend
{   hand: crate::ChatwireHand
  , next_request_id: AtomicUsize
  , _task_handle: tokio::task::JoinHandle<()>
}

impl ChatBackend
{   /// Create and spawn a new chatwire backend
    /// Returns immediately - spawns background task
    pub fn new(config: ClientConfig)
      -> Result<Self, Error>
    {   debug!("Creating ChatBackend with task ownership");

        let client = ChatClient::new(config)?;

        let (send_chat_tx, send_chat_rx)
          = mpsc::unbounded_channel();
        let (cancel_chat_tx, cancel_chat_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::ChatwireHand
        {   send_chat_tx: send_chat_tx.clone()
          , cancel_chat_tx: cancel_chat_tx.clone()
          , kill_process_tx: kill_process_tx.clone()
        };

        let foot = crate::ChatwireFoot
        {   send_chat_rx
          , cancel_chat_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, client).await
        });

        Ok(ChatBackend
        {   hand
          , next_request_id: AtomicUsize::new(0)
          , _task_handle
        })
    }

    /// Queue a completion - returns almost immediately with
    /// the request id (for cancellation) and the reply
    /// receiver the outcome arrives on
    pub async fn send_chat(
      &self
    , params: CompletionParams
    , history: crate::ChatHistory
    ) -> Result<
        (usize, mpsc::UnboundedReceiver<crate::SendChatReply>),
        Error
      >
    {   debug!(
          "send_chat queuing command for model: {}",
          params.model
        );
        let request_id = self.next_request_id
          .fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SendChatArgs
        {   request_id
          , params
          , history
          , reply: reply_tx
        };

        self.hand.send_chat_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok((request_id, reply_rx))
    }

    /// Cancel an in-flight completion: the HTTP call is
    /// aborted, further retries are suppressed, and the
    /// request's reply channel receives Cancelled
    pub async fn cancel_chat(
      &self
    , request_id: usize
    ) -> Result<
        mpsc::UnboundedReceiver<crate::CancelChatReply>,
        Error
      >
    {   debug!("cancel_chat queuing for: {}", request_id);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::CancelChatArgs
        {   request_id
          , reply: reply_tx
        };

        self.hand.cancel_chat_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend, aborting any
    /// in-flight completions
    pub async fn shutdown(self)
      -> Result<(), Error>
    {   debug!("Shutting down ChatBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend shutdown timeout");
            Err(Error::Timeout)
        }
    }
}

/// Main backend event loop
///
/// Design: tokio::select! is ONLY for fast queueing.
/// Each completion runs in its own spawned task so a slow
/// endpoint never blocks cancellation or shutdown.
async fn run_backend_loop(
  foot: ChatwireFoot
, client: ChatClient
)
{   debug!("Starting ChatBackend event loop");
    let mut state = ChatBackendState::new(client);
    let ChatwireFoot
    {   mut send_chat_rx
      , mut cancel_chat_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = send_chat_rx.recv() => {
          let crate::SendChatArgs
          {   request_id
            , params
            , history
            , reply
          } = cmd;
          debug!(
            "Received SendChat {} for model: {}",
            request_id, params.model
          );

          // Drop records of turns that already resolved
          state.in_flight.retain(|_, chat| {
            !chat.handle.is_finished()
          });

          let task_client = state.client.clone();
          let task_reply = reply.clone();
          let handle = tokio::spawn(async move {
            let result = task_client
              .complete(&params, &history)
              .await;
            let _ = task_reply.send(result);
          });

          state.in_flight.insert(
            request_id,
            InFlightChat
            {   handle
              , reply
            }
          );
        }
      , Some(cmd) = cancel_chat_rx.recv() => {
          debug!(
            "Received CancelChat for: {}",
            cmd.request_id
          );
          match state.in_flight.remove(&cmd.request_id)
          {   Some(chat) if !chat.handle.is_finished() => {
                chat.handle.abort();
                let _ = chat.reply.send(
                  Err(Error::Cancelled)
                );
                let _ = cmd.reply.send(Ok(()));
              }
            , _ => {
                let _ = cmd.reply.send(
                  Err(Error::RequestNotFound(
                    cmd.request_id
                  ))
                );
              }
          }
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          for (_, chat) in state.in_flight.drain()
          {   chat.handle.abort();
          }
          let _ = cmd.reply.send(Ok(()));
          info!("ChatBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
