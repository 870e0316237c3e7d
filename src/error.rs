use std::fmt;

/// Custom error type for chatwire operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// A request parameter failed a documented constraint
    Validation(String)
  , /// Connection-level failure (refused, reset, DNS)
    Transport(String)
  , /// Request timed out
    Timeout
  , /// Endpoint answered with a non-2xx status
    Protocol
    {   status: u16
      , body: String
    }
  , /// 2xx reply whose body is not the expected shape
    Format(String)
  , /// Request was cancelled by the caller
    Cancelled
  , /// No in-flight request with the given id
    RequestNotFound(usize)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Whether a retry can be expected to help.
    /// Validation and format failures are permanent; a
    /// malformed server does not heal between attempts.
    pub fn is_transient(&self) -> bool
    {   match self
        {   Error::Transport(_) => true
          , Error::Timeout => true
          , Error::Protocol { .. } => true
          , _ => false
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(msg) => {
              write!(f, "Invalid parameter: {}", msg)
            }
          , Error::Transport(msg) => {
              write!(f,
                "Connection error. Could not reach the \
                 server: {}",
                msg
              )
            }
          , Error::Timeout => {
              write!(f,
                "Request timed out. The server took too \
                 long to respond."
              )
            }
          , Error::Protocol { status, body } => {
              write!(f,
                "Request failed with status {}: {}",
                status, body
              )
            }
          , Error::Format(msg) => {
              write!(f,
                "Unexpected API response format. {}",
                msg
              )
            }
          , Error::Cancelled => {
              write!(f, "Request was cancelled")
            }
          , Error::RequestNotFound(id) => {
              write!(f, "No in-flight request: {}", id)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
