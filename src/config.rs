//! Configuration for client limits, timeout and retry behavior

use serde::{Deserialize, Serialize};

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig
{   /// Total attempts, the first try included
    pub max_attempts: usize
  , /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64
  , /// Backoff multiplier applied per retry.
    /// 1.0 keeps the delay fixed between attempts.
    pub backoff_multiplier: f32
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   max_attempts: 3
          , initial_delay_ms: 2000
          , backoff_multiplier: 1.0
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Per-attempt HTTP timeout in milliseconds
    pub timeout_ms: u64
  , /// Inclusive lower temperature bound
    pub temperature_min: f32
  , /// Inclusive upper temperature bound
    pub temperature_max: f32
  , /// Inclusive upper max-token bound; the lower bound is 1
    pub max_tokens_cap: usize
  , /// Retry configuration for transient failures
    pub retry: RetryConfig
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   timeout_ms: 60_000
          , temperature_min: 0.0
          , temperature_max: 2.0
          , max_tokens_cap: 32_000
          , retry: RetryConfig::default()
        }
    }
}
