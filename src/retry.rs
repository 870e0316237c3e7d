//! Retry budget and delay policy for transient failures

use std::time::Duration;
use log::debug;
use crate::config::RetryConfig;

/// Retry policy for failed requests
#[derive(Debug, Clone)]
pub struct RetryPolicy
{   pub max_attempts: usize
  , pub backoff_multiplier: f32
  , pub initial_delay: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_attempts: usize
    , backoff_multiplier: f32
    , initial_delay_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_attempts
          , backoff_multiplier
          , initial_delay: Duration::from_millis(
              initial_delay_ms
            )
        }
    }

    /// Build a policy from its configuration
    pub fn from_config(config: &RetryConfig) -> Self
    {   RetryPolicy::new(
          config.max_attempts,
          config.backoff_multiplier,
          config.initial_delay_ms
        )
    }

    /// Calculate the delay after the given failed attempt.
    /// Attempts are counted from zero; with a multiplier of
    /// 1.0 every attempt waits the initial delay.
    pub fn delay_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   debug!("Calculating delay for attempt {}", attempt);
        let multiplier
          = self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(
          (self.initial_delay.as_millis() as f32
            * multiplier) as u64
        )
    }

    /// Whether another attempt fits in the budget after
    /// `attempts` attempts have already run
    pub fn has_budget(&self, attempts: usize) -> bool
    {   attempts < self.max_attempts
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::from_config(&RetryConfig::default())
    }
}
