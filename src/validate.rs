//! Fail-fast validation of completion parameters

use log::debug;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::request::CompletionParams;

/// Validate parameters against the configured bounds.
/// Checks run in a fixed order and the first failure wins;
/// each failure names the field and the violated constraint.
pub fn validate(
  params: &CompletionParams
, config: &ClientConfig
) -> Result<(), Error>
{   debug!("Validating completion parameters");

    validate_url(&params.base_url)?;

    if params.model.trim().is_empty()
    {   return Err(Error::Validation(
          "Model name cannot be empty.".to_string()
        ));
    }

    if params.user_prompt.trim().is_empty()
    {   return Err(Error::Validation(
          "User prompt cannot be empty.".to_string()
        ));
    }

    if params.temperature < config.temperature_min
      || params.temperature > config.temperature_max
    {   return Err(Error::Validation(format!(
          "Temperature must be between {} and {}.",
          config.temperature_min,
          config.temperature_max
        )));
    }

    if params.max_tokens < 1
      || params.max_tokens > config.max_tokens_cap
    {   return Err(Error::Validation(format!(
          "Max tokens must be between 1 and {}.",
          config.max_tokens_cap
        )));
    }

    if let Some(key) = &params.api_key
    {   if key.trim().is_empty()
        {   return Err(Error::Validation(
              "API key cannot be empty if provided."
                .to_string()
            ));
        }
    }

    Ok(())
}

/// Validate the base URL.
/// Localhost URLs with an explicit port get their own check
/// since generic URL parsing is stricter than what local
/// endpoints need.
pub fn validate_url(url: &str) -> Result<(), Error>
{   if url.is_empty()
    {   return Err(Error::Validation(
          "Base URL cannot be empty.".to_string()
        ));
    }

    if url.starts_with("http://localhost:")
      || url.starts_with("https://localhost:")
    {   return validate_localhost_url(url);
    }

    let parsed = reqwest::Url::parse(url)
      .map_err(|_| Error::Validation(
        "Invalid base URL format.".to_string()
      ))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https"
    {   return Err(Error::Validation(
          "Invalid base URL format.".to_string()
        ));
    }

    if parsed.host_str().is_none()
    {   return Err(Error::Validation(
          "Invalid base URL format.".to_string()
        ));
    }

    Ok(())
}

/// Accept http(s)://localhost:<port>/... iff the port is a
/// plain decimal in 1-65535
fn validate_localhost_url(url: &str) -> Result<(), Error>
{   let port_part = url
      .splitn(3, ':')
      .nth(2)
      .map(|rest| {
        rest.split('/').next().unwrap_or("")
      })
      .unwrap_or("");

    if port_part.is_empty()
      || !port_part.chars().all(|c| c.is_ascii_digit())
    {   return Err(Error::Validation(
          "Invalid localhost URL format.".to_string()
        ));
    }

    match port_part.parse::<u32>()
    {   Ok(port) if (1..=65535).contains(&port) => Ok(())
      , _ => Err(Error::Validation(
          "Invalid localhost URL format.".to_string()
        ))
    }
}
