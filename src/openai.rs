//! Client construction for OpenAI-compatible chat endpoints (OpenAI, OpenRouter).

use crate::config::LlmEndpointSettings;
use crate::error::{FocusTubeError, Result};
use async_openai::{config::OpenAIConfig, Client};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Create a client for the given endpoint.
///
/// Fails with a configuration error when the endpoint's API key variable is unset.
pub fn create_client(endpoint: &LlmEndpointSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = endpoint.api_key().ok_or_else(|| {
        FocusTubeError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            endpoint.api_key_env, endpoint.api_key_env
        ))
    })?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(endpoint.timeout_seconds))
        .default_headers(attribution_headers(endpoint)?)
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(endpoint.base_url.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// OpenRouter ranks apps by these optional headers.
fn attribution_headers(endpoint: &LlmEndpointSettings) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let pairs = [
        ("http-referer", endpoint.referer.as_deref()),
        ("x-title", endpoint.app_title.as_deref()),
    ];

    for (name, value) in pairs {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let value = HeaderValue::from_str(value).map_err(|e| {
                FocusTubeError::Config(format!("Invalid {} header value: {}", name, e))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribution_headers() {
        let endpoint = LlmEndpointSettings::default();
        let headers = attribution_headers(&endpoint).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get("x-title").unwrap(),
            "FocusTube - Educational Video Platform"
        );

        let openai = LlmEndpointSettings::openai("gpt-4o");
        assert!(attribution_headers(&openai).unwrap().is_empty());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut endpoint = LlmEndpointSettings::default();
        endpoint.api_key_env = "FOCUSTUBE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(matches!(
            create_client(&endpoint),
            Err(FocusTubeError::Config(_))
        ));
    }
}
