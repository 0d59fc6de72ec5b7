use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not reach the checking service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("checking service returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not parse the checking service response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Blocking client for a LanguageTool-compatible HTTP API.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Submit text for checking and return the reported matches.
    pub fn check(
        &self,
        text: &str,
        language: &str,
        disabled_rules: &[String],
    ) -> Result<CheckResponse, ApiError> {
        let url = format!("{}/check", self.endpoint);

        let mut params = vec![
            ("text", text.to_string()),
            ("language", language.to_string()),
        ];
        if !disabled_rules.is_empty() {
            params.push(("disabledRules", disabled_rules.join(",")));
        }

        let response = self.http.post(&url).form(&params).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: snippet(&body),
            });
        }

        // Parse from the raw body so a non-JSON reply surfaces as a parse
        // failure with the offending text nearby, not a transport error.
        Ok(serde_json::from_str(&body)?)
    }

    /// List the languages the service supports.
    pub fn languages(&self) -> Result<Vec<Language>, ApiError> {
        let url = format!("{}/languages", self.endpoint);

        let response = self.http.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: snippet(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// First line of a response body, shortened for error messages.
fn snippet(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    let mut out: String = line.chars().take(120).collect();
    if line.chars().count() > 120 {
        out.push_str("...");
    }
    out
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub matches: Vec<ApiMatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMatch {
    #[serde(default)]
    pub message: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default)]
    pub rule: Option<Rule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Replacement {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Language {
    pub name: String,
    #[serde(rename = "longCode")]
    pub long_code: String,
}
