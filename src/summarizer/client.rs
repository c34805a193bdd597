//! HTTP client for the summarization service
//!
//! This module handles:
//! - Building the authenticated HTTP client
//! - Sending one page of text with the fixed instruction
//! - Retrying transport and protocol failures under a [`RetryPolicy`]
//! - Classifying replies that cannot be used

use crate::config::{ApiCredentials, SummarizerConfig};
use crate::summarizer::reply::{parse_reply, Reply};
use crate::summarizer::retry::RetryPolicy;
use crate::summarizer::SummarizeError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Header carrying the organization id, when one is configured
const ORG_HEADER: &str = "codegpt-org-id";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    agent: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Failure of a single attempt
#[derive(Debug)]
enum AttemptError {
    /// Worth another attempt
    Retryable(String),
    /// Retrying would not change the outcome
    Fatal(SummarizeError),
}

/// Summarization client with bounded retries
#[derive(Debug, Clone)]
pub struct SummarizerClient {
    client: Client,
    endpoint: String,
    agent_id: String,
    instruction: String,
    policy: RetryPolicy,
}

impl SummarizerClient {
    /// Builds a client from configuration and credentials
    ///
    /// # Returns
    ///
    /// * `Ok(SummarizerClient)` - Client ready to use
    /// * `Err(SummarizeError)` - Credentials are not valid header values, or the
    ///   HTTP client could not be built
    pub fn new(
        config: &SummarizerConfig,
        credentials: &ApiCredentials,
    ) -> Result<Self, SummarizeError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", credentials.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| SummarizeError::InvalidCredentials("api key"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(org_id) = &credentials.org_id {
            headers.insert(
                HeaderName::from_static(ORG_HEADER),
                HeaderValue::from_str(org_id.trim())
                    .map_err(|_| SummarizeError::InvalidCredentials("organization id"))?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(SummarizeError::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            agent_id: credentials.agent_id.clone(),
            instruction: config.instruction.clone(),
            policy: RetryPolicy::from_config(config),
        })
    }

    /// Replaces the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends `text` to the service and returns the rewritten content
    ///
    /// Transport errors, non-success statuses and non-JSON bodies are retried
    /// until the policy runs out. An empty reply, or JSON without a completion,
    /// fails immediately.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let prompt = format!("{}\n\n{}", self.instruction, text);
        let mut attempt = 0;

        loop {
            tracing::debug!(
                "Summarizer attempt {}/{}",
                attempt + 1,
                self.policy.max_attempts
            );

            match self.attempt(&prompt).await {
                Ok(content) => return Ok(content),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(reason)) => {
                    if !self.policy.has_next(attempt) {
                        return Err(SummarizeError::Exhausted {
                            attempts: attempt + 1,
                            last: reason,
                        });
                    }

                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        "Summarizer attempt {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<String, AttemptError> {
        let request = ChatRequest {
            agent: &self.agent_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Retryable(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Retryable(describe_transport_error(&e)))?;

        match parse_reply(&body) {
            Reply::Completion(content) if content.trim().is_empty() => {
                Err(AttemptError::Fatal(SummarizeError::EmptyResponse))
            }
            Reply::Completion(content) => Ok(content),
            Reply::Empty => Err(AttemptError::Fatal(SummarizeError::EmptyResponse)),
            Reply::Missing => Err(AttemptError::Fatal(SummarizeError::MissingCompletion)),
            Reply::Malformed(e) => Err(AttemptError::Retryable(format!("malformed reply: {}", e))),
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        e.to_string()
    }
}
