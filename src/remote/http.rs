// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! HTTP implementation of [`Remote`].
//!
//! Results and the result log are read from a compute endpoint. Evaluations
//! are posted to a relay that signs and forwards the message; the wire format
//! of the signed message is the relay's business.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{EvalResult, ListQuery, LogEdge, Remote};
use crate::error::{Error, Result};

pub(crate) struct HttpRemote {
    client: Client,
    compute_url: Url,
    relay_url: Url,
}

#[derive(Deserialize)]
struct ResultsPage {
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Deserialize)]
struct RawEdge {
    cursor: String,
    #[serde(default)]
    node: RawResult,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct RawResult {
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    message: Option<RawMessageRef>,
}

#[derive(Deserialize)]
struct RawMessageRef {
    #[serde(rename = "Id", alias = "id")]
    id: Option<String>,
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Output fields normalized from the shapes the network returns.
#[derive(Debug, Default, PartialEq, Eq)]
struct Output {
    data: Option<String>,
    prompt: Option<String>,
    print: bool,
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `Output` is either bare text or `{data, print, prompt}`, where `data` may
/// itself be an object holding `output` and `prompt`.
fn normalize_output(value: &Value) -> Output {
    match value {
        Value::Null => Output::default(),
        Value::String(s) => Output {
            data: Some(s.clone()),
            prompt: None,
            print: true,
        },
        Value::Object(map) => {
            let mut prompt = map.get("prompt").and_then(value_text);
            let data = match map.get("data") {
                Some(Value::Object(inner)) => {
                    if prompt.is_none() {
                        prompt = inner.get("prompt").and_then(value_text);
                    }
                    inner
                        .get("output")
                        .and_then(value_text)
                        .or_else(|| inner.get("json").and_then(value_text))
                }
                Some(other) => value_text(other),
                None => None,
            };
            Output {
                data,
                prompt,
                print: map.get("print").and_then(Value::as_bool).unwrap_or(true),
            }
        }
        other => Output {
            data: Some(other.to_string()),
            prompt: None,
            print: true,
        },
    }
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) if map.is_empty() => None,
        Value::String(s) if s.is_empty() => None,
        other => value_text(other),
    }
}

impl From<RawEdge> for LogEdge {
    fn from(edge: RawEdge) -> Self {
        let output = normalize_output(&edge.node.output);
        LogEdge {
            cursor: edge.cursor,
            message_id: edge.node.message.and_then(|m| m.id),
            output_print: output.print,
            output_data: output.data,
            output_prompt: output.prompt,
        }
    }
}

impl HttpRemote {
    pub(crate) fn new(compute_url: &str, relay_url: &str) -> Result<Self> {
        let parse = |raw: &str, what: &str| {
            Url::parse(raw).map_err(|e| Error::Config(format!("invalid {what} url '{raw}': {e}")))
        };
        Ok(Self {
            client: Client::new(),
            compute_url: parse(compute_url, "compute")?,
            relay_url: parse(relay_url, "relay")?,
        })
    }

    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("url '{base}' cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Remote for HttpRemote {
    async fn send_eval(&self, target: &str, code: &str) -> Result<String> {
        let url = Self::endpoint(&self.relay_url, &["eval"])?;
        debug!(%url, process = target, "POST eval");
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "target": target, "data": code }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body: SendResponse = response.json().await?;
        body.id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Protocol("relay response carried no message id".into()))
    }

    async fn fetch_result(&self, target: &str, message_id: &str) -> Result<EvalResult> {
        let mut url = Self::endpoint(&self.compute_url, &["result", message_id])?;
        url.query_pairs_mut().append_pair("process-id", target);
        let raw: RawResult = self.get_json(url).await?;
        let output = normalize_output(&raw.output);
        Ok(EvalResult {
            output_data: output.data,
            output_prompt: output.prompt,
            error: error_text(&raw.error),
        })
    }

    async fn list_results(&self, target: &str, query: &ListQuery) -> Result<Vec<LogEdge>> {
        let mut url = Self::endpoint(&self.compute_url, &["results", target])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("sort", query.sort.as_str())
                .append_pair("limit", &query.limit.to_string());
            if let Some(from) = &query.from {
                pairs.append_pair("from", from);
            }
        }
        let page: ResultsPage = self.get_json(url).await?;
        Ok(page.edges.into_iter().map(LogEdge::from).collect())
    }
}
