//! Redis over HTTP (Upstash / Vercel KV REST protocol)
//!
//! Each command is POSTed as a JSON array (`["HGET", "decks", "spanish"]`) with
//! a bearer token. Replies are `{"result": ...}` or `{"error": "..."}`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::KvStore;
use crate::error::{KvError, KvResult};

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a REST-fronted Redis
#[derive(Debug, Clone)]
pub struct RestKvStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl RestKvStore {
    pub fn new(url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Send one command and return its `result`
    async fn command(&self, args: &[&str]) -> KvResult<Value> {
        log::debug!("KV command: {}", args.first().copied().unwrap_or_default());

        let response = self
            .client
            .post(&self.url)
            .header("User-Agent", "deck_server/1.0")
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let reply: RestReply = match response.json().await {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => return Err(KvError::HttpStatus(status)),
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = reply.error {
            return Err(KvError::Remote(error));
        }
        if !status.is_success() {
            return Err(KvError::HttpStatus(status));
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }
}

fn as_count(value: &Value) -> KvResult<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| KvError::Decode(format!("expected a count, got {}", n))),
        // Some proxies stringify integers
        Value::String(s) => s
            .parse()
            .map_err(|_| KvError::Decode(format!("expected a count, got {:?}", s))),
        other => Err(KvError::Decode(format!("expected a count, got {}", other))),
    }
}

/// HGETALL replies with a flat `[field, value, field, value, ...]` array
fn as_pairs(value: Value) -> KvResult<Vec<(String, String)>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => return Err(KvError::Decode(format!("expected an array, got {}", other))),
    };
    if items.len() % 2 != 0 {
        return Err(KvError::Decode("odd number of HGETALL items".to_string()));
    }

    let mut strings = items.into_iter().map(|item| match item {
        Value::String(s) => Ok(s),
        other => Err(KvError::Decode(format!("expected a string, got {}", other))),
    });

    let mut pairs = Vec::new();
    while let (Some(field), Some(value)) = (strings.next(), strings.next()) {
        pairs.push((field?, value?));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs)
}

#[async_trait]
impl KvStore for RestKvStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn hlen(&self, key: &str) -> KvResult<usize> {
        let value = self.command(&["HLEN", key]).await?;
        Ok(as_count(&value)? as usize)
    }

    async fn hget(&self, key: &str, field: &str) -> KvResult<Option<String>> {
        match self.command(&["HGET", key, field]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(KvError::Decode(format!("expected a string, got {}", other))),
        }
    }

    async fn hgetall(&self, key: &str) -> KvResult<Vec<(String, String)>> {
        as_pairs(self.command(&["HGETALL", key]).await?)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> KvResult<()> {
        self.command(&["HSET", key, field, value]).await?;
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> KvResult<bool> {
        let value = self.command(&["HDEL", key, field]).await?;
        Ok(as_count(&value)? > 0)
    }

    async fn del(&self, key: &str) -> KvResult<()> {
        self.command(&["DEL", key]).await?;
        Ok(())
    }
}
