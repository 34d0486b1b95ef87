//! Where documents come from: the Dynalist API, optionally behind a disk cache.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::{Document, FileList};
use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://dynalist.io/api/v1";

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches every folder and document the account can see.
    async fn file_list(&self) -> Result<FileList>;

    /// Fetches the content nodes of one document.
    async fn document(&self, document_id: &str) -> Result<Document>;
}

/// Client for the Dynalist HTTP API.
pub struct DynalistClient {
    client: Client,
    api_base: String,
    token: String,
}

impl DynalistClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    pub fn with_api_base(token: impl Into<String>, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("dynalist2md/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn request<T: DeserializeOwned>(&self, endpoint: &str, params: Value) -> Result<T> {
        let url = format!("{}/{endpoint}", self.api_base);
        let mut body = Map::new();
        body.insert("token".into(), Value::String(self.token.clone()));
        if let Value::Object(params) = params {
            body.extend(params);
        }

        debug!("POST {}", url);
        let response = self.client.post(&url).json(&body).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Error::Api {
                status: response.status().as_u16(),
            });
        }

        let result: Value = response.json().await?;
        match result.get("_code").and_then(Value::as_str) {
            Some("InvalidToken") => return Err(Error::InvalidToken),
            Some(code) if !code.eq_ignore_ascii_case("ok") => {
                let message = result
                    .get("_msg")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(Error::ApiCode {
                    code: code.to_string(),
                    message,
                });
            }
            _ => {}
        }
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl DocumentSource for DynalistClient {
    async fn file_list(&self) -> Result<FileList> {
        self.request("file/list", json!({})).await
    }

    async fn document(&self, document_id: &str) -> Result<Document> {
        self.request("doc/read", json!({ "file_id": document_id })).await
    }
}

/// Serves responses from `directory` when present, otherwise fetches from
/// `inner` and stores the result there.
pub struct CachedSource<S> {
    inner: S,
    directory: PathBuf,
}

impl<S: DocumentSource> CachedSource<S> {
    pub fn new(inner: S, directory: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            directory: directory.into(),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        debug!("cache hit: {}", path.display());
        let json = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.directory)?;
        fs::write(self.entry_path(key), serde_json::to_string(value)?)?;
        Ok(())
    }
}

#[async_trait]
impl<S: DocumentSource> DocumentSource for CachedSource<S> {
    async fn file_list(&self) -> Result<FileList> {
        if let Some(list) = self.load("file_list")? {
            return Ok(list);
        }
        let list = self.inner.file_list().await?;
        self.store("file_list", &list)?;
        Ok(list)
    }

    async fn document(&self, document_id: &str) -> Result<Document> {
        let key = document_key(document_id);
        if let Some(document) = self.load(&key)? {
            return Ok(document);
        }
        let document = self.inner.document(document_id).await?;
        self.store(&key, &document)?;
        Ok(document)
    }
}

/// Cache key for a document; ids are hex-encoded so distinct ids never
/// share a file.
fn document_key(document_id: &str) -> String {
    let hex: String = document_id.bytes().map(|b| format!("{b:02x}")).collect();
    format!("doc_{hex}")
}
