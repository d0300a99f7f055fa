// API client module: a small blocking HTTP client for the Gemini File
// Search Store REST API. Every call is synchronous and returns as soon as
// the server has answered; there is no retry and no caching.

use crate::error::ApiError;
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://generativelanguage.googleapis.com/upload/v1beta";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

// Uploads of large documents can take a while before the server answers.
const REQUEST_TIMEOUT_SECS: u64 = 300;
const USER_AGENT: &str = concat!("filestore-cli/", env!("CARGO_PKG_VERSION"));

const MIME_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
];

/// Where to send requests and which key to attach to them.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub upload_base_url: String,
}

impl ClientConfig {
    /// Config pointing at the public Gemini endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        ClientConfig {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
        }
    }

    /// Override both endpoints, e.g. to go through a proxy or a mock server.
    pub fn with_base_urls(mut self, base_url: &str, upload_base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.upload_base_url = upload_base_url.trim_end_matches('/').to_string();
        self
    }
}

/// A file store as returned by the server. Only the fields the CLI prints
/// are named; everything else the server sends is kept in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A document indexed inside a store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mime_type: String,
    /// int64 fields come back as JSON strings; see [`Document::size_bytes`].
    #[serde(default, rename = "sizeBytes")]
    pub raw_size_bytes: Value,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub create_time: String,
    #[serde(default)]
    pub update_time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Size in bytes, whether the server encoded it as a string or a number.
    /// Anything unreadable counts as 0.
    pub fn size_bytes(&self) -> u64 {
        match &self.raw_size_bytes {
            Value::Number(n) => n.as_u64().unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Long-running upload/indexing job.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Operation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateStoreRequest<'a> {
    display_name: &'a str,
}

/// One page of a list endpoint.
trait Page: DeserializeOwned {
    type Item;
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StorePage {
    #[serde(default)]
    file_search_stores: Vec<Store>,
    next_page_token: Option<String>,
}

impl Page for StorePage {
    type Item = Store;
    fn into_parts(self) -> (Vec<Store>, Option<String>) {
        (self.file_search_stores, self.next_page_token)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct DocumentPage {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

impl Page for DocumentPage {
    type Item = Document;
    fn into_parts(self) -> (Vec<Document>, Option<String>) {
        (self.documents, self.next_page_token)
    }
}

/// Blocking client for the file store endpoints. Cheap to clone.
#[derive(Clone)]
pub struct FileStoreClient {
    client: Client,
    config: ClientConfig,
}

impl FileStoreClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(FileStoreClient { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// All stores visible to the key, across every page.
    pub fn list_stores(&self) -> Result<Vec<Store>, ApiError> {
        self.collect_pages::<StorePage>("fileSearchStores")
    }

    /// First store whose display name matches exactly, if any.
    pub fn get_store_by_display_name(&self, display_name: &str) -> Result<Option<Store>, ApiError> {
        let stores = self.list_stores()?;
        Ok(find_by_display_name(stores, display_name))
    }

    pub fn create_store(&self, display_name: &str) -> Result<Store, ApiError> {
        let url = self.url("fileSearchStores");
        let req = self
            .request(Method::POST, &url)
            .json(&CreateStoreRequest { display_name });
        self.send(req, "fileSearchStores")
    }

    /// Delete a store and everything in it (`force=true`).
    pub fn delete_store(&self, name: &str) -> Result<(), ApiError> {
        self.force_delete(name)
    }

    pub fn list_documents(&self, store_name: &str) -> Result<Vec<Document>, ApiError> {
        self.collect_pages::<DocumentPage>(&format!("{}/documents", store_name))
    }

    pub fn delete_document(&self, name: &str) -> Result<(), ApiError> {
        self.force_delete(name)
    }

    /// Upload one local file into a store as multipart/form-data. The
    /// returned operation usually is not `done` yet; poll it with
    /// [`FileStoreClient::get_operation`].
    pub fn upload_file(&self, store_name: &str, path: &Path) -> Result<Operation, ApiError> {
        let url = format!(
            "{}/{}:uploadToFileSearchStore",
            self.config.upload_base_url, store_name
        );
        let file_error = |source| ApiError::File {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(file_error)?;
        let length = file.metadata().map_err(file_error)?.len();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
            .to_string();

        let part = multipart::Part::reader_with_length(file, length)
            .file_name(file_name)
            .mime_str(mime_type_for(path))?;
        let form = multipart::Form::new().part("file", part);

        debug!(store = store_name, path = %path.display(), length, "uploading file");
        self.send(
            self.request(Method::POST, &url).multipart(form),
            "uploadToFileSearchStore",
        )
    }

    pub fn get_operation(&self, name: &str) -> Result<Operation, ApiError> {
        let url = self.url(name);
        self.send(self.request(Method::GET, &url), name)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.config.base_url, resource)
    }

    /// Every request carries the key as a query parameter.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "sending request");
        self.client
            .request(method, url)
            .query(&[("key", self.config.api_key.as_str())])
    }

    fn force_delete(&self, name: &str) -> Result<(), ApiError> {
        let url = self.url(name);
        let req = self
            .request(Method::DELETE, &url)
            .query(&[("force", "true")]);
        read_body(req.send()?)?;
        Ok(())
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder, endpoint: &str) -> Result<T, ApiError> {
        let text = read_body(req.send()?)?;
        parse_body(endpoint, &text)
    }

    fn collect_pages<P: Page>(&self, resource: &str) -> Result<Vec<P::Item>, ApiError> {
        let url = self.url(resource);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut req = self.request(Method::GET, &url);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }
            let page: P = self.send(req, resource)?;
            let (page_items, next) = page.into_parts();
            items.extend(page_items);
            match next.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(items)
    }
}

/// Linear scan for the first exact display-name match.
pub fn find_by_display_name(stores: Vec<Store>, display_name: &str) -> Option<Store> {
    stores.into_iter().find(|s| s.display_name == display_name)
}

/// MIME type sent for an upload, from the file extension (case-insensitive).
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return DEFAULT_MIME_TYPE,
    };
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Read the body, turning 4xx/5xx into `ApiError::Http` with the raw text.
fn read_body(res: Response) -> Result<String, ApiError> {
    let status = res.status();
    if status.is_client_error() || status.is_server_error() {
        let body = res.text().unwrap_or_else(|_| "".into());
        return Err(ApiError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(res.text()?)
}

fn parse_body<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T, ApiError> {
    let text = if text.trim().is_empty() { "{}" } else { text };
    serde_json::from_str(text).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
