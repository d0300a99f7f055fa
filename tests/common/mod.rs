// Shared harness: a wiremock server running on its own tokio runtime, and
// a blocking client pointed at it. Tests stay plain `#[test]` functions so
// the blocking client is never created inside an async context.
#![allow(dead_code)]

use filestore_cli::api::{ClientConfig, FileStoreClient};
use filestore_cli::upload::UploadOptions;
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

pub const API_KEY: &str = "test-key";

pub struct MockApi {
    // Dropped before the runtime.
    pub server: MockServer,
    pub rt: Runtime,
}

impl MockApi {
    pub fn start() -> Self {
        let rt = Runtime::new().expect("tokio runtime");
        let server = rt.block_on(MockServer::start());
        MockApi { server, rt }
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    pub fn base_url(&self) -> String {
        format!("{}/v1beta", self.server.uri())
    }

    pub fn upload_base_url(&self) -> String {
        format!("{}/upload/v1beta", self.server.uri())
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(API_KEY).with_base_urls(&self.base_url(), &self.upload_base_url())
    }

    pub fn client(&self) -> FileStoreClient {
        FileStoreClient::new(self.config()).expect("client")
    }

    pub fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn verify(&self) {
        self.rt.block_on(self.server.verify());
    }
}

pub fn fast_polling() -> UploadOptions {
    UploadOptions {
        poll_interval: Duration::from_millis(10),
        spinner: false,
    }
}
