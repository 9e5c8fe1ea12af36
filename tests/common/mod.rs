// tests/common/mod.rs
//! In-memory stand-ins for the Lark Open API and the login flow.
#![allow(dead_code)]

use async_trait::async_trait;
use lark2md::api::{BlocksPage, DownloadedMedia, SheetMetadata, TmpDownloadUrl, ValuesApi};
use lark2md::{
    AppError, BearerToken, DocumentId, FetchError, LarkConnector, LarkErrorCode, LarkRepository,
    LoginFlow, LoginPrompt, ResourceToken,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

/// The `data` object of a fixture envelope.
pub fn fixture_data(name: &str) -> Value {
    let path = format!(
        "{}/tests/fixtures/api_responses/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path, e));
    let envelope: Value = serde_json::from_str(&text).unwrap();
    envelope["data"].clone()
}

pub fn fixture_page(name: &str) -> BlocksPage {
    serde_json::from_value(fixture_data(name)).unwrap()
}

pub fn fetch_error(status: u16, code: Option<i64>, message: &str) -> AppError {
    AppError::Fetch(FetchError {
        status,
        code: code.map(LarkErrorCode::from_code),
        message: Some(message.to_string()).filter(|m| !m.is_empty()),
        endpoint: "fake".to_string(),
    })
}

#[derive(Default)]
struct FakeState {
    /// Pages keyed by the page token that requests them; "" is the first page
    pages: HashMap<String, BlocksPage>,
    blocks_failure: Option<(u16, Option<i64>, String)>,
    image_urls: HashMap<String, Vec<TmpDownloadUrl>>,
    downloads: HashMap<String, DownloadedMedia>,
    sheet_meta: HashMap<(String, String), SheetMetadata>,
    sheet_values: HashMap<String, Vec<Vec<Value>>>,
    v2_unknown: HashSet<String>,
    board_nodes: HashMap<String, Vec<Value>>,
    snapshots: HashMap<String, DownloadedMedia>,
}

/// A scripted Lark backend. Anything not scripted answers 404.
#[derive(Clone, Default)]
pub struct FakeLark {
    state: Arc<Mutex<FakeState>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeLark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves the two fixture pages of the "Report" document.
    pub fn with_report_pages() -> Self {
        let fake = Self::new();
        fake.page("", fixture_page("blocks_page_first.json"));
        fake.page("p2", fixture_page("blocks_page_last.json"));
        fake
    }

    /// A single final page holding `items`.
    pub fn with_blocks(items: Vec<Value>) -> Self {
        let fake = Self::new();
        fake.page(
            "",
            BlocksPage {
                items,
                has_more: false,
                page_token: None,
            },
        );
        fake
    }

    pub fn page(&self, token: &str, page: BlocksPage) {
        self.state.lock().pages.insert(token.to_string(), page);
    }

    pub fn fail_blocks(&self, status: u16, code: Option<i64>, message: &str) {
        self.state.lock().blocks_failure = Some((status, code, message.to_string()));
    }

    /// Scripts an image token whose presigned URL serves `bytes`.
    pub fn image(&self, token: &str, bytes: &[u8]) {
        let url = format!("https://tmp.example/{}", token);
        let mut state = self.state.lock();
        state.image_urls.insert(
            token.to_string(),
            vec![TmpDownloadUrl {
                file_token: token.to_string(),
                tmp_download_url: url.clone(),
            }],
        );
        state.downloads.insert(
            url,
            DownloadedMedia {
                content_type: None,
                bytes: bytes.to_vec(),
            },
        );
    }

    /// Scripts an image token with a download URL that fails.
    pub fn broken_image(&self, token: &str) {
        self.state.lock().image_urls.insert(
            token.to_string(),
            vec![TmpDownloadUrl {
                file_token: token.to_string(),
                tmp_download_url: format!("https://tmp.example/missing/{}", token),
            }],
        );
    }

    pub fn sheet(&self, spreadsheet: &str, sheet_id: &str, title: Option<&str>, values: Vec<Vec<Value>>) {
        let rows = values.len() as u32;
        let columns = values.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut state = self.state.lock();
        state.sheet_meta.insert(
            (spreadsheet.to_string(), sheet_id.to_string()),
            SheetMetadata {
                title: title.map(str::to_string),
                row_count: rows,
                column_count: columns,
            },
        );
        state.sheet_values.insert(spreadsheet.to_string(), values);
    }

    /// Makes the v2 values endpoint answer 404 for `spreadsheet`.
    pub fn v2_unknown(&self, spreadsheet: &str) {
        self.state.lock().v2_unknown.insert(spreadsheet.to_string());
    }

    pub fn board(&self, token: &str, nodes: Vec<Value>) {
        self.state.lock().board_nodes.insert(token.to_string(), nodes);
    }

    pub fn snapshot(&self, token: &str, bytes: &[u8]) {
        self.state.lock().snapshots.insert(
            token.to_string(),
            DownloadedMedia {
                content_type: Some("image/png".to_string()),
                bytes: bytes.to_vec(),
            },
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

fn not_found(what: &str) -> AppError {
    AppError::Fetch(FetchError {
        status: 404,
        code: None,
        message: None,
        endpoint: what.to_string(),
    })
}

#[async_trait]
impl LarkRepository for FakeLark {
    async fn blocks_page(
        &self,
        document: &DocumentId,
        page_token: Option<&str>,
    ) -> Result<BlocksPage, AppError> {
        let token = page_token.unwrap_or_default();
        self.record(format!("blocks:{}:{}", document, token));
        let state = self.state.lock();
        if let Some((status, code, message)) = &state.blocks_failure {
            return Err(fetch_error(*status, *code, message));
        }
        state
            .pages
            .get(token)
            .cloned()
            .ok_or_else(|| not_found("blocks"))
    }

    async fn image_download_urls(
        &self,
        token: &ResourceToken,
    ) -> Result<Vec<TmpDownloadUrl>, AppError> {
        self.record(format!("image_urls:{}", token));
        self.state
            .lock()
            .image_urls
            .get(token.as_str())
            .cloned()
            .ok_or_else(|| not_found("batch_get_tmp_download_url"))
    }

    async fn download(&self, url: &str) -> Result<DownloadedMedia, AppError> {
        self.record(format!("download:{}", url));
        self.state
            .lock()
            .downloads
            .get(url)
            .cloned()
            .ok_or_else(|| not_found("media download"))
    }

    async fn sheet_metadata(
        &self,
        spreadsheet: &str,
        sheet_id: &str,
    ) -> Result<SheetMetadata, AppError> {
        self.record(format!("sheet_meta:{}:{}", spreadsheet, sheet_id));
        self.state
            .lock()
            .sheet_meta
            .get(&(spreadsheet.to_string(), sheet_id.to_string()))
            .cloned()
            .ok_or_else(|| not_found("sheets/v3"))
    }

    async fn sheet_values(
        &self,
        spreadsheet: &str,
        range: &str,
        api: ValuesApi,
    ) -> Result<Vec<Vec<Value>>, AppError> {
        self.record(format!("sheet_values:{:?}:{}:{}", api, spreadsheet, range));
        let state = self.state.lock();
        if api == ValuesApi::V2 && state.v2_unknown.contains(spreadsheet) {
            return Err(not_found("sheets/v2"));
        }
        state
            .sheet_values
            .get(spreadsheet)
            .cloned()
            .ok_or_else(|| not_found("values"))
    }

    async fn board_nodes(&self, board: &ResourceToken) -> Result<Vec<Value>, AppError> {
        self.record(format!("board_nodes:{}", board));
        self.state
            .lock()
            .board_nodes
            .get(board.as_str())
            .cloned()
            .ok_or_else(|| not_found("board nodes"))
    }

    async fn board_snapshot(&self, board: &ResourceToken) -> Result<DownloadedMedia, AppError> {
        self.record(format!("board_snapshot:{}", board));
        self.state
            .lock()
            .snapshots
            .get(board.as_str())
            .cloned()
            .ok_or_else(|| not_found("board snapshot"))
    }
}

/// Hands out the same fake for every token and remembers which tokens it saw.
#[derive(Clone, Default)]
pub struct FakeConnector {
    pub lark: FakeLark,
    pub tokens: Arc<Mutex<Vec<String>>>,
}

impl FakeConnector {
    pub fn new(lark: FakeLark) -> Self {
        Self {
            lark,
            tokens: Arc::default(),
        }
    }
}

impl LarkConnector for FakeConnector {
    fn connect(&self, token: BearerToken) -> Result<Box<dyn LarkRepository>, AppError> {
        self.tokens.lock().push(token.as_str().to_string());
        Ok(Box::new(self.lark.clone()))
    }
}

/// A login flow with a fixed prompt.
pub struct FakeLogin;

impl LoginFlow for FakeLogin {
    fn begin(&self) -> Result<LoginPrompt, AppError> {
        Ok(LoginPrompt {
            authorization_url: "https://accounts.example.com/open-apis/authen/v1/index?state=s1"
                .to_string(),
            state: "s1".to_string(),
            message: "Open the URL to log in".to_string(),
            next_step: "Run exchange with the code".to_string(),
        })
    }
}

/// A login flow that cannot start, as when no client id is configured.
pub struct BrokenLogin;

impl LoginFlow for BrokenLogin {
    fn begin(&self) -> Result<LoginPrompt, AppError> {
        Err(AppError::MissingConfiguration(
            "LARK_CLIENT_ID not configured".to_string(),
        ))
    }
}
