// src/api/client.rs
//! Thin HTTP client wrapper for the Lark Open API.
//!
//! Handles authentication, timeouts and raw request/response plumbing.
//! Envelope parsing lives in [`super::parser`].

use super::parser::{parse_data, parse_envelope};
use super::responses::{extract_value_rows, BoardNodesData, SheetData, TmpDownloadUrlsData};
use super::types::{BlocksPage, DownloadedMedia, SheetMetadata, TmpDownloadUrl, ValuesApi};
use crate::constants::{BOARD_SNAPSHOT_TIMEOUT, LARK_BLOCKS_PAGE_SIZE, MEDIA_FETCH_TIMEOUT};
use crate::error::{AppError, FetchError};
use crate::types::{BearerToken, DocumentId, ResourceToken};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

/// A reqwest client bound to one API domain and one bearer token.
///
/// The token is attached per request rather than as a default header, so
/// presigned media downloads go out without credentials.
#[derive(Clone)]
pub struct LarkHttpClient {
    client: Client,
    api_domain: String,
    token: BearerToken,
}

impl LarkHttpClient {
    pub fn new(api_domain: &str, token: BearerToken) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_domain: api_domain.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/open-apis/{}", self.api_domain, endpoint)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.as_str())
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
    }

    /// Makes an authenticated GET request to the specified endpoint.
    ///
    /// `endpoint` is the path below `/open-apis/`. `timeout` of `None`
    /// waits indefinitely.
    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<ApiResponse<String>, AppError> {
        let url = self.url(endpoint);
        log::debug!("GET {}", url);

        let mut request = self.authed(self.client.get(url)).query(query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        log::debug!("{} -> {}", endpoint, response.status());
        extract_response_text(endpoint, response).await
    }

    async fn get_bytes(
        &self,
        request: RequestBuilder,
        label: &str,
    ) -> Result<DownloadedMedia, AppError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError {
                status: status.as_u16(),
                code: None,
                message: None,
                endpoint: label.to_string(),
            }
            .into());
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(DownloadedMedia {
            content_type,
            bytes,
        })
    }
}

#[async_trait::async_trait]
impl super::LarkRepository for LarkHttpClient {
    async fn blocks_page(
        &self,
        document: &DocumentId,
        page_token: Option<&str>,
    ) -> Result<BlocksPage, AppError> {
        let endpoint = format!("docx/v1/documents/{}/blocks", document.as_str());
        let page_size = LARK_BLOCKS_PAGE_SIZE.to_string();
        let mut query = vec![("page_size", page_size.as_str())];
        if let Some(token) = page_token {
            query.push(("page_token", token));
        }
        let result = self.get(&endpoint, &query, None).await?;
        parse_data(&result)
    }

    async fn image_download_urls(
        &self,
        token: &ResourceToken,
    ) -> Result<Vec<TmpDownloadUrl>, AppError> {
        let result = self
            .get(
                "drive/v1/medias/batch_get_tmp_download_url",
                &[("file_tokens", token.as_str())],
                Some(MEDIA_FETCH_TIMEOUT),
            )
            .await?;
        let data: TmpDownloadUrlsData = parse_data(&result)?;
        Ok(data.tmp_download_urls)
    }

    async fn download(&self, url: &str) -> Result<DownloadedMedia, AppError> {
        log::debug!("GET {}", url);
        let request = self.client.get(url).timeout(MEDIA_FETCH_TIMEOUT);
        self.get_bytes(request, "media download").await
    }

    async fn sheet_metadata(
        &self,
        spreadsheet: &str,
        sheet_id: &str,
    ) -> Result<SheetMetadata, AppError> {
        let endpoint = format!("sheets/v3/spreadsheets/{}/sheets/{}", spreadsheet, sheet_id);
        let result = self.get(&endpoint, &[], Some(MEDIA_FETCH_TIMEOUT)).await?;
        let data: SheetData = parse_data(&result)?;
        Ok(data.into())
    }

    async fn sheet_values(
        &self,
        spreadsheet: &str,
        range: &str,
        api: ValuesApi,
    ) -> Result<Vec<Vec<Value>>, AppError> {
        let endpoint = match api {
            ValuesApi::V2 => format!("sheets/v2/spreadsheets/{}/values/{}", spreadsheet, range),
            ValuesApi::V3 => format!(
                "sheets/v3/spreadsheets/{}/values/{}",
                spreadsheet,
                utf8_percent_encode(range, NON_ALPHANUMERIC)
            ),
        };
        let result = self
            .get(
                &endpoint,
                &[
                    ("valueRenderOption", "ToString"),
                    ("dateTimeRenderOption", "FormattedString"),
                ],
                Some(MEDIA_FETCH_TIMEOUT),
            )
            .await?;
        let body = parse_envelope(&result)?;
        Ok(extract_value_rows(&body))
    }

    async fn board_nodes(&self, board: &ResourceToken) -> Result<Vec<Value>, AppError> {
        let endpoint = format!("board/v1/whiteboards/{}/nodes", board.as_str());
        let result = self.get(&endpoint, &[], Some(MEDIA_FETCH_TIMEOUT)).await?;
        let data: BoardNodesData = parse_data(&result)?;
        Ok(data.nodes)
    }

    async fn board_snapshot(&self, board: &ResourceToken) -> Result<DownloadedMedia, AppError> {
        let endpoint = format!("board/v1/whiteboards/{}/download_as_image", board.as_str());
        let url = self.url(&endpoint);
        log::debug!("GET {}", url);
        let request = self
            .client
            .get(url)
            .bearer_auth(self.token.as_str())
            .timeout(BOARD_SNAPSHOT_TIMEOUT);
        self.get_bytes(request, &endpoint).await
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    /// Endpoint path below `/open-apis/`
    pub endpoint: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(
    endpoint: &str,
    response: Response,
) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        endpoint: endpoint.to_string(),
    })
}
