use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::FeedConfig;
use crate::http::{HttpClient, HttpResponse};
use crate::page;

use super::types::{ImageRecord, PageResult};

/// 拉取失败
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error! status: {status_code}")]
    Status { status_code: u16 },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code } => Some(*status_code),
            _ => None,
        }
    }
}

/// 单页拉取；不读写缓存，缓存策略由 FeedController 负责
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<PageResult, FetchError>;
}

/// `/api/images` 客户端
#[derive(Clone)]
pub struct ImagesApi {
    client: HttpClient,
    base_url: String,
}

impl ImagesApi {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self::with_client(HttpClient::new()?, base_url))
    }

    pub fn from_config(config: &FeedConfig) -> anyhow::Result<Self> {
        let client = HttpClient::with_config(config.timeout_secs, None)?;
        Ok(Self::with_client(client, config.api_base_url.clone()))
    }

    pub fn with_client(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 获取单张图片，不存在时返回 None
    pub async fn fetch_image(&self, id: i64) -> Result<Option<ImageRecord>, FetchError> {
        let url = format!("{}/images/{}", self.base_url, id);
        let response = self.get(&url).await?;

        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(FetchError::Status { status_code: response.status });
        }

        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.client
            .get(url, HashMap::new())
            .await
            .map_err(|e| {
                tracing::warn!("Request to {} failed: {}", url, e);
                FetchError::Transport(e.to_string())
            })
    }
}

#[async_trait]
impl PageFetcher for ImagesApi {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<PageResult, FetchError> {
        let url = format!("{}/images?page={}&per_page={}", self.base_url, page, per_page);
        tracing::debug!("Fetching page {} ({} per page)", page, per_page);

        let response = self.get(&url).await?;
        if !response.is_success() {
            tracing::warn!("Fetching page {} returned status {}", page, response.status);
            return Err(FetchError::Status { status_code: response.status });
        }

        parse_page(&response, per_page)
    }
}

fn parse_page(response: &HttpResponse, per_page: u32) -> Result<PageResult, FetchError> {
    let records: Vec<ImageRecord> = serde_json::from_str(&response.body)
        .map_err(|e| FetchError::Decode(e.to_string()))?;

    let total = header_number(response, "x-total-count")?
        .ok_or_else(|| FetchError::Decode("missing X-Total-Count header".to_string()))?;
    let total_pages = match header_number(response, "x-total-pages")? {
        Some(pages) => pages,
        None => page::total_pages(total, per_page),
    };

    Ok(PageResult {
        records,
        total,
        total_pages,
    })
}

fn header_number(response: &HttpResponse, name: &str) -> Result<Option<u64>, FetchError> {
    response
        .header(name)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| FetchError::Decode(format!("invalid {} header: {:?}", name, value)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str, headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_parse_page_with_headers() {
        let resp = response(200, "[]", &[("x-total-count", "25"), ("x-total-pages", "3")]);
        let page = parse_page(&resp, 12).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_parse_page_derives_total_pages() {
        let resp = response(200, "[]", &[("x-total-count", "25")]);
        let page = parse_page(&resp, 10).unwrap();
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_parse_page_rejects_bad_payload() {
        let resp = response(200, "{\"error\":1}", &[("x-total-count", "25")]);
        assert!(matches!(parse_page(&resp, 12), Err(FetchError::Decode(_))));

        let resp = response(200, "[]", &[]);
        assert!(matches!(parse_page(&resp, 12), Err(FetchError::Decode(_))));

        let resp = response(200, "[]", &[("x-total-count", "lots")]);
        assert!(matches!(parse_page(&resp, 12), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_status_code() {
        assert_eq!(FetchError::Status { status_code: 503 }.status_code(), Some(503));
        assert_eq!(FetchError::Transport("refused".into()).status_code(), None);
        assert_eq!(
            FetchError::Status { status_code: 500 }.to_string(),
            "HTTP error! status: 500"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = ImagesApi::new("http://localhost:3000/api/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000/api");
    }

    #[tokio::test]
    async fn test_transport_error() {
        // 取一个空闲端口后立即释放，连接会被拒绝
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let api = ImagesApi::new(format!("http://127.0.0.1:{}/api", port)).unwrap();
        let err = api.fetch_page(1, 12).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
