use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP 响应
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// header 名统一为小写
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// HTTP 客户端
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(30, None)
    }

    pub fn with_config(timeout_secs: u64, user_agent: Option<String>) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10);

        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// GET 请求
    pub async fn get(&self, url: &str, headers: HashMap<String, String>) -> anyhow::Result<HttpResponse> {
        let mut request_builder = self.client.get(url);

        for (key, value) in &headers {
            request_builder = request_builder.header(key.as_str(), value.as_str());
        }

        let response = request_builder.send().await?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: Response) -> anyhow::Result<HttpResponse> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers().iter() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_ascii_lowercase(), v.to_string());
            }
        }

        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
