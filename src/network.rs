use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Request, StatusCode, Uri};
use hyper_tls::HttpsConnector;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{ScheduleError, WeeklySchedule};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUri(String),

    #[error("Network error: {0}")]
    Network(#[from] hyper::Error),

    #[error("HTTP error: {0}")]
    Status(StatusCode),

    #[error("Malformed body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
}

/// 获取一周菜单；失败时返回错误值，不做重试
#[async_trait]
pub trait MenuFetcher: Send + Sync {
    async fn fetch(&self) -> Result<WeeklySchedule, FetchError>;
}

/// 通过一次 GET 请求从固定地址获取菜单
pub struct HttpMenuFetcher {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    endpoint: Uri,
}

impl HttpMenuFetcher {
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let endpoint: Uri = endpoint
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| FetchError::InvalidUri(e.to_string()))?;
        let client = Client::builder().build::<_, Body>(HttpsConnector::new());
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl MenuFetcher for HttpMenuFetcher {
    async fn fetch(&self) -> Result<WeeklySchedule, FetchError> {
        let req = Request::builder()
            .method("GET")
            .uri(self.endpoint.clone())
            .body(Body::empty())
            .map_err(|e| FetchError::InvalidUri(e.to_string()))?;

        debug!("Requesting weekly menu from {}", self.endpoint);
        let resp = self.client.request(req).await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Menu endpoint returned {}", status);
            return Err(FetchError::Status(status));
        }

        let body = hyper::body::to_bytes(resp.into_body()).await?;
        let schedule = parse_schedule(&body)?;
        info!("Fetched weekly menu with {} days", schedule.len());
        Ok(schedule)
    }
}

/// 解析响应体，并拒绝没有任何可用日期的菜单
pub fn parse_schedule(body: &[u8]) -> Result<WeeklySchedule, FetchError> {
    let schedule: WeeklySchedule = serde_json::from_slice(body)?;
    schedule.validate()?;
    Ok(schedule)
}
