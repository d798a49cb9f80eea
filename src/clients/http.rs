/// 后端 HTTP 访问
///
/// 统一处理基础地址、鉴权头和 `{"data": ...}` 包裹格式
use crate::error::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// 通用 API 客户端
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// 创建新的 API 客户端
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// 构建请求头（有令牌时附带 Bearer）
    ///
    /// Content-Type 由 `.json()` 在带请求体时设置
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !self.token.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    /// GET 并解析 JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = self.url(endpoint);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .headers(self.headers())
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let text = read_body(&url, response).await?;
        if text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        let data = extract_data(serde_json::from_str(&text)?);
        Ok(serde_json::from_value(data)?)
    }

    /// POST JSON，只关心是否成功
    ///
    /// 成功与否只看状态码；2xx 的响应体不是 JSON 时原样作为字符串返回
    pub async fn post_json<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> AppResult<Value> {
        let url = self.url(endpoint);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let text = read_body(&url, response).await?;
        Ok(lenient_body(text))
    }
}

/// 读取响应体；非 2xx 直接返回错误
async fn read_body(url: &str, response: reqwest::Response) -> AppResult<String> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::api_request_failed(url, e))?;

    if !status.is_success() {
        return Err(AppError::api_bad_response(
            url,
            status.as_u16(),
            error_message(&text),
        ));
    }

    Ok(text)
}

/// 成功响应体：空为 Null，能解析为 JSON 则解析，否则保留原文
fn lenient_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// 取出 `{"data": ...}` 中的数据；没有包裹时原样返回
pub fn extract_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// 从错误响应中提取 message 字段
fn error_message(text: &str) -> Option<String> {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| crate::utils::logging::truncate_text(trimmed, 200))
        })
}
