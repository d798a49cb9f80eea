/// 订单提交客户端
use crate::clients::{ApiClient, CheckoutService};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::CheckoutPayload;
use async_trait::async_trait;
use tracing::debug;

pub struct CheckoutClient {
    api: ApiClient,
}

impl CheckoutClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api: ApiClient::new(&config.checkout_api_base_url, &config.api_token),
        }
    }
}

#[async_trait]
impl CheckoutService for CheckoutClient {
    async fn submit(&self, payload: &CheckoutPayload) -> AppResult<()> {
        debug!("提交申请 Payload: {}", serde_json::to_string(payload)?);
        let result = self.api.post_json("requests", payload).await?;
        debug!("提交结果: {}", result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, AppError};
    use crate::models::{FulfillmentSlot, Money, PaymentMethod};
    use chrono::Local;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn payload() -> CheckoutPayload {
        CheckoutPayload {
            entries: vec![],
            total_amount: Money::from_major(100),
            payment_method: PaymentMethod::Clerk,
            slot: FulfillmentSlot::new("2024-01-23", "09:00"),
            requester_id: "42".to_string(),
            requester_name: "Juan Dela Cruz".to_string(),
            reference_id: serde_json::from_str("\"REQ-12345678\"").unwrap(),
            created_at: Local::now(),
        }
    }

    /// 起一个只应答一次的本地 HTTP 服务，返回基础地址
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            // 读完请求头和请求体再应答
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> CheckoutClient {
        CheckoutClient::new(&Config {
            checkout_api_base_url: base_url,
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_submit_accepts_plain_text_created() {
        let base = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Type: text/plain\r\nContent-Length: 7\r\nConnection: close\r\n\r\nCreated",
        )
        .await;

        let result = client(base).submit(&payload()).await;
        assert!(result.is_ok(), "2xx 应视为成功: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_submit_accepts_empty_no_content() {
        let base = serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n").await;
        assert!(client(base).submit(&payload()).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_rejects_server_error() {
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 26\r\nConnection: close\r\n\r\n{\"message\":\"db is down!!\"}",
        )
        .await;

        let err = client(base).submit(&payload()).await.unwrap_err();
        match err {
            AppError::Api(ApiError::BadResponse {
                status, message, ..
            }) => {
                assert_eq!(status, 500);
                assert_eq!(message.as_deref(), Some("db is down!!"));
            }
            other => panic!("意外错误: {:?}", other),
        }
    }
}
