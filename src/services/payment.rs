use crate::{config::Config, error::{AppError, Result}};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

/// 支付网关包装
///
/// 网关只暴露一个能力：给定金额生成一条支付跳转链接。
/// 协议细节（Flouci 风格的 generate_payment 接口）之外的部分
/// 一概不感知。
#[derive(Clone)]
pub struct PaymentService {
    config: Config,
    http_client: Client,
}

impl PaymentService {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            http_client,
        })
    }

    /// 生成支付链接
    ///
    /// `tracking_id` 用于在成功/失败回调中对账。
    pub async fn create_payment(
        &self,
        amount: f64,
        tracking_id: &str,
        success_link: &str,
        fail_link: &str,
    ) -> Result<String> {
        let url = format!("{}/generate_payment", self.config.payment_gateway_url);
        debug!("Requesting payment link for amount {} ({})", amount, tracking_id);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "app_token": self.config.payment_app_token,
                "app_secret": self.config.payment_app_secret,
                "amount": amount,
                "accept_card": true,
                "session_timeout_secs": self.config.payment_session_timeout_secs,
                "success_link": success_link,
                "fail_link": fail_link,
                "developer_tracking_id": tracking_id,
            }))
            .send()
            .await
            .map_err(|e| {
                error!("Payment gateway unreachable: {}", e);
                AppError::ExternalService("Payment gateway unreachable".to_string())
            })?;

        if !response.status().is_success() {
            error!("Payment gateway rejected request: {}", response.status());
            return Err(AppError::ExternalService(
                "Failed to create payment".to_string(),
            ));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            error!("Invalid payment gateway response: {}", e);
            AppError::ExternalService("Invalid payment gateway response".to_string())
        })?;

        body.get("result")
            .and_then(|r| r.get("link"))
            .and_then(|l| l.as_str())
            .map(|l| l.to_string())
            .ok_or_else(|| {
                error!("Payment gateway response missing payment link");
                AppError::ExternalService("Payment gateway returned no payment link".to_string())
            })
    }
}
