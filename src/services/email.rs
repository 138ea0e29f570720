use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::NotificationSender;

#[cfg(feature = "email")]
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    transport::smtp::authentication::Credentials,
};
#[cfg(feature = "email")]
use secrecy::ExposeSecret;

/// メール送信サービス
///
/// email機能有効時はSMTP経由で送信、無効時はログ出力のみの開発スタブ
#[derive(Clone)]
pub struct EmailService {
    config: Arc<Config>,
    #[cfg(feature = "email")]
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailService {
    #[cfg(not(feature = "email"))]
    pub fn new(config: Arc<Config>) -> Result<Self, AppError> {
        Ok(Self { config })
    }

    #[cfg(feature = "email")]
    pub fn new(config: Arc<Config>) -> Result<Self, AppError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("smtp_host not configured")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("smtp relay setup: {}", e)))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(
                username.expose_secret().clone(),
                password.expose_secret().clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            config,
        })
    }
}

impl NotificationSender for EmailService {
    #[cfg(not(feature = "email"))]
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), AppError> {
        // 開発モード: 送信せずログ出力のみ（本文はトークンを含むため出さない）
        tracing::info!(
            to = %to,
            subject = %subject,
            from = %self.config.mail_from_address,
            "メール送信（開発モード、実送信なし）"
        );
        Ok(())
    }

    #[cfg(feature = "email")]
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let message = Message::builder()
            .from(
                self.config
                    .mail_from_address
                    .parse()
                    .map_err(|e| AppError::Notification(format!("invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Notification(format!("invalid to address: {}", e)))?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| AppError::Notification(format!("message build: {}", e)))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| AppError::Notification(format!("smtp send: {}", e)))?;

        tracing::info!(to = %to, "メール送信完了");
        Ok(())
    }
}
