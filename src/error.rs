use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::views::View;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("アカウントが見つかりません")]
    AccountNotFound,

    #[error("このメールアドレスは既に使用されています")]
    EmailAlreadyRegistered,

    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("ストア読み込みエラー")]
    StoreRead(#[source] anyhow::Error),

    #[error("ストア書き込みエラー")]
    StoreWrite(#[source] anyhow::Error),

    #[error("通知送信エラー: {0}")]
    Notification(String),

    #[error("無効なトークンです")]
    TokenInvalid,

    #[error("期限切れのトークンです")]
    TokenExpired,

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 業務エラーは構造化JSON、ストア/内部エラーは汎用500ビュー
        // （旧実装の「DBエラーを生のままクライアントへ書き出す」挙動は廃止）
        let (status, message) = match &self {
            Self::AccountNotFound => (
                StatusCode::NOT_FOUND,
                "Email address doesn't exist.".to_string(),
            ),
            Self::EmailAlreadyRegistered => (
                StatusCode::CONFLICT,
                "Email address already exists.".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::TokenInvalid => (
                StatusCode::BAD_REQUEST,
                "Password reset token is invalid.".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::BAD_REQUEST,
                "Password reset token is expired.".to_string(),
            ),
            Self::Notification(reason) => {
                tracing::error!(reason = %reason, "通知送信に失敗");
                (
                    StatusCode::BAD_GATEWAY,
                    "We couldn't send the reset e-mail. Please try again later.".to_string(),
                )
            }
            Self::StoreRead(e) => {
                tracing::error!(error = ?e, "ストア読み込みエラー");
                return View::error_page().into_response();
            }
            Self::StoreWrite(e) => {
                tracing::error!(error = ?e, "ストア書き込みエラー");
                return View::error_page().into_response();
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                return View::error_page().into_response();
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
