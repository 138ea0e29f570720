use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::http::header::HOST;
use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;
use crate::services::{PasswordResetService, TokenState};
use crate::state::AppState;
use crate::views::View;

/// リクエスト元のホスト名を決定
///
/// メール内リンクとの相互運用のため Host ヘッダーを優先し、
/// 欠落時のみ設定値にフォールバックする
fn origin_host(headers: &HeaderMap, config: &Config) -> String {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| config.public_host.clone())
        .unwrap_or_else(|| format!("{}:{}", config.host, config.port))
}

fn reset_service(
    state: &AppState,
) -> PasswordResetService<crate::repositories::PgAccountStore, crate::services::EmailService> {
    PasswordResetService::new(
        state.account_store.clone(),
        state.email_service.clone(),
        state.config.clone(),
    )
}

// === リセット申請 ===

#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    pub user_email: String,
}

/// POST /pass/reset
///
/// ワークフロー成功時は forgot ビューに確認メッセージを、
/// アカウント不在時は同ビューにエラーメッセージを描画する。
/// 不在はビジネス上の結果であり汎用エラーページにはしない
pub async fn request_password_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ForgotForm>,
) -> Result<View, AppError> {
    validate_email(&form.user_email)?;

    let host = origin_host(&headers, &state.config);

    match reset_service(&state)
        .initiate_reset(&form.user_email, &host)
        .await
    {
        Ok(confirmation) => Ok(View::new("forgot")
            .with(
                "info",
                format!(
                    "An e-mail has been sent to {} with further instructions.",
                    confirmation.email
                ),
            )
            .with("link", confirmation.login_link)),
        Err(AppError::AccountNotFound) => {
            Ok(View::new("forgot").with("errors", "Email address doesn't exist."))
        }
        Err(e) => Err(e),
    }
}

// === リセットページ（メール内リンクから） ===

/// GET /reset/{token}
///
/// 有効なトークンのときだけパスワード変更フォームを表示する
pub async fn reset_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<View, AppError> {
    let host = origin_host(&headers, &state.config);
    let forgot_link = format!("http://{}/forgot", host);

    let view = match reset_service(&state).validate_token(&token).await? {
        TokenState::Invalid => View::new("reset")
            .with("errors", "Password reset token is invalid.")
            .with("link", forgot_link),
        TokenState::Expired => View::new("reset")
            .with("errors", "Password reset token is expired.")
            .with("link", forgot_link),
        TokenState::Valid { account_id } => {
            View::new("reset").with("id", account_id).with("show_form", true)
        }
    };

    Ok(view)
}

// === パスワード更新 ===

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub id: i64,
    pub password: String,
    /// フォーム描画時に検証済みのトークン。ここでは鮮度の再検証はしない
    pub token: String,
}

/// POST /reset-password
///
/// # Security
/// password, token はログに出力しない
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ResetPasswordForm>,
) -> Result<View, AppError> {
    validate_reset_password_form(&form)?;

    let host = origin_host(&headers, &state.config);

    reset_service(&state)
        .complete_reset(form.id, &form.password)
        .await?;

    Ok(View::new("reset")
        .with("info", "Password reset successfully.")
        .with("link", format!("http://{}/login", host)))
}

/// メールアドレスのバリデーション
fn validate_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "Please enter a valid email address.".to_string(),
        ));
    }
    Ok(())
}

/// パスワード更新フォームのバリデーション
fn validate_reset_password_form(form: &ResetPasswordForm) -> Result<(), AppError> {
    if form.token.trim().is_empty() {
        return Err(AppError::Validation("Token is required.".to_string()));
    }
    if form.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters.".to_string(),
        ));
    }
    Ok(())
}
