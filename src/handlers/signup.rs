use axum::extract::{Form, State};
use axum::response::{IntoResponse, Response};
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::SignupService;
use crate::state::AppState;
use crate::views::View;

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub full_name: String,
    pub user_email: String,
    pub user_password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub account_id: i64,
    /// 外部のセッション層がアクティブセッションとして保存するトークン
    pub session_token: String,
    pub redirect_to: &'static str,
}

/// POST /add-new-user
///
/// メールアドレス重複はビジネス上の結果としてサインアップビューへ、
/// 成功時はセッショントークンとリダイレクト先を返す。
///
/// # Security
/// パスワードはログに出力しない
pub async fn create_account(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    validate_signup_form(&form)?;

    let service = SignupService::new(state.account_store.clone(), state.session_service.clone());

    match service
        .create_account(&form.user_email, &form.full_name, &form.user_password)
        .await
    {
        Ok(outcome) => Ok((
            StatusCode::CREATED,
            Json(SignupResponse {
                account_id: outcome.account_id,
                session_token: outcome.session_token,
                redirect_to: "/projects",
            }),
        )
            .into_response()),
        Err(AppError::EmailAlreadyRegistered) => Ok(View::new("signup")
            .with(
                "errors",
                "Email address already exists. Please login to your existing \
                 account or use a different email.",
            )
            .into_response()),
        Err(e) => Err(e),
    }
}

/// サインアップフォームのバリデーション
fn validate_signup_form(form: &SignupForm) -> Result<(), AppError> {
    if form.full_name.trim().is_empty() {
        return Err(AppError::Validation("Full name is required.".to_string()));
    }
    if form.user_email.trim().is_empty() || !form.user_email.contains('@') {
        return Err(AppError::Validation(
            "Please enter a valid email address.".to_string(),
        ));
    }
    if form.user_password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters.".to_string(),
        ));
    }
    Ok(())
}
