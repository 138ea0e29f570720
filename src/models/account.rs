use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// アカウント
///
/// リセットトークンはアカウント行に直接保持する（上書きセマンティクス）。
/// 新しいトークンの永続化は以前のトークンを暗黙に無効化する。
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<OffsetDateTime>,
}
