use std::future::Future;

use sqlx::PgPool;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::models::Account;

/// アカウントストア
///
/// コーディネーターが依存する薄い抽象。実装は Postgres（本番）と
/// インメモリ（テスト）の2つ。戻り値は `impl Future + Send` に脱糖して
/// axum ハンドラーの Future が Send であることを保証する。
pub trait AccountStore: Send + Sync {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Account>, AppError>> + Send;

    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Account>, AppError>> + Send;

    /// トークンと有効期限をアカウント行へ書き込む（既存トークンは上書き）
    fn update_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// 資格情報を更新し、同時に有効期限を強制的に失効値へ設定する
    fn update_credential(
        &self,
        id: i64,
        password_hash: &str,
        invalidated_expiry: OffsetDateTime,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn insert_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountStore for PgAccountStore {
    /// メールアドレスでアカウントを検索
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, reset_token, reset_token_expires_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::StoreRead(e.into()))
    }

    /// リセットトークンでアカウントを検索
    ///
    /// # Note
    /// ここはインデックスによる等値検索のみ。取得値と供給値の
    /// 定数時間比較は呼び出し側（サービス層）で行う
    async fn find_by_token(&self, token: &str) -> Result<Option<Account>, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, reset_token, reset_token_expires_at
            FROM accounts
            WHERE reset_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::StoreRead(e.into()))
    }

    async fn update_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET reset_token = $2, reset_token_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::StoreWrite(e.into()))?;

        Ok(())
    }

    /// # Note
    /// password_hash はログに出力しないこと
    async fn update_credential(
        &self,
        id: i64,
        password_hash: &str,
        invalidated_expiry: OffsetDateTime,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, reset_token_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(invalidated_expiry)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::StoreWrite(e.into()))?;

        Ok(())
    }

    /// 新しいアカウントを作成して id を返す
    ///
    /// # Errors
    /// UNIQUE制約違反（constraint = "accounts_email_key"）は
    /// `AppError::EmailAlreadyRegistered` に変換する
    async fn insert_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO accounts (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.constraint() == Some("accounts_email_key")
            {
                return AppError::EmailAlreadyRegistered;
            }
            AppError::StoreWrite(e.into())
        })?;

        Ok(id)
    }
}
