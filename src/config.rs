use secrecy::SecretBox;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: SecretBox<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // 公開ホスト名（Hostヘッダー欠落時のリセットリンク構築用）
    #[serde(default)]
    pub public_host: Option<String>,

    // SMTP設定（オプション - email機能有効時のみ使用）
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<SecretBox<String>>,
    pub smtp_password: Option<SecretBox<String>>,
    #[serde(default = "default_mail_from_address")]
    pub mail_from_address: String,

    // パスワードリセット設定
    #[serde(default = "default_reset_token_ttl_secs")]
    pub reset_token_ttl_secs: i64,
    /// リセットメール送信のタイムアウト（秒）
    /// 送信が詰まってもリクエストは必ず応答を返す
    #[serde(default = "default_notification_timeout_secs")]
    pub notification_timeout_secs: u64,

    // セッション設定
    /// セッショントークン署名用シークレット
    pub session_secret: SecretBox<String>,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_FROM_ADDRESS: &str = "admin@ec3taskmanagement.com";
const DEFAULT_RESET_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_TTL_SECS: i64 = 86400;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_mail_from_address() -> String {
    DEFAULT_MAIL_FROM_ADDRESS.to_string()
}

fn default_reset_token_ttl_secs() -> i64 {
    DEFAULT_RESET_TOKEN_TTL_SECS
}

fn default_notification_timeout_secs() -> u64 {
    DEFAULT_NOTIFICATION_TIMEOUT_SECS
}

fn default_session_ttl_secs() -> i64 {
    DEFAULT_SESSION_TTL_SECS
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
