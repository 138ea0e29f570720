use axum::extract::Query;
use serde::Deserialize;

use crate::views::View;

/// GET / — サインアップページ
pub async fn signup_page() -> View {
    View::new("signup")
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub from_url: Option<String>,
}

/// GET /login — ログインページ
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> View {
    View::new("login")
        .with("email", "")
        .with("password", "")
        .with("from_url", query.from_url.unwrap_or_default())
}

/// GET /forgot — パスワードリセット申請ページ
pub async fn forgot_page() -> View {
    View::new("forgot").with("email", "")
}

/// 未定義ルートは汎用404ページ
pub async fn fallback() -> View {
    View::not_found_page()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_page_carries_from_url() {
        let view = login_page(Query(LoginPageQuery {
            from_url: Some("/projects".to_string()),
        }))
        .await;
        assert_eq!(view.view, "login");
        assert_eq!(
            view.context.get("from_url").and_then(|v| v.as_str()),
            Some("/projects")
        );
    }

    #[tokio::test]
    async fn test_fallback_renders_404() {
        let view = fallback().await;
        assert_eq!(view.view, "404");
    }
}
