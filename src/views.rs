use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// レンダリング対象のビュー
///
/// テンプレートエンジンは外部コラボレーター。
/// ここでは「どのビューをどのコンテキストで描画するか」だけを確定し、
/// 固定のビュー名 + コンテキストマップとしてシリアライズする。
#[derive(Debug, Serialize)]
pub struct View {
    pub view: &'static str,
    pub context: BTreeMap<&'static str, Value>,
    #[serde(skip)]
    status: StatusCode,
}

impl View {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            context: BTreeMap::new(),
            status: StatusCode::OK,
        }
    }

    pub fn with(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.context.insert(key, value.into());
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// 汎用404ページ
    pub fn not_found_page() -> Self {
        Self::new("404").status(StatusCode::NOT_FOUND)
    }

    /// 汎用500ページ（詳細は一切漏らさない）
    pub fn error_page() -> Self {
        Self::new("500").status(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_holds_typed_values() {
        let view = View::new("reset").with("id", 7).with("show_form", true);
        assert_eq!(view.view, "reset");
        assert_eq!(view.context.get("id"), Some(&Value::from(7)));
        assert_eq!(view.context.get("show_form"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_error_pages_set_status() {
        assert_eq!(View::not_found_page().status, StatusCode::NOT_FOUND);
        assert_eq!(View::error_page().status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
