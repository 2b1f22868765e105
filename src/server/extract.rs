//! # 请求体提取
//!
//! axum 默认的 JSON 拒绝是纯文本响应且状态码不统一（语法错误 400、
//! 类型错误 422、缺 content-type 415），这里统一映射为
//! `MalformedInput`，保持网关层失败一律 400 + `{"error": message}`。

use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// 拒绝时走统一错误契约的 JSON 提取器
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(GatewayError::malformed(rejection.body_text())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
