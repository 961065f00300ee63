// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/server/error.rs - HTTP 错误响应
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::time::Duration;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{input::InputError, model::SharedModelError, output::OutputError};

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("{0}")]
  MissingImage(&'static str),
  #[error("Invalid request: {0}")]
  InvalidRequest(String),
  #[error("{0}")]
  DecodeError(#[from] InputError),
  #[error("{0}")]
  ModelUnavailable(#[from] SharedModelError),
  #[error("Inference failed: {0}")]
  InferenceError(String),
  #[error("{0}")]
  EncodeError(#[from] OutputError),
  #[error("Inference timed out after {0:?}")]
  Timeout(Duration),
  #[error("Internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::MissingImage(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
      // 解码失败沿用既有客户端约定的 500
      ApiError::DecodeError(_)
      | ApiError::ModelUnavailable(_)
      | ApiError::InferenceError(_)
      | ApiError::EncodeError(_)
      | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!("请求处理失败: {}", self);
    } else {
      warn!("请求无效: {}", self);
    }

    let body = match &self {
      ApiError::MissingImage(message) => json!({ "error": message }),
      other => json!({ "success": false, "error": other.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
