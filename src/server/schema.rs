// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/server/schema.rs - 请求与响应结构
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

use serde::{Deserialize, Serialize};

use crate::{
  ledger::{Breakdown, Detection, Ledger, Tally},
  server::ApiError,
  task::DEFAULT_CONFIDENCE,
};

/// `POST /detect` 与 `POST /demo/predict` 的请求体
///
/// 置信度可写作 `conf` 或 `confidence`，两者都给出时以 `conf` 为准。
#[derive(Debug, Default, Deserialize)]
pub struct DetectRequest {
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub conf: Option<f32>,
  #[serde(default)]
  pub confidence: Option<f32>,
}

impl DetectRequest {
  /// 解析请求体；空请求体或 `null` 视为未提供图像
  pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
      return Ok(DetectRequest::default());
    }
    let request: Option<DetectRequest> =
      serde_json::from_slice(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    Ok(request.unwrap_or_default())
  }

  /// 请求中的图像数据
  ///
  /// 空字符串或只有空白也按未提供图像处理（400），不会进入解码阶段。
  pub fn image(&self) -> Option<&str> {
    self.image.as_deref().filter(|image| !image.trim().is_empty())
  }

  pub fn confidence(&self) -> Result<f32, ApiError> {
    let confidence = self.conf.or(self.confidence).unwrap_or(DEFAULT_CONFIDENCE);
    if !(0.0..=1.0).contains(&confidence) {
      return Err(ApiError::InvalidRequest(format!(
        "confidence must be between 0 and 1, got {}",
        confidence
      )));
    }
    Ok(confidence)
  }
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
  pub success: bool,
  pub total_amount: u64,
  pub total_bills: u64,
  pub counts: Tally,
  pub breakdown: Breakdown,
  pub detections: Vec<Detection>,
  pub annotated_image: String,
}

impl DetectResponse {
  pub fn new(ledger: &Ledger, annotated_image: String) -> Self {
    DetectResponse {
      success: true,
      total_amount: ledger.total_amount(),
      total_bills: ledger.total_bills(),
      counts: *ledger.tally(),
      breakdown: ledger.breakdown(),
      detections: ledger.detections().to_vec(),
      annotated_image,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
  pub status: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<&'static str>,
  pub model_loaded: bool,
}

/// 网页演示回调的返回，失败时图像为空、文本为错误信息
#[derive(Debug, Serialize)]
pub struct DemoResponse {
  pub annotated_image: Option<String>,
  pub results: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn conf_wins_over_confidence() {
    let request = DetectRequest::parse(br#"{"image":"x","conf":0.4,"confidence":0.6}"#).unwrap();
    assert_eq!(request.confidence().unwrap(), 0.4);

    let request = DetectRequest::parse(br#"{"image":"x","confidence":0.6}"#).unwrap();
    assert_eq!(request.confidence().unwrap(), 0.6);

    let request = DetectRequest::parse(br#"{"image":"x"}"#).unwrap();
    assert_eq!(request.confidence().unwrap(), DEFAULT_CONFIDENCE);
  }

  #[test]
  fn out_of_range_confidence_is_rejected() {
    let request = DetectRequest::parse(br#"{"image":"x","conf":1.5}"#).unwrap();
    assert!(matches!(request.confidence(), Err(ApiError::InvalidRequest(_))));
  }

  #[test]
  fn empty_and_null_bodies_have_no_image() {
    assert!(DetectRequest::parse(b"").unwrap().image().is_none());
    assert!(DetectRequest::parse(b"null").unwrap().image().is_none());
    assert!(DetectRequest::parse(b"{}").unwrap().image().is_none());
    assert!(DetectRequest::parse(br#"{"image":"  "}"#).unwrap().image().is_none());
  }

  #[test]
  fn malformed_body_is_invalid() {
    assert!(matches!(
      DetectRequest::parse(b"{not json"),
      Err(ApiError::InvalidRequest(_))
    ));
  }
}
