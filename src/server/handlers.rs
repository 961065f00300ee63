// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/server/handlers.rs - 路由处理
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

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::State,
  response::Html,
};
use tracing::debug;

use crate::{
  input::decode_base64_image,
  ledger::Ledger,
  report::results_text,
  server::{
    AnnotatedImageFormat, ApiError, AppState, ServedModel,
    schema::{DemoResponse, DetectRequest, DetectResponse, HealthResponse},
  },
};

const DEMO_PAGE: &str = include_str!("../../assets/demo.html");

pub async fn health<M: ServedModel>(State(state): State<Arc<AppState<M>>>) -> Json<HealthResponse> {
  Json(HealthResponse {
    status: "healthy",
    message: state.config.flavor.health_message(),
    model_loaded: state.model.is_loaded(),
  })
}

pub async fn detect<M: ServedModel>(
  State(state): State<Arc<AppState<M>>>,
  body: Bytes,
) -> Result<Json<DetectResponse>, ApiError> {
  let flavor = state.config.flavor;
  let request = DetectRequest::parse(&body)?;
  let Some(image) = request.image() else {
    return Err(ApiError::MissingImage(flavor.missing_image_message()));
  };
  let confidence = request.confidence()?;

  let (ledger, annotated_image) =
    count_image(&state, image.to_string(), confidence, flavor.image_format()).await?;
  Ok(Json(DetectResponse::new(&ledger, annotated_image)))
}

pub async fn demo_page() -> Html<&'static str> {
  Html(DEMO_PAGE)
}

/// 网页演示回调，失败也返回 200，由页面显示错误文本
pub async fn demo_predict<M: ServedModel>(
  State(state): State<Arc<AppState<M>>>,
  body: Bytes,
) -> Json<DemoResponse> {
  let outcome = async {
    let request = DetectRequest::parse(&body)?;
    let Some(image) = request.image() else {
      return Err(ApiError::MissingImage(state.config.flavor.missing_image_message()));
    };
    let confidence = request.confidence()?;
    count_image(
      &state,
      image.to_string(),
      confidence,
      AnnotatedImageFormat::PngDataUrl,
    )
    .await
  }
  .await;

  match outcome {
    Ok((ledger, annotated_image)) => Json(DemoResponse {
      annotated_image: Some(annotated_image),
      results: results_text(&ledger),
    }),
    Err(e) => {
      debug!("演示请求失败: {}", e);
      Json(DemoResponse {
        annotated_image: None,
        results: format!("Error processing image: {}", e),
      })
    }
  }
}

/// 解码、推理、记账、标注并编码，整体放在阻塞线程池中并受超时约束
async fn count_image<M: ServedModel>(
  state: &Arc<AppState<M>>,
  payload: String,
  confidence: f32,
  format: AnnotatedImageFormat,
) -> Result<(Ledger, String), ApiError> {
  let model = state.model.get().await?;
  let job_state = state.clone();

  let job = tokio::task::spawn_blocking(move || {
    let image = decode_base64_image(&payload)?;
    let report = job_state
      .task
      .run(model.as_ref(), &image, confidence)
      .map_err(|e| ApiError::InferenceError(e.to_string()))?;
    let encoded = format.encode(&report.annotated)?;
    Ok::<_, ApiError>((report.ledger, encoded))
  });

  let timeout = state.config.inference_timeout;
  match tokio::time::timeout(timeout, job).await {
    Err(_) => Err(ApiError::Timeout(timeout)),
    Ok(Err(join_error)) => Err(ApiError::Internal(join_error.to_string())),
    Ok(Ok(result)) => result,
  }
}
