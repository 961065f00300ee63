// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/server.rs - HTTP 前端
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

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use image::RgbImage;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{
  model::{Model, SharedModel},
  output::{
    OutputError,
    encode::{ImageEncoding, encode_base64, encode_data_url},
  },
  task::CountTask,
};

mod args;
mod error;
mod handlers;
pub mod schema;

pub use self::args::ServeArgs;
pub use self::error::ApiError;

const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// 可在 HTTP 服务中共享的模型
pub trait ServedModel:
  Model<Error: std::error::Error + Send + Sync + 'static> + Send + Sync + 'static
{
}

impl<T> ServedModel for T
where
  T: Model + Send + Sync + 'static,
  T::Error: std::error::Error + Send + Sync + 'static,
{
}

/// 标注图像在响应中的编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotatedImageFormat {
  /// 不带前缀的 JPEG Base64
  RawJpeg,
  /// `data:image/png;base64,...`
  PngDataUrl,
}

impl AnnotatedImageFormat {
  pub fn encode(self, image: &RgbImage) -> Result<String, OutputError> {
    match self {
      AnnotatedImageFormat::RawJpeg => encode_base64(image, ImageEncoding::Jpeg),
      AnnotatedImageFormat::PngDataUrl => encode_data_url(image, ImageEncoding::Png),
    }
  }
}

/// 服务形态：独立 API 或网页+API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFlavor {
  Api,
  Web,
}

impl ResponseFlavor {
  pub fn image_format(self) -> AnnotatedImageFormat {
    match self {
      ResponseFlavor::Api => AnnotatedImageFormat::RawJpeg,
      ResponseFlavor::Web => AnnotatedImageFormat::PngDataUrl,
    }
  }

  pub fn missing_image_message(self) -> &'static str {
    match self {
      ResponseFlavor::Api => "No image provided",
      ResponseFlavor::Web => "No image data provided",
    }
  }

  pub fn health_message(self) -> Option<&'static str> {
    match self {
      ResponseFlavor::Api => None,
      ResponseFlavor::Web => Some("Lira Counter API is running"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub flavor: ResponseFlavor,
  pub inference_timeout: Duration,
  pub body_limit: usize,
  /// 静态网站目录，仅网页形态使用
  pub web_dir: Option<PathBuf>,
}

impl ServerConfig {
  pub fn api() -> Self {
    ServerConfig {
      flavor: ResponseFlavor::Api,
      inference_timeout: DEFAULT_INFERENCE_TIMEOUT,
      body_limit: DEFAULT_BODY_LIMIT,
      web_dir: None,
    }
  }

  pub fn web(web_dir: impl Into<PathBuf>) -> Self {
    ServerConfig {
      flavor: ResponseFlavor::Web,
      web_dir: Some(web_dir.into()),
      ..ServerConfig::api()
    }
  }
}

pub struct AppState<M> {
  pub model: SharedModel<M>,
  pub task: CountTask,
  pub config: ServerConfig,
}

impl<M: ServedModel> AppState<M> {
  pub fn new(model: SharedModel<M>, task: CountTask, config: ServerConfig) -> Arc<Self> {
    Arc::new(AppState {
      model,
      task,
      config,
    })
  }
}

pub fn router<M: ServedModel>(state: Arc<AppState<M>>) -> Router {
  let mut routes = Router::new()
    .route("/health", get(handlers::health::<M>))
    .route("/detect", post(handlers::detect::<M>));

  if state.config.flavor == ResponseFlavor::Web {
    routes = routes
      .route("/demo", get(handlers::demo_page))
      .route("/demo/predict", post(handlers::demo_predict::<M>));
  }

  let body_limit = state.config.body_limit;
  let web_dir = state.config.web_dir.clone();
  let mut router = routes.with_state(state);
  if let Some(dir) = web_dir {
    router = router.fallback_service(ServeDir::new(dir));
  }

  router
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}

pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
  axum::serve(listener, router)
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
  let _ = tokio::signal::ctrl_c().await;
  info!("收到中断信号，准备退出...");
}
