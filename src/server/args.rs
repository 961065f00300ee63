// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/server/args.rs - 服务公共参数
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

use std::{path::PathBuf, time::Duration};

use clap::Args;

use crate::{
  FromUrl, FromUrlWithScheme, location_url,
  model::{YoloError, YoloModelBuilder},
  output::{OutputError, draw::Annotator},
  server::ServerConfig,
};

/// API 与网页服务共用的参数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
  /// 监听地址
  #[arg(long, default_value = "0.0.0.0", value_name = "HOST")]
  pub host: String,

  /// 模型文件路径（也可以是 yolo:///path/to/best.rten）
  #[arg(long, env = "LIRA_MODEL", default_value = "best.rten", value_name = "MODEL")]
  pub model: String,

  /// 标注字体文件，未指定时使用内置 DejaVu Sans
  #[arg(long, env = "LIRA_FONT", value_name = "FONT")]
  pub font: Option<PathBuf>,

  /// 单次推理超时（秒）
  #[arg(long, default_value_t = 60, value_name = "SECONDS")]
  pub inference_timeout_secs: u64,

  /// 请求体大小上限（MiB）
  #[arg(long, default_value_t = 32, value_name = "MIB")]
  pub max_body_mib: usize,

  /// 输出调试日志
  #[arg(short, long)]
  pub verbose: bool,
}

impl ServeArgs {
  pub fn model_builder(&self) -> Result<YoloModelBuilder, YoloError> {
    let url = location_url(&self.model, YoloModelBuilder::SCHEME)
      .map_err(|e| YoloError::ModelPathError(format!("{}: {}", self.model, e)))?;
    YoloModelBuilder::from_url(&url)
  }

  pub fn annotator(&self) -> Result<Annotator, OutputError> {
    Annotator::load(self.font.as_deref())
  }

  pub fn apply(&self, config: ServerConfig) -> ServerConfig {
    ServerConfig {
      inference_timeout: Duration::from_secs(self.inference_timeout_secs),
      body_limit: self.max_body_mib * 1024 * 1024,
      ..config
    }
  }
}
