// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/bin/lira_web.rs - 静态网站、API 与网页演示一体服务
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

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use lira_counter::{
  logger,
  model::SharedModel,
  server::{self, AppState, ServeArgs, ServerConfig},
  task::CountTask,
};

/// 土耳其里拉计数网页服务（前端静态文件 + API + 演示页面）
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(flatten)]
  pub serve: ServeArgs,

  /// 监听端口
  #[arg(long, env = "PORT", default_value_t = 7860, value_name = "PORT")]
  pub port: u16,

  /// 前端静态文件目录
  #[arg(long, default_value = "web", value_name = "DIR")]
  pub web_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  logger::init_logger(args.serve.verbose);

  if !args.web_dir.is_dir() {
    warn!("前端目录不存在: {}", args.web_dir.display());
  }

  let state = AppState::new(
    SharedModel::yolo(args.serve.model_builder()?),
    CountTask::new(args.serve.annotator()?),
    args.serve.apply(ServerConfig::web(&args.web_dir)),
  );

  // 启动时预加载，失败不退出
  if let Err(e) = state.model.get().await {
    warn!("启动时模型加载失败，将在首次请求时重试: {}", e);
  }

  let listener = TcpListener::bind((args.serve.host.as_str(), args.port)).await?;
  let addr = listener.local_addr()?;
  info!("前端: http://{}/", addr);
  info!("API: http://{}/detect", addr);
  info!("演示: http://{}/demo", addr);
  server::serve(listener, server::router(state)).await?;

  info!("服务已退出");
  Ok(())
}
