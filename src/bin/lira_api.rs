// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/bin/lira_api.rs - 检测 API 服务
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

/// 土耳其里拉计数 API（/detect, /health）
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(flatten)]
  pub serve: ServeArgs,

  /// 监听端口
  #[arg(long, env = "LIRA_PORT", default_value_t = 8080, value_name = "PORT")]
  pub port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  logger::init_logger(args.serve.verbose);

  let builder = args.serve.model_builder()?;
  if !builder.model_path().is_file() {
    warn!(
      "模型文件不存在: {}，服务仍将启动，/health 会报告模型未加载",
      builder.model_path().display()
    );
  }

  let state = AppState::new(
    SharedModel::yolo(builder),
    CountTask::new(args.serve.annotator()?),
    args.serve.apply(ServerConfig::api()),
  );

  let listener = TcpListener::bind((args.serve.host.as_str(), args.port)).await?;
  info!("API 服务地址: http://{}", listener.local_addr()?);
  server::serve(listener, server::router(state)).await?;

  info!("服务已退出");
  Ok(())
}
