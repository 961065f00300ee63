// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/bin/lira_detect.rs - 单张图像计数命令行
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

use anyhow::{Result, bail};
use clap::Parser;
use tracing::info;

use lira_counter::{
  FromUrl, FromUrlWithScheme,
  input::ImageFileInput,
  location_url, logger,
  model::YoloModelBuilder,
  output::{Render, SaveImageFileOutput, draw::Annotator},
  report,
  task::{CountTask, DEFAULT_CONFIDENCE},
};

/// 识别图像中的土耳其里拉纸币并计算总额
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型文件路径（也可以是 yolo:///path/to/best.rten）
  #[arg(long, default_value = "best.rten", value_name = "MODEL")]
  pub model: String,

  /// 输入图像路径（也可以是 image:///path/to/bills.jpg）
  #[arg(long, value_name = "IMAGE")]
  pub image: String,

  /// 标注图像输出路径，未指定时在当前目录生成带时间戳的文件
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<String>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_CONFIDENCE, value_name = "THRESHOLD")]
  pub conf: f32,

  /// 标注字体文件
  #[arg(long, value_name = "FONT")]
  pub font: Option<PathBuf>,

  /// 输出调试日志
  #[arg(short, long)]
  pub verbose: bool,
}

fn main() -> Result<()> {
  let args = Args::parse();
  logger::init_logger(args.verbose);

  if !(0.0..=1.0).contains(&args.conf) {
    bail!("Confidence threshold must be between 0 and 1, got {}", args.conf);
  }

  let model_url = location_url(&args.model, YoloModelBuilder::SCHEME)?;
  let image_url = location_url(&args.image, ImageFileInput::SCHEME)?;
  info!("模型文件路径: {}", model_url);
  info!("输入来源: {}", image_url);

  let builder = YoloModelBuilder::from_url(&model_url)?;
  if !builder.model_path().is_file() {
    bail!("Model file not found: {}", builder.model_path().display());
  }
  let input = ImageFileInput::from_url(&image_url)?;

  let model = builder.build()?;
  let task = CountTask::new(Annotator::load(args.font.as_deref())?);
  let report = task.run(&model, input.image(), args.conf)?;

  print!("{}", report::cli_table(&report.ledger));

  let output = match &args.output {
    Some(location) => SaveImageFileOutput::from_url(&location_url(location, SaveImageFileOutput::SCHEME)?)?,
    None => SaveImageFileOutput::timestamped(std::env::current_dir()?),
  };
  output.render_result(&report)?;
  println!("Output image saved to: {}", output.path().display());

  Ok(())
}
