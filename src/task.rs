// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/task.rs - 计数任务：推理、记账、标注
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

use std::time::{Duration, Instant};

use image::RgbImage;
use tracing::info;

use crate::{ledger::Ledger, model::Model, output::draw::Annotator};

/// 默认置信度阈值
pub const DEFAULT_CONFIDENCE: f32 = 0.25;

/// 一次计数的完整结果
#[derive(Debug, Clone)]
pub struct CountReport {
  pub ledger: Ledger,
  pub annotated: RgbImage,
  pub elapsed: Duration,
}

/// 所有前端共用的计数流程
#[derive(Clone, Default)]
pub struct CountTask {
  annotator: Annotator,
}

impl CountTask {
  pub fn new(annotator: Annotator) -> Self {
    CountTask { annotator }
  }

  pub fn annotator(&self) -> &Annotator {
    &self.annotator
  }

  pub fn run<M: Model>(
    &self,
    model: &M,
    image: &RgbImage,
    confidence: f32,
  ) -> Result<CountReport, M::Error> {
    info!(
      "开始推理: {}x{}, 置信度阈值 {:.2}",
      image.width(),
      image.height(),
      confidence
    );
    let now = Instant::now();
    let result = model.infer(image, confidence)?;
    let elapsed = now.elapsed();
    info!("推理完成，耗时: {:.2?}, 原始检测 {} 个", elapsed, result.items.len());

    let ledger = Ledger::from_raw(&result.items);
    let annotated = self
      .annotator
      .annotate(image, ledger.detections(), ledger.total_amount());
    info!(
      "计数完成: {} 张, 共 {} 里拉",
      ledger.total_bills(),
      ledger.total_amount()
    );

    Ok(CountReport {
      ledger,
      annotated,
      elapsed,
    })
  }
}
