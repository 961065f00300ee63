// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/model.rs - 模型
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

use image::RgbImage;

/// 目标检测模型
///
/// 实现者接收原始 RGB 图像与置信度阈值，返回原图像素坐标下的检测框。
pub trait Model {
  type Error;

  fn infer(&self, image: &RgbImage, confidence: f32) -> Result<DetectResult, Self::Error>;
}

/// 模型输出的单个原始检测
#[derive(Debug, Clone, PartialEq)]
pub struct DetectItem {
  pub class_id: u32,
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[DetectItem]>,
}

impl From<Vec<DetectItem>> for DetectResult {
  fn from(items: Vec<DetectItem>) -> Self {
    DetectResult {
      items: items.into_boxed_slice(),
    }
  }
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> &'static str;
  fn from_label_id(id: u32) -> Option<Self>;
}

mod yolo;
pub use self::yolo::{YoloError, YoloModel, YoloModelBuilder};

#[cfg(feature = "server")]
mod shared;
#[cfg(feature = "server")]
pub use self::shared::{SharedModel, SharedModelError};
