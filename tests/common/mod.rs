// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// tests/common/mod.rs - 集成测试公共工具
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

#![allow(dead_code)]

use std::{convert::Infallible, io::Cursor, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat, Rgb, RgbImage};

use lira_counter::model::{DetectItem, DetectResult, Model};

/// 返回固定检测结果的模型，按置信度阈值过滤
#[derive(Debug, Clone)]
pub struct FixedModel {
  pub items: Vec<DetectItem>,
  pub delay: Option<Duration>,
}

impl FixedModel {
  pub fn new(items: Vec<DetectItem>) -> Self {
    FixedModel { items, delay: None }
  }

  pub fn slow(items: Vec<DetectItem>, delay: Duration) -> Self {
    FixedModel {
      items,
      delay: Some(delay),
    }
  }
}

impl Model for FixedModel {
  type Error = Infallible;

  fn infer(&self, _image: &RgbImage, confidence: f32) -> Result<DetectResult, Self::Error> {
    if let Some(delay) = self.delay {
      std::thread::sleep(delay);
    }
    Ok(
      self
        .items
        .iter()
        .filter(|item| item.score > confidence)
        .cloned()
        .collect::<Vec<_>>()
        .into(),
    )
  }
}

pub fn item(class_id: u32, score: f32, bbox: [f32; 4]) -> DetectItem {
  DetectItem {
    class_id,
    score,
    bbox,
  }
}

/// 一张 10 里拉（0.9）、一张 5 里拉（0.3）、一个未知类别
pub fn sample_items() -> Vec<DetectItem> {
  vec![
    item(0, 0.9, [10.0, 30.0, 60.0, 70.0]),
    item(4, 0.3, [70.0, 30.0, 110.0, 70.0]),
    item(9, 0.95, [0.0, 0.0, 5.0, 5.0]),
  ]
}

pub fn sample_image() -> RgbImage {
  RgbImage::from_fn(128, 96, |x, y| Rgb([(x * 2) as u8, (y * 2) as u8, 80]))
}

pub fn png_base64(image: &RgbImage) -> String {
  let mut bytes = Cursor::new(Vec::new());
  image
    .write_to(&mut bytes, ImageFormat::Png)
    .expect("encode test image");
  STANDARD.encode(bytes.into_inner())
}
