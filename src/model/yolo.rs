// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/model/yolo.rs - 基于 rten 的 YOLO 检测模型
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

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, imageops::FilterType};
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DetectItem, DetectResult, Model},
  url_path,
};

const YOLO_INPUT_SIZE: u32 = 640;
const YOLO_LETTERBOX_FILL: u8 = 114;
const YOLO_IOU_THRESH: f32 = 0.7;
const YOLO_MAX_DETECTIONS: usize = 300;
// 4 个回归值 + 至少 1 个类别
const YOLO_MIN_ROWS: usize = 5;

#[derive(Error, Debug)]
pub enum YoloError {
  #[error("Model file not found: {}", .0.display())]
  ModelNotFound(PathBuf),
  #[error("Failed to load model: {0}")]
  ModelLoadError(String),
  #[error("Inference failed: {0}")]
  RunError(String),
  #[error("Unexpected model output: {0}")]
  OutputShapeError(String),
  #[error("Invalid model location: {0}")]
  ModelPathError(String),
}

#[derive(Debug, Clone)]
pub struct YoloModelBuilder {
  model_path: PathBuf,
  input_size: u32,
  iou_threshold: f32,
  max_detections: usize,
}

impl FromUrlWithScheme for YoloModelBuilder {
  const SCHEME: &'static str = "yolo";
}

impl FromUrl for YoloModelBuilder {
  type Error = YoloError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(YoloError::ModelPathError(format!(
        "expected scheme '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    Ok(YoloModelBuilder::new(url_path(url)))
  }
}

impl YoloModelBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    YoloModelBuilder {
      model_path: model_path.into(),
      input_size: YOLO_INPUT_SIZE,
      iou_threshold: YOLO_IOU_THRESH,
      max_detections: YOLO_MAX_DETECTIONS,
    }
  }

  pub fn input_size(mut self, input_size: u32) -> Self {
    self.input_size = input_size;
    self
  }

  pub fn iou_threshold(mut self, iou_threshold: f32) -> Self {
    self.iou_threshold = iou_threshold;
    self
  }

  pub fn max_detections(mut self, max_detections: usize) -> Self {
    self.max_detections = max_detections;
    self
  }

  pub fn model_path(&self) -> &Path {
    &self.model_path
  }

  pub fn build(self) -> Result<YoloModel, YoloError> {
    if !self.model_path.is_file() {
      return Err(YoloError::ModelNotFound(self.model_path));
    }

    info!("加载模型文件: {}", self.model_path.display());
    let now = std::time::Instant::now();
    let model = rten::Model::load_file(&self.model_path)
      .map_err(|e| YoloError::ModelLoadError(e.to_string()))?;
    info!("模型加载完成，耗时: {:.2?}", now.elapsed());
    debug!(
      "模型输入尺寸: {}, IoU 阈值: {}, 最大检测数: {}",
      self.input_size, self.iou_threshold, self.max_detections
    );

    Ok(YoloModel {
      model,
      input_size: self.input_size,
      iou_threshold: self.iou_threshold,
      max_detections: self.max_detections,
    })
  }
}

/// Ultralytics 导出的 YOLO 检测模型
///
/// 输出张量为 `[1, 4 + nc, N]`，前四行是输入尺度下的 `cx, cy, w, h`，
/// 其余每行是一个类别的得分。
pub struct YoloModel {
  model: rten::Model,
  input_size: u32,
  iou_threshold: f32,
  max_detections: usize,
}

impl Model for YoloModel {
  type Error = YoloError;

  fn infer(&self, image: &RgbImage, confidence: f32) -> Result<DetectResult, Self::Error> {
    let size = self.input_size as usize;
    let (boxed, letterbox) = letterbox(image, self.input_size);

    debug!("设置模型输入");
    let input = NdTensor::from_data([1, 3, size, size], to_nchw(&boxed));

    debug!("执行模型推理");
    let output = self
      .model
      .run_one(input.view().into(), None)
      .map_err(|e| YoloError::RunError(e.to_string()))?;
    let output: NdTensor<f32, 3> = output
      .try_into()
      .map_err(|e| YoloError::OutputShapeError(format!("{:?}", e)))?;

    let [_, dim1, dim2] = output.shape();
    // 部分导出会把预测维度放在最后
    let (rows, anchors, transposed) = if dim1 <= dim2 {
      (dim1, dim2, false)
    } else {
      (dim2, dim1, true)
    };
    if rows < YOLO_MIN_ROWS {
      return Err(YoloError::OutputShapeError(format!(
        "expected at least {} prediction rows, got shape {:?}",
        YOLO_MIN_ROWS,
        output.shape()
      )));
    }
    debug!("模型输出形状: {:?}, 类别数: {}", output.shape(), rows - 4);

    let data = output.to_vec();
    let candidates = decode_predictions(&data, rows, anchors, transposed, confidence);
    debug!("阈值过滤后候选框: {}", candidates.len());

    let items = non_max_suppression(candidates, self.iou_threshold, self.max_detections)
      .into_iter()
      .map(|item| DetectItem {
        bbox: letterbox.restore(item.bbox, image.width(), image.height()),
        ..item
      })
      .collect::<Vec<_>>();
    debug!("检测到 {} 个物体", items.len());

    Ok(DetectResult::from(items))
  }
}

/// 等比缩放并居中填充后的几何参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Letterbox {
  scale: f32,
  pad_x: f32,
  pad_y: f32,
}

impl Letterbox {
  /// 将输入尺度的框映射回原图，并裁剪到图像范围内
  fn restore(&self, bbox: [f32; 4], width: u32, height: u32) -> [f32; 4] {
    let (w, h) = (width as f32, height as f32);
    [
      ((bbox[0] - self.pad_x) / self.scale).clamp(0.0, w),
      ((bbox[1] - self.pad_y) / self.scale).clamp(0.0, h),
      ((bbox[2] - self.pad_x) / self.scale).clamp(0.0, w),
      ((bbox[3] - self.pad_y) / self.scale).clamp(0.0, h),
    ]
  }
}

pub(crate) fn letterbox(image: &RgbImage, size: u32) -> (RgbImage, Letterbox) {
  let (width, height) = image.dimensions();
  let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
  let new_w = ((width as f32 * scale).round() as u32).clamp(1, size);
  let new_h = ((height as f32 * scale).round() as u32).clamp(1, size);
  let pad_x = (size - new_w) / 2;
  let pad_y = (size - new_h) / 2;

  let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);
  let mut canvas = RgbImage::from_pixel(size, size, Rgb([YOLO_LETTERBOX_FILL; 3]));
  image::imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

  (
    canvas,
    Letterbox {
      scale,
      pad_x: pad_x as f32,
      pad_y: pad_y as f32,
    },
  )
}

/// HWC 字节图像转为归一化的 NCHW 浮点数据
fn to_nchw(image: &RgbImage) -> Vec<f32> {
  let (width, height) = image.dimensions();
  let plane = (width * height) as usize;
  let mut data = vec![0f32; plane * 3];

  for (x, y, pixel) in image.enumerate_pixels() {
    let idx = (y * width + x) as usize;
    data[idx] = pixel[0] as f32 / 255.0;
    data[plane + idx] = pixel[1] as f32 / 255.0;
    data[2 * plane + idx] = pixel[2] as f32 / 255.0;
  }
  data
}

/// 解析原始预测，保留最高类别得分超过阈值的锚点
pub(crate) fn decode_predictions(
  data: &[f32],
  rows: usize,
  anchors: usize,
  transposed: bool,
  confidence: f32,
) -> Vec<DetectItem> {
  let at = |row: usize, anchor: usize| {
    if transposed {
      data[anchor * rows + row]
    } else {
      data[row * anchors + anchor]
    }
  };

  let mut items = Vec::new();
  for anchor in 0..anchors {
    let (score, class_id) = (4..rows)
      .map(|row| (at(row, anchor), (row - 4) as u32))
      .fold((f32::MIN, 0u32), |best, cur| if cur.0 > best.0 { cur } else { best });

    if score <= confidence {
      continue;
    }

    let cx = at(0, anchor);
    let cy = at(1, anchor);
    let w = at(2, anchor);
    let h = at(3, anchor);
    items.push(DetectItem {
      class_id,
      score,
      bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
    });
  }
  items
}

fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
  let ix = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
  let iy = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
  let inter = ix * iy;
  let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
  let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
  let union = area_a + area_b - inter;
  if union <= 0.0 { 0.0 } else { inter / union }
}

/// 按类别的非极大值抑制，输出按得分降序
pub(crate) fn non_max_suppression(
  mut items: Vec<DetectItem>,
  iou_threshold: f32,
  max_detections: usize,
) -> Vec<DetectItem> {
  items.sort_by(|a, b| b.score.total_cmp(&a.score));

  let mut kept: Vec<DetectItem> = Vec::new();
  for item in items {
    if kept.len() >= max_detections {
      break;
    }
    let suppressed = kept
      .iter()
      .any(|k| k.class_id == item.class_id && iou(&k.bbox, &item.bbox) > iou_threshold);
    if !suppressed {
      kept.push(item);
    }
  }
  kept
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(class_id: u32, score: f32, bbox: [f32; 4]) -> DetectItem {
    DetectItem {
      class_id,
      score,
      bbox,
    }
  }

  #[test]
  fn letterbox_pads_short_side() {
    let image = RgbImage::from_pixel(200, 100, Rgb([10, 20, 30]));
    let (boxed, lb) = letterbox(&image, 640);
    assert_eq!(boxed.dimensions(), (640, 640));
    assert_eq!(lb.scale, 3.2);
    assert_eq!(lb.pad_x, 0.0);
    assert_eq!(lb.pad_y, 160.0);
    assert_eq!(boxed.get_pixel(320, 10), &Rgb([114, 114, 114]));
    assert_eq!(boxed.get_pixel(320, 320), &Rgb([10, 20, 30]));
  }

  #[test]
  fn letterbox_restore_maps_back_and_clips() {
    let image = RgbImage::new(200, 100);
    let (_, lb) = letterbox(&image, 640);
    let restored = lb.restore([32.0, 192.0, 672.0, 320.0], 200, 100);
    assert_eq!(restored, [10.0, 10.0, 200.0, 50.0]);
  }

  #[test]
  fn decode_keeps_best_class_above_threshold() {
    // 2 个锚点，2 个类别，行主序 [cx, cy, w, h, c0, c1]
    let data = [
      50.0, 10.0, // cx
      50.0, 10.0, // cy
      20.0, 4.0, // w
      10.0, 4.0, // h
      0.1, 0.2, // c0
      0.9, 0.1, // c1
    ];
    let items = decode_predictions(&data, 6, 2, false, 0.25);
    assert_eq!(items, vec![item(1, 0.9, [40.0, 45.0, 60.0, 55.0])]);
  }

  #[test]
  fn decode_handles_transposed_layout() {
    // 同一数据按 [锚点, 行] 排列
    let data = [50.0, 50.0, 20.0, 10.0, 0.1, 0.9, 10.0, 10.0, 4.0, 4.0, 0.2, 0.1];
    let items = decode_predictions(&data, 6, 2, true, 0.25);
    assert_eq!(items, vec![item(1, 0.9, [40.0, 45.0, 60.0, 55.0])]);
  }

  #[test]
  fn nms_suppresses_overlap_within_class_only() {
    let items = vec![
      item(0, 0.6, [0.0, 0.0, 10.0, 10.0]),
      item(0, 0.9, [1.0, 1.0, 11.0, 11.0]),
      item(1, 0.8, [0.0, 0.0, 10.0, 10.0]),
      item(0, 0.5, [50.0, 50.0, 60.0, 60.0]),
    ];
    let kept = non_max_suppression(items, 0.5, 300);
    let scores: Vec<f32> = kept.iter().map(|i| i.score).collect();
    assert_eq!(scores, vec![0.9, 0.8, 0.5]);
  }

  #[test]
  fn nms_respects_max_detections() {
    let items = (0..10)
      .map(|i| item(0, i as f32 / 10.0, [i as f32 * 20.0, 0.0, i as f32 * 20.0 + 10.0, 10.0]))
      .collect();
    assert_eq!(non_max_suppression(items, 0.7, 3).len(), 3);
  }

  #[test]
  fn builder_from_url_requires_scheme() {
    let url = Url::parse("file:///models/best.rten").unwrap();
    assert!(matches!(
      YoloModelBuilder::from_url(&url),
      Err(YoloError::ModelPathError(_))
    ));

    let url = Url::parse("yolo:///models/best.rten").unwrap();
    let builder = YoloModelBuilder::from_url(&url).unwrap();
    assert_eq!(builder.model_path(), Path::new("/models/best.rten"));
  }

  #[test]
  fn missing_model_file_is_reported() {
    let err = YoloModelBuilder::new("/definitely/not/here.rten")
      .build()
      .err()
      .unwrap();
    assert!(matches!(err, YoloError::ModelNotFound(_)));
  }
}
