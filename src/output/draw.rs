// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/output/draw.rs - 检测结果标注
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


use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use tracing::{debug, info};

use crate::{ledger::Detection, output::OutputError};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 20.0;
const CAPTION_FONT_SIZE: f32 = 32.0;
const LABEL_PADDING: i32 = 5;
const STROKE_WIDTH: u32 = 2;
const CAPTION_POSITION: (i32, i32) = (10, 10);

const BOX_COLOR: [u8; 3] = [0, 255, 0]; // 绿色
const LABEL_TEXT_COLOR: [u8; 3] = [0, 0, 0]; // 黑色
const CAPTION_COLOR: [u8; 3] = [255, 0, 0]; // 红色

/// 内置字体，保证不同主机上的标注结果一致
const BUILTIN_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// 标注外观，只影响像素效果，不影响布局规则
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatorStyle {
  pub box_color: Rgb<u8>,
  pub label_text_color: Rgb<u8>,
  pub caption_color: Rgb<u8>,
  pub stroke_width: u32,
  pub label_font_size: f32,
  pub caption_font_size: f32,
  pub caption_position: (i32, i32),
  pub label_padding: i32,
}

impl Default for AnnotatorStyle {
  fn default() -> Self {
    Self {
      box_color: Rgb(BOX_COLOR),
      label_text_color: Rgb(LABEL_TEXT_COLOR),
      caption_color: Rgb(CAPTION_COLOR),
      stroke_width: STROKE_WIDTH,
      label_font_size: LABEL_FONT_SIZE,
      caption_font_size: CAPTION_FONT_SIZE,
      caption_position: CAPTION_POSITION,
      label_padding: LABEL_PADDING,
    }
  }
}

/// 在图像副本上绘制检测框、标签与总额
#[derive(Clone)]
pub struct Annotator {
  style: AnnotatorStyle,
  font: FontArc,
}

impl Default for Annotator {
  fn default() -> Self {
    Self::with_builtin_font()
  }
}

impl Annotator {
  pub fn new(style: AnnotatorStyle, font: FontArc) -> Self {
    Self { style, font }
  }

  pub fn with_builtin_font() -> Self {
    let font = FontArc::try_from_slice(BUILTIN_FONT).expect("无法加载内置字体");
    Self::new(AnnotatorStyle::default(), font)
  }

  pub fn with_font_file(path: impl AsRef<Path>) -> Result<Self, OutputError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let font = FontArc::try_from_vec(data).map_err(|e| OutputError::FontError {
      path: path.display().to_string(),
      reason: e.to_string(),
    })?;
    info!("加载标注字体: {}", path.display());
    Ok(Self::new(AnnotatorStyle::default(), font))
  }

  /// 指定字体文件时必须可用，否则使用内置字体
  pub fn load(font_path: Option<&Path>) -> Result<Self, OutputError> {
    match font_path {
      Some(path) => Self::with_font_file(path),
      None => Ok(Self::with_builtin_font()),
    }
  }

  pub fn style(&self) -> &AnnotatorStyle {
    &self.style
  }

  /// 文本渲染后的像素尺寸 `(宽, 高)`
  pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
    text_size(PxScale::from(size), &self.font, text)
  }

  /// 返回标注后的新图像，原图不变
  pub fn annotate(
    &self,
    image: &RgbImage,
    detections: &[Detection],
    total_amount: u64,
  ) -> RgbImage {
    let mut canvas = image.clone();
    debug!("绘制 {} 个检测框", detections.len());
    for detection in detections {
      self.draw_detection(&mut canvas, detection);
    }
    self.draw_caption(&mut canvas, total_amount);
    canvas
  }

  fn draw_detection(&self, canvas: &mut RgbImage, detection: &Detection) {
    let style = &self.style;
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    let [x1, y1, x2, y2] = detection.bbox.map(|v| v as i64);

    // 边框坐标限制在画布外扩一个线宽的范围内，超出部分本就不可见
    let margin = style.stroke_width as i64;
    let clamp_x = |v: i64| v.clamp(-margin, width - 1 + margin);
    let clamp_y = |v: i64| v.clamp(-margin, height - 1 + margin);
    let (bx1, by1, bx2, by2) = (clamp_x(x1), clamp_y(y1), clamp_x(x2), clamp_y(y2));

    // 绘制边框，向内加粗
    for t in 0..margin {
      let w = bx2 - bx1 + 1 - 2 * t;
      let h = by2 - by1 + 1 - 2 * t;
      if w <= 0 || h <= 0 {
        break;
      }
      let rect = Rect::at((bx1 + t) as i32, (by1 + t) as i32).of_size(w as u32, h as u32);
      draw_hollow_rect_mut(canvas, rect, style.box_color);
    }

    // 标签贴在边框左上角上方，允许部分超出图像
    let label = detection.label();
    let (text_w, text_h) = self.measure(&label, style.label_font_size);
    let pad = style.label_padding as i64;
    let background_w = text_w.max(1) as i64;
    let background_h = (text_h as i64 + 2 * pad).max(1);
    let (lx, ly) = (x1, y1.saturating_sub(background_h));
    if lx >= width || ly >= height || lx.saturating_add(background_w) <= 0 || ly + background_h <= 0 {
      return;
    }

    let background = Rect::at(lx as i32, ly as i32).of_size(background_w as u32, background_h as u32);
    draw_filled_rect_mut(canvas, background, style.box_color);
    draw_text_mut(
      canvas,
      style.label_text_color,
      lx as i32,
      (ly + pad) as i32,
      PxScale::from(style.label_font_size),
      &self.font,
      &label,
    );
  }

  fn draw_caption(&self, canvas: &mut RgbImage, total_amount: u64) {
    let (x, y) = self.style.caption_position;
    draw_text_mut(
      canvas,
      self.style.caption_color,
      x,
      y,
      PxScale::from(self.style.caption_font_size),
      &self.font,
      &format!("Total: {} Lira", total_amount),
    );
  }
}
