// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/input/base64_image.rs - Base64 图像负载解码
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

use base64::{Engine, engine::general_purpose::STANDARD};
use image::RgbImage;
use tracing::debug;

use crate::input::InputError;

/// 去掉 `data:image/...;base64,` 之类的前缀
pub fn strip_data_url(payload: &str) -> &str {
  match payload.split_once(',') {
    Some((_, data)) => data,
    None => payload,
  }
}

/// 解码 Base64 图像（可带 data URL 前缀），统一转为 RGB
///
/// 灰度与带透明通道的图像都会被转换为三通道 RGB。
pub fn decode_base64_image(payload: &str) -> Result<RgbImage, InputError> {
  let data = strip_data_url(payload.trim());
  let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
  let bytes = STANDARD.decode(cleaned.as_bytes())?;
  debug!("Base64 负载解码为 {} 字节", bytes.len());

  let image = image::load_from_memory(&bytes)?;
  debug!(
    "图像解码完成: {}x{} {:?}",
    image.width(),
    image.height(),
    image.color()
  );
  Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};

  use super::*;

  fn png_base64(image: DynamicImage) -> String {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    STANDARD.encode(buffer.into_inner())
  }

  #[test]
  fn strips_prefix_up_to_first_comma() {
    assert_eq!(strip_data_url("data:image/png;base64,AAAA"), "AAAA");
    assert_eq!(strip_data_url("AAAA"), "AAAA");
  }

  #[test]
  fn decodes_with_and_without_prefix() {
    let mut source = RgbImage::new(3, 2);
    source.put_pixel(1, 1, Rgb([200, 100, 50]));
    let encoded = png_base64(DynamicImage::ImageRgb8(source.clone()));

    let plain = decode_base64_image(&encoded).unwrap();
    let prefixed = decode_base64_image(&format!("data:image/png;base64,{}", encoded)).unwrap();
    assert_eq!(plain, source);
    assert_eq!(prefixed, source);
  }

  #[test]
  fn converts_grayscale_and_alpha_to_rgb() {
    let gray = GrayImage::from_pixel(2, 2, Luma([77]));
    let decoded = decode_base64_image(&png_base64(DynamicImage::ImageLuma8(gray))).unwrap();
    assert_eq!(decoded.get_pixel(0, 0), &Rgb([77, 77, 77]));

    let rgba = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 128]));
    let decoded = decode_base64_image(&png_base64(DynamicImage::ImageRgba8(rgba))).unwrap();
    assert_eq!(decoded.get_pixel(1, 1), &Rgb([1, 2, 3]));
  }

  #[test]
  fn rejects_bad_base64() {
    assert!(matches!(
      decode_base64_image("data:image/png;base64,@@not base64@@"),
      Err(InputError::Base64Error(_))
    ));
  }

  #[test]
  fn rejects_non_image_bytes() {
    let payload = STANDARD.encode(b"definitely not an image");
    assert!(matches!(
      decode_base64_image(&payload),
      Err(InputError::ImageLoadError(_))
    ));
  }
}
