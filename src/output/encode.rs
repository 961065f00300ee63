// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/output/encode.rs - 标注图像编码
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

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbImage};

use crate::output::OutputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
  Jpeg,
  Png,
}

impl ImageEncoding {
  fn format(self) -> ImageFormat {
    match self {
      ImageEncoding::Jpeg => ImageFormat::Jpeg,
      ImageEncoding::Png => ImageFormat::Png,
    }
  }

  pub fn mime_type(self) -> &'static str {
    match self {
      ImageEncoding::Jpeg => "image/jpeg",
      ImageEncoding::Png => "image/png",
    }
  }
}

pub fn encode_image(image: &RgbImage, encoding: ImageEncoding) -> Result<Vec<u8>, OutputError> {
  let mut buffer = Cursor::new(Vec::new());
  image.write_to(&mut buffer, encoding.format())?;
  Ok(buffer.into_inner())
}

pub fn encode_base64(image: &RgbImage, encoding: ImageEncoding) -> Result<String, OutputError> {
  Ok(STANDARD.encode(encode_image(image, encoding)?))
}

/// 编码为 `data:<mime>;base64,...`，浏览器可直接显示
pub fn encode_data_url(image: &RgbImage, encoding: ImageEncoding) -> Result<String, OutputError> {
  Ok(format!(
    "data:{};base64,{}",
    encoding.mime_type(),
    encode_base64(image, encoding)?
  ))
}
