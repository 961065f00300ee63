// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, input::InputError, url_path};

/// 从磁盘读取的一张图像
pub struct ImageFileInput {
  path: PathBuf,
  image: RgbImage,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    ImageFileInput::open(url_path(url))
  }
}

impl ImageFileInput {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
    let path = path.as_ref();
    info!("读取图像: {}", path.display());
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;

    Ok(ImageFileInput {
      path: path.to_path_buf(),
      image: image.to_rgb8(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }
}

#[cfg(test)]
mod tests {
  use image::Rgb;

  use super::*;

  #[test]
  fn reads_image_through_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bills.png");
    RgbImage::from_pixel(4, 3, Rgb([9, 8, 7])).save(&path).unwrap();

    let url = crate::location_url(path.to_str().unwrap(), ImageFileInput::SCHEME).unwrap();
    let input = ImageFileInput::from_url(&url).unwrap();
    assert_eq!(input.image().dimensions(), (4, 3));
    assert_eq!(input.path(), path.as_path());
    assert_eq!(input.into_image().get_pixel(0, 0), &Rgb([9, 8, 7]));
  }

  #[test]
  fn wrong_scheme_is_rejected() {
    let url = Url::parse("video:///tmp/a.mp4").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(InputError::SchemeMismatch { .. })
    ));
  }

  #[test]
  fn missing_file_is_io_error() {
    assert!(matches!(
      ImageFileInput::open("/no/such/bills.jpg"),
      Err(InputError::IoError(_))
    ));
  }
}
