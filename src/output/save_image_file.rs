// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/output/save_image_file.rs - 保存标注图像文件
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

use image::RgbImage;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{OutputError, Render},
  task::CountReport,
  url_path,
};

pub struct SaveImageFileOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    Ok(SaveImageFileOutput::new(url_path(url)))
  }
}

impl SaveImageFileOutput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    SaveImageFileOutput { path: path.into() }
  }

  /// 在目录下生成带时间戳的文件名，例如 `lira-detection-20260101-120000.png`
  pub fn timestamped(dir: impl AsRef<Path>) -> Self {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    Self::new(dir.as_ref().join(format!("lira-detection-{}.png", stamp)))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn save(&self, image: &RgbImage) -> Result<(), OutputError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;
    info!("保存图像到文件: {}", self.path.display());

    Ok(())
  }
}

impl Render<CountReport> for SaveImageFileOutput {
  type Error = OutputError;

  fn render_result(&self, result: &CountReport) -> Result<(), Self::Error> {
    self.save(&result.annotated)
  }
}
