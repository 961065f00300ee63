// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/lib.rs - 库主文件
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

use url::Url;

pub mod denomination;
pub mod input;
pub mod ledger;
pub mod logger;
pub mod model;
pub mod output;
pub mod report;
pub mod task;

#[cfg(feature = "server")]
pub mod server;

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 将命令行给出的位置转换为 URL
///
/// 已经是 `scheme://...` 形式的直接解析；普通文件路径会先转为绝对路径，
/// 再拼上给定的方案。
pub fn location_url(location: &str, scheme: &str) -> Result<Url, url::ParseError> {
  if location.contains("://") {
    return Url::parse(location);
  }

  let path = std::path::absolute(location).unwrap_or_else(|_| PathBuf::from(location));
  let path = path.to_string_lossy().replace('\\', "/");
  if path.starts_with('/') {
    Url::parse(&format!("{}://{}", scheme, path))
  } else {
    Url::parse(&format!("{}:///{}", scheme, path))
  }
}

/// 取出 URL 中的文件路径（解码百分号转义）
pub(crate) fn url_path(url: &Url) -> PathBuf {
  let raw = url.path();
  match urlencoding::decode(raw) {
    Ok(decoded) => PathBuf::from(decoded.into_owned()),
    Err(_) => PathBuf::from(raw),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_path_becomes_scheme_url() {
    let url = location_url("/tmp/some dir/bills.jpg", "image").unwrap();
    assert_eq!(url.scheme(), "image");
    assert_eq!(url_path(&url), PathBuf::from("/tmp/some dir/bills.jpg"));
  }

  #[test]
  fn explicit_url_is_kept() {
    let url = location_url("yolo:///models/best.rten", "image").unwrap();
    assert_eq!(url.scheme(), "yolo");
    assert_eq!(url_path(&url), PathBuf::from("/models/best.rten"));
  }

  #[test]
  fn relative_path_is_made_absolute() {
    let url = location_url("bills.png", "image").unwrap();
    assert!(url_path(&url).is_absolute());
    assert!(url.path().ends_with("/bills.png"));
  }
}
