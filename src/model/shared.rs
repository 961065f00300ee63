// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/model/shared.rs - 进程级共享模型（首次使用时加载）
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

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::model::{YoloError, YoloModel, YoloModelBuilder};

#[derive(Error, Debug, Clone)]
pub enum SharedModelError {
  #[error("Model file not found: {}", .0.display())]
  Unavailable(PathBuf),
  #[error("Failed to load model: {0}")]
  LoadError(String),
}

impl From<YoloError> for SharedModelError {
  fn from(err: YoloError) -> Self {
    match err {
      YoloError::ModelNotFound(path) => SharedModelError::Unavailable(path),
      other => SharedModelError::LoadError(other.to_string()),
    }
  }
}

type Loader<M> = dyn Fn() -> Result<M, SharedModelError> + Send + Sync;

/// 全进程共享、惰性加载的模型
///
/// 首次 `get` 时在阻塞线程池中加载，并发的首次请求等待同一次加载。
/// 加载失败不会写入，之后的请求会重试；加载成功后不再重新加载。
pub struct SharedModel<M> {
  cell: OnceCell<Arc<M>>,
  loader: Arc<Loader<M>>,
}

impl<M: Send + Sync + 'static> SharedModel<M> {
  pub fn new(loader: impl Fn() -> Result<M, SharedModelError> + Send + Sync + 'static) -> Self {
    SharedModel {
      cell: OnceCell::new(),
      loader: Arc::new(loader),
    }
  }

  /// 使用已加载的模型，主要用于测试与嵌入
  pub fn preloaded(model: M) -> Self {
    SharedModel {
      cell: OnceCell::new_with(Some(Arc::new(model))),
      loader: Arc::new(|| Err(SharedModelError::LoadError("model is preloaded".to_string()))),
    }
  }

  pub fn is_loaded(&self) -> bool {
    self.cell.initialized()
  }

  pub async fn get(&self) -> Result<Arc<M>, SharedModelError> {
    let model = self
      .cell
      .get_or_try_init(|| async {
        let loader = self.loader.clone();
        let model = tokio::task::spawn_blocking(move || loader())
          .await
          .map_err(|e| SharedModelError::LoadError(e.to_string()))??;
        info!("模型已加载并缓存");
        Ok::<_, SharedModelError>(Arc::new(model))
      })
      .await;

    match model {
      Ok(model) => Ok(model.clone()),
      Err(e) => {
        warn!("模型加载失败: {}", e);
        Err(e)
      }
    }
  }
}

impl SharedModel<YoloModel> {
  pub fn yolo(builder: YoloModelBuilder) -> Self {
    SharedModel::new(move || builder.clone().build().map_err(SharedModelError::from))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_first_use_loads_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let shared = Arc::new(SharedModel::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      std::thread::sleep(std::time::Duration::from_millis(20));
      Ok(42u32)
    }));
    assert!(!shared.is_loaded());

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let shared = shared.clone();
        tokio::spawn(async move { *shared.get().await.unwrap() })
      })
      .collect();
    for handle in handles {
      assert_eq!(handle.await.unwrap(), 42);
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(shared.is_loaded());
  }

  #[tokio::test]
  async fn failed_load_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let shared = SharedModel::new(move || {
      if counter.fetch_add(1, Ordering::SeqCst) == 0 {
        Err(SharedModelError::LoadError("boom".to_string()))
      } else {
        Ok("model")
      }
    });

    assert!(shared.get().await.is_err());
    assert!(!shared.is_loaded());
    assert_eq!(*shared.get().await.unwrap(), "model");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn missing_weights_report_unavailable() {
    let shared = SharedModel::yolo(YoloModelBuilder::new("/no/such/best.rten"));
    let err = shared.get().await.err().unwrap();
    assert!(matches!(err, SharedModelError::Unavailable(_)));
    assert!(!shared.is_loaded());
  }

  #[tokio::test]
  async fn preloaded_model_is_ready() {
    let shared = SharedModel::preloaded(7u8);
    assert!(shared.is_loaded());
    assert_eq!(*shared.get().await.unwrap(), 7);
  }
}
