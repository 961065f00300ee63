// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/ledger.rs - 面额账本：检测结果的计数与总额
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

use serde::{Serialize, Serializer, ser::SerializeMap};
use tracing::{debug, warn};

use crate::{
  denomination::{Denomination, LABEL_TABLE},
  model::{DetectItem, WithLabel},
};

/// 一张被识别出的纸币
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
  pub denomination: Denomination,
  pub confidence: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]
}

impl Detection {
  /// 标注文字，例如 `20 Lira (0.87)`
  pub fn label(&self) -> String {
    format!("{} Lira ({:.2})", self.denomination, self.confidence)
  }
}

/// 各面额的张数，六种面额始终存在
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
  counts: [u64; 6],
}

impl Tally {
  pub fn count(&self, denomination: Denomination) -> u64 {
    self.counts[denomination.ordinal()]
  }

  fn add(&mut self, denomination: Denomination) {
    self.counts[denomination.ordinal()] += 1;
  }

  /// 按面值升序遍历 `(面额, 张数)`
  pub fn iter(&self) -> impl Iterator<Item = (Denomination, u64)> + '_ {
    Denomination::ALL.iter().map(|&d| (d, self.count(d)))
  }

  pub fn total(&self) -> u64 {
    self.counts.iter().sum()
  }
}

// 以模型标签顺序输出，与客户端既有的 `counts` 字段一致
impl Serialize for Tally {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(LABEL_TABLE.len()))?;
    for id in 0..LABEL_TABLE.len() as u32 {
      if let Some(d) = Denomination::from_label_id(id) {
        map.serialize_entry(d.to_label_str(), &self.count(d))?;
      }
    }
    map.end()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
  #[serde(skip)]
  pub denomination: Denomination,
  pub count: u64,
  pub subtotal: u64,
}

/// 张数大于零的面额明细，按面值升序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown(Vec<BreakdownEntry>);

impl Breakdown {
  pub fn entries(&self) -> &[BreakdownEntry] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl Serialize for Breakdown {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for entry in &self.0 {
      map.serialize_entry(entry.denomination.label(), entry)?;
    }
    map.end()
  }
}

/// 一次推理的计数结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
  tally: Tally,
  detections: Vec<Detection>,
}

impl Ledger {
  /// 由模型原始输出构建账本
  ///
  /// 类别索引超出标签表的检测会被丢弃并记录警告，不会计数，也不会出现在检测列表中。
  pub fn from_raw(items: &[DetectItem]) -> Self {
    let mut ledger = Ledger::default();

    for item in items {
      let Some(denomination) = Denomination::from_label_id(item.class_id) else {
        warn!(
          "丢弃未知类别的检测: 类别 {} 超出标签表范围 ({}), 置信度 {:.2}",
          item.class_id,
          LABEL_TABLE.len(),
          item.score
        );
        continue;
      };

      ledger.tally.add(denomination);
      ledger.detections.push(Detection {
        denomination,
        confidence: item.score,
        bbox: item.bbox,
      });
    }

    debug!(
      "账本: {} 张, 共 {} 里拉",
      ledger.total_bills(),
      ledger.total_amount()
    );
    ledger
  }

  pub fn tally(&self) -> &Tally {
    &self.tally
  }

  pub fn detections(&self) -> &[Detection] {
    &self.detections
  }

  pub fn total_bills(&self) -> u64 {
    self.tally.total()
  }

  pub fn total_amount(&self) -> u64 {
    self
      .tally
      .iter()
      .map(|(d, count)| d.face_value() * count)
      .sum()
  }

  pub fn breakdown(&self) -> Breakdown {
    Breakdown(
      self
        .tally
        .iter()
        .filter(|&(_, count)| count > 0)
        .map(|(denomination, count)| BreakdownEntry {
          denomination,
          count,
          subtotal: denomination.face_value() * count,
        })
        .collect(),
    )
  }
}
