// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/denomination.rs - 里拉面额与模型类别表
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

use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::WithLabel;

/// 模型类别索引到标签的映射
///
/// 顺序来自训练时标签集按字符串排序的结果，与面值大小无关。
/// 该表必须与模型权重保持一致，任何重排都会让所有结果错位。
pub const LABEL_TABLE: [&str; 6] = ["10", "100", "20", "200", "5", "50"];

const CLASS_TABLE: [Denomination; 6] = [
  Denomination::Ten,
  Denomination::OneHundred,
  Denomination::Twenty,
  Denomination::TwoHundred,
  Denomination::Five,
  Denomination::Fifty,
];

/// 土耳其里拉纸币面额
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Denomination {
  Five,
  Ten,
  Twenty,
  Fifty,
  OneHundred,
  TwoHundred,
}

impl Denomination {
  /// 按面值升序排列的全部面额
  pub const ALL: [Denomination; 6] = [
    Denomination::Five,
    Denomination::Ten,
    Denomination::Twenty,
    Denomination::Fifty,
    Denomination::OneHundred,
    Denomination::TwoHundred,
  ];

  pub fn from_class_index(class_id: u32) -> Option<Self> {
    CLASS_TABLE.get(class_id as usize).copied()
  }

  pub fn class_index(self) -> u32 {
    match self {
      Denomination::Ten => 0,
      Denomination::OneHundred => 1,
      Denomination::Twenty => 2,
      Denomination::TwoHundred => 3,
      Denomination::Five => 4,
      Denomination::Fifty => 5,
    }
  }

  pub fn label(self) -> &'static str {
    LABEL_TABLE[self.class_index() as usize]
  }

  /// 面值（里拉），由标签文本解析得到
  pub fn face_value(self) -> u64 {
    match self {
      Denomination::Five => 5,
      Denomination::Ten => 10,
      Denomination::Twenty => 20,
      Denomination::Fifty => 50,
      Denomination::OneHundred => 100,
      Denomination::TwoHundred => 200,
    }
  }

  /// 在 `ALL` 中的位置，用作计数数组下标
  pub(crate) fn ordinal(self) -> usize {
    self as usize
  }
}

impl WithLabel for Denomination {
  fn to_label_str(&self) -> &'static str {
    self.label()
  }

  fn from_label_id(id: u32) -> Option<Self> {
    Self::from_class_index(id)
  }
}

impl fmt::Display for Denomination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl Serialize for Denomination {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.label())
  }
}
