// 该文件是 Lira Counter （里拉计数器） 项目的一部分。
// src/report.rs - 文本结果
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

use std::fmt::Write;

use crate::ledger::{BreakdownEntry, Ledger};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
  "=".repeat(RULE_WIDTH)
}

fn breakdown_line(entry: &BreakdownEntry) -> String {
  format!(
    "  {} Lira: {} bill(s) = {} Lira",
    entry.denomination, entry.count, entry.subtotal
  )
}

/// 命令行输出的结果表
pub fn cli_table(ledger: &Ledger) -> String {
  let mut out = String::new();
  let _ = writeln!(out);
  let _ = writeln!(out, "{}", rule());
  let _ = writeln!(out, "DETECTION RESULTS");
  let _ = writeln!(out, "{}", rule());
  let _ = writeln!(out);
  let _ = writeln!(out, "Total bills detected: {}", ledger.total_bills());
  let _ = writeln!(out);
  let _ = writeln!(out, "Breakdown by denomination:");
  for entry in ledger.breakdown().entries() {
    let _ = writeln!(out, "{}", breakdown_line(entry));
  }
  let _ = writeln!(out);
  let _ = writeln!(out, "{}", rule());
  let _ = writeln!(out, "TOTAL AMOUNT: {} Lira", ledger.total_amount());
  let _ = writeln!(out, "{}", rule());
  out
}

/// 网页演示的多行结果文本
pub fn results_text(ledger: &Ledger) -> String {
  let breakdown = ledger.breakdown();
  let lines = if breakdown.is_empty() {
    "  No bills detected".to_string()
  } else {
    breakdown
      .entries()
      .iter()
      .map(breakdown_line)
      .collect::<Vec<_>>()
      .join("\n")
  };

  format!(
    "\nLIRA COUNTER - RESULTS\n\n{rule}\nTOTAL AMOUNT: {total} Lira\nTotal Bills Detected: {bills}\n{rule}\n\nBreakdown by Denomination:\n{lines}\n\n{rule}\n",
    rule = rule(),
    total = ledger.total_amount(),
    bills = ledger.total_bills(),
    lines = lines,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::DetectItem;

  fn ledger() -> Ledger {
    let item = |class_id| DetectItem {
      class_id,
      score: 0.8,
      bbox: [0.0, 0.0, 1.0, 1.0],
    };
    Ledger::from_raw(&[item(1), item(4), item(1), item(2)])
  }

  #[test]
  fn cli_table_lists_ascending_breakdown() {
    let table = cli_table(&ledger());
    assert!(table.contains("Total bills detected: 4"));
    assert!(table.contains("TOTAL AMOUNT: 225 Lira"));

    let five = table.find("  5 Lira: 1 bill(s) = 5 Lira").unwrap();
    let twenty = table.find("  20 Lira: 1 bill(s) = 20 Lira").unwrap();
    let hundred = table.find("  100 Lira: 2 bill(s) = 200 Lira").unwrap();
    assert!(five < twenty && twenty < hundred);
    assert!(!table.contains("200 Lira: "));
  }

  #[test]
  fn results_text_for_empty_ledger() {
    let text = results_text(&Ledger::default());
    assert!(text.contains("TOTAL AMOUNT: 0 Lira"));
    assert!(text.contains("Total Bills Detected: 0"));
    assert!(text.contains("  No bills detected"));
  }

  #[test]
  fn results_text_lists_each_denomination() {
    let text = results_text(&ledger());
    assert!(text.contains("TOTAL AMOUNT: 225 Lira"));
    assert!(text.contains("  100 Lira: 2 bill(s) = 200 Lira"));
    assert!(!text.contains("No bills detected"));
  }
}
