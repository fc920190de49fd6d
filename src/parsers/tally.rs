//! # 输运程序计数文件解析器
//!
//! 解析两列格式的 per-source DPA/DDD 计数输出。
//!
//! ## 格式说明
//! ```text
//! # cell  value_per_source
//! 101     3.2100E-25
//! 102     1.2340E-24
//! ```
//! - 空行以及以 `#`、`!` 或 `file` 开头的行视为注释
//! - 首个字段不是整数的行视为表头文本，直接跳过
//! - 首个字段为整数但不是目标 cell 的行直接跳过，不检查其数值
//! - 目标 cell 的数据行第二个字段必须是有限数值
//! - 同一 cell 出现多次时以最后一行为准
//!
//! ## 依赖关系
//! - 被 `commands/defect.rs` 使用
//! - 使用 `models/damage.rs`

use crate::error::{LabkitError, Result};
use crate::models::TallyRecord;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// 解析计数文件，按请求的 cell 顺序返回记录
pub fn parse_tally_file(path: &Path, cells: &[i64]) -> Result<Vec<TallyRecord>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LabkitError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LabkitError::FileReadError {
            path: path.display().to_string(),
            source: e,
        },
    })?;

    parse_tally_content(&content, cells, &path.display().to_string())
}

/// 从字符串内容解析计数数据
pub fn parse_tally_content(
    content: &str,
    cells: &[i64],
    source: &str,
) -> Result<Vec<TallyRecord>> {
    let parse_error = |reason: String| LabkitError::ParseError {
        format: "tally".to_string(),
        path: source.to_string(),
        reason,
    };

    let mut values: HashMap<i64, f64> = HashMap::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }

        let mut parts = line.split_whitespace();
        let cell_id = match parts.next().and_then(|t| t.parse::<i64>().ok()) {
            Some(id) => id,
            None => continue,
        };
        if !cells.contains(&cell_id) {
            continue;
        }

        let value = parts
            .next()
            .ok_or_else(|| {
                parse_error(format!(
                    "line {}: cell {} has no value column",
                    line_no + 1,
                    cell_id
                ))
            })?
            .parse::<f64>()
            .map_err(|_| {
                parse_error(format!(
                    "line {}: non-numeric value for cell {}: '{}'",
                    line_no + 1,
                    cell_id,
                    line
                ))
            })?;

        if !value.is_finite() {
            return Err(parse_error(format!(
                "line {}: value for cell {} is not finite",
                line_no + 1,
                cell_id
            )));
        }

        values.insert(cell_id, value);
    }

    let mut seen = Vec::with_capacity(cells.len());
    let mut missing = Vec::new();
    let mut records = Vec::with_capacity(cells.len());

    for &cell_id in cells {
        if seen.contains(&cell_id) {
            continue;
        }
        seen.push(cell_id);

        match values.get(&cell_id) {
            Some(&per_source_value) => records.push(TallyRecord {
                cell_id,
                per_source_value,
            }),
            None => missing.push(cell_id.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(parse_error(format!(
            "no data row for requested cell(s): {}",
            missing.join(", ")
        )));
    }

    Ok(records)
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('!') || line.starts_with("file")
}
