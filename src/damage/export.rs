//! # 换算结果导出
//!
//! 导出缺陷数密度到 CSV。
//!
//! ## 列
//! `cell_id, mode, per_source_value, mission_value, defect_density`
//!
//! ## 依赖关系
//! - 被 `commands/defect.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件，`utils/fs.rs` 负责替换目标文件

use crate::error::{LabkitError, Result};
use crate::models::DamageResult;
use crate::utils::fs;

use std::path::Path;

pub const CSV_HEADER: [&str; 5] = [
    "cell_id",
    "mode",
    "per_source_value",
    "mission_value",
    "defect_density",
];

/// 导出换算结果为 CSV 格式
///
/// 写入临时文件后再替换目标文件，失败时不留下不完整的 CSV。
pub fn to_csv(results: &[DamageResult], output_path: &Path) -> Result<()> {
    fs::write_atomic(output_path, |writer| {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(CSV_HEADER)?;

        for r in results {
            wtr.write_record(&[
                r.cell_id.to_string(),
                r.mode.to_string(),
                format!("{:.6e}", r.per_source_value),
                format!("{:.6e}", r.mission_value),
                format!("{:.6e}", r.defect_density_cm3),
            ])?;
        }

        wtr.flush().map_err(|e| LabkitError::FileWriteError {
            path: output_path.display().to_string(),
            source: e,
        })
    })
}
