//! # GeoJSON 读写
//!
//! 读取已下载的 FeatureCollection 文件，写出合并后的结果。
//!
//! 输出文件只在全部结果合并完成后写入一次：先写入同目录下的临时文件，
//! 再重命名到目标路径，中途失败不会留下不完整的输出。
//!
//! ## 依赖关系
//! - 被 `commands/buildings.rs` 使用
//! - 使用 `models/feature.rs`, `utils/fs.rs`, `serde_json`

use crate::error::{LabkitError, Result};
use crate::models::{FeatureBatch, FeatureCollection};
use crate::utils::fs;

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// 读取 GeoJSON FeatureCollection 文件
pub fn read_feature_file(path: &Path) -> Result<FeatureBatch> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LabkitError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LabkitError::FileReadError {
            path: path.display().to_string(),
            source: e,
        },
    })?;

    parse_feature_collection(BufReader::new(file), &path.display().to_string())
}

/// 从 reader 解析 FeatureCollection
pub fn parse_feature_collection<R: std::io::Read>(reader: R, source: &str) -> Result<FeatureBatch> {
    serde_json::from_reader(reader).map_err(|e| LabkitError::ParseError {
        format: "GeoJSON".to_string(),
        path: source.to_string(),
        reason: e.to_string(),
    })
}

/// 写出 FeatureCollection（临时文件 + 重命名）
pub fn write_feature_collection(collection: &FeatureCollection, path: &Path) -> Result<()> {
    fs::write_atomic(path, |writer| {
        serde_json::to_writer(writer, collection)?;
        Ok(())
    })
}
