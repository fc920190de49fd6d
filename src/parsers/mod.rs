//! # 解析器模块
//!
//! 提供输运程序计数文件和 GeoJSON 文件的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: tally, geojson

pub mod geojson;
pub mod tally;
