//! # WFS 建筑物提取模块
//!
//! 从 OGC WFS 2.0 服务按包围框分块抓取建筑物多边形。
//!
//! ## 流水线
//! ```text
//! capabilities (图层检测) → tiler (分块/递归四分) → client (请求+重试)
//!                                              → merge (过滤/去重) → GeoJSON
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/buildings.rs` 调用
//! - 使用 `models/region.rs`, `models/feature.rs`

pub mod capabilities;
pub mod client;
pub mod geometry;
pub mod merge;
pub mod tiler;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{FeatureSource, RetryPolicy, WfsClient, WfsConfig, DEFAULT_WFS_URL};
pub use merge::{FeatureMerger, MergeStats};
pub use tiler::{fetch_tiles, plan_tiles, TilerConfig};
