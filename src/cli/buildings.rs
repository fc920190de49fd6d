//! # buildings 子命令 CLI 定义
//!
//! 从 WFS 服务（或已下载的 GeoJSON）提取目标区域内的建筑物多边形。
//!
//! 默认区域为斐济（跨越日期变更线），默认热点区为苏瓦。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/buildings.rs`

use crate::models::BoundingBox;
use crate::wfs::DEFAULT_WFS_URL;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 数据来源
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Method {
    /// Query the WFS service
    Wfs,
    /// Process already-downloaded GeoJSON files
    Download,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Wfs => write!(f, "wfs"),
            Method::Download => write!(f, "download"),
        }
    }
}

/// buildings 子命令参数
#[derive(Args, Debug)]
pub struct BuildingsArgs {
    /// Data source
    #[arg(long, value_enum, default_value = "wfs")]
    pub method: Method,

    /// WFS layer name (auto-detected from GetCapabilities if omitted)
    #[arg(long)]
    pub layer: Option<String>,

    /// Downloaded GeoJSON file or directory (required for --method download)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output GeoJSON file
    #[arg(short, long, default_value = "buildings.geojson")]
    pub output: PathBuf,

    /// WFS endpoint
    #[arg(long, env = "LABKIT_WFS_URL", default_value = DEFAULT_WFS_URL)]
    pub wfs_url: String,

    // ─────────────────────────────────────────────────────────────
    // 区域与分块
    // ─────────────────────────────────────────────────────────────
    /// Target region min_lon,min_lat,max_lon,max_lat (min_lon > max_lon wraps the antimeridian)
    #[arg(long, default_value = "177,-20,-178,-15", allow_hyphen_values = true)]
    pub bbox: BoundingBox,

    /// High-density zone gridded more finely from the start
    #[arg(long, default_value = "178.3,-18.2,178.5,-18.0", allow_hyphen_values = true)]
    pub hot_zone: BoundingBox,

    /// Disable the high-density zone
    #[arg(long, default_value_t = false)]
    pub no_hot_zone: bool,

    /// Initial grid divisions per axis for each region box
    #[arg(long, default_value_t = 2)]
    pub grid: usize,

    /// Grid divisions per axis inside the high-density zone
    #[arg(long, default_value_t = 2)]
    pub hot_grid: usize,

    /// Server feature limit per request; reaching it triggers a quadrant split
    #[arg(long, default_value_t = 100_000)]
    pub page_cap: usize,

    /// Smallest box edge in degrees; boxes are not split below it
    #[arg(long, default_value_t = 0.01)]
    pub min_box_size: f64,

    // ─────────────────────────────────────────────────────────────
    // 网络参数
    // ─────────────────────────────────────────────────────────────
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,

    /// Retries after a failed request
    #[arg(long, default_value_t = 1)]
    pub retries: u32,

    /// Wait before the first retry in milliseconds (doubles per retry)
    #[arg(long, default_value_t = 2000)]
    pub backoff_ms: u64,

    // ─────────────────────────────────────────────────────────────
    // download 模式参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files when --input is a directory
    #[arg(long, default_value = "*.geojson")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel loaders (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
