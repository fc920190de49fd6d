//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `defect`: DPA/DDD 计数 → 缺陷数密度换算
//! - `buildings`: WFS / 本地 GeoJSON 建筑物多边形提取
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: defect, buildings

pub mod buildings;
pub mod defect;

use clap::{Parser, Subcommand};

/// labkit - 辐照损伤换算与建筑物数据提取工具箱
#[derive(Parser)]
#[command(name = "labkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Radiation-damage defect density conversion and WFS building footprint extraction",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert per-source DPA/DDD tallies to defect number density (cm^-3)
    Defect(defect::DefectArgs),

    /// Extract building polygons from a WFS service or downloaded GeoJSON
    Buildings(buildings::BuildingsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
