//! # labkit - 辐照损伤换算与建筑物数据提取工具箱
//!
//! 将两个独立的批处理脚本用 Rust 重构，统一成单一可执行文件。
//!
//! ## 子命令
//! - `defect`    - 输运程序 DPA/DDD 计数 → 缺陷数密度 (cm⁻³)
//! - `buildings` - WFS 服务分块抓取建筑物多边形 → GeoJSON
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (计数文件与 GeoJSON 读写)
//!   │     ├── damage/    (损伤换算与 CSV 导出)
//!   │     ├── wfs/       (WFS 客户端、分块、合并)
//!   │     ├── batch/     (本地文件批量加载)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod damage;
mod error;
mod models;
mod parsers;
mod utils;
mod wfs;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}: {}", e.kind(), e));
        std::process::exit(1);
    }
}
