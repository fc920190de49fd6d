//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `damage/`, `wfs/`, `utils/`
//! - 子模块: defect, buildings

pub mod buildings;
pub mod defect;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Defect(args) => defect::execute(args),
        Commands::Buildings(args) => buildings::execute(args),
    }
}
