//! # 工具函数模块
//!
//! 终端输出样式、进度显示与输出文件写入。
//!
//! ## 依赖关系
//! - 被 `commands/`, `wfs/`, `batch/` 使用
//! - 子模块: fs, output, progress

pub mod fs;
pub mod output;
pub mod progress;
