//! # 辐照损伤换算模块
//!
//! 将输运程序的 per-source DPA/DDD 计数换算为缺陷数密度并导出。
//!
//! ## 模块结构
//! - `converter`: 物理常数与换算公式
//! - `export`: CSV 导出
//!
//! ## 依赖关系
//! - 被 `commands/defect.rs` 调用
//! - 使用 `models/damage.rs`

pub mod converter;
pub mod export;

pub use converter::{atomic_density, convert};
