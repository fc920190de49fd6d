//! # defect 子命令 CLI 定义
//!
//! 读取输运程序的 per-source DPA/DDD 计数，换算为缺陷数密度。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/defect.rs`

use crate::models::{DamageMode, DddUnit};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 计数类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// DPA tally (exact conversion, preferred)
    Dpa,
    /// DDD tally (NRT-based approximation)
    Ddd,
}

impl From<ModeArg> for DamageMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Dpa => DamageMode::Dpa,
            ModeArg::Ddd => DamageMode::Ddd,
        }
    }
}

/// DDD 计数值单位
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum DddUnitArg {
    /// J/g
    #[default]
    JPerG,
    /// MeV/g
    MevPerG,
}

impl From<DddUnitArg> for DddUnit {
    fn from(unit: DddUnitArg) -> Self {
        match unit {
            DddUnitArg::JPerG => DddUnit::JoulePerGram,
            DddUnitArg::MevPerG => DddUnit::MevPerGram,
        }
    }
}

/// defect 子命令参数
#[derive(Args, Debug)]
pub struct DefectArgs {
    /// Tally type of the input file
    #[arg(long, value_enum)]
    pub mode: ModeArg,

    /// Transport-code output file with per-source values (cell_id value)
    #[arg(long)]
    pub input: PathBuf,

    /// Total mission fluence [cm^-2]
    #[arg(long, allow_negative_numbers = true)]
    pub fluence: f64,

    /// Target cell IDs (comma-separated, e.g. 101,102)
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub cells: Vec<i64>,

    // ─────────────────────────────────────────────────────────────
    // 材料参数
    // ─────────────────────────────────────────────────────────────
    /// Density [g/cm^3] (dpa, ddd)
    #[arg(long, allow_negative_numbers = true)]
    pub rho: Option<f64>,

    /// Molar mass [g/mol] (dpa)
    #[arg(long = "M", allow_negative_numbers = true)]
    pub molar_mass: Option<f64>,

    /// Atoms per formula unit (dpa)
    #[arg(long = "atoms_per_formula", allow_negative_numbers = true)]
    pub atoms_per_formula: Option<f64>,

    /// Displacement threshold energy Ed [eV] (ddd)
    #[arg(long = "Ed", allow_negative_numbers = true)]
    pub displacement_energy: Option<f64>,

    /// Defect production efficiency eta (ddd; NRT ~0.8, lower for ARC)
    #[arg(long, allow_negative_numbers = true)]
    pub eta: Option<f64>,

    /// Unit of the DDD tally values (ddd)
    #[arg(long = "ddd_unit", value_enum, default_value = "j-per-g")]
    pub ddd_unit: DddUnitArg,

    /// Output CSV file
    #[arg(long = "csv_out", default_value = "defects_out.csv")]
    pub csv_out: PathBuf,
}
