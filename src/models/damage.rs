//! # 辐照损伤数据模型
//!
//! 存储输运程序 per-source 计数值、材料参数以及换算后的缺陷数密度。
//!
//! ## 依赖关系
//! - 被 `parsers/tally.rs` 使用
//! - 被 `damage/`, `commands/defect.rs` 使用

use serde::{Deserialize, Serialize};

/// 损伤指标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageMode {
    /// Displacements Per Atom
    Dpa,
    /// Displacement Damage Dose
    Ddd,
}

impl std::fmt::Display for DamageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DamageMode::Dpa => write!(f, "dpa"),
            DamageMode::Ddd => write!(f, "ddd"),
        }
    }
}

/// DDD 计数值单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DddUnit {
    /// J/g
    #[default]
    JoulePerGram,
    /// MeV/g（输运程序的常见输出单位）
    MevPerGram,
}

impl std::fmt::Display for DddUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DddUnit::JoulePerGram => write!(f, "J/g"),
            DddUnit::MevPerGram => write!(f, "MeV/g"),
        }
    }
}

/// 计数文件中的一行
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TallyRecord {
    /// 单元（cell）编号
    pub cell_id: i64,
    /// 每个源粒子的计数值
    pub per_source_value: f64,
}

/// DPA 模式所需的材料参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParameters {
    /// 密度 (g/cm³)
    pub density_g_cm3: f64,
    /// 摩尔质量 (g/mol)
    pub molar_mass_g_mol: f64,
    /// 化学式中的原子数
    pub atoms_per_formula: f64,
}

/// DDD 模式所需的参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DddParameters {
    /// 密度 (g/cm³)
    pub density_g_cm3: f64,
    /// 离位阈能 Ed (eV)
    pub displacement_energy_ev: f64,
    /// 缺陷产生效率 η
    pub eta: f64,
    /// 计数值单位
    pub unit: DddUnit,
}

/// 按模式区分的换算参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionParameters {
    Dpa(MaterialParameters),
    Ddd(DddParameters),
}

impl ConversionParameters {
    pub fn mode(&self) -> DamageMode {
        match self {
            ConversionParameters::Dpa(_) => DamageMode::Dpa,
            ConversionParameters::Ddd(_) => DamageMode::Ddd,
        }
    }
}

/// 单个 cell 的换算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    pub cell_id: i64,
    pub mode: DamageMode,
    pub per_source_value: f64,
    /// 任务总量 = per-source 值 × 注量
    pub mission_value: f64,
    /// 缺陷数密度 (cm⁻³)
    pub defect_density_cm3: f64,
}
