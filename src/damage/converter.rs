//! # 损伤量 → 缺陷数密度换算
//!
//! ## 公式
//! - 原子数密度: `n = (ρ / M) × N_A × atoms_per_formula`  [atoms/cm³]
//! - DPA 模式:   `N_d = DPA_mission × n`                   [cm⁻³]
//! - DDD 模式:   `N_d = η × DDD_mission[J/g] × ρ / (2 × Ed[J])`  [cm⁻³]
//!
//! 任务总量 = per-source 值 × 注量 [cm⁻²]。
//!
//! DDD 换算是基于 NRT 模型的近似，η 与 Ed 由调用方给出。
//!
//! ## 依赖关系
//! - 被 `commands/defect.rs` 调用
//! - 使用 `models/damage.rs`

use crate::error::{LabkitError, Result};
use crate::models::{
    ConversionParameters, DamageResult, DddParameters, DddUnit, MaterialParameters, TallyRecord,
};

/// 阿伏伽德罗常数 (mol⁻¹)
pub const AVOGADRO: f64 = 6.02214076e23;

/// 1 eV 对应的焦耳数
pub const EV_TO_J: f64 = 1.602176634e-19;

/// 1 MeV 对应的焦耳数
pub const MEV_TO_J: f64 = 1.602176634e-13;

/// 原子数密度 [atoms/cm³]
pub fn atomic_density(material: &MaterialParameters) -> f64 {
    let n_formula = material.density_g_cm3 / material.molar_mass_g_mol * AVOGADRO;
    n_formula * material.atoms_per_formula
}

/// DPA → 缺陷数密度 [cm⁻³]
pub fn defects_from_dpa(dpa_mission: f64, n_atoms_cm3: f64) -> f64 {
    dpa_mission * n_atoms_cm3
}

/// DDD → 缺陷数密度 [cm⁻³]
pub fn defects_from_ddd(ddd_mission: f64, params: &DddParameters) -> f64 {
    let ddd_j_per_g = match params.unit {
        DddUnit::JoulePerGram => ddd_mission,
        DddUnit::MevPerGram => ddd_mission * MEV_TO_J,
    };
    let ddd_j_cm3 = ddd_j_per_g * params.density_g_cm3;
    let ed_j = params.displacement_energy_ev * EV_TO_J;
    params.eta * ddd_j_cm3 / (2.0 * ed_j)
}

/// 检查注量与材料参数的取值范围
pub fn validate(fluence: f64, params: &ConversionParameters) -> Result<()> {
    check_positive("--fluence", fluence)?;

    match params {
        ConversionParameters::Dpa(m) => {
            check_positive("--rho", m.density_g_cm3)?;
            check_positive("--M", m.molar_mass_g_mol)?;
            check_positive("--atoms_per_formula", m.atoms_per_formula)?;
        }
        ConversionParameters::Ddd(d) => {
            check_positive("--rho", d.density_g_cm3)?;
            check_positive("--Ed", d.displacement_energy_ev)?;
            check_positive("--eta", d.eta)?;
        }
    }

    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(LabkitError::validation(name, format!("{} is not finite", value)));
    }
    if value <= 0.0 {
        return Err(LabkitError::validation(
            name,
            format!("must be greater than 0, got {}", value),
        ));
    }
    Ok(())
}

/// 预先算好与 cell 无关的量
enum Kernel {
    Dpa { n_atoms_cm3: f64 },
    Ddd(DddParameters),
}

impl Kernel {
    fn new(params: &ConversionParameters) -> Self {
        match params {
            ConversionParameters::Dpa(material) => Kernel::Dpa {
                n_atoms_cm3: atomic_density(material),
            },
            ConversionParameters::Ddd(ddd) => Kernel::Ddd(*ddd),
        }
    }

    fn defects(&self, mission_value: f64) -> f64 {
        match self {
            Kernel::Dpa { n_atoms_cm3 } => defects_from_dpa(mission_value, *n_atoms_cm3),
            Kernel::Ddd(ddd) => defects_from_ddd(mission_value, ddd),
        }
    }
}

/// 将计数记录换算为缺陷数密度
pub fn convert(
    records: &[TallyRecord],
    fluence: f64,
    params: &ConversionParameters,
) -> Result<Vec<DamageResult>> {
    validate(fluence, params)?;

    let mode = params.mode();
    let kernel = Kernel::new(params);

    let results = records
        .iter()
        .map(|record| {
            let mission_value = record.per_source_value * fluence;
            let defect_density_cm3 = kernel.defects(mission_value);

            DamageResult {
                cell_id: record.cell_id,
                mode,
                per_source_value: record.per_source_value,
                mission_value,
                defect_density_cm3,
            }
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DamageMode;

    fn gaas() -> MaterialParameters {
        MaterialParameters {
            density_g_cm3: 5.32,
            molar_mass_g_mol: 144.64,
            atoms_per_formula: 2.0,
        }
    }

    fn rel_close(a: f64, b: f64, tol: f64) -> bool {
        ((a - b) / b).abs() < tol
    }

    #[test]
    fn test_gaas_dpa_regression() {
        let records = [TallyRecord {
            cell_id: 102,
            per_source_value: 1.234e-24,
        }];
        let results = convert(&records, 1e14, &ConversionParameters::Dpa(gaas())).unwrap();
        let r = &results[0];

        assert_eq!(r.mode, DamageMode::Dpa);
        assert!(rel_close(r.mission_value, 1.234e-10, 1e-12));

        let n = atomic_density(&gaas());
        assert!(rel_close(n, 4.43e22, 1e-3));

        let expected = 1e14 * 1.234e-24 * (5.32 / 144.64) * AVOGADRO * 2.0;
        assert!(rel_close(r.defect_density_cm3, expected, 1e-12));
        assert!(rel_close(r.defect_density_cm3, 5.47e12, 1e-3));
    }

    #[test]
    fn test_ddd_joule_per_gram() {
        let params = DddParameters {
            density_g_cm3: 5.32,
            displacement_energy_ev: 21.5,
            eta: 0.8,
            unit: DddUnit::JoulePerGram,
        };
        let records = [TallyRecord {
            cell_id: 7,
            per_source_value: 2.5e-12,
        }];
        let results = convert(&records, 1e14, &ConversionParameters::Ddd(params)).unwrap();

        let expected = 0.8 * 1e14 * 2.5e-12 * 5.32 / (2.0 * 21.5 * EV_TO_J);
        assert_eq!(results[0].mode, DamageMode::Ddd);
        assert!(rel_close(results[0].defect_density_cm3, expected, 1e-12));
    }

    #[test]
    fn test_ddd_mev_per_gram_scales_by_mev() {
        let mut params = DddParameters {
            density_g_cm3: 2.33,
            displacement_energy_ev: 25.0,
            eta: 0.5,
            unit: DddUnit::JoulePerGram,
        };
        let in_joules = defects_from_ddd(1.0, &params);
        params.unit = DddUnit::MevPerGram;
        let in_mev = defects_from_ddd(1.0, &params);

        assert!(rel_close(in_mev, in_joules * MEV_TO_J, 1e-12));
    }

    #[test]
    fn test_non_positive_fluence_rejected() {
        let records = [TallyRecord {
            cell_id: 1,
            per_source_value: 1.0,
        }];
        for fluence in [0.0, -1e14, f64::NAN] {
            let err = convert(&records, fluence, &ConversionParameters::Dpa(gaas())).unwrap_err();
            assert_eq!(err.kind(), "ValidationError");
        }
    }

    #[test]
    fn test_non_positive_material_rejected() {
        let mut material = gaas();
        material.molar_mass_g_mol = 0.0;
        let err = validate(1e14, &ConversionParameters::Dpa(material)).unwrap_err();
        assert!(err.to_string().contains("--M"));
    }
}
