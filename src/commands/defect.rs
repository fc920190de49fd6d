//! # defect 命令实现
//!
//! 输运程序 per-source 计数 → 缺陷数密度。
//!
//! ## 流程
//! 1. 检查当前模式所需参数，校验取值范围
//! 2. 解析计数文件，取出目标 cell
//! 3. 换算并显示结果表格
//! 4. 写出 CSV（所有结果算完后才创建文件）
//!
//! ## 依赖关系
//! - 使用 `cli/defect.rs` 定义的参数
//! - 使用 `parsers/tally.rs`, `damage/`
//! - 使用 `utils/output.rs`

use crate::cli::defect::{DefectArgs, ModeArg};
use crate::damage::{self, converter, export};
use crate::error::{LabkitError, Result};
use crate::models::{
    ConversionParameters, DamageMode, DamageResult, DddParameters, MaterialParameters,
};
use crate::parsers::tally;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 结果表格行
#[derive(Debug, Clone, Tabled)]
struct ResultRow {
    #[tabled(rename = "Cell")]
    cell: i64,
    #[tabled(rename = "Per source")]
    per_source: String,
    #[tabled(rename = "Mission")]
    mission: String,
    #[tabled(rename = "Defects (cm⁻³)")]
    defects: String,
}

impl From<&DamageResult> for ResultRow {
    fn from(r: &DamageResult) -> Self {
        ResultRow {
            cell: r.cell_id,
            per_source: format!("{:.3e}", r.per_source_value),
            mission: format!("{:.3e}", r.mission_value),
            defects: format!("{:.3e}", r.defect_density_cm3),
        }
    }
}

/// 执行 defect 命令
pub fn execute(args: DefectArgs) -> Result<()> {
    let mode = DamageMode::from(args.mode);
    output::print_header(&format!(
        "Defect Density from {}",
        mode.to_string().to_uppercase()
    ));

    let params = conversion_parameters(&args)?;
    converter::validate(args.fluence, &params)?;

    match &params {
        ConversionParameters::Dpa(material) => {
            output::print_info(&format!(
                "Atomic number density: {:.3e} atoms/cm³",
                damage::atomic_density(material)
            ));
        }
        ConversionParameters::Ddd(ddd) => {
            output::print_warning(
                "DDD mode is an approximation; prefer a DPA tally when one is available.",
            );
            output::print_info(&format!(
                "Ed = {} eV, eta = {}, tally unit = {}",
                ddd.displacement_energy_ev, ddd.eta, ddd.unit
            ));
        }
    }

    output::print_info(&format!(
        "Reading '{}' for cell(s) {}",
        args.input.display(),
        args.cells
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    let records = tally::parse_tally_file(&args.input, &args.cells)?;

    let results = damage::convert(&records, args.fluence, &params)?;

    let rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
    println!("{}", Table::new(&rows));

    export::to_csv(&results, &args.csv_out)?;
    output::print_success(&format!(
        "{} result(s) written to '{}'",
        results.len(),
        args.csv_out.display()
    ));

    Ok(())
}

/// 按模式收集换算参数，缺失时报告全部缺失的选项
fn conversion_parameters(args: &DefectArgs) -> Result<ConversionParameters> {
    let mut missing = Vec::new();
    let mut require = |name: &str, value: Option<f64>| -> f64 {
        value.unwrap_or_else(|| {
            missing.push(name.to_string());
            f64::NAN
        })
    };

    let params = match args.mode {
        ModeArg::Dpa => ConversionParameters::Dpa(MaterialParameters {
            density_g_cm3: require("--rho", args.rho),
            molar_mass_g_mol: require("--M", args.molar_mass),
            atoms_per_formula: require("--atoms_per_formula", args.atoms_per_formula),
        }),
        ModeArg::Ddd => ConversionParameters::Ddd(DddParameters {
            density_g_cm3: require("--rho", args.rho),
            displacement_energy_ev: require("--Ed", args.displacement_energy),
            eta: require("--eta", args.eta),
            unit: args.ddd_unit.into(),
        }),
    };

    if missing.is_empty() {
        Ok(params)
    } else {
        Err(LabkitError::ConfigurationError {
            mode: params.mode().to_string(),
            missing: missing.join(", "),
        })
    }
}
