//! # buildings 命令实现
//!
//! 提取目标区域内的建筑物多边形并写出 GeoJSON。
//!
//! ## 功能
//! - `wfs`: 检测图层 → 分块抓取（递归四分） → 过滤去重 → 写出
//! - `download`: 收集本地 GeoJSON → 并行加载 → 过滤去重 → 写出
//! - 单个框/文件失败只记录警告；全部失败时报错
//!
//! ## 依赖关系
//! - 使用 `cli/buildings.rs` 定义的参数
//! - 使用 `wfs/`, `batch/`, `parsers/geojson.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::buildings::{BuildingsArgs, Method};
use crate::error::{LabkitError, Result};
use crate::models::{BuildingFeature, Region};
use crate::parsers::geojson;
use crate::utils::{output, progress};
use crate::wfs::{
    fetch_tiles, plan_tiles, FeatureMerger, FeatureSource, MergeStats, RetryPolicy, TilerConfig,
    WfsClient, WfsConfig,
};

use indicatif::ProgressBar;
use std::path::PathBuf;
use std::time::Duration;
use tabled::{Table, Tabled};

/// 汇总表格行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Count")]
    count: String,
}

impl SummaryRow {
    fn new(item: &str, count: impl ToString) -> Self {
        SummaryRow {
            item: item.to_string(),
            count: count.to_string(),
        }
    }
}

/// 执行 buildings 命令
pub fn execute(args: BuildingsArgs) -> Result<()> {
    output::print_header(&format!("Extracting Buildings ({})", args.method));

    let region = Region::from_bounds(args.bbox);
    output::print_info(&format!(
        "Target region {} covers {:.2} square degree(s)",
        args.bbox,
        region.area()
    ));
    if region.is_wrapping() {
        output::print_info(&format!(
            "Region crosses the antimeridian, split into {} and {}",
            region.boxes[0], region.boxes[1]
        ));
    }

    let (features, mut summary) = match args.method {
        Method::Wfs => collect_from_wfs(&args, &region)?,
        Method::Download => collect_from_files(&args)?,
    };

    let mut merger = FeatureMerger::new(&region);
    merger.extend(features);
    let (collection, stats) = merger.finish();

    summary.extend(merge_rows(&stats));
    output::print_header("Summary");
    println!("{}", Table::new(&summary));

    if let Some(b) = stats.bounds {
        output::print_info(&format!(
            "Output bounds: ({:.6}, {:.6}, {:.6}, {:.6})",
            b[0], b[1], b[2], b[3]
        ));
    }

    geojson::write_feature_collection(&collection, &args.output)?;
    output::print_success(&format!(
        "{} building polygon(s) saved to '{}' (EPSG:4326)",
        stats.kept,
        args.output.display()
    ));

    Ok(())
}

/// 从 CLI 参数构造分块参数
pub fn tiler_config(args: &BuildingsArgs) -> Result<TilerConfig> {
    if args.grid == 0 {
        return Err(LabkitError::validation("--grid", "must be at least 1"));
    }
    if args.hot_grid == 0 {
        return Err(LabkitError::validation("--hot-grid", "must be at least 1"));
    }
    if args.page_cap == 0 {
        return Err(LabkitError::validation("--page-cap", "must be at least 1"));
    }
    if !(args.min_box_size.is_finite() && args.min_box_size > 0.0) {
        return Err(LabkitError::validation(
            "--min-box-size",
            format!("must be greater than 0, got {}", args.min_box_size),
        ));
    }

    Ok(TilerConfig {
        grid: args.grid,
        hot_zone: if args.no_hot_zone {
            None
        } else {
            Some(args.hot_zone)
        },
        hot_grid: args.hot_grid,
        page_cap: args.page_cap,
        min_box_size: args.min_box_size,
    })
}

/// 从 CLI 参数构造 WFS 客户端配置
pub fn wfs_config(args: &BuildingsArgs) -> Result<WfsConfig> {
    if args.timeout == 0 {
        return Err(LabkitError::validation("--timeout", "must be at least 1 second"));
    }

    Ok(WfsConfig {
        url: args.wfs_url.clone(),
        timeout: Duration::from_secs(args.timeout),
        retry: RetryPolicy {
            retries: args.retries,
            backoff: Duration::from_millis(args.backoff_ms),
        },
        page_cap: args.page_cap,
    })
}

fn collect_from_wfs(
    args: &BuildingsArgs,
    region: &Region,
) -> Result<(Vec<BuildingFeature>, Vec<SummaryRow>)> {
    let tiler = tiler_config(args)?;
    let mut client = WfsClient::new(wfs_config(args)?)?;

    output::print_info(&format!("WFS endpoint: {}", client.config().url));

    let layer = match &args.layer {
        Some(name) => name.clone(),
        None => {
            let spinner = progress::create_spinner("Detecting building layer...");
            client.set_progress(&spinner);
            let detected = client.resolve_layer(None);
            spinner.finish_and_clear();
            let layer = detected?;
            output::print_info(&format!("Using auto-detected layer '{}'", layer));
            layer
        }
    };

    let pb = progress::create_progress_bar(0, "Fetching");
    client.set_progress(&pb);
    let result = fetch_region(&client, &layer, region, &tiler, args.retries + 1, &pb);
    pb.finish_and_clear();
    result
}

/// 按分块方案抓取区域内的要素
///
/// 单个框失败只计数并警告；所有框都失败时返回 `FetchError`。
fn fetch_region<S: FeatureSource>(
    source: &S,
    layer: &str,
    region: &Region,
    tiler: &TilerConfig,
    attempts: u32,
    pb: &ProgressBar,
) -> Result<(Vec<BuildingFeature>, Vec<SummaryRow>)> {
    let plan = plan_tiles(region, tiler);
    pb.suspend(|| {
        output::print_info(&format!(
            "Querying layer '{}' in {} initial box(es) ({} in the high-density zone)",
            layer,
            plan.len(),
            plan.iter().filter(|t| t.hot).count()
        ))
    });
    pb.set_length(plan.len() as u64);

    let report = fetch_tiles(source, layer, plan, tiler, pb);

    if report.failed() > 0 || report.truncated() > 0 {
        pb.suspend(|| {
            output::print_warning(&format!(
                "{} box(es) failed, {} box(es) truncated at minimum size",
                report.failed(),
                report.truncated()
            ))
        });
    }

    if report.succeeded() == 0 {
        return Err(LabkitError::FetchError {
            request: format!("GetFeature [{}]", layer),
            attempts,
            reason: format!("all {} box(es) failed", report.outcomes.len()),
        });
    }

    let deepest = report.outcomes.iter().map(|o| o.tile.depth).max().unwrap_or(0);
    let rows = vec![
        SummaryRow::new("Boxes queried (leaves)", report.outcomes.len()),
        SummaryRow::new("Boxes split at page cap", report.splits),
        SummaryRow::new("Deepest split level", deepest),
        SummaryRow::new("Boxes complete", report.complete()),
        SummaryRow::new("Boxes truncated", report.truncated()),
        SummaryRow::new("Boxes failed", report.failed()),
    ];

    Ok((report.features, rows))
}

fn collect_from_files(args: &BuildingsArgs) -> Result<(Vec<BuildingFeature>, Vec<SummaryRow>)> {
    let input: &PathBuf = args.input.as_ref().ok_or_else(|| LabkitError::ConfigurationError {
        mode: "download".to_string(),
        missing: "--input".to_string(),
    })?;

    let files = FileCollector::new(input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        return Err(LabkitError::FileNotFound {
            path: format!("{} ({})", input.display(), args.pattern),
        });
    }

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Loading {} GeoJSON file(s) with {} job(s)",
        files.len(),
        runner.jobs()
    ));

    let result = runner.run(&files, geojson::read_feature_file);

    for (path, err) in &result.failures {
        output::print_warning(&format!("{}: {}", path, err));
    }
    if result.outputs.is_empty() {
        return Err(LabkitError::ParseError {
            format: "GeoJSON".to_string(),
            path: input.display().to_string(),
            reason: "no readable GeoJSON files".to_string(),
        });
    }

    let rows = vec![
        SummaryRow::new("Files matched", result.total()),
        SummaryRow::new("Files loaded", result.outputs.len()),
        SummaryRow::new("Files failed", result.failures.len()),
    ];

    let mut features = Vec::new();
    for (path, batch) in result.outputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if batch.is_empty() {
            output::print_warning(&format!("{}: no features", name));
            continue;
        }
        output::print_info(&format!("{}: {} feature(s)", name, batch.len()));
        features.extend(batch.features);
    }

    Ok((features, rows))
}

fn merge_rows(stats: &MergeStats) -> Vec<SummaryRow> {
    vec![
        SummaryRow::new("Features received", stats.input),
        SummaryRow::new("Outside region / no geometry", stats.outside_region),
        SummaryRow::new("Duplicate ids merged", stats.duplicates),
        SummaryRow::new("Features with scores", stats.scored),
        SummaryRow::new("Features written", stats.kept),
    ]
}
