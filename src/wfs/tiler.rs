//! # 包围框分块与分块抓取
//!
//! WFS 服务不支持分页，单次最多返回 `page_cap` 个要素，因此把目标区域
//! 切成足够小的框逐个请求。
//!
//! ## 分块规则
//! - 每个互不相交的区域框先按 `grid × grid` 粗分
//! - 粗分单元与热点区（已知的高密度区域）重叠的部分按 `hot_grid × hot_grid`
//!   细分，其余部分用至多四个矩形覆盖
//! - 返回数量达到上限（或 `numberMatched` 大于返回数）的框四等分后重新请求，
//!   被截断的父批次丢弃
//! - 子框边长将小于 `min_box_size` 时不再细分，保留该批次并标记为截断
//! - 单个框请求失败只记录，不影响其他框
//!
//! ## 依赖关系
//! - 被 `commands/buildings.rs` 调用
//! - 使用 `wfs/client.rs` 的 `FeatureSource`
//! - 使用 `utils/output.rs`, `indicatif`

use crate::models::{BoundingBox, BuildingFeature, Region};
use crate::utils::output;
use crate::wfs::client::FeatureSource;

use indicatif::ProgressBar;

/// 分块参数
#[derive(Debug, Clone)]
pub struct TilerConfig {
    /// 粗分网格数（每个方向）
    pub grid: usize,
    /// 热点区
    pub hot_zone: Option<BoundingBox>,
    /// 热点区细分网格数（每个方向）
    pub hot_grid: usize,
    /// 服务器单次返回上限
    pub page_cap: usize,
    /// 最小框边长（度）
    pub min_box_size: f64,
}

impl Default for TilerConfig {
    fn default() -> Self {
        TilerConfig {
            grid: 2,
            hot_zone: Some(BoundingBox::new(178.3, -18.2, 178.5, -18.0)),
            hot_grid: 2,
            page_cap: 100_000,
            min_box_size: 0.01,
        }
    }
}

/// 待请求的框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub bbox: BoundingBox,
    /// 是否位于热点区
    pub hot: bool,
    /// 细分深度（初始规划为 0）
    pub depth: u32,
}

impl Tile {
    fn new(bbox: BoundingBox, hot: bool) -> Self {
        Tile {
            bbox,
            hot,
            depth: 0,
        }
    }

    /// 四等分后子框边长是否仍不小于下限
    pub fn can_split(&self, min_box_size: f64) -> bool {
        self.bbox.width() / 2.0 >= min_box_size && self.bbox.height() / 2.0 >= min_box_size
    }

    fn children(&self) -> Vec<Tile> {
        self.bbox
            .quadrants()
            .into_iter()
            .map(|bbox| Tile {
                bbox,
                hot: self.hot,
                depth: self.depth + 1,
            })
            .collect()
    }
}

/// 生成初始分块方案
///
/// 结果覆盖整个区域，且任意两个框的重叠面积为零。
pub fn plan_tiles(region: &Region, config: &TilerConfig) -> Vec<Tile> {
    let mut tiles = Vec::new();

    for region_box in &region.boxes {
        for cell in region_box.grid(config.grid, config.grid) {
            let hot_part = config.hot_zone.and_then(|hot| cell.intersection(&hot));
            match hot_part {
                Some(hot) => {
                    tiles.extend(
                        hot.grid(config.hot_grid, config.hot_grid)
                            .into_iter()
                            .map(|b| Tile::new(b, true)),
                    );
                    tiles.extend(cell.subtract(&hot).into_iter().map(|b| Tile::new(b, false)));
                }
                None => tiles.push(Tile::new(cell, false)),
            }
        }
    }

    tiles
}

/// 单个叶子框的抓取结果
#[derive(Debug, Clone, PartialEq)]
pub enum TileStatus {
    /// 完整取回
    Complete(usize),
    /// 已达最小尺寸仍被截断
    Truncated(usize),
    /// 重试耗尽
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TileOutcome {
    pub tile: Tile,
    pub status: TileStatus,
}

/// 分块抓取汇总
#[derive(Debug, Default)]
pub struct TileReport {
    /// 叶子框（按深度优先顺序）
    pub outcomes: Vec<TileOutcome>,
    /// 已取回的全部要素（未去重）
    pub features: Vec<BuildingFeature>,
    /// 因截断而细分的次数
    pub splits: usize,
}

impl TileReport {
    pub fn complete(&self) -> usize {
        self.count(|s| matches!(s, TileStatus::Complete(_)))
    }

    pub fn truncated(&self) -> usize {
        self.count(|s| matches!(s, TileStatus::Truncated(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TileStatus::Failed(_)))
    }

    /// 成功返回数据的框数（含截断）
    pub fn succeeded(&self) -> usize {
        self.complete() + self.truncated()
    }

    fn count<F: Fn(&TileStatus) -> bool>(&self, pred: F) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// 按方案逐框抓取，必要时递归四分
pub fn fetch_tiles<S: FeatureSource>(
    source: &S,
    layer: &str,
    plan: Vec<Tile>,
    config: &TilerConfig,
    pb: &ProgressBar,
) -> TileReport {
    let mut report = TileReport::default();

    // 深度优先：逆序压栈，保证按方案顺序处理
    let mut stack: Vec<Tile> = plan.into_iter().rev().collect();

    while let Some(tile) = stack.pop() {
        pb.set_message(format!("{}", tile.bbox));

        match source.fetch(layer, &tile.bbox) {
            Ok(batch) => {
                let count = batch.len();
                if batch.is_truncated(config.page_cap) {
                    if tile.can_split(config.min_box_size) {
                        report.splits += 1;
                        pb.inc_length(4);
                        stack.extend(tile.children().into_iter().rev());
                    } else {
                        pb.suspend(|| {
                            output::print_warning(&format!(
                                "Box {} truncated at minimum size ({} features)",
                                tile.bbox, count
                            ))
                        });
                        report.features.extend(batch.features);
                        report.outcomes.push(TileOutcome {
                            tile,
                            status: TileStatus::Truncated(count),
                        });
                    }
                } else {
                    report.features.extend(batch.features);
                    report.outcomes.push(TileOutcome {
                        tile,
                        status: TileStatus::Complete(count),
                    });
                }
            }
            Err(e) => {
                pb.suspend(|| {
                    output::print_warning(&format!("Box {} skipped: {}", tile.bbox, e))
                });
                report.outcomes.push(TileOutcome {
                    tile,
                    status: TileStatus::Failed(e.to_string()),
                });
            }
        }

        pb.inc(1);
    }

    report
}
