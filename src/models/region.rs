//! # 地理范围数据模型
//!
//! 定义 EPSG:4326 经纬度空间中的矩形范围 `BoundingBox`，以及可能跨越
//! 日期变更线的目标区域 `Region`。
//!
//! ## 约定
//! - `BoundingBox` 从不跨越 ±180°，始终满足 `min < max`
//! - 跨越日期变更线的经度范围 (min_lon > max_lon) 拆分为两个互不重叠的框：
//!   `[min_lon, 180]` 与 `[-180, max_lon]`
//!
//! ## 依赖关系
//! - 被 `wfs/` 模块和 `cli/buildings.rs` 使用
//! - 使用 `geo` 的 `Rect` 参与相交判定

use geo::{coord, Rect};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 经纬度矩形范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        BoundingBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// 经度跨度（度）
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// 纬度跨度（度）
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// 面积（平方度）
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// 按 nx × ny 网格划分，经度优先排列
    ///
    /// 相邻子框共享完全相同的边界值，不产生缝隙。
    pub fn grid(&self, nx: usize, ny: usize) -> Vec<BoundingBox> {
        let lon_edges = split_edges(self.min_lon, self.max_lon, nx.max(1));
        let lat_edges = split_edges(self.min_lat, self.max_lat, ny.max(1));

        let mut cells = Vec::with_capacity((lon_edges.len() - 1) * (lat_edges.len() - 1));
        for lon in lon_edges.windows(2) {
            for lat in lat_edges.windows(2) {
                cells.push(BoundingBox::new(lon[0], lat[0], lon[1], lat[1]));
            }
        }
        cells
    }

    /// 四等分
    pub fn quadrants(&self) -> Vec<BoundingBox> {
        self.grid(2, 2)
    }

    /// 与另一个框的交集（仅当面积为正时返回）
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let min_lon = self.min_lon.max(other.min_lon);
        let min_lat = self.min_lat.max(other.min_lat);
        let max_lon = self.max_lon.min(other.max_lon);
        let max_lat = self.max_lat.min(other.max_lat);

        if min_lon < max_lon && min_lat < max_lat {
            Some(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
        } else {
            None
        }
    }

    /// 差集 `self − other`，以至多四个互不重叠的矩形表示
    pub fn subtract(&self, other: &BoundingBox) -> Vec<BoundingBox> {
        let inner = match self.intersection(other) {
            Some(inner) => inner,
            None => return vec![*self],
        };

        let mut pieces = Vec::with_capacity(4);
        // 左右两条取满高度，上下两条夹在中间列
        if inner.min_lon > self.min_lon {
            pieces.push(BoundingBox::new(
                self.min_lon,
                self.min_lat,
                inner.min_lon,
                self.max_lat,
            ));
        }
        if inner.max_lon < self.max_lon {
            pieces.push(BoundingBox::new(
                inner.max_lon,
                self.min_lat,
                self.max_lon,
                self.max_lat,
            ));
        }
        if inner.min_lat > self.min_lat {
            pieces.push(BoundingBox::new(
                inner.min_lon,
                self.min_lat,
                inner.max_lon,
                inner.min_lat,
            ));
        }
        if inner.max_lat < self.max_lat {
            pieces.push(BoundingBox::new(
                inner.min_lon,
                inner.max_lat,
                inner.max_lon,
                self.max_lat,
            ));
        }
        pieces
    }

    /// 转为 `geo::Rect`，供几何相交判定使用
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_lon, y: self.min_lat },
            coord! { x: self.max_lon, y: self.max_lat },
        )
    }
}

/// 将 [min, max] 等分为 n 段，最后一个边界精确取 max
fn split_edges(min: f64, max: f64, n: usize) -> Vec<f64> {
    (0..=n)
        .map(|i| {
            if i == n {
                max
            } else {
                min + (max - min) * i as f64 / n as f64
            }
        })
        .collect()
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// 从 "min_lon,min_lat,max_lon,max_lat" 解析
///
/// 允许 min_lon > max_lon（跨日期变更线），由 `Region::from_bounds` 处理。
impl FromStr for BoundingBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("Invalid bounding box '{}': expected four numbers", s))?;

        if values.len() != 4 {
            return Err(format!(
                "Invalid bounding box '{}': expected min_lon,min_lat,max_lon,max_lat",
                s
            ));
        }

        let bbox = BoundingBox::new(values[0], values[1], values[2], values[3]);

        for lon in [bbox.min_lon, bbox.max_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("Longitude {} out of range [-180, 180]", lon));
            }
        }
        for lat in [bbox.min_lat, bbox.max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("Latitude {} out of range [-90, 90]", lat));
            }
        }
        if bbox.min_lat >= bbox.max_lat {
            return Err(format!(
                "Invalid bounding box '{}': min_lat must be below max_lat",
                s
            ));
        }
        if bbox.min_lon == bbox.max_lon {
            return Err(format!(
                "Invalid bounding box '{}': longitude range is empty",
                s
            ));
        }

        Ok(bbox)
    }
}

/// 目标区域：一个或两个（跨日期变更线时）互不重叠的框
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub boxes: Vec<BoundingBox>,
}

impl Region {
    /// 从可能跨越日期变更线的经纬度范围构造
    pub fn from_bounds(bounds: BoundingBox) -> Self {
        if bounds.min_lon > bounds.max_lon {
            Region {
                boxes: vec![
                    BoundingBox::new(bounds.min_lon, bounds.min_lat, 180.0, bounds.max_lat),
                    BoundingBox::new(-180.0, bounds.min_lat, bounds.max_lon, bounds.max_lat),
                ],
            }
        } else {
            Region {
                boxes: vec![bounds],
            }
        }
    }

    /// 是否跨越日期变更线
    pub fn is_wrapping(&self) -> bool {
        self.boxes.len() > 1
    }

    /// 总面积（平方度）
    pub fn area(&self) -> f64 {
        self.boxes.iter().map(|b| b.area()).sum()
    }
}
