//! # 要素与目标区域的相交判定
//!
//! GeoJSON 几何转为 `geo` 几何后与区域内每个框（`geo::Rect`）逐一判定，
//! 边界接触也算相交；落在多边形内环（洞）里的框不算相交。
//! 跨日期变更线的区域由两个框组成，任一相交即可。
//!
//! ## 依赖关系
//! - 被 `wfs/merge.rs` 调用
//! - 使用 `models/region.rs`, `models/feature.rs`
//! - 使用 `geo`

use crate::models::{Geometry, Region};

use geo::Intersects;

/// 几何是否与区域中任一框相交，无法解析的几何视为不相交
pub fn geometry_intersects_region(geometry: &Geometry, region: &Region) -> bool {
    match geometry.to_geo() {
        Some(shape) => region
            .boxes
            .iter()
            .any(|bbox| shape.intersects(&bbox.to_rect())),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;
    use serde_json::{json, Value};

    fn polygon(rings: Value) -> Geometry {
        Geometry {
            kind: "Polygon".to_string(),
            coordinates: rings,
        }
    }

    fn square(x0: f64, y0: f64, size: f64) -> Value {
        json!([
            [x0, y0],
            [x0 + size, y0],
            [x0 + size, y0 + size],
            [x0, y0 + size],
            [x0, y0]
        ])
    }

    fn unit_region() -> Region {
        Region::from_bounds(BoundingBox::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn test_partial_overlap() {
        let shape = polygon(json!([square(0.5, 0.5, 1.0)]));
        assert!(geometry_intersects_region(&shape, &unit_region()));
    }

    #[test]
    fn test_region_inside_polygon() {
        let shape = polygon(json!([square(-1.0, -1.0, 3.0)]));
        assert!(geometry_intersects_region(&shape, &unit_region()));
    }

    #[test]
    fn test_region_inside_hole() {
        let shape = polygon(json!([square(-5.0, -5.0, 10.0), square(-1.0, -1.0, 3.0)]));
        assert!(!geometry_intersects_region(&shape, &unit_region()));
    }

    #[test]
    fn test_crossing_edges_without_vertices() {
        // 细长横条穿过矩形，双方都没有顶点落在对方内部
        let bar = polygon(json!([[[-1.0, 0.4], [2.0, 0.4], [2.0, 0.6], [-1.0, 0.6], [-1.0, 0.4]]]));
        assert!(geometry_intersects_region(&bar, &unit_region()));
    }

    #[test]
    fn test_edge_contact_counts() {
        let shape = polygon(json!([square(1.0, 0.0, 1.0)]));
        assert!(geometry_intersects_region(&shape, &unit_region()));
    }

    #[test]
    fn test_disjoint() {
        let shape = polygon(json!([square(2.0, 2.0, 1.0)]));
        assert!(!geometry_intersects_region(&shape, &unit_region()));
    }

    #[test]
    fn test_wrapping_region() {
        let region = Region::from_bounds(BoundingBox::new(177.0, -20.0, -178.0, -15.0));
        let west = polygon(json!([[
            [-179.5, -18.0],
            [-179.4, -18.0],
            [-179.4, -17.9],
            [-179.5, -18.0]
        ]]));
        let outside = polygon(json!([[
            [-170.0, -18.0],
            [-169.9, -18.0],
            [-169.9, -17.9],
            [-170.0, -18.0]
        ]]));
        assert!(geometry_intersects_region(&west, &region));
        assert!(!geometry_intersects_region(&outside, &region));
    }

    #[test]
    fn test_point_geometry() {
        let point = Geometry {
            kind: "Point".to_string(),
            coordinates: json!([0.5, 0.5]),
        };
        assert!(geometry_intersects_region(&point, &unit_region()));
    }

    #[test]
    fn test_unparseable_geometry_is_outside() {
        let collection = Geometry {
            kind: "GeometryCollection".to_string(),
            coordinates: Value::Null,
        };
        assert!(!geometry_intersects_region(&collection, &unit_region()));
    }
}
