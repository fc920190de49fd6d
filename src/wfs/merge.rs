//! # 要素过滤与合并
//!
//! 汇总所有批次的要素：
//! - 只保留几何与目标区域相交的要素（服务器可能返回框外要素）
//! - 按要素 id 去重（区分字符串与数值 id），后写入者覆盖先写入者，
//!   位置保持首次出现的位置
//! - 无 id 的要素按几何 JSON 去重，输出时分配不与已有 id 冲突的 `auto-<n>`
//! - 每个输出要素都带 `properties.scores`（缺失时为 null）
//!
//! ## 依赖关系
//! - 被 `commands/buildings.rs` 调用
//! - 使用 `wfs/geometry.rs`, `models/feature.rs`

use crate::models::feature::string_id_key;
use crate::models::{BuildingFeature, FeatureCollection, Region};
use crate::wfs::geometry::geometry_intersects_region;

use geo::BoundingRect;
use serde_json::Value;
use std::collections::HashMap;

/// 合并统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeStats {
    /// 输入要素总数
    pub input: usize,
    /// 输出要素数
    pub kept: usize,
    /// 不在目标区域内（或无几何）而被丢弃的数量
    pub outside_region: usize,
    /// 重复 id 覆盖次数
    pub duplicates: usize,
    /// 带数值 `scores` 的输出要素数
    pub scored: usize,
    /// 输出要素的经纬度范围 (min_lon, min_lat, max_lon, max_lat)
    pub bounds: Option<[f64; 4]>,
}

/// 要素合并器
pub struct FeatureMerger<'a> {
    region: &'a Region,
    features: Vec<BuildingFeature>,
    index: HashMap<String, usize>,
    stats: MergeStats,
}

impl<'a> FeatureMerger<'a> {
    pub fn new(region: &'a Region) -> Self {
        Self {
            region,
            features: Vec::new(),
            index: HashMap::new(),
            stats: MergeStats::default(),
        }
    }

    /// 加入一批要素
    pub fn extend<I>(&mut self, features: I)
    where
        I: IntoIterator<Item = BuildingFeature>,
    {
        for feature in features {
            self.push(feature);
        }
    }

    fn push(&mut self, feature: BuildingFeature) {
        self.stats.input += 1;

        let key = match &feature.geometry {
            Some(geometry) if geometry_intersects_region(geometry, self.region) => {
                match feature.id_key() {
                    Some(id) => id,
                    None => format!(
                        "g:{}",
                        serde_json::to_string(geometry).unwrap_or_default()
                    ),
                }
            }
            _ => {
                self.stats.outside_region += 1;
                return;
            }
        };

        match self.index.get(&key) {
            Some(&slot) => {
                self.stats.duplicates += 1;
                self.features[slot] = feature;
            }
            None => {
                self.index.insert(key, self.features.len());
                self.features.push(feature);
            }
        }
    }

    /// 生成输出 FeatureCollection
    ///
    /// 无 id 的要素分配 `auto-<n>`，跳过已被其他要素占用的编号。
    pub fn finish(self) -> (FeatureCollection, MergeStats) {
        let FeatureMerger {
            features,
            index,
            mut stats,
            ..
        } = self;
        let mut bounds: Option<[f64; 4]> = None;
        let mut auto_id = 0usize;

        let features: Vec<BuildingFeature> = features
            .into_iter()
            .map(|mut feature| {
                if feature.id_key().is_none() {
                    let id = loop {
                        auto_id += 1;
                        let candidate = format!("auto-{}", auto_id);
                        if !index.contains_key(&string_id_key(&candidate)) {
                            break candidate;
                        }
                    };
                    feature.id = Some(Value::String(id));
                }

                if feature.scores().is_some() {
                    stats.scored += 1;
                }
                feature
                    .properties
                    .entry("scores")
                    .or_insert(Value::Null);

                let extent = feature
                    .geometry
                    .as_ref()
                    .and_then(|g| g.to_geo())
                    .and_then(|shape| shape.bounding_rect());
                if let Some(r) = extent {
                    let (lo, hi) = (r.min(), r.max());
                    let b = bounds.get_or_insert([lo.x, lo.y, hi.x, hi.y]);
                    b[0] = b[0].min(lo.x);
                    b[1] = b[1].min(lo.y);
                    b[2] = b[2].max(hi.x);
                    b[3] = b[3].max(hi.y);
                }
                feature
            })
            .collect();

        stats.kept = features.len();
        stats.bounds = bounds;
        (FeatureCollection::new(features), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundingBox, Geometry};
    use serde_json::{json, Map};

    fn building(id: Option<&str>, lon: f64, lat: f64, scores: Option<f64>) -> BuildingFeature {
        let mut properties = Map::new();
        if let Some(s) = scores {
            properties.insert("scores".to_string(), json!(s));
        }
        BuildingFeature {
            kind: "Feature".to_string(),
            id: id.map(|s| json!(s)),
            geometry: Some(Geometry {
                kind: "Polygon".to_string(),
                coordinates: json!([[
                    [lon, lat],
                    [lon + 0.001, lat],
                    [lon + 0.001, lat + 0.001],
                    [lon, lat]
                ]]),
            }),
            properties,
        }
    }

    fn fiji() -> Region {
        Region::from_bounds(BoundingBox::new(177.0, -20.0, -178.0, -15.0))
    }

    #[test]
    fn test_merge_idempotent() {
        let region = fiji();
        let batch = vec![
            building(Some("b.1"), 178.4, -18.1, Some(0.9)),
            building(Some("b.2"), -179.2, -16.5, None),
            building(None, 178.0, -17.0, Some(0.4)),
        ];

        let mut once = FeatureMerger::new(&region);
        once.extend(batch.clone());
        let (once, _) = once.finish();

        let mut twice = FeatureMerger::new(&region);
        twice.extend(batch.clone());
        twice.extend(batch);
        let (twice, stats) = twice.finish();

        assert_eq!(once, twice);
        assert_eq!(stats.duplicates, 3);
        assert_eq!(stats.kept, 3);
        assert_eq!(stats.scored, 2);
    }

    #[test]
    fn test_last_write_wins_keeps_slot() {
        let region = fiji();
        let mut merger = FeatureMerger::new(&region);
        merger.extend(vec![
            building(Some("b.1"), 178.4, -18.1, Some(0.1)),
            building(Some("b.2"), 178.5, -18.1, Some(0.2)),
            building(Some("b.1"), 178.4, -18.1, Some(0.7)),
        ]);
        let (collection, _) = merger.finish();

        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].id, Some(json!("b.1")));
        assert_eq!(collection.features[0].scores(), Some(0.7));
    }

    #[test]
    fn test_filters_outside_and_missing_geometry() {
        let region = fiji();
        let mut no_geometry = building(Some("b.3"), 0.0, 0.0, None);
        no_geometry.geometry = None;

        let mut merger = FeatureMerger::new(&region);
        merger.extend(vec![
            building(Some("b.1"), 178.4, -18.1, None),
            building(Some("far"), -150.0, -18.1, None),
            no_geometry,
        ]);
        let (collection, stats) = merger.finish();

        assert_eq!(collection.features.len(), 1);
        assert_eq!(stats.outside_region, 2);
        assert_eq!(stats.input, 3);
    }

    #[test]
    fn test_output_has_id_and_scores() {
        let region = fiji();
        let mut merger = FeatureMerger::new(&region);
        merger.extend(vec![building(None, 178.4, -18.1, None)]);
        let (collection, stats) = merger.finish();

        let feature = &collection.features[0];
        assert_eq!(feature.id, Some(json!("auto-1")));
        assert_eq!(feature.properties.get("scores"), Some(&Value::Null));

        let bounds = stats.bounds.unwrap();
        assert!((bounds[0] - 178.4).abs() < 1e-9);
        assert!((bounds[2] - 178.401).abs() < 1e-9);
    }

    #[test]
    fn test_string_and_numeric_ids_are_distinct() {
        let region = fiji();
        let mut numeric = building(None, 178.4, -18.1, None);
        numeric.id = Some(json!(42));
        let textual = building(Some("42"), 178.5, -18.1, None);

        let mut merger = FeatureMerger::new(&region);
        merger.extend(vec![numeric, textual]);
        let (collection, stats) = merger.finish();

        assert_eq!(collection.features.len(), 2);
        assert_eq!(stats.duplicates, 0);
        assert_eq!(collection.features[0].id, Some(json!(42)));
        assert_eq!(collection.features[1].id, Some(json!("42")));
    }

    #[test]
    fn test_auto_ids_skip_existing_ids() {
        let region = fiji();
        let mut merger = FeatureMerger::new(&region);
        merger.extend(vec![
            building(Some("auto-1"), 178.4, -18.1, None),
            building(None, 178.5, -18.1, None),
            building(None, 178.6, -18.1, None),
        ]);
        let (collection, _) = merger.finish();

        let ids: Vec<Value> = collection
            .features
            .iter()
            .map(|f| f.id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec![json!("auto-1"), json!("auto-2"), json!("auto-3")]);
    }
}
