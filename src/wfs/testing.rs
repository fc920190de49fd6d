//! # 测试用数据源
//!
//! 以点集代替 WFS 服务器，供分块与 buildings 命令的测试使用。

use crate::error::{LabkitError, Result};
use crate::models::{BoundingBox, BuildingFeature, FeatureBatch, Geometry};
use crate::wfs::client::FeatureSource;

use serde_json::{json, Map};
use std::cell::RefCell;

/// 以点集模拟服务器：返回落在框内（左闭右开）的点，最多 cap 个
pub struct PointSource {
    pub points: Vec<[f64; 2]>,
    pub cap: usize,
    pub failing: Vec<BoundingBox>,
    pub calls: RefCell<Vec<BoundingBox>>,
}

impl PointSource {
    pub fn new(points: Vec<[f64; 2]>, cap: usize) -> Self {
        PointSource {
            points,
            cap,
            failing: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FeatureSource for PointSource {
    fn fetch(&self, _layer: &str, bbox: &BoundingBox) -> Result<FeatureBatch> {
        self.calls.borrow_mut().push(*bbox);
        if self.failing.contains(bbox) {
            return Err(LabkitError::FetchError {
                request: format!("GetFeature [{}]", bbox),
                attempts: 2,
                reason: "timed out".to_string(),
            });
        }

        let features = self
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                p[0] >= bbox.min_lon
                    && p[0] < bbox.max_lon
                    && p[1] >= bbox.min_lat
                    && p[1] < bbox.max_lat
            })
            .take(self.cap)
            .map(|(i, p)| BuildingFeature {
                kind: "Feature".to_string(),
                id: Some(json!(format!("pt.{}", i))),
                geometry: Some(Geometry {
                    kind: "Point".to_string(),
                    coordinates: json!([p[0], p[1]]),
                }),
                properties: Map::new(),
            })
            .collect();

        Ok(FeatureBatch {
            features,
            number_matched: None,
        })
    }
}
