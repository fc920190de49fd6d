//! # GeoJSON 要素数据模型
//!
//! 建筑物多边形要素、单次请求返回的要素批次以及输出用的 FeatureCollection。
//!
//! 几何坐标保留为原始 JSON，只在过滤时转为 `geo` 几何，
//! 以免丢失服务器返回的 Z 值或其他字段。
//!
//! ## 依赖关系
//! - 被 `parsers/geojson.rs`, `wfs/` 使用
//! - 使用 `serde_json`, `geo`

use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GeoJSON 几何对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

impl Geometry {
    /// 转为 `geo` 几何（只取前两维）
    ///
    /// 坐标不完整或类型不支持（如 GeometryCollection）时返回 `None`。
    pub fn to_geo(&self) -> Option<geo::Geometry<f64>> {
        let c = &self.coordinates;
        let shape = match self.kind.as_str() {
            "Point" => geo::Geometry::Point(Point::from(parse_coord(c)?)),
            "MultiPoint" => geo::Geometry::MultiPoint(MultiPoint::new(
                parse_coords(c)?.into_iter().map(Point::from).collect(),
            )),
            "LineString" => geo::Geometry::LineString(LineString::new(parse_coords(c)?)),
            "MultiLineString" => geo::Geometry::MultiLineString(MultiLineString::new(each(
                c,
                |line| parse_coords(line).map(LineString::new),
            )?)),
            "Polygon" => geo::Geometry::Polygon(parse_polygon(c)?),
            "MultiPolygon" => {
                geo::Geometry::MultiPolygon(MultiPolygon::new(each(c, parse_polygon)?))
            }
            _ => return None,
        };
        Some(shape)
    }
}

fn parse_coord(value: &Value) -> Option<Coord<f64>> {
    let arr = value.as_array()?;
    let x = arr.first()?.as_f64()?;
    let y = arr.get(1)?.as_f64()?;
    Some(Coord { x, y })
}

fn parse_coords(value: &Value) -> Option<Vec<Coord<f64>>> {
    each(value, parse_coord)
}

fn each<T, F>(value: &Value, f: F) -> Option<Vec<T>>
where
    F: Fn(&Value) -> Option<T>,
{
    value.as_array()?.iter().map(f).collect()
}

/// [外环, 内环...]
fn parse_polygon(value: &Value) -> Option<Polygon<f64>> {
    let mut rings = each(value, |ring| parse_coords(ring).map(LineString::new))?.into_iter();
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

/// 建筑物要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingFeature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 字符串 id 的去重键
pub fn string_id_key(id: &str) -> String {
    format!("s:{}", id)
}

impl BuildingFeature {
    /// 去重键，带 JSON 类型前缀：字符串 `"42"` 与数值 `42` 是不同的 id
    pub fn id_key(&self) -> Option<String> {
        match &self.id {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(string_id_key(s)),
            Some(Value::Number(n)) => Some(format!("n:{}", n)),
            Some(other) => Some(format!("j:{}", other)),
        }
    }

    /// 建筑置信度分数
    pub fn scores(&self) -> Option<f64> {
        self.properties.get("scores").and_then(Value::as_f64)
    }
}

/// 单次 GetFeature 请求（或单个文件）返回的要素批次
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBatch {
    #[serde(default)]
    pub features: Vec<BuildingFeature>,
    /// 服务器报告的匹配总数（可能为 "unknown"）
    #[serde(
        default,
        rename = "numberMatched",
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_matched: Option<u64>,
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_u64()))
}

impl FeatureBatch {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// 批次是否被服务器截断
    pub fn is_truncated(&self, page_cap: usize) -> bool {
        self.len() >= page_cap
            || self
                .number_matched
                .is_some_and(|matched| matched > self.len() as u64)
    }
}

/// 输出用的 FeatureCollection（WGS84 / CRS84）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub crs: Value,
    pub features: Vec<BuildingFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<BuildingFeature>) -> Self {
        FeatureCollection {
            kind: "FeatureCollection".to_string(),
            crs: serde_json::json!({
                "type": "name",
                "properties": { "name": "urn:ogc:def:crs:OGC:1.3:CRS84" }
            }),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wfs_batch() {
        let json = r#"{
            "type": "FeatureCollection",
            "numberMatched": 2,
            "numberReturned": 2,
            "features": [
                {"type": "Feature", "id": "lod1.17",
                 "geometry": {"type": "Polygon",
                    "coordinates": [[[178.4,-18.1,0],[178.41,-18.1,0],
                                     [178.41,-18.09,0],[178.4,-18.1,0]]]},
                 "properties": {"scores": 0.87, "height": 6.5}},
                {"type": "Feature", "id": 42, "geometry": null, "properties": null}
            ]
        }"#;
        let batch: FeatureBatch = serde_json::from_str(json).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.number_matched, Some(2));
        assert_eq!(batch.features[0].id_key(), Some("s:lod1.17".to_string()));
        assert_eq!(batch.features[0].scores(), Some(0.87));
        assert_eq!(batch.features[1].id_key(), Some("n:42".to_string()));
        assert!(batch.features[1].geometry.is_none());
        assert!(batch.features[1].properties.is_empty());

        let shape = batch.features[0].geometry.as_ref().unwrap().to_geo();
        match shape {
            Some(geo::Geometry::Polygon(polygon)) => {
                assert_eq!(polygon.exterior().0.len(), 4);
                assert_eq!(polygon.exterior().0[1], Coord { x: 178.41, y: -18.1 });
                assert!(polygon.interiors().is_empty());
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_number_matched() {
        let json = r#"{"numberMatched": "unknown", "features": []}"#;
        let batch: FeatureBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.number_matched, None);
        assert!(!batch.is_truncated(100));
    }

    #[test]
    fn test_truncation_signals() {
        let feature = BuildingFeature {
            kind: "Feature".to_string(),
            id: None,
            geometry: None,
            properties: Map::new(),
        };
        let mut batch = FeatureBatch {
            features: vec![feature; 3],
            number_matched: None,
        };
        assert!(batch.is_truncated(3));
        assert!(!batch.is_truncated(4));

        batch.number_matched = Some(10);
        assert!(batch.is_truncated(4));
    }

    #[test]
    fn test_multipolygon_rings() {
        let geometry = Geometry {
            kind: "MultiPolygon".to_string(),
            coordinates: serde_json::json!([
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
            ]),
        };
        match geometry.to_geo() {
            Some(geo::Geometry::MultiPolygon(polygons)) => assert_eq!(polygons.0.len(), 2),
            other => panic!("expected multipolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_coordinates() {
        let broken = Geometry {
            kind: "Polygon".to_string(),
            coordinates: serde_json::json!([[[0.0, 0.0], [1.0]]]),
        };
        assert!(broken.to_geo().is_none());

        let missing = Geometry {
            kind: "Polygon".to_string(),
            coordinates: Value::Null,
        };
        assert!(missing.to_geo().is_none());
    }
}
