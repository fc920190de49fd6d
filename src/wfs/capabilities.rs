//! # GetCapabilities 文档解析
//!
//! 从 WFS 2.0 能力文档中提取 `FeatureType/Name`，并按名称启发式挑选建筑图层。
//!
//! ## 依赖关系
//! - 被 `wfs/client.rs` 调用
//! - 使用 `regex`

use crate::error::{LabkitError, Result};
use regex::Regex;

/// 提取所有 FeatureType 的名称（忽略命名空间前缀）
pub fn parse_layer_names(xml: &str) -> Vec<String> {
    let feature_type_re =
        Regex::new(r"(?s)<(?:[\w.-]+:)?FeatureType\b[^>]*>(.*?)</(?:[\w.-]+:)?FeatureType>")
            .unwrap();
    let name_re = Regex::new(r"(?s)<(?:[\w.-]+:)?Name\b[^>]*>\s*(.*?)\s*</(?:[\w.-]+:)?Name>")
        .unwrap();

    feature_type_re
        .captures_iter(xml)
        .filter_map(|ft| {
            let body = ft.get(1)?.as_str();
            let name = name_re.captures(body)?.get(1)?.as_str();
            if name.is_empty() {
                None
            } else {
                Some(unescape_xml(name))
            }
        })
        .collect()
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// 建筑图层名称启发式（不区分大小写）
const BUILDING_LAYER_PATTERN: &str = r"(?i)building|lod";

/// 选取第一个名称像建筑图层的图层
pub fn select_building_layer(layers: &[String]) -> Result<String> {
    let building_re = Regex::new(BUILDING_LAYER_PATTERN).unwrap();
    layers
        .iter()
        .find(|name| building_re.is_match(name))
        .cloned()
        .ok_or(LabkitError::LayerNotFound {
            available: layers.len(),
        })
}
