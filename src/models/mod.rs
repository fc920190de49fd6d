//! # 数据模型模块
//!
//! 定义辐照损伤换算与建筑物提取两条流水线的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `damage/`, `wfs/` 和 `commands/` 使用
//! - 子模块: damage, feature, region

pub mod damage;
pub mod feature;
pub mod region;

pub use damage::{
    ConversionParameters, DamageMode, DamageResult, DddParameters, DddUnit, MaterialParameters,
    TallyRecord,
};
pub use feature::{BuildingFeature, FeatureBatch, FeatureCollection, Geometry};
pub use region::{BoundingBox, Region};
