//! # WFS 2.0 客户端
//!
//! 发送 GetCapabilities / GetFeature 请求，带超时和有限次重试。
//!
//! ## 功能
//! - `FeatureSource`: 分块抓取器所需的最小接口（按框取要素）
//! - `RetryPolicy`: 固定次数重试，退避时间逐次翻倍
//! - `WfsClient`: 基于 `reqwest` 阻塞客户端的实现
//!
//! ## 依赖关系
//! - 被 `wfs/tiler.rs`, `commands/buildings.rs` 使用
//! - 使用 `wfs/capabilities.rs` 解析图层列表
//! - 使用 `reqwest`, `serde_json`, `indicatif`

use crate::error::{LabkitError, Result};
use crate::models::{BoundingBox, FeatureBatch};
use crate::utils::output;
use crate::wfs::capabilities;

use indicatif::ProgressBar;
use reqwest::blocking::Client;
use std::time::Duration;

/// GlobalBuildingAtlas GeoServer
pub const DEFAULT_WFS_URL: &str = "https://tubvsig-so2sat-vm1.srv.mwn.de/geoserver/ows";

/// 按框取要素的数据源
pub trait FeatureSource {
    fn fetch(&self, layer: &str, bbox: &BoundingBox) -> Result<FeatureBatch>;
}

/// 重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 首次失败后的重试次数
    pub retries: u32,
    /// 第一次重试前的等待时间
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: 1,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// 执行操作，失败时按策略重试
    ///
    /// 重试提示在 `pb` 暂停绘制时输出。重试耗尽后返回 `FetchError`，
    /// 包含最后一次失败原因。
    pub fn run<T, F>(&self, request: &str, pb: &ProgressBar, mut op: F) -> Result<T>
    where
        F: FnMut() -> std::result::Result<T, String>,
    {
        let attempts = self.retries + 1;
        let mut last_err = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let wait = self.backoff * 2u32.saturating_pow(attempt - 1);
                pb.suspend(|| {
                    output::print_warning(&format!(
                        "{} failed ({}), retrying in {:.1}s",
                        request,
                        last_err,
                        wait.as_secs_f64()
                    ))
                });
                std::thread::sleep(wait);
            }

            match op() {
                Ok(value) => return Ok(value),
                Err(e) => last_err = e,
            }
        }

        Err(LabkitError::FetchError {
            request: request.to_string(),
            attempts,
            reason: last_err,
        })
    }
}

/// WFS 客户端配置
#[derive(Debug, Clone)]
pub struct WfsConfig {
    /// 服务端点
    pub url: String,
    /// 单次请求超时
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// 服务器单次返回上限
    pub page_cap: usize,
}

impl Default for WfsConfig {
    fn default() -> Self {
        WfsConfig {
            url: DEFAULT_WFS_URL.to_string(),
            timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
            page_cap: 100_000,
        }
    }
}

/// WFS 2.0 阻塞客户端
pub struct WfsClient {
    client: Client,
    config: WfsConfig,
    /// 当前显示中的进度条，重试提示经由它输出
    progress: ProgressBar,
}

impl WfsClient {
    pub fn new(config: WfsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LabkitError::FetchError {
                request: "HTTP client setup".to_string(),
                attempts: 0,
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            config,
            progress: ProgressBar::hidden(),
        })
    }

    pub fn config(&self) -> &WfsConfig {
        &self.config
    }

    /// 切换到新的进度条（spinner 或分块进度条）
    pub fn set_progress(&mut self, pb: &ProgressBar) {
        self.progress = pb.clone();
    }

    /// 发送 GET 请求并取回文本
    fn get_text(&self, params: &[(&str, String)]) -> std::result::Result<String, String> {
        self.client
            .get(&self.config.url)
            .query(params)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| e.to_string())
    }

    /// GetCapabilities：返回服务器提供的全部图层名
    pub fn layers(&self) -> Result<Vec<String>> {
        let params = [
            ("service", "WFS".to_string()),
            ("version", "2.0.0".to_string()),
            ("request", "GetCapabilities".to_string()),
        ];

        let body = self
            .config
            .retry
            .run("GetCapabilities", &self.progress, || self.get_text(&params))?;

        Ok(capabilities::parse_layer_names(&body))
    }

    /// 确定要查询的图层：显式指定优先，否则按名称自动检测
    pub fn resolve_layer(&self, explicit: Option<&str>) -> Result<String> {
        match explicit {
            Some(name) => Ok(name.to_string()),
            None => {
                let layers = self.layers()?;
                capabilities::select_building_layer(&layers)
            }
        }
    }
}

/// GetFeature 查询参数
pub fn feature_query(
    layer: &str,
    bbox: &BoundingBox,
    page_cap: usize,
) -> Vec<(&'static str, String)> {
    vec![
        ("service", "WFS".to_string()),
        ("version", "2.0.0".to_string()),
        ("request", "GetFeature".to_string()),
        ("typeNames", layer.to_string()),
        ("bbox", format!("{},EPSG:4326", bbox)),
        ("outputFormat", "application/json".to_string()),
        ("srsName", "EPSG:4326".to_string()),
        ("count", page_cap.to_string()),
    ]
}

impl FeatureSource for WfsClient {
    fn fetch(&self, layer: &str, bbox: &BoundingBox) -> Result<FeatureBatch> {
        let params = feature_query(layer, bbox, self.config.page_cap);
        let request = format!("GetFeature [{}]", bbox);

        self.config.retry.run(&request, &self.progress, || {
            let body = self.get_text(&params)?;
            serde_json::from_str::<FeatureBatch>(&body)
                .map_err(|e| format!("invalid GeoJSON response: {}", e))
        })
    }
}
