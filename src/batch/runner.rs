//! # 批量执行器
//!
//! 并行执行批量处理任务。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//! - 单个文件失败不影响其他文件，错误汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/buildings.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::Result;
use crate::utils::progress;

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 批量处理结果
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功的输出（与输入顺序一致）
    pub outputs: Vec<(PathBuf, T)>,
    /// 失败详情 (文件路径, 错误信息)
    pub failures: Vec<(String, String)>,
}

impl<T> BatchResult<T> {
    /// 总处理数量
    pub fn total(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器（0 = 全部 CPU 核心）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: &[PathBuf], processor: F) -> BatchResult<T>
    where
        T: Send,
        F: Fn(&Path) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Loading");

        let work = || -> Vec<(PathBuf, Result<T>)> {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file.as_path());
                    pb.inc(1);
                    (file.clone(), result)
                })
                .collect()
        };

        // 线程池创建失败时退回全局池
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(_) => work(),
        };

        pb.finish_and_clear();

        let mut batch = BatchResult {
            outputs: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (path, result) in results {
            match result {
                Ok(value) => batch.outputs.push((path, value)),
                Err(e) => batch.failures.push((path.display().to_string(), e.to_string())),
            }
        }

        batch
    }
}
