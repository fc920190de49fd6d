//! # 输出文件写入
//!
//! 先写入同目录下的 `<name>.partial`，全部写完并刷新后再重命名到目标路径。
//! 写入过程中任何错误都会删除临时文件，目标路径保持原状。
//!
//! ## 依赖关系
//! - 被 `parsers/geojson.rs`, `damage/export.rs` 使用

use crate::error::{LabkitError, Result};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 原子地写出文件，`write` 负责写入全部内容
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp_path = partial_path(path);
    let write_error = |e: std::io::Error| LabkitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    };

    let result = (|| -> Result<()> {
        let file = File::create(&tmp_path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush().map_err(write_error)?;
        drop(writer);
        fs::rename(&tmp_path, path).map_err(write_error)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// `<name>.partial`
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("labkit-fs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let path = scratch("keep.csv");
        fs::write(&path, "old\n").unwrap();

        let err = write_atomic(&path, |w| {
            w.write_all(b"half a row,").unwrap();
            Err(LabkitError::validation("--cells", "stopped mid-write"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), "ValidationError");
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\n");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_failed_write_creates_nothing() {
        let path = scratch("never.csv");
        let _ = fs::remove_file(&path);

        let _ = write_atomic(&path, |_| Err(LabkitError::validation("--fluence", "rejected")));

        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_successful_write_replaces_target() {
        let path = scratch("replace.csv");
        fs::write(&path, "old\n").unwrap();

        write_atomic(&path, |w| {
            w.write_all(b"new\n").map_err(|e| LabkitError::FileWriteError {
                path: "replace.csv".to_string(),
                source: e,
            })
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!partial_path(&path).exists());
    }
}
