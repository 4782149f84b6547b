use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::error::{MapError, MapResult};

/// How `write_file` treats an existing target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteMode {
    pub overwrite: bool,
}

impl WriteMode {
    pub const OVERWRITE: Self = Self { overwrite: true };
    pub const CREATE_NEW: Self = Self { overwrite: false };
}

/// Disk access used by the engine. Paths are relative to the workspace root.
///
/// Multi-file writes are never atomic; callers order their writes so that a
/// failure leaves at worst extra files behind.
pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> MapResult<Vec<u8>>;

    /// Write `bytes`, creating parent directories. Fails with
    /// [`MapError::AlreadyExists`] when the target exists and
    /// `mode.overwrite` is false.
    fn write_file(&self, path: &Path, bytes: &[u8], mode: WriteMode) -> MapResult<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Directories exactly `depth` levels below `base`, relative to `base`,
    /// sorted. A missing `base` yields an empty list.
    fn list_directories(&self, base: &Path, depth: usize) -> MapResult<Vec<PathBuf>>;
}

/// [`FileSystem`] over a real directory.
#[derive(Clone, Debug)]
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSystem for DiskFileSystem {
    fn read_file(&self, path: &Path) -> MapResult<Vec<u8>> {
        match fs::read(self.absolute(path)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MapError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, path: &Path, bytes: &[u8], mode: WriteMode) -> MapResult<()> {
        let target = self.absolute(path);
        if !mode.overwrite && target.exists() {
            return Err(MapError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        trace!(path = %path.display(), size = bytes.len(), "wrote file");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.absolute(path).exists()
    }

    fn list_directories(&self, base: &Path, depth: usize) -> MapResult<Vec<PathBuf>> {
        let base_abs = self.absolute(base);
        if !base_abs.is_dir() {
            return Ok(Vec::new());
        }
        let mut dirs = Vec::new();
        for entry in WalkDir::new(&base_abs)
            .min_depth(depth)
            .max_depth(depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop"))
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&base_abs) {
                dirs.push(rel.to_path_buf());
            }
        }
        Ok(dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk() -> (tempfile::TempDir, DiskFileSystem) {
        let dir = tempfile::tempdir().unwrap();
        let fs = DiskFileSystem::new(dir.path());
        (dir, fs)
    }

    #[test]
    fn write_then_read() {
        let (_dir, fs) = disk();
        let path = Path::new("components/global/simple/impl.js");
        fs.write_file(path, b"module.exports = 1;", WriteMode::CREATE_NEW)
            .unwrap();
        assert!(fs.exists(path));
        assert_eq!(fs.read_file(path).unwrap(), b"module.exports = 1;");
    }

    #[test]
    fn create_new_refuses_existing_file() {
        let (_dir, fs) = disk();
        let path = Path::new("a.js");
        fs.write_file(path, b"1", WriteMode::CREATE_NEW).unwrap();
        assert!(matches!(
            fs.write_file(path, b"2", WriteMode::CREATE_NEW),
            Err(MapError::AlreadyExists(_))
        ));
        fs.write_file(path, b"2", WriteMode::OVERWRITE).unwrap();
        assert_eq!(fs.read_file(path).unwrap(), b"2");
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, fs) = disk();
        assert!(matches!(
            fs.read_file(Path::new("nope.js")),
            Err(MapError::FileNotFound(_))
        ));
    }

    #[test]
    fn lists_directories_at_depth() {
        let (_dir, fs) = disk();
        for p in ["components/bar/foo/impl.js", "components/bar/baz/impl.js", "components/x.js"] {
            fs.write_file(Path::new(p), b"", WriteMode::OVERWRITE).unwrap();
        }
        let dirs = fs.list_directories(Path::new("components"), 2).unwrap();
        assert_eq!(dirs, [PathBuf::from("bar/baz"), PathBuf::from("bar/foo")]);
        assert!(fs.list_directories(Path::new("missing"), 2).unwrap().is_empty());
    }
}
