use std::path::{Path, PathBuf};

/// Maps a logical pipe name to an OS path.
pub trait PathResolver: Send {
    fn resolve(&self, name: &str) -> PathBuf;
}

impl<R: PathResolver + ?Sized> PathResolver for Box<R> {
    fn resolve(&self, name: &str) -> PathBuf {
        (**self).resolve(name)
    }
}

/// Uses names as paths verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl PathResolver for IdentityResolver {
    fn resolve(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }
}

/// Resolves relative names under a data directory; absolute paths pass through.
#[derive(Debug, Clone)]
pub struct DataDirResolver {
    root: PathBuf,
}

impl DataDirResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PathResolver for DataDirResolver {
    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_names() {
        assert_eq!(IdentityResolver.resolve("video.fifo"), PathBuf::from("video.fifo"));
    }

    #[test]
    #[cfg(unix)]
    fn data_dir_joins_relative_and_keeps_absolute() {
        let resolver = DataDirResolver::new("/srv/data");
        assert_eq!(resolver.resolve("cam/left.fifo"), PathBuf::from("/srv/data/cam/left.fifo"));
        assert_eq!(resolver.resolve("/tmp/x.fifo"), PathBuf::from("/tmp/x.fifo"));
        assert_eq!(resolver.root(), Path::new("/srv/data"));
    }
}
