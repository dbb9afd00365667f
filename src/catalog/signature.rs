//! Source file identity
//!
//! A signature is the byte size plus modification time of the source file. It is
//! cheap to compute (one metadata call) and changes whenever the file is rewritten.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, WarehouseError};

/// Size and modification time of a catalog source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSignature {
    pub byte_size: u64,
    /// Whole seconds since the Unix epoch, floored (negative before it)
    pub modified_secs: i64,
    /// Nanoseconds past `modified_secs`, always forward in time
    pub modified_nanos: u32,
}

impl SourceSignature {
    pub fn new(byte_size: u64, modified_secs: i64, modified_nanos: u32) -> Self {
        Self {
            byte_size,
            modified_secs,
            modified_nanos,
        }
    }
}

impl std::fmt::Display for SourceSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} bytes @ {}.{:09}",
            self.byte_size, self.modified_secs, self.modified_nanos
        )
    }
}

/// Read the signature of `path` from filesystem metadata
pub fn compute_signature(path: &Path) -> Result<SourceSignature> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WarehouseError::SourceNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(WarehouseError::Io(e)),
    };

    if !metadata.is_file() {
        return Err(WarehouseError::SourceNotFound(path.to_path_buf()));
    }

    let (secs, nanos) = epoch_offset(metadata.modified()?);
    Ok(SourceSignature::new(metadata.len(), secs, nanos))
}

/// `(secs, nanos)` since the epoch with floor semantics, so `-0.5s` is `(-1, 500_000_000)`
fn epoch_offset(time: SystemTime) -> (i64, u32) {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
        Err(e) => {
            let before = e.duration();
            let secs = -(before.as_secs() as i64);
            match before.subsec_nanos() {
                0 => (secs, 0),
                nanos => (secs - 1, 1_000_000_000 - nanos),
            }
        }
    }
}

/// A cached signature is valid only if it matches the current one exactly
pub fn is_valid(cached: &SourceSignature, current: &SourceSignature) -> bool {
    cached == current
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = compute_signature(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, WarehouseError::SourceNotFound(_)));
    }

    #[test]
    fn test_directory_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = compute_signature(dir.path()).unwrap_err();
        assert!(matches!(err, WarehouseError::SourceNotFound(_)));
    }

    #[test]
    fn test_signature_tracks_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        fs::write(&path, "id,price\n").unwrap();
        let before = compute_signature(&path).unwrap();
        assert_eq!(before.byte_size, 9);
        assert!(is_valid(&before, &compute_signature(&path).unwrap()));

        let mut f = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "1,2.50").unwrap();
        drop(f);

        let after = compute_signature(&path).unwrap();
        assert!(!is_valid(&before, &after));
    }

    #[test]
    fn test_mtime_difference_invalidates() {
        let a = SourceSignature::new(100, 1_700_000_000, 0);
        let b = SourceSignature::new(100, 1_700_000_001, 0);
        assert!(!is_valid(&a, &b));
        assert!(is_valid(&a, &a.clone()));
    }

    #[test]
    fn test_epoch_offset_floors_pre_epoch_times() {
        use std::time::Duration;

        let half = Duration::from_millis(500);
        assert_eq!(epoch_offset(UNIX_EPOCH + half), (0, 500_000_000));
        assert_eq!(epoch_offset(UNIX_EPOCH - half), (-1, 500_000_000));
        assert_eq!(epoch_offset(UNIX_EPOCH - Duration::from_secs(3)), (-3, 0));
        assert_eq!(
            epoch_offset(UNIX_EPOCH - Duration::new(2, 250_000_000)),
            (-3, 750_000_000)
        );
    }

    #[test]
    fn test_mtimes_either_side_of_epoch_differ() {
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let half = Duration::from_millis(500);
        let after = dir.path().join("after.csv");
        let before = dir.path().join("before.csv");
        fs::write(&after, "x").unwrap();
        fs::write(&before, "x").unwrap();
        let set = |path: &Path, time: SystemTime| {
            fs::File::options()
                .write(true)
                .open(path)
                .and_then(|f| f.set_modified(time))
        };
        set(&after, UNIX_EPOCH + half).unwrap();
        // Some filesystems cannot store pre-epoch times; the offset test above covers them
        if set(&before, UNIX_EPOCH - half).is_err() {
            return;
        }

        let a = compute_signature(&after).unwrap();
        let b = compute_signature(&before).unwrap();
        assert!(!is_valid(&a, &b), "{a} and {b} must not match");
    }
}
