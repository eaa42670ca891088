//! Timers persisted as one small file per timestamp
//!
//! A timer `name` in directory `dir` is stored as two files, `{dir}/{name}_start`
//! and `{dir}/{name}_end`, each holding a single little-endian `i64`
//! nanosecond timestamp. Timers therefore survive process restarts, at the
//! cost of one open/close per operation.
//!
//! Starting or ending overwrites any file left from an earlier run.

use crate::clock::{Clock, SystemClock};
use crate::deltas::{elapsed_nanos, TimerDelta};
use crate::error::{Result, TimerError};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

const START_SUFFIX: &str = "_start";
const END_SUFFIX: &str = "_end";

/// Per-file timer store rooted at a directory
#[derive(Debug, Clone)]
pub struct FileTimers<C: Clock = SystemClock> {
    dir: PathBuf,
    clock: C,
}

impl FileTimers<SystemClock> {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::with_clock(dir, SystemClock)
    }
}

impl<C: Clock> FileTimers<C> {
    /// Open a store in an existing directory
    ///
    /// # Errors
    ///
    /// [`TimerError::InvalidDirectory`] if `dir` does not exist or is not a
    /// directory.
    pub fn with_clock<P: AsRef<Path>>(dir: P, clock: C) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(TimerError::InvalidDirectory(dir.to_path_buf()));
        }
        // Collecting components drops any trailing separator
        let dir: PathBuf = dir.components().collect();
        tracing::debug!("Using timer directory {}", dir.display());
        Ok(Self { dir, clock })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn start_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", name, START_SUFFIX))
    }

    pub fn end_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", name, END_SUFFIX))
    }

    /// Record the start time of `name`
    pub fn start(&self, name: &str) -> Result<()> {
        validate_file_name(name)?;
        write_timestamp(&self.start_path(name), self.clock.now_nanos())
    }

    /// Record the end time of `name`
    pub fn end(&self, name: &str) -> Result<()> {
        validate_file_name(name)?;
        write_timestamp(&self.end_path(name), self.clock.now_nanos())
    }

    /// Elapsed time between the stored start and end
    ///
    /// # Errors
    ///
    /// [`TimerError::Corrupt`] for a short file, [`TimerError::Overflow`] if
    /// the stored timestamps are too far apart for an `i64`.
    pub fn delta(&self, name: &str) -> Result<TimerDelta> {
        validate_file_name(name)?;
        let Some(start) = read_timestamp_if_exists(&self.start_path(name))? else {
            return Ok(TimerDelta::NeverStarted);
        };
        let Some(end) = read_timestamp_if_exists(&self.end_path(name))? else {
            return Ok(TimerDelta::NeverEnded);
        };
        TimerDelta::between(name, start, end)
    }

    /// Time elapsed since the stored start
    ///
    /// # Errors
    ///
    /// [`TimerError::NotRunning`] if no start file exists.
    pub fn poll(&self, name: &str) -> Result<i64> {
        validate_file_name(name)?;
        let start = read_timestamp_if_exists(&self.start_path(name))?
            .ok_or_else(|| TimerError::NotRunning(name.to_string()))?;
        elapsed_nanos(name, start, self.clock.now_nanos())
    }

    /// Remove a timer's files
    ///
    /// # Errors
    ///
    /// [`TimerError::NotRunning`] if no start file exists. A missing end
    /// file is not an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_file_name(name)?;
        let start = self.start_path(name);
        match fs::remove_file(&start) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TimerError::NotRunning(name.to_string()));
            }
            Err(e) => return Err(TimerError::io(start, e)),
        }
        remove_if_exists(&self.end_path(name))
    }

    /// Remove a timer's files, ignoring files that do not exist
    pub fn delete_if_exists(&self, name: &str) -> Result<()> {
        validate_file_name(name)?;
        remove_if_exists(&self.start_path(name))?;
        remove_if_exists(&self.end_path(name))
    }
}

/// Names become file names, so they may not contain separators or NUL
fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(TimerError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn write_timestamp(path: &Path, timestamp: i64) -> Result<()> {
    let mut file = File::create(path).map_err(|e| TimerError::io(path, e))?;
    file.write_all(&timestamp.to_le_bytes())
        .map_err(|e| TimerError::io(path, e))
}

fn read_timestamp_if_exists(path: &Path) -> Result<Option<i64>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TimerError::io(path, e)),
    };

    let mut buf = [0u8; 8];
    file.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TimerError::corrupt(
            path.display().to_string(),
            "timer file shorter than 8 bytes",
        ),
        _ => TimerError::io(path, e),
    })?;
    Ok(Some(i64::from_le_bytes(buf)))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TimerError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileTimers<ManualClock>, ManualClock) {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new(5_000);
        let timers = FileTimers::with_clock(dir.path(), clock.clone()).unwrap();
        (dir, timers, clock)
    }

    #[test]
    fn test_invalid_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            FileTimers::new(&missing),
            Err(TimerError::InvalidDirectory(_))
        ));

        let file = dir.path().join("plain");
        fs::write(&file, b"").unwrap();
        assert!(matches!(
            FileTimers::new(&file),
            Err(TimerError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let dir = TempDir::new().unwrap();
        let with_slash = format!("{}/", dir.path().display());
        let timers = FileTimers::new(&with_slash).unwrap();
        assert_eq!(timers.dir(), dir.path());
        assert_eq!(timers.start_path("t"), dir.path().join("t_start"));
        assert_eq!(timers.end_path("t"), dir.path().join("t_end"));
    }

    #[test]
    fn test_start_end_delta() {
        let (_dir, timers, clock) = store();
        assert_eq!(timers.delta("job").unwrap(), TimerDelta::NeverStarted);

        timers.start("job").unwrap();
        assert_eq!(timers.delta("job").unwrap(), TimerDelta::NeverEnded);

        clock.advance(123);
        timers.end("job").unwrap();
        assert_eq!(timers.delta("job").unwrap(), TimerDelta::Elapsed(123));
    }

    #[test]
    fn test_file_contents_are_little_endian_i64() {
        let (_dir, timers, _) = store();
        timers.start("job").unwrap();
        let bytes = fs::read(timers.start_path("job")).unwrap();
        assert_eq!(bytes, 5_000i64.to_le_bytes());
    }

    #[test]
    fn test_restart_overwrites() {
        let (_dir, timers, clock) = store();
        timers.start("job").unwrap();
        clock.advance(10);
        timers.start("job").unwrap();
        clock.advance(5);
        assert_eq!(timers.poll("job").unwrap(), 5);
    }

    #[test]
    fn test_survives_new_store_instance() {
        let (dir, timers, clock) = store();
        timers.start("job").unwrap();
        drop(timers);

        clock.advance(40);
        let reopened = FileTimers::with_clock(dir.path(), clock.clone()).unwrap();
        assert_eq!(reopened.poll("job").unwrap(), 40);
    }

    #[test]
    fn test_poll_without_start() {
        let (_dir, timers, _) = store();
        assert!(matches!(timers.poll("job"), Err(TimerError::NotRunning(_))));
    }

    #[test]
    fn test_short_file_is_corrupt() {
        let (_dir, timers, _) = store();
        fs::write(timers.start_path("job"), [1u8, 2, 3]).unwrap();
        assert!(matches!(timers.delta("job"), Err(TimerError::Corrupt { .. })));
    }

    #[test]
    fn test_extreme_timestamps_overflow_is_error() {
        let (_dir, timers, _) = store();
        fs::write(timers.start_path("job"), i64::MIN.to_le_bytes()).unwrap();
        fs::write(timers.end_path("job"), i64::MAX.to_le_bytes()).unwrap();
        assert!(matches!(timers.delta("job"), Err(TimerError::Overflow(_))));
        assert!(matches!(timers.poll("job"), Err(TimerError::Overflow(_))));
    }

    #[test]
    fn test_delete() {
        let (_dir, timers, _) = store();
        assert!(matches!(timers.delete("job"), Err(TimerError::NotRunning(_))));

        timers.start("job").unwrap();
        timers.end("job").unwrap();
        timers.delete("job").unwrap();
        assert!(!timers.start_path("job").exists());
        assert!(!timers.end_path("job").exists());

        timers.start("job").unwrap();
        timers.delete("job").unwrap();
    }

    #[test]
    fn test_delete_if_exists_never_fails_on_absence() {
        let (_dir, timers, _) = store();
        timers.delete_if_exists("job").unwrap();
        timers.end("job").unwrap();
        timers.delete_if_exists("job").unwrap();
        assert!(!timers.end_path("job").exists());
    }

    #[test]
    fn test_rejects_path_like_names() {
        let (_dir, timers, _) = store();
        assert!(matches!(
            timers.start("../escape"),
            Err(TimerError::InvalidName(_))
        ));
        assert!(matches!(timers.start(""), Err(TimerError::InvalidName(_))));
    }
}
