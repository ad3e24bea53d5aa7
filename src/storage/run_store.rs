//! Timestamped run directories and per-site artifact files

use crate::storage::{ArtifactKind, StorageError, StorageResult};
use crate::url::{decode_site_key, encode_site_key};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// ISO-8601 with `:` and `.` replaced by `-`, so ids sort chronologically
const RUN_ID_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// Upper bound on 1 ms bumps when the clock hands out an id that is not new
const MAX_ID_BUMPS: u32 = 1000;

/// Formats a timestamp as a filesystem-safe run id
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use seo_sweep::storage::format_run_id;
///
/// let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
/// assert_eq!(format_run_id(ts), "2024-05-01T12-30-45-000Z");
/// ```
pub fn format_run_id(timestamp: DateTime<Utc>) -> String {
    timestamp.format(RUN_ID_FORMAT).to_string()
}

fn parse_run_id(id: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(id, RUN_ID_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Owner of the reports root directory
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    /// Creates a store rooted at `root` (nothing is created on disk yet)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the reports root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the reports root (if needed) and a new run directory
    ///
    /// The new run id always sorts strictly after every existing run id.
    /// Other subdirectories of the root (e.g. `archive/`) are ignored here.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CreateDir` if either directory cannot be created.
    /// Callers treat this as fatal for the whole invocation.
    pub fn create_run(&self) -> StorageResult<Run> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::CreateDir {
            path: self.root.clone(),
            source,
        })?;

        // Only timestamped run directories take part in ordering
        let latest_id = self
            .list_runs()?
            .into_iter()
            .rev()
            .map(|run| run.id)
            .find(|id| parse_run_id(id).is_some());
        let mut stamp = Utc::now();
        if let Some(latest) = latest_id.as_deref().and_then(parse_run_id) {
            if stamp <= latest {
                stamp = latest + Duration::milliseconds(1);
            }
        }

        let mut bumps = 0;
        loop {
            let id = format_run_id(stamp);
            let newer = latest_id.as_deref().map_or(true, |latest| id.as_str() > latest);
            if newer {
                let path = self.root.join(&id);
                match fs::create_dir(&path) {
                    Ok(()) => {
                        tracing::info!("Created run directory {}", path.display());
                        return Ok(Run { id, path });
                    }
                    Err(e) if e.kind() == ErrorKind::AlreadyExists && bumps < MAX_ID_BUMPS => {}
                    Err(source) => return Err(StorageError::CreateDir { path, source }),
                }
            } else if bumps >= MAX_ID_BUMPS {
                return Err(StorageError::CreateDir {
                    path: self.root.join(&id),
                    source: std::io::Error::new(
                        ErrorKind::AlreadyExists,
                        "could not find a run id newer than the latest run",
                    ),
                });
            }
            stamp = stamp + Duration::milliseconds(1);
            bumps += 1;
        }
    }

    /// Returns every run directory, oldest first
    pub fn list_runs(&self) -> StorageResult<Vec<Run>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut runs: Vec<Run> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .map(|id| Run {
                path: self.root.join(&id),
                id,
            })
            .collect();
        runs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(runs)
    }

    /// Returns the most recent run, or `None` if the root is missing or empty
    pub fn latest_run(&self) -> StorageResult<Option<Run>> {
        Ok(self.list_runs()?.pop())
    }
}

/// A per-site artifact found in a run directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteArtifact {
    /// Decoded site string
    pub site: String,
    /// Artifact file name (encoded key plus suffix)
    pub file_name: String,
    /// Full path to the artifact
    pub path: PathBuf,
}

/// One timestamped run directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    id: String,
    path: PathBuf,
}

impl Run {
    /// Opens an existing directory as a run (used for explicit run paths)
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { id, path }
    }

    /// Opens a user-supplied run directory, made absolute so `runPath` does
    /// not depend on the working directory
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Read` if the path does not exist.
    pub fn resolve(path: &Path) -> StorageResult<Self> {
        let absolute = fs::canonicalize(path).map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::open(absolute))
    }

    /// Returns the run id (directory name)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the run directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of a per-site artifact
    pub fn artifact_path(&self, site: &str, kind: ArtifactKind) -> PathBuf {
        self.path
            .join(format!("{}{}", encode_site_key(site), kind.suffix()))
    }

    /// Writes a per-site JSON artifact (pretty-printed, newline-terminated)
    ///
    /// Writing a results artifact removes any error artifact for the same site
    /// and vice versa. Rewriting an artifact replaces it.
    pub fn write_site_artifact<T: Serialize + ?Sized>(
        &self,
        site: &str,
        kind: ArtifactKind,
        payload: &T,
    ) -> StorageResult<PathBuf> {
        let json = serde_json::to_string_pretty(payload)?;
        self.write_site_bytes(site, kind, json.as_bytes())
    }

    /// Writes a per-site text artifact (newline-terminated)
    pub fn write_site_text(
        &self,
        site: &str,
        kind: ArtifactKind,
        text: &str,
    ) -> StorageResult<PathBuf> {
        self.write_site_bytes(site, kind, text.as_bytes())
    }

    fn write_site_bytes(
        &self,
        site: &str,
        kind: ArtifactKind,
        body: &[u8],
    ) -> StorageResult<PathBuf> {
        let path = self.artifact_path(site, kind);
        write_atomic(&path, body, true)?;
        // The opposite artifact goes only once the new one is in place
        if let Some(opposite) = kind.exclusive_with() {
            self.remove_site_artifact(site, opposite)?;
        }
        Ok(path)
    }

    /// Removes a per-site artifact; returns whether one existed
    pub fn remove_site_artifact(&self, site: &str, kind: ArtifactKind) -> StorageResult<bool> {
        let path = self.artifact_path(site, kind);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Write { path, source }),
        }
    }

    /// Lists per-site artifacts of one kind, sorted by file name
    pub fn site_artifacts(&self, kind: ArtifactKind) -> StorageResult<Vec<SiteArtifact>> {
        let entries = fs::read_dir(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut artifacts: Vec<SiteArtifact> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let file_name = entry.file_name().into_string().ok()?;
                let key = file_name.strip_suffix(kind.suffix())?;
                Some(SiteArtifact {
                    site: decode_site_key(key),
                    path: entry.path(),
                    file_name,
                })
            })
            .collect();
        artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(artifacts)
    }

    /// Writes a run-level JSON file (pretty-printed, newline-terminated)
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        payload: &T,
    ) -> StorageResult<PathBuf> {
        let json = serde_json::to_string_pretty(payload)?;
        let path = self.path.join(name);
        write_atomic(&path, json.as_bytes(), true)?;
        Ok(path)
    }

    /// Writes a run-level text file as-is
    pub fn write_text(&self, name: &str, text: &str) -> StorageResult<PathBuf> {
        let path = self.path.join(name);
        write_atomic(&path, text.as_bytes(), false)?;
        Ok(path)
    }

    /// Appends one line to a run-level log file
    pub fn append_line(&self, name: &str, line: &str) -> StorageResult<()> {
        let path = self.path.join(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;
        writeln!(file, "{}", line).map_err(|source| StorageError::Write { path, source })
    }
}

/// Writes through a sibling temp file and renames it into place
fn write_atomic(path: &Path, body: &[u8], newline: bool) -> StorageResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(body)?;
        if newline && !body.ends_with(b"\n") {
            file.write_all(b"\n")?;
        }
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    result.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        StorageError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}
