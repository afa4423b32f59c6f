//! Reading and writing dumps on disk

use super::{DEFAULT_OUTPUT_DIR, DumpPart, ServerDump};
use crate::error::{FreezerError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Dump storage for one project
#[derive(Debug, Clone)]
pub struct DumpStore {
    root: PathBuf,
    project: String,
}

impl DumpStore {
    /// An empty `root` falls back to [`DEFAULT_OUTPUT_DIR`]
    pub fn new(root: impl AsRef<Path>, project: impl Into<String>) -> Self {
        let root = root.as_ref();
        let root = if root.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        } else {
            root.to_path_buf()
        };
        Self {
            root,
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// `{root}/{project}/{server}`
    pub fn server_path(&self, server_name: &str) -> PathBuf {
        self.root.join(&self.project).join(server_name)
    }

    /// `{root}/{project}/{server}/{dump_id}`
    pub fn dump_path(&self, server_name: &str, dump_id: &str) -> PathBuf {
        self.server_path(server_name).join(dump_id)
    }

    /// Create the dump directory if it is missing
    pub async fn ensure_dump_dir(&self, server_name: &str, dump_id: &str) -> Result<PathBuf> {
        let dir = self.dump_path(server_name, dump_id);
        if !fs::try_exists(&dir).await? {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created dump directory: {}", dir.display());
        }
        Ok(dir)
    }

    /// Write all parts of `dump`, returning the dump directory
    pub async fn save(&self, dump_id: &str, dump: &ServerDump) -> Result<PathBuf> {
        let server_name = dump.server.name.as_str();
        if server_name.is_empty() {
            return Err(FreezerError::InvalidDump("server name is empty".to_string()));
        }

        let dir = self.ensure_dump_dir(server_name, dump_id).await?;
        write_part(&dir, DumpPart::Server, &dump.server).await?;
        write_part(&dir, DumpPart::FloatingIps, &dump.floating_ips).await?;
        write_part(&dir, DumpPart::SshKeys, &dump.ssh_keys).await?;
        write_part(&dir, DumpPart::Snapshot, &dump.snapshot).await?;

        tracing::debug!("Saved dump {} to {}", dump_id, dir.display());
        Ok(dir)
    }

    /// Load a dump; missing part files load as empty values
    pub async fn load(&self, server_name: &str, dump_id: &str) -> Result<ServerDump> {
        let dir = self.dump_path(server_name, dump_id);
        if !fs::try_exists(&dir).await? {
            return Err(FreezerError::DumpNotFound(dir));
        }
        load_dir(&dir).await
    }

    /// Dump ids of a server, oldest first
    pub async fn list(&self, server_name: &str) -> Result<Vec<String>> {
        let path = self.server_path(server_name);
        let mut entries = match fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort_by(|a, b| compare_dump_ids(a, b));
        Ok(ids)
    }

    /// Id of the newest dump of a server
    pub async fn latest(&self, server_name: &str) -> Result<String> {
        let ids = self.list(server_name).await?;
        select_latest(&ids)
            .map(str::to_string)
            .ok_or_else(|| FreezerError::NoDumps(self.server_path(server_name)))
    }
}

/// Numeric max over `ids`; names that are not numbers are never selected
pub fn select_latest<S: AsRef<str>>(ids: &[S]) -> Option<&str> {
    ids.iter()
        .map(|id| id.as_ref())
        .filter_map(|id| id.parse::<u128>().ok().map(|n| (n, id)))
        .max_by_key(|(n, _)| *n)
        .map(|(_, id)| id)
}

fn compare_dump_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u128>(), b.parse::<u128>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

async fn load_dir(dir: &Path) -> Result<ServerDump> {
    Ok(ServerDump {
        server: read_part(dir, DumpPart::Server).await?,
        floating_ips: read_part(dir, DumpPart::FloatingIps).await?,
        ssh_keys: read_part(dir, DumpPart::SshKeys).await?,
        snapshot: read_part(dir, DumpPart::Snapshot).await?,
    })
}

async fn read_part<T: DeserializeOwned + Default>(dir: &Path, part: DumpPart) -> Result<T> {
    let path = dir.join(part.file_name());
    let content = match fs::read(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Dump part {} missing, using empty value", part);
            return Ok(T::default());
        }
        Err(source) => {
            return Err(FreezerError::DumpRead {
                part: part.name(),
                source,
            });
        }
    };

    serde_json::from_slice(&content).map_err(|source| FreezerError::DumpParse {
        part: part.name(),
        source,
    })
}

async fn write_part<T: Serialize>(dir: &Path, part: DumpPart, value: &T) -> Result<()> {
    let content = to_json_4(value)?;
    fs::write(dir.join(part.file_name()), content)
        .await
        .map_err(|source| FreezerError::DumpWrite {
            part: part.name(),
            source,
        })
}

/// Pretty JSON with a 4-space indent
fn to_json_4<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
