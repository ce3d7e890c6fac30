use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::error;
use rocket::serde::json::serde_json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::common::{ContestPolicy, Principal};

use super::chain::{AuditDump, AuditRecord};

/// Durable storage for committed audit records.
pub trait AuditSink: Send + Sync {
    /// Append one record. The record counts as committed only once this
    /// returns `Ok`.
    fn append(&mut self, record: &AuditRecord) -> io::Result<()>;

    /// Whether a failed [`append`](Self::append) is known to have left
    /// nothing behind. If not, the log refuses to commit anything after the
    /// first failure.
    fn discards_failed_appends(&self) -> bool {
        false
    }
}

/// Keeps nothing beyond the in-memory log.
#[derive(Debug, Default, Copy, Clone)]
pub struct MemorySink;

impl AuditSink for MemorySink {
    fn append(&mut self, _record: &AuditRecord) -> io::Result<()> {
        Ok(())
    }

    fn discards_failed_appends(&self) -> bool {
        true
    }
}

/// The first line of a JSON-lines audit file.
///
/// Replay re-executes records under these settings rather than whatever is
/// configured at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogHeader {
    pub genesis_owner: Principal,
    pub policy: ContestPolicy,
}

/// Appends one JSON document per line to a file, syncing after each record.
///
/// A failed append is truncated away again. If that fails too, the file is
/// in an unknown state and every later append is refused.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    file: File,
    poisoned: bool,
    #[cfg(test)]
    fail_next_sync: Arc<AtomicBool>,
}

impl JsonLinesSink {
    /// Open `path` for appending, writing `header` first if the file is new
    /// or empty.
    pub fn open(path: impl AsRef<Path>, header: &LogHeader) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() == 0 {
            let mut line = serde_json::to_vec(header)?;
            line.push(b'\n');
            file.write_all(&line)?;
            file.sync_data()?;
        }
        Ok(Self {
            path,
            file,
            poisoned: false,
            #[cfg(test)]
            fail_next_sync: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set to make the next append fail after its bytes were written.
    #[cfg(test)]
    pub(crate) fn sync_failure(&self) -> Arc<AtomicBool> {
        self.fail_next_sync.clone()
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.file.write_all(line)?;
        #[cfg(test)]
        if self.fail_next_sync.swap(false, Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "sync failed"));
        }
        self.file.sync_data()
    }
}

impl AuditSink for JsonLinesSink {
    fn append(&mut self, record: &AuditRecord) -> io::Result<()> {
        if self.poisoned {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} could not be rolled back", self.path.display()),
            ));
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let committed_len = self.file.metadata()?.len();
        let result = self.write_line(&line);
        if result.is_err() {
            if let Err(e) = self
                .file
                .set_len(committed_len)
                .and_then(|()| self.file.sync_data())
            {
                error!(
                    "Failed to truncate {} back to {committed_len} bytes: {e}",
                    self.path.display()
                );
                self.poisoned = true;
            }
        }
        result
    }

    fn discards_failed_appends(&self) -> bool {
        !self.poisoned
    }
}

/// Load a JSON-lines audit file: its [`LogHeader`] and every record after it.
/// A missing or empty file yields `None`.
pub fn load_log(path: impl AsRef<Path>) -> Result<Option<AuditDump>> {
    let file = match File::open(path.as_ref()) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut header: Option<LogHeader> = None;
    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let corrupt = |e: serde_json::Error| Error::Corrupt(format!("line {}: {e}", index + 1));
        if header.is_none() {
            header = Some(serde_json::from_str(&line).map_err(corrupt)?);
        } else {
            records.push(serde_json::from_str(&line).map_err(corrupt)?);
        }
    }

    Ok(header.map(|header| AuditDump {
        genesis_owner: header.genesis_owner,
        policy: header.policy,
        records,
    }))
}
