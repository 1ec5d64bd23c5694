//! Event journal - append-only audit log
//!
//! Records every emitted [`WalletEvent`] as one JSON line for complete
//! auditability.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::events::WalletEvent;

pub struct EventJournal {
    writer: BufWriter<File>,
    entry_count: u64,
}

impl EventJournal {
    /// Open (or create) the journal at `path`, appending to existing content
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            entry_count: 0,
        })
    }

    /// Write a single event
    pub fn append(&mut self, event: &WalletEvent) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.entry_count += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Number of events written by this handle
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_append_json_lines() {
        let path = format!("target/test_journal_{}.jsonl", std::process::id());
        let _ = fs::remove_file(&path);

        let mut journal = EventJournal::open(&path).unwrap();
        journal
            .append(&WalletEvent::ApproverAdded {
                seq: 1,
                approver: 7,
            })
            .unwrap();
        journal
            .append(&WalletEvent::Deposit {
                seq: 2,
                token: 1,
                investor: 1001,
                amount: 100,
            })
            .unwrap();
        journal.flush().unwrap();
        assert_eq!(journal.entry_count(), 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<WalletEvent> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].seq(), 2);

        let _ = fs::remove_file(&path);
    }
}
