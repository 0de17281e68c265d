use serde::{Deserialize, Serialize};

use crate::engine::{Move, TurnEvent};

/// One accepted move, as written to the move journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub game_id: String,
    /// Store version the move produced.
    pub version: u64,
    pub player_id: String,
    #[serde(rename = "move")]
    pub mv: Move,
    #[serde(default)]
    pub events: Vec<TurnEvent>,
    /// RFC3339 timestamp; filled in on write when missing.
    #[serde(default)]
    pub ts: Option<String>,
}

impl MoveRecord {
    pub fn new(game_id: impl Into<String>, version: u64, mv: Move, events: Vec<TurnEvent>) -> Self {
        Self {
            game_id: game_id.into(),
            version,
            player_id: mv.player_id().to_string(),
            mv,
            events,
            ts: None,
        }
    }
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Append-only JSONL journal of accepted moves.
pub struct MoveJournal {
    writer: BufWriter<std::fs::File>,
    written: u64,
}

impl MoveJournal {
    /// Opens `path` for appending, creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(f),
            written: 0,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write(&mut self, record: &MoveRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

/// Reads every record from a journal file, skipping blank lines.
pub fn read_journal<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<MoveRecord>> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line).map_err(std::io::Error::other)?);
    }
    Ok(records)
}
