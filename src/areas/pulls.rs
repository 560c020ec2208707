//! Pull-request records of one repository
//!
//! Each record lives at `pulls/<number>.json`. Numbers come from a `SEQ`
//! counter file incremented under an exclusive lock, so two concurrently
//! opened pull requests can never share a number even when their branch
//! heads race.

use crate::artifacts::core::{Error, Result};
use crate::artifacts::merge::pull_request::PullRequest;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug, new)]
pub struct Pulls {
    /// Path to the repository directory holding `pulls/`
    path: Box<Path>,
}

impl Pulls {
    /// Allocate the next pull-request number, starting at 1
    pub fn next_number(&self) -> Result<u64> {
        let seq_path = self.pulls_path().join("SEQ");
        std::fs::create_dir_all(self.pulls_path())?;

        let mut seq_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&seq_path)
            .with_context(|| format!("failed to open sequence file at {:?}", seq_path))?;
        let mut lock = file_guard::lock(&mut seq_file, Lock::Exclusive, 0, 1)
            .with_context(|| format!("failed to lock sequence file at {:?}", seq_path))?;

        let file = lock.deref_mut();
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let next = match content.trim() {
            "" => 1,
            raw => {
                raw.parse::<u64>()
                    .with_context(|| format!("corrupt pull sequence file at {:?}", seq_path))?
                    + 1
            }
        };

        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        file.write_all(next.to_string().as_bytes())?;

        Ok(next)
    }

    pub fn save(&self, pull: &PullRequest) -> Result<()> {
        std::fs::create_dir_all(self.pulls_path())?;

        let record_path = self.record_path(pull.number);
        let json = serde_json::to_vec_pretty(pull)?;
        std::fs::write(&record_path, json)
            .with_context(|| format!("failed to write pull record at {:?}", record_path))?;

        Ok(())
    }

    pub fn load(&self, number: u64) -> Result<PullRequest> {
        let record_path = self.record_path(number);
        if !record_path.is_file() {
            return Err(Error::not_found(format!("pull request #{} not found", number)));
        }

        let content = std::fs::read(&record_path)
            .with_context(|| format!("failed to read pull record at {:?}", record_path))?;

        Ok(serde_json::from_slice(&content)?)
    }

    /// All pull requests, newest first
    pub fn list(&self) -> Result<Vec<PullRequest>> {
        let pulls_path = self.pulls_path();
        if !pulls_path.exists() {
            return Ok(Vec::new());
        }

        let mut pulls = Vec::new();
        for entry in std::fs::read_dir(&pulls_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = std::fs::read(&path)
                    .with_context(|| format!("failed to read pull record at {:?}", path))?;
                pulls.push(serde_json::from_slice::<PullRequest>(&content)?);
            }
        }
        pulls.sort_by(|a, b| b.number.cmp(&a.number));

        Ok(pulls)
    }

    fn record_path(&self, number: u64) -> PathBuf {
        self.pulls_path().join(format!("{}.json", number))
    }

    pub fn pulls_path(&self) -> PathBuf {
        self.path.join("pulls")
    }
}
