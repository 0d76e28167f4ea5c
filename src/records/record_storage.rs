use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use serde::de::DeserializeOwned;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::utils::time::date_to_record_name;

use super::entities::Record;

/// Interface for abstracting storage of records.
pub trait RecordStorage {
    /// Retrieves every record of kind `R` saved for a certain day. A day without a file has no
    /// records.
    fn get_data_for<R: Record>(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<R>>> + Send;

    /// Adds a record to the end of the day file.
    fn append<R: Record>(&self, date: NaiveDate, record: &R) -> impl Future<Output = Result<()>>;

    /// Replaces the whole day file with `records`. Used when records are modified or removed.
    fn replace_day<R: Record>(
        &self,
        date: NaiveDate,
        records: &[R],
    ) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> RecordStorage for T
where
    T::Target: RecordStorage,
{
    fn get_data_for<R: Record>(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<R>>> + Send {
        self.deref().get_data_for(date)
    }

    fn append<R: Record>(&self, date: NaiveDate, record: &R) -> impl Future<Output = Result<()>> {
        self.deref().append(date, record)
    }

    fn replace_day<R: Record>(
        &self,
        date: NaiveDate,
        records: &[R],
    ) -> impl Future<Output = Result<()>> {
        self.deref().replace_day(date, records)
    }
}

/// The main realization of [RecordStorage]. Each kind of record gets its own directory with a
/// file per day. Every line of a file is a json object.
pub struct RecordStorageImpl {
    record_dir: PathBuf,
}

impl RecordStorageImpl {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    fn day_path<R: Record>(&self, date: NaiveDate) -> PathBuf {
        self.record_dir
            .join(R::KIND)
            .join(date_to_record_name(date))
    }

    async fn kind_dir<R: Record>(&self) -> Result<PathBuf> {
        let dir = self.record_dir.join(R::KIND);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create record directory {dir:?}"))?;
        Ok(dir)
    }

    async fn get_all_inner<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
        let contents = match read_locked(path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => Err(e)?,
        };

        let mut records = vec![];
        for line in contents.split(|v| *v == b'\n') {
            match parse_line::<R>(line) {
                DayLine::Blank => {}
                DayLine::Record(v) => records.push(v),
                DayLine::Damaged(reason) => {
                    // Might happen after an interrupted write or a manual edit. The line itself
                    // stays on disk, see replace_day.
                    warn!("Skipping a line in {path:?}, {reason}")
                }
            }
        }
        Ok(records)
    }
}

/// Whole contents of a day file, read under a shared lock.
async fn read_locked(path: &Path) -> std::io::Result<Vec<u8>> {
    debug!("Extracting {path:?}");
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut contents = vec![];
    let result = file.read_to_end(&mut contents).await;
    file.unlock_async().await?;
    result.map(|_| contents)
}

enum DayLine<R> {
    Blank,
    Record(R),
    /// Line that can't be read as a record, with the reason.
    Damaged(String),
}

fn parse_line<R: DeserializeOwned>(line: &[u8]) -> DayLine<R> {
    let line = match std::str::from_utf8(line) {
        Ok(v) => v,
        Err(e) => return DayLine::Damaged(format!("it isn't valid utf-8: {e}")),
    };
    if line.trim().is_empty() {
        return DayLine::Blank;
    }
    match serde_json::from_str::<R>(line) {
        Ok(v) => DayLine::Record(v),
        Err(e) => DayLine::Damaged(format!("found illegal json string {line}: {e}")),
    }
}

impl RecordStorage for RecordStorageImpl {
    async fn get_data_for<R: Record>(&self, date: NaiveDate) -> Result<Vec<R>> {
        let path = self.day_path::<R>(date);
        let data = Self::get_all_inner(&path)
            .await
            .with_context(|| format!("Failed to read {} for {date}", R::KIND))?;
        Ok(data)
    }

    async fn append<R: Record>(&self, date: NaiveDate, record: &R) -> Result<()> {
        self.kind_dir::<R>().await?;
        let path = self.day_path::<R>(date);

        let mut buffer = serde_json::to_vec(record)?;
        buffer.push(b'\n');

        let mut file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {path:?}"))?;

        file.lock_exclusive()?;
        let result = async {
            file.write_all(&buffer).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;

        debug!("Appended a record to {path:?}");
        Ok(result?)
    }

    /// Lines of the old file that can't be read as records are carried over to the end of the
    /// new one, so a rewrite never loses data it couldn't see.
    async fn replace_day<R: Record>(&self, date: NaiveDate, records: &[R]) -> Result<()> {
        self.kind_dir::<R>().await?;
        let path = self.day_path::<R>(date);

        let mut buffer = Vec::<u8>::new();
        for record in records {
            serde_json::to_writer(&mut buffer, record)?;
            buffer.push(b'\n');
        }

        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {path:?}"))?;

        // Truncation happens under the lock so that readers never see a half written day.
        file.lock_exclusive()?;
        let result = async {
            let mut existing = vec![];
            file.read_to_end(&mut existing).await?;
            let mut kept = 0;
            for line in existing.split(|v| *v == b'\n') {
                if let DayLine::Damaged(_) = parse_line::<R>(line) {
                    buffer.extend_from_slice(line);
                    buffer.push(b'\n');
                    kept += 1;
                }
            }

            file.set_len(0).await?;
            file.rewind().await?;
            file.write_all(&buffer).await?;
            file.flush().await?;
            Ok::<_, std::io::Error>(kept)
        }
        .await;
        file.unlock_async().await?;

        let kept = result?;
        if kept > 0 {
            warn!("Kept {kept} unreadable lines at the end of {path:?}");
        }
        debug!("Rewrote {path:?} with {} records", records.len());
        Ok(())
    }
}
