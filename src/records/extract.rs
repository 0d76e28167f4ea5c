use std::{future, sync::Arc};

use anyhow::Result;
use chrono::NaiveDate;
use futures::{stream, Stream, StreamExt, TryStreamExt};
use tracing::error;

use super::{entities::Record, record_storage::RecordStorage};

/// Reads the records of kind `R` of every day between `start` (inclusive) and `end`
/// (inclusive), one item per day including days without records. Day files are read a
/// few at a time, days come out in order.
pub fn extract_days<R: Record>(
    storage: impl RecordStorage,
    start: NaiveDate,
    end: NaiveDate,
) -> impl Stream<Item = Result<(NaiveDate, Vec<R>)>> {
    let storage = Arc::new(storage);

    date_range(start, end)
        .map(move |day| {
            let storage = storage.clone();
            async move {
                storage
                    .get_data_for::<R>(day)
                    .await
                    .map(|data| (day, data))
                    .map_err(|e| {
                        error!("Failed to process file {day} {e}");
                        e
                    })
            }
        })
        .buffered(4)
}

/// Flattens [extract_days] into the records themselves.
pub fn extract_between<R: Record>(
    storage: impl RecordStorage,
    start: NaiveDate,
    end: NaiveDate,
) -> impl Stream<Item = Result<R>> {
    extract_days(storage, start, end).flat_map(|day| match day {
        Ok((_, data)) => stream::iter(data).map(Ok).boxed(),
        Err(e) => stream::once(future::ready(Err(e))).boxed(),
    })
}

/// Collects [extract_between] into a vector, failing on the first unreadable day.
pub async fn collect_between<R: Record>(
    storage: impl RecordStorage,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<R>> {
    extract_between(storage, start, end).try_collect().await
}

/// Returns a stream of dates between start (inclusive) and end (inclusive).
fn date_range(start: NaiveDate, end: NaiveDate) -> impl Stream<Item = NaiveDate> {
    stream::unfold((start, end), |(current, end)| {
        future::ready({
            if current <= end {
                current
                    .succ_opt()
                    .map(|next| (current, (next, end)))
                    .or(Some((current, (NaiveDate::MAX, NaiveDate::MIN))))
            } else {
                None
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, NaiveTime};
    use futures::StreamExt;
    use tempfile::tempdir;

    use crate::records::{
        entities::{EntryKind, FinanceRecord},
        record_storage::{RecordStorage, RecordStorageImpl},
    };

    use super::{collect_between, date_range, extract_days};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    #[tokio::test]
    async fn test_date_range_inclusive() {
        let end = TEST_DATE.succ_opt().unwrap().succ_opt().unwrap();
        let days = date_range(TEST_DATE, end).collect::<Vec<_>>().await;
        assert_eq!(days.len(), 3);
        assert_eq!(days[0], TEST_DATE);
        assert_eq!(days[2], end);

        let empty = date_range(end, TEST_DATE).collect::<Vec<_>>().await;
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_date_range_end_of_time() {
        let days = date_range(NaiveDate::MAX, NaiveDate::MAX)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(days, vec![NaiveDate::MAX]);
    }

    #[tokio::test]
    async fn test_extract_days_keeps_empty_days() -> Result<()> {
        let dir = tempdir()?;
        let storage = RecordStorageImpl::new(dir.path().to_owned())?;
        let last = TEST_DATE + chrono::Duration::days(2);
        for (day, amount) in [(TEST_DATE, 10.), (last, 30.), (last, 35.)] {
            let record =
                FinanceRecord::new(EntryKind::Expense, amount, "food", day.and_time(NaiveTime::MIN));
            storage.append(day, &record).await?;
        }

        let days = extract_days::<FinanceRecord>(&storage, TEST_DATE, last)
            .map(|v| v.map(|(day, records)| (day, records.len())))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            days,
            vec![
                (TEST_DATE, 1),
                (TEST_DATE.succ_opt().unwrap(), 0),
                (last, 2)
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_between_spans_days() -> Result<()> {
        let dir = tempdir()?;
        let storage = RecordStorageImpl::new(dir.path().to_owned())?;

        let mut day = TEST_DATE;
        for amount in [10., 20., 30.] {
            let record =
                FinanceRecord::new(EntryKind::Expense, amount, "food", day.and_time(NaiveTime::MIN));
            storage.append(day, &record).await?;
            day = day.succ_opt().unwrap();
        }

        let all: Vec<FinanceRecord> =
            collect_between(&storage, TEST_DATE, TEST_DATE + chrono::Duration::days(2)).await?;
        assert_eq!(
            all.iter().map(|v| v.amount).collect::<Vec<_>>(),
            vec![10., 20., 30.]
        );

        let tail: Vec<FinanceRecord> = collect_between(
            &storage,
            TEST_DATE.succ_opt().unwrap(),
            TEST_DATE + chrono::Duration::days(10),
        )
        .await?;
        assert_eq!(tail.len(), 2);
        Ok(())
    }
}
