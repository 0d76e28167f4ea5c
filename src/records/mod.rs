//!  Storage is organized through [record_storage::RecordStorageImpl].
//!  The basic idea is:
//!   - There is a directory with all the records, split by record kind (tasks, finance).
//!   - Records are stored in day files, named after the calendar day they belong to.
//!   - Every line of a day file is a single record. Damaged lines are skipped on read.

pub mod entities;
pub mod extract;
pub mod record_storage;
