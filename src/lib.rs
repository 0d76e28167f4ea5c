//! Tracker for the day's tasks and money. Tasks are timed from the moment they're added and
//! rated against their estimate once completed, expenses and income are recorded alongside.
//! Everything is stored as plain json lines, one file per day, and can be summarized, analyzed
//! or turned into a review prompt from the terminal.

pub mod cli;
pub mod engine;
pub mod records;
pub mod utils;
