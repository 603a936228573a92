//! Extraction of per-class lecture and exam schedules from spreadsheet
//! timetables, with calendar export.

pub mod cache;
pub mod calendar;
pub mod class_pattern;
pub mod config;
pub mod convert_time;
pub mod error;
pub mod expand_merged_cells;
pub mod extract_exams;
pub mod extract_lectures;
pub mod load_workbook;
pub mod merge_slots;
pub mod schedule;
pub mod sheet;
pub mod timetable;

pub use self::error::ExtractError;
