use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use timetable_extract::timetable::TimetableRequest;

/// Extracts class and exam schedules from timetable drafts.
#[derive(Debug, Parser)]
#[command(name = "timetable-extract", version)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Print a class's schedule as JSON.
  Schedule {
    #[command(flatten)]
    request: RequestArgs,
  },
  /// Write a class's schedule over a date range as an iCalendar file.
  Calendar {
    #[command(flatten)]
    request:        RequestArgs,
    /// First date of the calendar, as YYYY-MM-DD.
    #[arg(long)]
    start:          NaiveDate,
    /// Last date of the calendar, inclusive.
    #[arg(long)]
    end:            NaiveDate,
    /// Fail instead of writing an empty calendar.
    #[arg(long)]
    require_events: bool,
  },
}

impl Command {
  pub fn request(&self) -> TimetableRequest {
    match self {
      Command::Schedule { request } | Command::Calendar { request, .. } => {
        request.clone().into()
      }
    }
  }
}

#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
  /// Timetable draft in the drafts directory; `.xlsx` is optional.
  pub filename:      String,
  /// Class to extract, such as "EL 3", or a class prefix for exams.
  pub class_pattern: String,
  /// Read the draft as an exam timetable.
  #[arg(long)]
  pub exam:          bool,
}

impl From<RequestArgs> for TimetableRequest {
  fn from(args: RequestArgs) -> Self {
    TimetableRequest {
      filename:      args.filename,
      class_pattern: args.class_pattern,
      is_exam:       args.exam,
    }
  }
}
