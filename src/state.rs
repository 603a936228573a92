use kinded::Kinded;
use miette::{Context, IntoDiagnostic};
use timetable_extract::{
  cache::TableCache,
  calendar::generate_calendar,
  config::Config,
  schedule::model::ScheduleResponse,
  timetable::{LoadedSource, TimetableRequest, load_source, resolve_schedule},
};
use tracing::info;

use crate::cli::Command;

#[derive(Kinded)]
#[kinded(kind = RunStateStep)]
pub enum RunState {
  Start,
  LoadedSource { source: LoadedSource },
  ExtractedSchedule { response: ScheduleResponse },
  Emitted,
}

impl RunState {
  pub fn completed(&self) -> bool { matches!(self, Self::Emitted) }

  pub async fn step<C: TableCache>(
    self,
    config: &Config,
    cache: &C,
    command: &Command,
    request: &TimetableRequest,
  ) -> miette::Result<Self> {
    let old_state_step = self.kind();
    let new_state = match self {
      RunState::Start => RunState::LoadedSource {
        source: load_source(&config.drafts_dir, request)
          .await
          .context("failed to load timetable source")?,
      },
      RunState::LoadedSource { source } => RunState::ExtractedSchedule {
        response: resolve_schedule(cache, config.cache_ttl, request, source)
          .await
          .context("failed to resolve schedule")?,
      },
      RunState::ExtractedSchedule { response } => {
        emit(config, command, response).await?;
        RunState::Emitted
      }
      RunState::Emitted => unreachable!(),
    };

    info!(
      old_state = ?old_state_step,
      new_state = ?(new_state.kind()),
      "successfully transitioned state"
    );
    Ok(new_state)
  }
}

async fn emit(
  config: &Config,
  command: &Command,
  response: ScheduleResponse,
) -> miette::Result<()> {
  match command {
    Command::Schedule { .. } => {
      let json = serde_json::to_string_pretty(&response)
        .into_diagnostic()
        .context("failed to encode schedule")?;
      println!("{json}");
    }
    Command::Calendar {
      start,
      end,
      require_events,
      ..
    } => {
      let calendar =
        generate_calendar(&response.data, *start, *end, *require_events)?;
      tokio::fs::write(&config.calendar_output, calendar)
        .await
        .into_diagnostic()
        .context(format!(
          "failed to write calendar to {:?}",
          config.calendar_output
        ))?;
      info!(
        path = %config.calendar_output.display(),
        version = %response.version,
        "wrote calendar"
      );
    }
  }
  Ok(())
}
