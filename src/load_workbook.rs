use std::io::Cursor;

use bytes::Bytes;
use calamine::{Data, Dimensions, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use miette::{Context, IntoDiagnostic};
use tracing::{debug, instrument, trace};

use crate::sheet::{Cell, MergedRegion, Sheet};

pub struct DecodedWorkbook {
  pub main: Xlsx<Cursor<Bytes>>,
}

impl DecodedWorkbook {
  #[instrument(skip(payload), fields(len = payload.len()))]
  pub fn from_bytes(payload: Bytes) -> miette::Result<Self> {
    let mut main = Xlsx::new(Cursor::new(payload))
      .into_diagnostic()
      .context("failed to decode timetable source as XLSX")?;
    main
      .load_merged_regions()
      .into_diagnostic()
      .context("failed to read merged cell regions from XLSX")?;
    debug!(sheets = ?main.sheet_names(), "decoded XLSX workbook");

    Ok(Self { main })
  }

  pub fn sheet_names(&self) -> Vec<String> { self.main.sheet_names() }

  pub fn get_worksheet(&mut self, name: &str) -> miette::Result<Sheet> {
    let range = self
      .main
      .worksheet_range(name)
      .into_diagnostic()
      .context(format!("failed to find sheet in workbook: \"{name}\""))?;
    let merges = self
      .main
      .merged_regions_by_sheet(name)
      .into_iter()
      .map(|(_, _, dims)| dims.clone())
      .collect::<Vec<_>>();

    Ok(sheet_from_range(name, &range, &merges))
  }

  /// Every sheet, in workbook order.
  pub fn worksheets(&mut self) -> miette::Result<Vec<Sheet>> {
    self
      .sheet_names()
      .iter()
      .map(|name| self.get_worksheet(name))
      .collect()
  }

  pub fn first_worksheet(&mut self) -> miette::Result<Sheet> {
    let name = self
      .sheet_names()
      .into_iter()
      .next()
      .ok_or(miette::miette!("workbook contains no sheets"))?;
    self.get_worksheet(&name)
  }
}

/// Builds a sheet whose `(0, 0)` is the top-left of the used range.
fn sheet_from_range(
  name: &str,
  range: &Range<Data>,
  merges: &[Dimensions],
) -> Sheet {
  let (origin_row, origin_col) = range
    .start()
    .map(|(r, c)| (r as usize, c as usize))
    .unwrap_or((0, 0));

  let rows = range
    .rows()
    .map(|row| row.iter().map(cell_from_data).collect())
    .collect();
  let mut sheet = Sheet::new(name, rows);

  for dims in merges {
    let (start_row, start_col) = (dims.start.0 as usize, dims.start.1 as usize);
    let (end_row, end_col) = (dims.end.0 as usize, dims.end.1 as usize);
    if start_row < origin_row || start_col < origin_col {
      trace!(?dims, "merged region starts outside used range, ignoring");
      continue;
    }
    sheet.add_merged_region(MergedRegion {
      min_row: start_row - origin_row,
      min_col: start_col - origin_col,
      max_row: end_row - origin_row,
      max_col: end_col - origin_col,
    });
  }

  trace!(
    sheet = name,
    height = sheet.height(),
    width = sheet.width(),
    merged = sheet.merged_regions().len(),
    "decoded worksheet"
  );
  sheet
}

fn cell_from_data(data: &Data) -> Cell {
  match data {
    Data::Empty | Data::Error(_) => Cell::Empty,
    Data::String(s) => Cell::Text(s.clone()),
    Data::Int(i) => Cell::Number(*i as f64),
    Data::Float(f) => Cell::Number(*f),
    Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_owned()),
    Data::DateTime(dt) => {
      let (y, m, d, h, min, s, _millis) = dt.to_ymd_hms_milli();
      NaiveDate::from_ymd_opt(y as _, m as _, d as _)
        .zip(NaiveTime::from_hms_opt(h as _, min as _, s as _))
        .map(|(date, time)| Cell::DateTime(date.and_time(time)))
        .unwrap_or(Cell::Number(dt.as_f64()))
    }
    Data::DateTimeIso(iso) => parse_iso_datetime(iso)
      .map(Cell::DateTime)
      .unwrap_or_else(|| Cell::Text(iso.clone())),
    Data::DurationIso(iso) => Cell::Text(iso.clone()),
  }
}

fn parse_iso_datetime(iso: &str) -> Option<NaiveDateTime> {
  NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f")
    .ok()
    .or_else(|| {
      NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
    })
}
