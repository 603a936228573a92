use std::borrow::Cow;

use chrono::NaiveDateTime;

static EMPTY_CELL: Cell = Cell::Empty;

/// A single decoded spreadsheet value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
  Empty,
  Text(String),
  Number(f64),
  DateTime(NaiveDateTime),
}

impl Cell {
  /// Empty cells and whitespace-only text.
  pub fn is_blank(&self) -> bool {
    match self {
      Cell::Empty => true,
      Cell::Text(t) => t.trim().is_empty(),
      _ => false,
    }
  }

  /// The cell rendered as text, or `None` for empty cells.
  pub fn text(&self) -> Option<Cow<'_, str>> {
    match self {
      Cell::Empty => None,
      Cell::Text(t) => Some(Cow::Borrowed(t)),
      Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
        Some(Cow::Owned(format!("{}", *n as i64)))
      }
      Cell::Number(n) => Some(Cow::Owned(n.to_string())),
      Cell::DateTime(dt) => Some(Cow::Owned(dt.to_string())),
    }
  }
}

impl From<&str> for Cell {
  fn from(value: &str) -> Self {
    if value.is_empty() {
      Cell::Empty
    } else {
      Cell::Text(value.to_owned())
    }
  }
}

/// An inclusive, zero-based rectangle of merged cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergedRegion {
  pub min_row: usize,
  pub min_col: usize,
  pub max_row: usize,
  pub max_col: usize,
}

/// Working copy of one worksheet.
///
/// Rows may be ragged; reads past the end of a row yield [`Cell::Empty`] and
/// writes grow the grid as needed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
  name:           String,
  rows:           Vec<Vec<Cell>>,
  merged_regions: Vec<MergedRegion>,
}

impl Sheet {
  pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
    Self {
      name: name.into(),
      rows,
      merged_regions: Vec::new(),
    }
  }

  /// Builds a sheet from plain strings; `""` becomes an empty cell.
  pub fn from_text_rows(name: impl Into<String>, rows: &[&[&str]]) -> Self {
    Self::new(
      name,
      rows
        .iter()
        .map(|row| row.iter().map(|v| Cell::from(*v)).collect())
        .collect(),
    )
  }

  pub fn with_merged_region(mut self, region: MergedRegion) -> Self {
    self.merged_regions.push(region);
    self
  }

  pub fn add_merged_region(&mut self, region: MergedRegion) {
    self.merged_regions.push(region);
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }

  pub fn height(&self) -> usize { self.rows.len() }

  pub fn width(&self) -> usize {
    self.rows.iter().map(Vec::len).max().unwrap_or(0)
  }

  pub fn merged_regions(&self) -> &[MergedRegion] { &self.merged_regions }

  pub fn cell(&self, row: usize, col: usize) -> &Cell {
    self
      .rows
      .get(row)
      .and_then(|r| r.get(col))
      .unwrap_or(&EMPTY_CELL)
  }

  pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
    if self.rows.len() <= row {
      self.rows.resize_with(row + 1, Vec::new);
    }
    let target = &mut self.rows[row];
    if target.len() <= col {
      target.resize(col + 1, Cell::Empty);
    }
    target[col] = cell;
  }

  /// Forgets a merged region. Returns whether it was present.
  pub fn unmerge(&mut self, region: &MergedRegion) -> bool {
    let before = self.merged_regions.len();
    self.merged_regions.retain(|r| r != region);
    self.merged_regions.len() != before
  }

  /// Copy of the sheet without the columns that are blank in every row.
  ///
  /// Merged regions are not carried over since their coordinates no longer
  /// apply.
  pub fn without_blank_columns(&self) -> Sheet {
    let width = self.width();
    let keep = (0..width)
      .filter(|&col| {
        (0..self.height()).any(|row| !self.cell(row, col).is_blank())
      })
      .collect::<Vec<_>>();

    let rows = (0..self.height())
      .map(|row| {
        keep
          .iter()
          .map(|&col| self.cell(row, col).clone())
          .collect::<Vec<_>>()
      })
      .collect();

    Sheet::new(self.name.clone(), rows)
  }
}
