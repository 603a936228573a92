use tracing::{instrument, trace};

use crate::sheet::Sheet;

/// Unmerges every region that spans exactly two columns, copying the
/// top-left value into the bottom-right cell so both columns carry it.
///
/// Wider regions are left merged.
#[instrument(skip(sheet), fields(sheet = sheet.name()))]
pub fn expand_two_column_merges(sheet: &mut Sheet) {
  let regions = sheet
    .merged_regions()
    .iter()
    .filter(|r| r.max_col.checked_sub(r.min_col) == Some(1))
    .copied()
    .collect::<Vec<_>>();

  for region in regions {
    let value = sheet.cell(region.min_row, region.min_col).clone();
    sheet.unmerge(&region);
    trace!(?region, ?value, "expanding two-column merged region");
    sheet.set_cell(region.min_row, region.min_col, value.clone());
    sheet.set_cell(region.max_row, region.max_col, value);
  }
}
