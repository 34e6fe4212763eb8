/// UI components
///
/// Everything here is presentational: values in, messages out.
/// - `controls` - text box, date box, dropdown, buttons
/// - `search` - search bar with input and action slots
/// - `grid` - list grid, flat or tree, read-only or editable
/// - `detail` - detail panel of the selected record
/// - `banner` - auto-dismissing notices
/// - `shell` - sidebar, header and login form
/// - `dialog` - native confirmation prompt

pub mod banner;
pub mod controls;
pub mod detail;
pub mod dialog;
pub mod grid;
pub mod search;
pub mod shell;
