//! Consumer price index data

mod table;
pub mod loader;

pub use table::CpiTable;
pub use loader::{load_cpi, load_cpi_from_reader, CPI_FILE};
