//! Reusable dashboard UI pieces.

pub mod data_table;

pub use data_table::{DataTableConfig, TableView};
