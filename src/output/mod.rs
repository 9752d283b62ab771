//! Series output.

pub mod csv_writer;

pub use csv_writer::write_series;
