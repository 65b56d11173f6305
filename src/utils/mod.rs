pub mod csv_io;
pub mod error;
pub mod format;
pub mod logger;
pub mod monitor;
pub mod validation;
