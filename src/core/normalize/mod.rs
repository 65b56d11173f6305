//! Per-dataset record normalizers. Each is a pure function from typed raw rows
//! to cleaned records in staging column order.

pub mod airports;
pub mod cities;
pub mod temperatures;
pub mod travelers;

pub use airports::normalize_airports;
pub use cities::normalize_cities;
pub use temperatures::normalize_temperatures;
pub use travelers::normalize_travelers;
