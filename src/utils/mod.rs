pub mod csv_export;
pub mod data;
pub mod flatten;
pub mod points;

pub use csv_export::*;
pub use data::*;
pub use flatten::*;
pub use points::*;
