pub mod bovada_api;

pub use bovada_api::*;
