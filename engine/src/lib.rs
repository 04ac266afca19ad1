pub mod adapters;
pub mod application;
pub mod constants;
pub mod domain;
pub mod infrastructure;
