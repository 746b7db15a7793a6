pub mod config;
pub mod io;
pub mod model;
pub mod operators;
pub mod runtime;
