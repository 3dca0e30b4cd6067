pub mod app;
pub mod braille;
pub mod config;
pub mod controls;
pub mod data;
pub mod error;
mod hash;
pub mod map;
pub mod ui;

pub use error::{Error, Result};
