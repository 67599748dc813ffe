#![doc = include_str!("../README.md")]

mod coords;
mod error;
mod loader;
mod model;

pub use crate::coords::parse_coordinates;
pub use crate::error::*;
pub use crate::loader::*;
