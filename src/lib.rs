#![doc = include_str!("../README.md")]

mod bits;
mod config;
mod demux;
mod error;
mod frame;
mod packet;
mod reassembly;

pub use config::Config;
pub use demux::{Demuxer, Output};
pub use error::{Error, Result};
pub use reassembly::VcStats;
