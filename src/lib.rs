// https://github.com/rust-lang/rust/issues/31844
#![feature(specialization)]
// Opt in to unstable features expected for Rust 2018
#![feature(rust_2018_preview)]
// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused)]
// Clippy
#![allow(unknown_lints)] // necessary because rustc doesn't know about clippy
#![warn(clippy)]

extern crate separator;

pub mod config;
pub mod error;
pub mod search;

mod boxes;
mod cell;
mod closed_map;
mod corral;
mod deadlock;
mod fs;
mod geometry;
mod level;
mod level_env;
mod matching;
mod moves;
mod open_queue;
mod parser;
mod pattern_db;
mod state;
mod stats;
mod vec2d;

pub use crate::config::SolverOptions;
pub use crate::error::{ParseError, SolveError};
pub use crate::fs::{is_solved, mark_solved};
pub use crate::geometry::{Dir, Pos};
pub use crate::level::Level;
pub use crate::level_env::LevelEnv;
pub use crate::moves::{Move, Moves};
pub use crate::parser::parse_level;
pub use crate::search::{solve, SolveOutcome};
pub use crate::stats::Counters;
pub use crate::vec2d::Vec2d;
