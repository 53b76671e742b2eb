//! Engine-free game logic. Everything here is plain data plus update
//! functions so it can be unit tested without an `App`.

pub mod blocks;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod hunter;
pub mod reconciler;
pub mod round;
pub mod throttle;
