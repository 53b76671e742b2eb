//! Wire types shared by the Blockverse relay server and its clients.

pub mod config;
pub mod protocol;
pub mod vec3;
