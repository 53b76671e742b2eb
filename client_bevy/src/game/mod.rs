mod avatars;
mod core;
mod hud;
mod hunter;
mod input;
mod network;
mod player;
mod world;

pub use avatars::AvatarsPlugin;
pub use core::{ClientSettings, CorePlugin};
pub(crate) use core::UpdateSet;
pub use hud::HudPlugin;
pub use hunter::HunterPlugin;
pub use input::InputPlugin;
pub use network::NetworkPlugin;
pub use player::PlayerPlugin;
pub use world::WorldPlugin;
