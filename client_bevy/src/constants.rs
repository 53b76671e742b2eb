/// Screen pixels per world unit in the top-down view.
pub const PIXELS_PER_UNIT: f32 = 4.0;

pub const WINDOW_WIDTH: u32 = 900;
pub const WINDOW_HEIGHT: u32 = 800;

/// Rendered radius of avatars, in world units.
pub const AVATAR_RADIUS: f32 = 0.9;
pub const HUNTER_RADIUS: f32 = 1.1;

#[derive(Clone, Copy)]
pub struct Colors;

impl Colors {
    pub const NIGHT_BG: u32 = 0x050510;
    pub const STREET_GRID: u32 = 0x003300;
    pub const BUILDING: u32 = 0x1a1a2e;
    pub const BUILDING_EDGE: u32 = 0x00ffff;
    pub const LOCAL_PLAYER: u32 = 0x44ff88;
    pub const REMOTE_PLAYER: u32 = 0x4da6ff;
    pub const HUNTER: u32 = 0xff2222;
    pub const HUNTER_TARGET: u32 = 0xffff00;
    pub const BLOCK: u32 = 0xc08040;
    pub const CAUGHT: u32 = 0xff0000;
}

pub fn color_from_hex(rgb: u32) -> bevy::prelude::Color {
    let r = ((rgb >> 16) & 0xff) as f32 / 255.0;
    let g = ((rgb >> 8) & 0xff) as f32 / 255.0;
    let b = (rgb & 0xff) as f32 / 255.0;
    bevy::prelude::Color::srgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_from_hex_parses_correctly() {
        let c = color_from_hex(0xFF8040);
        if let bevy::prelude::Color::Srgba(srgba) = c {
            assert!((srgba.red - 1.0).abs() < 1e-3);
            assert!((srgba.green - 0.502).abs() < 1e-2);
            assert!((srgba.blue - 0.251).abs() < 1e-2);
        } else {
            panic!("Expected Srgba color variant");
        }
    }
}
