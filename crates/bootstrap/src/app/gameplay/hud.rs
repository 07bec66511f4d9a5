use engine::{Canvas, Sprite, SpriteRect};

use super::camera::Camera;

pub(crate) const PANEL_POSITION: (i32, i32) = (412, 4);
pub(crate) const REGISTER_X: i32 = 455;
pub(crate) const LED_SIZE: u32 = 17;
pub(crate) const LED_ADVANCE: i32 = 18;

/// Row of the LED sheet a register is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LedBank {
    Data = 0,
    Index = 1,
    Address = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Registers {
    pub(crate) dbus: u8,
    pub(crate) abus_hi: u8,
    pub(crate) abus_lo: u8,
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
}

impl Registers {
    pub(crate) const fn power_on() -> Self {
        Self {
            dbus: 0xA5,
            abus_hi: 0xDE,
            abus_lo: 0xAD,
            a: 0xBE,
            x: 0x55,
            y: 0xAA,
        }
    }

    /// A and X mirror the low bytes of the camera origin.
    pub(crate) fn track_camera(&mut self, camera: Camera) {
        self.a = (camera.x & 0xFF) as u8;
        self.x = (camera.y & 0xFF) as u8;
    }

    fn layout(&self) -> [(u8, i32, LedBank); 6] {
        [
            (self.dbus, 48, LedBank::Data),
            (self.abus_lo, 101, LedBank::Address),
            (self.abus_hi, 120, LedBank::Address),
            (self.a, 167, LedBank::Index),
            (self.x, 214, LedBank::Index),
            (self.y, 261, LedBank::Index),
        ]
    }
}

pub(crate) fn draw_hud(
    canvas: &mut dyn Canvas,
    panel: &Sprite,
    leds: &Sprite,
    registers: &Registers,
) {
    canvas.draw_sprite(PANEL_POSITION.0, PANEL_POSITION.1, panel);
    for (value, y, bank) in registers.layout() {
        draw_register(canvas, leds, value, REGISTER_X, y, bank);
    }
}

/// One LED per bit, most significant bit leftmost. A set bit uses the lit
/// glyph in the second column of the bank's row.
pub(crate) fn draw_register(
    canvas: &mut dyn Canvas,
    leds: &Sprite,
    value: u8,
    x: i32,
    y: i32,
    bank: LedBank,
) {
    let src_y = bank as u32 * LED_SIZE;
    let mut x = x;
    for bit in (0..8).rev() {
        let lit = u32::from((value >> bit) & 1);
        let src = SpriteRect::new(lit * LED_SIZE, src_y, LED_SIZE, LED_SIZE);
        canvas.blend_partial_sprite(x, y, leds, src, 255);
        x += LED_ADVANCE;
    }
}
