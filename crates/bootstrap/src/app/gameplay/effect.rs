//! Non-maskable-interrupt flash: a dark vignette and an electric zap drawn
//! around the player, each with its own alpha curve over one run.

pub(crate) const DARK_IN_END: f32 = 0.15;
pub(crate) const ZAP_IN_END: f32 = 0.2;
pub(crate) const ZAP_OUT_START: f32 = 0.4;
pub(crate) const ZAP_OUT_END: f32 = 0.6;
pub(crate) const DARK_OUT_END: f32 = 1.0;
pub(crate) const COOLDOWN: f32 = 1.2;
pub(crate) const DURATION: f32 = COOLDOWN;
/// How long a single Fire press stays armed.
pub(crate) const LATCH_SECONDS: f32 = 0.5;

pub(crate) fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub(crate) fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - t.powi(3)
}

fn to_alpha(t: f32) -> u8 {
    (t * 255.0) as u8
}

pub(crate) fn dark_alpha(elapsed: f32) -> u8 {
    if elapsed < DARK_IN_END {
        to_alpha(ease_in(elapsed / DARK_IN_END))
    } else if elapsed < ZAP_OUT_END {
        255
    } else if elapsed < DARK_OUT_END {
        to_alpha(ease_out(
            (elapsed - ZAP_OUT_END) / (DARK_OUT_END - ZAP_OUT_END),
        ))
    } else {
        0
    }
}

pub(crate) fn zap_alpha(elapsed: f32) -> u8 {
    if elapsed < DARK_IN_END {
        0
    } else if elapsed < ZAP_IN_END {
        to_alpha(ease_in(
            (elapsed - DARK_IN_END) / (ZAP_IN_END - DARK_IN_END),
        ))
    } else if elapsed < ZAP_OUT_START {
        255
    } else if elapsed < ZAP_OUT_END {
        to_alpha(ease_out(
            (elapsed - ZAP_OUT_START) / (ZAP_OUT_END - ZAP_OUT_START),
        ))
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct EffectAlphas {
    pub(crate) dark: u8,
    pub(crate) zap: u8,
}

/// Latch plus run timer. A run can only start once the previous one has
/// fully counted down, so the cooldown is the run itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct NmiEffect {
    timer: f32,
    latch: f32,
}

impl NmiEffect {
    /// Advances both timers. Returns true when this call started a run.
    pub(crate) fn update(&mut self, delta_seconds: f32, fire_pressed: bool) -> bool {
        if fire_pressed {
            self.latch = LATCH_SECONDS;
        } else if self.latch >= delta_seconds {
            self.latch -= delta_seconds;
        } else {
            self.latch = 0.0;
        }

        if self.timer > 0.0 && self.timer >= delta_seconds {
            self.timer -= delta_seconds;
            return false;
        }

        self.timer = 0.0;
        if self.latch > 0.0 {
            self.timer = DURATION;
            return true;
        }
        false
    }

    pub(crate) fn is_running(&self) -> bool {
        self.timer > 0.0
    }

    pub(crate) fn latch(&self) -> f32 {
        self.latch
    }

    /// Seconds since the current run started.
    pub(crate) fn elapsed(&self) -> Option<f32> {
        self.is_running().then(|| DURATION - self.timer)
    }

    pub(crate) fn alphas(&self) -> EffectAlphas {
        match self.elapsed() {
            Some(elapsed) => EffectAlphas {
                dark: dark_alpha(elapsed),
                zap: zap_alpha(elapsed),
            },
            None => EffectAlphas::default(),
        }
    }
}
