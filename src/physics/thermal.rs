use crate::body::Body;
use crate::sim::SimSettings;

/// Radiative cooling: lose a fixed fraction of temperature, never below zero.
pub fn apply_cooling(body: &mut Body, settings: &SimSettings) {
    let lost = body.temperature() * settings.cooling_rate;
    body.set_temperature(body.temperature() - lost);
}

/// Velocity multiplier from gas drag. Only dust is slowed, and lighter dust
/// more so: `1 - coefficient * (1 - mass / threshold)`.
pub fn drag_factor(mass: f32, settings: &SimSettings) -> f32 {
    if !settings.is_dust(mass) {
        return 1.0;
    }
    let strength =
        (settings.gas_drag_coefficient * (1.0 - mass / settings.dust_mass_threshold)).max(0.0);
    1.0 - strength
}

pub fn apply_drag(body: &mut Body, settings: &SimSettings) {
    body.vel *= drag_factor(body.mass(), settings);
}
