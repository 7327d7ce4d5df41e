//! Carrying out a collision outcome.
//!
//! These functions only touch the bodies they are handed and return any new
//! debris; removing consumed bodies and queueing the debris is the
//! universe's job.

use bevy::prelude::*;
use rand::Rng;

use crate::body::{radius_for, Body};
use crate::sim::{FragmentationMode, SimSettings};

/// `survivor` absorbs `absorbed`: mass adds up exactly, position and velocity
/// are mass-weighted, and kinetic energy lost in the inelastic capture turns
/// into heat.
pub fn merge(survivor: &mut Body, absorbed: &Body, settings: &SimSettings) {
    let ke_before = survivor.kinetic_energy() + absorbed.kinetic_energy();
    let mass = survivor.mass() + absorbed.mass();
    let vel = (survivor.momentum() + absorbed.momentum()) / mass;
    let ke_after = 0.5 * mass * vel.length_squared();
    let heat = (ke_before - ke_after) * settings.specific_heat;

    let temperature = (survivor.temperature() * survivor.mass()
        + absorbed.temperature() * absorbed.mass())
        / mass
        + heat / mass;

    survivor.pos = (survivor.pos * survivor.mass() + absorbed.pos * absorbed.mass()) / mass;
    survivor.vel = vel;
    survivor.set_mass_and_density(mass, settings.base_density);
    survivor.set_temperature(temperature);
}

/// `target` is struck by the much lighter `impactor`, which is destroyed.
///
/// Part of the impact energy heats the target, the rest throws debris out of
/// the crater. The target loses the excavated mass, capped at a fraction of
/// its own, and recoils slightly. Returns the debris, whose masses sum to the
/// impactor's mass plus the excavated mass.
pub fn crater<R: Rng + ?Sized>(
    target: &mut Body,
    impactor: &Body,
    settings: &SimSettings,
    rng: &mut R,
) -> Vec<Body> {
    let impact_energy = impactor.kinetic_energy();
    let to_heat = impact_energy * settings.heat_loss_ratio;
    let to_motion = impact_energy - to_heat;

    target.set_temperature(
        target.temperature() + to_heat / (target.mass() * settings.specific_heat),
    );

    let excavated = (impact_energy / settings.excavation_energy_scale
        * settings.excavation_efficiency)
        .min(target.mass() * settings.max_excavation_fraction);
    target.set_mass(target.mass() - excavated);

    let debris_total = impactor.mass() + excavated;
    let count = (debris_total / settings.crater_mass_per_fragment).floor() as usize
        + settings.crater_min_fragments;
    let masses = split_debris(debris_total, count, settings.negligible_mass, rng);

    let toward = impactor.pos - target.pos;
    let angle = toward.y.atan2(toward.x);
    let impact_point = target.pos + Vec2::from_angle(angle) * target.radius();
    let base_speed = (to_motion / debris_total).sqrt();
    let temperature = target.temperature() + settings.impact_heat_bias;

    let debris: Vec<Body> = masses
        .into_iter()
        .map(|mass| {
            let spread = (rng.gen::<f32>() - 0.5) * 2.0 * settings.crater_spread;
            let dir = Vec2::from_angle(angle + spread);
            let speed = base_speed * (0.5 + rng.gen::<f32>() * 1.5);
            Body::debris(
                impact_point + dir * settings.crater_spawn_offset,
                target.vel + dir * speed,
                mass,
                settings.base_density,
                temperature,
                settings.spawn_cooldown,
            )
        })
        .collect();

    if debris.is_empty() {
        debug!("crater debris of {debris_total} below cutoff, returned to target");
        target.set_mass(target.mass() + debris_total);
    }

    target.vel += impactor.momentum() / target.mass() * settings.recoil_factor;
    debris
}

/// Both bodies shatter into debris carrying their combined mass and
/// center-of-mass momentum.
///
/// The internal kinetic energy (total minus center-of-mass energy) is split
/// between heat and fragment motion; fragment velocities relative to the
/// center of mass are rescaled so their kinetic energy is exactly the motion
/// share.
pub fn fragment<R: Rng + ?Sized>(
    a: &Body,
    b: &Body,
    settings: &SimSettings,
    rng: &mut R,
) -> Vec<Body> {
    let total = a.mass() + b.mass();
    let com_vel = (a.momentum() + b.momentum()) / total;
    let com_pos = (a.pos * a.mass() + b.pos * b.mass()) / total;

    let ke_before = a.kinetic_energy() + b.kinetic_energy();
    let budget = (ke_before - 0.5 * total * com_vel.length_squared()).max(0.0);
    let to_heat = budget * settings.heat_loss_ratio;
    let to_motion = budget - to_heat;

    let temperature = (a.temperature() * a.mass() + b.temperature() * b.mass()) / total
        + to_heat / (total * settings.specific_heat);

    let count = (total / settings.fragment_mass_per_piece).floor() as usize
        + settings.fragment_min_pieces;
    let masses = split_debris(total, count, settings.negligible_mass, rng);
    if masses.is_empty() {
        debug!("fragmentation of {total} mass left nothing above cutoff");
        return Vec::new();
    }

    let normal = (b.pos - a.pos).try_normalize().unwrap_or(Vec2::X);
    let mut rel = ejection_velocities(masses.len(), normal, settings.fragmentation, rng);

    // Random directions carry some net momentum; take it out so the debris
    // moves with the parents' center of mass.
    let split_mass: f32 = masses.iter().sum();
    let drift = masses
        .iter()
        .zip(&rel)
        .map(|(&m, &v)| v * m)
        .sum::<Vec2>()
        / split_mass;
    for v in &mut rel {
        *v -= drift;
    }

    let raw_ke: f32 = masses
        .iter()
        .zip(&rel)
        .map(|(&m, v)| 0.5 * m * v.length_squared())
        .sum();
    let scale = if raw_ke > 0.0 {
        (to_motion / raw_ke).sqrt()
    } else {
        0.0
    };

    let spawn_radius = radius_for(total, settings.base_density) * settings.fragment_spawn_radius_factor;
    masses
        .into_iter()
        .zip(rel)
        .map(|(mass, v)| {
            let dir = v.try_normalize().unwrap_or(Vec2::X);
            Body::debris(
                com_pos + dir * spawn_radius,
                com_vel + v * scale,
                mass,
                settings.base_density,
                temperature,
                settings.spawn_cooldown,
            )
        })
        .collect()
}

/// Unscaled fragment velocities relative to the center of mass.
fn ejection_velocities<R: Rng + ?Sized>(
    count: usize,
    normal: Vec2,
    mode: FragmentationMode,
    rng: &mut R,
) -> Vec<Vec2> {
    match mode {
        FragmentationMode::Uniform => (0..count)
            .map(|_| random_unit(rng) * (0.5 + rng.gen::<f32>() * 0.5))
            .collect(),
        FragmentationMode::Jets {
            jet_fraction,
            jet_speed,
            scatter_speed,
        } => {
            let jets = ((count as f32 * jet_fraction).round() as usize).min(count);
            let axis = normal.perp();
            (0..count)
                .map(|i| {
                    let speed = 0.5 + rng.gen::<f32>() * 0.5;
                    if i < jets {
                        let side = if i % 2 == 0 { axis } else { -axis };
                        let jitter = (rng.gen::<f32>() - 0.5) * 0.3;
                        Vec2::from_angle(jitter).rotate(side) * speed * jet_speed
                    } else {
                        random_unit(rng) * speed * scatter_speed
                    }
                })
                .collect()
        }
    }
}

fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rng.gen::<f32>() * std::f32::consts::TAU)
}

/// Split `total` into about `count` random pieces that sum to `total`.
///
/// Each piece but the last draws between half and one and a half of an even
/// share, never more than half of what is left; the last takes the
/// remainder. Pieces lighter than `min_mass` are folded into the heaviest
/// piece so none come out below the cutoff. Returns nothing if `total` itself
/// is below the cutoff.
pub fn split_debris<R: Rng + ?Sized>(
    total: f32,
    count: usize,
    min_mass: f32,
    rng: &mut R,
) -> Vec<f32> {
    if !(total >= min_mass && total > 0.0) {
        return Vec::new();
    }
    let count = count.max(1);
    let share = total / count as f32;

    let mut remaining = total;
    let mut pieces = Vec::with_capacity(count);
    for i in 0..count {
        let piece = if i + 1 == count {
            remaining
        } else {
            let draw = share * (0.5 + rng.gen::<f32>());
            if draw >= remaining {
                remaining * 0.5
            } else {
                draw
            }
        };
        remaining -= piece;
        pieces.push(piece);
    }

    let crumbs: f32 = pieces.iter().filter(|&&m| m < min_mass).sum();
    pieces.retain(|&m| m >= min_mass);
    match pieces.iter_mut().max_by(|x, y| (**x).total_cmp(&**y)) {
        Some(heaviest) => *heaviest += crumbs,
        None => pieces.push(total),
    }
    pieces
}
