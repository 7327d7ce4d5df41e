use crate::body::Body;
use crate::config::Bounds;

/// Semi-implicit Euler with a unit step: velocity first, then position with
/// the updated velocity.
pub fn integrate(body: &mut Body) {
    body.vel += body.acc;
    body.pos += body.vel;
}

/// Elastic walls: flip the velocity component on any axis where the body's
/// edge pokes outside `[0, width] x [0, height]`. Position is left alone.
pub fn reflect(body: &mut Body, bounds: &Bounds) {
    let r = body.radius();
    if body.pos.x + r > bounds.width || body.pos.x - r < 0.0 {
        body.vel.x = -body.vel.x;
    }
    if body.pos.y + r > bounds.height || body.pos.y - r < 0.0 {
        body.vel.y = -body.vel.y;
    }
}
