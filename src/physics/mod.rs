//! Per-body passive state evolution and dynamics, applied in this order each
//! tick: thermal & drag, gravity, integration. Boundary reflection runs after
//! the collision pass.

pub mod gravity;
pub mod integrator;
pub mod thermal;

pub use gravity::{accumulate, Influence};
pub use integrator::{integrate, reflect};
pub use thermal::{apply_cooling, apply_drag, drag_factor};
