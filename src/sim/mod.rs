//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only enters through explicit deltas
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod breathing;
pub mod clock;
pub mod collision;
pub mod entity;
pub mod pacer;
pub mod registry;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use breathing::{BreathPhase, BreathTiming, BreathingController, BreathingCycleState, PlayerEntity};
pub use clock::Clock;
pub use collision::{Aabb, CollisionKind, boundary_collision, collides, detect};
pub use entity::{Anchor, Cloud, Obstacle};
pub use pacer::{BreathingPattern, Pacer, PacerPhase};
pub use registry::{AdvanceReport, EntityRegistry};
pub use score::{ScoreAccumulator, compute_score};
pub use spawn::{ProceduralSpawner, Spawned, obstacle_probability};
pub use state::{PlayField, SessionSummary, Simulation};
pub use tick::{TickOutcome, tick};
