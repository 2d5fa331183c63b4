//! Scene projection

use super::{DrawCommand, colors};
use crate::sim::{Cloud, Obstacle, PlayField, PlayerEntity, Simulation};

/// Ground stripe spacing in pixels
const STRIPE_SPACING: f32 = 40.0;
/// Ground scroll in pixels per distance unit
const GROUND_SCROLL: f64 = 16.0;

/// Everything a frame needs, borrowed from the simulation
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub field: PlayField,
    pub player: &'a PlayerEntity,
    pub obstacles: &'a [Obstacle],
    pub clouds: &'a [Cloud],
    pub distance_traveled: f64,
    pub score: u64,
}

impl<'a> SceneView<'a> {
    /// Borrow the current frame from a simulation
    pub fn of(sim: &'a Simulation) -> Self {
        Self {
            field: sim.field,
            player: sim.breathing.player(),
            obstacles: sim.entities.obstacles(),
            clouds: sim.entities.clouds(),
            distance_traveled: sim.score.distance(),
            score: sim.score.score(),
        }
    }
}

/// Build the draw list for one frame, back to front
pub fn render(scene: &SceneView<'_>) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(8 + scene.clouds.len() * 3 + scene.obstacles.len() * 2);

    out.push(DrawCommand::Clear { color: colors::SKY });

    for cloud in scene.clouds {
        cloud_puffs(cloud, &mut out);
    }

    for obstacle in scene.obstacles {
        out.push(DrawCommand::Rect {
            x: obstacle.pos.x,
            y: obstacle.pos.y,
            w: obstacle.size.x,
            h: obstacle.size.y,
            color: colors::OBSTACLE,
        });
        // Darker lip on the free end
        let lip = 6.0_f32.min(obstacle.size.y);
        let lip_y = if obstacle.pos.y <= 0.0 {
            obstacle.pos.y + obstacle.size.y - lip
        } else {
            obstacle.pos.y
        };
        out.push(DrawCommand::Rect {
            x: obstacle.pos.x,
            y: lip_y,
            w: obstacle.size.x,
            h: lip,
            color: colors::OBSTACLE_EDGE,
        });
    }

    balloon(scene, &mut out);
    ground(scene, &mut out);

    out
}

fn cloud_puffs(cloud: &Cloud, out: &mut Vec<DrawCommand>) {
    let r = cloud.size.y * 0.5;
    let cy = cloud.pos.y + r;
    for fx in [0.25, 0.5, 0.75] {
        out.push(DrawCommand::Circle {
            x: cloud.pos.x + cloud.size.x * fx,
            y: cy,
            radius: if fx == 0.5 { r * 1.2 } else { r },
            color: colors::CLOUD,
        });
    }
}

/// Balloon envelope in the upper part of the player box, basket below
fn balloon(scene: &SceneView<'_>, out: &mut Vec<DrawCommand>) {
    let player = scene.player;
    let top = player.y(&scene.field);
    let cx = player.x + player.size * 0.5;
    let radius = player.size * 0.35;
    let cy = top + radius;
    let basket_h = player.size * 0.18;
    let basket_w = player.size * 0.3;
    let basket_y = top + player.size - basket_h;

    out.push(DrawCommand::Line {
        from: [cx, cy + radius],
        to: [cx, basket_y],
        width: 1.5,
        color: colors::TETHER,
    });
    out.push(DrawCommand::Circle {
        x: cx,
        y: cy,
        radius,
        color: colors::BALLOON,
    });
    out.push(DrawCommand::Circle {
        x: cx - radius * 0.35,
        y: cy - radius * 0.35,
        radius: radius * 0.3,
        color: colors::BALLOON_HIGHLIGHT,
    });
    out.push(DrawCommand::Rect {
        x: cx - basket_w * 0.5,
        y: basket_y,
        w: basket_w,
        h: basket_h,
        color: colors::BASKET,
    });
}

fn ground(scene: &SceneView<'_>, out: &mut Vec<DrawCommand>) {
    let field = scene.field;
    let ground_y = field.ground_y();
    out.push(DrawCommand::Rect {
        x: 0.0,
        y: ground_y,
        w: field.width,
        h: field.height - ground_y,
        color: colors::GROUND,
    });

    let offset = ((scene.distance_traveled * GROUND_SCROLL) % STRIPE_SPACING as f64) as f32;
    let mut x = -offset;
    while x < field.width {
        out.push(DrawCommand::Rect {
            x,
            y: ground_y,
            w: STRIPE_SPACING * 0.5,
            h: 4.0,
            color: colors::GROUND_STRIPE,
        });
        x += STRIPE_SPACING;
    }
}
