use glam::Vec2;

/// Which interaction produced the `delta` being evaluated. The wall kinds
/// carry the side so a law can treat walls asymmetrically if it wants to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceKind {
    Node,
    ConnectedNode,
    LeftBound,
    RightBound,
    UpBound,
    DownBound,
}

/// Force felt by a point given its offset `delta` from the interaction
/// source and the configured rest distance. Positive results along `delta`
/// push the point away from the source.
pub trait ForceLaw {
    fn compute(&self, delta: Vec2, target_distance: f32, kind: ForceKind) -> Vec2;
}

/// The stock tuning. Unconnected points repel inside the rest distance and
/// attract weakly beyond it; connected points behave as a stiff spring with
/// rest length at half the distance; walls only push back once a point gets
/// within half the rest distance of them.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultForceLaw;

impl ForceLaw for DefaultForceLaw {
    fn compute(&self, delta: Vec2, target_distance: f32, kind: ForceKind) -> Vec2 {
        match kind {
            ForceKind::Node => {
                let x = delta.length() - target_distance;
                if x >= 0.0 {
                    // Past the rest distance: gentle square-root pull back.
                    delta.normalize_or_zero() * (x.abs().sqrt() * 10.0)
                } else {
                    // Inside it: cubic repulsion that stiffens on approach.
                    delta.normalize_or_zero() * (x / 10.0).powi(3)
                }
            }
            ForceKind::ConnectedNode => {
                let x = delta.length() - target_distance / 2.0;
                delta.normalize_or_zero() * (x * x * sign(x))
            }
            ForceKind::LeftBound
            | ForceKind::RightBound
            | ForceKind::UpBound
            | ForceKind::DownBound => {
                let mut x = wall_distance(delta, kind);
                let s = sign(x);
                x -= target_distance / 2.0;
                if x > 0.0 {
                    Vec2::ZERO
                } else {
                    delta.normalize_or_zero() * (x * x * s)
                }
            }
        }
    }
}

pub(crate) fn sign(a: f32) -> f32 {
    if a > 0.0 {
        1.0
    } else if a < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// Wall deltas are axis-aligned: left/up walls hand in the raw coordinate,
// right/down walls the coordinate minus the bound. Negating the latter
// yields the distance into the interior, negative once the point has
// crossed the wall.
fn wall_distance(delta: Vec2, kind: ForceKind) -> f32 {
    match kind {
        ForceKind::LeftBound => delta.x,
        ForceKind::RightBound => -delta.x,
        ForceKind::UpBound => delta.y,
        ForceKind::DownBound => -delta.y,
        ForceKind::Node | ForceKind::ConnectedNode => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    const D: f32 = 200.0;

    #[test]
    fn unconnected_points_repel_inside_rest_distance() {
        let law = DefaultForceLaw;
        let force = law.compute(vec2(50.0, 0.0), D, ForceKind::Node);
        // delta points from the other node to us; repulsion keeps that sign
        // negative because x is negative and cubed.
        assert!(force.x < 0.0);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn unconnected_points_attract_beyond_rest_distance() {
        let law = DefaultForceLaw;
        let force = law.compute(vec2(300.0, 0.0), D, ForceKind::Node);
        assert!(force.x > 0.0);
    }

    #[test]
    fn repulsion_stiffens_on_approach() {
        let law = DefaultForceLaw;
        let near = law.compute(vec2(20.0, 0.0), D, ForceKind::Node).length();
        let far = law.compute(vec2(80.0, 0.0), D, ForceKind::Node).length();
        assert!(near > far);
    }

    #[test]
    fn connected_points_spring_around_half_rest_distance() {
        let law = DefaultForceLaw;
        let stretched = law.compute(vec2(150.0, 0.0), D, ForceKind::ConnectedNode);
        let compressed = law.compute(vec2(50.0, 0.0), D, ForceKind::ConnectedNode);
        let at_rest = law.compute(vec2(100.0, 0.0), D, ForceKind::ConnectedNode);

        assert!(stretched.x > 0.0);
        assert!(compressed.x < 0.0);
        assert_eq!(at_rest, Vec2::ZERO);
    }

    #[test]
    fn walls_are_silent_outside_the_margin() {
        let law = DefaultForceLaw;
        // 150 from the left wall, margin is D/2 = 100.
        let force = law.compute(vec2(150.0, 0.0), D, ForceKind::LeftBound);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn walls_push_back_inside_the_margin() {
        let law = DefaultForceLaw;
        // 30 from the left wall: push is along +x, away from the wall.
        let left = law.compute(vec2(30.0, 0.0), D, ForceKind::LeftBound);
        assert!(left.x > 0.0);

        // 30 inside the right wall: delta = position.x - bounds.x = -30,
        // push is back toward the interior.
        let right = law.compute(vec2(-30.0, 0.0), D, ForceKind::RightBound);
        assert!(right.x < 0.0);

        let up = law.compute(vec2(0.0, 40.0), D, ForceKind::UpBound);
        assert!(up.y > 0.0);
    }
}
