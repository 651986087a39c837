//! Collision detection and response for the rectangular play field
//!
//! Detection is pure: `detect` looks at one ball against the walls, the paddle,
//! the bricks and the killzone and returns typed events in a fixed order.
//! `resolve` then hands those events to the ball, which corrects its own
//! position and velocity and forwards paddle/brick hits to its effects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::brick::Brick;
use super::effects::EffectContext;
use super::paddle::Paddle;
use crate::tuning::FieldConfig;

/// What the ball touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    Wall,
    Paddle,
    /// `index` into the brick collection for this tick, `id` for reporting
    Brick { index: usize, id: u32 },
    Killzone,
}

/// Geometric overlap between a ball and one surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Closest point on the surface
    pub point: Vec2,
    /// Surface normal pointing toward the ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

/// One collision for one ball this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub kind: ContactKind,
    pub point: Vec2,
    pub normal: Vec2,
    pub penetration: f32,
}

impl CollisionEvent {
    fn new(kind: ContactKind, contact: Contact) -> Self {
        Self {
            kind,
            point: contact.point,
            normal: contact.normal,
            penetration: contact.penetration,
        }
    }
}

/// Circle against an axis-aligned box given by center and half extents
///
/// When the circle center is inside the box the normal is taken along the
/// axis of least overlap.
pub fn circle_aabb(center: Vec2, radius: f32, box_center: Vec2, half: Vec2) -> Option<Contact> {
    let closest = center.clamp(box_center - half, box_center + half);
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 1e-12 {
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Contact {
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        });
    }

    // Center inside the box
    let local = center - box_center;
    let overlap_x = half.x - local.x.abs();
    let overlap_y = half.y - local.y.abs();
    if overlap_x < overlap_y {
        let sign = if local.x < 0.0 { -1.0 } else { 1.0 };
        Some(Contact {
            point: Vec2::new(box_center.x + sign * half.x, center.y),
            normal: Vec2::new(sign, 0.0),
            penetration: overlap_x + radius,
        })
    } else {
        let sign = if local.y < 0.0 { -1.0 } else { 1.0 };
        Some(Contact {
            point: Vec2::new(center.x, box_center.y + sign * half.y),
            normal: Vec2::new(0.0, sign),
            penetration: overlap_y + radius,
        })
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

fn wall_contacts(pos: Vec2, radius: f32, field: &FieldConfig) -> Vec<Contact> {
    let mut contacts = Vec::new();
    if pos.x - radius <= -field.half_width {
        contacts.push(Contact {
            point: Vec2::new(-field.half_width, pos.y),
            normal: Vec2::X,
            penetration: -field.half_width - (pos.x - radius),
        });
    }
    if pos.x + radius >= field.half_width {
        contacts.push(Contact {
            point: Vec2::new(field.half_width, pos.y),
            normal: Vec2::NEG_X,
            penetration: pos.x + radius - field.half_width,
        });
    }
    if pos.y + radius >= field.top {
        contacts.push(Contact {
            point: Vec2::new(pos.x, field.top),
            normal: Vec2::NEG_Y,
            penetration: pos.y + radius - field.top,
        });
    }
    contacts
}

/// Every contact for `ball` this tick: walls, paddle, bricks in field order, killzone
///
/// The paddle only registers while the ball is descending, at most once.
/// Inactive bricks and bricks in the ball's pass-through set are skipped.
pub fn detect(ball: &Ball, paddle: &Paddle, bricks: &[Brick], field: &FieldConfig) -> Vec<CollisionEvent> {
    let pos = ball.pos;
    let radius = ball.collision_radius();
    let mut events: Vec<CollisionEvent> = wall_contacts(pos, radius, field)
        .into_iter()
        .map(|c| CollisionEvent::new(ContactKind::Wall, c))
        .collect();

    if ball.vel.y < 0.0 {
        let half = Vec2::new(paddle.half_width(), paddle.height / 2.0);
        if let Some(contact) = circle_aabb(pos, radius, paddle.pos, half) {
            events.push(CollisionEvent::new(ContactKind::Paddle, contact));
        }
    }

    for (index, brick) in bricks.iter().enumerate() {
        if !brick.active || ball.pass_through.contains(&brick.id) {
            continue;
        }
        if let Some(contact) = circle_aabb(pos, radius, brick.pos, brick.half_size()) {
            events.push(CollisionEvent::new(
                ContactKind::Brick {
                    index,
                    id: brick.id,
                },
                contact,
            ));
        }
    }

    if pos.y - radius <= field.killzone_y {
        events.push(CollisionEvent {
            kind: ContactKind::Killzone,
            point: Vec2::new(pos.x, field.killzone_y),
            normal: Vec2::Y,
            penetration: field.killzone_y - (pos.y - radius),
        });
    }

    events
}

/// Apply `events` to `ball` in order
///
/// Walls and the first brick reflect the ball; the paddle sets the bounce
/// velocity. Every brick event deals the ball's damage and then runs the
/// ball's brick effects. Processing stops once the ball is destroyed or stuck
/// to the paddle.
pub fn resolve(ball: &mut Ball, events: &[CollisionEvent], ctx: &mut EffectContext<'_>) {
    let mut reflected_off_brick = false;

    for event in events {
        match event.kind {
            ContactKind::Wall => {
                ball.pos += event.normal * event.penetration;
                if ball.vel.dot(event.normal) < 0.0 {
                    ball.set_velocity(reflect_velocity(ball.vel, event.normal));
                }
            }
            ContactKind::Paddle => {
                ball.pos += event.normal * event.penetration;
                ball.set_velocity(ctx.paddle.bounce_velocity(event.point.x, ball.speed));
                ball.on_hit_paddle(ctx);
            }
            ContactKind::Brick { index, id } => {
                // An earlier event this tick may already have destroyed it
                let still_active = ctx.bricks.get(index).is_some_and(|b| b.active && b.id == id);
                if !still_active {
                    log::debug!("Ball {} skipped inactive brick {}", ball.id, id);
                    continue;
                }
                if !reflected_off_brick {
                    reflected_off_brick = true;
                    ball.pos += event.normal * event.penetration;
                    if ball.vel.dot(event.normal) < 0.0 {
                        ball.set_velocity(reflect_velocity(ball.vel, event.normal));
                    }
                }
                ctx.damage_brick(index, ball.damage);
                ball.on_hit_brick(index, ctx);
            }
            ContactKind::Killzone => {
                ball.on_hit_killzone(ctx.field.killzone_y);
            }
        }

        if ball.destroyed || ball.attached_to_paddle {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRng;
    use crate::sim::effects::{Effect, EffectKind, MatchRequests};
    use crate::tuning::BallConfig;
    use rand::SeedableRng;

    fn free_ball(pos: Vec2, vel: Vec2) -> Ball {
        let mut ball = Ball::new(1, &BallConfig::default());
        ball.is_launched = true;
        ball.attached_to_paddle = false;
        ball.pos = pos;
        ball.set_velocity(vel);
        ball
    }

    fn brick(id: u32, x: f32, y: f32) -> Brick {
        Brick::new(id, Vec2::new(x, y), Vec2::new(1.0, 0.4), 2, 10, false)
    }

    #[test]
    fn test_circle_aabb_outside_and_miss() {
        let hit = circle_aabb(Vec2::new(0.0, 0.5), 0.4, Vec2::ZERO, Vec2::new(1.0, 0.2));
        let contact = hit.expect("overlapping");
        assert!((contact.normal - Vec2::Y).length() < 1e-6);
        assert!((contact.penetration - 0.1).abs() < 1e-5);

        assert!(circle_aabb(Vec2::new(0.0, 1.0), 0.4, Vec2::ZERO, Vec2::new(1.0, 0.2)).is_none());
    }

    #[test]
    fn test_circle_aabb_center_inside_uses_least_overlap() {
        let contact = circle_aabb(Vec2::new(0.9, 0.0), 0.1, Vec2::ZERO, Vec2::new(1.0, 0.5))
            .expect("inside");
        assert_eq!(contact.normal, Vec2::X);
        assert!((contact.penetration - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(3.0, -4.0), Vec2::Y);
        assert_eq!(reflected, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_detect_orders_walls_paddle_bricks_killzone() {
        let field = FieldConfig {
            half_width: 1.0,
            top: 10.0,
            killzone_y: -1.0,
        };
        let paddle = Paddle {
            pos: Vec2::new(0.8, -0.9),
            ..Default::default()
        };
        let bricks = vec![brick(5, 1.0, -0.9)];
        let ball = free_ball(Vec2::new(0.9, -0.9), Vec2::new(1.0, -1.0));

        let kinds: Vec<ContactKind> = detect(&ball, &paddle, &bricks, &field)
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ContactKind::Wall,
                ContactKind::Paddle,
                ContactKind::Brick { index: 0, id: 5 },
                ContactKind::Killzone,
            ]
        );
    }

    #[test]
    fn test_detect_paddle_only_when_descending() {
        let field = FieldConfig::default();
        let paddle = Paddle::default();
        let above = Vec2::new(0.0, paddle.top() + 0.1);

        let rising = free_ball(above, Vec2::new(0.0, 5.0));
        assert!(detect(&rising, &paddle, &[], &field).is_empty());

        let falling = free_ball(above, Vec2::new(0.0, -5.0));
        let events = detect(&falling, &paddle, &[], &field);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ContactKind::Paddle);
    }

    #[test]
    fn test_detect_skips_inactive_and_pass_through() {
        let field = FieldConfig::default();
        let paddle = Paddle::default();
        let mut bricks = vec![brick(1, 0.0, 2.0), brick(2, 0.3, 2.0), brick(3, -0.3, 2.0)];
        bricks[0].active = false;
        let mut ball = free_ball(Vec2::new(0.0, 1.7), Vec2::new(0.0, 5.0));
        ball.pass_through.insert(3);

        let events = detect(&ball, &paddle, &bricks, &field);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ContactKind::Brick { index: 1, id: 2 });
    }

    #[test]
    fn test_resolve_brick_reflects_once_and_damages_each() {
        let field = FieldConfig::default();
        let paddle = Paddle::default();
        let mut bricks = vec![brick(1, -0.5, 2.0), brick(2, 0.5, 2.0)];
        let mut ball = free_ball(Vec2::new(0.0, 1.7), Vec2::new(0.0, 5.0));
        let events = detect(&ball, &paddle, &bricks, &field);
        assert_eq!(events.len(), 2);

        let mut rng = SimRng::seed_from_u64(1);
        let mut requests = MatchRequests::default();
        let mut ctx = EffectContext {
            bricks: &mut bricks,
            paddle: &paddle,
            field: &field,
            rng: &mut rng,
            dt: 1.0 / 120.0,
            requests: &mut requests,
        };
        resolve(&mut ball, &events, &mut ctx);

        assert!(ball.vel.y < 0.0);
        assert_eq!(bricks[0].health, 1);
        assert_eq!(bricks[1].health, 1);
        assert_eq!(requests.brick_hits.len(), 2);
    }

    #[test]
    fn test_resolve_paddle_bounce_uses_contact_offset() {
        let field = FieldConfig::default();
        let paddle = Paddle::default();
        let mut ball = free_ball(
            Vec2::new(paddle.pos.x + paddle.half_width() / 2.0, paddle.top() + 0.1),
            Vec2::new(0.0, -10.0),
        );
        ball.effects.push(Effect::Stick { chance: 0.0 });
        let events = detect(&ball, &paddle, &[], &field);

        let mut bricks: Vec<Brick> = Vec::new();
        let mut rng = SimRng::seed_from_u64(1);
        let mut requests = MatchRequests::default();
        let mut ctx = EffectContext {
            bricks: &mut bricks,
            paddle: &paddle,
            field: &field,
            rng: &mut rng,
            dt: 1.0 / 120.0,
            requests: &mut requests,
        };
        resolve(&mut ball, &events, &mut ctx);

        assert!(ball.vel.x > 0.0 && ball.vel.y > 0.0);
        assert!((ball.vel.length() - ball.speed).abs() < 1e-3);
        assert!(ball.pos.y >= paddle.top() + ball.collision_radius() - 1e-4);
    }

    #[test]
    fn test_resolve_paddle_side_contact_pushes_sideways() {
        let field = FieldConfig::default();
        let paddle = Paddle::default();
        let radius = Ball::new(1, &BallConfig::default()).collision_radius();
        // Beside the paddle's right edge, below its top
        let start = Vec2::new(
            paddle.pos.x + paddle.half_width() + radius * 0.5,
            paddle.pos.y,
        );
        let mut ball = free_ball(start, Vec2::new(0.0, -10.0));
        let events = detect(&ball, &paddle, &[], &field);
        assert_eq!(events.len(), 1);
        assert!((events[0].normal - Vec2::X).length() < 1e-5);

        let mut bricks: Vec<Brick> = Vec::new();
        let mut rng = SimRng::seed_from_u64(1);
        let mut requests = MatchRequests::default();
        let mut ctx = EffectContext {
            bricks: &mut bricks,
            paddle: &paddle,
            field: &field,
            rng: &mut rng,
            dt: 1.0 / 120.0,
            requests: &mut requests,
        };
        resolve(&mut ball, &events, &mut ctx);

        assert_eq!(ball.pos.y, start.y);
        assert!((ball.pos.x - (paddle.pos.x + paddle.half_width() + radius)).abs() < 1e-4);
        assert!(ball.vel.y > 0.0);
    }

    #[test]
    fn test_resolve_skips_brick_destroyed_earlier_in_the_tick() {
        let field = FieldConfig::default();
        let paddle = Paddle::default();
        let mut bricks = vec![
            Brick::new(1, Vec2::new(-0.5, 2.0), Vec2::new(1.0, 0.4), 1, 10, false),
            Brick::new(2, Vec2::new(0.5, 2.0), Vec2::new(1.0, 0.4), 1, 10, false),
        ];
        let mut ball = free_ball(Vec2::new(0.0, 1.7), Vec2::new(0.0, 5.0));
        ball.effects.push(Effect::Explode {
            chance: 1.0,
            radius_multiplier: 4.0,
        });
        let events = detect(&ball, &paddle, &bricks, &field);
        assert_eq!(events.len(), 2);

        let mut rng = SimRng::seed_from_u64(1);
        let mut requests = MatchRequests::default();
        let mut ctx = EffectContext {
            bricks: &mut bricks,
            paddle: &paddle,
            field: &field,
            rng: &mut rng,
            dt: 1.0 / 120.0,
            requests: &mut requests,
        };
        resolve(&mut ball, &events, &mut ctx);

        assert!(bricks.iter().all(|b| !b.active));
        let hit_ids: Vec<u32> = requests.brick_hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(hit_ids, vec![1, 2]);
        assert_eq!(requests.triggered, vec![EffectKind::Explode]);
    }

    #[test]
    fn test_resolve_killzone_destroys_and_stops() {
        let field = FieldConfig::default();
        let paddle = Paddle {
            pos: Vec2::new(6.0, -4.0),
            ..Default::default()
        };
        let mut ball = free_ball(Vec2::new(0.0, field.killzone_y), Vec2::new(0.0, -10.0));
        let events = detect(&ball, &paddle, &[], &field);
        assert_eq!(events.last().map(|e| e.kind), Some(ContactKind::Killzone));

        let mut bricks: Vec<Brick> = Vec::new();
        let mut rng = SimRng::seed_from_u64(1);
        let mut requests = MatchRequests::default();
        let mut ctx = EffectContext {
            bricks: &mut bricks,
            paddle: &paddle,
            field: &field,
            rng: &mut rng,
            dt: 1.0 / 120.0,
            requests: &mut requests,
        };
        resolve(&mut ball, &events, &mut ctx);
        assert!(ball.destroyed);
    }
}
