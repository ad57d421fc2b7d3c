//! Fixed-step simulation tick
//!
//! Advances every particle once: gravity, continuous collision against all
//! obstacles, mode-specific response, then culling. Particle removal and
//! split children are collected during the pass and committed afterwards, so
//! the collection is never mutated while it is being walked.

use std::mem;

use glam::Vec2;

use super::collision::{
    bounce_velocity, clamp_speed, find_earliest_collision, reflect_velocity, split_velocities,
};
use super::geometry::unit_vector;
use super::state::{LineMode, Particle, Scene};
use super::tone::{TonePlayer, collision_tone};
use crate::consts::*;

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Particles added by the periodic spawner
    pub spawned: u32,
    /// Particles destroyed by burner lines
    pub burned: u32,
    /// Particles replaced by two children
    pub split: u32,
    /// Particles that left the playfield
    pub culled: u32,
    /// Tones handed to the tone player
    pub tones: u32,
}

/// Advance the scene by one frame of `dt_ms` milliseconds
pub fn tick(scene: &mut Scene, dt_ms: f64, tones: &mut impl TonePlayer) -> TickStats {
    let mut stats = TickStats::default();

    if dt_ms.is_finite() && dt_ms > 0.0 {
        scene.clock_ms += dt_ms;
    }
    let now = scene.clock_ms;

    // Periodic spawning; manual mode never spawns here
    if let Some(interval) = scene.spawn_interval_ms() {
        if now - scene.last_spawn_ms >= interval {
            scene.spawn_particle(None);
            scene.last_spawn_ms = now;
            stats.spawned += 1;
        }
    }
    let sound_on = scene.sound_on;

    let particles = mem::take(&mut scene.particles);
    let mut survivors = Vec::with_capacity(particles.len());
    let mut children = Vec::new();

    for mut p in particles {
        p.vel.y += GRAVITY * p.gravity_modifier;
        let from = p.pos;
        let to = from + p.vel * STEP_DAMPING;

        let Some(hit) = find_earliest_collision(from, to, scene.obstacles()) else {
            p.pos = to;
            keep_or_cull(scene, p, &mut survivors, &mut stats);
            continue;
        };
        p.pos = hit.point;

        let Some(line) = scene.line_mut(hit.line) else {
            // Reference came from this scene a moment ago
            survivors.push(p);
            continue;
        };
        let dir = line.dir();

        match line.mode {
            LineMode::Splitter => {
                if p.can_split(now) {
                    let reflected = reflect_velocity(p.vel, dir);
                    for vel in split_velocities(reflected) {
                        let heading = unit_vector(vel);
                        let mut child = Particle::new(
                            0,
                            hit.point + heading * SPLIT_OFFSET,
                            clamp_speed(vel, MAX_SPEED),
                            p.color,
                        );
                        child.scale = p.scale;
                        child.gravity_modifier = p.gravity_modifier;
                        child.last_split_at = Some(now);
                        children.push(child);
                    }
                    stats.split += 1;
                    log::debug!(
                        "Particle {} split at ({:.1}, {:.1})",
                        p.id,
                        hit.point.x,
                        hit.point.y
                    );
                    sound(sound_on, tones, &p, dir, &mut stats);
                } else {
                    // Still cooling down: hold at the contact point
                    sound(sound_on, tones, &p, dir, &mut stats);
                    survivors.push(p);
                }
                continue;
            }
            LineMode::Burner => {
                stats.burned += 1;
                log::debug!("Particle {} burned", p.id);
                continue;
            }
            LineMode::Toggle => {
                line.is_active = !line.is_active;
                // A hit that activates the line passes through silently
                if !line.is_active {
                    p.vel = bounce_velocity(p.vel, dir);
                    sound(sound_on, tones, &p, dir, &mut stats);
                }
            }
            LineMode::Silent => {
                p.vel = bounce_velocity(p.vel, dir);
            }
            LineMode::Draw | LineMode::Erase => {
                p.vel = bounce_velocity(p.vel, dir);
                sound(sound_on, tones, &p, dir, &mut stats);
            }
        }

        // Spend the rest of the step on the new heading
        p.pos += p.vel * (1.0 - hit.t);
        keep_or_cull(scene, p, &mut survivors, &mut stats);
    }

    for mut child in children {
        child.id = scene.next_entity_id();
        survivors.push(child);
    }
    scene.particles = survivors;
    stats
}

fn keep_or_cull(scene: &Scene, p: Particle, survivors: &mut Vec<Particle>, stats: &mut TickStats) {
    if scene.is_out_of_bounds(p.pos) {
        stats.culled += 1;
    } else {
        survivors.push(p);
    }
}

fn sound(
    enabled: bool,
    tones: &mut impl TonePlayer,
    p: &Particle,
    dir: Vec2,
    stats: &mut TickStats,
) {
    if enabled {
        tones.play_tone(collision_tone(&p.scale, dir));
        stats.tones += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BallColor, Line};
    use crate::sim::tone::Tone;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Scene with no baseline, manual spawning and sound on
    fn empty_scene(w: f32, h: f32) -> Scene {
        let mut scene = Scene::new(w, h);
        scene.baseline = None;
        scene.set_drop_rate(0.0);
        scene.sound_on = true;
        scene
    }

    fn place(scene: &mut Scene, pos: Vec2, vel: Vec2) -> u32 {
        let id = scene.next_entity_id();
        scene.particles.push(Particle::new(id, pos, vel, BallColor::Red));
        id
    }

    #[test]
    fn test_free_fall_integrates_gravity_with_damping() {
        let mut scene = empty_scene(400.0, 400.0);
        place(&mut scene, Vec2::new(200.0, 10.0), Vec2::new(0.0, 3.5));

        tick(&mut scene, FRAME_MS, &mut ());
        let p = &scene.particles[0];
        let vy = 3.5 + GRAVITY;
        assert!((p.vel.y - vy).abs() < 1e-6);
        assert!((p.pos.y - (10.0 + vy * STEP_DAMPING)).abs() < 1e-4);
        assert_eq!(p.pos.x, 200.0);
    }

    #[test]
    fn test_falling_ball_bounces_off_horizontal_line() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Draw);
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));

        let mut tones: Vec<Tone> = Vec::new();
        tick(&mut scene, FRAME_MS, &mut tones);

        let p = &scene.particles[0];
        let expected = -(3.5 + GRAVITY) * BOUNCE_REDUCTION_FACTOR;
        assert!((p.vel.y - expected).abs() < 1e-5);
        assert_eq!(p.vel.x, 0.0);
        assert!(p.pos.y < 100.0);
        assert_eq!(tones.len(), 1);
    }

    #[test]
    fn test_silent_line_reflects_without_tone() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Silent);
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));

        let mut tones: Vec<Tone> = Vec::new();
        tick(&mut scene, FRAME_MS, &mut tones);
        assert!(scene.particles[0].vel.y < 0.0);
        assert!(tones.is_empty());
    }

    #[test]
    fn test_sound_off_plays_nothing() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.sound_on = false;
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Draw);
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));

        let mut tones: Vec<Tone> = Vec::new();
        let stats = tick(&mut scene, FRAME_MS, &mut tones);
        assert!(tones.is_empty());
        assert_eq!(stats.tones, 0);
    }

    #[test]
    fn test_burner_destroys_particle() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Burner);
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));

        let mut tones: Vec<Tone> = Vec::new();
        let stats = tick(&mut scene, FRAME_MS, &mut tones);
        assert!(scene.particles.is_empty());
        assert_eq!(stats.burned, 1);
        assert!(tones.is_empty());
    }

    #[test]
    fn test_toggle_reflects_then_passes() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Toggle);
        assert!(scene.lines[0].is_active);

        // First hit deactivates the line and bounces
        let mut tones: Vec<Tone> = Vec::new();
        place(&mut scene, Vec2::new(150.0, 98.0), Vec2::new(0.0, 3.5));
        tick(&mut scene, FRAME_MS, &mut tones);
        assert!(!scene.lines[0].is_active);
        assert!(scene.particles[0].vel.y < 0.0);
        assert_eq!(tones.len(), 1);

        // Second hit reactivates it and the ball goes straight through
        scene.particles.clear();
        place(&mut scene, Vec2::new(250.0, 98.0), Vec2::new(0.0, 3.5));
        tick(&mut scene, FRAME_MS, &mut tones);
        assert!(scene.lines[0].is_active);
        let p = &scene.particles[0];
        assert!(p.vel.y > 0.0);
        assert!(p.pos.y > 100.0);
        assert_eq!(tones.len(), 1);
    }

    #[test]
    fn test_inactive_toggle_passes_first_ball() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Toggle);
        scene.lines[0].is_active = false;
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));

        tick(&mut scene, FRAME_MS, &mut ());
        assert!(scene.lines[0].is_active);
        assert!(scene.particles[0].pos.y > 100.0);
    }

    #[test]
    fn test_splitter_replaces_one_with_two() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Splitter);
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));

        let mut tones: Vec<Tone> = Vec::new();
        let stats = tick(&mut scene, FRAME_MS, &mut tones);
        assert_eq!(stats.split, 1);
        assert_eq!(scene.particles.len(), 2);
        assert_eq!(tones.len(), 1);

        let speed = 3.5 + GRAVITY;
        let (a, b) = (&scene.particles[0], &scene.particles[1]);
        assert!((a.vel.length() - speed).abs() < 1e-4);
        assert!((b.vel.length() - speed).abs() < 1e-4);
        // Reflected straight up, children fan out left and right
        assert!(a.vel.y < 0.0 && b.vel.y < 0.0);
        assert!((a.vel.x + b.vel.x).abs() < 1e-4);
        assert_eq!(a.color, BallColor::Red);
        assert_eq!(a.last_split_at, Some(scene.clock_ms));
        assert_ne!(a.id, b.id);
        // Pushed off the contact point
        let contact = Vec2::new(200.0, 100.0);
        assert!(((a.pos - contact).length() - SPLIT_OFFSET).abs() < 1e-3);
    }

    #[test]
    fn test_splitter_respects_cooldown() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Splitter);
        scene.clock_ms = 1000.0;
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));
        scene.particles[0].last_split_at = Some(950.0);

        let mut tones: Vec<Tone> = Vec::new();
        let stats = tick(&mut scene, FRAME_MS, &mut tones);
        assert_eq!(stats.split, 0);
        assert_eq!(scene.particles.len(), 1);
        // Tone plays even though the split was held back
        assert_eq!(tones.len(), 1);
        let p = &scene.particles[0];
        assert!((p.pos - Vec2::new(200.0, 100.0)).length() < 1e-3);
    }

    #[test]
    fn test_culled_on_crossing_bottom() {
        let mut scene = empty_scene(400.0, 400.0);
        place(&mut scene, Vec2::new(200.0, 398.0), Vec2::new(0.0, 3.5));
        place(&mut scene, Vec2::new(200.0, 390.0), Vec2::new(0.0, 3.5));

        let stats = tick(&mut scene, FRAME_MS, &mut ());
        assert_eq!(stats.culled, 1);
        assert_eq!(scene.particles.len(), 1);
        assert!(scene.particles[0].pos.y <= 400.0);
    }

    #[test]
    fn test_above_top_is_kept() {
        let mut scene = empty_scene(400.0, 400.0);
        place(&mut scene, Vec2::new(200.0, -50.0), Vec2::new(0.0, -3.0));
        tick(&mut scene, FRAME_MS, &mut ());
        assert_eq!(scene.particles.len(), 1);
        assert!(scene.particles[0].pos.y < -50.0);
    }

    #[test]
    fn test_side_exit_is_culled() {
        let mut scene = empty_scene(400.0, 400.0);
        place(&mut scene, Vec2::new(399.0, 200.0), Vec2::new(3.0, 0.0));
        tick(&mut scene, FRAME_MS, &mut ());
        assert!(scene.particles.is_empty());
    }

    #[test]
    fn test_periodic_spawn() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.set_drop_rate(2.0);

        // 500 ms interval
        let stats = tick(&mut scene, 400.0, &mut ());
        assert_eq!(stats.spawned, 0);
        let stats = tick(&mut scene, 100.0, &mut ());
        assert_eq!(stats.spawned, 1);
        assert_eq!(scene.particles.len(), 1);
        assert_eq!(scene.last_spawn_ms, 500.0);
        let stats = tick(&mut scene, 499.0, &mut ());
        assert_eq!(stats.spawned, 0);
    }

    #[test]
    fn test_manual_mode_never_spawns() {
        let mut scene = empty_scene(400.0, 400.0);
        for _ in 0..600 {
            tick(&mut scene, FRAME_MS, &mut ());
        }
        assert!(scene.particles.is_empty());

        scene.spawn_particle(Some(BallColor::Blue));
        tick(&mut scene, FRAME_MS, &mut ());
        assert_eq!(scene.particles.len(), 1);
    }

    #[test]
    fn test_baseline_bounces_spawned_ball() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.set_drop_rate(0.0);
        scene.spawn_particle(None);

        let mut bounced = false;
        for _ in 0..300 {
            tick(&mut scene, FRAME_MS, &mut ());
            let p = &scene.particles[0];
            if p.vel.y < 0.0 {
                let baseline = scene.baseline.as_ref().expect("baseline untouched");
                let frac = (p.pos.x - baseline.start.x) / (baseline.end.x - baseline.start.x);
                let line_y = baseline.start.y + (baseline.end.y - baseline.start.y) * frac;
                assert!(p.pos.y < line_y);
                bounced = true;
                break;
            }
        }
        assert!(bounced);
    }

    #[test]
    fn test_split_children_are_appended_after_survivors() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Splitter);
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));
        let bystander = place(&mut scene, Vec2::new(50.0, 300.0), Vec2::ZERO);

        tick(&mut scene, FRAME_MS, &mut ());
        assert_eq!(scene.particles.len(), 3);
        assert_eq!(scene.particles[0].id, bystander);
    }

    #[test]
    fn test_erase_mode_line_from_restore_acts_as_draw() {
        let mut scene = empty_scene(400.0, 400.0);
        let (a, b) = (Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0));
        scene.lines.push(Line::new(a, b, LineMode::Erase));
        place(&mut scene, Vec2::new(200.0, 98.0), Vec2::new(0.0, 3.5));

        let mut tones: Vec<Tone> = Vec::new();
        tick(&mut scene, FRAME_MS, &mut tones);
        assert!(scene.particles[0].vel.y < 0.0);
        assert_eq!(tones.len(), 1);
    }

    #[test]
    fn test_landing_exactly_on_line_bounces_once() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Draw);
        // 20 * 0.85 = 17: this step ends exactly on the line
        place(&mut scene, Vec2::new(200.0, 83.0), Vec2::new(0.0, 20.0));
        scene.particles[0].gravity_modifier = 0.0;

        let mut tones: Vec<Tone> = Vec::new();
        tick(&mut scene, FRAME_MS, &mut tones);
        assert_eq!(scene.particles[0].pos, Vec2::new(200.0, 100.0));
        assert!(tones.is_empty());

        tick(&mut scene, FRAME_MS, &mut tones);
        let p = &scene.particles[0];
        assert!(p.vel.y < 0.0);
        assert!(p.pos.y < 100.0);
        assert_eq!(tones.len(), 1);

        // Moving away, the line is not hit again
        tick(&mut scene, FRAME_MS, &mut tones);
        assert!(scene.particles[0].pos.y < 100.0);
        assert_eq!(tones.len(), 1);
    }

    #[test]
    fn test_toggle_landing_exactly_on_line_flips_once() {
        let mut scene = empty_scene(400.0, 400.0);
        scene.add_line(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0), LineMode::Toggle);
        place(&mut scene, Vec2::new(200.0, 83.0), Vec2::new(0.0, 20.0));
        scene.particles[0].gravity_modifier = 0.0;

        for _ in 0..3 {
            tick(&mut scene, FRAME_MS, &mut ());
        }
        assert!(!scene.lines[0].is_active);
        assert!(scene.particles[0].pos.y < 100.0);
    }
}
