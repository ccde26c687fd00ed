//! Side-scrolling corridor profile
//!
//! A corridor level is a tunnel along +x. Each segment bends the floor,
//! ceiling or lateral half-width over its own x-range, and the results add up.
//! The profile is expensive to evaluate so it is sampled once per level and
//! linearly interpolated at query time.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bounds::Sphere;
use super::level::{CorridorParams, Pad, Segment, SegmentKind};
use crate::consts::PAD_HEIGHT;
use crate::{bell, lerp, smoothstep};

/// Evenly spaced samples taken along the route
pub const PROFILE_SAMPLES: usize = 256;

/// Vertical shift per unit of curve value
const CURVE_RISE: f32 = 2.2;
/// Extra headroom added to every ceiling after the segment sweep
const CEILING_VISUAL_MARGIN: f32 = 0.35;
/// Floor and ceiling never get closer than this
const MIN_CLEARANCE: f32 = 2.4;
/// Fraction of a walls segment spent ramping in (and out)
const WALL_RAMP: f32 = 0.15;
/// Pad-end blending starts this far past the pad edge...
const PAD_BLEND_NEAR: f32 = 0.5;
/// ...and is complete this far out
const PAD_BLEND_FAR: f32 = 6.0;
/// Half-width kept around a pad beyond its own half-size
const PAD_WIDTH_MARGIN: f32 = 2.5;
/// Samples extend this far past the outer pad edges
const SAMPLE_OVERHANG: f32 = 2.0;

/// Corridor cross-section at one x
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorProfile {
    pub floor: f32,
    pub ceiling: f32,
    pub half_width: f32,
}

impl CorridorProfile {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            floor: lerp(a.floor, b.floor, t),
            ceiling: lerp(a.ceiling, b.ceiling, t),
            half_width: lerp(a.half_width, b.half_width, t),
        }
    }

    /// Blend toward an open, flat cross-section around a pad
    fn open_toward(self, base: f32, open_ceiling: f32, min_half: f32, w: f32) -> Self {
        Self {
            floor: lerp(self.floor, base, w),
            ceiling: lerp(self.ceiling, self.ceiling.max(open_ceiling), w),
            half_width: lerp(self.half_width, self.half_width.max(min_half), w),
        }
    }
}

/// Exact corridor cross-section at `x` (walks every segment)
pub fn profile_at(
    x: f32,
    params: &CorridorParams,
    launch: &Pad,
    landing: &Pad,
) -> CorridorProfile {
    let base_ceiling = params.base_half_height * 2.0;
    let rise = curve_offset(x, &params.segments) * CURVE_RISE;
    let mut p = CorridorProfile {
        floor: rise,
        ceiling: base_ceiling + rise,
        half_width: params.base_half_width,
    };

    for seg in &params.segments {
        // Half-open so chained segments don't both count at the seam
        if x < seg.x0 || x >= seg.x1 {
            continue;
        }
        let t = (x - seg.x0) / (seg.x1 - seg.x0);

        match &seg.kind {
            SegmentKind::Walls { half_width } => {
                let ramp_in = smoothstep(0.0, WALL_RAMP, t);
                let ramp_out = 1.0 - smoothstep(1.0 - WALL_RAMP, 1.0, t);
                p.half_width += (half_width - params.base_half_width) * ramp_in * ramp_out;
            }
            SegmentKind::Arch { drop } => p.ceiling -= drop * bell(t),
            SegmentKind::Dip { depth } => p.floor -= depth * bell(t),
            SegmentKind::Mound { height } => p.floor += height * bell(t),
            // Curves are handled by `curve_offset`
            SegmentKind::Curve { .. }
            | SegmentKind::Straight
            | SegmentKind::Rocks { .. }
            | SegmentKind::FinishApproach => {}
        }
    }

    p.ceiling += CEILING_VISUAL_MARGIN;
    let open_ceiling = base_ceiling + CEILING_VISUAL_MARGIN;

    let launch_edge = launch.center.x + launch.half();
    let w_launch = 1.0
        - smoothstep(
            launch_edge + PAD_BLEND_NEAR,
            launch_edge + PAD_BLEND_FAR,
            x,
        );
    p = p.open_toward(
        pad_base(launch),
        open_ceiling,
        launch.half() + PAD_WIDTH_MARGIN,
        w_launch,
    );

    let landing_edge = landing.center.x - landing.half();
    let (blend_start, blend_end) = match params.finish_approach() {
        Some((x0, _)) => (x0, (landing_edge - PAD_BLEND_NEAR).max(x0)),
        None => (landing_edge - PAD_BLEND_FAR, landing_edge - PAD_BLEND_NEAR),
    };
    let w_landing = smoothstep(blend_start, blend_end, x);
    p = p.open_toward(
        pad_base(landing),
        open_ceiling,
        landing.half() + PAD_WIDTH_MARGIN,
        w_landing,
    );

    p.ceiling = p.ceiling.max(p.floor + MIN_CLEARANCE);
    p
}

/// Curve value at `x`
///
/// Inside a curve this blends `from` to `to`. Past it the last `to` holds
/// until the next curve begins, so the route never steps back to zero.
fn curve_offset(x: f32, segments: &[Segment]) -> f32 {
    let mut carried: Option<(f32, f32)> = None;
    for seg in segments {
        let SegmentKind::Curve { from, to } = seg.kind else {
            continue;
        };
        if x >= seg.x0 && x < seg.x1 {
            let t = (x - seg.x0) / (seg.x1 - seg.x0);
            return lerp(from, to, smoothstep(0.0, 1.0, t));
        }
        if seg.x1 <= x && carried.is_none_or(|(end, _)| seg.x1 >= end) {
            carried = Some((seg.x1, to));
        }
    }
    carried.map_or(0.0, |(_, to)| to)
}

#[inline]
fn pad_base(pad: &Pad) -> f32 {
    pad.center.y - PAD_HEIGHT * 0.5
}

/// Sampled corridor plus its rock colliders
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorField {
    x_min: f32,
    x_max: f32,
    samples: Vec<CorridorProfile>,
    rocks: Vec<Sphere>,
    finish_start: f32,
}

impl CorridorField {
    pub fn build(params: &CorridorParams, launch: &Pad, landing: &Pad) -> Self {
        let x_min = (launch.center.x - launch.half()).min(landing.center.x - landing.half())
            - SAMPLE_OVERHANG;
        let x_max = (launch.center.x + launch.half()).max(landing.center.x + landing.half())
            + SAMPLE_OVERHANG;

        let samples = (0..PROFILE_SAMPLES)
            .map(|i| {
                let t = i as f32 / (PROFILE_SAMPLES - 1) as f32;
                profile_at(lerp(x_min, x_max, t), params, launch, landing)
            })
            .collect();

        let finish_start = params
            .finish_approach()
            .map(|(x0, _)| x0)
            .unwrap_or(landing.center.x - landing.half() - PAD_BLEND_FAR);

        let mut field = Self {
            x_min,
            x_max,
            samples,
            rocks: Vec::new(),
            finish_start,
        };

        let rocks: Vec<Sphere> = params
            .segments
            .iter()
            .filter_map(|s| match &s.kind {
                SegmentKind::Rocks { items } => Some(items),
                _ => None,
            })
            .flatten()
            .map(|rock| Sphere {
                center: Vec3::new(rock.x, field.sample_at(rock.x).floor + rock.y, rock.z),
                radius: rock.r * (rock.sx + rock.sy + rock.sz) / 3.0,
            })
            .collect();
        field.rocks = rocks;

        log::debug!(
            "Corridor sampled: {} samples over [{:.1}, {:.1}], {} rocks",
            PROFILE_SAMPLES,
            x_min,
            x_max,
            field.rocks.len()
        );

        field
    }

    /// Interpolated cross-section, clamped to the first/last sample
    pub fn sample_at(&self, x: f32) -> CorridorProfile {
        let n = self.samples.len();
        let span = self.x_max - self.x_min;
        if n < 2 || span <= 0.0 || !x.is_finite() {
            return self.samples[0];
        }
        if x <= self.x_min {
            return self.samples[0];
        }
        if x >= self.x_max {
            return self.samples[n - 1];
        }
        let f = (x - self.x_min) / span * (n - 1) as f32;
        let i = (f.floor() as usize).min(n - 2);
        CorridorProfile::lerp(self.samples[i], self.samples[i + 1], f - i as f32)
    }

    #[inline]
    pub fn floor_at(&self, x: f32) -> f32 {
        self.sample_at(x).floor
    }

    #[inline]
    pub fn ceiling_at(&self, x: f32) -> f32 {
        self.sample_at(x).ceiling
    }

    #[inline]
    pub fn half_width_at(&self, x: f32) -> f32 {
        self.sample_at(x).half_width
    }

    /// The far wall of the tunnel (the near side is cut away for the camera)
    #[inline]
    pub fn back_wall_z(&self, x: f32) -> f32 {
        -self.half_width_at(x)
    }

    pub fn samples(&self) -> &[CorridorProfile] {
        &self.samples
    }

    pub fn rocks(&self) -> &[Sphere] {
        &self.rocks
    }

    /// Where the finish approach begins
    pub fn finish_start_x(&self) -> f32 {
        self.finish_start
    }

    /// Highest ceiling anywhere along the route
    pub fn peak_ceiling(&self) -> f32 {
        self.samples.iter().map(|p| p.ceiling).fold(f32::MIN, f32::max)
    }

    /// Ceiling, back wall and rocks
    pub fn check_tunnel_collision(&self, pos: Vec3, radius: f32) -> bool {
        let p = self.sample_at(pos.x);
        pos.y + radius > p.ceiling
            || pos.z - radius < -p.half_width
            || self.rocks.iter().any(|r| r.intersects_sphere(pos, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Level, LevelTerrain, corridor_levels};

    fn corridor(level: &Level) -> &CorridorParams {
        match &level.terrain {
            LevelTerrain::Corridor(c) => c,
            LevelTerrain::Open(_) => panic!("expected a corridor level"),
        }
    }

    fn exact(level: &Level, x: f32) -> CorridorProfile {
        profile_at(x, corridor(level), &level.launch_pad, &level.landing_pad)
    }

    fn field(level: &Level) -> CorridorField {
        CorridorField::build(corridor(level), &level.launch_pad, &level.landing_pad)
    }

    #[test]
    fn test_straight_run_uses_base_extents() {
        let level = &corridor_levels()[0];
        let p = exact(level, 0.0);
        assert_eq!(p.floor, 0.0);
        assert!((p.ceiling - (4.8 * 2.0 + CEILING_VISUAL_MARGIN)).abs() < 1e-4);
        assert!((p.half_width - 5.4).abs() < 1e-4);
    }

    #[test]
    fn test_arch_lowers_ceiling_mid_segment() {
        let level = &corridor_levels()[2];
        // Arch spans n = 0.34..0.54 on a 50-unit route: x = -8..2
        let p = exact(level, -3.0);
        assert!((p.ceiling - (9.4 - 2.3 + CEILING_VISUAL_MARGIN)).abs() < 1e-3);
        assert!((field(level).ceiling_at(-3.0) - p.ceiling).abs() < 0.05);
        // Back to base height outside the arch
        let outside = exact(level, -12.0);
        assert!((outside.ceiling - (9.4 + CEILING_VISUAL_MARGIN)).abs() < 1e-3);
    }

    #[test]
    fn test_dip_and_mound_move_floor() {
        let level = &corridor_levels()[4];
        // Dip n = 0.20..0.42 on 64 units: x = -19.2..-5.12, mid -12.16
        assert!((exact(level, -12.16).floor + 1.5).abs() < 1e-3);
        // Mound n = 0.66..0.78: x = 10.24..17.92, mid 14.08
        let mound = exact(level, 14.08);
        assert!(mound.floor > 0.0);
    }

    #[test]
    fn test_chained_curves_do_not_double_count() {
        let level = &corridor_levels()[1];
        // Seam between the two curves at n = 0.52 on a 46-unit route
        let seam = -23.0 + 0.52 * 46.0;
        let p = exact(level, seam);
        assert!((p.floor - CURVE_RISE).abs() < 1e-3);
        let before = exact(level, seam - 0.01);
        assert!((before.floor - p.floor).abs() < 0.01);
    }

    #[test]
    fn test_curve_offset_holds_after_curve_ends() {
        let level = &corridor_levels()[6];
        // Curve n = 0.58..0.84 on 86 units ends inside the finish approach
        let end = -43.0 + 0.84 * 86.0;
        let before = exact(level, end - 0.01);
        let after = exact(level, end + 0.01);
        assert!((before.floor - after.floor).abs() < 0.05);
        assert!(after.floor > 0.0);

        let segments = &corridor(level).segments;
        assert_eq!(curve_offset(end + 0.5, segments), 0.7);
        assert_eq!(curve_offset(-40.0, segments), 0.0);
    }

    #[test]
    fn test_profile_continuous_at_segment_boundaries() {
        let eps = 0.01;
        for level in corridor_levels() {
            for seg in &corridor(&level).segments {
                for x in [seg.x0, seg.x1] {
                    let a = exact(&level, x - eps);
                    let b = exact(&level, x + eps);
                    assert!(
                        (a.floor - b.floor).abs() < 0.1,
                        "{}: floor jumps at x = {x}",
                        level.name
                    );
                    assert!(
                        (a.ceiling - b.ceiling).abs() < 0.1,
                        "{}: ceiling jumps at x = {x}",
                        level.name
                    );
                    assert!(
                        (a.half_width - b.half_width).abs() < 0.1,
                        "{}: half width jumps at x = {x}",
                        level.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_walls_narrow_corridor() {
        let level = &corridor_levels()[1];
        // Walls n = 0.22..0.72, midpoint n = 0.47
        let mid = -23.0 + 0.47 * 46.0;
        assert!((exact(level, mid).half_width - 4.2).abs() < 1e-3);
    }

    #[test]
    fn test_pad_ends_are_flat_and_open() {
        for level in corridor_levels() {
            let start = exact(&level, level.launch_pad.center.x);
            assert_eq!(start.floor, 0.0);
            assert!(start.half_width >= level.launch_pad.half() + PAD_WIDTH_MARGIN - 1e-4);

            let end = exact(&level, level.landing_pad.center.x);
            assert!(end.floor.abs() < 1e-4);
            assert!(end.half_width >= level.landing_pad.half() + PAD_WIDTH_MARGIN - 1e-4);
        }
    }

    #[test]
    fn test_minimum_clearance_everywhere() {
        for level in corridor_levels() {
            for p in field(&level).samples() {
                assert!(p.ceiling >= p.floor + MIN_CLEARANCE - 1e-4);
            }
        }
    }

    #[test]
    fn test_sampling_clamps_and_interpolates() {
        let level = &corridor_levels()[4];
        let f = field(level);
        assert_eq!(f.samples().len(), PROFILE_SAMPLES);
        assert_eq!(f.sample_at(-1000.0), f.samples()[0]);
        assert_eq!(f.sample_at(1000.0), f.samples()[PROFILE_SAMPLES - 1]);

        let step = (f.x_max - f.x_min) / (PROFILE_SAMPLES - 1) as f32;
        let i = 100;
        let x = f.x_min + step * (i as f32 + 0.5);
        let a = f.samples()[i];
        let b = f.samples()[i + 1];
        let mid = f.sample_at(x);
        assert!((mid.floor - (a.floor + b.floor) * 0.5).abs() < 1e-3);
        assert!((mid.ceiling - (a.ceiling + b.ceiling) * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_build_is_deterministic() {
        let level = &corridor_levels()[9];
        assert_eq!(field(level), field(level));
    }

    #[test]
    fn test_rock_and_wall_collisions() {
        let level = &corridor_levels()[7];
        let f = field(level);
        assert_eq!(f.rocks().len(), 3);

        let rock = f.rocks()[1];
        assert!(f.check_tunnel_collision(rock.center, 0.35));

        // Open air in the middle of the launch end
        let start = level.launch_pad.center.x + 4.0;
        assert!(!f.check_tunnel_collision(Vec3::new(start, 3.0, 0.0), 0.35));
        // Past the back wall
        let back = f.back_wall_z(start);
        assert!(f.check_tunnel_collision(Vec3::new(start, 3.0, back + 0.1), 0.35));
        // Into the ceiling
        let ceiling = f.ceiling_at(start);
        assert!(f.check_tunnel_collision(Vec3::new(start, ceiling - 0.1, 0.0), 0.35));
    }
}
