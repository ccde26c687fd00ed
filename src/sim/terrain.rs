//! Open canyon terrain height field
//!
//! Rolling wave terrain with craters, mountains and chasms carved in, flattened
//! around both pads and toward the flight corridor. Hazard instances are drawn
//! once per level from the terrain seed and never change afterwards, so the
//! height field and obstacle boxes stay stable for the whole flight.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::bounds::Aabb;
use super::level::{Pad, TerrainParams};
use super::rng::TerrainLcg;
use crate::{lerp, smoothstep};

/// Craters and chasms only influence terrain inside this normalised radius
const RIM_REACH: f32 = 1.35;
const RIM_CENTER: f32 = 1.02;
const RIM_WIDTH: f32 = 0.22;
/// Mountains are cut off beyond this squared normalised distance
const MOUNTAIN_CUTOFF: f32 = 7.0;
/// Spires and gate pillars are sunk this far below their base height
const FOOTING_DEPTH: f32 = 1.0;
/// Samples taken along the route when measuring the peak height
const PEAK_SAMPLES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crater {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    pub depth: f32,
    pub rim: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mountain {
    pub x: f32,
    pub z: f32,
    pub rx: f32,
    pub rz: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chasm {
    pub x: f32,
    pub z: f32,
    pub rx: f32,
    pub rz: f32,
    pub depth: f32,
    pub rim: f32,
}

/// A vertical rock column standing on the terrain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spire {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    pub height: f32,
    pub base_y: f32,
}

/// Two pillars and a lintel the rocket has to fly through
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TunnelGate {
    pub x: f32,
    pub z: f32,
    pub opening_width: f32,
    pub opening_height: f32,
    pub pillar_width: f32,
    pub lintel_height: f32,
    pub depth: f32,
    pub base_y: f32,
}

impl TunnelGate {
    /// Top of the flyable opening
    pub fn opening_top(&self) -> f32 {
        self.base_y + self.opening_height
    }

    fn boxes(&self) -> [Aabb; 3] {
        let half_d = self.depth * 0.5;
        let inner = self.opening_width * 0.5;
        let outer = inner + self.pillar_width;
        let bottom = self.base_y - FOOTING_DEPTH;
        let top = self.opening_top() + self.lintel_height;

        let left = Aabb::new(
            Vec3::new(self.x - half_d, bottom, self.z - outer),
            Vec3::new(self.x + half_d, top, self.z - inner),
        );
        let right = Aabb::new(
            Vec3::new(self.x - half_d, bottom, self.z + inner),
            Vec3::new(self.x + half_d, top, self.z + outer),
        );
        let lintel = Aabb::new(
            Vec3::new(self.x - half_d, self.opening_top(), self.z - outer),
            Vec3::new(self.x + half_d, top, self.z + outer),
        );
        [left, right, lintel]
    }
}

/// Hazard layout generated from a level's terrain seed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainProfile {
    pub craters: Vec<Crater>,
    pub mountains: Vec<Mountain>,
    pub chasms: Vec<Chasm>,
    pub spires: Vec<Spire>,
    pub gates: Vec<TunnelGate>,
    #[serde(skip)]
    colliders: Vec<Aabb>,
}

impl TerrainProfile {
    /// Static obstacle boxes (spires and gate parts)
    pub fn colliders(&self) -> &[Aabb] {
        &self.colliders
    }

    fn rebuild_colliders(&mut self) {
        self.colliders.clear();
        for spire in &self.spires {
            let r = spire.radius;
            self.colliders.push(Aabb::new(
                Vec3::new(spire.x - r, spire.base_y - FOOTING_DEPTH, spire.z - r),
                Vec3::new(spire.x + r, spire.base_y + spire.height, spire.z + r),
            ));
        }
        for gate in &self.gates {
            self.colliders.extend(gate.boxes());
        }
    }
}

/// Circular flat zone around a pad
#[derive(Debug, Clone, Copy, PartialEq)]
struct PadFlat {
    center: Vec2,
    flat_radius: f32,
    blend_radius: f32,
}

impl PadFlat {
    fn new(pad: &Pad, params: &TerrainParams) -> Self {
        let flat_radius = pad.half() + params.pad_flat_margin;
        Self {
            center: Vec2::new(pad.center.x, pad.center.z),
            flat_radius,
            blend_radius: flat_radius + params.pad_blend.max(0.0),
        }
    }
}

/// Evaluates the open-terrain height field for one level
#[derive(Debug, Clone)]
pub struct OpenTerrain {
    params: TerrainParams,
    launch: PadFlat,
    landing: PadFlat,
    profile: TerrainProfile,
}

impl OpenTerrain {
    /// Draw every hazard from the terrain seed and build the obstacle boxes
    pub fn generate(params: &TerrainParams, launch: &Pad, landing: &Pad) -> Self {
        let mut rng = TerrainLcg::new(params.terrain_seed);
        let (x_lo, x_hi) = hazard_x_range(params, launch, landing);
        let spread = params.lateral_spread.max(0.0);

        let craters = (0..params.craters.count)
            .map(|_| Crater {
                x: rng.range(x_lo, x_hi),
                z: rng.signed() * spread,
                radius: rng.range(params.craters.radius.min, params.craters.radius.max),
                depth: rng.range(params.craters.depth.min, params.craters.depth.max),
                rim: rng.range(params.craters.rim.min, params.craters.rim.max),
            })
            .collect();

        let mountains = (0..params.mountains.count)
            .map(|_| Mountain {
                x: rng.range(x_lo, x_hi),
                z: rng.signed() * spread,
                rx: rng.range(params.mountains.radius.min, params.mountains.radius.max),
                rz: rng.range(params.mountains.radius.min, params.mountains.radius.max),
                height: rng.range(params.mountains.height.min, params.mountains.height.max),
            })
            .collect();

        let chasms = (0..params.chasms.count)
            .map(|_| Chasm {
                x: rng.range(x_lo, x_hi),
                z: rng.signed() * spread,
                rx: rng.range(params.chasms.radius_x.min, params.chasms.radius_x.max),
                rz: rng.range(params.chasms.radius_z.min, params.chasms.radius_z.max),
                depth: rng.range(params.chasms.depth.min, params.chasms.depth.max),
                rim: rng.range(params.chasms.rim.min, params.chasms.rim.max),
            })
            .collect();

        let mut terrain = Self {
            params: params.clone(),
            launch: PadFlat::new(launch, params),
            landing: PadFlat::new(landing, params),
            profile: TerrainProfile {
                craters,
                mountains,
                chasms,
                ..Default::default()
            },
        };

        let mut spires: Vec<Spire> = (0..params.spires.count)
            .map(|_| Spire {
                x: rng.range(x_lo, x_hi),
                z: rng.signed() * spread,
                radius: rng.range(params.spires.radius.min, params.spires.radius.max),
                height: rng.range(params.spires.height.min, params.spires.height.max),
                base_y: 0.0,
            })
            .collect();

        let gate_spec = params.gates;
        let mut gates: Vec<TunnelGate> = (0..gate_spec.count)
            .map(|_| {
                let x = rng.range(x_lo, x_hi);
                let z = terrain.corridor_center_z(x) + rng.signed();
                TunnelGate {
                    x,
                    z,
                    opening_width: rng
                        .range(gate_spec.opening_width.min, gate_spec.opening_width.max),
                    opening_height: rng
                        .range(gate_spec.opening_height.min, gate_spec.opening_height.max),
                    pillar_width: gate_spec.pillar_width,
                    lintel_height: gate_spec.lintel_height,
                    depth: gate_spec.depth,
                    base_y: 0.0,
                }
            })
            .collect();

        for spire in &mut spires {
            spire.base_y = terrain.height_at(spire.x, spire.z);
        }
        for gate in &mut gates {
            gate.base_y = terrain.height_at(gate.x, gate.z);
        }
        terrain.profile.spires = spires;
        terrain.profile.gates = gates;
        terrain.profile.rebuild_colliders();

        log::debug!(
            "Terrain seed {}: {} craters, {} mountains, {} chasms, {} spires, {} gates",
            params.terrain_seed,
            terrain.profile.craters.len(),
            terrain.profile.mountains.len(),
            terrain.profile.chasms.len(),
            terrain.profile.spires.len(),
            terrain.profile.gates.len()
        );

        terrain
    }

    /// Build from an explicit hazard layout (base heights taken as given)
    pub fn from_profile(
        params: &TerrainParams,
        launch: &Pad,
        landing: &Pad,
        mut profile: TerrainProfile,
    ) -> Self {
        profile.rebuild_colliders();
        Self {
            params: params.clone(),
            launch: PadFlat::new(launch, params),
            landing: PadFlat::new(landing, params),
            profile,
        }
    }

    pub fn profile(&self) -> &TerrainProfile {
        &self.profile
    }

    /// Terrain height at `(x, z)`
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let p = &self.params;
        let s = (p.terrain_seed % 1024) as f32;

        let mut y = (x * p.wave_freq[0] + s).sin() * p.wave_amp[0]
            + (z * p.wave_freq[1] - s * 0.5).cos() * p.wave_amp[1]
            + ((x * 0.7 + z) * p.wave_freq[2] + s * 1.7).sin() * p.wave_amp[2];
        y += (x * 0.31 + s).sin() * (z * 0.27 - s * 0.6).cos() * p.detail;

        for c in &self.profile.craters {
            let d = Vec2::new(x - c.x, z - c.z).length() / c.radius.max(f32::EPSILON);
            y += bowl_with_rim(d, c.depth, c.rim);
        }

        for m in &self.profile.mountains {
            let qx = (x - m.x) / m.rx.max(f32::EPSILON);
            let qz = (z - m.z) / m.rz.max(f32::EPSILON);
            let q = qx * qx + qz * qz;
            if q < MOUNTAIN_CUTOFF {
                y += (-q).exp() * m.height;
            }
        }

        for c in &self.profile.chasms {
            let qx = (x - c.x) / c.rx.max(f32::EPSILON);
            let qz = (z - c.z) / c.rz.max(f32::EPSILON);
            let d = (qx * qx + qz * qz).sqrt();
            y += bowl_with_rim(d, c.depth, c.rim);
        }

        for flat in [&self.launch, &self.landing] {
            let dist = Vec2::new(x, z).distance(flat.center);
            y *= smoothstep(flat.flat_radius, flat.blend_radius, dist);
        }

        let hw = p.corridor_half_width.max(0.0);
        let dz = (z - self.corridor_center_z(x)).abs();
        let w = smoothstep(hw, hw + p.corridor_blend.max(0.0), dz)
            * p.corridor_flatten_strength.clamp(0.0, 1.0);
        y = lerp(y, 0.0, w);

        y.clamp(p.min_height, p.max_height)
    }

    /// Lateral centre of the flight corridor (straight line between pads)
    pub fn corridor_center_z(&self, x: f32) -> f32 {
        let (a, b) = (self.launch.center, self.landing.center);
        let span = b.x - a.x;
        if span.abs() < f32::EPSILON {
            return a.y;
        }
        let t = ((x - a.x) / span).clamp(0.0, 1.0);
        lerp(a.y, b.y, t)
    }

    /// Highest terrain point along the corridor between the pads
    pub fn route_peak(&self) -> f32 {
        let (a, b) = (self.launch.center, self.landing.center);
        let offsets = [-0.5, 0.0, 0.5].map(|f| f * self.params.corridor_half_width);
        (0..PEAK_SAMPLES)
            .flat_map(|i| {
                let t = i as f32 / (PEAK_SAMPLES - 1) as f32;
                let x = lerp(a.x, b.x, t);
                let z = lerp(a.y, b.y, t);
                offsets.map(|o| self.height_at(x, z + o))
            })
            .fold(f32::MIN, f32::max)
    }

    /// Tops of every gate opening
    pub fn opening_tops(&self) -> impl Iterator<Item = f32> + '_ {
        self.profile.gates.iter().map(TunnelGate::opening_top)
    }

    /// Sphere vs every obstacle box
    pub fn check_tunnel_collision(&self, pos: Vec3, radius: f32) -> bool {
        self.profile
            .colliders
            .iter()
            .any(|b| b.intersects_sphere(pos, radius))
    }
}

/// Parabolic bowl inside `d < 1` plus a Gaussian rim just outside it
#[inline]
fn bowl_with_rim(d: f32, depth: f32, rim: f32) -> f32 {
    let mut dy = 0.0;
    if d < 1.0 {
        dy -= (1.0 - d * d) * depth;
    }
    if d < RIM_REACH {
        let k = (d - RIM_CENTER) / RIM_WIDTH;
        dy += (-k * k).exp() * rim;
    }
    dy
}

/// Hazards stay clear of both pads along x
fn hazard_x_range(params: &TerrainParams, launch: &Pad, landing: &Pad) -> (f32, f32) {
    let lo = launch.center.x.min(landing.center.x);
    let hi = launch.center.x.max(landing.center.x);
    let lo_k = lo + launch.half().max(landing.half()) + params.pad_keepout;
    let hi_k = hi - launch.half().max(landing.half()) - params.pad_keepout;
    if lo_k <= hi_k {
        (lo_k, hi_k)
    } else {
        let mid = (lo + hi) * 0.5;
        (mid, mid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Campaign, LevelTerrain};

    fn far_pads() -> (Pad, Pad) {
        (
            Pad::new(Vec3::new(-1000.0, 0.5, 0.0), 3.0),
            Pad::new(Vec3::new(1000.0, 0.5, 0.0), 3.0),
        )
    }

    fn flat_params() -> TerrainParams {
        TerrainParams {
            wave_amp: [0.0; 3],
            detail: 0.0,
            corridor_flatten_strength: 0.0,
            ..TerrainParams::default()
        }
    }

    #[test]
    fn test_pads_are_flat() {
        let campaign = Campaign::standard();
        for level in campaign.levels() {
            let LevelTerrain::Open(params) = &level.terrain else {
                continue;
            };
            let terrain = OpenTerrain::generate(params, &level.launch_pad, &level.landing_pad);
            for pad in [&level.launch_pad, &level.landing_pad] {
                assert_eq!(terrain.height_at(pad.center.x, pad.center.z), 0.0);
            }
        }
    }

    #[test]
    fn test_pad_flat_independent_of_amplitude() {
        let params = TerrainParams {
            wave_amp: [40.0, 40.0, 40.0],
            detail: 10.0,
            min_height: -100.0,
            max_height: 100.0,
            ..TerrainParams::default()
        };
        let launch = Pad::new(Vec3::new(-20.0, 0.5, 0.0), 3.4);
        let landing = Pad::new(Vec3::new(20.0, 0.5, 1.5), 4.5);
        let terrain = OpenTerrain::generate(&params, &launch, &landing);
        assert_eq!(terrain.height_at(-20.0, 0.0), 0.0);
        assert_eq!(terrain.height_at(20.0, 1.5), 0.0);
        // Still flat near the pad edge
        assert_eq!(terrain.height_at(-20.0 + 2.0, 0.5), 0.0);
    }

    #[test]
    fn test_crater_bowl_deepest_at_center() {
        let (launch, landing) = far_pads();
        let r = 4.0;
        let profile = TerrainProfile {
            craters: vec![Crater {
                x: 0.0,
                z: 0.0,
                radius: r,
                depth: 2.0,
                rim: 0.5,
            }],
            ..Default::default()
        };
        let terrain = OpenTerrain::from_profile(&flat_params(), &launch, &landing, profile);

        let center = terrain.height_at(0.0, 0.0);
        let half = terrain.height_at(r * 0.5, 0.0);
        assert!(center < 0.0);
        assert!(center < half);
        assert!((center + 2.0).abs() < 1e-3);
        // Rim peaks just outside the radius
        assert!(terrain.height_at(r * 1.02, 0.0) > 0.4);
        assert_eq!(terrain.height_at(r * 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_mountain_and_clamp() {
        let (launch, landing) = far_pads();
        let profile = TerrainProfile {
            mountains: vec![Mountain {
                x: 0.0,
                z: 0.0,
                rx: 3.0,
                rz: 2.0,
                height: 50.0,
            }],
            ..Default::default()
        };
        let params = flat_params();
        let terrain = OpenTerrain::from_profile(&params, &launch, &landing, profile);
        assert_eq!(terrain.height_at(0.0, 0.0), params.max_height);
        // q = 9 is past the cutoff
        assert_eq!(terrain.height_at(9.0, 0.0), 0.0);
    }

    #[test]
    fn test_chasm_is_elliptical() {
        let (launch, landing) = far_pads();
        let profile = TerrainProfile {
            chasms: vec![Chasm {
                x: 0.0,
                z: 0.0,
                rx: 1.0,
                rz: 5.0,
                depth: 2.0,
                rim: 0.0,
            }],
            ..Default::default()
        };
        let terrain = OpenTerrain::from_profile(&flat_params(), &launch, &landing, profile);
        assert!(terrain.height_at(0.0, 3.0) < 0.0);
        assert_eq!(terrain.height_at(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_corridor_flattening() {
        let (launch, landing) = far_pads();
        let base = TerrainParams {
            wave_amp: [0.0; 3],
            detail: 0.0,
            corridor_half_width: 4.0,
            corridor_blend: 2.0,
            ..TerrainParams::default()
        };
        let bump = |z| TerrainProfile {
            mountains: vec![Mountain {
                x: 0.0,
                z,
                rx: 2.0,
                rz: 2.0,
                height: 2.0,
            }],
            ..Default::default()
        };

        let full = TerrainParams {
            corridor_flatten_strength: 1.0,
            ..base.clone()
        };
        let inside = OpenTerrain::from_profile(&full, &launch, &landing, bump(0.0));
        assert!((inside.height_at(0.0, 0.0) - 2.0).abs() < 1e-4);
        let outside = OpenTerrain::from_profile(&full, &launch, &landing, bump(10.0));
        assert_eq!(outside.height_at(0.0, 10.0), 0.0);

        let half = TerrainParams {
            corridor_flatten_strength: 0.5,
            ..base
        };
        let outside = OpenTerrain::from_profile(&half, &launch, &landing, bump(10.0));
        assert!((outside.height_at(0.0, 10.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let params = TerrainParams {
            terrain_seed: 77,
            ..TerrainParams::default()
        };
        let launch = Pad::new(Vec3::new(-24.0, 0.5, 0.0), 3.4);
        let landing = Pad::new(Vec3::new(24.0, 0.5, 0.0), 4.5);
        let a = OpenTerrain::generate(&params, &launch, &landing);
        let b = OpenTerrain::generate(&params, &launch, &landing);
        assert_eq!(a.profile(), b.profile());
        assert_eq!(a.profile().colliders(), b.profile().colliders());
        assert_eq!(a.profile().craters.len(), 3);

        let other = OpenTerrain::generate(
            &TerrainParams {
                terrain_seed: 78,
                ..params
            },
            &launch,
            &landing,
        );
        assert_ne!(a.profile().craters, other.profile().craters);
    }

    #[test]
    fn test_hazards_keep_clear_of_pads() {
        let params = TerrainParams::default();
        let launch = Pad::new(Vec3::new(-24.0, 0.5, 0.0), 3.4);
        let landing = Pad::new(Vec3::new(24.0, 0.5, 0.0), 4.5);
        let terrain = OpenTerrain::generate(&params, &launch, &landing);
        let limit = 24.0 - 2.25 - params.pad_keepout;
        for c in &terrain.profile().craters {
            assert!(c.x >= -limit && c.x <= limit);
        }
        for s in &terrain.profile().spires {
            assert!(s.x >= -limit && s.x <= limit);
        }
    }

    #[test]
    fn test_gate_collision_boxes() {
        let (launch, landing) = far_pads();
        let profile = TerrainProfile {
            gates: vec![TunnelGate {
                x: 0.0,
                z: 0.0,
                opening_width: 4.0,
                opening_height: 4.0,
                pillar_width: 0.8,
                lintel_height: 0.8,
                depth: 1.0,
                base_y: 0.0,
            }],
            ..Default::default()
        };
        let terrain = OpenTerrain::from_profile(&flat_params(), &launch, &landing, profile);
        assert_eq!(terrain.profile().colliders().len(), 3);
        // Through the middle of the opening
        assert!(!terrain.check_tunnel_collision(Vec3::new(0.0, 2.0, 0.0), 0.35));
        // Into a pillar
        assert!(terrain.check_tunnel_collision(Vec3::new(0.0, 2.0, 2.3), 0.35));
        // Into the lintel
        assert!(terrain.check_tunnel_collision(Vec3::new(0.0, 4.2, 0.0), 0.35));
        assert_eq!(terrain.opening_tops().collect::<Vec<_>>(), vec![4.0]);
    }
}
