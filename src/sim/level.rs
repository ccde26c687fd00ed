//! Level definitions and the built-in campaign
//!
//! Levels are immutable once built. Two terrain kinds exist: open canyon
//! terrain described by procedural parameters, and side-scrolling corridors
//! described by an ordered list of segments along the route.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bounds::Aabb;
use crate::consts::PAD_HEIGHT;

/// Most instances of any one hazard kind a level may ask for
pub const MAX_HAZARDS: u32 = 64;

/// Reasons a level is rejected at load time
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("campaign has no levels")]
    Empty,
    #[error("level {level}: gravity must be finite and non-negative")]
    Gravity { level: u32 },
    #[error("level {level}: wind must be finite")]
    Wind { level: u32 },
    #[error("level {level}: route length must be positive")]
    RouteLength { level: u32 },
    #[error("level {level}: {pad} pad must have a positive size and finite centre")]
    Pad { level: u32, pad: &'static str },
    #[error("level {level}: spawn point is not finite")]
    Spawn { level: u32 },
    #[error("level {level}: corridor half extents must be positive")]
    CorridorExtent { level: u32 },
    #[error("level {level}: segment {index} has an empty or inverted range")]
    SegmentRange { level: u32, index: usize },
    #[error("level {level}: terrain clamp range is inverted")]
    ClampRange { level: u32 },
    #[error("level {level}: {field} range is invalid")]
    Span { level: u32, field: &'static str },
    #[error("level {level}: {count} {field} exceeds the limit of {limit}", limit = MAX_HAZARDS)]
    HazardCount {
        level: u32,
        field: &'static str,
        count: u32,
    },
    #[error("level {level}: {field} is not finite or out of range")]
    Geometry { level: u32, field: &'static str },
    #[error("failed to parse campaign: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A square launch or landing pad (a box of height `PAD_HEIGHT`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub center: Vec3,
    pub size: f32,
}

impl Pad {
    pub fn new(center: Vec3, size: f32) -> Self {
        Self { center, size }
    }

    #[inline]
    pub fn half(&self) -> f32 {
        self.size * 0.5
    }

    #[inline]
    pub fn top_y(&self) -> f32 {
        self.center.y + PAD_HEIGHT * 0.5
    }

    /// Square footprint test in x/z (edges count as over)
    pub fn is_over(&self, pos: Vec3) -> bool {
        is_over_pad(pos, self.center, self.half())
    }

    fn is_valid(&self) -> bool {
        self.size.is_finite() && self.size > 0.0 && self.center.is_finite()
    }
}

/// Axis-aligned square test in x/z
#[inline]
pub fn is_over_pad(pos: Vec3, pad_center: Vec3, pad_half: f32) -> bool {
    (pos.x - pad_center.x).abs() <= pad_half && (pos.z - pad_center.z).abs() <= pad_half
}

/// Inclusive numeric range used for procedural draws
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraterSpec {
    pub count: u32,
    pub radius: Span,
    pub depth: Span,
    pub rim: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountainSpec {
    pub count: u32,
    /// Drawn independently for the x and z radii
    pub radius: Span,
    pub height: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChasmSpec {
    pub count: u32,
    pub radius_x: Span,
    pub radius_z: Span,
    pub depth: Span,
    pub rim: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpireSpec {
    pub count: u32,
    pub radius: Span,
    pub height: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateSpec {
    pub count: u32,
    pub opening_width: Span,
    pub opening_height: Span,
    pub pillar_width: f32,
    pub lintel_height: f32,
    pub depth: f32,
}

/// Procedural parameters for an open canyon level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub terrain_seed: u32,
    pub wave_freq: [f32; 3],
    pub wave_amp: [f32; 3],
    pub detail: f32,
    pub craters: CraterSpec,
    pub mountains: MountainSpec,
    pub chasms: ChasmSpec,
    pub spires: SpireSpec,
    pub gates: GateSpec,
    /// Hazards are placed within `|z| <= lateral_spread`
    pub lateral_spread: f32,
    /// Hazards keep this far (in x) from either pad
    pub pad_keepout: f32,
    /// Flat radius beyond the pad half-size
    pub pad_flat_margin: f32,
    /// Distance over which terrain blends back in around a pad
    pub pad_blend: f32,
    pub corridor_half_width: f32,
    pub corridor_blend: f32,
    /// 0 leaves terrain outside the corridor untouched, 1 flattens it fully
    pub corridor_flatten_strength: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            terrain_seed: 1,
            wave_freq: [0.18, 0.22, 0.09],
            wave_amp: [0.5, 0.35, 0.6],
            detail: 0.15,
            craters: CraterSpec {
                count: 3,
                radius: Span::new(2.5, 4.5),
                depth: Span::new(0.8, 1.8),
                rim: Span::new(0.3, 0.7),
            },
            mountains: MountainSpec {
                count: 3,
                radius: Span::new(2.0, 4.0),
                height: Span::new(1.5, 3.5),
            },
            chasms: ChasmSpec {
                count: 1,
                radius_x: Span::new(1.5, 2.5),
                radius_z: Span::new(4.0, 7.0),
                depth: Span::new(1.5, 2.5),
                rim: Span::new(0.2, 0.5),
            },
            spires: SpireSpec {
                count: 2,
                radius: Span::new(0.35, 0.6),
                height: Span::new(3.0, 5.5),
            },
            gates: GateSpec {
                count: 1,
                opening_width: Span::new(3.5, 5.0),
                opening_height: Span::new(3.2, 4.2),
                pillar_width: 0.8,
                lintel_height: 0.8,
                depth: 1.0,
            },
            lateral_spread: 8.0,
            pad_keepout: 5.0,
            pad_flat_margin: 1.0,
            pad_blend: 5.0,
            corridor_half_width: 6.0,
            corridor_blend: 4.0,
            corridor_flatten_strength: 0.6,
            min_height: -4.0,
            max_height: 6.0,
        }
    }
}

/// A rock placed inside a corridor (absolute x, y above the local floor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rock {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
}

/// Typed corridor modifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SegmentKind {
    Straight,
    /// Vertical shift of the whole corridor, ramping from `from` to `to`
    Curve { from: f32, to: f32 },
    /// Ceiling lowered by `drop` at the segment midpoint
    Arch { drop: f32 },
    /// Floor lowered by `depth` at the segment midpoint
    Dip { depth: f32 },
    /// Floor raised by `height` at the segment midpoint
    Mound { height: f32 },
    /// Corridor narrowed (or widened) to `half_width`
    Walls {
        #[serde(rename = "halfWidth")]
        half_width: f32,
    },
    Rocks { items: Vec<Rock> },
    /// Range over which the corridor settles back to the landing pad
    FinishApproach,
}

impl SegmentKind {
    fn validate(&self, level: u32) -> Result<(), LevelError> {
        let finite = |field, v: f32| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(LevelError::Geometry { level, field })
            }
        };
        match self {
            SegmentKind::Curve { from, to } => {
                finite("curve from", *from)?;
                finite("curve to", *to)
            }
            SegmentKind::Arch { drop } => finite("arch drop", *drop),
            SegmentKind::Dip { depth } => finite("dip depth", *depth),
            SegmentKind::Mound { height } => finite("mound height", *height),
            SegmentKind::Walls { half_width } if !(*half_width > 0.0 && half_width.is_finite()) => {
                Err(LevelError::Geometry { level, field: "walls half width" })
            }
            SegmentKind::Rocks { items } => {
                if items.len() > MAX_HAZARDS as usize {
                    return Err(LevelError::HazardCount {
                        level,
                        field: "rocks",
                        count: u32::try_from(items.len()).unwrap_or(u32::MAX),
                    });
                }
                for rock in items {
                    let placed = [rock.x, rock.y, rock.z].iter().all(|v| v.is_finite());
                    let sized = [rock.r, rock.sx, rock.sy, rock.sz]
                        .iter()
                        .all(|v| v.is_finite() && *v > 0.0);
                    if !(placed && sized) {
                        return Err(LevelError::Geometry { level, field: "rock" });
                    }
                }
                Ok(())
            }
            SegmentKind::Walls { .. } | SegmentKind::Straight | SegmentKind::FinishApproach => {
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x0: f32,
    pub x1: f32,
    #[serde(flatten)]
    pub kind: SegmentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorParams {
    pub base_half_height: f32,
    pub base_half_width: f32,
    pub segments: Vec<Segment>,
}

impl CorridorParams {
    /// Range of the finish approach (the last one wins if several exist)
    pub fn finish_approach(&self) -> Option<(f32, f32)> {
        self.segments
            .iter()
            .rev()
            .find(|s| matches!(s.kind, SegmentKind::FinishApproach))
            .map(|s| (s.x0, s.x1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelTerrain {
    Open(TerrainParams),
    Corridor(CorridorParams),
}

/// Immutable level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub gravity: f32,
    #[serde(default)]
    pub wind: f32,
    pub route_length: f32,
    pub spawn: Vec3,
    pub launch_pad: Pad,
    pub landing_pad: Pad,
    #[serde(default)]
    pub roof: Option<Aabb>,
    pub terrain: LevelTerrain,
}

impl Level {
    pub fn validate(&self) -> Result<(), LevelError> {
        let level = self.id;
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(LevelError::Gravity { level });
        }
        if !self.wind.is_finite() {
            return Err(LevelError::Wind { level });
        }
        if !self.route_length.is_finite() || self.route_length <= 0.0 {
            return Err(LevelError::RouteLength { level });
        }
        if !self.launch_pad.is_valid() {
            return Err(LevelError::Pad { level, pad: "launch" });
        }
        if !self.landing_pad.is_valid() {
            return Err(LevelError::Pad { level, pad: "landing" });
        }
        if !self.spawn.is_finite() {
            return Err(LevelError::Spawn { level });
        }

        match &self.terrain {
            LevelTerrain::Corridor(c) => {
                if !(c.base_half_height > 0.0 && c.base_half_width > 0.0) {
                    return Err(LevelError::CorridorExtent { level });
                }
                for (index, seg) in c.segments.iter().enumerate() {
                    if !(seg.x0.is_finite() && seg.x1.is_finite() && seg.x0 < seg.x1) {
                        return Err(LevelError::SegmentRange { level, index });
                    }
                    seg.kind.validate(level)?;
                }
            }
            LevelTerrain::Open(t) => {
                if !(t.min_height <= t.max_height) {
                    return Err(LevelError::ClampRange { level });
                }
                let counts = [
                    ("craters", t.craters.count),
                    ("mountains", t.mountains.count),
                    ("chasms", t.chasms.count),
                    ("spires", t.spires.count),
                    ("gates", t.gates.count),
                ];
                for (field, count) in counts {
                    if count > MAX_HAZARDS {
                        return Err(LevelError::HazardCount { level, field, count });
                    }
                }

                let positive = [
                    ("crater radius", t.craters.radius),
                    ("crater depth", t.craters.depth),
                    ("mountain radius", t.mountains.radius),
                    ("chasm radius", t.chasms.radius_x),
                    ("chasm radius", t.chasms.radius_z),
                    ("chasm depth", t.chasms.depth),
                    ("spire radius", t.spires.radius),
                    ("spire height", t.spires.height),
                    ("gate width", t.gates.opening_width),
                    ("gate height", t.gates.opening_height),
                ];
                for (field, span) in positive {
                    if !span.is_valid() || span.min <= 0.0 {
                        return Err(LevelError::Span { level, field });
                    }
                }
                // Rims and mountains may be flat
                let finite = [
                    ("crater rim", t.craters.rim),
                    ("chasm rim", t.chasms.rim),
                    ("mountain height", t.mountains.height),
                ];
                for (field, span) in finite {
                    if !span.is_valid() {
                        return Err(LevelError::Span { level, field });
                    }
                }

                let gate_parts = [
                    ("gate pillar width", t.gates.pillar_width),
                    ("gate lintel height", t.gates.lintel_height),
                    ("gate depth", t.gates.depth),
                ];
                for (field, v) in gate_parts {
                    if !(v.is_finite() && v > 0.0) {
                        return Err(LevelError::Geometry { level, field });
                    }
                }

                let mut waves = t.wave_freq.iter().chain(&t.wave_amp).chain([&t.detail]);
                if !waves.all(|v| v.is_finite()) {
                    return Err(LevelError::Geometry { level, field: "wave" });
                }
            }
        }
        Ok(())
    }

    /// Start of the route (launch pad x)
    pub fn start_x(&self) -> f32 {
        self.launch_pad.center.x
    }

    /// End of the route (landing pad x)
    pub fn finish_x(&self) -> f32 {
        self.landing_pad.center.x
    }
}

/// Ordered, validated set of levels
#[derive(Debug, Clone)]
pub struct Campaign {
    levels: Vec<Level>,
}

impl Campaign {
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of levels and validate it
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<Level> = serde_json::from_str(json)?;
        Self::new(levels).inspect_err(|e| log::warn!("Rejected campaign: {e}"))
    }

    /// Ten corridor levels followed by procedural canyon levels
    pub fn standard() -> Self {
        let mut levels = corridor_levels();
        let base = levels.len() as u32;
        levels.extend((0..CANYON_LEVEL_COUNT).map(|i| canyon_level(base + i + 1, i, CANYON_SEED)));
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Clamp any index into the valid range
    pub fn clamp_index(&self, idx: i64) -> usize {
        idx.clamp(0, self.levels.len() as i64 - 1) as usize
    }

    /// Level at a clamped index
    pub fn level(&self, idx: usize) -> &Level {
        &self.levels[idx.min(self.levels.len() - 1)]
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
}

impl Default for Campaign {
    fn default() -> Self {
        Self::standard()
    }
}

const CANYON_LEVEL_COUNT: u32 = 4;
const CANYON_SEED: u64 = 0x5EED_CA9E;

const LAUNCH_PAD_SIZE: f32 = 3.4;
const FINISH_PAD_SIZE: f32 = 6.0;
const SPAWN_Y: f32 = 1.15;
const PAD_CENTER_Y: f32 = 0.5;

fn rock(n: f32, y: f32, z: f32, r: f32, sx: f32, sy: f32, sz: f32) -> Rock {
    Rock { x: n, y, z, r, sx, sy, sz }
}

/// Build a corridor level from segment ranges given as fractions of the route
fn corridor_level(
    id: u32,
    name: &str,
    gravity: f32,
    route_length: f32,
    half_height: f32,
    half_width: f32,
    defs: Vec<(f32, f32, SegmentKind)>,
) -> Level {
    let start_x = -route_length * 0.5;
    let finish_x = route_length * 0.5;
    let at = |n: f32| start_x + n * route_length;

    let mut segments: Vec<Segment> = defs
        .into_iter()
        .map(|(n0, n1, kind)| {
            let kind = match kind {
                SegmentKind::Rocks { items } => SegmentKind::Rocks {
                    items: items.into_iter().map(|r| Rock { x: at(r.x), ..r }).collect(),
                },
                other => other,
            };
            Segment {
                x0: at(n0),
                x1: at(n1),
                kind,
            }
        })
        .collect();

    if !segments
        .iter()
        .any(|s| matches!(s.kind, SegmentKind::FinishApproach))
    {
        segments.push(Segment {
            x0: finish_x - (route_length * 0.22).min(12.0),
            x1: finish_x,
            kind: SegmentKind::FinishApproach,
        });
    }

    Level {
        id,
        name: name.to_string(),
        gravity,
        wind: 0.0,
        route_length,
        spawn: Vec3::new(start_x, SPAWN_Y, 0.0),
        launch_pad: Pad::new(Vec3::new(start_x, PAD_CENTER_Y, 0.0), LAUNCH_PAD_SIZE),
        landing_pad: Pad::new(Vec3::new(finish_x, PAD_CENTER_Y, 0.0), FINISH_PAD_SIZE),
        roof: None,
        terrain: LevelTerrain::Corridor(CorridorParams {
            base_half_height: half_height,
            base_half_width: half_width,
            segments,
        }),
    }
}

/// The hand-authored corridor run
pub fn corridor_levels() -> Vec<Level> {
    use SegmentKind::*;

    vec![
        corridor_level(1, "Straight Run", 8.8, 40.0, 4.8, 5.4, vec![(0.00, 0.82, Straight)]),
        corridor_level(
            2,
            "Soft Curve",
            9.0,
            46.0,
            4.6,
            4.9,
            vec![
                (0.12, 0.52, Curve { from: 0.0, to: 1.0 }),
                (0.52, 0.82, Curve { from: 1.0, to: 0.2 }),
                (0.22, 0.72, Walls { half_width: 4.2 }),
            ],
        ),
        corridor_level(
            3,
            "Single Arch",
            9.2,
            50.0,
            4.7,
            4.8,
            vec![
                (0.00, 0.30, Straight),
                (0.34, 0.54, Arch { drop: 2.3 }),
                (0.54, 0.82, Straight),
            ],
        ),
        corridor_level(
            4,
            "Curve And Arch",
            9.5,
            56.0,
            4.5,
            4.6,
            vec![
                (0.08, 0.36, Curve { from: 0.0, to: 0.8 }),
                (0.42, 0.60, Arch { drop: 2.0 }),
                (0.56, 0.84, Curve { from: 0.8, to: -0.2 }),
                (0.18, 0.76, Walls { half_width: 4.0 }),
            ],
        ),
        corridor_level(
            5,
            "Dip And Ceiling",
            9.8,
            64.0,
            4.3,
            4.4,
            vec![
                (0.20, 0.42, Dip { depth: 1.5 }),
                (0.45, 0.63, Arch { drop: 2.2 }),
                (0.66, 0.78, Mound { height: 0.8 }),
                (0.28, 0.74, Walls { half_width: 3.9 }),
            ],
        ),
        corridor_level(
            6,
            "Twin Arches",
            10.2,
            74.0,
            4.1,
            4.1,
            vec![
                (0.24, 0.38, Arch { drop: 2.2 }),
                (0.20, 0.62, Walls { half_width: 3.6 }),
                (0.46, 0.61, Arch { drop: 2.35 }),
                (0.64, 0.78, Dip { depth: 1.0 }),
            ],
        ),
        corridor_level(
            7,
            "Bulge And Arch",
            10.8,
            86.0,
            3.95,
            3.9,
            vec![
                (0.22, 0.42, Mound { height: 1.35 }),
                (0.40, 0.57, Arch { drop: 2.45 }),
                (0.28, 0.70, Walls { half_width: 3.45 }),
                (0.58, 0.84, Curve { from: 0.0, to: 0.7 }),
            ],
        ),
        corridor_level(
            8,
            "Interior Rocks",
            11.3,
            96.0,
            3.8,
            4.2,
            vec![
                (0.16, 0.82, Walls { half_width: 3.5 }),
                (0.30, 0.43, Arch { drop: 2.0 }),
                (
                    0.34,
                    0.68,
                    Rocks {
                        items: vec![
                            rock(0.38, 2.4, -1.8, 0.95, 1.2, 1.0, 0.9),
                            rock(0.50, 1.5, -0.8, 1.05, 1.0, 1.25, 0.9),
                            rock(0.62, 3.2, -2.1, 0.9, 1.0, 0.85, 1.2),
                        ],
                    },
                ),
            ],
        ),
        corridor_level(
            9,
            "Long Gauntlet",
            11.9,
            112.0,
            3.65,
            3.85,
            vec![
                (0.08, 0.22, Curve { from: 0.0, to: 0.8 }),
                (0.24, 0.36, Arch { drop: 2.25 }),
                (0.36, 0.48, Dip { depth: 1.35 }),
                (0.20, 0.86, Walls { half_width: 3.35 }),
                (0.54, 0.67, Mound { height: 1.0 }),
                (0.68, 0.80, Arch { drop: 2.35 }),
                (
                    0.40,
                    0.82,
                    Rocks {
                        items: vec![
                            rock(0.44, 2.8, -1.4, 0.85, 1.1, 0.9, 1.2),
                            rock(0.58, 1.3, -2.0, 1.0, 1.2, 1.2, 0.95),
                            rock(0.72, 2.4, -0.7, 0.9, 0.9, 1.15, 1.0),
                        ],
                    },
                ),
            ],
        ),
        corridor_level(
            10,
            "Final Run",
            12.4,
            132.0,
            3.55,
            3.7,
            vec![
                (0.06, 0.18, Curve { from: 0.0, to: 0.9 }),
                (0.14, 0.90, Walls { half_width: 3.15 }),
                (0.20, 0.30, Arch { drop: 2.2 }),
                (0.30, 0.40, Dip { depth: 1.4 }),
                (0.46, 0.56, Mound { height: 1.2 }),
                (0.56, 0.66, Arch { drop: 2.45 }),
                (0.64, 0.76, Curve { from: 0.9, to: -0.1 }),
                (
                    0.34,
                    0.88,
                    Rocks {
                        items: vec![
                            rock(0.38, 2.7, -1.8, 0.9, 1.15, 1.0, 0.95),
                            rock(0.52, 1.4, -1.0, 1.05, 1.1, 1.25, 1.1),
                            rock(0.63, 3.0, -2.2, 0.95, 1.25, 0.9, 1.15),
                            rock(0.78, 2.1, -0.6, 0.85, 0.95, 1.1, 0.95),
                        ],
                    },
                ),
            ],
        ),
    ]
}

/// Procedural open-canyon level, deterministic in `(index, seed)`
pub fn canyon_level(id: u32, index: u32, seed: u64) -> Level {
    let mut rng = Pcg32::seed_from_u64(seed.wrapping_add(index as u64));
    let tier = index as f32;

    let route_length = 36.0 + tier * 8.0;
    let start_x = -route_length * 0.5;
    let finish_x = route_length * 0.5;
    let landing_z = rng.random_range(-2.5..2.5);

    let mut terrain = TerrainParams {
        terrain_seed: rng.random(),
        ..TerrainParams::default()
    };
    terrain.wave_amp = [
        rng.random_range(0.3..0.7),
        rng.random_range(0.2..0.5),
        rng.random_range(0.3..0.9),
    ];
    terrain.craters.count = 2 + index;
    terrain.mountains.count = 2 + index;
    terrain.chasms.count = 1 + index / 2;
    terrain.spires.count = 1 + index;
    terrain.gates.count = 1 + index / 2;
    terrain.corridor_flatten_strength = rng.random_range(0.4..0.8);

    // Odd canyons get a roof slab over the middle of the route
    let roof = (index % 2 == 1)
        .then(|| Aabb::from_center(Vec3::new(0.0, 8.5, 0.0), Vec3::new(6.0, 0.5, 9.0)));

    Level {
        id,
        name: format!("Canyon {}", index + 1),
        gravity: 9.0 + tier * 0.5,
        wind: rng.random_range(-1.5..1.5),
        route_length,
        spawn: Vec3::new(start_x, SPAWN_Y, 0.0),
        launch_pad: Pad::new(Vec3::new(start_x, PAD_CENTER_Y, 0.0), LAUNCH_PAD_SIZE),
        landing_pad: Pad::new(Vec3::new(finish_x, PAD_CENTER_Y, landing_z), 4.5),
        roof,
        terrain: LevelTerrain::Open(terrain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_campaign_is_valid() {
        let campaign = Campaign::standard();
        assert_eq!(campaign.len(), 14);
        for level in campaign.levels() {
            level.validate().unwrap();
        }
    }

    #[test]
    fn test_finish_approach_appended() {
        let levels = corridor_levels();
        let LevelTerrain::Corridor(c) = &levels[0].terrain else {
            panic!("level 1 should be a corridor");
        };
        let (x0, x1) = c.finish_approach().unwrap();
        assert!((x1 - 20.0).abs() < 1e-4);
        assert!((x0 - (20.0 - 8.8)).abs() < 1e-4);
    }

    #[test]
    fn test_rock_positions_mapped_to_route() {
        let levels = corridor_levels();
        let LevelTerrain::Corridor(c) = &levels[7].terrain else {
            panic!("level 8 should be a corridor");
        };
        let rocks = c
            .segments
            .iter()
            .find_map(|s| match &s.kind {
                SegmentKind::Rocks { items } => Some(items),
                _ => None,
            })
            .unwrap();
        // n = 0.5 on a 96-unit route centred on zero
        assert!(rocks[1].x.abs() < 1e-4);
    }

    #[test]
    fn test_clamp_index() {
        let campaign = Campaign::standard();
        assert_eq!(campaign.clamp_index(-3), 0);
        assert_eq!(campaign.clamp_index(999), campaign.len() - 1);
        assert_eq!(campaign.clamp_index(2), 2);
    }

    #[test]
    fn test_canyon_level_deterministic() {
        assert_eq!(canyon_level(11, 2, 7), canyon_level(11, 2, 7));
        assert_ne!(canyon_level(11, 2, 7), canyon_level(11, 2, 8));
    }

    #[test]
    fn test_validation_rejects_inverted_segment() {
        let mut level = corridor_levels().remove(2);
        if let LevelTerrain::Corridor(c) = &mut level.terrain {
            c.segments[1].x1 = c.segments[1].x0 - 1.0;
        }
        assert!(matches!(
            level.validate(),
            Err(LevelError::SegmentRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_campaign_rejects_empty_and_bad_gravity() {
        assert!(matches!(Campaign::new(Vec::new()), Err(LevelError::Empty)));

        let mut level = corridor_levels().remove(0);
        level.gravity = f32::NAN;
        assert!(matches!(
            Campaign::new(vec![level]),
            Err(LevelError::Gravity { level: 1 })
        ));
    }

    #[test]
    fn test_campaign_json_roundtrip() {
        let levels = corridor_levels();
        let json = serde_json::to_string(&levels[7..8]).unwrap();
        let campaign = Campaign::from_json(&json).unwrap();
        assert_eq!(campaign.levels()[0], levels[7]);
    }

    #[test]
    fn test_oversized_hazard_count_rejected() {
        let mut level = canyon_level(11, 0, CANYON_SEED);
        if let LevelTerrain::Open(t) = &mut level.terrain {
            t.craters.count = 4_000_000_000;
        }
        let json = serde_json::to_string(&[level]).unwrap();
        assert!(matches!(
            Campaign::from_json(&json),
            Err(LevelError::HazardCount {
                field: "craters",
                count: 4_000_000_000,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_hazard_geometry_rejected() {
        let mut level = canyon_level(11, 0, CANYON_SEED);
        if let LevelTerrain::Open(t) = &mut level.terrain {
            t.gates.depth = 0.0;
        }
        assert!(matches!(
            level.validate(),
            Err(LevelError::Geometry { field: "gate depth", .. })
        ));

        let mut level = canyon_level(11, 0, CANYON_SEED);
        if let LevelTerrain::Open(t) = &mut level.terrain {
            t.spires.height = Span::new(-1.0, 2.0);
        }
        assert!(matches!(
            level.validate(),
            Err(LevelError::Span { field: "spire height", .. })
        ));
    }

    #[test]
    fn test_bad_rock_rejected() {
        let mut level = corridor_levels().remove(7);
        if let LevelTerrain::Corridor(c) = &mut level.terrain {
            for seg in &mut c.segments {
                if let SegmentKind::Rocks { items } = &mut seg.kind {
                    items[0].r = -1.0;
                }
            }
        }
        assert!(matches!(
            level.validate(),
            Err(LevelError::Geometry { field: "rock", .. })
        ));
    }

    #[test]
    fn test_campaign_json_parse_error() {
        assert!(matches!(
            Campaign::from_json("[{\"id\": 1}]"),
            Err(LevelError::Parse(_))
        ));
    }
}
