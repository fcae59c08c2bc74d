//! Core simulation state for the Meeples workspace: a raster game board
//! with baked-in obstacle circles and steering agents ("meeples") that
//! sense the raster ahead of their heading through a pie-slice cone.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;
use thiserror::Error;

new_key_type! {
    /// Stable handle for meeples backed by a generational slot map.
    pub struct MeepleId;
}

/// RGB color of a single board pixel.
pub type Color = [u8; 3];

const FULL_TURN: f32 = 360.0;
const HALF_TURN: f32 = 180.0;

/// Angular resolution of the sensor sweep along each ring, in degrees.
const SWEEP_STEP_DEGREES: f32 = 1.0;

/// Wraps a heading in degrees into `[0, 360)`.
///
/// Total over all inputs: non-finite headings collapse to `0.0`.
#[must_use]
pub fn normalize_heading(heading: f32) -> f32 {
    if !heading.is_finite() {
        return 0.0;
    }
    let mut wrapped = heading.rem_euclid(FULL_TURN);
    if wrapped >= FULL_TURN {
        wrapped -= FULL_TURN;
    }
    wrapped
}

/// High level simulation clock (ticks processed since boot).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the tick counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// 2D position in canvas pixel space, real-valued.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Polar velocity: heading in degrees, speed in pixels per tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    pub heading: f32,
    pub speed: f32,
}

impl Velocity {
    /// Construct a velocity with the heading wrapped into `[0, 360)`.
    #[must_use]
    pub fn new(heading: f32, speed: f32) -> Self {
        Self {
            heading: normalize_heading(heading),
            speed,
        }
    }

    /// Cartesian displacement covered in one tick. Raster convention:
    /// +y points down the canvas, so heading 90° moves downward.
    #[must_use]
    pub fn displacement(&self) -> (f32, f32) {
        let radians = self.heading.to_radians();
        (radians.cos() * self.speed, radians.sin() * self.speed)
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self {
            heading: 0.0,
            speed: 1.0,
        }
    }
}

/// Pie-slice sensing cone: total angular width in degrees plus maximum
/// sense distance in pixels. Immutable per meeple after construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sensor {
    pub angle: f32,
    pub radius: f32,
}

impl Sensor {
    /// Construct a new sensing cone.
    #[must_use]
    pub const fn new(angle: f32, radius: f32) -> Self {
        Self { angle, radius }
    }

    /// Scan the pie slice ahead of `heading` from the nearest ring
    /// outward, returning the first obstacle-colored sample.
    ///
    /// Out-of-bounds samples contribute nothing and never abort the
    /// sweep; a non-positive radius never detects.
    #[must_use]
    pub fn sweep(&self, board: &Board, apex: Position, heading: f32) -> Option<Detection> {
        if self.radius.is_nan() || self.radius <= 0.0 || self.angle.is_nan() || self.angle < 0.0 {
            return None;
        }
        let span = self.angle.min(FULL_TURN);
        let start = heading - span / 2.0;
        // Samples past the far corner of the board are always out of bounds.
        let reach = self.radius.min((board.width() + board.height()) as f32);
        let mut ring = 1.0_f32;
        while ring <= reach {
            let mut offset = 0.0_f32;
            loop {
                let theta = (start + offset).to_radians();
                let x = apex.x + theta.cos() * ring;
                let y = apex.y + theta.sin() * ring;
                if board.is_obstacle(x, y) {
                    return Some(Detection { distance: ring });
                }
                if offset >= span {
                    break;
                }
                offset = (offset + SWEEP_STEP_DEGREES).min(span);
            }
            ring += 1.0;
        }
        None
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            angle: 90.0,
            radius: 40.0,
        }
    }
}

/// First obstacle-colored sample found during a sensor sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Distance from the cone apex to the detected ring, in pixels.
    pub distance: f32,
}

/// Minimum forced turn for a detection at `distance` inside a cone of
/// `radius`: closer obstacles force sharper avoidance, linearly up to a
/// half turn.
#[must_use]
pub fn avoidance_min_turn(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    let closeness = 1.0 - (distance / radius).clamp(0.0, 1.0);
    (HALF_TURN * closeness).clamp(0.0, HALF_TURN)
}

/// Turn-delta sampling range for an avoidance maneuver, returned in
/// ascending order regardless of which bound came out larger.
#[must_use]
pub fn avoidance_turn_range(heading: f32, cone_angle: f32, min_turn: f32) -> (f32, f32) {
    let starting_angle = normalize_heading(heading - cone_angle / 2.0);
    let a = FULL_TURN - starting_angle + min_turn;
    let b = starting_angle + min_turn;
    if a <= b { (a, b) } else { (b, a) }
}

/// Record of a circle baked into the board raster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Obstacle {
    pub center: Position,
    pub radius: f32,
}

/// Raster game board: a base fill, a one-pixel border stroke, and solid
/// obstacle circles baked in a reserved color. Append-only after
/// construction; obstacles are never removed or moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: u32,
    height: u32,
    fill: Color,
    stroke: Color,
    obstacle_color: Color,
    pixels: Vec<Color>,
    obstacles: Vec<Obstacle>,
}

impl Board {
    /// Construct a board painted with `fill` and a one-pixel border stroke.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: Color, stroke: Color, obstacle_color: Color) -> Self {
        let mut board = Self {
            width,
            height,
            fill,
            stroke,
            obstacle_color,
            pixels: vec![fill; (width as usize) * (height as usize)],
            obstacles: Vec::new(),
        };
        board.paint_border();
        board
    }

    fn paint_border(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let stroke = self.stroke;
        for x in 0..self.width {
            self.put(x, 0, stroke);
            self.put(x, self.height - 1, stroke);
        }
        for y in 0..self.height {
            self.put(0, y, stroke);
            self.put(self.width - 1, y, stroke);
        }
    }

    fn put(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y as usize) * (self.width as usize) + (x as usize);
            self.pixels[idx] = color;
        }
    }

    /// Bake a filled circle of the reserved obstacle color in place.
    /// Irreversible; the record is appended to the obstacle list.
    pub fn add_obstacle(&mut self, center: Position, radius: f32) {
        if radius > 0.0 && self.width > 0 && self.height > 0 {
            let color = self.obstacle_color;
            let min_x = (center.x - radius).floor().max(0.0) as u32;
            let max_x = (center.x + radius).ceil().clamp(0.0, self.width as f32 - 1.0) as u32;
            let min_y = (center.y - radius).floor().max(0.0) as u32;
            let max_y = (center.y + radius).ceil().clamp(0.0, self.height as f32 - 1.0) as u32;
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let dx = x as f32 - center.x;
                    let dy = y as f32 - center.y;
                    if dx * dx + dy * dy <= radius * radius {
                        self.put(x, y, color);
                    }
                }
            }
        }
        self.obstacles.push(Obstacle { center, radius });
    }

    /// Read a single pixel; `None` outside the canvas.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Sample the raster at a real-valued point (nearest pixel).
    /// `None` outside the canvas or for non-finite coordinates.
    #[must_use]
    pub fn sample(&self, x: f32, y: f32) -> Option<Color> {
        if !x.is_finite() || !y.is_finite() || x < -0.5 || y < -0.5 {
            return None;
        }
        self.get(x.round() as u32, y.round() as u32)
    }

    /// True when the sampled pixel carries the reserved obstacle color.
    /// Total: out-of-bounds points are never obstacles.
    #[must_use]
    pub fn is_obstacle(&self, x: f32, y: f32) -> bool {
        self.sample(x, y) == Some(self.obstacle_color)
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn fill(&self) -> Color {
        self.fill
    }

    #[must_use]
    pub const fn stroke(&self) -> Color {
        self.stroke
    }

    #[must_use]
    pub const fn obstacle_color(&self) -> Color {
        self.obstacle_color
    }

    /// Raw pixel rows in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Records of every baked obstacle, in insertion order.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}

/// Scalar fields for a single meeple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MeepleData {
    pub position: Position,
    pub velocity: Velocity,
    pub sensor: Sensor,
    /// Render diameter in pixels.
    pub size: f32,
    pub color: Color,
}

impl Default for MeepleData {
    fn default() -> Self {
        Self {
            position: Position::default(),
            velocity: Velocity::default(),
            sensor: Sensor::default(),
            size: 10.0,
            color: [0, 0, 255],
        }
    }
}

/// Errors surfaced while constructing a game board.
#[derive(Debug, Error)]
pub enum BoardStateError {
    /// Indicates configuration values that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Tunable parameters controlling board construction and meeple spawning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    /// Width of the board in pixels.
    pub board_width: u32,
    /// Height of the board in pixels.
    pub board_height: u32,
    /// Base color painted across the board.
    pub fill_color: Color,
    /// Color of the one-pixel border stroke.
    pub stroke_color: Color,
    /// Reserved obstacle color; must differ from fill and stroke.
    pub obstacle_color: Color,
    /// Smallest radius assigned to randomized obstacles, in pixels.
    pub obstacle_radius_min: f32,
    /// Largest radius assigned to randomized obstacles, in pixels.
    pub obstacle_radius_max: f32,
    /// Sensing cone applied to randomized meeples.
    pub default_sensor: Sensor,
    /// Slowest speed assigned to randomized meeples, in pixels per tick.
    pub speed_min: f32,
    /// Fastest speed assigned to randomized meeples, in pixels per tick.
    pub speed_max: f32,
    /// Render diameter assigned to randomized meeples.
    pub meeple_size: f32,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
    /// Maximum number of recent tick summaries retained in memory.
    pub history_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_width: 1_000,
            board_height: 1_000,
            fill_color: [255, 255, 255],
            stroke_color: [255, 0, 0],
            obstacle_color: [0, 0, 0],
            obstacle_radius_min: 25.0,
            obstacle_radius_max: 50.0,
            default_sensor: Sensor::default(),
            speed_min: 1.0,
            speed_max: 5.0,
            meeple_size: 10.0,
            rng_seed: None,
            history_capacity: 256,
        }
    }
}

impl BoardConfig {
    /// Validates the configuration before any raster is allocated.
    fn validate(&self) -> Result<(), BoardStateError> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(BoardStateError::InvalidConfig(
                "board dimensions must be non-zero",
            ));
        }
        if self.obstacle_color == self.fill_color {
            return Err(BoardStateError::InvalidConfig(
                "obstacle color must differ from the fill color",
            ));
        }
        if self.obstacle_color == self.stroke_color {
            return Err(BoardStateError::InvalidConfig(
                "obstacle color must differ from the stroke color",
            ));
        }
        if self.obstacle_radius_min <= 0.0 || self.obstacle_radius_max < self.obstacle_radius_min {
            return Err(BoardStateError::InvalidConfig(
                "obstacle radius range must be positive and ascending",
            ));
        }
        if self.speed_min < 0.0 || self.speed_max < self.speed_min {
            return Err(BoardStateError::InvalidConfig(
                "speed range must be non-negative and ascending",
            ));
        }
        if self.default_sensor.radius < 0.0 || self.default_sensor.angle < 0.0 {
            return Err(BoardStateError::InvalidConfig(
                "sensor angle and radius must be non-negative",
            ));
        }
        if self.meeple_size <= 0.0 {
            return Err(BoardStateError::InvalidConfig(
                "meeple size must be positive",
            ));
        }
        if self.history_capacity == 0 {
            return Err(BoardStateError::InvalidConfig(
                "history_capacity must be non-zero",
            ));
        }
        Ok(())
    }

    /// Returns the configured RNG seed, generating one from entropy if absent.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Summary recorded into the in-memory history ring each tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: Tick,
    pub meeple_count: usize,
    /// Meeples whose sweep detected an obstacle this tick.
    pub detections: usize,
}

/// Owner of the board raster, the meeple population, and the tick
/// pipeline. One `step` call is one logical tick: sense and steer every
/// meeple, then move and clamp. Hosts drive the cadence.
#[derive(Debug)]
pub struct GameBoard {
    config: BoardConfig,
    board: Board,
    meeples: SlotMap<MeepleId, MeepleData>,
    rng: SmallRng,
    tick: Tick,
    history: VecDeque<TickSummary>,
}

impl GameBoard {
    /// Build a world from a validated configuration.
    pub fn new(config: BoardConfig) -> Result<Self, BoardStateError> {
        config.validate()?;
        let board = Board::new(
            config.board_width,
            config.board_height,
            config.fill_color,
            config.stroke_color,
            config.obstacle_color,
        );
        let rng = config.seeded_rng();
        Ok(Self {
            config,
            board,
            meeples: SlotMap::with_key(),
            rng,
            tick: Tick::zero(),
            history: VecDeque::new(),
        })
    }

    /// Insert a meeple with explicit fields. Hosts may call this at any
    /// point between ticks.
    pub fn spawn_meeple(&mut self, meeple: MeepleData) -> MeepleId {
        self.meeples.insert(meeple)
    }

    /// Insert a meeple with uniform random position, heading, speed, and
    /// color drawn from the configured ranges.
    pub fn spawn_random(&mut self) -> MeepleId {
        let width = self.config.board_width as f32;
        let height = self.config.board_height as f32;
        let position = Position::new(
            self.rng.random_range(0.0..=width),
            self.rng.random_range(0.0..=height),
        );
        let velocity = Velocity::new(
            self.rng.random_range(0.0..FULL_TURN),
            self.rng
                .random_range(self.config.speed_min..=self.config.speed_max),
        );
        let mut color: Color = [self.rng.random(), self.rng.random(), self.rng.random()];
        if color == self.config.obstacle_color {
            color[0] = color[0].wrapping_add(1);
        }
        self.meeples.insert(MeepleData {
            position,
            velocity,
            sensor: self.config.default_sensor,
            size: self.config.meeple_size,
            color,
        })
    }

    /// Bake an obstacle circle into the board, filling unspecified fields
    /// from the configured ranges. Returns the appended record.
    pub fn add_obstacle(&mut self, center: Option<Position>, radius: Option<f32>) -> Obstacle {
        let center = match center {
            Some(center) => center,
            None => Position::new(
                self.rng.random_range(0.0..=self.config.board_width as f32),
                self.rng.random_range(0.0..=self.config.board_height as f32),
            ),
        };
        let radius = match radius {
            Some(radius) => radius,
            None => self.rng.random_range(
                self.config.obstacle_radius_min..=self.config.obstacle_radius_max,
            ),
        };
        self.board.add_obstacle(center, radius);
        Obstacle { center, radius }
    }

    /// Advance one tick: sense and steer every meeple, then move and
    /// clamp every position into the board bounds.
    pub fn step(&mut self) -> TickSummary {
        let detections = self.stage_steer();
        self.stage_advance();
        self.tick = self.tick.next();
        let summary = TickSummary {
            tick: self.tick,
            meeple_count: self.meeples.len(),
            detections,
        };
        self.push_history(summary);
        summary
    }

    fn stage_steer(&mut self) -> usize {
        let board = &self.board;
        let rng = &mut self.rng;
        let mut detections = 0;
        for meeple in self.meeples.values_mut() {
            if steer(meeple, board, rng) {
                detections += 1;
            }
        }
        detections
    }

    fn stage_advance(&mut self) {
        let width = self.config.board_width as f32;
        let height = self.config.board_height as f32;
        for meeple in self.meeples.values_mut() {
            let (dx, dy) = meeple.velocity.displacement();
            meeple.position.x = (meeple.position.x + dx).clamp(0.0, width);
            meeple.position.y = (meeple.position.y + dy).clamp(0.0, height);
        }
    }

    fn push_history(&mut self, summary: TickSummary) {
        if self.history.len() == self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Shared access to the board raster (sensing and compositing).
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// All live meeples keyed by handle.
    #[must_use]
    pub fn meeples(&self) -> &SlotMap<MeepleId, MeepleData> {
        &self.meeples
    }

    /// Snapshot of a single meeple, if the handle is live.
    #[must_use]
    pub fn meeple(&self, id: MeepleId) -> Option<&MeepleData> {
        self.meeples.get(id)
    }

    #[must_use]
    pub fn meeple_count(&self) -> usize {
        self.meeples.len()
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Recent tick summaries, oldest first, bounded by `history_capacity`.
    #[must_use]
    pub fn history(&self) -> &VecDeque<TickSummary> {
        &self.history
    }
}

/// Sense and possibly re-aim one meeple. Returns whether the sweep
/// detected an obstacle (at most one turn per tick).
fn steer(meeple: &mut MeepleData, board: &Board, rng: &mut SmallRng) -> bool {
    meeple.velocity.heading = normalize_heading(meeple.velocity.heading);
    let Some(detection) = meeple
        .sensor
        .sweep(board, meeple.position, meeple.velocity.heading)
    else {
        return false;
    };
    let min_turn = avoidance_min_turn(detection.distance, meeple.sensor.radius);
    let (low, high) = avoidance_turn_range(meeple.velocity.heading, meeple.sensor.angle, min_turn);
    let delta = rng.random_range(low..=high);
    meeple.velocity.heading = normalize_heading(meeple.velocity.heading + delta);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BoardConfig {
        BoardConfig {
            board_width: 300,
            board_height: 200,
            rng_seed: Some(7),
            ..BoardConfig::default()
        }
    }

    #[test]
    fn normalize_heading_lands_in_range_and_is_idempotent() {
        for &heading in &[
            -720.5_f32, -360.0, -0.25, 0.0, 45.0, 359.9, 360.0, 361.0, 1_234.5,
        ] {
            let wrapped = normalize_heading(heading);
            assert!(
                (0.0..FULL_TURN).contains(&wrapped),
                "{heading} wrapped to {wrapped}"
            );
            assert_eq!(normalize_heading(wrapped), wrapped);
        }
        assert_eq!(normalize_heading(f32::NAN), 0.0);
        assert_eq!(normalize_heading(f32::INFINITY), 0.0);
    }

    #[test]
    fn board_pixel_accessors() {
        let fill = [200, 200, 200];
        let stroke = [10, 10, 10];
        let board = Board::new(8, 4, fill, stroke, [0, 0, 0]);
        assert_eq!(board.pixels().len(), 32);
        assert_eq!(board.fill(), fill);
        assert_eq!(board.stroke(), stroke);
        assert_eq!(board.obstacle_color(), [0, 0, 0]);
        assert_eq!(board.get(0, 0), Some(stroke));
        assert_eq!(board.get(7, 3), Some(stroke));
        assert_eq!(board.get(3, 2), Some(fill));
        assert!(board.get(8, 0).is_none());
        assert!(board.get(0, 4).is_none());
        assert!(board.sample(-3.0, 1.0).is_none());
        assert_eq!(board.sample(3.4, 2.2), Some(fill));
    }

    #[test]
    fn add_obstacle_paints_reserved_color() {
        let mut board = Board::new(100, 100, [255, 255, 255], [255, 0, 0], [0, 0, 0]);
        board.add_obstacle(Position::new(50.0, 50.0), 10.0);
        assert_eq!(board.obstacles().len(), 1);
        assert_eq!(board.get(50, 50), Some([0, 0, 0]));
        assert_eq!(board.get(50, 40), Some([0, 0, 0]));
        assert_eq!(board.get(50, 39), Some([255, 255, 255]));
        assert_eq!(board.get(61, 50), Some([255, 255, 255]));
        assert!(board.is_obstacle(50.0, 50.0));
        assert!(!board.is_obstacle(120.0, 50.0));
    }

    #[test]
    fn obstacle_overlapping_the_edge_is_clipped() {
        let mut board = Board::new(60, 60, [255, 255, 255], [255, 0, 0], [0, 0, 0]);
        board.add_obstacle(Position::new(0.0, 30.0), 8.0);
        assert_eq!(board.get(0, 30), Some([0, 0, 0]));
        assert!(board.sample(-5.0, 30.0).is_none());
        assert_eq!(board.obstacles().len(), 1);
    }

    #[test]
    fn heading_zero_advances_along_positive_x() {
        let mut world = GameBoard::new(test_config()).expect("world");
        let id = world.spawn_meeple(MeepleData {
            position: Position::new(10.0, 50.0),
            velocity: Velocity::new(0.0, 4.0),
            ..MeepleData::default()
        });
        world.step();
        let meeple = world.meeple(id).expect("meeple");
        assert_eq!(meeple.position, Position::new(14.0, 50.0));
        assert_eq!(meeple.velocity.heading, 0.0);
    }

    #[test]
    fn clamp_pins_positions_to_bounds() {
        let mut world = GameBoard::new(test_config()).expect("world");
        let origin = world.spawn_meeple(MeepleData {
            position: Position::new(0.0, 0.0),
            velocity: Velocity::new(180.0, 5.0),
            ..MeepleData::default()
        });
        let corner = world.spawn_meeple(MeepleData {
            position: Position::new(299.5, 199.5),
            velocity: Velocity::new(45.0, 10.0),
            ..MeepleData::default()
        });
        world.step();
        let at_origin = world.meeple(origin).expect("meeple");
        assert_eq!(at_origin.position.x, 0.0);
        assert!(at_origin.position.y >= 0.0);
        let at_corner = world.meeple(corner).expect("meeple");
        assert!(at_corner.position.x <= 300.0);
        assert!(at_corner.position.y <= 200.0);
    }

    #[test]
    fn pure_background_slice_never_turns() {
        let mut world = GameBoard::new(test_config()).expect("world");
        let id = world.spawn_meeple(MeepleData {
            position: Position::new(150.0, 100.0),
            velocity: Velocity::new(123.0, 0.0),
            ..MeepleData::default()
        });
        for _ in 0..25 {
            let summary = world.step();
            assert_eq!(summary.detections, 0);
        }
        let meeple = world.meeple(id).expect("meeple");
        assert_eq!(meeple.velocity.heading, 123.0);
    }

    #[test]
    fn closer_detections_force_larger_minimum_turns() {
        let close = avoidance_min_turn(5.0, 40.0);
        let far = avoidance_min_turn(30.0, 40.0);
        assert!(close >= far, "{close} < {far}");
        assert_eq!(avoidance_min_turn(0.0, 40.0), 180.0);
        assert_eq!(avoidance_min_turn(40.0, 40.0), 0.0);
        assert_eq!(avoidance_min_turn(55.0, 40.0), 0.0);
        assert_eq!(avoidance_min_turn(10.0, 0.0), 0.0);
    }

    #[test]
    fn turn_range_bounds_are_ascending() {
        assert_eq!(avoidance_turn_range(90.0, 90.0, 30.0), (75.0, 345.0));
        assert_eq!(avoidance_turn_range(350.0, 20.0, 10.0), (30.0, 350.0));
        for heading in [0.0_f32, 37.5, 90.0, 180.0, 270.0, 359.0] {
            for cone in [10.0_f32, 90.0, 180.0] {
                let (low, high) = avoidance_turn_range(heading, cone, 45.0);
                assert!(low <= high, "({heading}, {cone}) gave ({low}, {high})");
            }
        }
    }

    #[test]
    fn zero_radius_sensor_never_detects() {
        let mut board = Board::new(50, 50, [255, 255, 255], [255, 0, 0], [0, 0, 0]);
        board.add_obstacle(Position::new(25.0, 25.0), 20.0);
        let sensor = Sensor::new(90.0, 0.0);
        assert!(
            sensor
                .sweep(&board, Position::new(25.0, 25.0), 0.0)
                .is_none()
        );
    }

    #[test]
    fn config_validation_rejects_degenerate_boards() {
        let zero_width = BoardConfig {
            board_width: 0,
            ..BoardConfig::default()
        };
        assert!(matches!(
            GameBoard::new(zero_width),
            Err(BoardStateError::InvalidConfig(_))
        ));

        let ambiguous_fill = BoardConfig {
            fill_color: [0, 0, 0],
            ..BoardConfig::default()
        };
        assert!(matches!(
            GameBoard::new(ambiguous_fill),
            Err(BoardStateError::InvalidConfig(_))
        ));

        let inverted_radii = BoardConfig {
            obstacle_radius_min: 50.0,
            obstacle_radius_max: 25.0,
            ..BoardConfig::default()
        };
        assert!(matches!(
            GameBoard::new(inverted_radii),
            Err(BoardStateError::InvalidConfig(_))
        ));

        let no_history = BoardConfig {
            history_capacity: 0,
            ..BoardConfig::default()
        };
        assert!(matches!(
            GameBoard::new(no_history),
            Err(BoardStateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn game_board_initialises_from_config() {
        let config = test_config();
        let mut world = GameBoard::new(config.clone()).expect("world");
        assert_eq!(world.meeple_count(), 0);
        assert_eq!(world.tick(), Tick::zero());
        assert_eq!(world.board().width(), config.board_width);
        assert_eq!(world.board().height(), config.board_height);

        let id = world.spawn_meeple(MeepleData::default());
        assert_eq!(world.meeple_count(), 1);
        assert!(world.meeple(id).is_some());

        let summary = world.step();
        assert_eq!(world.tick(), Tick(1));
        assert_eq!(summary.tick, Tick(1));
        assert_eq!(summary.meeple_count, 1);
        assert_eq!(world.history().len(), 1);
    }

    #[test]
    fn random_spawns_stay_within_configured_ranges() {
        let config = test_config();
        let mut world = GameBoard::new(config.clone()).expect("world");
        for _ in 0..20 {
            let id = world.spawn_random();
            let meeple = world.meeple(id).expect("meeple");
            assert!(meeple.position.x >= 0.0 && meeple.position.x <= 300.0);
            assert!(meeple.position.y >= 0.0 && meeple.position.y <= 200.0);
            assert!((0.0..FULL_TURN).contains(&meeple.velocity.heading));
            assert!(meeple.velocity.speed >= config.speed_min);
            assert!(meeple.velocity.speed <= config.speed_max);
            assert_ne!(meeple.color, config.obstacle_color);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = |seed: u64| {
            let config = BoardConfig {
                rng_seed: Some(seed),
                ..test_config()
            };
            let mut world = GameBoard::new(config).expect("world");
            world.add_obstacle(None, None);
            world.add_obstacle(None, None);
            for _ in 0..3 {
                world.spawn_random();
            }
            let mut last = TickSummary {
                tick: Tick::zero(),
                meeple_count: 0,
                detections: 0,
            };
            for _ in 0..50 {
                last = world.step();
            }
            let positions: Vec<Position> =
                world.meeples().values().map(|m| m.position).collect();
            (positions, last)
        };

        let (positions_a, summary_a) = run(9);
        let (positions_b, summary_b) = run(9);
        assert_eq!(positions_a, positions_b);
        assert_eq!(summary_a, summary_b);
    }
}
