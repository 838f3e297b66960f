//! Demo sessions: everything one running animation owns.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::{Camera, CameraRig};
use crate::canvas::{Canvas, Composite, Frame};
use crate::color::{Hsla, Rgba};
use crate::error::SceneError;
use crate::noise::SimplexNoise;
use crate::orbit::{Direction, Dot, DotBuilder, IdGenerator, Renderable, StepContext};
use crate::pairing::{DotPairer, PairStyle};
use crate::raster::{Fog, RasterStats, TubeRasterizer};
use crate::spline::CatmullRomPath;
use crate::tube::{lift_outline, Tube, TubeParams, SAMPLE_OUTLINE};

/// A running animation: stepped then drawn once per tick.
pub trait Demo {
    fn name(&self) -> &'static str;

    /// Advances the animation state by one tick.
    fn step(&mut self);

    /// Renders the current state into `frame`.
    fn draw(&mut self, frame: &mut Frame);

    /// Resizes `frame` and lets the demo adapt. Returns `false` when the
    /// request was ignored (zero-sized).
    fn resize(&mut self, frame: &mut Frame, width: u32, height: u32) -> bool {
        if !frame.resize(width, height) {
            return false;
        }
        self.surface_resized(width, height);
        true
    }

    fn surface_resized(&mut self, _width: u32, _height: u32) {}
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn check_surface(width: u32, height: u32) -> Result<(), SceneError> {
    if width == 0 || height == 0 {
        return Err(SceneError::invalid(
            "surface",
            format!("{width}x{height} has no area"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TubeDemoParams {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    pub tube: TubeParams,
    /// Control point heights are drawn from `[0, height_range)`.
    pub height_range: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub look_ahead: f32,
    pub fog: Fog,
}

impl Default for TubeDemoParams {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            seed: None,
            tube: TubeParams::default(),
            height_range: 100.0,
            fov_degrees: 45.0,
            near: 0.1,
            far: 150.0,
            speed: 0.0005,
            look_ahead: 0.01,
            fog: Fog::default(),
        }
    }
}

/// Camera flight through a tube of cubes.
pub struct TubeDemo {
    path: CatmullRomPath,
    tube: Tube,
    camera: Camera,
    rig: CameraRig,
    raster: TubeRasterizer,
    last_stats: RasterStats,
}

impl TubeDemo {
    pub fn new(params: &TubeDemoParams) -> Result<Self, SceneError> {
        check_surface(params.width, params.height)?;
        if !(params.near > 0.0 && params.far > params.near) {
            return Err(SceneError::invalid("clip planes", "need 0 < near < far"));
        }
        if !(params.fov_degrees > 0.0 && params.fov_degrees < 180.0) {
            return Err(SceneError::invalid("fov", "must lie within (0, 180) degrees"));
        }

        let mut rng = rng_for(params.seed);
        let points = lift_outline(&SAMPLE_OUTLINE, params.height_range, &mut rng);
        let path = CatmullRomPath::new(points, true)?;
        let noise = SimplexNoise::new(rng.gen());
        let tube = Tube::build(&path, &params.tube, &noise, &mut rng)?;

        let mut camera = Camera::perspective(params.fov_degrees, 1.0, params.near, params.far);
        camera.set_aspect(params.width, params.height);

        tracing::info!(
            cubes = tube.len(),
            rings = params.tube.tube_detail,
            speed = params.speed,
            seed = ?params.seed,
            "tube demo ready"
        );

        Ok(Self {
            path,
            tube,
            camera,
            rig: CameraRig::new(params.speed, params.look_ahead),
            raster: TubeRasterizer::new(params.fog),
            last_stats: RasterStats::default(),
        })
    }

    pub fn path(&self) -> &CatmullRomPath {
        &self.path
    }

    pub fn tube(&self) -> &Tube {
        &self.tube
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn last_stats(&self) -> RasterStats {
        self.last_stats
    }
}

impl Demo for TubeDemo {
    fn name(&self) -> &'static str {
        "tube"
    }

    fn step(&mut self) {
        self.rig.advance(&self.path, &mut self.camera);
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.last_stats = self.raster.render(&self.tube, &self.camera, frame);
    }

    fn surface_resized(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitDemoParams {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    pub dots: usize,
    pub orbit: f32,
    pub dot_radius: f32,
    pub velocity: f32,
    pub hue_step: f32,
    pub glow_blur: f32,
    /// Per-frame black wash; lower values leave longer trails.
    pub trail_alpha: f32,
    pub pairs: PairStyle,
}

impl Default for OrbitDemoParams {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            seed: None,
            dots: 6,
            orbit: 200.0,
            dot_radius: 1.0,
            velocity: 0.08,
            hue_step: 0.5,
            glow_blur: 25.0,
            trail_alpha: 0.3,
            pairs: PairStyle::default(),
        }
    }
}

/// Orbiting dots joined by jittered strokes.
pub struct OrbitDemo {
    surface: StepContext,
    dots: Vec<Dot>,
    extras: Vec<Box<dyn Renderable>>,
    pairer: DotPairer,
    wash: Rgba,
    ids: IdGenerator,
    rng: StdRng,
    last_pairs: usize,
    /// Set until the surface has an opaque black base under the trails.
    needs_base: bool,
}

impl OrbitDemo {
    pub fn new(params: &OrbitDemoParams) -> Result<Self, SceneError> {
        check_surface(params.width, params.height)?;
        if !(0.0..=1.0).contains(&params.trail_alpha) {
            return Err(SceneError::invalid("trail_alpha", "must lie within [0, 1]"));
        }

        let mut rng = rng_for(params.seed);
        let surface = StepContext::for_surface(params.width, params.height);
        let mut ids = IdGenerator::new();
        let mut dots = Vec::with_capacity(params.dots);
        for index in 0..params.dots {
            let share = index as f32 / params.dots as f32;
            let dot = DotBuilder::new(params.orbit, params.dot_radius)
                .angle((index * 360 / params.dots) as f32)
                .direction(Direction::Forward)
                .velocity(params.velocity)
                .hue(Hsla::new(share * 360.0, 100.0, 50.0, 1.0))
                .hue_step(params.hue_step)
                .glow_blur(params.glow_blur)
                .build(ids.next_id(), surface.center, &mut rng)?;
            dots.push(dot);
        }

        tracing::info!(
            dots = dots.len(),
            orbit = params.orbit,
            velocity = params.velocity,
            seed = ?params.seed,
            "orbit demo ready"
        );

        Ok(Self {
            surface,
            dots,
            extras: Vec::new(),
            pairer: DotPairer::new(params.pairs),
            wash: Rgba::new(0.0, 0.0, 0.0, params.trail_alpha),
            ids,
            rng,
            last_pairs: 0,
            needs_base: true,
        })
    }

    /// Adds another dot; it joins the pairing on the next draw.
    pub fn add_dot(&mut self, builder: DotBuilder) -> Result<&Dot, SceneError> {
        let dot = builder.build(self.ids.next_id(), self.surface.center, &mut self.rng)?;
        self.dots.push(dot);
        Ok(&self.dots[self.dots.len() - 1])
    }

    /// Adds a free-standing renderable drawn after the dots.
    pub fn add<R: Renderable + 'static>(&mut self, renderable: R) {
        self.extras.push(Box::new(renderable));
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn center(&self) -> Vec2 {
        self.surface.center
    }

    /// Pairs stroked by the most recent draw.
    pub fn last_pairs(&self) -> usize {
        self.last_pairs
    }

    /// Draws one frame onto any canvas.
    pub fn draw_on(&mut self, canvas: &mut dyn Canvas) {
        canvas.set_composite(Composite::SourceOver);
        if self.needs_base {
            canvas.fill(Rgba::BLACK);
            self.needs_base = false;
        }
        canvas.fill(self.wash);
        canvas.set_composite(Composite::Lighten);
        for dot in &self.dots {
            dot.draw(canvas);
        }
        for extra in &self.extras {
            extra.draw(canvas);
        }
        self.last_pairs = self.pairer.draw(&self.dots, canvas, &mut self.rng);
        canvas.set_composite(Composite::SourceOver);
    }
}

impl Demo for OrbitDemo {
    fn name(&self) -> &'static str {
        "orbit"
    }

    fn step(&mut self) {
        for dot in &mut self.dots {
            dot.step(&self.surface);
        }
        for extra in &mut self.extras {
            extra.step(&self.surface);
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.draw_on(frame);
    }

    fn surface_resized(&mut self, width: u32, height: u32) {
        self.surface = StepContext::for_surface(width, height);
        self.needs_base = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};
    use crate::orbit::point_on_circle;

    fn small_tube() -> TubeDemoParams {
        TubeDemoParams {
            width: 96,
            height: 64,
            seed: Some(7),
            tube: TubeParams {
                tube_detail: 60,
                circle_detail: 6,
                ..TubeParams::default()
            },
            ..TubeDemoParams::default()
        }
    }

    fn orbit(width: u32, height: u32) -> OrbitDemoParams {
        OrbitDemoParams {
            width,
            height,
            seed: Some(3),
            ..OrbitDemoParams::default()
        }
    }

    #[test]
    fn tube_demo_renders_cubes_after_a_step() {
        let params = small_tube();
        let mut demo = TubeDemo::new(&params).unwrap();
        let mut frame = Frame::new(params.width, params.height);
        demo.step();
        demo.draw(&mut frame);
        assert_eq!(demo.tube().len(), 360);
        assert!(demo.last_stats().drawn > 0);
        assert!(frame
            .as_bytes()
            .chunks(4)
            .any(|pixel| pixel[..3] != [0, 0, 0]));
    }

    #[test]
    fn tube_demo_is_deterministic_for_a_seed() {
        let params = small_tube();
        let a = TubeDemo::new(&params).unwrap();
        let b = TubeDemo::new(&params).unwrap();
        assert_eq!(a.path().control_points(), b.path().control_points());
        assert_eq!(a.tube().cubes(), b.tube().cubes());
    }

    #[test]
    fn tube_resize_updates_aspect() {
        let mut demo = TubeDemo::new(&small_tube()).unwrap();
        let mut frame = Frame::new(96, 64);
        assert!(demo.resize(&mut frame, 200, 100));
        assert!((demo.camera().aspect - 2.0).abs() < 1e-6);
        assert!(!demo.resize(&mut frame, 0, 100));
        assert!((demo.camera().aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_zero_surface() {
        let params = TubeDemoParams {
            width: 0,
            ..small_tube()
        };
        assert!(TubeDemo::new(&params).is_err());
        assert!(OrbitDemo::new(&orbit(10, 0)).is_err());
    }

    #[test]
    fn orbit_defaults_spread_dots_evenly() {
        let demo = OrbitDemo::new(&orbit(800, 600)).unwrap();
        let angles: Vec<f32> = demo.dots().iter().map(Dot::angle).collect();
        assert_eq!(angles, vec![0.0, 60.0, 120.0, 180.0, 240.0, 300.0]);
        for dot in demo.dots() {
            assert!((dot.position().distance(demo.center()) - 200.0).abs() < 1e-3);
        }
    }

    #[test]
    fn orbit_draw_washes_then_lightens() {
        let mut demo = OrbitDemo::new(&orbit(800, 600)).unwrap();
        demo.step();
        let mut canvas = RecordingCanvas::new(800, 600);
        demo.draw_on(&mut canvas);

        let commands = canvas.commands();
        assert_eq!(commands[0], DrawCommand::Composite(Composite::SourceOver));
        assert_eq!(commands[1], DrawCommand::Fill(Rgba::BLACK));
        assert_eq!(commands[2], DrawCommand::Fill(Rgba::new(0.0, 0.0, 0.0, 0.3)));
        assert_eq!(commands[3], DrawCommand::Composite(Composite::Lighten));
        let circles = commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 6);
        assert_eq!(canvas.polylines().count(), 15);
        assert_eq!(demo.last_pairs(), 15);

        canvas.clear();
        demo.draw_on(&mut canvas);
        let commands = canvas.commands();
        assert_eq!(commands[1], DrawCommand::Fill(Rgba::new(0.0, 0.0, 0.0, 0.3)));
        assert_eq!(commands[2], DrawCommand::Composite(Composite::Lighten));
    }

    #[test]
    fn orbit_background_is_opaque_from_the_first_frame() {
        let mut demo = OrbitDemo::new(&orbit(64, 48)).unwrap();
        let mut frame = Frame::new(64, 48);
        for _ in 0..3 {
            demo.step();
            demo.draw(&mut frame);
        }
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
        assert!(frame.as_bytes().chunks(4).all(|pixel| pixel[3] == 255));

        assert!(demo.resize(&mut frame, 32, 32));
        demo.step();
        demo.draw(&mut frame);
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn orbit_dots_advance_independently() {
        let mut demo = OrbitDemo::new(&OrbitDemoParams {
            dots: 0,
            ..orbit(400, 400)
        })
        .unwrap();
        let specs = [
            (10.0, 0.5, Direction::Forward),
            (350.0, 1.25, Direction::Forward),
            (20.0, 0.75, Direction::Reverse),
            (90.0, 0.0, Direction::Reverse),
        ];
        for (angle, velocity, direction) in specs {
            demo.add_dot(
                DotBuilder::new(100.0, 1.0)
                    .angle(angle)
                    .velocity(velocity)
                    .direction(direction),
            )
            .unwrap();
        }

        const TICKS: usize = 40;
        for _ in 0..TICKS {
            demo.step();
        }

        for (dot, (angle, velocity, direction)) in demo.dots().iter().zip(specs) {
            let expected = (angle + TICKS as f32 * velocity * direction.sign()).rem_euclid(360.0);
            let diff = (dot.angle() - expected).abs();
            assert!(
                diff.min(360.0 - diff) < 1e-2,
                "{}: expected {expected}, got {}",
                dot.id(),
                dot.angle()
            );
            let on_circle = point_on_circle(demo.center(), 100.0, dot.angle());
            assert!(dot.position().distance(on_circle) < 1e-2);
        }
    }

    #[test]
    fn orbit_recenters_after_resize() {
        let mut demo = OrbitDemo::new(&orbit(800, 600)).unwrap();
        let mut frame = Frame::new(800, 600);
        assert!(demo.resize(&mut frame, 400, 400));
        assert!(demo.resize(&mut frame, 400, 400));
        assert_eq!((frame.width(), frame.height()), (400, 400));
        demo.step();
        for dot in demo.dots() {
            assert!((dot.position().distance(Vec2::new(200.0, 200.0)) - 200.0).abs() < 1e-3);
        }
    }

    #[test]
    fn added_dots_join_the_pairing() {
        let mut demo = OrbitDemo::new(&orbit(800, 600)).unwrap();
        demo.add_dot(DotBuilder::new(120.0, 2.0)).unwrap();
        let mut canvas = RecordingCanvas::new(800, 600);
        demo.draw_on(&mut canvas);
        assert_eq!(demo.last_pairs(), 21);
    }

    struct Marker {
        steps: usize,
    }

    impl Renderable for Marker {
        fn step(&mut self, _ctx: &StepContext) {
            self.steps += 1;
        }

        fn draw(&self, canvas: &mut dyn Canvas) {
            canvas.fill_circle(Vec2::ZERO, self.steps as f32, Rgba::WHITE, None);
        }
    }

    #[test]
    fn extra_renderables_step_and_draw() {
        let mut demo = OrbitDemo::new(&OrbitDemoParams {
            dots: 0,
            ..orbit(100, 100)
        })
        .unwrap();
        demo.add(Marker { steps: 0 });
        demo.step();
        demo.step();
        let mut canvas = RecordingCanvas::new(100, 100);
        demo.draw_on(&mut canvas);
        assert!(canvas.commands().contains(&DrawCommand::Circle {
            center: Vec2::ZERO,
            radius: 2.0,
            color: Rgba::WHITE,
            glow: None,
        }));
        assert_eq!(demo.last_pairs(), 0);
    }
}
