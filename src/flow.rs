//! Fixed-timestep frame loop.
//!
//! An [`Engine`] drives one [`GameLogic`] against one [`Window`]. Simulation
//! time is consumed in fixed ticks of `1 / tick_rate` seconds while rendering
//! runs as fast as the loop spins.
//!
//! # Loop
//!
//! Each iteration the elapsed wall time is added to an accumulator and input
//! is polled once. Whole ticks are then drained from the accumulator; while
//! draining, the window's close signal is checked and the FPS counter rolls
//! over once per second. If at least one tick was drained, exactly one
//! `update` + `render` pass follows. Ticks beyond the first are dropped
//! rather than simulated.
//!
//! # Lifecycle
//!
//! 1. [`Engine::start`] initialises logging, installs the panic reporter and
//!    calls `Window::init` then `GameLogic::init`
//! 2. the loop runs until the window asks to close or a pass fails
//! 3. cleanup runs `Window::cleanup`, then `GameLogic::cleanup`, then puts
//!    back the panic hook that was active before `start`

use std::{panic::PanicHookInfo, sync::Arc, time::Duration};

use instant::Instant;

use crate::{config::EngineConfig, input::MouseInput, window::Window};

/// The five callbacks the frame loop drives, in this order every cycle:
/// `input`, `update`, `render`. `init` and `cleanup` run once.
pub trait GameLogic<W: Window> {
    fn init(&mut self, window: &mut W) -> anyhow::Result<()>;
    fn input(&mut self, window: &W);
    /// `interval` is the fixed tick duration in seconds.
    fn update(&mut self, interval: f32, mouse: &MouseInput);
    fn render(&mut self, window: &mut W) -> anyhow::Result<()>;
    fn cleanup(&mut self);
}

/// Tick accumulator and rolling one-second FPS counter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTimer {
    tick: f64,
    unprocessed: f64,
    frame_counter: f64,
    frames: u32,
    fps: u32,
}

impl FrameTimer {
    pub fn new(tick_seconds: f64) -> Self {
        Self {
            tick: tick_seconds,
            unprocessed: 0.0,
            frame_counter: 0.0,
            frames: 0,
            fps: 0,
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        let passed = elapsed.as_secs_f64();
        self.unprocessed += passed;
        self.frame_counter += passed;
    }

    /// Consume one tick if a whole one is available.
    fn consume_tick(&mut self) -> bool {
        if self.unprocessed > self.tick {
            self.unprocessed -= self.tick;
            true
        } else {
            false
        }
    }

    /// Publish the frame count once a second has passed.
    fn roll_fps(&mut self) -> Option<u32> {
        if self.frame_counter >= 1.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.frame_counter = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    fn frame_rendered(&mut self) {
        self.frames += 1;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn tick_seconds(&self) -> f64 {
        self.tick
    }
}

type PanicHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

pub struct Engine<W: Window, G: GameLogic<W>> {
    window: W,
    game: G,
    mouse: MouseInput,
    title: String,
    timer: FrameTimer,
    running: bool,
    previous_hook: Option<PanicHook>,
}

impl<W: Window, G: GameLogic<W>> Engine<W, G> {
    pub fn new(config: &EngineConfig, window: W, game: G) -> Self {
        Self {
            window,
            game,
            mouse: MouseInput::new(),
            title: config.title.clone(),
            timer: FrameTimer::new(config.tick_seconds()),
            running: false,
            previous_hook: None,
        }
    }

    /// Initialise, run until the window closes, then clean up.
    ///
    /// Cleanup also runs when initialisation or a frame fails; the first
    /// error is returned afterwards.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
        self.install_error_hook();

        let result = self.init().and_then(|_| self.run());
        if let Err(e) = &result {
            log::error!("Stopping the engine: {e:#}");
        }
        self.cleanup();
        result
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.window.init()?;
        self.game.init(&mut self.window)?;
        log::info!("Engine initialised, {} ticks per second", 1.0 / self.timer.tick_seconds());
        Ok(())
    }

    fn run(&mut self) -> anyhow::Result<()> {
        if self.running {
            return Ok(());
        }
        self.running = true;
        let mut last_time = Instant::now();
        while self.running {
            let start_time = Instant::now();
            let passed = start_time - last_time;
            last_time = start_time;
            self.step(passed)?;
        }
        Ok(())
    }

    /// One loop iteration, `elapsed` after the previous one.
    pub fn step(&mut self, elapsed: Duration) -> anyhow::Result<()> {
        self.timer.advance(elapsed);
        self.input();

        let mut render = false;
        while self.timer.consume_tick() {
            render = true;
            if self.window.window_should_close() {
                self.stop();
            }
            if let Some(fps) = self.timer.roll_fps() {
                self.window.set_title(&format!("{} FPS: {}", self.title, fps));
                log::debug!("{fps} FPS");
            }
        }

        if render {
            self.update();
            self.render()?;
            self.timer.frame_rendered();
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames rendered during the last full second.
    pub fn fps(&self) -> u32 {
        self.timer.fps()
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    fn input(&mut self) {
        self.mouse.input(&self.window.cursor());
        self.game.input(&self.window);
    }

    fn update(&mut self) {
        self.game.update(self.timer.tick_seconds() as f32, &self.mouse);
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.game.render(&mut self.window)?;
        self.window.update();
        Ok(())
    }

    pub fn cleanup(&mut self) {
        self.running = false;
        self.window.cleanup();
        self.game.cleanup();
        self.release_error_hook();
    }

    fn install_error_hook(&mut self) {
        if self.previous_hook.is_some() {
            return;
        }
        let previous: PanicHook = Arc::from(std::panic::take_hook());
        let chained = Arc::clone(&previous);
        std::panic::set_hook(Box::new(move |info| {
            log::error!("{info}");
            chained(info);
        }));
        self.previous_hook = Some(previous);
    }

    fn release_error_hook(&mut self) {
        if let Some(previous) = self.previous_hook.take() {
            let _ = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| previous(info)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_consumed_whole() {
        let mut timer = FrameTimer::new(0.1);
        timer.advance(Duration::from_millis(250));
        assert!(timer.consume_tick());
        assert!(timer.consume_tick());
        assert!(!timer.consume_tick());
    }

    #[test]
    fn fps_rolls_over_after_one_second() {
        let mut timer = FrameTimer::new(0.01);
        for _ in 0..3 {
            timer.frame_rendered();
        }
        timer.advance(Duration::from_millis(999));
        assert_eq!(timer.roll_fps(), None);
        timer.advance(Duration::from_millis(2));
        assert_eq!(timer.roll_fps(), Some(3));
        assert_eq!(timer.fps(), 3);
    }
}
