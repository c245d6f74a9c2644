//! Frame pipeline
//!
//! Drives the fixed-rate tick: pump input, read one camera frame, detect
//! blobs, map them to screen points, hand the result to the active game,
//! present. Calibration is not a nested blocking loop; it is a second
//! state machine the same scheduler delegates ticks to while it is active.
//!
//! Everything runs on one thread of control. The only state shared across
//! ticks that is written by someone other than its owner is the transform
//! cell, which is updated by whole-snapshot swap after a successful
//! calibration.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::api::{GameContext, InputEvent, Key, Manifest};
use crate::calib::{default_store_dir, CalibrationRun, CalibrationStatus, ProfileStore};
use crate::camera::CameraSource;
use crate::config::EngineConfig;
use crate::detect::BlobDetector;
use crate::games::GameRegistry;
use crate::input::{new_transform_cell, publish_transform, DebugPointInjector, PointMapper, TransformCell};
use crate::platform::{EventPump, Presenter};
use crate::render::{Canvas, Color};
use crate::{EngineError, Result};

const BACKGROUND: Color = Color::rgb(12, 14, 18);

/// Which state machine owns the current tick.
enum Mode {
    Play,
    Calibrating(CalibrationRun),
}

/// The engine loop, generic over the host's camera, event and display
/// implementations.
pub struct Pipeline<C, E, P>
where
    C: CameraSource,
    E: EventPump,
    P: Presenter,
{
    config: Arc<EngineConfig>,
    registry: GameRegistry,
    camera: C,
    events: E,
    presenter: P,
    store: ProfileStore,
    cell: TransformCell,
}

impl<C, E, P> Pipeline<C, E, P>
where
    C: CameraSource,
    E: EventPump,
    P: Presenter,
{
    pub fn new(config: EngineConfig, registry: GameRegistry, camera: C, events: E, presenter: P) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            camera,
            events,
            presenter,
            store: ProfileStore::new(default_store_dir()),
            cell: new_transform_cell(None),
        }
    }

    /// Use a different profile store (tests, portable installs).
    pub fn with_store(mut self, store: ProfileStore) -> Self {
        self.store = store;
        self
    }

    /// Handle to the published-transform cell.
    pub fn transform_cell(&self) -> TransformCell {
        self.cell.clone()
    }

    /// Run the loop with the given game until quit is requested.
    ///
    /// Fatal errors (camera open, unknown game, presentation failure)
    /// propagate; everything else degrades per tick.
    pub fn run(&mut self, game_id: &str, manifest: Manifest) -> Result<()> {
        let mut game = self
            .registry
            .create_game(game_id)
            .ok_or_else(|| EngineError::UnknownGame(game_id.to_string()))?;

        self.camera.open()?;
        log::info!("pipeline started for game '{}'", game_id);

        match self.store.load(&self.config.profile) {
            Ok(Some(t)) => publish_transform(&self.cell, t),
            Ok(None) => {}
            Err(e) => log::warn!("ignoring unreadable calibration profile: {}", e),
        }

        // The calibration color must be detectable even when gameplay does
        // not track it.
        let mut colors = self.config.colors.clone();
        let calib_color = self.config.calibration.color.clone();
        if !colors.contains(&calib_color) {
            colors.push(calib_color);
        }
        let detector = BlobDetector::new(&colors, self.config.min_blob_area);

        let mut mapper = PointMapper::new(&self.config, self.cell.clone());
        let mut injector = DebugPointInjector::new(&self.config);

        let ctx = GameContext {
            screen_size: self.config.screen_size,
            config: Arc::clone(&self.config),
        };
        game.on_load(&ctx, &manifest);

        let tick_interval = Duration::from_millis(1000 / self.config.tick_rate.max(1) as u64);
        let mut canvas = Canvas::new();
        let mut mode = Mode::Play;
        let mut last_tick = Instant::now();
        let mut running = true;

        while running {
            let tick_start = Instant::now();
            let dt_ms = tick_start.duration_since(last_tick).as_secs_f64() * 1000.0;
            last_tick = tick_start;

            for event in self.events.poll() {
                match event {
                    InputEvent::Quit => running = false,
                    InputEvent::KeyDown(Key::Escape) => {
                        if matches!(mode, Mode::Calibrating(_)) {
                            log::info!("calibration cancelled");
                            mode = Mode::Play;
                        } else {
                            running = false;
                        }
                    }
                    InputEvent::KeyDown(Key::Calibrate) => {
                        if matches!(mode, Mode::Play) {
                            mode = Mode::Calibrating(CalibrationRun::new(
                                self.config.calibration.clone(),
                                self.config.screen_size,
                            ));
                        }
                    }
                    other => {
                        injector.handle_event(&other);
                        if matches!(mode, Mode::Play) {
                            game.on_event(&other);
                        }
                    }
                }
            }
            if !running {
                break;
            }

            let frame = match self.camera.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    // Transient: skip the tick, keep prior world state.
                    pace(tick_start, tick_interval);
                    continue;
                }
                Err(e) => {
                    log::warn!("camera read failed, skipping tick: {}", e);
                    pace(tick_start, tick_interval);
                    continue;
                }
            };

            let detections = detector.detect(&frame);

            let next_mode = match &mut mode {
                Mode::Calibrating(run) => match run.step(&detections) {
                    CalibrationStatus::InProgress => {
                        run.draw(&mut canvas);
                        // Calibration geometry stays independent of
                        // presentation mirroring.
                        self.presenter.present(&canvas, false)?;
                        None
                    }
                    CalibrationStatus::Complete(transform) => {
                        if let Err(e) = self.store.save(&self.config.profile, &transform) {
                            log::error!("failed to persist calibration: {}", e);
                        }
                        publish_transform(&self.cell, transform);
                        Some(Mode::Play)
                    }
                    CalibrationStatus::Aborted(reason) => {
                        log::warn!("calibration aborted: {:?}, keeping previous transform", reason);
                        Some(Mode::Play)
                    }
                },
                Mode::Play => {
                    let mut frame_data = mapper.map_and_select(
                        &detections,
                        (frame.width(), frame.height()),
                        frame.timestamp,
                    );
                    injector.emit_into(&mut frame_data);

                    canvas.clear(BACKGROUND);
                    game.on_update(dt_ms, &frame_data);
                    game.on_draw(&mut canvas);
                    if self.config.show_preview {
                        draw_preview(&mut canvas, &frame_data, self.config.screen_size);
                    }
                    self.presenter.present(&canvas, self.config.mirror)?;
                    None
                }
            };
            if let Some(m) = next_mode {
                mode = m;
            }

            pace(tick_start, tick_interval);
        }

        game.on_unload();
        self.camera.close();
        log::info!("pipeline stopped");
        Ok(())
    }
}

/// Sleep out the remainder of the tick interval.
fn pace(tick_start: Instant, tick_interval: Duration) {
    let elapsed = tick_start.elapsed();
    if elapsed < tick_interval {
        thread::sleep(tick_interval - elapsed);
    }
}

/// Diagnostic overlay: selected points and the screen border.
fn draw_preview(canvas: &mut Canvas, frame_data: &crate::api::FrameData, screen: (u32, u32)) {
    for points in frame_data.points_by_color.values() {
        for p in points {
            canvas.circle((p.x, p.y), 5.0, Color::rgb(255, 255, 0), false);
        }
    }
    canvas.rect(
        (8.0, 8.0),
        (screen.0 as f64 - 16.0, screen.1 as f64 - 16.0),
        Color::rgb(220, 220, 220),
        false,
    );
}
