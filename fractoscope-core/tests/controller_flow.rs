use std::time::{Duration, Instant};

use fractoscope_core::{
    EngineError, ExportPipeline, FractalEngine, FrameOutcome, GenerationParams, GestureController,
    GestureEvent, GestureState, RampStep, RenderRequest, RenderScheduler, ScreenPos, StartupRamp,
    Viewport, ZoomSettings,
};

/// Minimal engine that keeps the last request it painted.
#[derive(Default)]
struct CountingEngine {
    canvas_size: Option<u32>,
    painted: Vec<RenderRequest>,
    saved: Option<Vec<u8>>,
}

impl FractalEngine for CountingEngine {
    fn initialise_graphics(&mut self, canvas_size: u32) -> Result<(), EngineError> {
        self.canvas_size = Some(canvas_size);
        Ok(())
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), EngineError> {
        if self.canvas_size.is_none() {
            return Err(EngineError::NotInitialised);
        }
        self.painted.push(*request);
        Ok(())
    }

    fn generate_and_save(&mut self, request: &RenderRequest) -> Result<(), EngineError> {
        self.saved = Some(request.output_size.to_le_bytes().to_vec());
        Ok(())
    }

    fn save_image(&mut self) -> Result<(), EngineError> {
        let last = self.painted.last().ok_or(EngineError::NotInitialised)?;
        self.saved = Some(last.output_size.to_le_bytes().to_vec());
        Ok(())
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        if name != "image.bmp" {
            return Err(EngineError::FileNotFound(name.to_string()));
        }
        self.saved
            .clone()
            .ok_or_else(|| EngineError::FileNotFound(name.to_string()))
    }
}

#[test]
fn drag_then_render_paints_final_position() {
    let mut engine = CountingEngine::default();
    engine.initialise_graphics(400).unwrap();

    let mut viewport = Viewport::default();
    let params = GenerationParams::default();
    let mut gestures = GestureController::new(400, ZoomSettings::default()).unwrap();
    let mut scheduler = RenderScheduler::new(400, Duration::ZERO).unwrap();
    let t0 = Instant::now();

    scheduler
        .run_frame(t0, Some(&mut engine), &viewport, &params)
        .unwrap();

    let events = [
        GestureEvent::PointerDown(ScreenPos::new(100.0, 100.0)),
        GestureEvent::PointerMove(ScreenPos::new(120.0, 100.0)),
        GestureEvent::PointerMove(ScreenPos::new(140.0, 110.0)),
        GestureEvent::PointerMove(ScreenPos::new(150.0, 120.0)),
        GestureEvent::PointerUp,
    ];
    for event in &events {
        let busy = scheduler.is_generating();
        if gestures.handle(event, &mut viewport, busy).viewport_changed() {
            scheduler.notify_change();
        }
    }
    assert_eq!(gestures.state(), GestureState::Idle);

    // All three moves land in one display frame: a single render of the last state.
    let outcome = scheduler
        .run_frame(t0, Some(&mut engine), &viewport, &params)
        .unwrap();
    assert_eq!(outcome, FrameOutcome::Rendered);
    assert_eq!(engine.painted.len(), 2);

    let last = engine.painted.last().unwrap().viewport;
    assert!((last.min_re - (-2.5)).abs() < 1e-9);
    assert!((last.max_im - 2.2).abs() < 1e-9);
}

#[test]
fn ramp_drives_renders_until_target() {
    let mut engine = CountingEngine::default();
    engine.initialise_graphics(200).unwrap();

    let viewport = Viewport::default();
    let mut params = GenerationParams::default();
    let mut scheduler = RenderScheduler::new(200, Duration::ZERO).unwrap();
    let mut ramp = StartupRamp::default();
    ramp.start(params.max_iterations);

    let t0 = Instant::now();
    let mut frame = 0u64;
    loop {
        let now = t0 + Duration::from_millis(frame * 16);
        let step = ramp.tick(now);
        if let Some(n) = step.max_iterations() {
            if n != params.max_iterations {
                params.max_iterations = n;
                scheduler.notify_change();
            }
        }
        scheduler
            .run_frame(now, Some(&mut engine), &viewport, &params)
            .unwrap();
        if matches!(step, RampStep::Finished(_)) {
            break;
        }
        frame += 1;
    }

    let iterations: Vec<u32> = engine
        .painted
        .iter()
        .map(|r| r.params.max_iterations)
        .collect();
    assert_eq!(iterations.first(), Some(&0));
    assert_eq!(iterations.last(), Some(&GenerationParams::DEFAULT_MAX_ITERATIONS));
    assert!(iterations.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn exports_read_back_engine_file() {
    let mut engine = CountingEngine::default();
    engine.initialise_graphics(300).unwrap();
    let pipeline = ExportPipeline::new();

    // Nothing rendered yet: the engine refuses and the error surfaces.
    assert!(pipeline.export_current_view(&mut engine).is_err());

    let mut scheduler = RenderScheduler::new(300, Duration::ZERO).unwrap();
    let viewport = Viewport::default();
    let params = GenerationParams::default();
    scheduler
        .run_frame(Instant::now(), Some(&mut engine), &viewport, &params)
        .unwrap();

    let current = pipeline.export_current_view(&mut engine).unwrap();
    assert_eq!(current.bytes, 300u32.to_le_bytes().to_vec());

    let high = pipeline
        .export_high_res(&mut engine, &viewport, &params, 300, 4.0)
        .unwrap();
    assert_eq!(high.bytes, 1200u32.to_le_bytes().to_vec());
    assert_eq!(high.file_name, "fractal.bmp");
}
