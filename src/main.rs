// --- File: main.rs ---
use std::sync::Arc;
use std::time::{Duration, Instant};

use lifegrid::constants::{
    FPS_UPDATE_INTERVAL_SECS, WINDOW_HEIGHT, WINDOW_HEIGHT_FRACTION, WINDOW_WIDTH,
    WINDOW_WIDTH_FRACTION,
};
use lifegrid::{Automaton, LifeConfig};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

mod renderer;

use renderer::Renderer;

// --- Viewer State ---

/// What the window drives: the automaton plus play/pause bookkeeping.
struct ViewerState {
    automaton: Automaton,
    is_paused: bool,
    last_generation_time: Duration,
}

impl ViewerState {
    fn new(automaton: Automaton) -> Self {
        Self {
            automaton,
            is_paused: false,
            last_generation_time: Duration::ZERO,
        }
    }

    fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
        log::info!(
            "simulation {} at generation {}",
            if self.is_paused { "paused" } else { "resumed" },
            self.automaton.generation()
        );
    }

    /// Advances one generation. A failed generation pauses the viewer; the
    /// grid on screen stays the last good one.
    fn step(&mut self) {
        let started = Instant::now();
        match self.automaton.advance_generation() {
            Ok(_) => self.last_generation_time = started.elapsed(),
            Err(e) => {
                log::error!("{e}; pausing (press Space to retry)");
                self.is_paused = true;
            }
        }
    }

    fn update(&mut self) {
        if !self.is_paused {
            self.step();
        }
    }

    fn restart(&mut self) {
        if let Err(e) = self.automaton.restart() {
            log::error!("restart failed: {e}");
        }
    }
}

/// 90% × 70% of the primary monitor, or a fixed fallback.
fn initial_window_size(elwt: &EventLoopWindowTarget<()>) -> PhysicalSize<u32> {
    match elwt.primary_monitor() {
        Some(monitor) => {
            let screen = monitor.size();
            PhysicalSize::new(
                ((screen.width as f32 * WINDOW_WIDTH_FRACTION) as u32).max(1),
                ((screen.height as f32 * WINDOW_HEIGHT_FRACTION) as u32).max(1),
            )
        }
        None => {
            log::warn!("no primary monitor reported; using {WINDOW_WIDTH}x{WINDOW_HEIGHT}");
            PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT)
        }
    }
}

// --- Main Function ---
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let event_loop = EventLoop::new()?;

    let window_size = initial_window_size(&event_loop);
    let grid_size = window_size.width.min(window_size.height) as usize;

    let config = LifeConfig::from_env(grid_size);
    let automaton = Automaton::with_config(&config)?;
    log::info!(
        "{0}x{0} grid, {1} workers, population {2}",
        automaton.size(),
        automaton.worker_count(),
        automaton.population()
    );

    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Life")
            .with_inner_size(window_size)
            .build(&event_loop)?,
    );
    let mut renderer = pollster::block_on(Renderer::new(window.clone(), grid_size))?;
    let mut viewer = ViewerState::new(automaton);

    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0;
    let mut current_fps = 0.0;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => window.request_redraw(),
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => renderer.resize(physical_size),
                WindowEvent::ScaleFactorChanged { .. } => renderer.resize(window.inner_size()),
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        match key_event.physical_key {
                            PhysicalKey::Code(KeyCode::Space) => viewer.toggle_pause(),
                            PhysicalKey::Code(KeyCode::KeyN | KeyCode::ArrowRight)
                                if viewer.is_paused =>
                            {
                                viewer.step()
                            }
                            PhysicalKey::Code(KeyCode::KeyR) => viewer.restart(),
                            PhysicalKey::Code(KeyCode::Escape) => elwt.exit(),
                            _ => {}
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    frames_since_last_fps_update += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;
                    }

                    // Draw the finished generation, then compute the next one.
                    match renderer.render(viewer.automaton.current_grid()) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            renderer.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("frame skipped: {e:?}"),
                    }
                    viewer.update();

                    let paused_text = if viewer.is_paused { " [PAUSED]" } else { "" };
                    window.set_title(&format!(
                        "Life {0}x{0} - Gen: {1} - Pop: {2} - Step: {3:.2} ms - FPS: {4:.1}{5}",
                        viewer.automaton.size(),
                        viewer.automaton.generation(),
                        viewer.automaton.population(),
                        viewer.last_generation_time.as_secs_f64() * 1000.0,
                        current_fps,
                        paused_text
                    ));
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}
// --- End of File: main.rs ---
