use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use super::input::key_from_physical;
use super::metrics::MetricsAccumulator;
use super::rendering::{DisplayMode, Presenter};
use super::scene::{View, ViewFlow};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub display_mode: DisplayMode,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Gallows".to_string(),
            display_mode: DisplayMode::default(),
            target_tps: 30,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize presenter: {0}")]
    CreatePresenter(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Runs the fixed-timestep loop until the view requests quit or the window
/// closes. Each redraw runs zero or more update ticks (bounded by the
/// catch-up cap), then exactly one render pass reflecting the most recently
/// completed tick.
pub fn run_app(config: LoopConfig, view: View) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window: &'static winit::window::Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.display_mode.width() as f64,
                config.display_mode.height() as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    ));
    let mut presenter =
        Presenter::new(window, config.display_mode).map_err(AppError::CreatePresenter)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        display_mode = config.display_mode.label(),
        "loop_config"
    );

    let mut view = view;
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut shutdown_done = false;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = presenter.resize_surface(new_size.width, new_size.height) {
                        warn!(%error, "presenter_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    // key presses only; releases are never forwarded
                    if event.state != ElementState::Pressed {
                        return;
                    }
                    let Some(key) = key_from_physical(event.physical_key) else {
                        return;
                    };
                    match view.handle_key(key) {
                        Ok(ViewFlow::Continue) => {}
                        Ok(ViewFlow::Quit) => {
                            info!(reason = "scene_request", "shutdown_requested");
                            window_target.exit();
                        }
                        Err(swap_error) => {
                            error!(%swap_error, "scene_swap_failed");
                            window_target.exit();
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_update_ticks(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        match view.tick() {
                            Ok(ViewFlow::Continue) => {}
                            Ok(ViewFlow::Quit) => {
                                info!(reason = "scene_request", "shutdown_requested");
                                window_target.exit();
                                return;
                            }
                            Err(swap_error) => {
                                error!(%swap_error, "scene_swap_failed");
                                window_target.exit();
                                return;
                            }
                        }
                        metrics_accumulator.record_tick();
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    // Single authoritative idle point: wait out the remainder
                    // of the tick period before presenting.
                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let idle_sleep = fixed_dt.saturating_sub(elapsed_since_last_present);
                    if idle_sleep > Duration::ZERO {
                        thread::sleep(idle_sleep);
                    }

                    if let Err(error) = presenter.present(&view) {
                        warn!(%error, "presenter_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            scene = view.active_scene_name().unwrap_or("none"),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                if !shutdown_done {
                    view.shutdown();
                    shutdown_done = true;
                    info!("shutdown");
                }
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_update_ticks(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_nanos(33_333_333);

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_update_ticks_runs_expected_ticks_without_drop() {
        let result = plan_update_ticks(TICK * 3, TICK, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn ten_tick_stall_runs_exactly_the_cap_and_clamps() {
        let result = plan_update_ticks(TICK * 10, TICK, 5);

        assert_eq!(result.ticks_to_run, 5);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, TICK * 5);
    }

    #[test]
    fn partial_accumulator_carries_over() {
        let result = plan_update_ticks(TICK + TICK / 2, TICK, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, TICK / 2);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn zero_accumulator_runs_no_ticks() {
        let result = plan_update_ticks(Duration::ZERO, TICK, 5);
        assert_eq!(result.ticks_to_run, 0);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
    }

    #[test]
    fn normalize_non_zero_duration_replaces_zero() {
        let fallback = Duration::from_secs(1);
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, fallback),
            fallback
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), fallback),
            Duration::from_millis(5)
        );
    }
}
