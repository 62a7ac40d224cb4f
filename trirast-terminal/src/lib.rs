/// Terminal front end for the trirast software rasterizer
///
/// Single-frame mode renders once and writes a PNG. Interactive mode renders
/// into the alternate screen and re-renders after every key press.
use anyhow::Context;
use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use trirast_core::{Camera, DrawStats, Primitive, Rasterizer, RotationState};

pub mod cli;
pub mod config;
pub mod controls;
pub mod output;
pub mod presenter;
pub mod scene;

pub use config::{AppConfig, Axis};
pub use controls::Action;
pub use presenter::HalfBlockPresenter;
pub use scene::{Scene, SceneKind};

/// Render one frame from `config` and write it to `config.output`.
pub fn run_single_frame(config: &AppConfig) -> anyhow::Result<DrawStats> {
    let mut rasterizer =
        Rasterizer::new(config.rasterizer.clone()).context("creating rasterizer")?;
    let scene = Scene::new(config.scene, config.seed, config.rasterizer.fallback_color);
    let stats = scene
        .render(&mut rasterizer, &config.camera, &config.rotation(), config.primitive)
        .context("rendering frame")?;
    info!(
        scene = ?config.scene,
        angle = config.angle_degrees,
        axis = ?config.axis,
        written = stats.written,
        "frame rendered"
    );
    output::save_png(rasterizer.frame_buffer(), Path::new(&config.output))?;
    Ok(stats)
}

/// Main application struct for interactive rendering
pub struct TerminalApp {
    scene: Scene,
    rasterizer: Rasterizer,
    camera: Camera,
    rotation: RotationState,
    axis: Axis,
    primitive: Primitive,
    presenter: HalfBlockPresenter,
    running: bool,
    dirty: bool,
    last_stats: DrawStats,
}

impl TerminalApp {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (columns, rows) = terminal::size().context("querying terminal size")?;
        let rasterizer =
            Rasterizer::new(config.rasterizer.clone()).context("creating rasterizer")?;
        let scene = Scene::new(config.scene, config.seed, config.rasterizer.fallback_color);
        info!(
            scene = ?config.scene,
            triangles = scene.triangle_count(),
            width = rasterizer.width(),
            height = rasterizer.height(),
            "starting interactive mode"
        );

        Ok(Self {
            scene,
            rasterizer,
            camera: config.camera,
            rotation: config.rotation(),
            axis: config.axis,
            primitive: config.primitive,
            presenter: HalfBlockPresenter::new(columns as usize, status_free_rows(rows)),
            running: true,
            dirty: true,
            last_stats: DrawStats::default(),
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        while self.running {
            if self.dirty {
                self.render()?;
                self.dirty = false;
            }

            if event::poll(Duration::from_millis(10))? {
                self.handle_input()?;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> anyhow::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => {
                if let Some(action) = controls::action_for(code) {
                    self.apply(action);
                }
            }
            Event::Resize(columns, rows) => {
                self.presenter.resize(columns as usize, status_free_rows(rows));
                self.dirty = true;
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply a key action to the rotation state.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Rotate(delta) => self.rotation.rotate(delta),
            Action::SetAxis(axis) => {
                self.axis = axis;
                self.rotation.set_axis(axis.unit());
            }
            Action::Quit => self.running = false,
        }
        self.dirty = true;
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.last_stats =
            self.scene
                .render(&mut self.rasterizer, &self.camera, &self.rotation, self.primitive)?;
        debug!(
            angle = self.rotation.angle_degrees,
            written = self.last_stats.written,
            culled = self.last_stats.culled,
            "frame"
        );
        self.presenter.sample(self.rasterizer.frame_buffer());

        let mut stdout = stdout();
        queue!(stdout, terminal::Clear(ClearType::All))?;
        self.presenter.draw(&mut stdout, 1)?;

        // Status line
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "trirast | angle {:.0}° axis {:?} | {} px | a/d=Rotate x/y/z=Axis Esc=Quit",
                self.rotation.angle_degrees, self.axis, self.last_stats.written
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn status_free_rows(rows: u16) -> usize {
    rows.saturating_sub(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame_writes_output() {
        let mut config = AppConfig::default();
        config.rasterizer.width = 64;
        config.rasterizer.height = 64;
        config.camera = Camera::new(64, 64);
        config.scene = SceneKind::Pair;
        config.angle_degrees = 20.0;
        config.output = std::env::temp_dir()
            .join(format!("trirast-single-{}.png", std::process::id()))
            .display()
            .to_string();

        let stats = run_single_frame(&config).unwrap();
        assert_eq!(stats.triangles, 2);
        assert!(stats.written > 0);

        let image = image::open(&config.output).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (64, 64));
        std::fs::remove_file(&config.output).unwrap();
    }

    #[test]
    fn test_single_frame_rejects_zero_size() {
        let mut config = AppConfig::default();
        config.rasterizer.width = 0;
        assert!(run_single_frame(&config).is_err());
    }
}
