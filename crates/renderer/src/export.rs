use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use scene::{Demo, Frame, LoopDriver, TickBudget};
use tracing::info;

/// Runs `frames` ticks of `demo` off-screen and writes the final frame to
/// `path` as a PNG. Returns the number of ticks executed.
pub(crate) fn export_png(
    demo: &mut dyn Demo,
    size: (u32, u32),
    frames: u64,
    path: &Path,
) -> Result<u64> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        anyhow::bail!("cannot export a {width}x{height} frame");
    }

    let mut frame = Frame::new(width, height);
    demo.resize(&mut frame, width, height);

    let mut driver = LoopDriver::new();
    let ticks = driver.run(demo, &mut frame, &mut TickBudget(frames));

    save_frame(frame, path)?;
    info!(
        demo = demo.name(),
        ticks,
        path = %path.display(),
        "exported frame"
    );
    Ok(ticks)
}

fn save_frame(frame: Frame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let (width, height) = (frame.width(), frame.height());
    let image = image::RgbaImage::from_raw(width, height, frame.into_bytes())
        .ok_or_else(|| anyhow!("frame buffer does not match {width}x{height}"))?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::Rgba;

    struct Solid {
        steps: u64,
    }

    impl Demo for Solid {
        fn name(&self) -> &'static str {
            "solid"
        }

        fn step(&mut self) {
            self.steps += 1;
        }

        fn draw(&mut self, frame: &mut Frame) {
            frame.clear(Rgba::new(1.0, 0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn writes_png_with_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let mut demo = Solid { steps: 0 };

        let ticks = export_png(&mut demo, (16, 9), 4, &path).unwrap();
        assert_eq!(ticks, 4);
        assert_eq!(demo.steps, 4);

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (16, 9));
        assert_eq!(image.get_pixel(8, 4).0, [255, 0, 0, 255]);
    }

    #[test]
    fn zero_frames_saves_untouched_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        let mut demo = Solid { steps: 0 };

        assert_eq!(export_png(&mut demo, (4, 4), 0, &path).unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn orbit_export_has_opaque_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orbit.png");
        let mut demo = scene::OrbitDemo::new(&scene::OrbitDemoParams {
            width: 64,
            height: 48,
            seed: Some(1),
            ..scene::OrbitDemoParams::default()
        })
        .unwrap();

        export_png(&mut demo, (64, 48), 3, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn rejects_empty_surface() {
        let dir = tempfile::tempdir().unwrap();
        let mut demo = Solid { steps: 0 };
        assert!(export_png(&mut demo, (0, 4), 1, &dir.path().join("x.png")).is_err());
    }
}
