use std::time::{Duration, Instant};
use winit::window::Window;

const TITLE_REFRESH: Duration = Duration::from_millis(500);

/// Frame cadence bookkeeping; refreshes the window title with fps twice a second.
pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    render_ms: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            render_ms: 0.0,
            base_title,
        }
    }

    pub fn set_render_ms(&mut self, render_ms: f32) {
        self.render_ms = render_ms;
    }

    pub fn update(&mut self, window: Option<&Window>, now: Instant) {
        let dt = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::from_millis(16),
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt.as_secs_f32();

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed >= TITLE_REFRESH {
            let fps = self.frame_count as f32 / elapsed.as_secs_f32();
            if let Some(window) = window {
                window.set_title(&self.title(fps));
            }
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }

    fn title(&self, fps: f32) -> String {
        format!(
            "{} - {:.1} fps ({:.2} ms cpu)",
            self.base_title, fps, self.render_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::FrameTiming;
    use std::time::{Duration, Instant};

    #[test]
    fn frame_dt_tracks_wall_clock() {
        let mut timing = FrameTiming::new("Orbviz".to_string());
        let start = Instant::now();
        timing.update(None, start);
        timing.update(None, start + Duration::from_millis(20));
        assert!((timing.frame_dt - 0.020).abs() < 1e-4);
    }

    #[test]
    fn title_includes_fps_and_render_time() {
        let mut timing = FrameTiming::new("Orbviz".to_string());
        timing.set_render_ms(1.234);
        assert_eq!(timing.title(59.96), "Orbviz - 60.0 fps (1.23 ms cpu)");
    }
}
