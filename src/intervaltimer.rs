use std::thread;
use std::time::{Duration, Instant};

/// Sleeps a fixed interval per cycle. Time spent working is not subtracted,
/// so the loop runs slightly slower than the nominal rate.
pub struct IntervalTimer {
    interval: Duration,
    thread_name: String,
    measure_fps: bool,
    last_fps_print: Instant,
    frames: u32,
}

impl IntervalTimer {
    pub fn new(interval: Duration, measure_fps: bool) -> IntervalTimer {
        let cur_thread = thread::current();
        let thread_name = cur_thread.name().unwrap_or("unnamed");

        IntervalTimer {
            interval,
            thread_name: thread_name.to_string(),
            measure_fps,
            last_fps_print: Instant::now(),
            frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sleep(&mut self) {
        if self.measure_fps {
            self.update_fps();
        }
        thread::sleep(self.interval);
    }

    fn update_fps(&mut self) {
        self.frames += 1;

        if self.last_fps_print.elapsed() > Duration::from_secs(1) {
            log::debug!("{} FPS: {}", self.thread_name, self.frames);
            self.frames = 0;
            self.last_fps_print = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleeps_at_least_the_interval() {
        let mut timer = IntervalTimer::new(Duration::from_millis(5), true);
        let start = Instant::now();
        timer.sleep();
        timer.sleep();
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert_eq!(timer.frames, 2);
    }
}
