//! Weather: background fetching demo.
//!
//! The "fetch" is simulated (half a second of sleep and made-up data)
//! but runs through the real task scheduler: scheduled from a hook,
//! executed on a worker, delivered back through the tick drain. The app
//! refetches every five seconds even while backgrounded, timing itself
//! from its own last-fetch instant.

use std::f32::consts::PI;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::warn;
use matrixos::prelude::*;
use rand::Rng;

use super::Icon;
use crate::util::centered_text;

pub const ICON: Icon = [
    [0, 0, 0, 5, 5, 0, 0, 0],
    [0, 5, 5, 5, 5, 5, 5, 0],
    [0, 5, 5, 5, 5, 5, 5, 0],
    [0, 0, 5, 5, 5, 5, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 4, 0, 4, 0, 4, 0, 0],
    [0, 0, 4, 0, 4, 0, 4, 0],
    [0, 4, 0, 4, 0, 4, 0, 0],
];

const FETCH_INTERVAL: Duration = Duration::from_secs(5);
const SIMULATED_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
}

impl Condition {
    fn label(self) -> &'static str {
        match self {
            Condition::Sunny => "SUNNY",
            Condition::Cloudy => "CLOUDY",
            Condition::Rainy => "RAINY",
            Condition::Stormy => "STORMY",
        }
    }

    fn color(self) -> Rgb {
        match self {
            Condition::Sunny => Rgb::new(255, 255, 0),
            Condition::Cloudy => Rgb::new(150, 150, 150),
            Condition::Rainy => Rgb::new(100, 100, 255),
            Condition::Stormy => Rgb::new(128, 0, 128),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Report {
    condition: Condition,
    temperature: i32,
}

/// Pretend to call a weather API. Cardiff weighting: mostly rain.
fn fetch_report() -> Report {
    thread::sleep(SIMULATED_DELAY);
    let mut rng = rand::rng();
    let condition = match rng.random_range(0..10) {
        0..=3 => Condition::Rainy,
        4..=6 => Condition::Cloudy,
        7..=8 => Condition::Sunny,
        _ => Condition::Stormy,
    };
    Report {
        condition,
        temperature: rng.random_range(8..=18),
    }
}

pub struct WeatherApp {
    location: &'static str,
    report: Option<Report>,
    loading: bool,
    update_count: u32,
    active: bool,
    last_fetch: Instant,
    /// Filled by the completion callback, drained by the next hook.
    inbox: Arc<Mutex<Option<Result<Report, String>>>>,
    dirty: bool,
    shown_age_secs: u64,
}

impl WeatherApp {
    pub fn new() -> Self {
        Self {
            location: "CARDIFF, UK",
            report: None,
            loading: false,
            update_count: 0,
            active: false,
            last_fetch: Instant::now(),
            inbox: Arc::new(Mutex::new(None)),
            dirty: true,
            shown_age_secs: 0,
        }
    }

    fn start_fetch(&mut self, cx: &mut OsContext) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.last_fetch = cx.now();
        self.dirty = true;

        let inbox = Arc::clone(&self.inbox);
        cx.schedule_task(
            || Ok(fetch_report()),
            move |result| {
                let delivered = if result.success() {
                    result
                        .into_value::<Report>()
                        .ok_or_else(|| "unexpected result type".to_string())
                } else {
                    Err(result.error().map(|e| e.to_string()).unwrap_or_default())
                };
                if let Ok(mut slot) = inbox.lock() {
                    *slot = Some(delivered);
                }
            },
        );
    }

    /// Pick up a completed fetch, if any. Runs on the main thread right
    /// after the tick's drain step, so results land one tick at most
    /// after the callback fired.
    fn collect_fetch(&mut self, cx: &mut OsContext) {
        let delivered = self.inbox.lock().ok().and_then(|mut slot| slot.take());
        let Some(delivered) = delivered else {
            return;
        };

        self.loading = false;
        self.dirty = true;
        match delivered {
            Ok(report) => {
                let old = self.report.map(|r| r.condition);
                self.report = Some(report);
                self.update_count += 1;
                // Storms are worth interrupting for; Cardiff rain is not.
                if !self.active
                    && old != Some(report.condition)
                    && report.condition == Condition::Stormy
                {
                    cx.request_attention(AttentionPriority::Normal);
                }
            }
            Err(e) => warn!("weather fetch failed: {e}"),
        }
    }
}

impl App for WeatherApp {
    fn name(&self) -> &str {
        "weather"
    }

    fn on_activate(&mut self, cx: &mut OsContext) {
        self.active = true;
        self.dirty = true;
        self.start_fetch(cx);
    }

    fn on_deactivate(&mut self, _cx: &mut OsContext) {
        self.active = false;
    }

    fn on_event(&mut self, event: InputEvent, cx: &mut OsContext) -> bool {
        if event == InputEvent::Char('r') || event == InputEvent::Char('R') {
            self.start_fetch(cx);
            return true;
        }
        false
    }

    fn on_update(&mut self, _delta: Duration, cx: &mut OsContext) {
        self.collect_fetch(cx);
        let age = cx.now().duration_since(self.last_fetch);
        if !self.loading && age >= FETCH_INTERVAL {
            self.start_fetch(cx);
        }
        // The "Ns ago" footer only changes once a second.
        if age.as_secs() != self.shown_age_secs {
            self.shown_age_secs = age.as_secs();
            self.dirty = true;
        }
    }

    fn on_background_tick(&mut self, cx: &mut OsContext) {
        self.collect_fetch(cx);
        if !self.loading && cx.now().duration_since(self.last_fetch) >= FETCH_INTERVAL {
            self.start_fetch(cx);
        }
    }

    fn render(&mut self, frame: &mut PixelBuffer) {
        frame.text(2, 1, "WEATHER", Rgb::new(0, 255, 255));
        frame.text(2, 7, self.location, Rgb::new(100, 100, 100));

        let Some(report) = self.report else {
            let mid = frame.height() as i32 / 2;
            centered_text(frame, mid, "LOADING...", Rgb::new(150, 150, 150));
            return;
        };

        let cx = frame.width() as i32 / 2;
        let icon_y = 17;
        let color = report.condition.color();
        match report.condition {
            Condition::Sunny => {
                frame.circle(cx, icon_y, 3, color, true);
                for i in 0..8 {
                    let rad = i as f32 * PI / 4.0;
                    let (sin, cos) = rad.sin_cos();
                    frame.line(
                        cx + (5.0 * cos) as i32,
                        icon_y + (5.0 * sin) as i32,
                        cx + (7.0 * cos) as i32,
                        icon_y + (7.0 * sin) as i32,
                        color,
                    );
                }
            }
            Condition::Cloudy => {
                frame.circle(cx - 3, icon_y, 2, color, true);
                frame.circle(cx, icon_y - 1, 3, color, true);
                frame.circle(cx + 3, icon_y, 2, color, true);
                frame.rect(cx - 5, icon_y, 11, 3, color, true);
            }
            Condition::Rainy => {
                let cloud = Rgb::new(150, 150, 150);
                frame.circle(cx - 3, icon_y - 3, 2, cloud, true);
                frame.circle(cx, icon_y - 4, 3, cloud, true);
                frame.circle(cx + 3, icon_y - 3, 2, cloud, true);
                for i in 0..3 {
                    let x = cx - 4 + i * 4;
                    frame.line(x, icon_y, x, icon_y + 3, color);
                }
            }
            Condition::Stormy => {
                let cloud = Rgb::new(100, 100, 100);
                frame.circle(cx - 3, icon_y - 3, 2, cloud, true);
                frame.circle(cx, icon_y - 4, 3, cloud, true);
                frame.circle(cx + 3, icon_y - 3, 2, cloud, true);
                let bolt = Rgb::new(255, 255, 0);
                frame.line(cx, icon_y - 1, cx - 2, icon_y + 2, bolt);
                frame.line(cx - 2, icon_y + 2, cx + 1, icon_y + 2, bolt);
                frame.line(cx + 1, icon_y + 2, cx - 1, icon_y + 5, bolt);
            }
        }

        let row = frame.height() as i32 - 13;
        centered_text(frame, row, &format!("{}°C", report.temperature), Rgb::WHITE);
        centered_text(frame, row + 6, report.condition.label(), color);

        if self.loading {
            frame.set(frame.width() as i32 - 2, 1, Rgb::new(0, 255, 0));
        } else {
            let footer = format!("{}S AGO", self.shown_age_secs);
            frame.text(2, frame.height() as i32 - 6, &footer, Rgb::new(80, 80, 80));
        }
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_colors_are_distinct() {
        let all = [
            Condition::Sunny,
            Condition::Cloudy,
            Condition::Rainy,
            Condition::Stormy,
        ];
        for a in all {
            for b in all {
                if a != b {
                    assert_ne!(a.color(), b.color());
                }
            }
        }
    }

    #[test]
    fn test_fetch_report_in_range() {
        let report = fetch_report();
        assert!((8..=18).contains(&report.temperature));
    }
}
