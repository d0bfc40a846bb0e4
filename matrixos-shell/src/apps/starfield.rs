//! Starfield: continuously animating screensaver.
//!
//! Unlike the other apps it never reports clean: it redraws every frame
//! regardless, which is exactly what the default dirty tracking gives
//! you for free.

use std::time::Duration;

use matrixos::prelude::*;
use rand::Rng;

use super::Icon;

pub const ICON: Icon = [
    [0, 0, 0, 0, 0, 0, 1, 0],
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [0, 0, 1, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 1, 0, 0],
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 1, 0, 0, 1, 0],
];

const STAR_COUNT: usize = 40;

struct Star {
    x: f32,
    y: f32,
    /// Pixels per second. Faster stars render brighter.
    speed: f32,
    hue: f32,
}

pub struct Starfield {
    width: u16,
    height: u16,
    stars: Vec<Star>,
}

impl Starfield {
    pub fn new(width: u16, height: u16) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| Self::spawn(width, height, true))
            .collect();
        Self {
            width,
            height,
            stars,
        }
    }

    fn spawn(width: u16, height: u16, anywhere: bool) -> Star {
        let mut rng = rand::rng();
        let x = if anywhere {
            rng.random_range(0.0..=width as f32)
        } else {
            // Respawns enter from the right edge.
            width as f32
        };
        Star {
            x,
            y: rng.random_range(0.0..height as f32),
            speed: rng.random_range(4.0..24.0),
            hue: rng.random_range(0.0..360.0),
        }
    }
}

impl App for Starfield {
    fn name(&self) -> &str {
        "starfield"
    }

    fn on_update(&mut self, delta: Duration, _cx: &mut OsContext) {
        let dt = delta.as_secs_f32();
        let mut respawn = Vec::new();
        for (i, star) in self.stars.iter_mut().enumerate() {
            star.x -= star.speed * dt;
            if star.x < -1.0 {
                respawn.push(i);
            }
        }
        for i in respawn {
            self.stars[i] = Self::spawn(self.width, self.height, false);
        }
    }

    fn render(&mut self, frame: &mut PixelBuffer) {
        for star in &self.stars {
            // Brightness tracks speed so the fast layer reads as nearer.
            let value = (star.speed / 24.0).clamp(0.3, 1.0);
            let color = Rgb::from_hsv(star.hue, 0.6, value);
            frame.set(star.x as i32, star.y as i32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_start_within_bounds() {
        let field = Starfield::new(64, 32);
        assert_eq!(field.stars.len(), STAR_COUNT);
        for star in &field.stars {
            assert!(star.x >= 0.0 && star.x <= 64.0);
            assert!(star.y >= 0.0 && star.y <= 32.0);
        }
    }

    #[test]
    fn test_animation_changes_the_frame() {
        let mut shell = Shell::new(32, 16);
        let slot = shell.register(Starfield::new(32, 16));
        shell.switch_to(slot);

        shell.tick(None, Duration::from_millis(16));
        let first: Vec<_> = (0..32u16)
            .flat_map(|x| (0..16u16).map(move |y| (x, y)))
            .filter_map(|(x, y)| shell.frame().get(x, y))
            .collect();

        // Half a second moves every star at least two pixels.
        let report = shell.tick(None, Duration::from_millis(500));
        assert!(report.rendered);
        let second: Vec<_> = (0..32u16)
            .flat_map(|x| (0..16u16).map(move |y| (x, y)))
            .filter_map(|(x, y)| shell.frame().get(x, y))
            .collect();
        assert_ne!(first, second);
    }
}
