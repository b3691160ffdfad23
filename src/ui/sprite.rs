/// Player sprite: a small RGBA pixel grid sampled by the renderer.
///
/// The character image (PNG) is decoded once and downscaled to a fixed
/// grid. Without an image the procedural placeholder is used: a green
/// block with a simple face.

use image::imageops::FilterType;

use crate::domain::palette::Rgb;
use crate::error::Result;

/// Decoded images are resampled to this grid (same 4:5 aspect as the player).
const GRID_W: u32 = 20;
const GRID_H: u32 = 25;

#[derive(Clone, Debug)]
pub struct Sprite {
    width: usize,
    height: usize,
    /// Row-major; `None` is transparent.
    pixels: Vec<Option<Rgb>>,
}

impl Sprite {
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Sprite> {
        let img = image::load_from_memory(bytes)?;
        let small = img.resize_exact(GRID_W, GRID_H, FilterType::Triangle).to_rgba8();
        let pixels = small
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                if a < 128 { None } else { Some(Rgb(r, g, b)) }
            })
            .collect();
        Ok(Sprite { width: GRID_W as usize, height: GRID_H as usize, pixels })
    }

    /// 40x50 block figure: green body, two eyes, a mouth.
    pub fn placeholder() -> Sprite {
        const W: usize = 40;
        const H: usize = 50;
        let body = Rgb::hex(0x228B22);
        let white = Rgb(255, 255, 255);
        let black = Rgb(0, 0, 0);

        let mut pixels = vec![Some(body); W * H];
        let mut fill = |x0: usize, y0: usize, w: usize, h: usize, c: Rgb| {
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    pixels[y * W + x] = Some(c);
                }
            }
        };
        fill(8, 10, 6, 6, white);
        fill(26, 10, 6, 6, white);
        fill(10, 12, 2, 2, black);
        fill(28, 12, 2, 2, black);
        fill(18, 20, 4, 2, black);

        Sprite { width: W, height: H, pixels }
    }

    /// Nearest-neighbour lookup at normalized coordinates in [0, 1).
    /// `mirrored` flips horizontally (player facing left).
    pub fn sample(&self, u: f32, v: f32, mirrored: bool) -> Option<Rgb> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let mut x = ((u.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width - 1);
        let y = ((v.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height - 1);
        if mirrored {
            x = self.width - 1 - x;
        }
        self.pixels[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use std::io::Cursor;

    fn png_half_red() -> Vec<u8> {
        let mut img = image::RgbaImage::new(8, 8);
        for (x, _y, p) in img.enumerate_pixels_mut() {
            *p = if x < 4 { image::Rgba([255, 0, 0, 255]) } else { image::Rgba([0, 0, 255, 0]) };
        }
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn placeholder_has_face() {
        let s = Sprite::placeholder();
        assert_eq!(s.sample(0.0, 0.0, false), Some(Rgb::hex(0x228B22)));
        // Left eye white at (9, 11) of 40x50
        assert_eq!(s.sample(9.5 / 40.0, 10.5 / 50.0, false), Some(Rgb(255, 255, 255)));
        // Pupil
        assert_eq!(s.sample(10.5 / 40.0, 12.5 / 50.0, false), Some(Rgb(0, 0, 0)));
    }

    #[test]
    fn mirroring_flips_columns() {
        let s = Sprite::placeholder();
        // Pupil at x=10 maps to x=29 when mirrored; x=29 is the right pupil
        assert_eq!(s.sample(29.5 / 40.0, 12.5 / 50.0, true), Some(Rgb(0, 0, 0)));
        assert_eq!(s.sample(0.0, 0.0, true), s.sample(0.999, 0.0, false));
    }

    #[test]
    fn png_decodes_with_transparency() {
        let s = Sprite::from_png_bytes(&png_half_red()).unwrap();
        match s.sample(0.0, 0.5, false) {
            Some(Rgb(r, _, b)) => assert!(r > 200 && b < 50),
            None => panic!("left edge should be opaque"),
        }
        assert_eq!(s.sample(0.99, 0.5, false), None);
        // Mirrored, the transparent half is on the left
        assert_eq!(s.sample(0.0, 0.5, true), None);
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = Sprite::from_png_bytes(b"not a png").unwrap_err();
        assert!(matches!(err, GameError::Image(_)));
    }
}
