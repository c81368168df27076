use image::{Rgba, RgbaImage};

/// Light mask at cell resolution: one cell covers `pixel_size` world pixels squared.
#[derive(Debug, Clone)]
pub struct LightMask {
    image: RgbaImage,
    pixel_size: u32,
}

impl LightMask {
    /// A black mask covering a world of the given pixel size
    pub fn new(world_width: u32, world_height: u32, pixel_size: u32) -> Self {
        let pixel_size = pixel_size.max(1);
        let width = world_width.div_ceil(pixel_size).max(1);
        let height = world_height.div_ceil(pixel_size).max(1);
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
            pixel_size,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 255]);
        }
    }

    /// Alpha-over a colour onto one cell
    pub fn blend(&mut self, x: u32, y: u32, color: [f32; 3], alpha: f32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let pixel = self.image.get_pixel_mut(x, y);
        for (channel, &src) in pixel.0.iter_mut().take(3).zip(color.iter()) {
            let dst = *channel as f32 / 255.0;
            let out = src * alpha + dst * (1.0 - alpha);
            *channel = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }

    pub fn cell(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(*self.image.get_pixel(x, y))
    }

    /// The cell covering a world pixel
    pub fn at_world(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.cell(x / self.pixel_size, y / self.pixel_size)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// True when no light reaches any cell
    pub fn is_dark(&self) -> bool {
        self.image.pixels().all(|p| p.0[..3] == [0, 0, 0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_resolution_rounds_up() {
        let mask = LightMask::new(101, 40, 2);
        assert_eq!((mask.width(), mask.height()), (51, 20));
        assert!(mask.is_dark());
    }

    #[test]
    fn test_blend_alpha_over() {
        let mut mask = LightMask::new(4, 4, 1);
        mask.blend(1, 1, [1.0, 1.0, 1.0], 1.0);
        assert_eq!(mask.cell(1, 1), Some(Rgba([255, 255, 255, 255])));

        mask.blend(2, 2, [1.0, 0.0, 0.0], 0.5);
        assert_eq!(mask.cell(2, 2), Some(Rgba([128, 0, 0, 255])));

        // Out of range is ignored
        mask.blend(9, 9, [1.0, 1.0, 1.0], 1.0);
        assert_eq!(mask.cell(9, 9), None);
    }

    #[test]
    fn test_at_world_maps_to_cell() {
        let mut mask = LightMask::new(8, 8, 2);
        mask.blend(1, 0, [1.0, 1.0, 1.0], 1.0);
        assert_eq!(mask.at_world(3, 1), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(mask.at_world(1, 1), Some(Rgba([0, 0, 0, 255])));
    }
}
