use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Mask colours: mask id → Color32
// ---------------------------------------------------------------------------

/// Hues cycled through by mask id.
const MASK_HUES: usize = 8;

/// Assigns each mask id a stable colour.  Ids are never reused, so a removed
/// mask's colour does not jump to another region.
#[derive(Debug, Clone)]
pub struct MaskColors {
    palette: Vec<Color32>,
}

impl Default for MaskColors {
    fn default() -> Self {
        Self {
            palette: generate_palette(MASK_HUES),
        }
    }
}

impl MaskColors {
    pub fn color_for(&self, id: u32) -> Color32 {
        self.palette[id as usize % self.palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let palette = generate_palette(MASK_HUES);
        assert_eq!(palette.len(), MASK_HUES);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_mask_colors_cycle() {
        let colors = MaskColors::default();
        assert_eq!(colors.color_for(1), colors.color_for(1 + MASK_HUES as u32));
        assert_ne!(colors.color_for(0), colors.color_for(1));
    }
}
