use std::collections::BTreeMap;

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
// Color mapping: state name → Color32
// ---------------------------------------------------------------------------

/// Maps each state in the dataset to a distinct, stable colour.
///
/// Built once per loaded dataset from the full state domain, so a
/// state keeps its colour no matter which filters are active.
#[derive(Debug, Clone, Default)]
pub struct StateColors {
    mapping: BTreeMap<String, Color32>,
    fallback: Color32,
}

impl StateColors {
    /// Build the mapping from the dataset's sorted state domain.
    pub fn new(states: &[String]) -> Self {
        let palette = generate_palette(states.len());
        let mapping: BTreeMap<String, Color32> = states
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();

        StateColors {
            mapping,
            fallback: Color32::GRAY,
        }
    }

    /// Look up the colour for a state.
    pub fn color(&self, state: &str) -> Color32 {
        self.mapping.get(state).copied().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_are_distinct() {
        let palette = generate_palette(8);
        assert_eq!(palette.len(), 8);
        for (i, a) in palette.iter().enumerate() {
            for b in palette.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn states_keep_their_color_and_unknowns_fall_back() {
        let states = vec!["CA".to_string(), "OH".to_string()];
        let colors = StateColors::new(&states);

        assert_eq!(colors.color("CA"), colors.color("CA"));
        assert_ne!(colors.color("CA"), colors.color("OH"));
        assert_eq!(colors.color("TX"), Color32::GRAY);
    }
}
