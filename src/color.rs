use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
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
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

/// Maps category labels (e.g. room types) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the given categories, in the given order.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a String>) -> Self {
        let categories: Vec<&String> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.clone(), *c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Continuous colour scales
// ---------------------------------------------------------------------------

/// Sequential / diverging schemes used by the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Reds,
    Viridis,
    RedYellowGreen,
}

impl Scheme {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Scheme::Reds => &[
                (0xff, 0xf5, 0xf0),
                (0xfd, 0xbe, 0xa5),
                (0xfc, 0x70, 0x50),
                (0xd4, 0x20, 0x20),
                (0x67, 0x00, 0x0d),
            ],
            Scheme::Viridis => &[
                (0x44, 0x01, 0x54),
                (0x3b, 0x52, 0x8b),
                (0x21, 0x91, 0x8c),
                (0x5e, 0xc9, 0x62),
                (0xfd, 0xe7, 0x25),
            ],
            Scheme::RedYellowGreen => &[
                (0xa5, 0x00, 0x26),
                (0xf4, 0x6d, 0x43),
                (0xfe, 0xe0, 0x8b),
                (0xd9, 0xef, 0x8b),
                (0x66, 0xbd, 0x63),
                (0x00, 0x68, 0x37),
            ],
        }
    }

    /// Colour at position `t` in `[0, 1]`, interpolated in linear RGB.
    pub fn at(self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = (scaled - i as f64) as f32;

        let to_linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = to_linear(stops[i]).mix(to_linear(stops[i + 1]), frac);
        let rgb: Srgb<u8> = Srgb::from_linear(mixed);
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }
}

/// Maps a numeric domain onto a [`Scheme`].
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    scheme: Scheme,
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(scheme: Scheme, min: f64, max: f64) -> Self {
        Self { scheme, min, max }
    }

    /// Scale over the observed range of `values`.
    pub fn fit(scheme: Scheme, values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = extent(values).unwrap_or((0.0, 1.0));
        Self::new(scheme, min, max)
    }

    /// Normalised position of `value` in the domain.
    pub fn position(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            0.5
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        }
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        self.scheme.at(self.position(value))
    }

    /// Like [`Self::color_for`] but snapped to one of `steps` evenly spaced
    /// colours, so points can be batched by colour.
    pub fn stepped_color(&self, value: f64, steps: u32) -> Color32 {
        let last = steps.max(2) as f64 - 1.0;
        self.scheme.at((self.position(value) * last).round() / last)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// `(min, max)` of the finite values, `None` if there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn color_map_falls_back_to_gray() {
        let rooms = vec!["Entire home/apt".to_string(), "Private room".to_string()];
        let cm = ColorMap::new(&rooms);
        assert_eq!(cm.legend_entries().len(), 2);
        assert_ne!(cm.color_for("Private room"), Color32::GRAY);
        assert_eq!(cm.color_for("Hotel room"), Color32::GRAY);
    }

    fn close(a: Color32, b: Color32) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 1;
        d(a.r(), b.r()) && d(a.g(), b.g()) && d(a.b(), b.b())
    }

    #[test]
    fn scheme_endpoints_match_stops() {
        assert!(close(Scheme::Reds.at(0.0), Color32::from_rgb(0xff, 0xf5, 0xf0)));
        assert!(close(Scheme::Viridis.at(1.0), Color32::from_rgb(0xfd, 0xe7, 0x25)));
        assert_eq!(Scheme::RedYellowGreen.at(-3.0), Scheme::RedYellowGreen.at(0.0));
        assert_eq!(Scheme::RedYellowGreen.at(f64::NAN), Scheme::RedYellowGreen.at(0.0));
    }

    #[test]
    fn scale_clamps_and_handles_flat_domain() {
        let scale = ColorScale::fit(Scheme::Viridis, [100.0, 300.0, f64::NAN]);
        assert_eq!(scale.domain(), (100.0, 300.0));
        assert_eq!(scale.position(200.0), 0.5);
        assert_eq!(scale.position(1000.0), 1.0);

        assert_eq!(scale.stepped_color(100.0, 8), Scheme::Viridis.at(0.0));
        assert_eq!(scale.stepped_color(299.0, 8), scale.stepped_color(300.0, 8));

        let flat = ColorScale::new(Scheme::Reds, 5.0, 5.0);
        assert_eq!(flat.position(5.0), 0.5);
        assert_eq!(extent(std::iter::empty()), None);
    }
}
