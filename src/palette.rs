//! Maps points on the linear `[0, 1]` scale to RGB colors.
//!
//! Each channel is described by a [`Curve`]: a band where the channel is fully
//! lit, an optional band where it ramps up from zero, and an optional band
//! where it ramps back down. Outside of those bands the channel is off.
use serde::Deserialize;

use crate::color::Color;

const INTENSITY_HIGH: u8 = 255;
const INTENSITY_LOW: u8 = 0;

/// A closed sub-interval of the palette scale.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Band {
    pub start: f64,
    pub end: f64,
}

impl Band {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, point: f64) -> bool {
        point >= self.start && point <= self.end
    }

    /// Position of `point` across the band scaled to `0..=255`, rounded down.
    fn ramp(&self, point: f64) -> u8 {
        ((point - self.start) * f64::from(INTENSITY_HIGH) / (self.end - self.start)).floor() as u8
    }
}

/// Intensity curve for a single channel.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Curve {
    pub high: Band,
    #[serde(default)]
    pub bright: Option<Band>,
    #[serde(default)]
    pub dim: Option<Band>,
}

impl Curve {
    pub const fn new(high: Band, bright: Option<Band>, dim: Option<Band>) -> Self {
        Self { high, bright, dim }
    }

    fn intensity(&self, point: f64, dim_ramp: DimRamp) -> u8 {
        if self.high.contains(point) {
            return INTENSITY_HIGH;
        }

        if let Some(bright) = self.bright.filter(|band| band.contains(point)) {
            return bright.ramp(point);
        }

        if let Some(dim) = self.dim.filter(|band| band.contains(point)) {
            return match dim_ramp {
                DimRamp::Descending => INTENSITY_HIGH - dim.ramp(point),
                DimRamp::Wrapping => INTENSITY_LOW.wrapping_sub(dim.ramp(point)),
            };
        }

        INTENSITY_LOW
    }

    fn validate(&self, channel: &'static str) -> Result<(), PaletteError> {
        check_band(channel, "high", self.high, false)?;
        if let Some(bright) = self.bright {
            check_band(channel, "bright", bright, true)?;
        }
        if let Some(dim) = self.dim {
            check_band(channel, "dim", dim, true)?;
        }
        Ok(())
    }
}

fn check_band(
    channel: &'static str,
    band: &'static str,
    range: Band,
    ramp: bool,
) -> Result<(), PaletteError> {
    let Band { start, end } = range;
    let in_bounds = (0.0..=1.0).contains(&start) && (0.0..=1.0).contains(&end);
    if !in_bounds || start > end {
        return Err(PaletteError::OutOfBounds {
            channel,
            band,
            start,
            end,
        });
    }
    if ramp && start == end {
        return Err(PaletteError::EmptyRamp {
            channel,
            band,
            at: start,
        });
    }
    Ok(())
}

/// How a curve's `dim` band is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimRamp {
    /// Linear fall from 255 at the start of the band to 0 at its end.
    #[default]
    Descending,
    /// The ramp value negated in 8-bit arithmetic, `(256 - ramp) mod 256`.
    /// Produces near-255 values across most of the band.
    Wrapping,
}

#[derive(thiserror::Error, Debug)]
pub enum PaletteError {
    #[error("{channel} {band} band [{start}, {end}] must lie within [0, 1] with start <= end")]
    OutOfBounds {
        channel: &'static str,
        band: &'static str,
        start: f64,
        end: f64,
    },

    #[error("{channel} {band} band has zero width at {at}")]
    EmptyRamp {
        channel: &'static str,
        band: &'static str,
        at: f64,
    },

    #[error("unable to read palette definition")]
    Yaml(#[from] serde_yaml_ng::Error),
}

#[derive(Deserialize)]
struct PaletteFile {
    red: Curve,
    green: Curve,
    blue: Curve,
    #[serde(default)]
    dim_ramp: DimRamp,
}

/// RGB palette configuration: one curve per channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    red: Curve,
    green: Curve,
    blue: Curve,
    dim_ramp: DimRamp,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            red: Curve::new(
                Band::new(0.0, 0.25),
                Some(Band::new(0.92, 1.0)),
                Some(Band::new(0.25, 0.42)),
            ),
            green: Curve::new(
                Band::new(0.25, 0.67),
                Some(Band::new(0.08, 0.25)),
                Some(Band::new(0.67, 0.83)),
            ),
            blue: Curve::new(Band::new(0.67, 1.0), Some(Band::new(0.5, 0.67)), None),
            dim_ramp: DimRamp::default(),
        }
    }
}

impl Palette {
    /// The built-in rainbow palette, walking red → green → blue → magenta.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_curves(red: Curve, green: Curve, blue: Curve) -> Result<Self, PaletteError> {
        red.validate("red")?;
        green.validate("green")?;
        blue.validate("blue")?;
        Ok(Self {
            red,
            green,
            blue,
            dim_ramp: DimRamp::default(),
        })
    }

    /// Loads curves from a YAML document with `red`, `green`, `blue` and an
    /// optional `dim_ramp` key.
    pub fn from_yaml_str(source: &str) -> Result<Self, PaletteError> {
        let file: PaletteFile = serde_yaml_ng::from_str(source)?;
        Ok(Self::from_curves(file.red, file.green, file.blue)?.with_dim_ramp(file.dim_ramp))
    }

    pub fn with_dim_ramp(mut self, dim_ramp: DimRamp) -> Self {
        self.dim_ramp = dim_ramp;
        self
    }

    pub fn dim_ramp(&self) -> DimRamp {
        self.dim_ramp
    }

    /// Returns the color at `point`. Points outside `[0, 1]` (and NaN) map to
    /// black.
    pub fn map_point(&self, point: f64) -> Color {
        if !(0.0..=1.0).contains(&point) {
            return Color::BLACK;
        }

        Color::new(
            self.red.intensity(point, self.dim_ramp),
            self.green.intensity(point, self.dim_ramp),
            self.blue.intensity(point, self.dim_ramp),
        )
    }
}
