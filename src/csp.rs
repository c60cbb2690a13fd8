//! Color representation metadata carried alongside images.
//!
//! The repacker never does color math beyond mapping integer sample ranges to
//! normalized floats; everything else is for the resampling engine.

use crate::format::{ColorFamily, ImgFormat};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ColorSystem {
    Rgb,
    Bt601,
    Bt709,
    Bt2020Ncl,
    Bt2020Cl,
    Smpte240m,
    YCgCo,
    Xyz,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorLevels {
    /// Full range (0..=max).
    Full,
    /// Limited "TV" range (16..=235 luma, 16..=240 chroma at 8 bit).
    Limited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorRepr {
    pub sys: ColorSystem,
    pub levels: ColorLevels,
}

impl ColorRepr {
    pub const RGB: Self = Self {
        sys: ColorSystem::Rgb,
        levels: ColorLevels::Full,
    };

    pub const BT709_LIMITED: Self = Self {
        sys: ColorSystem::Bt709,
        levels: ColorLevels::Limited,
    };

    /// Plain default for a format: full-range RGB for RGB formats,
    /// limited-range BT.709 otherwise.
    pub fn default_for(format: ImgFormat) -> Self {
        match format.desc().family {
            ColorFamily::Rgb => Self::RGB,
            ColorFamily::Yuv => Self::BT709_LIMITED,
        }
    }

    pub fn is_rgb(&self) -> bool {
        matches!(self.sys, ColorSystem::Rgb | ColorSystem::Xyz)
    }

    /// Multiplier and offset mapping a `bits`-bit integer sample of component
    /// `component` (1 = R/Y, 2/3 = chroma, 4 = alpha) to a normalized float:
    /// `f = i * m + o`.
    ///
    /// Luma and RGB land on 0..1; chroma lands on -0.5..0.5.
    pub fn uint_mul(&self, bits: u32, component: u8) -> (f64, f64) {
        let mut i_min = 0.0f64;
        let mut i_max = ((1u64 << bits) - 1) as f64;
        let mut f_min = 0.0f64;

        if self.sys != ColorSystem::Rgb && component != 4 {
            let limited = self.levels == ColorLevels::Limited && bits >= 8;
            if component == 2 || component == 3 {
                f_min = (1u64 << (bits - 1)) as f64 / -i_max;
                if limited {
                    i_min = (16u64 << (bits - 8)) as f64;
                    i_max = (240u64 << (bits - 8)) as f64;
                    f_min = -0.5;
                }
            } else if limited {
                i_min = (16u64 << (bits - 8)) as f64;
                i_max = (235u64 << (bits - 8)) as f64;
            }
        }

        let m = 1.0 / (i_max - i_min);
        let o = (1.0 + f_min) - i_max * m;
        (m, o)
    }
}

/// Horizontal position of subsampled chroma samples relative to luma.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChromaLocation {
    #[default]
    Left,
    Center,
}
