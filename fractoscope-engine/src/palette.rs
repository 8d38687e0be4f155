use crate::escape::Escape;

const LUT_SIZE: usize = 256;

/// Colour for points that never escape.
pub const INTERIOR: [u8; 4] = [0, 0, 0, 255];

/// A cyclic gradient backed by a lookup table.
///
/// Escape counts advance `LUT_SIZE / cycle_length` entries per iteration and
/// wrap, so bands repeat every `cycle_length` iterations.
#[derive(Debug, Clone)]
pub struct Palette {
    pub name: &'static str,
    cycle_length: u32,
    lut: Vec<[u8; 4]>,
}

impl Palette {
    pub const DEFAULT_CYCLE: u32 = 64;

    /// Build from gradient stops spread evenly around the ring.
    ///
    /// Panics if `stops` is empty.
    pub fn from_stops(name: &'static str, stops: &[[u8; 3]], cycle_length: u32) -> Self {
        assert!(!stops.is_empty(), "palette needs at least one stop");
        let lut = (0..LUT_SIZE)
            .map(|i| {
                let pos = i as f64 / LUT_SIZE as f64 * stops.len() as f64;
                let lo = pos.floor() as usize % stops.len();
                let hi = (lo + 1) % stops.len();
                let t = pos.fract();
                let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
                let (a, b) = (stops[lo], stops[hi]);
                [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), 255]
            })
            .collect();
        Self {
            name,
            cycle_length: cycle_length.max(1),
            lut,
        }
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    #[inline]
    pub fn color(&self, escape: Escape) -> [u8; 4] {
        match escape {
            Escape::Bounded => INTERIOR,
            Escape::Escaped(n) => {
                let phase = (n % self.cycle_length) as usize;
                self.lut[phase * LUT_SIZE / self.cycle_length as usize]
            }
        }
    }
}

impl Default for Palette {
    /// Deep blue through white to amber, then back.
    fn default() -> Self {
        Self::from_stops(
            "Classic",
            &[
                [0, 7, 100],
                [32, 107, 203],
                [237, 255, 255],
                [255, 170, 0],
                [0, 2, 0],
            ],
            Self::DEFAULT_CYCLE,
        )
    }
}
