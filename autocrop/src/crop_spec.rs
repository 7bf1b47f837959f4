//! Textual crop requests as used on stitcher command lines and in batch
//! settings: automatic crop modes, absolute pixel crops, percentage crops and
//! aspect ratios.

use std::str::FromStr;

use crate::config::CropConfig;
use crate::error::Error;
use crate::rect::{Canvas, CropRect};

/// A crop request.
///
/// Grammar, with values always in `left,right,top,bottom` order:
/// - `auto`, `autohdr`, `autooutside`
/// - `l,r,t,b` absolute pixels
/// - `l,r,t,b%` percentages of the canvas size
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropSpec {
    /// Largest rectangle covered by any image.
    Auto,
    /// Largest rectangle covered by every exposure stack.
    AutoHdr,
    /// Bounding box of all covered pixels.
    AutoOutside,
    Absolute(CropRect),
    Relative {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },
}

impl CropSpec {
    pub fn is_automatic(&self) -> bool {
        matches!(self, CropSpec::Auto | CropSpec::AutoHdr | CropSpec::AutoOutside)
    }

    /// Search configuration for an automatic request.
    pub fn config(&self) -> Option<CropConfig> {
        match self {
            CropSpec::Auto => Some(CropConfig::inside()),
            CropSpec::AutoHdr => Some(CropConfig::intersection()),
            CropSpec::AutoOutside => Some(CropConfig::outside()),
            CropSpec::Absolute(_) | CropSpec::Relative { .. } => None,
        }
    }

    /// Rectangle of a manual request on the given canvas.
    ///
    /// `None` for automatic requests and for crops that lie entirely
    /// outside the canvas.
    pub fn resolve(&self, canvas: Canvas) -> Option<CropRect> {
        let rect = match *self {
            CropSpec::Absolute(rect) => rect,
            CropSpec::Relative {
                left,
                right,
                top,
                bottom,
            } => {
                let scale_x = |percent: f64| (canvas.width as f64 * percent / 100.0) as usize;
                let scale_y = |percent: f64| (canvas.height as f64 * percent / 100.0) as usize;
                CropRect::new(scale_x(left), scale_y(top), scale_x(right), scale_y(bottom))
            }
            CropSpec::Auto | CropSpec::AutoHdr | CropSpec::AutoOutside => return None,
        };
        let clipped = rect.clip_to(canvas);
        (!clipped.is_empty()).then_some(clipped)
    }
}

fn parse_four<T: FromStr>(values: &str) -> Option<[T; 4]> {
    let mut parts = values.split(',').map(|part| part.trim().parse::<T>());
    let parsed = [
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
    ];
    parts.next().is_none().then_some(parsed)
}

impl FromStr for CropSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || Error::InvalidCropSpec(s.to_string());

        let automatic = [
            ("auto", CropSpec::Auto),
            ("autohdr", CropSpec::AutoHdr),
            ("autooutside", CropSpec::AutoOutside),
        ];
        if let Some((_, spec)) = automatic
            .into_iter()
            .find(|(name, _)| trimmed.eq_ignore_ascii_case(name))
        {
            return Ok(spec);
        }

        if let Some(percentages) = trimmed.strip_suffix('%') {
            let [left, right, top, bottom] = parse_four::<f64>(percentages).ok_or_else(invalid)?;
            let valid = right > left
                && bottom > top
                && left >= 0.0
                && top >= 0.0
                && right <= 100.0
                && bottom <= 100.0;
            return if valid {
                Ok(CropSpec::Relative {
                    left,
                    right,
                    top,
                    bottom,
                })
            } else {
                Err(invalid())
            };
        }

        let [left, right, top, bottom] = parse_four::<i64>(trimmed).ok_or_else(invalid)?;
        if right > left && bottom > top && left >= 0 && top >= 0 {
            Ok(CropSpec::Absolute(CropRect::new(
                left as usize,
                top as usize,
                right as usize,
                bottom as usize,
            )))
        } else {
            Err(invalid())
        }
    }
}

/// Width divided by height, within `(MIN, MAX)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct AspectRatio(f64);

impl AspectRatio {
    pub const MIN: f64 = 1e-4;
    pub const MAX: f64 = 1e4;

    /// Panics if `ratio` is outside `(MIN, MAX)`; use `parse` for user input.
    pub fn new(ratio: f64) -> Self {
        assert!(
            ratio > Self::MIN && ratio < Self::MAX,
            "aspect ratio {ratio} out of range"
        );
        Self(ratio)
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    /// Accepts `width:height` (for example `16:9`) or a plain number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAspectRatio(s.to_string());
        let trimmed = s.trim();

        let ratio = match trimmed.split_once(':') {
            Some((width, height)) => {
                let width: f64 = width.trim().parse().map_err(|_| invalid())?;
                let height: f64 = height.trim().parse().map_err(|_| invalid())?;
                if height <= Self::MIN {
                    return Err(invalid());
                }
                width / height
            }
            None => trimmed.parse().map_err(|_| invalid())?,
        };

        if ratio > Self::MIN && ratio < Self::MAX {
            Ok(Self(ratio))
        } else {
            Err(invalid())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automatic_modes() {
        assert_eq!("auto".parse::<CropSpec>(), Ok(CropSpec::Auto));
        assert_eq!(" autohdr ".parse::<CropSpec>(), Ok(CropSpec::AutoHdr));
        assert_eq!("autooutside".parse::<CropSpec>(), Ok(CropSpec::AutoOutside));
        assert_eq!("AUTO".parse::<CropSpec>(), Ok(CropSpec::Auto));
        assert_eq!(" AutoHDR".parse::<CropSpec>(), Ok(CropSpec::AutoHdr));
        assert_eq!("AutoOutside\n".parse::<CropSpec>(), Ok(CropSpec::AutoOutside));

        assert_eq!(CropSpec::Auto.config(), Some(CropConfig::inside()));
        assert_eq!(CropSpec::AutoHdr.config(), Some(CropConfig::intersection()));
        assert_eq!(CropSpec::AutoOutside.config(), Some(CropConfig::outside()));
        assert!(CropSpec::Auto.is_automatic());
        assert_eq!(CropSpec::Auto.resolve(Canvas::new(10, 10)), None);
    }

    #[test]
    fn test_absolute_order_is_left_right_top_bottom() {
        let spec: CropSpec = "10,90,5,45".parse().unwrap();
        assert_eq!(spec, CropSpec::Absolute(CropRect::new(10, 5, 90, 45)));
        assert_eq!(spec.config(), None);
        assert_eq!(
            spec.resolve(Canvas::new(100, 50)),
            Some(CropRect::new(10, 5, 90, 45))
        );
    }

    #[test]
    fn test_absolute_is_clipped_to_canvas() {
        let spec: CropSpec = "10,500,5,45".parse().unwrap();
        assert_eq!(
            spec.resolve(Canvas::new(100, 50)),
            Some(CropRect::new(10, 5, 100, 45))
        );
        let outside: CropSpec = "200,300,0,10".parse().unwrap();
        assert_eq!(outside.resolve(Canvas::new(100, 50)), None);
    }

    #[test]
    fn test_relative() {
        let spec: CropSpec = "10,90,0,50%".parse().unwrap();
        assert_eq!(
            spec,
            CropSpec::Relative {
                left: 10.0,
                right: 90.0,
                top: 0.0,
                bottom: 50.0
            }
        );
        assert_eq!(
            spec.resolve(Canvas::new(200, 100)),
            Some(CropRect::new(20, 0, 180, 50))
        );
    }

    #[test]
    fn test_rejects_malformed_crops() {
        for input in [
            "",
            "automatic",
            "1,2,3",
            "1,2,3,4,5",
            "a,b,c,d",
            "10,5,0,10",     // right <= left
            "0,10,10,10",    // bottom <= top
            "-1,10,0,10",    // negative left
            "0,101,0,50%",   // beyond 100%
            "50,40,0,50%",   // right <= left
            "-5,40,0,50%",
        ] {
            assert_eq!(
                input.parse::<CropSpec>(),
                Err(Error::InvalidCropSpec(input.to_string())),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_aspect_ratio_forms() {
        assert_eq!("2:1".parse::<AspectRatio>().unwrap().value(), 2.0);
        assert_eq!(" 16 : 9 ".parse::<AspectRatio>().unwrap().value(), 16.0 / 9.0);
        assert_eq!("1.5".parse::<AspectRatio>().unwrap().value(), 1.5);
    }

    #[test]
    fn test_aspect_ratio_range() {
        for input in ["0", "1:0", "0:1", "10000", "1:0.00001", "x:2", "wide", "-1"] {
            assert_eq!(
                input.parse::<AspectRatio>(),
                Err(Error::InvalidAspectRatio(input.to_string())),
                "input {input:?}"
            );
        }
        assert!("9999".parse::<AspectRatio>().is_ok());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_new_rejects_out_of_range() {
        AspectRatio::new(0.0);
    }
}
