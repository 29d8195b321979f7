//! Aspect ratio hints for image generation.

use std::fmt;
use std::str::FromStr;

/// Aspect ratios a user may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    #[default]
    Square,
    Portrait2x3,
    Landscape3x2,
    Portrait3x4,
    Landscape4x3,
    Portrait9x16,
    Landscape16x9,
    Ultrawide21x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 8] = [
        AspectRatio::Square,
        AspectRatio::Portrait2x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
        AspectRatio::Ultrawide21x9,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }

    /// The ratio actually sent to the image model. 2:3 and 21:9 are not
    /// accepted there and fall back to square.
    pub fn resolve(self) -> AspectRatio {
        match self {
            AspectRatio::Portrait2x3 | AspectRatio::Ultrawide21x9 => AspectRatio::Square,
            other => other,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAspectRatio(pub String);

impl fmt::Display for UnknownAspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = AspectRatio::ALL.iter().map(|r| r.as_str()).collect();
        write!(
            f,
            "unknown aspect ratio '{}' (expected one of {})",
            self.0,
            known.join(", ")
        )
    }
}

impl std::error::Error for UnknownAspectRatio {}

impl FromStr for AspectRatio {
    type Err = UnknownAspectRatio;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownAspectRatio(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_ratios_resolve_to_square() {
        assert_eq!(AspectRatio::Portrait2x3.resolve().as_str(), "1:1");
        assert_eq!(AspectRatio::Ultrawide21x9.resolve().as_str(), "1:1");
    }

    #[test]
    fn supported_ratios_pass_through() {
        for r in AspectRatio::ALL {
            if matches!(r, AspectRatio::Portrait2x3 | AspectRatio::Ultrawide21x9) {
                continue;
            }
            assert_eq!(r.resolve(), r, "{r} should pass through");
        }
    }

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape16x9);
        assert_eq!(" 1:1 ".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
        let err = "5:4".parse::<AspectRatio>().unwrap_err();
        assert!(err.to_string().contains("5:4"));
    }
}
