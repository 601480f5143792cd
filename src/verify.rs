//! Compares the hardware result of a test case with the expected one.

use core::fmt;

use crate::vector::{Outcome, Point};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
/// How a hardware result differs from the expected result.
pub enum Mismatch {
    /// one of the two points is the point at infinity, the other is not
    Identity,
    /// coordinate buffers of different lengths, bytes were not compared
    Length,
    Coordinates,
    Answer,
    /// a point where a boolean was expected, or vice versa
    Kind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mismatch::Identity => "identity flags differ",
            Mismatch::Length => "coordinate lengths differ",
            Mismatch::Coordinates => "coordinates differ",
            Mismatch::Answer => "answers differ",
            Mismatch::Kind => "result kinds differ",
        })
    }
}

/// `Ok(())` on a match.
pub fn verify(expected: &Outcome, hardware: &Outcome) -> Result<(), Mismatch> {
    match (expected, hardware) {
        (Outcome::Point(expected), Outcome::Point(hardware)) => points(expected, hardware),
        (Outcome::Answer(expected), Outcome::Answer(hardware)) => {
            if expected == hardware {
                Ok(())
            } else {
                Err(Mismatch::Answer)
            }
        }
        _ => Err(Mismatch::Kind),
    }
}

fn points(expected: &Point, hardware: &Point) -> Result<(), Mismatch> {
    match (expected.is_null, hardware.is_null) {
        (true, true) => Ok(()),
        (false, false) => {
            let lengths = [
                expected.x.len(),
                expected.y.len(),
                hardware.x.len(),
                hardware.y.len(),
            ];
            if lengths.iter().any(|&len| len != lengths[0]) {
                return Err(Mismatch::Length);
            }
            if expected.x.as_bytes() == hardware.x.as_bytes()
                && expected.y.as_bytes() == hardware.y.as_bytes()
            {
                Ok(())
            } else {
                Err(Mismatch::Coordinates)
            }
        }
        _ => Err(Mismatch::Identity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, LargeNumber};

    fn point(x: &str, y: &str) -> Outcome {
        let number = |hex: &str| decode(hex, hex.len() / 2).unwrap();
        Outcome::Point(Point::affine(number(x), number(y)))
    }

    fn identity() -> Outcome {
        Outcome::Point(Point::identity())
    }

    #[test]
    fn identities() {
        assert_eq!(verify(&identity(), &identity()), Ok(()));
        assert_eq!(verify(&identity(), &point("02", "03")), Err(Mismatch::Identity));
        assert_eq!(verify(&point("02", "03"), &identity()), Err(Mismatch::Identity));
    }

    #[test]
    fn identity_ignores_coordinates() {
        let mut hardware = Point::identity();
        hardware.x = LargeNumber::from_bytes(vec![0xff]);
        assert_eq!(verify(&identity(), &Outcome::Point(hardware)), Ok(()));
    }

    #[test]
    fn coordinates() {
        assert_eq!(verify(&point("0203", "0405"), &point("0203", "0405")), Ok(()));
        assert_eq!(
            verify(&point("0203", "0405"), &point("0203", "0406")),
            Err(Mismatch::Coordinates)
        );
    }

    #[test]
    fn lengths_are_compared_first() {
        // same value, one byte wider
        assert_eq!(
            verify(&point("02", "03"), &point("0002", "0003")),
            Err(Mismatch::Length)
        );
        assert_eq!(
            verify(&point("02", "03"), &point("02", "0003")),
            Err(Mismatch::Length)
        );
    }

    #[test]
    fn answers() {
        assert_eq!(verify(&Outcome::Answer(true), &Outcome::Answer(true)), Ok(()));
        assert_eq!(
            verify(&Outcome::Answer(true), &Outcome::Answer(false)),
            Err(Mismatch::Answer)
        );
        assert_eq!(verify(&Outcome::Answer(false), &identity()), Err(Mismatch::Kind));
    }
}
