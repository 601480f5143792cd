//! Curves, points and test cases as read from a vector stream.

use core::fmt;

use driver::{CurveParams, Operand};

use crate::codec::{byte_width, LargeNumber};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
/// Point operations and point tests the accelerator can be asked for.
pub enum Operation {
    #[default]
    None,
    ScalarMultiply,
    PointAdd,
    PointDouble,
    PointNegate,
    OnCurveCheck,
    EqualityCheck,
    OppositeCheck,
}

impl Operation {
    /// All operations that can appear in a `== TEST` marker.
    pub const ALL: [Operation; 7] = [
        Operation::ScalarMultiply,
        Operation::PointAdd,
        Operation::PointDouble,
        Operation::PointNegate,
        Operation::OnCurveCheck,
        Operation::EqualityCheck,
        Operation::OppositeCheck,
    ];

    /// Name of the operation in `== TEST <name> #c.t` markers.
    pub const fn marker(self) -> &'static str {
        use Operation::*;
        match self {
            None => "none",
            ScalarMultiply => "[k]P",
            PointAdd => "P+Q",
            PointDouble => "[2]P",
            PointNegate => "-P",
            OnCurveCheck => "isPoncurve",
            EqualityCheck => "isP==Q",
            OppositeCheck => "isP==-Q",
        }
    }

    pub fn from_marker(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.marker() == name)
    }

    /// Point tests answer with a boolean, point operations with a point.
    pub const fn is_test(self) -> bool {
        matches!(
            self,
            Operation::OnCurveCheck | Operation::EqualityCheck | Operation::OppositeCheck
        )
    }

    /// Does the operation take a second input point Q?
    pub const fn takes_q(self) -> bool {
        matches!(
            self,
            Operation::PointAdd | Operation::EqualityCheck | Operation::OppositeCheck
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

#[derive(Clone, Debug, Default)]
/// Curve `y^2 = x^3 + ax + b` over GF(p), of order q, as defined by a
/// `== NEW CURVE` block.
pub struct Curve {
    pub id: u32,
    /// bit width of p, 0 while unset
    pub nn: u32,
    pub p: LargeNumber,
    pub a: LargeNumber,
    pub b: LargeNumber,
    pub q: LargeNumber,
    /// set in hardware
    pub installed: bool,
}

impl Curve {
    /// Starts a new curve definition, discarding the previous one.
    pub fn reset(&mut self, id: u32) {
        *self = Curve {
            id,
            ..Curve::default()
        };
    }

    /// Byte width of numbers on this curve, once `nn` is known.
    pub fn width(&self) -> Option<usize> {
        match self.nn {
            0 => None,
            nn => Some(byte_width(nn)),
        }
    }

    /// `nn` and all four parameters are set.
    pub fn is_valid(&self) -> bool {
        self.nn != 0
            && [&self.p, &self.a, &self.b, &self.q]
                .iter()
                .all(|number| number.is_valid())
    }

    /// Parameters in driver form, for a valid curve.
    pub fn params(&self) -> Option<CurveParams<'_>> {
        self.is_valid().then(|| CurveParams {
            nn: self.nn,
            p: self.p.as_bytes(),
            a: self.a.as_bytes(),
            b: self.b.as_bytes(),
            q: self.q.as_bytes(),
        })
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
/// Affine point, or the point at infinity when `is_null` is set.
pub struct Point {
    pub x: LargeNumber,
    pub y: LargeNumber,
    pub is_null: bool,
    pub valid: bool,
}

impl Point {
    pub fn identity() -> Self {
        Self {
            is_null: true,
            valid: true,
            ..Self::default()
        }
    }

    pub fn affine(x: LargeNumber, y: LargeNumber) -> Self {
        Self {
            x,
            y,
            is_null: false,
            valid: true,
        }
    }

    /// Coordinates to transfer, `None` for the point at infinity.
    pub fn operand(&self) -> Option<Operand<'_>> {
        (!self.is_null).then(|| Operand {
            x: self.x.as_bytes(),
            y: self.y.as_bytes(),
        })
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.valid, self.is_null) {
            (false, _) => f.write_str("<unset>"),
            (true, true) => f.write_str("0"),
            (true, false) => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Result of an operation: a point for point operations, a boolean answer
/// for point tests.
pub enum Outcome {
    Point(Point),
    Answer(bool),
}

impl Outcome {
    /// A point outcome is only complete once both coordinates (or the
    /// identity flag) are in.
    pub fn is_valid(&self) -> bool {
        match self {
            Outcome::Point(point) => point.valid,
            Outcome::Answer(_) => true,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Point(point) => write!(f, "{:?}", point),
            Outcome::Answer(answer) => write!(f, "{}", answer),
        }
    }
}

#[derive(Clone, Debug, Default)]
/// One `== TEST` block: inputs, expected result, and what the hardware said.
pub struct TestCase {
    pub id: u32,
    /// curve number given in the marker, `c` in `#c.t`
    pub curve_ref: u32,
    pub op: Operation,
    pub p: Point,
    pub q: Point,
    pub k: LargeNumber,
    /// number of blinding bits, 0 for none
    pub blinding: u32,
    pub expected: Option<Outcome>,
    pub hardware: Option<Outcome>,
    /// set by a `# EXCEPTION` comment
    pub exception: bool,
}

impl TestCase {
    /// Starts a new test block.
    ///
    /// The exception marker survives, it is set by a comment preceding the
    /// marker line.
    pub fn begin(&mut self, curve_ref: u32, id: u32, op: Operation) {
        let exception = self.exception;
        self.clear();
        self.curve_ref = curve_ref;
        self.id = id;
        self.op = op;
        self.exception = exception;
    }

    /// Returns every transient field to neutral; ids are kept for reporting.
    pub fn clear(&mut self) {
        *self = TestCase {
            id: self.id,
            curve_ref: self.curve_ref,
            ..TestCase::default()
        };
    }

    /// Updates the expected point being assembled, created on first use.
    pub fn update_expected_point(&mut self, update: impl FnOnce(&mut Point)) {
        let mut point = match self.expected.take() {
            Some(Outcome::Point(point)) => point,
            _ => Point::default(),
        };
        update(&mut point);
        self.expected = Some(Outcome::Point(point));
    }
}

#[derive(Clone, Debug, Default)]
/// The live curve and test case, mutated line by line.
pub struct Context {
    pub curve: Curve,
    pub case: TestCase,
}
