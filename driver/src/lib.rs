//! # driver
//!
//! Rust traits to interact with elliptic-curve accelerators.
//!
//! Every call is blocking: it returns once the accelerator has answered.
//! Operands and results are big-endian byte buffers whose length is the
//! byte width of the installed curve.

use thiserror::Error;

pub mod null;
pub use null::Null;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("accelerator rejected `{0}`")]
    Rejected(&'static str),
    #[error("no curve installed")]
    NoCurve,
    #[error("operand of {len} bytes exceeds curve width of {max} bytes")]
    OperandTooLarge { len: usize, max: usize },
}

pub type Result<T> = core::result::Result<T, Error>;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
/// Point registers of the accelerator.
///
/// Inputs go to `R0` (first operand) and `R1` (second operand);
/// point-valued results are left in `R1`.
pub enum Slot {
    R0 = 0,
    R1 = 1,
}

impl Slot {
    /// register holding point-valued results
    pub const RESULT: Slot = Slot::R1;
}

#[derive(Copy, Clone, Debug)]
/// Curve parameters as transferred to the accelerator.
pub struct CurveParams<'a> {
    /// bit width of the field modulus
    pub nn: u32,
    pub p: &'a [u8],
    pub a: &'a [u8],
    pub b: &'a [u8],
    pub q: &'a [u8],
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
/// Affine coordinates of a non-identity input point.
pub struct Operand<'a> {
    pub x: &'a [u8],
    pub y: &'a [u8],
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// Affine coordinates returned by the accelerator.
///
/// Lengths are whatever the accelerator reported.
pub struct Affine {
    pub x: Vec<u8>,
    pub y: Vec<u8>,
}

/// Command interface of an elliptic-curve accelerator.
///
/// An operand of `None` is the point at infinity: the caller has flagged
/// its slot with [`Accelerator::point_zero`] and no coordinates are sent.
pub trait Accelerator {
    /// install curve parameters
    fn set_curve(&mut self, curve: &CurveParams<'_>) -> Result<()>;

    /// flag the point in `slot` as the point at infinity
    fn point_zero(&mut self, slot: Slot) -> Result<()>;

    /// flag the point in `slot` as an affine point
    fn point_unzero(&mut self, slot: Slot) -> Result<()>;

    /// is the point in `slot` the point at infinity?
    fn point_is_zero(&mut self, slot: Slot) -> Result<bool>;

    /// [k]P, with `blinding` bits of scalar blinding
    fn run_scalar_mul(&mut self, p: Option<Operand<'_>>, k: &[u8], blinding: u32)
        -> Result<Affine>;

    /// P + Q
    fn run_add(&mut self, p: Option<Operand<'_>>, q: Option<Operand<'_>>) -> Result<Affine>;

    /// [2]P
    fn run_double(&mut self, p: Option<Operand<'_>>) -> Result<Affine>;

    /// -P
    fn run_negate(&mut self, p: Option<Operand<'_>>) -> Result<Affine>;

    /// is P on the installed curve?
    fn run_on_curve_check(&mut self, p: Option<Operand<'_>>) -> Result<bool>;

    /// P == Q?
    fn run_equal_check(&mut self, p: Option<Operand<'_>>, q: Option<Operand<'_>>)
        -> Result<bool>;

    /// P == -Q?
    fn run_opposite_check(&mut self, p: Option<Operand<'_>>, q: Option<Operand<'_>>)
        -> Result<bool>;
}

impl<A: Accelerator + ?Sized> Accelerator for &mut A {
    fn set_curve(&mut self, curve: &CurveParams<'_>) -> Result<()> {
        (**self).set_curve(curve)
    }

    fn point_zero(&mut self, slot: Slot) -> Result<()> {
        (**self).point_zero(slot)
    }

    fn point_unzero(&mut self, slot: Slot) -> Result<()> {
        (**self).point_unzero(slot)
    }

    fn point_is_zero(&mut self, slot: Slot) -> Result<bool> {
        (**self).point_is_zero(slot)
    }

    fn run_scalar_mul(
        &mut self,
        p: Option<Operand<'_>>,
        k: &[u8],
        blinding: u32,
    ) -> Result<Affine> {
        (**self).run_scalar_mul(p, k, blinding)
    }

    fn run_add(&mut self, p: Option<Operand<'_>>, q: Option<Operand<'_>>) -> Result<Affine> {
        (**self).run_add(p, q)
    }

    fn run_double(&mut self, p: Option<Operand<'_>>) -> Result<Affine> {
        (**self).run_double(p)
    }

    fn run_negate(&mut self, p: Option<Operand<'_>>) -> Result<Affine> {
        (**self).run_negate(p)
    }

    fn run_on_curve_check(&mut self, p: Option<Operand<'_>>) -> Result<bool> {
        (**self).run_on_curve_check(p)
    }

    fn run_equal_check(
        &mut self,
        p: Option<Operand<'_>>,
        q: Option<Operand<'_>>,
    ) -> Result<bool> {
        (**self).run_equal_check(p, q)
    }

    fn run_opposite_check(
        &mut self,
        p: Option<Operand<'_>>,
        q: Option<Operand<'_>>,
    ) -> Result<bool> {
        (**self).run_opposite_check(p, q)
    }
}
