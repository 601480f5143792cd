use crate::{Accelerator, Affine, CurveParams, Error, Operand, Result, Slot};

#[derive(Copy, Clone, Debug)]
/// Mock accelerator, all commands succeed, all results are default values.
///
/// Point results are zero-filled at the installed curve width and never the
/// point at infinity; point tests answer `false`.
pub struct Null {
    width: Option<usize>,
}

impl Null {
    pub fn new() -> Self {
        Self { width: None }
    }

    fn width(&self) -> Result<usize> {
        self.width.ok_or(Error::NoCurve)
    }

    fn check(&self, operand: Option<Operand<'_>>) -> Result<usize> {
        let max = self.width()?;
        if let Some(Operand { x, y }) = operand {
            for len in [x.len(), y.len()] {
                if len > max {
                    return Err(Error::OperandTooLarge { len, max });
                }
            }
        }
        Ok(max)
    }

    fn zero(width: usize) -> Affine {
        Affine {
            x: vec![0; width],
            y: vec![0; width],
        }
    }
}

impl Default for Null {
    fn default() -> Self {
        Self::new()
    }
}

impl Accelerator for Null {
    fn set_curve(&mut self, curve: &CurveParams<'_>) -> Result<()> {
        self.width = Some((curve.nn as usize + 7) / 8);
        Ok(())
    }

    fn point_zero(&mut self, _: Slot) -> Result<()> {
        Ok(())
    }

    fn point_unzero(&mut self, _: Slot) -> Result<()> {
        Ok(())
    }

    fn point_is_zero(&mut self, _: Slot) -> Result<bool> {
        Ok(false)
    }

    fn run_scalar_mul(&mut self, p: Option<Operand<'_>>, k: &[u8], _: u32) -> Result<Affine> {
        let width = self.check(p)?;
        if k.len() > width {
            return Err(Error::OperandTooLarge {
                len: k.len(),
                max: width,
            });
        }
        Ok(Self::zero(width))
    }

    fn run_add(&mut self, p: Option<Operand<'_>>, q: Option<Operand<'_>>) -> Result<Affine> {
        self.check(q)?;
        self.check(p).map(Self::zero)
    }

    fn run_double(&mut self, p: Option<Operand<'_>>) -> Result<Affine> {
        self.check(p).map(Self::zero)
    }

    fn run_negate(&mut self, p: Option<Operand<'_>>) -> Result<Affine> {
        self.check(p).map(Self::zero)
    }

    fn run_on_curve_check(&mut self, p: Option<Operand<'_>>) -> Result<bool> {
        self.check(p).map(|_| false)
    }

    fn run_equal_check(&mut self, p: Option<Operand<'_>>, q: Option<Operand<'_>>) -> Result<bool> {
        self.check(q)?;
        self.check(p).map(|_| false)
    }

    fn run_opposite_check(
        &mut self,
        p: Option<Operand<'_>>,
        q: Option<Operand<'_>>,
    ) -> Result<bool> {
        self.check(q)?;
        self.check(p).map(|_| false)
    }
}
