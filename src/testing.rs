//! Generate test instances, and a scripted accelerator to run them on.

use std::collections::VecDeque;

use driver::{Accelerator, Affine, CurveParams, Operand, Slot};

use crate::{
    codec::{byte_width, encode, LargeNumber},
    vector::{Operation, Point},
};

/// Coordinates as received by the accelerator.
pub type Coordinates = (Vec<u8>, Vec<u8>);

#[derive(Clone, Debug, Eq, PartialEq)]
/// One command received by [`Scripted`].
pub enum Call {
    SetCurve { nn: u32 },
    PointZero(Slot),
    PointUnzero(Slot),
    PointIsZero(Slot),
    ScalarMul(Option<Coordinates>, Vec<u8>, u32),
    Add(Option<Coordinates>, Option<Coordinates>),
    Double(Option<Coordinates>),
    Negate(Option<Coordinates>),
    OnCurveCheck(Option<Coordinates>),
    EqualCheck(Option<Coordinates>, Option<Coordinates>),
    OppositeCheck(Option<Coordinates>, Option<Coordinates>),
}

impl Call {
    pub fn is_operation(&self) -> bool {
        !matches!(
            self,
            Call::SetCurve { .. } | Call::PointZero(_) | Call::PointUnzero(_) | Call::PointIsZero(_)
        )
    }
}

#[derive(Clone, Debug, Default)]
/// Accelerator that records every call and answers from queues.
///
/// With an empty queue, point results are zero-filled at the curve width,
/// identity flags and point tests are `false`.
pub struct Scripted {
    calls: Vec<Call>,
    points: VecDeque<Affine>,
    zeros: VecDeque<bool>,
    answers: VecDeque<bool>,
    fail: Option<&'static str>,
    width: usize,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the coordinates of the next point result.
    pub fn push_point(&mut self, point: Affine) {
        self.points.push_back(point);
    }

    /// Queues the next answer of `point_is_zero`.
    pub fn push_zero(&mut self, is_zero: bool) {
        self.zeros.push_back(is_zero);
    }

    /// Queues the next answer of a point test.
    pub fn push_answer(&mut self, answer: bool) {
        self.answers.push_back(answer);
    }

    /// Makes every call named `call` fail with [`driver::Error::Rejected`].
    pub fn fail_on(&mut self, call: &'static str) {
        self.fail = Some(call);
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Operation calls only, without curve and slot bookkeeping.
    pub fn operations(&self) -> Vec<&Call> {
        self.calls.iter().filter(|call| call.is_operation()).collect()
    }

    fn enter(&mut self, name: &'static str, call: Call) -> driver::Result<()> {
        self.calls.push(call);
        match self.fail {
            Some(fail) if fail == name => Err(driver::Error::Rejected(name)),
            _ => Ok(()),
        }
    }

    fn point(&mut self) -> Affine {
        let width = self.width;
        self.points.pop_front().unwrap_or_else(|| Affine {
            x: vec![0; width],
            y: vec![0; width],
        })
    }

    fn answer(&mut self) -> bool {
        self.answers.pop_front().unwrap_or(false)
    }
}

fn owned(operand: Option<Operand<'_>>) -> Option<Coordinates> {
    operand.map(|Operand { x, y }| (x.to_vec(), y.to_vec()))
}

impl Accelerator for Scripted {
    fn set_curve(&mut self, curve: &CurveParams<'_>) -> driver::Result<()> {
        self.enter("set_curve", Call::SetCurve { nn: curve.nn })?;
        self.width = byte_width(curve.nn);
        Ok(())
    }

    fn point_zero(&mut self, slot: Slot) -> driver::Result<()> {
        self.enter("point_zero", Call::PointZero(slot))
    }

    fn point_unzero(&mut self, slot: Slot) -> driver::Result<()> {
        self.enter("point_unzero", Call::PointUnzero(slot))
    }

    fn point_is_zero(&mut self, slot: Slot) -> driver::Result<bool> {
        self.enter("point_is_zero", Call::PointIsZero(slot))?;
        Ok(self.zeros.pop_front().unwrap_or(false))
    }

    fn run_scalar_mul(
        &mut self,
        p: Option<Operand<'_>>,
        k: &[u8],
        blinding: u32,
    ) -> driver::Result<Affine> {
        self.enter("run_scalar_mul", Call::ScalarMul(owned(p), k.to_vec(), blinding))?;
        Ok(self.point())
    }

    fn run_add(&mut self, p: Option<Operand<'_>>, q: Option<Operand<'_>>) -> driver::Result<Affine> {
        self.enter("run_add", Call::Add(owned(p), owned(q)))?;
        Ok(self.point())
    }

    fn run_double(&mut self, p: Option<Operand<'_>>) -> driver::Result<Affine> {
        self.enter("run_double", Call::Double(owned(p)))?;
        Ok(self.point())
    }

    fn run_negate(&mut self, p: Option<Operand<'_>>) -> driver::Result<Affine> {
        self.enter("run_negate", Call::Negate(owned(p)))?;
        Ok(self.point())
    }

    fn run_on_curve_check(&mut self, p: Option<Operand<'_>>) -> driver::Result<bool> {
        self.enter("run_on_curve_check", Call::OnCurveCheck(owned(p)))?;
        Ok(self.answer())
    }

    fn run_equal_check(
        &mut self,
        p: Option<Operand<'_>>,
        q: Option<Operand<'_>>,
    ) -> driver::Result<bool> {
        self.enter("run_equal_check", Call::EqualCheck(owned(p), owned(q)))?;
        Ok(self.answer())
    }

    fn run_opposite_check(
        &mut self,
        p: Option<Operand<'_>>,
        q: Option<Operand<'_>>,
    ) -> driver::Result<bool> {
        self.enter("run_opposite_check", Call::OppositeCheck(owned(p), owned(q)))?;
        Ok(self.answer())
    }
}

/// Random number of at most `nn` bits, at full curve width.
pub fn random_number(nn: u32) -> LargeNumber {
    use rand_core::{RngCore, SeedableRng};
    let mut rng = rand::prelude::StdRng::from_entropy();

    let mut bytes = vec![0u8; byte_width(nn)];
    rng.fill_bytes(&mut bytes);
    if nn % 8 != 0 {
        bytes[0] &= (1u8 << (nn % 8)) - 1;
    }
    LargeNumber::from_bytes(bytes)
}

pub fn random_point(nn: u32) -> Point {
    Point::affine(random_number(nn), random_number(nn))
}

#[derive(Clone, Debug, Default)]
/// Builds test-vector text.
pub struct Vectors {
    text: String,
}

impl Vectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// `== NEW CURVE` block, parameters in hex without prefix.
    pub fn curve(self, id: u32, nn: u32, [p, a, b, q]: [&str; 4]) -> Self {
        self.line(&format!("== NEW CURVE #{}", id))
            .line(&format!("nn={}", nn))
            .line(&format!("p=0x{}", p))
            .line(&format!("a=0x{}", a))
            .line(&format!("b=0x{}", b))
            .line(&format!("q=0x{}", q))
    }

    /// `== TEST` block; `lines` are the operand and result lines.
    pub fn test(self, op: Operation, curve: u32, id: u32, lines: &[&str]) -> Self {
        lines.iter().fold(
            self.line(&format!("== TEST {} #{}.{}", op, curve, id)),
            |vectors, line| vectors.line(line),
        )
    }

    pub fn line(mut self, line: &str) -> Self {
        self.text.push_str(line);
        self.text.push('\n');
        self
    }

    pub fn build(self) -> String {
        self.text
    }
}

/// Lines giving a point under `name`, e.g. `Px=0x..`, `Py=0x..` or `P=0`.
pub fn point_lines(name: &str, point: &Point) -> Vec<String> {
    if point.is_null {
        vec![format!("{}=0", name)]
    } else {
        vec![
            format!("{}x=0x{}", name, encode(&point.x)),
            format!("{}y=0x{}", name, encode(&point.y)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_numbers_fit() {
        for nn in [1, 7, 9, 255, 521] {
            let number = random_number(nn);
            assert_eq!(number.len(), byte_width(nn));
            if nn % 8 != 0 {
                assert!(number.as_bytes()[0] < 1 << (nn % 8));
            }
        }
    }

    #[test]
    fn vector_text() {
        let text = Vectors::new()
            .curve(1, 8, ["11", "01", "06", "13"])
            .line("# EXCEPTION")
            .test(Operation::PointNegate, 1, 2, &["P=0", "negP=0"])
            .build();
        assert_eq!(
            text,
            "== NEW CURVE #1\nnn=8\np=0x11\na=0x01\nb=0x06\nq=0x13\n\
             # EXCEPTION\n== TEST -P #1.2\nP=0\nnegP=0\n"
        );
        assert_eq!(point_lines("kP", &Point::identity()), ["kP=0"]);
    }

    #[test]
    fn scripted_replays_and_fails() {
        let mut scripted = Scripted::new();
        let params = CurveParams {
            nn: 16,
            p: &[0, 1],
            a: &[0, 1],
            b: &[0, 1],
            q: &[0, 1],
        };
        scripted.set_curve(&params).unwrap();
        scripted.push_point(Affine {
            x: vec![1],
            y: vec![2],
        });
        assert_eq!(scripted.run_double(None).unwrap().x, vec![1]);
        assert_eq!(scripted.run_double(None).unwrap().x, vec![0, 0]);
        assert_eq!(scripted.operations().len(), 2);

        scripted.fail_on("point_zero");
        assert_eq!(
            scripted.point_zero(Slot::R0),
            Err(driver::Error::Rejected("point_zero"))
        );
    }
}
