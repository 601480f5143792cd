//! Sends a complete test case to the accelerator.
//!
//! P goes to slot `R0`, Q to slot `R1`; each slot is flagged as identity or
//! affine before the single operation call. Point results are read back
//! together with the identity flag of [`Slot::RESULT`].

use driver::{Accelerator, Affine, Operand, Slot};
use tracing::debug;

use crate::{
    codec::LargeNumber,
    error::ProtocolError,
    vector::{Context, Curve, Operation, Outcome, Point, TestCase},
};

type Result<T> = core::result::Result<T, ProtocolError>;

/// Runs the test case in `context` on its recorded operation and stores
/// the hardware result in it.
pub fn run<A: Accelerator + ?Sized>(accelerator: &mut A, context: &mut Context) -> Result<()> {
    use Operation::*;
    match context.case.op {
        ScalarMultiply => scalar_multiply(accelerator, context),
        PointAdd => add(accelerator, context),
        PointDouble => double(accelerator, context),
        PointNegate => negate(accelerator, context),
        OnCurveCheck => on_curve_check(accelerator, context),
        EqualityCheck => equal_check(accelerator, context),
        OppositeCheck => opposite_check(accelerator, context),
        None => Err(ProtocolError::MissingInput("operation")),
    }
}

pub fn scalar_multiply<A: Accelerator + ?Sized>(
    accelerator: &mut A,
    context: &mut Context,
) -> Result<()> {
    let width = prepare(context, Operation::ScalarMultiply)?;
    let case = &context.case;
    if !case.k.is_valid() {
        return Err(ProtocolError::MissingInput("k"));
    }
    fits("k", &case.k, width)?;

    let p = load(accelerator, Slot::R0, &case.p)?;
    debug!(blinding = case.blinding, "run_scalar_mul");
    let result = call(
        "run_scalar_mul",
        accelerator.run_scalar_mul(p, case.k.as_bytes(), case.blinding),
    )?;
    let point = read_back(accelerator, result)?;
    context.case.hardware = Some(Outcome::Point(point));
    Ok(())
}

pub fn add<A: Accelerator + ?Sized>(accelerator: &mut A, context: &mut Context) -> Result<()> {
    prepare(context, Operation::PointAdd)?;
    let case = &context.case;
    let p = load(accelerator, Slot::R0, &case.p)?;
    let q = load(accelerator, Slot::R1, &case.q)?;
    debug!("run_add");
    let result = call("run_add", accelerator.run_add(p, q))?;
    let point = read_back(accelerator, result)?;
    context.case.hardware = Some(Outcome::Point(point));
    Ok(())
}

pub fn double<A: Accelerator + ?Sized>(accelerator: &mut A, context: &mut Context) -> Result<()> {
    prepare(context, Operation::PointDouble)?;
    let p = load(accelerator, Slot::R0, &context.case.p)?;
    debug!("run_double");
    let result = call("run_double", accelerator.run_double(p))?;
    let point = read_back(accelerator, result)?;
    context.case.hardware = Some(Outcome::Point(point));
    Ok(())
}

pub fn negate<A: Accelerator + ?Sized>(accelerator: &mut A, context: &mut Context) -> Result<()> {
    prepare(context, Operation::PointNegate)?;
    let p = load(accelerator, Slot::R0, &context.case.p)?;
    debug!("run_negate");
    let result = call("run_negate", accelerator.run_negate(p))?;
    let point = read_back(accelerator, result)?;
    context.case.hardware = Some(Outcome::Point(point));
    Ok(())
}

pub fn on_curve_check<A: Accelerator + ?Sized>(
    accelerator: &mut A,
    context: &mut Context,
) -> Result<()> {
    prepare(context, Operation::OnCurveCheck)?;
    let p = load(accelerator, Slot::R0, &context.case.p)?;
    debug!("run_on_curve_check");
    let answer = call("run_on_curve_check", accelerator.run_on_curve_check(p))?;
    context.case.hardware = Some(Outcome::Answer(answer));
    Ok(())
}

pub fn equal_check<A: Accelerator + ?Sized>(
    accelerator: &mut A,
    context: &mut Context,
) -> Result<()> {
    prepare(context, Operation::EqualityCheck)?;
    let case = &context.case;
    let p = load(accelerator, Slot::R0, &case.p)?;
    let q = load(accelerator, Slot::R1, &case.q)?;
    debug!("run_equal_check");
    let answer = call("run_equal_check", accelerator.run_equal_check(p, q))?;
    context.case.hardware = Some(Outcome::Answer(answer));
    Ok(())
}

pub fn opposite_check<A: Accelerator + ?Sized>(
    accelerator: &mut A,
    context: &mut Context,
) -> Result<()> {
    prepare(context, Operation::OppositeCheck)?;
    let case = &context.case;
    let p = load(accelerator, Slot::R0, &case.p)?;
    let q = load(accelerator, Slot::R1, &case.q)?;
    debug!("run_opposite_check");
    let answer = call("run_opposite_check", accelerator.run_opposite_check(p, q))?;
    context.case.hardware = Some(Outcome::Answer(answer));
    Ok(())
}

/// Checks everything common to all operations, returns the curve width.
fn prepare(context: &Context, op: Operation) -> Result<usize> {
    let Context { curve, case } = context;
    if case.op != op {
        return Err(ProtocolError::OperationMismatch {
            expected: op,
            found: case.op,
        });
    }
    let width = installed(curve)?;

    check_point("P", &case.p, width)?;
    if op.takes_q() {
        check_point("Q", &case.q, width)?;
    }
    check_expected(case)?;
    Ok(width)
}

fn installed(curve: &Curve) -> Result<usize> {
    match curve.width() {
        Some(width) if curve.installed => Ok(width),
        _ => Err(ProtocolError::CurveNotInstalled),
    }
}

fn check_point(name: &'static str, point: &Point, width: usize) -> Result<()> {
    if !point.valid {
        return Err(ProtocolError::MissingInput(name));
    }
    if !point.is_null {
        let (x, y) = if name == "Q" { ("Qx", "Qy") } else { ("Px", "Py") };
        fits(x, &point.x, width)?;
        fits(y, &point.y, width)?;
    }
    Ok(())
}

fn check_expected(case: &TestCase) -> Result<()> {
    match &case.expected {
        Some(outcome @ Outcome::Point(_)) if !case.op.is_test() && outcome.is_valid() => Ok(()),
        Some(Outcome::Answer(_)) if case.op.is_test() => Ok(()),
        _ => Err(ProtocolError::MissingExpected),
    }
}

fn fits(name: &'static str, number: &LargeNumber, max: usize) -> Result<()> {
    if number.len() > max {
        return Err(ProtocolError::Oversized {
            name,
            len: number.len(),
            max,
        });
    }
    Ok(())
}

/// Flags `slot` and returns the coordinates to transfer, if any.
fn load<'p, A: Accelerator + ?Sized>(
    accelerator: &mut A,
    slot: Slot,
    point: &'p Point,
) -> Result<Option<Operand<'p>>> {
    match point.operand() {
        None => {
            call("point_zero", accelerator.point_zero(slot))?;
            Ok(None)
        }
        Some(operand) => {
            call("point_unzero", accelerator.point_unzero(slot))?;
            Ok(Some(operand))
        }
    }
}

fn read_back<A: Accelerator + ?Sized>(accelerator: &mut A, result: Affine) -> Result<Point> {
    let is_null = call("point_is_zero", accelerator.point_is_zero(Slot::RESULT))?;
    Ok(Point {
        x: LargeNumber::from_bytes(result.x),
        y: LargeNumber::from_bytes(result.y),
        is_null,
        valid: true,
    })
}

fn call<T>(call: &'static str, result: driver::Result<T>) -> Result<T> {
    result.map_err(|source| ProtocolError::Driver { call, source })
}
