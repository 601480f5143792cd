//! Line-by-line state machine over the test-vector format.
//!
//! ```text
//! == NEW CURVE #<id>
//! nn=<bits>
//! p=0x<hex>  a=0x<hex>  b=0x<hex>  q=0x<hex>
//!
//! == TEST <op> #<curve>.<id>
//! Px=0x<hex> Py=0x<hex>  | P=0
//! ...operands and expected result, depending on <op>
//! ```
//!
//! Each state has one handler, returning the next state and possibly an
//! [`Effect`] for the caller to carry out. Comments and blank lines are
//! skipped in every state.

use tracing::debug;

use crate::{
    codec::{self, LargeNumber},
    error::{Error, FormatError, ProtocolError, Result},
    vector::{Context, Curve, Operation, Outcome, Point},
};

const NEW_CURVE: &str = "== NEW CURVE #";
const NEW_TEST: &str = "== TEST ";
const EXCEPTION: &str = "# EXCEPTION";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
/// What the next non-comment line must be.
pub enum State {
    #[default]
    Idle,
    ExpectWidth,
    ExpectP,
    ExpectA,
    ExpectB,
    ExpectQ,
    ExpectPX,
    ExpectPY,
    ExpectQX,
    ExpectQY,
    ExpectScalar,
    ExpectScalarResultOrBlinding,
    ExpectScalarResultY,
    ExpectSumX,
    ExpectSumY,
    ExpectDoubleX,
    ExpectDoubleY,
    ExpectNegX,
    ExpectNegY,
    ExpectBooleanAnswer,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
/// Work for the caller once a block is complete.
pub enum Effect {
    /// the curve in the context is complete, set it in hardware
    InstallCurve,
    /// the test case in the context is complete, run and check it
    RunTest,
}

/// Why a handler refused a line; the parser adds line and state.
#[derive(Debug)]
enum Reject {
    Format(FormatError),
    Protocol(ProtocolError),
}

impl From<FormatError> for Reject {
    fn from(error: FormatError) -> Self {
        Reject::Format(error)
    }
}

impl From<ProtocolError> for Reject {
    fn from(error: ProtocolError) -> Self {
        Reject::Protocol(error)
    }
}

type Step = core::result::Result<(State, Option<Effect>), Reject>;

#[derive(Clone, Debug, Default)]
pub struct Parser {
    state: State,
    line: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of lines fed so far, i.e. the current line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consumes one input line (with or without its line ending).
    ///
    /// On error the state is left unchanged.
    pub fn feed(&mut self, line: &str, context: &mut Context) -> Result<Option<Effect>> {
        self.line += 1;
        let text = line.trim_end_matches(|c| c == '\n' || c == '\r');

        if text.starts_with('#') {
            if text.starts_with(EXCEPTION) {
                context.case.exception = true;
            }
            return Ok(None);
        }
        if text.trim().is_empty() {
            return Ok(None);
        }

        debug!(line = self.line, state = ?self.state, "{}", text);
        let (state, effect) = step(self.state, text.trim_end(), context).map_err(|reject| {
            match reject {
                Reject::Format(reason) => Error::Format {
                    line: self.line,
                    state: self.state,
                    reason,
                },
                Reject::Protocol(source) => Error::Protocol {
                    line: self.line,
                    source,
                },
            }
        })?;
        self.state = state;
        // a `# EXCEPTION` marker only reaches the next test block; a test
        // that completes keeps it until it has been reported
        if state == State::Idle && effect != Some(Effect::RunTest) {
            context.case.exception = false;
        }
        Ok(effect)
    }
}

/// Keys of an expected result point.
struct ResultKeys {
    x: &'static str,
    y: &'static str,
    null: &'static str,
    expected: &'static str,
}

const SCALAR_RESULT: ResultKeys = ResultKeys {
    x: "kPx=0x",
    y: "kPy=0x",
    null: "kP=0",
    expected: "\"nbbld=\", \"kPx=0x\" or \"kP=0\"",
};

const SUM: ResultKeys = ResultKeys {
    x: "PplusQx=0x",
    y: "PplusQy=0x",
    null: "PplusQ=0",
    expected: "\"PplusQx=0x\" or \"PplusQ=0\"",
};

const DOUBLE: ResultKeys = ResultKeys {
    x: "twoPx=0x",
    y: "twoPy=0x",
    null: "twoP=0",
    expected: "\"twoPx=0x\" or \"twoP=0\"",
};

const NEGATION: ResultKeys = ResultKeys {
    x: "negPx=0x",
    y: "negPy=0x",
    null: "negP=0",
    expected: "\"negPx=0x\" or \"negP=0\"",
};

fn step(state: State, text: &str, context: &mut Context) -> Step {
    use State::*;
    match state {
        Idle => idle(text, context),
        ExpectWidth => width(text, &mut context.curve),
        ExpectP => parameter(text, &mut context.curve, "p=0x", |curve| &mut curve.p, ExpectA),
        ExpectA => parameter(text, &mut context.curve, "a=0x", |curve| &mut curve.a, ExpectB),
        ExpectB => parameter(text, &mut context.curve, "b=0x", |curve| &mut curve.b, ExpectQ),
        ExpectQ => parameter(text, &mut context.curve, "q=0x", |curve| &mut curve.q, Idle)
            .map(|(state, _)| (state, Some(Effect::InstallCurve))),
        ExpectPX => {
            if let Some(x) = hex(text, "Px=0x", &context.curve)? {
                context.case.p.x = x;
                context.case.p.is_null = false;
                Ok((ExpectPY, None))
            } else if text == "P=0" {
                context.case.p = Point::identity();
                Ok((after_p(context.case.op)?, None))
            } else {
                Err(unexpected(text, "\"Px=0x\" or \"P=0\""))
            }
        }
        ExpectPY => {
            let y = hex(text, "Py=0x", &context.curve)?.ok_or_else(|| unexpected(text, "\"Py=0x\""))?;
            context.case.p.y = y;
            context.case.p.valid = true;
            Ok((after_p(context.case.op)?, None))
        }
        ExpectQX => {
            if let Some(x) = hex(text, "Qx=0x", &context.curve)? {
                context.case.q.x = x;
                context.case.q.is_null = false;
                Ok((ExpectQY, None))
            } else if text == "Q=0" {
                context.case.q = Point::identity();
                Ok((after_q(context.case.op)?, None))
            } else {
                Err(unexpected(text, "\"Qx=0x\" or \"Q=0\""))
            }
        }
        ExpectQY => {
            let y = hex(text, "Qy=0x", &context.curve)?.ok_or_else(|| unexpected(text, "\"Qy=0x\""))?;
            context.case.q.y = y;
            context.case.q.valid = true;
            Ok((after_q(context.case.op)?, None))
        }
        ExpectScalar => {
            context.case.k =
                hex(text, "k=0x", &context.curve)?.ok_or_else(|| unexpected(text, "\"k=0x\""))?;
            Ok((ExpectScalarResultOrBlinding, None))
        }
        ExpectScalarResultOrBlinding => match text.strip_prefix("nbbld=") {
            // may repeat, the last one counts
            Some(bits) => {
                context.case.blinding = decimal(bits)?;
                Ok((ExpectScalarResultOrBlinding, None))
            }
            None => result_x(text, context, &SCALAR_RESULT, ExpectScalarResultY),
        },
        ExpectScalarResultY => result_y(text, context, &SCALAR_RESULT),
        ExpectSumX => result_x(text, context, &SUM, ExpectSumY),
        ExpectSumY => result_y(text, context, &SUM),
        ExpectDoubleX => result_x(text, context, &DOUBLE, ExpectDoubleY),
        ExpectDoubleY => result_y(text, context, &DOUBLE),
        ExpectNegX => result_x(text, context, &NEGATION, ExpectNegY),
        ExpectNegY => result_y(text, context, &NEGATION),
        ExpectBooleanAnswer => answer(text, context),
    }
}

fn idle(text: &str, context: &mut Context) -> Step {
    if let Some(id) = text.strip_prefix(NEW_CURVE) {
        let id = decimal(id)?;
        context.curve.reset(id);
        debug!(curve = id, "new curve");
        return Ok((State::ExpectWidth, None));
    }

    if let Some(rest) = text.strip_prefix(NEW_TEST) {
        let (name, ids) = rest
            .split_once(" #")
            .ok_or_else(|| unexpected(text, "\"== TEST <op> #<curve>.<id>\""))?;
        let op = Operation::from_marker(name).ok_or_else(|| unexpected(text, "a known operation"))?;
        let (curve_ref, id) = ids
            .split_once('.')
            .ok_or_else(|| unexpected(text, "\"#<curve>.<id>\""))?;
        let (curve_ref, id) = (decimal(curve_ref)?, decimal(id)?);
        if curve_ref != context.curve.id {
            debug!(curve = context.curve.id, curve_ref, test = id, "test refers to another curve number");
        }
        context.case.begin(curve_ref, id, op);
        return Ok((State::ExpectPX, None));
    }

    Err(unexpected(text, "\"== NEW CURVE #\" or \"== TEST\""))
}

fn width(text: &str, curve: &mut Curve) -> Step {
    let nn = text
        .strip_prefix("nn=")
        .ok_or_else(|| unexpected(text, "\"nn=\""))?;
    match decimal(nn)? {
        0 => Err(FormatError::ZeroWidth.into()),
        nn => {
            curve.nn = nn;
            Ok((State::ExpectP, None))
        }
    }
}

fn parameter(
    text: &str,
    curve: &mut Curve,
    key: &'static str,
    field: fn(&mut Curve) -> &mut LargeNumber,
    next: State,
) -> Step {
    let value = hex(text, key, curve)?.ok_or_else(|| unexpected(text, key))?;
    *field(curve) = value;
    Ok((next, None))
}

/// Where to go once P is read.
fn after_p(op: Operation) -> core::result::Result<State, Reject> {
    use Operation::*;
    Ok(match op {
        ScalarMultiply => State::ExpectScalar,
        PointAdd | EqualityCheck | OppositeCheck => State::ExpectQX,
        PointDouble => State::ExpectDoubleX,
        PointNegate => State::ExpectNegX,
        OnCurveCheck => State::ExpectBooleanAnswer,
        None => return Err(ProtocolError::MissingInput("operation").into()),
    })
}

/// Where to go once Q is read.
fn after_q(op: Operation) -> core::result::Result<State, Reject> {
    use Operation::*;
    match op {
        PointAdd => Ok(State::ExpectSumX),
        EqualityCheck | OppositeCheck => Ok(State::ExpectBooleanAnswer),
        _ => Err(ProtocolError::MissingInput("operation").into()),
    }
}

/// X coordinate of the expected point, or its null shorthand which
/// completes the test.
fn result_x(text: &str, context: &mut Context, keys: &ResultKeys, next: State) -> Step {
    if let Some(x) = hex(text, keys.x, &context.curve)? {
        context.case.update_expected_point(|point| {
            point.x = x;
            point.is_null = false;
        });
        Ok((next, None))
    } else if text == keys.null {
        context.case.expected = Some(Outcome::Point(Point::identity()));
        Ok((State::Idle, Some(Effect::RunTest)))
    } else {
        Err(unexpected(text, keys.expected))
    }
}

/// Y coordinate of the expected point, completes the test.
fn result_y(text: &str, context: &mut Context, keys: &ResultKeys) -> Step {
    let y = hex(text, keys.y, &context.curve)?.ok_or_else(|| unexpected(text, keys.y))?;
    context.case.update_expected_point(|point| {
        point.y = y;
        point.valid = true;
    });
    Ok((State::Idle, Some(Effect::RunTest)))
}

fn answer(text: &str, context: &mut Context) -> Step {
    let answer = if text.eq_ignore_ascii_case("true") {
        true
    } else if text.eq_ignore_ascii_case("false") {
        false
    } else {
        return Err(unexpected(text, "\"true\" or \"false\""));
    };
    let case = &mut context.case;
    if !case.op.is_test() {
        return Err(ProtocolError::MissingInput("point test").into());
    }
    case.expected = Some(Outcome::Answer(answer));
    Ok((State::Idle, Some(Effect::RunTest)))
}

/// Hex payload after `key`, decoded at the curve's width; `None` if the
/// line does not start with `key`.
fn hex(
    text: &str,
    key: &'static str,
    curve: &Curve,
) -> core::result::Result<Option<LargeNumber>, Reject> {
    let digits = match text.strip_prefix(key) {
        Some(digits) => digits,
        None => return Ok(None),
    };
    let width = curve.width().ok_or(ProtocolError::CurveNotInstalled)?;
    let field = key.trim_end_matches("=0x");
    codec::decode(digits, width)
        .map(Some)
        .map_err(|source| FormatError::Hex { field, source }.into())
}

fn decimal(digits: &str) -> core::result::Result<u32, FormatError> {
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return Err(FormatError::Decimal(digits.to_string()));
    }
    digits
        .parse()
        .map_err(|_| FormatError::Decimal(digits.to_string()))
}

fn unexpected(text: &str, expected: &'static str) -> Reject {
    Reject::Format(FormatError::Unexpected(text.to_string(), expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut Parser, context: &mut Context, text: &str) -> Vec<Effect> {
        text.lines()
            .filter_map(|line| parser.feed(line, context).unwrap())
            .collect()
    }

    const CURVE: &str = "\
== NEW CURVE #1
nn=8
p=0x11
a=0x01
b=0x06
q=0x13
";

    #[test]
    fn curve_block_installs_once() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        let effects = feed_all(&mut parser, &mut context, CURVE);
        assert_eq!(effects, vec![Effect::InstallCurve]);
        assert_eq!(parser.state(), State::Idle);
        assert_eq!(parser.line(), 6);
        assert!(context.curve.is_valid());
        assert_eq!(context.curve.id, 1);
        assert_eq!(context.curve.q.as_bytes(), &[0x13]);
    }

    #[test]
    fn doubling_with_identity_result() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, CURVE);
        let effects = feed_all(
            &mut parser,
            &mut context,
            "== TEST [2]P #1.1\nPx=0x02\nPy=0x03\ntwoP=0\n",
        );
        assert_eq!(effects, vec![Effect::RunTest]);
        let case = &context.case;
        assert_eq!(case.op, Operation::PointDouble);
        assert_eq!(case.id, 1);
        assert_eq!(case.p.x.as_bytes(), &[2]);
        assert_eq!(case.p.y.as_bytes(), &[3]);
        assert!(case.p.valid && !case.p.is_null);
        assert_eq!(case.expected, Some(Outcome::Point(Point::identity())));
    }

    #[test]
    fn identity_input_skips_y() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, CURVE);
        feed_all(&mut parser, &mut context, "== TEST [k]P #1.2\nP=0\n");
        assert_eq!(parser.state(), State::ExpectScalar);
        assert!(context.case.p.is_null);

        let error = parser.feed("Py=0x03", &mut context).unwrap_err();
        assert!(matches!(
            error,
            Error::Format {
                line: 9,
                state: State::ExpectScalar,
                ..
            }
        ));
        // state unchanged on error
        assert_eq!(parser.state(), State::ExpectScalar);
    }

    #[test]
    fn unknown_key_names_the_state() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, "== NEW CURVE #3\nnn=8\n");
        let error = parser.feed("pq=0x11", &mut context).unwrap_err();
        match error {
            Error::Format { line, state, reason } => {
                assert_eq!(line, 3);
                assert_eq!(state, State::ExpectP);
                assert!(matches!(reason, FormatError::Unexpected(ref text, _) if text == "pq=0x11"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn scalar_multiplication_with_blinding() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, CURVE);
        let effects = feed_all(
            &mut parser,
            &mut context,
            "== TEST [k]P #1.3\nPx=0x02\nPy=0x03\nk=0x05\nnbbld=16\n\nnbbld=32\nkPx=0x09\nkPy=0x10\n",
        );
        assert_eq!(effects, vec![Effect::RunTest]);
        let case = &context.case;
        assert_eq!(case.blinding, 32);
        assert_eq!(case.k.as_bytes(), &[5]);
        let expected = Point::affine(
            codec::decode("09", 1).unwrap(),
            codec::decode("10", 1).unwrap(),
        );
        assert_eq!(case.expected, Some(Outcome::Point(expected)));
    }

    #[test]
    fn point_tests_take_a_boolean() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, CURVE);
        let effects = feed_all(
            &mut parser,
            &mut context,
            "== TEST isP==-Q #1.4\nPx=0x02\nPy=0x03\nQ=0\nTRUE\n",
        );
        assert_eq!(effects, vec![Effect::RunTest]);
        assert!(context.case.q.is_null);
        assert_eq!(context.case.expected, Some(Outcome::Answer(true)));

        feed_all(&mut parser, &mut context, "== TEST isPoncurve #1.5\nP=0\n");
        assert_eq!(parser.state(), State::ExpectBooleanAnswer);
        assert!(parser.feed("yes", &mut context).is_err());
    }

    #[test]
    fn exception_marker_reaches_next_test_only() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, CURVE);
        feed_all(
            &mut parser,
            &mut context,
            "# EXCEPTION (point not on curve)\n== TEST -P #1.6\nPx=0x02\nPy=0x04\nnegP=0\n",
        );
        assert!(context.case.exception);
        context.case.clear();

        feed_all(&mut parser, &mut context, "# EXCEPTION\n");
        assert!(context.case.exception);
        feed_all(&mut parser, &mut context, CURVE);
        assert!(!context.case.exception);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, "== NEW CURVE #1\n# nn follows\n   \r\n\nnn=8\r\n");
        assert_eq!(parser.state(), State::ExpectP);
        assert_eq!(context.curve.nn, 8);
    }

    #[test]
    fn malformed_numbers() {
        let mut context = Context::default();
        let mut parser = Parser::new();
        assert!(matches!(
            parser.feed("== NEW CURVE #1a", &mut context),
            Err(Error::Format {
                reason: FormatError::Decimal(_),
                ..
            })
        ));
        feed_all(&mut parser, &mut context, "== NEW CURVE #1\n");
        assert!(matches!(
            parser.feed("nn=0", &mut context),
            Err(Error::Format {
                reason: FormatError::ZeroWidth,
                ..
            })
        ));
        feed_all(&mut parser, &mut context, "nn=16\n");
        assert!(matches!(
            parser.feed("p=0x011", &mut context),
            Err(Error::Format {
                reason: FormatError::Hex { field: "p", .. },
                ..
            })
        ));
    }

    #[test]
    fn unknown_operation() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, CURVE);
        assert!(parser.feed("== TEST [3]P #1.1", &mut context).is_err());
        assert!(parser.feed("== TEST [2]P #1", &mut context).is_err());
        assert_eq!(parser.state(), State::Idle);
    }

    #[test]
    fn hex_before_any_curve() {
        let mut parser = Parser::new();
        let mut context = Context::default();
        feed_all(&mut parser, &mut context, "== TEST -P #1.1\n");
        assert!(matches!(
            parser.feed("Px=0x02", &mut context),
            Err(Error::Protocol {
                line: 2,
                source: ProtocolError::CurveNotInstalled,
            })
        ));
    }
}
