use ecc_conformance::{
    driver::{Affine, Slot},
    testing::{point_lines, random_point, Call, Scripted, Vectors},
    App, Config, Error, FormatError, Operation, State, Stats,
};

#[path = "../src/bin-lib/args.rs"]
mod args;

const CURVE: [&str; 4] = ["11", "01", "06", "13"];

fn run(scripted: Scripted, text: &str) -> (Result<Stats, Error>, App<Scripted, Vec<u8>>) {
    let mut app = App::new(scripted, Vec::new(), &Config::default());
    let result = app.run(text.as_bytes());
    (result, app)
}

fn output(app: App<Scripted, Vec<u8>>) -> String {
    String::from_utf8(app.into_output()).unwrap()
}

#[test]
fn doubling_to_identity() {
    let text = Vectors::new()
        .curve(1, 8, CURVE)
        .line("")
        .test(Operation::PointDouble, 1, 1, &["Px=0x02", "Py=0x03", "twoP=0"])
        .build();
    let mut scripted = Scripted::new();
    scripted.push_zero(true);

    let (result, app) = run(scripted, &text);
    assert_eq!(
        result.unwrap(),
        Stats {
            ok: 1,
            nok: 0,
            total: 1
        }
    );
    assert_eq!(
        app.accelerator().calls(),
        &[
            Call::SetCurve { nn: 8 },
            Call::PointUnzero(Slot::R0),
            Call::Double(Some((vec![2], vec![3]))),
            Call::PointIsZero(Slot::R1),
        ]
    );
}

#[test]
fn malformed_key_stops_the_batch() {
    let text = "== NEW CURVE #1\nnn=8\npq=0x11\n";
    let (result, mut app) = run(Scripted::new(), text);
    let error = result.unwrap_err();
    match &error {
        Error::Format { line, state, reason } => {
            assert_eq!(*line, 3);
            assert_eq!(*state, State::ExpectP);
            assert!(matches!(reason, FormatError::Unexpected(..)));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(app.accelerator().calls().is_empty());

    app.report_fatal(&error).unwrap();
    let out = output(app);
    assert!(out.starts_with("Stopped on test 1.0\nOK = 0\nnOK = 0\ntotal = 0\n--\n"));
    assert!(out.contains("line 3"));
}

#[test]
fn identity_scalar_multiplicand() {
    let text = Vectors::new()
        .curve(1, 8, CURVE)
        .test(Operation::ScalarMultiply, 1, 1, &["P=0", "k=0x05", "kP=0"])
        .build();
    let mut scripted = Scripted::new();
    scripted.push_zero(true);

    let (result, app) = run(scripted, &text);
    assert_eq!(result.unwrap().ok, 1);
    assert_eq!(
        app.accelerator().operations(),
        [&Call::ScalarMul(None, vec![5], 0)]
    );
    assert!(app.accelerator().calls().contains(&Call::PointZero(Slot::R0)));
}

#[test]
fn mismatches_are_counted() {
    let text = Vectors::new()
        .curve(1, 8, CURVE)
        .test(Operation::OnCurveCheck, 1, 1, &["Px=0x02", "Py=0x03", "true"])
        .test(
            Operation::EqualityCheck,
            1,
            2,
            &["Px=0x02", "Py=0x03", "Qx=0x02", "Qy=0x03", "true"],
        )
        .test(Operation::PointNegate, 1, 3, &["Px=0x02", "Py=0x03", "negPx=0x02", "negPy=0x0e"])
        .build();
    let mut scripted = Scripted::new();
    scripted.push_answer(true);
    scripted.push_answer(true);
    scripted.push_point(Affine {
        x: vec![0x02],
        y: vec![0x0f],
    });

    let (result, app) = run(scripted, &text);
    let stats = result.unwrap();
    assert_eq!(
        stats,
        Stats {
            ok: 2,
            nok: 1,
            total: 3
        }
    );
    assert_eq!(stats.total, stats.ok + stats.nok);
    let out = output(app);
    assert!(out.contains("Mismatch on test 1.3 (-P): coordinates differ"));
    assert!(out.contains("hardware: (0x02, 0x0f)"));
}

#[test]
fn curves_replace_each_other() {
    let text = Vectors::new()
        .curve(1, 8, CURVE)
        .curve(2, 16, ["fffb", "0001", "0006", "fff1"])
        .test(Operation::PointNegate, 2, 1, &["Px=0x0002", "Py=0x0003", "negP=0"])
        .build();
    let mut scripted = Scripted::new();
    scripted.push_zero(true);

    let (result, app) = run(scripted, &text);
    assert_eq!(result.unwrap().ok, 1);
    let calls = app.accelerator().calls();
    assert_eq!(calls[0], Call::SetCurve { nn: 8 });
    assert_eq!(calls[1], Call::SetCurve { nn: 16 });
    assert_eq!(app.context().curve.id, 2);
}

#[test]
fn short_coordinates_are_fatal() {
    let text = Vectors::new()
        .curve(2, 16, ["fffb", "0001", "0006", "fff1"])
        .test(Operation::PointNegate, 2, 1, &["Px=0x02"])
        .build();
    let (result, _) = run(Scripted::new(), &text);
    assert!(matches!(
        result,
        Err(Error::Format {
            line: 8,
            state: State::ExpectPX,
            reason: FormatError::Hex { field: "Px", .. },
        })
    ));
}

#[test]
fn random_additions() {
    let nn = 255;
    let mut vectors = Vectors::new().curve(
        1,
        nn,
        [
            "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed",
            "2aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa984914a144",
            "7b425ed097b425ed097b425ed097b425ed097b425ed097b4260b5e9c7710c864",
            "1000000000000000000000000000000014def9dea2f79cd65812631a5cf5d3ed",
        ],
    );
    let mut scripted = Scripted::new();
    for id in 1..=20 {
        let (p, q, sum) = (random_point(nn), random_point(nn), random_point(nn));
        let mut lines = point_lines("P", &p);
        lines.extend(point_lines("Q", &q));
        lines.extend(point_lines("PplusQ", &sum));
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        vectors = vectors.test(Operation::PointAdd, 1, id, &lines);

        // every fifth answer is wrong
        let mut y = sum.y.as_bytes().to_vec();
        if id % 5 == 0 {
            y[31] ^= 1;
        }
        scripted.push_point(Affine {
            x: sum.x.as_bytes().to_vec(),
            y,
        });
    }

    let (result, app) = run(scripted, &vectors.build());
    assert_eq!(
        result.unwrap(),
        Stats {
            ok: 16,
            nok: 4,
            total: 20
        }
    );
    assert_eq!(app.accelerator().operations().len(), 20);
}

#[test]
fn arguments() {
    use argh::FromArgs;

    let args = args::Args::from_args(&["ecc-conformance"], &["vectors.txt", "--progress-every", "10"])
        .unwrap();
    assert_eq!(args.input.as_deref(), Some(std::path::Path::new("vectors.txt")));
    assert_eq!(Config::from(&args).progress_every, 10);
    assert!(!args.verbose);

    let args = args::Args::from_args(&["ecc-conformance"], &["-v"]).unwrap();
    assert!(args.input.is_none());
    assert_eq!(Config::from(&args), Config::default());
}

#[test]
fn null_backend_never_matches_identity() {
    let text = Vectors::new()
        .curve(1, 8, CURVE)
        .test(Operation::PointDouble, 1, 1, &["Px=0x02", "Py=0x03", "twoP=0"])
        .test(Operation::OnCurveCheck, 1, 2, &["Px=0x02", "Py=0x03", "false"])
        .build();
    let backend = ecc_conformance::backend().unwrap();
    let mut app = App::new(backend, Vec::new(), &Config { progress_every: 1 });
    let stats = app.run(text.as_bytes()).unwrap();
    assert_eq!(
        stats,
        Stats {
            ok: 1,
            nok: 1,
            total: 2
        }
    );
    let out = String::from_utf8(app.into_output()).unwrap();
    assert!(out.contains("identity flags differ"));
    assert!(out.ends_with("       1        1        2\n"));
}
