use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pepver::prelude::*;

fn parse_ok_inputs() -> Vec<&'static str> {
    vec![
        "1.2.3",
        "1!1.2.3",
        "1.2.3a4",
        "1.2.3a4.post5.dev6+foo.42",
        "v1.0-alpha.3",
        "1.0.0-1",
    ]
}

fn parse_ok(inputs: &[&str]) {
    for input in inputs {
        let res = Version::parse(input);
        assert!(res.is_ok());
    }
}

fn parse_err_inputs() -> Vec<&'static str> {
    vec!["", "abc", "1.2.3xx7", "1.2.3.", "1.2.3+foo!"]
}

fn parse_err(inputs: &[&str]) {
    for input in inputs {
        let res = Version::parse(input);
        assert!(res.is_err());
    }
}

fn bump_fields() -> Vec<Field> {
    vec![
        Field::Epoch,
        Field::Release(0),
        Field::Release(1),
        Field::Release(2),
        Field::Pre(Some(PreKind::Rc)),
        Field::Post,
        Field::Dev,
        Field::Local,
    ]
}

fn bump_all(version: &Version, fields: &[Field]) {
    for field in fields {
        let res = version.bump(*field);
        assert!(res.is_ok());
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse_ok", |b| {
        b.iter(|| parse_ok(black_box(&parse_ok_inputs())))
    });
    c.bench_function("parse_err", |b| {
        b.iter(|| parse_err(black_box(&parse_err_inputs())))
    });
    let version = Version::parse("1!1.2.3a4.post5.dev6+foo.42").unwrap();
    let fields = bump_fields();
    c.bench_function("bump_all_fields", |b| {
        b.iter(|| bump_all(black_box(&version), black_box(&fields)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
