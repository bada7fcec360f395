use criterion::{black_box, criterion_group, criterion_main, Criterion};

use svgfront::parse_path;

static INPUT: &str = "M10 20 C 30,40 50 60-70,80,90 100,110 120,130,140";

fn path_parser(c: &mut Criterion) {
    c.bench_function("parse path into spline", |b| {
        let input = black_box(INPUT);

        b.iter(|| {
            let parsed = parse_path(input);
            black_box(parsed.path);
        });
    });

    c.bench_function("parse path with arcs", |b| {
        let input = black_box("M 0 0 A 10 10 0 0 1 10 10 a 5 5 30 1 0 -3 -3 Z");

        b.iter(|| {
            let parsed = parse_path(input);
            black_box(parsed.path);
        });
    });
}

criterion_group!(benches, path_parser);
criterion_main!(benches);
