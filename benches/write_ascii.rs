use criterion::{black_box, criterion_group, criterion_main, Criterion};

use earthgrid::mesh::{AxisSpan, BoxGrid};
use earthgrid::prelude::*;

fn write(n: usize, encoding: Encoding) -> usize {
    let mesh = BoxGrid::volume(
        AxisSpan::new(0., 1., n),
        AxisSpan::new(0., 1., n),
        AxisSpan::new(0., 1., n),
    )
    .build()
    .unwrap();

    let model = |point: &[f64], depth: f64, _gravity: f64| point[0] + depth;

    let writer: Vec<u8> = Vec::new();
    let mut buf_writer = std::io::BufWriter::new(writer);

    earthgrid::export(&mut buf_writer, &mesh, &model, 10., 2, encoding).unwrap();

    buf_writer.buffer().len()
}

fn write_bench(c: &mut Criterion) {
    c.bench_function("write ascii 32", |b| {
        b.iter(|| write(black_box(32), Encoding::Ascii))
    });

    c.bench_function("write base64 32", |b| {
        b.iter(|| write(black_box(32), Encoding::Base64))
    });
}

criterion_group!(benches, write_bench);
criterion_main!(benches);
