//! Benchmark tests for layout construction and solving.

use boxbind_layout::{Grid, Region};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_region_creation(c: &mut Criterion) {
    c.bench_function("region_new", |b| b.iter(Region::new));
}

fn bench_pad(c: &mut Criterion) {
    let region = Region::builder().width(10.0).height(10.0).build();
    c.bench_function("region_pad", |b| {
        b.iter(|| region.pad(black_box(&[0.5])).expect("valid offsets"))
    });
}

fn solve_grid(rows: usize, cols: usize) {
    let grid = Grid::builder(rows, cols)
        .width(100.0)
        .height(100.0)
        .build();
    grid.spacing(0.4);
    grid.margins(0.2);
    for row in 0..rows {
        for col in 0..cols {
            let child = Region::new();
            let row = isize::try_from(row).expect("track counts fit isize");
            let col = isize::try_from(col).expect("track counts fit isize");
            grid.cell(row, col).expect("in range").fix(&child);
        }
    }
    grid.solve().expect("solves");
}

fn bench_grid_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_solve");
    for n in [2_usize, 4] {
        group.bench_function(format!("{n}x{n}"), |b| {
            b.iter(|| solve_grid(black_box(n), black_box(n)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_region_creation, bench_pad, bench_grid_solve);
criterion_main!(benches);
