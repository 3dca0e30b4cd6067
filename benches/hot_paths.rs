use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gtd_map::data::{generate_simple_world, DataSelector, IncidentRecord, IncidentTable, YearInterval};
use gtd_map::map::{miller_forward, Basemap, FigureSize, MapRenderer, Viewport};

/// Deterministic spread of incidents over 1970-2015
fn synthetic_incidents(n: usize) -> IncidentTable {
    let records = (0..n)
        .map(|i| {
            let t = i as f64;
            IncidentRecord::new(
                1970 + (i % 46) as i32,
                ((t * 0.618).fract() - 0.5) * 120.0,
                ((t * 0.414).fract() - 0.5) * 340.0,
            )
        })
        .collect();
    IncidentTable::new(records)
}

fn bench_projection(c: &mut Criterion) {
    let vp = Viewport::world(360, 200);
    c.bench_function("miller_forward", |b| {
        b.iter(|| miller_forward(black_box(-74.0), black_box(40.7)))
    });
    c.bench_function("viewport_project", |b| {
        b.iter(|| vp.project(black_box(139.7), black_box(35.7)))
    });
}

fn bench_selection(c: &mut Criterion) {
    let table = synthetic_incidents(150_000);
    let interval = YearInterval::new(1996, 2000).unwrap();
    c.bench_function("select_by_year_range_150k", |b| {
        b.iter(|| table.select_by_year_range(black_box(interval)))
    });
}

fn bench_render(c: &mut Criterion) {
    let mut basemap = Basemap::new();
    generate_simple_world(&mut basemap);
    let renderer = MapRenderer::new(basemap);
    let table = synthetic_incidents(150_000);
    let interval = YearInterval::new(1970, 2015).unwrap();
    let size = FigureSize::new(180, 50);

    for style in ["Blue Marble", "Etopo", "Plain"] {
        c.bench_function(&format!("render_{}", style), |b| {
            b.iter(|| renderer.render(&table, interval, black_box(style), size).unwrap())
        });
    }
}

criterion_group!(benches, bench_projection, bench_selection, bench_render);
criterion_main!(benches);
