use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_complex::Complex64;
use stopcrit::{ResidualStopCriterium, StopCriterium, StopOptions};

fn bench_determine_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("determine_status");
    for &n in &[1_000usize, 100_000] {
        let x: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
        let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
        let r: Vec<f64> = b.iter().map(|v| v * 1e-9).collect();

        group.bench_with_input(BenchmarkId::new("residual", n), &n, |ben, _| {
            let mut crit = ResidualStopCriterium::new(1e-8, 5).unwrap();
            let mut i = 0i64;
            ben.iter(|| {
                i += 1;
                crit.determine_status(black_box(i), black_box(&x), black_box(&b), black_box(&r)).unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("standard set", n), &n, |ben, _| {
            let mut crit = StopOptions::default().build::<f64>().unwrap();
            let mut i = 0i64;
            ben.iter(|| {
                i += 1;
                crit.determine_status(black_box(i % 1000), black_box(&x), black_box(&b), black_box(&r))
                    .unwrap()
            })
        });

        let xc: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, v)).collect();
        let bc: Vec<Complex64> = b.iter().map(|&v| Complex64::new(v, -v)).collect();
        let rc: Vec<Complex64> = r.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        group.bench_with_input(BenchmarkId::new("residual complex", n), &n, |ben, _| {
            let mut crit = ResidualStopCriterium::new(1e-8, 5).unwrap();
            let mut i = 0i64;
            ben.iter(|| {
                i += 1;
                crit.determine_status(black_box(i), black_box(&xc), black_box(&bc), black_box(&rc)).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_determine_status);
criterion_main!(benches);
