use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use h2dense_cholesky::{ldlt, llt};
use h2dense_core::{c64, random::random_spd, Mat};
use rand::{rngs::StdRng, SeedableRng};

pub fn cholesky(c: &mut Criterion) {
    let mut group = c.benchmark_group("cholesky");
    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(2))
        .warm_up_time(Duration::from_secs(1));

    for n in [32, 64, 128, 256, 512] {
        let mut rng = StdRng::seed_from_u64(0);
        let mut a = Mat::<f64>::zeros(n, n);
        random_spd(a.as_mut(), 1.0, &mut rng);

        group.bench_function(&format!("h2dense-llt-{n}"), |b| {
            b.iter(|| {
                let mut factor = a.clone();
                let _ = llt::compute::cholesky_in_place(factor.as_mut());
            })
        });
        group.bench_function(&format!("h2dense-ldlt-{n}"), |b| {
            b.iter(|| {
                let mut factors = a.clone();
                let _ = ldlt::compute::ldlt_in_place(factors.as_mut());
            })
        });

        let mut factor = a.clone();
        let _ = llt::compute::cholesky_in_place(factor.as_mut());
        let mut rhs = Mat::<f64>::zeros(n, n);
        group.bench_function(&format!("h2dense-llt-solve-{n}"), |b| {
            b.iter(|| llt::solve::solve_in_place(factor.as_ref(), rhs.as_mut()))
        });
    }

    for n in [32, 128] {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = Mat::<c64>::zeros(n, n);
        random_spd(a.as_mut(), 1.0, &mut rng);
        group.bench_function(&format!("h2dense-llt-c64-{n}"), |b| {
            b.iter(|| {
                let mut factor = a.clone();
                let _ = llt::compute::cholesky_in_place(factor.as_mut());
            })
        });
    }
}

criterion_group!(benches, cholesky);
criterion_main!(benches);
