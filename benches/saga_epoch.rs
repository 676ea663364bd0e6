use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use rsaga_lib::prelude::*;

fn dataset(n: usize, d: usize) -> Arc<ModelLinReg> {
    let mut rng = StdRng::seed_from_u64(0);
    let features = Array2::from_shape_fn((n, d), |_| rng.gen_range(-1.0..1.0));
    let labels: Array1<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Arc::new(ModelLinReg::new(features, labels, true).unwrap())
}

fn bench_epochs(c: &mut Criterion) {
    let mut group = c.benchmark_group("saga_epoch");
    for &(n, d) in &[(1_000, 10), (1_000, 100), (10_000, 10)] {
        let model = dataset(n, d);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", n, d)), &model, |b, model| {
            b.iter(|| {
                let mut solver = Saga::new(SagaConfig {
                    max_iter: 1,
                    verbose: false,
                    seed: Some(1),
                    ..SagaConfig::default()
                })
                .unwrap();
                solver.set_model(Arc::clone(model)).unwrap().set_prox(ProxL2Sq::new(1e-3));
                black_box(solver.solve(None).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_epochs);
criterion_main!(benches);
