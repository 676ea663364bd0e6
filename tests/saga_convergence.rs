mod common;

use ndarray::Array1;
use rsaga_lib::prelude::*;
use std::sync::Arc;

fn config(max_iter: usize, variance_reduction: VarianceReduction, rand_type: RandType) -> SagaConfig {
    SagaConfig {
        max_iter,
        variance_reduction,
        rand_type,
        verbose: false,
        seed: Some(2024),
        ..SagaConfig::default()
    }
}

#[test]
fn ridge_reaches_closed_form_minimizer() {
    common::init_logger();
    let lambda = 0.1;
    let (features, labels, _) = common::regression_data(100, 3, 11);
    let optimum = common::ridge_solution(&features, &labels, lambda);
    let model = Arc::new(ModelLinReg::new(features, labels, false).unwrap());

    for strategy in [VarianceReduction::Last, VarianceReduction::Avg, VarianceReduction::Rand] {
        for rand_type in [RandType::Unif, RandType::Perm] {
            let mut solver = Saga::new(config(200, strategy, rand_type)).unwrap();
            solver.set_model(Arc::clone(&model)).unwrap().set_prox(ProxL2Sq::new(lambda));
            let report = solver.solve(Some(Array1::zeros(3).view())).unwrap();
            let gap = common::max_abs_diff(&report.solution, &optimum);
            assert!(gap < 1e-4, "{:?}/{:?}: {} vs {} (gap {})", strategy, rand_type, report.solution, optimum, gap);
            assert_eq!(report.epochs, 200);
        }
    }
}

#[test]
fn objective_trace_decreases_overall() {
    let (features, labels, _) = common::regression_data(80, 4, 12);
    let model = Arc::new(ModelLinReg::new(features, labels, true).unwrap());
    let mut solver = Saga::new(config(30, VarianceReduction::Last, RandType::Perm)).unwrap();
    solver.set_model(model).unwrap().set_prox(ProxL2Sq::new(0.01).with_range(0, 4));
    solver.solve(None).unwrap();

    let objectives = solver.history().objectives();
    assert_eq!(objectives.len(), 31);
    assert!(objectives.last().unwrap() < &(0.1 * objectives[0]));
}

#[test]
fn tolerance_stops_before_the_ceiling() {
    let (features, labels, _) = common::regression_data(100, 3, 13);
    let model = Arc::new(ModelLinReg::new(features, labels, false).unwrap());
    let mut solver = Saga::new(SagaConfig {
        tol: 1e-10,
        ..config(500, VarianceReduction::Last, RandType::Unif)
    })
    .unwrap();
    solver.set_model(model).unwrap().set_prox(ProxL2Sq::new(0.1));
    let report = solver.solve(None).unwrap();
    assert_eq!(report.status, SolveStatus::Converged);
    assert!(report.epochs < 500);
    assert_eq!(solver.state(), SolverState::Converged);
    assert!(solver.history().last().unwrap().rel_obj < 1e-10);
}

#[test]
fn strong_l1_penalty_gives_zero_solution() {
    let (features, labels, _) = common::regression_data(60, 3, 14);
    // Above ‖Xᵀy / n‖∞ the lasso solution is exactly zero
    let lambda_max = features
        .t()
        .dot(&labels)
        .mapv(|v| v.abs() / 60.0)
        .fold(0.0, |a: f64, &b| a.max(b));
    let model = Arc::new(ModelLinReg::new(features, labels, false).unwrap());
    let mut solver = Saga::new(config(100, VarianceReduction::Last, RandType::Unif)).unwrap();
    solver.set_model(model).unwrap().set_prox(ProxL1::new(2.0 * lambda_max));
    let report = solver.solve(Some(Array1::from(vec![1.0, -1.0, 1.0]).view())).unwrap();
    assert!(report.solution.iter().all(|v| v.abs() < 1e-8), "{}", report.solution);
}

#[test]
fn logistic_ridge_reaches_stationary_point() {
    let lambda = 0.05;
    let (features, labels) = common::classification_data(200, 3, 15);
    let model = Arc::new(ModelLogReg::new(features, labels, false).unwrap());
    let mut solver = Saga::new(config(150, VarianceReduction::Last, RandType::Unif)).unwrap();
    solver.set_model(Arc::clone(&model)).unwrap().set_prox(ProxL2Sq::new(lambda));
    let report = solver.solve(None).unwrap();

    let w = &report.solution;
    let grad = model.grad(w.view()) + w * lambda;
    let norm = grad.dot(&grad).sqrt();
    assert!(norm < 1e-6, "gradient norm {}", norm);
    assert!(report.objective < 2f64.ln());
}
