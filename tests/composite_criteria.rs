//! The standard criteria set assembled from `StopOptions`, driven by hand.

use std::thread;

use num_complex::Complex64;
use stopcrit::{
    CompositeStopCriterium, DivergenceStopCriterium, FailureStopCriterium, IterationCountStopCriterium,
    IterationStatus, ResidualStopCriterium, StopCriterium, StopOptions,
};

#[test]
fn standard_set_converges_on_small_residual() {
    let mut crit = StopOptions::default().with_maximum_residual(1e-6).build::<f64>().unwrap();
    let x = [0.5, 0.5];
    let b = [1.0, 1.0];
    assert_eq!(crit.determine_status(0, &x, &b, &[0.5, 0.5]).unwrap(), IterationStatus::Continue);
    assert_eq!(crit.determine_status(1, &x, &b, &[1e-8, 0.0]).unwrap(), IterationStatus::Converged);
    assert_eq!(crit.reported_by(IterationStatus::Converged), Some("residual"));
}

#[test]
fn standard_set_flags_growing_residual() {
    let options = StopOptions::default().with_divergence(0.5, 3);
    let mut crit = options.build::<f64>().unwrap();
    let x = [0.0];
    let b = [1.0];
    let statuses: Vec<_> = [1.0, 2.0, 4.0, 8.0]
        .iter()
        .enumerate()
        .map(|(i, &r)| crit.determine_status(i as i64, &x, &b, &[r]).unwrap())
        .collect();
    assert_eq!(statuses.last(), Some(&IterationStatus::Diverged));
    assert_eq!(crit.reported_by(IterationStatus::Diverged), Some("divergence"));
}

#[test]
fn failure_in_solution_beats_converged_residual() {
    let mut crit = CompositeStopCriterium::<Complex64>::new()
        .with(ResidualStopCriterium::default())
        .with(FailureStopCriterium::new());
    let x = [Complex64::new(f64::INFINITY, 0.0)];
    let b = [Complex64::new(1.0, 1.0)];
    let r = [Complex64::new(0.0, 0.0)];
    assert_eq!(crit.determine_status(2, &x, &b, &r).unwrap(), IterationStatus::Diverged);
    assert_eq!(crit.reported_by(IterationStatus::Converged), Some("residual"));
    assert_eq!(crit.reported_by(IterationStatus::Diverged), Some("failure"));
}

#[test]
fn nested_composites() {
    let inner = CompositeStopCriterium::<f64>::new().with(IterationCountStopCriterium::new(5).unwrap());
    let mut outer = CompositeStopCriterium::new()
        .with(inner)
        .with(DivergenceStopCriterium::default());
    let v = [1.0];
    assert_eq!(outer.determine_status(4, &v, &v, &v).unwrap(), IterationStatus::Continue);
    assert_eq!(outer.determine_status(5, &v, &v, &v).unwrap(), IterationStatus::Diverged);
    assert_eq!(outer.reported_by(IterationStatus::Diverged), Some("composite"));
}

#[test]
fn fresh_clones_run_independent_solves_on_other_threads() {
    let template = StopOptions::default()
        .with_maximum_residual(1e-3)
        .with_minimum_iterations_below_maximum(2)
        .build::<f64>()
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|k| {
            let mut crit = template.clone_fresh();
            thread::spawn(move || {
                let x = [0.0];
                let b = [1.0];
                let mut last = IterationStatus::Continue;
                for i in 0..=(k + 2) {
                    let r = if i < k { 1.0 } else { 1e-4 };
                    last = crit.determine_status(i, &x, &b, &[r]).unwrap();
                }
                last
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), IterationStatus::Converged);
    }
    assert_eq!(template.status(), IterationStatus::Continue);
}
