//! Tests for CTQW and DTQW time evolution.

use num_complex::Complex64;
use qwalk_sim::observables;
use qwalk_sim::operator;
use qwalk_sim::state::{self, CoinState, InitialState};
use qwalk_sim::{DefectSet, Evolver, LatticeSpec, SimError, TimeSamples, WalkKind};

fn evolver(n: usize, kind: WalkKind, defects: &DefectSet, initial: InitialState) -> Evolver {
    let lattice = LatticeSpec::new(n).unwrap();
    let op = operator::build(&lattice, defects, kind).unwrap();
    let psi = state::init(&lattice, kind, &initial).unwrap();
    Evolver::new(op, psi).unwrap()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn evolver_rejects_size_mismatch() {
    let op = operator::build(&LatticeSpec::new(6).unwrap(), &DefectSet::new(), WalkKind::Continuous).unwrap();
    let psi = state::init(&LatticeSpec::new(5).unwrap(), WalkKind::Continuous, &InitialState::delta(2)).unwrap();
    assert!(matches!(
        Evolver::new(op, psi),
        Err(SimError::DimensionMismatch {
            operator_rows: 6,
            expected: 5,
            kind: WalkKind::Continuous
        })
    ));
}

#[test]
fn evolver_rejects_kind_mismatch() {
    // A 10-site CTQW operator has as many rows as a 5-site DTQW state.
    let op = operator::build(&LatticeSpec::new(10).unwrap(), &DefectSet::new(), WalkKind::Continuous).unwrap();
    let psi = state::init(&LatticeSpec::new(5).unwrap(), WalkKind::Discrete, &InitialState::delta(2)).unwrap();
    assert!(matches!(
        Evolver::new(op, psi),
        Err(SimError::DimensionMismatch { .. })
    ));
}

#[test]
fn invalid_time_samples_are_rejected() {
    assert!(matches!(
        TimeSamples::new(Vec::new()),
        Err(SimError::InvalidTimeSamples(_))
    ));
    assert!(matches!(
        TimeSamples::new(vec![0.0, f64::INFINITY]),
        Err(SimError::InvalidTimeSamples(_))
    ));
    assert!(matches!(
        TimeSamples::linspace(0.0, 1.0, 0),
        Err(SimError::InvalidTimeSamples(_))
    ));
}

#[test]
fn discrete_walk_rejects_fractional_steps() {
    let ev = evolver(5, WalkKind::Discrete, &DefectSet::new(), InitialState::delta(2));
    for bad in [vec![1.5], vec![-1.0]] {
        let times = TimeSamples::new(bad).unwrap();
        assert!(matches!(ev.run(&times), Err(SimError::InvalidTimeSamples(_))));
    }
}

// ---------------------------------------------------------------------------
// Concrete cases
// ---------------------------------------------------------------------------

#[test]
fn continuous_delta_at_time_zero() {
    let ev = evolver(5, WalkKind::Continuous, &DefectSet::new(), InitialState::delta(2));
    let dist = observables::probabilities(&ev.run(&TimeSamples::new(vec![0.0]).unwrap()).unwrap());
    assert_eq!(dist.num_times(), 1);
    assert_eq!(dist.at(0).to_vec(), vec![0.0, 0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn discrete_delta_at_step_zero() {
    let init = InitialState::delta(2).with_coin(CoinState::new(
        Complex64::new(1.0, 0.0),
        Complex64::new(0.0, 0.0),
    ));
    let ev = evolver(4, WalkKind::Discrete, &DefectSet::new(), init);
    let dist = observables::probabilities(&ev.run(&TimeSamples::steps([0]).unwrap()).unwrap());
    assert_eq!(dist.at(0).to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
}

#[test]
fn two_site_walk_oscillates() {
    let ev = evolver(2, WalkKind::Continuous, &DefectSet::new(), InitialState::delta(0));
    let times = TimeSamples::linspace(0.0, 6.0, 25).unwrap();
    let dist = observables::probabilities(&ev.run(&times).unwrap());
    for (i, &t) in dist.times().iter().enumerate() {
        assert!((dist.at(i)[0] - t.cos().powi(2)).abs() < 1e-10, "t = {t}");
    }
}

#[test]
fn free_return_probability_matches_bessel() {
    // On an infinite line p_center(t) = J₀(2t)²; J₀(10)² ≈ 0.0604844.
    let ev = evolver(201, WalkKind::Continuous, &DefectSet::new(), InitialState::delta(100));
    let dist = observables::probabilities(&ev.run(&TimeSamples::new(vec![5.0]).unwrap()).unwrap());
    assert!((dist.at(0)[100] - 0.060_484_4).abs() < 1e-6);
}

#[test]
fn zero_strength_defect_matches_free_walk() {
    let times = TimeSamples::linspace(0.0, 40.0, 21).unwrap();
    let init = InitialState::delta(100);
    let free = evolver(201, WalkKind::Continuous, &DefectSet::new(), init);
    let zero = evolver(201, WalkKind::Continuous, &DefectSet::new().with_defect(150, 0.0), init);
    let a = observables::probabilities(&free.run(&times).unwrap());
    let b = observables::probabilities(&zero.run(&times).unwrap());
    let deviation = (a.values() - b.values()).mapv(f64::abs).fold(0.0, |m: f64, &x| m.max(x));
    assert!(deviation < 1e-12);
}

// ---------------------------------------------------------------------------
// Conservation and symmetry
// ---------------------------------------------------------------------------

#[test]
fn continuous_walk_conserves_probability() {
    let times = TimeSamples::linspace(0.0, 60.0, 31).unwrap();
    let cases = [
        (DefectSet::new(), InitialState::delta(50)),
        (DefectSet::new().with_defect(60, 4.0), InitialState::delta(50)),
        (
            DefectSet::uniform([30, 70], -2.0),
            InitialState::gaussian(50, 5.0, 1.0),
        ),
    ];
    for (defects, init) in cases {
        let ev = evolver(101, WalkKind::Continuous, &defects, init);
        let dist = observables::probabilities(&ev.run(&times).unwrap());
        for (i, mass) in dist.total_mass().iter().enumerate() {
            assert!((mass - 1.0).abs() < 1e-6, "sample {i}: {mass}");
        }
    }
}

#[test]
fn free_continuous_walk_is_symmetric() {
    let ev = evolver(201, WalkKind::Continuous, &DefectSet::new(), InitialState::delta(100));
    let times = TimeSamples::linspace(0.0, 30.0, 16).unwrap();
    let dist = observables::probabilities(&ev.run(&times).unwrap());
    for i in 0..dist.num_times() {
        let p = dist.at(i);
        for k in 1..=100 {
            assert!((p[100 + k] - p[100 - k]).abs() < 1e-9, "sample {i}, k = {k}");
        }
    }
}

#[test]
fn discrete_walk_conserves_mass_before_boundary() {
    let ev = evolver(101, WalkKind::Discrete, &DefectSet::new(), InitialState::delta(50));
    let dist = observables::probabilities(&ev.run(&TimeSamples::range(40)).unwrap());
    for (t, mass) in dist.total_mass().iter().enumerate() {
        assert!((mass - 1.0).abs() < 1e-12, "step {t}: {mass}");
    }
}

#[test]
fn discrete_walk_loses_mass_at_boundary() {
    let ev = evolver(21, WalkKind::Discrete, &DefectSet::new(), InitialState::delta(10));
    let dist = observables::probabilities(&ev.run(&TimeSamples::range(30)).unwrap());
    let mass = dist.total_mass();
    for m in mass.iter() {
        assert!(*m <= 1.0 + 1e-9);
    }
    assert!(mass[30] < 1.0 - 1e-6);
    // Mass never grows once it starts leaking.
    for t in 1..mass.len() {
        assert!(mass[t] <= mass[t - 1] + 1e-12);
    }
}

#[test]
fn free_balanced_discrete_walk_is_symmetric() {
    let ev = evolver(101, WalkKind::Discrete, &DefectSet::new(), InitialState::delta(50));
    let dist = observables::probabilities(&ev.run(&TimeSamples::steps([10, 25, 40]).unwrap()).unwrap());
    for i in 0..dist.num_times() {
        let p = dist.at(i);
        for k in 1..=50 {
            assert!((p[50 + k] - p[50 - k]).abs() < 1e-12, "sample {i}, k = {k}");
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

#[test]
fn single_pass_matches_independent_runs() {
    for kind in [WalkKind::Continuous, WalkKind::Discrete] {
        let ev = evolver(41, kind, &DefectSet::new().with_defect(25, 0.9), InitialState::delta(20));
        let all = observables::probabilities(&ev.run(&TimeSamples::steps([3, 8, 15]).unwrap()).unwrap());
        for (i, step) in [3u64, 8, 15].into_iter().enumerate() {
            let alone = observables::probabilities(&ev.run(&TimeSamples::steps([step]).unwrap()).unwrap());
            for (a, b) in all.at(i).iter().zip(alone.at(0).iter()) {
                assert!((a - b).abs() < 1e-10, "{kind} step {step}");
            }
        }
    }
}

#[test]
fn unsorted_times_keep_caller_order() {
    for kind in [WalkKind::Continuous, WalkKind::Discrete] {
        let ev = evolver(31, kind, &DefectSet::new(), InitialState::delta(15));
        let sorted = ev.run(&TimeSamples::steps([0, 2, 5]).unwrap()).unwrap();
        let shuffled = ev.run(&TimeSamples::steps([5, 0, 2, 5]).unwrap()).unwrap();
        assert_eq!(shuffled.times(), &[5.0, 0.0, 2.0, 5.0]);
        let a = observables::probabilities(&sorted);
        let b = observables::probabilities(&shuffled);
        for (si, bi) in [(2, 0), (0, 1), (1, 2), (2, 3)] {
            for (x, y) in a.at(si).iter().zip(b.at(bi).iter()) {
                assert!((x - y).abs() < 1e-10, "{kind}");
            }
        }
    }
}

#[test]
fn trajectory_exposes_states_in_order() {
    let ev = evolver(9, WalkKind::Discrete, &DefectSet::new(), InitialState::delta(4));
    let traj = ev.run(&TimeSamples::range(3)).unwrap();
    assert_eq!(traj.kind(), WalkKind::Discrete);
    assert_eq!(traj.len(), 4);
    assert_eq!(traj.states()[0], *ev.initial());
    let times: Vec<f64> = traj.iter().map(|(t, _)| t).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(traj.last().map(|s| s.len()), Some(18));
}
