use super::*;

const TOLERANCE: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

fn with_step<F: SignalFunction + ?Sized>(mut function: Box<F>, step: f64) -> Box<F> {
    function.set_step(step);
    function
}

fn all_variants(step: f64) -> Vec<Box<dyn SignalFunction>> {
    vec![
        with_step(Identity::new(), step),
        with_step(DiscreteIntegral::new(), step),
        with_step(ContinuousIntegral::new(), step),
        with_step(Sinusoid::new(2., 3., 0.5), step),
    ]
}

#[test]
fn elapsed_time_advances_by_step_per_sample() {
    for step in [0.001, 0.1, 0.25, 1.] {
        for mut function in all_variants(step) {
            assert_eq!(function.elapsed_time(), 0.);

            for n in 1..=50 {
                function.sample();
                assert_close(function.elapsed_time(), n as f64 * step);
            }
        }
    }
}

#[test]
fn sample_caches_last_value() {
    for mut function in all_variants(0.1) {
        assert_eq!(function.last_value(), 0.);

        for _ in 0..7 {
            let value = function.sample();
            assert_eq!(function.last_value(), value);
        }
    }
}

#[test]
fn reset_reproduces_first_sample_of_fresh_instance() {
    let fresh_first: Vec<f64> = all_variants(0.1)
        .iter_mut()
        .map(|function| function.sample())
        .collect();

    let mut functions = all_variants(0.1);
    for function in functions.iter_mut() {
        for _ in 0..13 {
            function.sample();
        }
        function.reset();

        assert_eq!(function.elapsed_time(), 0.);
        assert_eq!(function.last_value(), 0.);
        assert_eq!(function.clock().step(), 0.1);
    }

    let reset_first: Vec<f64> = functions
        .iter_mut()
        .map(|function| function.sample())
        .collect();

    assert_eq!(reset_first, fresh_first);
}

#[test]
fn identity_echoes_pre_increment_time() {
    let mut identity = with_step(Identity::new(), 0.5);

    let samples: Vec<f64> = (0..4).map(|_| identity.sample()).collect();

    assert_eq!(samples, vec![0., 0.5, 1., 1.5]);
    assert_eq!(identity.elapsed_time(), 2.);
}

#[test]
fn discrete_integral_accumulates_with_pre_increment_time() {
    let mut integral = with_step(DiscreteIntegral::new(), 1.);

    // Cached value before the first sample
    assert_eq!(integral.last_value(), 0.);

    let samples: Vec<f64> = (0..6).map(|_| integral.sample()).collect();

    assert_eq!(samples, vec![0., 1., 3., 6., 10., 15.]);
}

#[test]
fn discrete_integral_scales_with_step() {
    let mut integral = with_step(DiscreteIntegral::new(), 0.5);

    let samples: Vec<f64> = (0..4).map(|_| integral.sample()).collect();

    // value(n) = value(n-1) + t(n-1) * 0.5 with t = 0, 0.5, 1.0, 1.5
    assert_eq!(samples, vec![0., 0.25, 0.75, 1.5]);
}

#[test]
fn continuous_integral_is_half_time_squared() {
    let mut integral = with_step(ContinuousIntegral::new(), 1.);

    let samples: Vec<f64> = (0..5).map(|_| integral.sample()).collect();

    assert_eq!(samples, vec![0., 0.5, 2., 4.5, 8.]);
}

#[test]
fn sinusoid_unit_parameters() {
    let mut sin = with_step(Sinusoid::new(1., 1., 0.), 0.1);

    assert_eq!(sin.sample(), 0.);

    for _ in 0..9 {
        sin.sample();
    }
    assert_close(sin.elapsed_time(), 1.);

    assert_close(sin.sample(), 1_f64.sin());
}

#[test]
fn sinusoid_applies_amplitude_and_phase() {
    let mut sin = with_step(Sinusoid::new(3., 2., std::f64::consts::FRAC_PI_2), 0.25);

    assert_close(sin.sample(), 3.);
    assert_close(sin.sample(), 3. * (0.5 + std::f64::consts::FRAC_PI_2).sin());

    assert_eq!(sin.amplitude(), 3.);
    assert_eq!(sin.omega(), 2.);
    assert_eq!(sin.phi(), std::f64::consts::FRAC_PI_2);
}

#[test]
fn unassigned_step_keeps_clock_still() {
    let mut identity = Identity::new();

    assert_eq!(identity.sample(), 0.);
    assert_eq!(identity.sample(), 0.);
    assert_eq!(identity.elapsed_time(), 0.);
}
