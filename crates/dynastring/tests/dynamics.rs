//! End-to-end scenarios: long-running stability, predictable transitions
//! under a wave-speed sweep, and offline rendering.

use dynastring::audio::{render_offline, save_wav};
use dynastring::{
    CorrectionConfig, DynamicString, ExcitationConfig, SpeedRamp, StringConfig,
};

const SAMPLE_RATE: f64 = 44_100.0;

fn reference_config() -> StringConfig {
    StringConfig::new(600.0, 1.0, SAMPLE_RATE, 200).unwrap()
}

#[test]
fn constant_parameters_stay_bounded_over_ten_thousand_samples() {
    let mut string = DynamicString::new(reference_config()).unwrap();
    assert!(
        (string.layout().lambda_sq - 1.0).abs() < f64::EPSILON,
        "lambda^2 is structurally 1 for h = c*k"
    );

    let initial_energy = string.total_energy();
    let initial_peak = string.max_displacement();
    assert!(initial_energy > 0.0);

    let mut peak = 0.0f64;
    for sample in 0..10_000 {
        string.advance();
        string.rotate();

        let out = string.read_output(0.2);
        assert!(out.is_finite(), "output went non-finite at sample {}", sample);
        peak = peak.max(string.max_displacement());
    }

    let final_energy = string.total_energy();
    assert!(final_energy.is_finite());
    assert!(
        final_energy < 10.0 * initial_energy,
        "energy must not grow: initial={}, final={}",
        initial_energy,
        final_energy
    );
    assert!(
        peak < 10.0 * initial_peak,
        "displacement must stay bounded: initial={}, peak={}",
        initial_peak,
        peak
    );
}

#[test]
fn linear_sweep_triggers_transitions_at_predicted_samples() {
    // 294 m/s needs 150 points, 588 m/s needs 75: the sweep removes one
    // point at each integer crossing of L/(c*k). The endpoints sit exactly
    // on integer counts, so the initial count may land one below 150
    // depending on rounding; every in-between sample is checked against
    // the same arithmetic the engine uses.
    let config = StringConfig::new(294.0, 1.0, SAMPLE_RATE, 200).unwrap();
    let mut string = DynamicString::new(config).unwrap();
    let initial_n_int = string.layout().n_int;
    assert!(
        (149..=150).contains(&initial_n_int),
        "294 m/s must need 150 points up to rounding, got {}",
        initial_n_int
    );

    let ramp = SpeedRamp::new(294.0, 588.0, 44_100);
    let mut previous_n_int = initial_n_int;

    for sample in 0..44_100 {
        let speed = ramp.value_at(sample);
        string.set_wave_speed(speed);
        string.advance();
        string.rotate();

        let layout = *string.layout();

        // The integer count must match the closed-form prediction and
        // never move by more than one point per sample. The prediction
        // repeats the engine's own expression so integer crossings agree
        // to the last bit.
        let predicted = (1.0 / (speed * (1.0 / SAMPLE_RATE))).floor() as usize;
        assert_eq!(
            layout.n_int, predicted,
            "point count diverged from L/(c*k) at sample {}",
            sample
        );
        assert!(
            previous_n_int.abs_diff(layout.n_int) <= 1,
            "more than one boundary crossed at sample {}",
            sample
        );
        previous_n_int = layout.n_int;

        assert_eq!(layout.m + layout.mw, layout.n_int);
        assert!(layout.alpha >= 0.0 && layout.alpha < 1.0);

        let out = string.read_output(0.2);
        assert!(out.is_finite(), "output went non-finite at sample {}", sample);
    }

    let final_n_int = string.layout().n_int;
    assert!(
        (74..=75).contains(&final_n_int),
        "588 m/s must need 75 points up to rounding, got {}",
        final_n_int
    );
    assert_eq!(
        string.transitions(),
        (initial_n_int - final_n_int) as u64,
        "every transition must correspond to exactly one removed point"
    );
    assert_eq!(string.rate_violations(), 0);
}

#[test]
fn sweep_survives_without_correction() {
    let config = StringConfig::new(294.0, 1.0, SAMPLE_RATE, 200)
        .unwrap()
        .with_correction(CorrectionConfig::disabled());
    let mut string = DynamicString::new(config).unwrap();

    let ramp = SpeedRamp::new(294.0, 588.0, 44_100);
    for sample in 0..44_100 {
        string.set_wave_speed(ramp.value_at(sample));
        string.advance();
        string.rotate();
        assert!(string.read_output(0.2).is_finite());
    }
    assert!((74..=75).contains(&string.layout().n_int));
}

#[test]
fn offline_render_is_audible_and_limited() {
    let samples = render_offline(reference_config(), 0.2, 22_050).unwrap();

    assert_eq!(samples.len(), 22_050);
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(
        samples.iter().all(|s| (-1.0..=1.0).contains(s)),
        "the limiter must bound every sample"
    );
    assert!(
        samples.iter().any(|s| s.abs() > 1e-4),
        "the excitation must produce audible output"
    );

    let path = std::env::temp_dir().join("dynastring-render-test.wav");
    save_wav(&path, &samples, SAMPLE_RATE as u32).unwrap();
    assert!(path.exists());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn silent_string_stays_silent_through_transitions() {
    let config = StringConfig::new(294.0, 1.0, SAMPLE_RATE, 200)
        .unwrap()
        .with_excitation(ExcitationConfig::silent());
    let mut string = DynamicString::new(config).unwrap();

    let ramp = SpeedRamp::new(294.0, 400.0, 10_000);
    for sample in 0..10_000 {
        string.set_wave_speed(ramp.value_at(sample));
        string.advance();
        string.rotate();
        assert_eq!(
            string.read_output(0.5),
            0.0,
            "restructuring must not invent energy at sample {}",
            sample
        );
    }
    assert!(string.transitions() > 0);
}
