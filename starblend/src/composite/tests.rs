use common::FloatExt;

use super::*;
use crate::astro_image::{AstroImage, ImageDimensions};
use crate::math::{LINEAR_THRESHOLD, mtf};
use crate::store::ImageStore;
use crate::testing::init_tracing;

fn filled(width: usize, height: usize, channels: usize, value: f32) -> AstroImage {
    AstroImage::new_filled(ImageDimensions::new(width, height, channels), value)
}

fn mono(width: usize, pixels: Vec<f32>) -> AstroImage {
    let height = pixels.len() / width;
    AstroImage::from_pixels(ImageDimensions::new(width, height, 1), pixels)
}

fn params(mode: CompositeMode, method: CompositeMethod) -> CompositeParams {
    CompositeParams {
        mode,
        method,
        stretch: ReverseStretch::IDENTITY,
    }
}

fn config(mode: CompositeMode, method: CompositeMethod) -> EngineConfig {
    EngineConfig {
        mode,
        method,
        reverse_stretch: false,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

#[test]
fn test_combine_formulas() {
    use CompositeMethod::*;
    use CompositeMode::*;

    assert!(combine(Removal, Linear, 0.5, 0.2).approx_eq_eps(0.3, 1e-12));
    assert!(combine(Removal, Screen, 0.5, 0.2).approx_eq_eps(0.375, 1e-12));
    assert!(combine(Replacement, Linear, 0.5, 0.2).approx_eq_eps(0.7, 1e-12));
    assert!(combine(Replacement, Screen, 0.5, 0.2).approx_eq_eps(0.6, 1e-12));
}

#[test]
fn test_screen_removal_saturated_background_yields_no_stars() {
    assert_eq!(
        combine(CompositeMode::Removal, CompositeMethod::Screen, 1.0, 1.0),
        0.0
    );
}

#[test]
fn test_composite_replacement_screen_scenario() {
    let starless = filled(2, 2, 1, 0.2);
    let stars = filled(2, 2, 1, 0.1);
    let result = composite(
        &params(CompositeMode::Replacement, CompositeMethod::Screen),
        &starless,
        &stars,
        None,
    );
    for &v in result.channel(0).iter() {
        assert!((v - 0.28).abs() < 1e-6);
    }
}

#[test]
fn test_composite_truncates_to_unit_range() {
    let a = mono(2, vec![0.1, 0.9]);
    let b = mono(2, vec![0.4, 0.3]);

    let removed = composite(&params(CompositeMode::Removal, CompositeMethod::Linear), &a, &b, None);
    assert_eq!(removed.channel(0)[(0, 0)], 0.0);

    let added = composite(
        &params(CompositeMode::Replacement, CompositeMethod::Linear),
        &b,
        &a,
        None,
    );
    assert_eq!(added.channel(0)[(1, 0)], 1.0);
}

#[test]
fn test_composite_with_reverse_stretch_and_empty_stars_keeps_starless() {
    let starless = mono(3, vec![0.2, 0.5, 0.8]);
    let stars = mono(3, vec![0.0, 0.0, 0.0]);
    let p = CompositeParams {
        stretch: ReverseStretch::from_median(0.5, true),
        ..params(CompositeMode::Replacement, CompositeMethod::Screen)
    };
    let result = composite(&p, &starless, &stars, None);
    for (r, s) in result.channel(0).iter().zip(starless.channel(0).iter()) {
        assert!((r - s).abs() < 1e-5);
    }
}

#[test]
fn test_mask_blends_composite_with_starless() {
    let starless = mono(2, vec![0.2, 0.2]);
    let stars = mono(2, vec![0.5, 0.5]);
    let mask = Mask::new(mono(2, vec![1.0, 0.25]), false);

    let result = composite(
        &params(CompositeMode::Replacement, CompositeMethod::Linear),
        &starless,
        &stars,
        Some(&mask),
    );
    assert!((result.channel(0)[(0, 0)] - 0.7).abs() < 1e-6);
    assert!((result.channel(0)[(1, 0)] - (0.25 * 0.7 + 0.75 * 0.2)).abs() < 1e-6);
}

#[test]
fn test_mono_mask_broadcasts_over_color() {
    let starless = filled(1, 1, 3, 0.2);
    let stars = filled(1, 1, 3, 0.5);
    let mask = Mask::new(mono(1, vec![1.0]), true);

    let result = composite(
        &params(CompositeMode::Replacement, CompositeMethod::Screen),
        &starless,
        &stars,
        Some(&mask),
    );
    // Inverted all-ones mask keeps the starless image everywhere.
    assert_eq!(result, starless);
}

// ---------------------------------------------------------------------------
// Compatibility
// ---------------------------------------------------------------------------

#[test]
fn test_check_operands() {
    let a = filled(4, 4, 3, 0.1);
    let b = filled(4, 4, 3, 0.2);
    let narrow = filled(3, 4, 3, 0.1);
    let gray = filled(4, 4, 1, 0.1);

    assert!(check_operands("a", &a, "b", &b).is_ok());
    assert!(check_operands("b", &b, "a", &a).is_ok());

    let reason = |r: Result<(), CompositeError>| match r {
        Err(CompositeError::IncompatibleImages { reason, .. }) => Some(reason),
        _ => None,
    };
    assert_eq!(
        reason(check_operands("a", &a, "a", &a)),
        Some(Incompatibility::SameImage)
    );
    assert_eq!(
        reason(check_operands("a", &a, "n", &narrow)),
        Some(Incompatibility::Dimensions)
    );
    assert_eq!(
        reason(check_operands("g", &gray, "a", &a)),
        Some(Incompatibility::ColorSpace)
    );
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

#[test]
fn test_removal_then_replacement_roundtrip() {
    init_tracing();

    let starless_px = vec![0.1, 0.2, 0.3, 0.05, 0.6, 0.45];
    let true_stars = [0.0, 0.5, 0.1, 0.9, 0.0, 0.3];
    let starry_px: Vec<f32> = starless_px
        .iter()
        .zip(true_stars)
        .map(|(&a, b)| a + b - a * b)
        .collect();

    let mut store = ImageStore::new();
    store.insert("starry", mono(3, starry_px.clone())).unwrap();
    store.insert("starless", mono(3, starless_px)).unwrap();

    let mut cfg = config(CompositeMode::Removal, CompositeMethod::Screen);
    cfg.starry = Some("starry".to_string());
    cfg.starless = Some("starless".to_string());

    let removed = run_commit(&mut store, &mut cfg).unwrap();
    assert_eq!(removed, CommitOutcome::Created { id: "stars".to_string() });
    assert_eq!(cfg.stars.as_deref(), Some("stars"));

    cfg.mode = CompositeMode::Replacement;
    let replaced = run_commit(&mut store, &mut cfg).unwrap();
    assert_eq!(replaced, CommitOutcome::Created { id: "starry2".to_string() });
    assert_eq!(cfg.starry.as_deref(), Some("starry2"));

    let rebuilt = store.image("starry2").unwrap();
    for (r, s) in rebuilt.channel(0).iter().zip(&starry_px) {
        assert!((r - s).abs() < 1e-5, "{r} != {s}");
    }
}

/// Pixel value of a commit wrapped in the forward/inverse MTF pair with
/// balance `s`.
fn wrapped(mode: CompositeMode, method: CompositeMethod, s: f64, a: f32, b: f32) -> f64 {
    let v = combine(mode, method, mtf(s, a as f64), mtf(s, b as f64)).clamp(0.0, 1.0);
    mtf(1.0 - s, v)
}

fn stretched_store() -> (ImageStore, Vec<f32>, Vec<f32>, Vec<f32>) {
    // Median 0.3; the starry median is higher, so a balance taken from the
    // wrong operand shows up in the result.
    let starless = vec![0.1, 0.2, 0.3, 0.35, 0.25, 0.4, 0.32, 0.28, 0.5];
    let stars = vec![0.0, 0.6, 0.05, 0.9, 0.2, 0.0, 0.4, 0.1, 0.7];
    let starry: Vec<f32> = starless
        .iter()
        .zip(&stars)
        .map(|(&a, &b)| a + b - a * b)
        .collect();

    let mut store = ImageStore::new();
    store.insert("starry", mono(3, starry.clone())).unwrap();
    store.insert("starless", mono(3, starless.clone())).unwrap();
    store.insert("stars", mono(3, stars.clone())).unwrap();
    (store, starry, starless, stars)
}

#[test]
fn test_removal_commit_wraps_in_starless_balance() {
    let (mut store, starry, starless, _) = stretched_store();
    let s = mtf(LINEAR_THRESHOLD, 0.3_f32 as f64);

    let mut cfg = config(CompositeMode::Removal, CompositeMethod::Screen);
    cfg.reverse_stretch = true;
    cfg.starry = Some("starry".to_string());
    cfg.starless = Some("starless".to_string());
    let outcome = run_commit(&mut store, &mut cfg).unwrap();

    let result = store.image(outcome.id()).unwrap().channel(0);
    for (i, &v) in result.pixels().iter().enumerate() {
        let expected = wrapped(cfg.mode, cfg.method, s, starry[i], starless[i]);
        assert!((v as f64 - expected).abs() < 1e-5, "{i}: {v} != {expected}");
    }
}

#[test]
fn test_replacement_commit_wraps_in_starless_balance() {
    let (mut store, _, starless, stars) = stretched_store();
    let s = mtf(LINEAR_THRESHOLD, 0.3_f32 as f64);

    for method in [CompositeMethod::Linear, CompositeMethod::Screen] {
        let mut cfg = config(CompositeMode::Replacement, method);
        cfg.reverse_stretch = true;
        cfg.starless = Some("starless".to_string());
        cfg.stars = Some("stars".to_string());
        let outcome = run_commit(&mut store, &mut cfg).unwrap();

        let result = store.image(outcome.id()).unwrap().channel(0);
        for (i, &v) in result.pixels().iter().enumerate() {
            let expected = wrapped(cfg.mode, method, s, starless[i], stars[i]);
            assert!((v as f64 - expected).abs() < 1e-5, "{method} {i}: {v} != {expected}");
        }
    }
}

#[test]
fn test_linear_starless_skips_reverse_stretch_in_commit() {
    let starless = vec![0.002, 0.004, 0.006, 0.008, 0.01, 0.012, 0.3, 0.001, 0.0];
    let stars = vec![0.0, 0.5, 0.1, 0.9, 0.2, 0.0, 0.4, 0.1, 0.7];
    let mut store = ImageStore::new();
    store.insert("starless", mono(3, starless.clone())).unwrap();
    store.insert("stars", mono(3, stars.clone())).unwrap();

    let mut cfg = config(CompositeMode::Replacement, CompositeMethod::Screen);
    cfg.reverse_stretch = true;
    cfg.starless = Some("starless".to_string());
    cfg.stars = Some("stars".to_string());
    let outcome = run_commit(&mut store, &mut cfg).unwrap();

    let result = store.image(outcome.id()).unwrap().channel(0);
    for (i, &v) in result.pixels().iter().enumerate() {
        let expected = combine(cfg.mode, cfg.method, starless[i] as f64, stars[i] as f64);
        assert!((v as f64 - expected).abs() < 1e-6, "{i}: {v} != {expected}");
    }
}

#[test]
fn test_replacement_in_place_updates_references() {
    let mut store = ImageStore::new();
    store.insert("starless", filled(2, 2, 1, 0.2)).unwrap();
    store.insert("stars", filled(2, 2, 1, 0.1)).unwrap();

    let mut cfg = config(CompositeMode::Replacement, CompositeMethod::Screen);
    cfg.create_new_image = false;
    cfg.starless = Some("starless".to_string());
    cfg.stars = Some("stars".to_string());

    let outcome = run_commit(&mut store, &mut cfg).unwrap();
    assert_eq!(outcome, CommitOutcome::Replaced { id: "starless".to_string() });
    assert_eq!(cfg.starry.as_deref(), Some("starless"));
    assert_eq!(cfg.starless, None);
    assert_eq!(store.len(), 2);
    for &v in store.image("starless").unwrap().channel(0).iter() {
        assert!((v - 0.28).abs() < 1e-6);
    }
}

#[test]
fn test_mask_only_applies_in_place() {
    let mut store = ImageStore::new();
    store.insert("starless", filled(2, 1, 1, 0.2)).unwrap();
    store.insert("stars", filled(2, 1, 1, 0.5)).unwrap();
    store.insert("mask", mono(2, vec![0.0, 1.0])).unwrap();
    store.set_mask("starless", "mask", false).unwrap();

    let mut cfg = config(CompositeMode::Replacement, CompositeMethod::Linear);
    cfg.starless = Some("starless".to_string());
    cfg.stars = Some("stars".to_string());

    let outcome = run_commit(&mut store, &mut cfg).unwrap();
    let new_image = store.image(outcome.id()).unwrap();
    assert!(new_image.channel(0).iter().all(|&v| (v - 0.7).abs() < 1e-6));

    cfg.create_new_image = false;
    cfg.starless = Some("starless".to_string());
    run_commit(&mut store, &mut cfg).unwrap();
    let masked = store.image("starless").unwrap();
    assert!((masked.channel(0)[(0, 0)] - 0.2).abs() < 1e-6);
    assert!((masked.channel(0)[(1, 0)] - 0.7).abs() < 1e-6);
}

#[test]
fn test_invalid_output_id_falls_back_to_default() {
    init_tracing();

    let mut store = ImageStore::new();
    store.insert("starry", filled(2, 2, 1, 0.4)).unwrap();
    store.insert("starless", filled(2, 2, 1, 0.25)).unwrap();

    let mut cfg = config(CompositeMode::Removal, CompositeMethod::Screen);
    cfg.output_id = "1abc".to_string();
    cfg.starry = Some("starry".to_string());
    cfg.starless = Some("starless".to_string());

    let outcome = run_commit(&mut store, &mut cfg).unwrap();
    assert_eq!(outcome.id(), "stars");
    for &v in store.image("stars").unwrap().channel(0).iter() {
        assert!((v - 0.2).abs() < 1e-6);
    }
}

#[test]
fn test_requested_output_id_is_made_unique() {
    let mut store = ImageStore::new();
    store.insert("starry", filled(1, 1, 1, 0.4)).unwrap();
    store.insert("starless", filled(1, 1, 1, 0.25)).unwrap();
    store.insert("extracted", filled(1, 1, 1, 0.0)).unwrap();

    let mut cfg = config(CompositeMode::Removal, CompositeMethod::Linear);
    cfg.output_id = "extracted".to_string();
    cfg.starry = Some("starry".to_string());
    cfg.starless = Some("starless".to_string());

    assert_eq!(run_commit(&mut store, &mut cfg).unwrap().id(), "extracted2");
}

#[test]
fn test_commit_errors_leave_store_untouched() {
    let mut store = ImageStore::new();
    store.insert("starry", filled(2, 2, 3, 0.4)).unwrap();
    store.insert("starless", filled(2, 2, 1, 0.25)).unwrap();

    let mut cfg = config(CompositeMode::Removal, CompositeMethod::Screen);
    assert_eq!(
        run_commit(&mut store, &mut cfg),
        Err(CompositeError::MissingSource { role: "starry" })
    );

    cfg.starry = Some("starry".to_string());
    cfg.starless = Some("nebula".to_string());
    assert_eq!(
        run_commit(&mut store, &mut cfg),
        Err(CompositeError::UnknownImage {
            id: "nebula".to_string()
        })
    );

    cfg.starless = Some("starless".to_string());
    assert!(matches!(
        run_commit(&mut store, &mut cfg),
        Err(CompositeError::IncompatibleImages {
            reason: Incompatibility::ColorSpace,
            ..
        })
    ));

    cfg.starless = Some("starry".to_string());
    assert!(matches!(
        run_commit(&mut store, &mut cfg),
        Err(CompositeError::IncompatibleImages {
            reason: Incompatibility::SameImage,
            ..
        })
    ));

    assert_eq!(store.len(), 2);
    assert_eq!(cfg.stars, None);
}
