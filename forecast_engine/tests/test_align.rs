use forecast_engine::align::{align_exogenous, align_to_grid, try_align};
use forecast_engine::data::{ExogenousInput, RawPoint};
use forecast_engine::error::ForecastError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_forward_fill_between_observations() {
    let grid = [0, 10, 20, 30, 40];
    let raw = [RawPoint::new(5, 1.0), RawPoint::new(25, 2.0)];

    let aligned = align_to_grid(&grid, &raw).unwrap();

    // 0 precedes every observation and is back-filled from the next grid point.
    assert_eq!(aligned, vec![1.0, 1.0, 1.0, 2.0, 2.0]);
}

#[test]
fn test_exact_timestamps_are_used() {
    let grid = [0, 10, 20];
    let raw = [
        RawPoint::new(0, 1.0),
        RawPoint::new(10, 2.0),
        RawPoint::new(20, 3.0),
    ];

    assert_eq!(align_to_grid(&grid, &raw).unwrap(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_unsorted_input_and_duplicates() {
    let grid = [0, 10, 20];
    let raw = [
        RawPoint::new(20, 3.0),
        RawPoint::new(10, 2.0),
        RawPoint::new(10, 2.5),
        RawPoint::new(0, 1.0),
    ];

    // Last write wins for timestamp 10.
    assert_eq!(align_to_grid(&grid, &raw).unwrap(), vec![1.0, 2.5, 3.0]);
}

#[test]
fn test_grid_entirely_before_series() {
    let grid = [0, 1, 2];
    let raw = [RawPoint::new(100, 7.0), RawPoint::new(200, 8.0)];

    assert_eq!(align_to_grid(&grid, &raw).unwrap(), vec![7.0, 7.0, 7.0]);
}

#[test]
fn test_incomplete_points_are_dropped() {
    let grid = [0, 10];
    let raw = [
        RawPoint {
            time: None,
            value: Some(100.0),
        },
        RawPoint {
            time: Some(0),
            value: None,
        },
        RawPoint::new(0, f64::NAN),
        RawPoint::new(0, 4.0),
    ];

    assert_eq!(align_to_grid(&grid, &raw).unwrap(), vec![4.0, 4.0]);
}

#[test]
fn test_malformed_series() {
    let grid = [0, 10];

    assert!(matches!(
        try_align(&grid, &[]),
        Err(ForecastError::MalformedSeries(_))
    ));
    assert!(matches!(
        try_align(&grid, &[RawPoint::default()]),
        Err(ForecastError::MalformedSeries(_))
    ));
    assert!(align_to_grid(&grid, &[]).is_none());
}

#[test]
fn test_align_exogenous_keeps_order_and_skips_bad_features() {
    let grid = vec![0, 10, 20];
    let mut exog = ExogenousInput::new();
    exog.insert("zeta".to_string(), vec![RawPoint::new(0, 1.0)]);
    exog.insert("broken".to_string(), Vec::new());
    exog.insert("alpha".to_string(), vec![RawPoint::new(15, 2.0)]);

    let aligned = align_exogenous(&grid, &exog);

    let names: Vec<&String> = aligned.keys().collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(aligned["zeta"].values(), &[1.0, 1.0, 1.0]);
    assert_eq!(aligned["alpha"].values(), &[2.0, 2.0, 2.0]);
    assert_eq!(aligned["alpha"].times(), grid.as_slice());
}

proptest! {
    #[test]
    fn prop_aligned_covers_grid(
        grid_len in 0usize..40,
        raw in prop::collection::vec((0i64..1_000, -1e6f64..1e6), 1..30),
    ) {
        let grid: Vec<i64> = (0..grid_len as i64).map(|i| i * 25).collect();
        let points: Vec<RawPoint> = raw.iter().map(|&(t, v)| RawPoint::new(t, v)).collect();

        let aligned = align_to_grid(&grid, &points).unwrap();

        prop_assert_eq!(aligned.len(), grid.len());
        for value in &aligned {
            prop_assert!(value.is_finite());
            prop_assert!(raw.iter().any(|&(_, v)| v == *value));
        }
    }

    #[test]
    fn prop_value_is_latest_at_or_before(
        raw in prop::collection::vec((0i64..500, -100f64..100.0), 1..20),
        t in 0i64..600,
    ) {
        let points: Vec<RawPoint> = raw.iter().map(|&(t, v)| RawPoint::new(t, v)).collect();
        let aligned = align_to_grid(&[t], &points).unwrap();

        let latest = raw
            .iter()
            .enumerate()
            .filter(|(_, point)| point.0 <= t)
            .max_by_key(|(i, point)| (point.0, *i))
            .map(|(_, point)| point.1);
        if let Some(expected) = latest {
            prop_assert_eq!(aligned[0], expected);
        }
    }
}
