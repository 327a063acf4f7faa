use forecast_engine::blend::blend;
use forecast_engine::data::ForecastPoint;
use pretty_assertions::assert_eq;

fn points(pairs: &[(i64, f64)]) -> Vec<ForecastPoint> {
    pairs
        .iter()
        .map(|&(time, value)| ForecastPoint { time, value })
        .collect()
}

#[test]
fn test_blend_averages_shared_timestamps() {
    let a = points(&[(10, 1.0), (20, 1.0), (30, 1.0)]);
    let b = points(&[(10, 3.0), (20, 3.0), (30, 3.0)]);

    assert_eq!(blend(&a, &b), points(&[(10, 2.0), (20, 2.0), (30, 2.0)]));
}

#[test]
fn test_blend_mirrored_values() {
    let a = points(&[(10, 1.0), (20, 2.0), (30, 3.0)]);
    let b = points(&[(10, 3.0), (20, 2.0), (30, 1.0)]);

    assert_eq!(blend(&a, &b), points(&[(10, 2.0), (20, 2.0), (30, 2.0)]));
}

#[test]
fn test_blend_keeps_only_intersection() {
    let a = points(&[(10, 1.0), (20, 2.0), (30, 3.0)]);
    let b = points(&[(20, 4.0), (30, 5.0), (40, 6.0)]);

    assert_eq!(blend(&a, &b), points(&[(20, 3.0), (30, 4.0)]));
}

#[test]
fn test_blend_output_is_time_ordered() {
    let a = points(&[(30, 3.0), (10, 1.0), (20, 2.0)]);
    let b = points(&[(20, 2.0), (30, 3.0), (10, 1.0)]);

    let times: Vec<i64> = blend(&a, &b).iter().map(|p| p.time).collect();
    assert_eq!(times, vec![10, 20, 30]);
}

#[test]
fn test_blend_disjoint_grids_concatenate() {
    let a = points(&[(10, 1.0), (30, 3.0)]);
    let b = points(&[(20, 2.0), (40, 4.0)]);

    assert_eq!(
        blend(&a, &b),
        points(&[(10, 1.0), (20, 2.0), (30, 3.0), (40, 4.0)])
    );
}

#[test]
fn test_blend_with_empty_side() {
    let a = points(&[(10, 1.0)]);

    assert_eq!(blend(&a, &[]), a);
    assert_eq!(blend(&[], &a), a);
    assert!(blend(&[], &[]).is_empty());
}
