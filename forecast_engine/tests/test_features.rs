use forecast_engine::features::{to_price_path, to_returns, FeatureTable};

#[test]
fn test_returns_start_at_zero() {
    let returns = to_returns(&[100.0, 110.0, 99.0]);

    assert_eq!(returns.len(), 3);
    assert_eq!(returns[0], 0.0);
    assert!((returns[1] - 0.1).abs() < 1e-12);
    assert!((returns[2] + 0.1).abs() < 1e-12);
}

#[test]
fn test_returns_are_clipped() {
    let returns = to_returns(&[100.0, 200.0, 10.0]);
    assert_eq!(returns, vec![0.0, 0.2, -0.2]);
}

#[test]
fn test_price_path_compounds_from_last_price() {
    let path = to_price_path(100.0, &[0.1, -0.1]);
    assert!((path[0] - 110.0).abs() < 1e-9);
    assert!((path[1] - 99.0).abs() < 1e-9);
}

#[test]
fn test_feature_table_push_and_lookup() {
    let mut table = FeatureTable::new(3);
    table.push_column("a", vec![1.0, 2.0, 3.0]).unwrap();
    table.push_column("b", vec![4.0, 5.0, 6.0]).unwrap();

    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.n_cols(), 2);
    assert_eq!(table.index_of("b"), Some(1));
    assert_eq!(table.column("a"), Some(&[1.0, 2.0, 3.0][..]));
    assert!(table.column("missing").is_none());

    let m = table.to_matrix();
    assert_eq!(m.nrows(), 3);
    assert_eq!(m.ncols(), 2);
    assert_eq!(m[(2, 0)], 3.0);
    assert_eq!(m[(0, 1)], 4.0);
}

#[test]
fn test_feature_table_rejects_bad_columns() {
    let mut table = FeatureTable::new(2);
    assert!(table.push_column("short", vec![1.0]).is_err());

    table.push_column("x", vec![1.0, 2.0]).unwrap();
    assert!(table.push_column("x", vec![3.0, 4.0]).is_err());
    assert_eq!(table.n_cols(), 1);
}

#[test]
fn test_feature_table_sanitize() {
    let mut table = FeatureTable::new(3);
    table
        .push_column("x", vec![f64::NAN, 1.0, f64::INFINITY])
        .unwrap();
    table
        .push_column("y", vec![2.0, f64::NEG_INFINITY, 3.0])
        .unwrap();

    assert_eq!(table.sanitize(), 3);
    assert_eq!(table.column("x"), Some(&[0.0, 1.0, 0.0][..]));
    assert_eq!(table.column("y"), Some(&[2.0, 0.0, 3.0][..]));
    assert_eq!(table.sanitize(), 0);
}
