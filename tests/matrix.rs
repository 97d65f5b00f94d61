mod common;

use assert_matches::assert_matches;

use kira_expression::app::ProgressSink;
use kira_expression::domain::Sample;
use kira_expression::error::KiraError;
use kira_expression::matrix::{ExpressionMatrix, assemble};
use kira_expression::normalize::{NormalizedSeries, normalize_all};
use kira_expression::output::JsonOutput;
use kira_expression::stats::summarize;

use common::{id_value_sample, sample};

fn build(samples: Vec<Sample>, sink: &dyn ProgressSink) -> Result<ExpressionMatrix, KiraError> {
    assemble(normalize_all(samples, sink).series)
}

fn two_samples() -> Vec<Sample> {
    vec![
        id_value_sample("sample1", &[("g1", "1.0"), ("g2", "2.0")]),
        id_value_sample("sample2", &[("g1", "3.0"), ("g2", "4.0")]),
    ]
}

#[test]
fn merges_on_identifier() {
    let matrix = build(two_samples(), &JsonOutput).unwrap();

    assert_eq!(matrix.samples(), &["sample1".to_string(), "sample2".to_string()]);
    assert_eq!(matrix.row_by_id("g1"), Some(&[1.0, 3.0][..]));
    assert_eq!(matrix.row_by_id("g2"), Some(&[2.0, 4.0][..]));
    assert_eq!(matrix.id_column(), "ID_REF");

    let (aggregated, _) = summarize(matrix).unwrap();
    assert_eq!(aggregated.aggregate_name(), "mean_expression");
    assert_eq!(aggregated.aggregate(), &[2.0, 3.0]);
}

#[test]
fn skipped_sample_contributes_nothing() {
    let mut samples = two_samples();
    samples.push(sample("sample3", &["ID_REF", "DETECTION"], &[&["g1", "P"]]));

    let with_skip = build(samples, &JsonOutput).unwrap();
    let without = build(two_samples(), &JsonOutput).unwrap();

    assert_eq!(with_skip, without);
}

#[test]
fn all_skipped_is_empty_result() {
    let samples = vec![
        sample("sample1", &["ID_REF"], &[&["g1"]]),
        sample("sample2", &["VALUE"], &[&["1.0"]]),
    ];

    assert_matches!(build(samples, &JsonOutput), Err(KiraError::EmptyResult(_)));
}

#[test]
fn only_complete_rows_survive() {
    let samples = vec![
        id_value_sample("a", &[("g1", "1"), ("g2", "2"), ("g3", "3"), ("g4", "NA")]),
        id_value_sample("b", &[("g3", "30"), ("g1", "10"), ("g4", "40")]),
    ];

    let matrix = build(samples, &JsonOutput).unwrap();

    assert_eq!(matrix.row_ids(), &["g1".to_string(), "g3".to_string()]);
    assert_eq!(matrix.row(0), &[1.0, 10.0]);
    assert_eq!(matrix.row(1), &[3.0, 30.0]);
}

#[test]
fn disjoint_identifiers_are_empty_result() {
    let samples = vec![
        id_value_sample("a", &[("g1", "1")]),
        id_value_sample("b", &[("g2", "2")]),
    ];

    let err = build(samples, &JsonOutput).unwrap_err();
    assert_matches!(err, KiraError::EmptyResult(message) if message.contains("2 samples"));
}

#[test]
fn mixed_identifier_columns_leave_header_empty() {
    let mut a = NormalizedSeries::new("a", "ID_REF");
    a.insert("g1", Some(1.0));
    let mut b = NormalizedSeries::new("b", "ID");
    b.insert("g1", Some(2.0));

    let matrix = assemble(vec![a, b]).unwrap();

    assert_eq!(matrix.id_column(), "");
    assert_eq!(matrix.row(0), &[1.0, 2.0]);
}

#[test]
fn aggregate_splits_back_off() {
    let (aggregated, stats) = summarize(build(two_samples(), &JsonOutput).unwrap()).unwrap();
    assert_eq!(stats.count, 2);

    let (matrix, aggregate) = aggregated.into_parts();
    assert_eq!(matrix.n_samples(), 2);
    assert_eq!(aggregate, vec![2.0, 3.0]);
}

#[test]
fn sample_order_only_moves_columns() {
    let samples = || {
        vec![
            id_value_sample("a", &[("g1", "1.0"), ("g2", "2.0"), ("g3", "6.0")]),
            id_value_sample("b", &[("g1", "3.0"), ("g2", "4.0"), ("g3", "0.5")]),
            id_value_sample("c", &[("g1", "5.0"), ("g2", "9.0"), ("g3", "2.5")]),
        ]
    };
    let mut shuffled = samples();
    shuffled.rotate_left(1);

    let (forward, forward_stats) = summarize(build(samples(), &JsonOutput).unwrap()).unwrap();
    let (rotated, rotated_stats) = summarize(build(shuffled, &JsonOutput).unwrap()).unwrap();

    assert_eq!(forward.matrix().row_ids(), rotated.matrix().row_ids());
    assert_eq!(rotated.matrix().samples(), &["b", "c", "a"].map(String::from));
    for id in forward.matrix().row_ids() {
        let mut left = forward.matrix().row_by_id(id).unwrap().to_vec();
        let mut right = rotated.matrix().row_by_id(id).unwrap().to_vec();
        assert_eq!(right, [left[1], left[2], left[0]]);
        left.sort_by(f64::total_cmp);
        right.sort_by(f64::total_cmp);
        assert_eq!(left, right);
    }
    assert_eq!(forward.aggregate(), rotated.aggregate());
    assert_eq!(forward_stats, rotated_stats);
}

#[test]
fn rebuilding_is_identical() {
    let (first, first_stats) = summarize(build(two_samples(), &JsonOutput).unwrap()).unwrap();
    let (second, second_stats) = summarize(build(two_samples(), &JsonOutput).unwrap()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
}
