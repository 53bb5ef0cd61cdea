
use super::*;
use BurnoutLabel::{Burnout, NoBurnout};

#[test]
fn test_confusion_matrix_cells() {
    let actual = [NoBurnout, NoBurnout, Burnout, Burnout, Burnout];
    let predicted = [NoBurnout, Burnout, Burnout, Burnout, NoBurnout];
    let m = ConfusionMatrix::from_labels(&actual, &predicted);
    assert_eq!(m.cells, [[1, 1], [1, 2]]);
    assert_eq!(m.total(), actual.len());
    assert_eq!(m.support(Burnout), 3);
    assert_eq!(m.predicted(Burnout), 3);
    assert_eq!(m.correct(), 3);
}

#[test]
fn test_report_matches_hand_computation() {
    // tn 4, fp 1, fn 2, tp 3
    let mut actual = vec![NoBurnout; 5];
    actual.extend([Burnout; 5]);
    let mut predicted = vec![NoBurnout, NoBurnout, NoBurnout, NoBurnout, Burnout];
    predicted.extend([NoBurnout, NoBurnout, Burnout, Burnout, Burnout]);

    let out = run_stage5(&actual, &predicted);
    assert_eq!(out.matrix.cells, [[4, 1], [2, 3]]);
    let r = &out.report;

    let c0 = r.classes[0];
    assert_eq!(c0.label, NoBurnout);
    assert!((c0.precision - 4.0 / 6.0).abs() < 1e-12);
    assert!((c0.recall - 0.8).abs() < 1e-12);
    assert!((c0.f1 - 2.0 * (4.0 / 6.0) * 0.8 / (4.0 / 6.0 + 0.8)).abs() < 1e-12);
    assert_eq!(c0.support, 5);

    let c1 = r.classes[1];
    assert!((c1.precision - 0.75).abs() < 1e-12);
    assert!((c1.recall - 0.6).abs() < 1e-12);

    assert!((r.accuracy - 0.7).abs() < 1e-12);
    assert!((r.macro_avg.precision - (4.0 / 6.0 + 0.75) / 2.0).abs() < 1e-12);
    // equal supports make the weighted average equal to the macro average
    assert!((r.weighted_avg.recall - r.macro_avg.recall).abs() < 1e-12);
    assert_eq!(r.weighted_avg.support, 10);
}

#[test]
fn test_weighted_average_uses_support() {
    let actual = [NoBurnout, NoBurnout, NoBurnout, Burnout];
    let predicted = [NoBurnout, NoBurnout, NoBurnout, NoBurnout];
    let r = run_stage5(&actual, &predicted).report;
    assert!((r.classes[0].recall - 1.0).abs() < 1e-12);
    assert_eq!(r.classes[1].recall, 0.0);
    assert!((r.weighted_avg.recall - 0.75).abs() < 1e-12);
    assert!((r.macro_avg.recall - 0.5).abs() < 1e-12);
}

#[test]
fn test_zero_denominators_report_zero() {
    let actual = [NoBurnout, NoBurnout];
    let predicted = [NoBurnout, NoBurnout];
    let r = run_stage5(&actual, &predicted).report;
    let c1 = r.classes[1];
    assert_eq!(c1.precision, 0.0);
    assert_eq!(c1.recall, 0.0);
    assert_eq!(c1.f1, 0.0);
    assert_eq!(c1.support, 0);
    assert_eq!(r.accuracy, 1.0);
}

#[test]
fn test_all_metrics_within_unit_interval() {
    let actual = [Burnout, NoBurnout, Burnout, NoBurnout, Burnout, Burnout];
    let predicted = [Burnout, Burnout, NoBurnout, NoBurnout, Burnout, NoBurnout];
    let r = run_stage5(&actual, &predicted).report;
    for c in r.classes {
        for v in [c.precision, c.recall, c.f1] {
            assert!((0.0..=1.0).contains(&v));
        }
    }
    assert!((0.0..=1.0).contains(&r.accuracy));
}

#[test]
fn test_empty_input() {
    let r = run_stage5(&[], &[]).report;
    assert_eq!(r.accuracy, 0.0);
    assert_eq!(r.macro_avg.support, 0);
}
