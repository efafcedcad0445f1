use rowsmith_core::{BatchRun, BatchStatus, Row, RowResult, RowStatus};
use rowsmith_error::BatchErrorKind;
use std::collections::HashMap;
use std::str::FromStr;

fn rows(n: usize) -> Vec<Row> {
    Row::from_records((0..n).map(|i| HashMap::from([("id".to_string(), i.to_string())])))
}

#[test]
fn status_transitions_only_move_forward() {
    use BatchStatus::*;

    assert!(Pending.can_transition_to(Processing));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(Processing.can_transition_to(Completed));
    assert!(Processing.can_transition_to(Failed));
    assert!(Processing.can_transition_to(Cancelled));

    assert!(!Processing.can_transition_to(Pending));
    assert!(!Completed.can_transition_to(Processing));
    assert!(!Cancelled.can_transition_to(Processing));
    assert!(!Failed.can_transition_to(Completed));
    assert!(!Pending.can_transition_to(Completed));
}

#[test]
fn status_round_trips_through_strings() {
    assert_eq!(BatchStatus::Processing.to_string(), "processing");
    assert_eq!(BatchStatus::from_str("cancelled").unwrap(), BatchStatus::Cancelled);
    assert_eq!(RowStatus::Success.to_string(), "success");
}

#[test]
fn transition_stamps_times_and_rejects_regressions() {
    let mut run = BatchRun::new(2);
    assert!(run.started_at().is_none());

    run.transition(BatchStatus::Processing).unwrap();
    assert!(run.started_at().is_some());
    assert!(run.finished_at().is_none());

    run.transition(BatchStatus::Cancelled).unwrap();
    assert!(run.is_cancelled());
    assert!(run.finished_at().is_some());

    let err = run.transition(BatchStatus::Processing).unwrap_err();
    assert!(matches!(err.kind(), BatchErrorKind::InvalidTransition { .. }));
    assert_eq!(run.status(), BatchStatus::Cancelled);
}

#[test]
fn results_are_ordered_by_row_index() {
    let rows = rows(4);
    let mut run = BatchRun::new(rows.len());

    assert!(run.record(RowResult::success(&rows[3], "d", 0)));
    assert!(run.record(RowResult::failed(&rows[1], "boom", 2)));
    assert!(run.record(RowResult::success(&rows[0], "a", 1)));

    let indices: Vec<usize> = run.results().iter().map(|r| *r.row_index()).collect();
    assert_eq!(indices, vec![0, 1, 3]);
    assert_eq!(run.pending_indices(), vec![2]);
    assert!(run.is_recorded(3));
    assert!(!run.is_recorded(2));
}

#[test]
fn recorded_results_are_never_overwritten() {
    let rows = rows(1);
    let mut run = BatchRun::new(1);

    assert!(run.record(RowResult::success(&rows[0], "first", 0)));
    assert!(!run.record(RowResult::failed(&rows[0], "second", 0)));

    let results = run.results();
    assert_eq!(results[0].output(), "first");
    assert_eq!(*results[0].status(), RowStatus::Success);
}

#[test]
fn out_of_range_results_are_dropped() {
    let stray = Row::new(7, HashMap::new());
    let mut run = BatchRun::new(2);
    assert!(!run.record(RowResult::success(&stray, "x", 0)));
    assert_eq!(run.processed(), 0);
}

#[test]
fn stats_count_each_status() {
    let rows = rows(5);
    let mut run = BatchRun::new(rows.len());
    run.record(RowResult::success(&rows[0], "a", 0));
    run.record(RowResult::success(&rows[1], "b", 0));
    run.record(RowResult::success(&rows[2], "c", 0));
    run.record(RowResult::failed(&rows[3], "HTTP 400", 0));

    let stats = run.stats();
    assert_eq!(*stats.total(), 5);
    assert_eq!(*stats.processed(), 4);
    assert_eq!(*stats.succeeded(), 3);
    assert_eq!(*stats.failed(), 1);
    assert_eq!(*stats.cancelled(), 0);
    assert_eq!(*stats.success_rate(), 0.75);
    assert_eq!(stats.remaining(), 1);
    assert_eq!(*stats.succeeded() + *stats.failed(), run.results().len());
}

#[test]
fn explicit_cancelled_results_are_counted() {
    let rows = rows(3);
    let mut run = BatchRun::new(rows.len());
    run.record(RowResult::success(&rows[0], "a", 0));
    run.record(RowResult::cancelled(&rows[2]));

    let stats = run.stats();
    assert_eq!(*stats.cancelled(), 1);
    assert_eq!(*stats.processed(), 2);
    assert_eq!(*stats.success_rate(), 0.5);
    assert_eq!(*run.results()[1].status(), RowStatus::Cancelled);
    assert_eq!(run.pending_indices(), vec![1]);
}

#[test]
fn empty_stats_have_zero_success_rate() {
    let stats = BatchRun::new(3).stats();
    assert_eq!(*stats.processed(), 0);
    assert_eq!(*stats.success_rate(), 0.0);
}

#[test]
fn resumed_run_keeps_results_with_new_identity() {
    let rows = rows(3);
    let mut run = BatchRun::new(rows.len());
    run.transition(BatchStatus::Processing).unwrap();
    run.record(RowResult::success(&rows[0], "a", 0));
    run.transition(BatchStatus::Cancelled).unwrap();

    let resumed = BatchRun::resumed_from(&run);
    assert_ne!(resumed.id(), run.id());
    assert_eq!(resumed.status(), BatchStatus::Pending);
    assert!(!resumed.is_cancelled());
    assert_eq!(resumed.total(), 3);
    assert_eq!(resumed.pending_indices(), vec![1, 2]);
}

#[test]
fn row_results_serialize_without_empty_error() {
    let row = Row::new(0, HashMap::from([("name".to_string(), "Bob".to_string())]));
    let json = serde_json::to_value(RowResult::success(&row, "Hello Bob", 0)).unwrap();
    assert_eq!(json["status"], "success");
    assert!(json.get("error").is_none());
}
