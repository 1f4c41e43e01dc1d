use std::time::{Duration, Instant};

use basic_viewer::flow::{FrameBudget, FramePacer};

const INTERVAL: Duration = Duration::from_millis(15);

#[test]
fn first_frame_is_due_immediately() {
    let pacer = FramePacer::new(INTERVAL);
    let now = Instant::now();

    assert!(pacer.is_due(now));
    assert_eq!(pacer.remaining(now), Duration::ZERO);
    assert_eq!(pacer.interval(), INTERVAL);
}

#[test]
fn frames_wait_for_the_interval() {
    let mut pacer = FramePacer::new(INTERVAL);
    let start = Instant::now();

    assert_eq!(pacer.begin_frame(start), Duration::ZERO);

    let early = start + Duration::from_millis(5);
    assert!(!pacer.is_due(early));
    assert_eq!(pacer.remaining(early), Duration::from_millis(10));
    assert_eq!(pacer.next_deadline(early), start + INTERVAL);

    assert!(pacer.is_due(start + INTERVAL));
}

#[test]
fn late_frames_report_the_real_delta() {
    let mut pacer = FramePacer::new(INTERVAL);
    let start = Instant::now();
    pacer.begin_frame(start);

    let late = start + Duration::from_millis(40);
    assert!(pacer.is_due(late));
    assert_eq!(pacer.remaining(late), Duration::ZERO);
    assert_eq!(pacer.begin_frame(late), Duration::from_millis(40));
    assert_eq!(pacer.next_deadline(late), late + INTERVAL);
}

#[test]
fn zero_interval_is_always_due() {
    let mut pacer = FramePacer::new(Duration::ZERO);
    let now = Instant::now();
    pacer.begin_frame(now);

    assert!(pacer.is_due(now));
}

#[test]
fn skipped_frames_do_not_use_up_the_budget() {
    let mut budget = FrameBudget::new(Some(2));

    budget.record(false);
    budget.record(true);
    budget.record(false);
    assert_eq!(budget.presented(), 1);
    assert!(!budget.is_exhausted());

    budget.record(true);
    assert!(budget.is_exhausted());
}

#[test]
fn unlimited_budget_never_runs_out() {
    let mut budget = FrameBudget::new(None);
    for _ in 0..100 {
        budget.record(true);
    }

    assert_eq!(budget.presented(), 100);
    assert!(!budget.is_exhausted());
}
