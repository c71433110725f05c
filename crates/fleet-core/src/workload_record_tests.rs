use super::*;
use crate::FakeClock;
use std::time::Duration;

#[test]
fn new_record_starts_in_init() {
    let clock = FakeClock::new();
    let rec = WorkloadRecord::new("wl-1", &clock);
    assert_eq!(rec.status, Status::Init);
}

#[test]
fn set_status_refreshes_timestamp_on_change() {
    let clock = FakeClock::new();
    let mut rec = WorkloadRecord::new("wl-1", &clock);
    let t0 = rec.last_status_change;

    clock.advance(Duration::from_secs(5));
    rec.set_status(Status::Running, &clock);

    assert_eq!(rec.status, Status::Running);
    assert!(rec.last_status_change > t0);
}

#[test]
fn set_status_is_noop_when_unchanged() {
    let clock = FakeClock::new();
    let mut rec = WorkloadRecord::new("wl-1", &clock);
    let t0 = rec.last_status_change;

    clock.advance(Duration::from_secs(5));
    rec.set_status(Status::Init, &clock);

    assert_eq!(rec.last_status_change, t0);
}
