//! Crontab-driven job dispatch, end to end: crontab text in, job
//! starts out.

use crate::prelude::*;
use std::sync::Arc;
use tessera_core::FakeClock;
use tessera_scheduler::{CronScheduler, SchedulerHost};

fn scheduler_at(
    host: &Arc<RecordingHost>,
    minute: u32,
    second: u32,
) -> (CronScheduler<FakeClock>, FakeClock) {
    let clock = FakeClock::at(at(minute, second));
    let scheduler = CronScheduler::new(
        clock.clone(),
        Arc::clone(host) as Arc<dyn SchedulerHost>,
    );
    (scheduler, clock)
}

#[tokio::test]
async fn due_entries_fire_once_per_minute() {
    let host = RecordingHost::with_crontab(
        "5 * * * * admin admins publish\n* * * * * admin admins heartbeat\n",
    );
    let (scheduler, clock) = scheduler_at(&host, 4, 50);

    clock.set(at(5, 10));
    assert_eq!(scheduler.tick_once().await, 2);
    assert_eq!(host.started(), vec!["publish", "heartbeat"]);

    clock.set(at(6, 10));
    assert_eq!(scheduler.tick_once().await, 1);
    assert_eq!(host.started(), vec!["publish", "heartbeat", "heartbeat"]);
}

#[tokio::test]
async fn a_malformed_crontab_line_does_not_poison_the_rest() {
    let host = RecordingHost::with_crontab(
        "not a crontab line\n5 * * * * admin admins publish\n",
    );
    let (scheduler, clock) = scheduler_at(&host, 4, 50);

    clock.set(at(5, 10));
    assert_eq!(scheduler.tick_once().await, 1);
    assert_eq!(host.started(), vec!["publish"]);
    assert_eq!(scheduler.table().snapshot().len(), 1);
}

#[tokio::test]
async fn job_parameters_survive_the_round_trip() {
    let host = RecordingHost::with_crontab(
        "5 * * * * admin admins exportStatic /sites/default\n",
    );
    let (scheduler, clock) = scheduler_at(&host, 4, 50);

    clock.set(at(5, 10));
    scheduler.tick_once().await;

    let table = scheduler.table().snapshot();
    let entry = table.get(0).unwrap();
    assert_eq!(entry.job, "exportStatic");
    assert_eq!(entry.param.as_deref(), Some("/sites/default"));
    assert_eq!(entry.user, "admin");
    assert_eq!(entry.group, "admins");
}

#[tokio::test]
async fn crontab_edits_apply_on_the_next_tick() {
    let host = RecordingHost::with_crontab("* * * * * admin admins heartbeat\n");
    let (scheduler, clock) = scheduler_at(&host, 4, 50);

    clock.set(at(5, 10));
    scheduler.tick_once().await;

    host.set_crontab("* * * * * admin admins backup\n");
    clock.set(at(6, 10));
    scheduler.tick_once().await;

    assert_eq!(host.started(), vec!["heartbeat", "backup"]);
}

#[tokio::test]
async fn reload_failure_falls_back_to_the_previous_table() {
    let host = RecordingHost::with_crontab("* * * * * admin admins heartbeat\n");
    let (scheduler, clock) = scheduler_at(&host, 4, 50);

    clock.set(at(5, 10));
    assert_eq!(scheduler.tick_once().await, 1);

    host.fail_reloads(true);
    clock.set(at(6, 10));
    assert_eq!(scheduler.tick_once().await, 1);
    assert_eq!(host.started(), vec!["heartbeat", "heartbeat"]);
}

#[tokio::test]
async fn a_stalled_loop_collapses_missed_minutes_into_one_window() {
    let host = RecordingHost::with_crontab(
        "5 * * * * admin admins publish\n7 * * * * admin admins cleanup\n",
    );
    let (scheduler, clock) = scheduler_at(&host, 4, 50);

    // both the 10:05 and 10:07 rules fall inside the window (4, 8]
    clock.set(at(8, 10));
    assert_eq!(scheduler.tick_once().await, 2);
    assert_eq!(host.started(), vec!["publish", "cleanup"]);
}
