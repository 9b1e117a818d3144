//! Scheduler loop lifecycle: startup, ticking, prompt shutdown.

use crate::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tessera_core::FakeClock;
use tessera_scheduler::{CronScheduler, SchedulerHost};

#[tokio::test(start_paused = true)]
async fn the_loop_ticks_until_shutdown() {
    let host = RecordingHost::with_crontab("* * * * * admin admins heartbeat\n");
    let scheduler = Arc::new(CronScheduler::new(
        FakeClock::new(),
        Arc::clone(&host) as Arc<dyn SchedulerHost>,
    ));

    let handle = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run().await }
    });

    while host.started().len() < 2 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    scheduler.shutdown();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop did not stop after shutdown")
        .unwrap();

    // let any sweep spawned just before shutdown finish
    tokio::time::sleep(Duration::from_millis(1)).await;

    // no further dispatch after the loop exits
    let after = host.started().len();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(host.started().len(), after);
}

#[tokio::test(start_paused = true)]
async fn shutdown_before_startup_exits_immediately() {
    let host = RecordingHost::with_crontab("");
    let scheduler = Arc::new(CronScheduler::new(
        FakeClock::new(),
        Arc::clone(&host) as Arc<dyn SchedulerHost>,
    ));

    scheduler.shutdown();
    let handle = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run().await }
    });
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop did not stop")
        .unwrap();
    assert!(host.started().is_empty());
}
