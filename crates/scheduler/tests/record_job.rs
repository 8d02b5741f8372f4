use configuration::{DatabaseSettings, JobSettings, JobsSettings};
use core_types::RandomPolicy;
use database::{connect, run_migrations, RecordRepository};
use pretty_assertions::assert_eq;
use scheduler::jobs::{self, record};
use scheduler::{Schedule, Scheduler};
use services::RecordService;
use std::time::Duration;

async fn service() -> RecordService {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        ..DatabaseSettings::default()
    };
    let pool = connect(&settings).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    RecordService::new(RecordRepository::new(pool, RandomPolicy::Latest))
}

#[tokio::test]
async fn job_inserts_the_canned_record() {
    let service = service().await;

    let id = record::create_canned_record(&service).await.expect("id");
    let created = service.find_by_id(id).await.expect("record");

    assert_eq!(created.field1, "Test Job");
    assert!(!created.field2);
}

#[tokio::test]
async fn job_reports_failure_without_panicking() {
    let service = service().await;
    service.repository().pool().close().await;

    assert!(record::create_canned_record(&service).await.is_none());
}

#[tokio::test]
async fn registered_job_can_be_triggered_manually() {
    let service = service().await;
    let scheduler = Scheduler::new();
    record::register(&scheduler, service.clone(), Schedule::daily(6, 0).unwrap())
        .await
        .unwrap();

    assert!(scheduler.run_now(record::JOB_ID).await);
    assert!(scheduler.run_now(record::JOB_ID).await);
    assert_eq!(service.repository().count().await.unwrap(), 2);
}

#[tokio::test]
async fn register_all_respects_configuration() {
    let service = service().await;

    let scheduler = Scheduler::new();
    let settings = JobsSettings {
        create_record: JobSettings {
            interval_secs: Some(30),
            ..JobSettings::default()
        },
    };
    jobs::register_all(&scheduler, &service, &settings).await.unwrap();
    let info = scheduler.get_job(record::JOB_ID).await.expect("registered");
    assert_eq!(info.schedule, Schedule::Interval(Duration::from_secs(30)));

    let disabled = Scheduler::new();
    let settings = JobsSettings {
        create_record: JobSettings {
            enabled: false,
            ..JobSettings::default()
        },
    };
    jobs::register_all(&disabled, &service, &settings).await.unwrap();
    assert!(disabled.job_ids().await.is_empty());
}
