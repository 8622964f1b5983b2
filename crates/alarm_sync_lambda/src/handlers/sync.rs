use futures::stream::{self, StreamExt};
use serde_json::json;

use crate::adapters::alarm_store::AlarmStore;
use crate::adapters::function_catalog::FunctionCatalog;
use crate::handlers::alarm::ensure_error_alarm;
use crate::logging::{log_error, log_info};
use crate::runtime::contract::{
    AlarmSyncOutcome, AlarmSyncSummary, DEFAULT_ERRORS_PERIOD_SECONDS, DEFAULT_ERRORS_THRESHOLD,
    DEFAULT_SYNC_WORKERS, SYNC_OUTCOME_CREATED, SYNC_OUTCOME_FAILED,
};
use crate::runtime::naming::error_alarm_name;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub errors_threshold: f64,
    pub errors_period_seconds: i32,
    pub notification_target: String,
    pub sync_workers: usize,
}

impl SyncSettings {
    pub fn new(notification_target: impl Into<String>) -> Self {
        Self {
            errors_threshold: DEFAULT_ERRORS_THRESHOLD,
            errors_period_seconds: DEFAULT_ERRORS_PERIOD_SECONDS,
            notification_target: notification_target.into(),
            sync_workers: DEFAULT_SYNC_WORKERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError {
    pub message: String,
}

/// Upsert the error alarm for every applicable function through a
/// fixed-width fan-out. Tasks are submitted in enumeration order and
/// consumed as they complete; the call returns only once every task has
/// finished. A failing task surfaces in its own outcome and never aborts
/// its siblings. Only enumeration failure fails the run, before any task
/// is submitted.
pub async fn synchronize_all(
    catalog: &impl FunctionCatalog,
    store: &impl AlarmStore,
    settings: &SyncSettings,
) -> Result<AlarmSyncSummary, SyncError> {
    let functions = catalog
        .list_applicable_functions()
        .await
        .map_err(|error| SyncError {
            message: format!("failed to enumerate applicable functions: {error}"),
        })?;
    let functions_discovered = functions.len();

    log_info(
        "alarm_sync",
        "sync_started",
        json!({
            "functions_discovered": functions_discovered,
            "errors_threshold": settings.errors_threshold,
            "errors_period_seconds": settings.errors_period_seconds,
            "sync_workers": settings.sync_workers,
        }),
    );

    // Width 0 would never poll a task.
    let width = settings.sync_workers.max(1);
    let mut completions = stream::iter(functions.keys())
        .map(|function_name| async move {
            let result = ensure_error_alarm(
                store,
                function_name,
                settings.errors_threshold,
                settings.errors_period_seconds,
                &settings.notification_target,
            )
            .await;
            (function_name.clone(), result)
        })
        .buffer_unordered(width);

    let mut outcomes = Vec::with_capacity(functions_discovered);
    let mut alarms_created = 0usize;
    let mut alarms_failed = 0usize;

    while let Some((function_name, result)) = completions.next().await {
        let outcome = match result {
            Ok(spec) => {
                alarms_created += 1;
                log_info(
                    "alarm_sync",
                    "alarm_upserted",
                    json!({
                        "function_name": function_name.clone(),
                        "alarm_name": spec.alarm_name.clone(),
                        "threshold": spec.threshold,
                        "period_seconds": spec.period_seconds,
                    }),
                );
                AlarmSyncOutcome {
                    function_name,
                    alarm_name: spec.alarm_name,
                    status: SYNC_OUTCOME_CREATED.to_string(),
                    error: None,
                }
            }
            Err(error) => {
                alarms_failed += 1;
                let alarm_name = error_alarm_name(&function_name);
                log_error(
                    "alarm_sync",
                    "alarm_upsert_failed",
                    json!({
                        "function_name": function_name.clone(),
                        "alarm_name": alarm_name.clone(),
                        "error": error.clone(),
                    }),
                );
                AlarmSyncOutcome {
                    function_name,
                    alarm_name,
                    status: SYNC_OUTCOME_FAILED.to_string(),
                    error: Some(error),
                }
            }
        };
        outcomes.push(outcome);
    }

    log_info(
        "alarm_sync",
        "sync_completed",
        json!({
            "functions_discovered": functions_discovered,
            "alarms_created": alarms_created,
            "alarms_failed": alarms_failed,
        }),
    );

    Ok(AlarmSyncSummary {
        functions_discovered,
        alarms_created,
        alarms_failed,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::runtime::contract::{
        AlarmRecord, ErrorAlarmSpec, FunctionListing, FunctionMetadata,
    };

    struct StaticCatalog {
        functions: FunctionListing,
    }

    impl StaticCatalog {
        fn with_functions(names: &[&str]) -> Self {
            let functions = names
                .iter()
                .map(|name| (name.to_string(), FunctionMetadata::default()))
                .collect::<BTreeMap<_, _>>();
            Self { functions }
        }
    }

    impl FunctionCatalog for StaticCatalog {
        async fn list_applicable_functions(&self) -> Result<FunctionListing, String> {
            Ok(self.functions.clone())
        }
    }

    struct FailingCatalog;

    impl FunctionCatalog for FailingCatalog {
        async fn list_applicable_functions(&self) -> Result<FunctionListing, String> {
            Err("simulated enumeration failure".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingAlarmStore {
        upserts: Mutex<Vec<ErrorAlarmSpec>>,
        fail_functions: Vec<String>,
    }

    impl RecordingAlarmStore {
        fn failing_for(names: &[&str]) -> Self {
            Self {
                upserts: Mutex::new(Vec::new()),
                fail_functions: names.iter().map(|name| name.to_string()).collect(),
            }
        }

        fn upserts(&self) -> Vec<ErrorAlarmSpec> {
            self.upserts.lock().expect("poisoned mutex").clone()
        }
    }

    impl AlarmStore for RecordingAlarmStore {
        async fn put_alarm(&self, spec: &ErrorAlarmSpec) -> Result<(), String> {
            if self.fail_functions.contains(&spec.function_name) {
                return Err(format!(
                    "simulated put failure for {}",
                    spec.function_name
                ));
            }
            self.upserts
                .lock()
                .expect("poisoned mutex")
                .push(spec.clone());
            Ok(())
        }

        async fn describe_alarms(
            &self,
            _alarm_names: &[String],
        ) -> Result<Vec<AlarmRecord>, String> {
            Ok(Vec::new())
        }

        async fn delete_alarms(&self, _alarm_names: &[String]) -> Result<(), String> {
            Ok(())
        }
    }

    /// Tracks how many upserts are in flight at once; each call suspends
    /// twice so overlapping tasks can be observed.
    #[derive(Default)]
    struct GaugedAlarmStore {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        completed: AtomicUsize,
    }

    impl AlarmStore for GaugedAlarmStore {
        async fn put_alarm(&self, _spec: &ErrorAlarmSpec) -> Result<(), String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn describe_alarms(
            &self,
            _alarm_names: &[String],
        ) -> Result<Vec<AlarmRecord>, String> {
            Ok(Vec::new())
        }

        async fn delete_alarms(&self, _alarm_names: &[String]) -> Result<(), String> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn sync_creates_one_alarm_per_function_and_waits_for_all() {
        let catalog = StaticCatalog::with_functions(&["fnA", "fnB", "fnC"]);
        let store = RecordingAlarmStore::default();
        let settings = SyncSettings::new("arn:aws:sns:topic");

        let summary = synchronize_all(&catalog, &store, &settings)
            .await
            .expect("sync should succeed");

        assert_eq!(summary.functions_discovered, 3);
        assert_eq!(summary.alarms_created, 3);
        assert_eq!(summary.alarms_failed, 0);
        assert_eq!(summary.outcomes.len(), 3);
        assert_eq!(store.upserts().len(), 3);
    }

    #[tokio::test]
    async fn sync_applies_threshold_and_period_to_each_function() {
        let catalog = StaticCatalog::with_functions(&["fnA", "fnB"]);
        let store = RecordingAlarmStore::default();
        let settings = SyncSettings::new("arn:aws:sns:topic");

        synchronize_all(&catalog, &store, &settings)
            .await
            .expect("sync should succeed");

        let mut upserts = store.upserts();
        upserts.sort_by(|left, right| left.alarm_name.cmp(&right.alarm_name));
        assert_eq!(upserts.len(), 2);

        assert_eq!(upserts[0].alarm_name, "LambdaError_fnA");
        assert_eq!(upserts[1].alarm_name, "LambdaError_fnB");
        for (upsert, function_name) in upserts.iter().zip(["fnA", "fnB"]) {
            assert_eq!(upsert.threshold, 1.0);
            assert_eq!(upsert.period_seconds, 60);
            assert_eq!(upsert.dimensions[0].value, function_name);
        }
    }

    #[tokio::test]
    async fn failing_task_does_not_abort_siblings() {
        let catalog = StaticCatalog::with_functions(&["fnA", "fnB", "fnC"]);
        let store = RecordingAlarmStore::failing_for(&["fnB"]);
        let settings = SyncSettings::new("arn:aws:sns:topic");

        let summary = synchronize_all(&catalog, &store, &settings)
            .await
            .expect("sync should complete despite the failed task");

        assert_eq!(summary.alarms_created, 2);
        assert_eq!(summary.alarms_failed, 1);

        let failed = summary
            .outcomes
            .iter()
            .find(|outcome| outcome.status == SYNC_OUTCOME_FAILED)
            .expect("failed outcome should be reported");
        assert_eq!(failed.function_name, "fnB");
        assert_eq!(failed.alarm_name, "LambdaError_fnB");
        assert!(failed
            .error
            .as_deref()
            .expect("failed outcome should carry the error")
            .contains("simulated put failure"));

        let upserted: Vec<String> = store
            .upserts()
            .iter()
            .map(|spec| spec.function_name.clone())
            .collect();
        assert!(upserted.contains(&"fnA".to_string()));
        assert!(upserted.contains(&"fnC".to_string()));
    }

    #[tokio::test]
    async fn enumeration_failure_submits_no_tasks() {
        let store = RecordingAlarmStore::default();
        let settings = SyncSettings::new("arn:aws:sns:topic");

        let error = synchronize_all(&FailingCatalog, &store, &settings)
            .await
            .expect_err("sync should fail when enumeration fails");

        assert!(error.message.contains("simulated enumeration failure"));
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn fan_out_respects_the_configured_width() {
        let catalog = StaticCatalog::with_functions(&["fnA", "fnB", "fnC", "fnD", "fnE"]);
        let store = GaugedAlarmStore::default();
        let mut settings = SyncSettings::new("arn:aws:sns:topic");
        settings.sync_workers = 2;

        let summary = synchronize_all(&catalog, &store, &settings)
            .await
            .expect("sync should succeed");

        assert_eq!(summary.alarms_created, 5);
        assert_eq!(store.completed.load(Ordering::SeqCst), 5);
        let max_in_flight = store.max_in_flight.load(Ordering::SeqCst);
        assert!(max_in_flight <= 2, "observed width {max_in_flight}");
        assert!(max_in_flight >= 2, "tasks never overlapped");
    }
}
