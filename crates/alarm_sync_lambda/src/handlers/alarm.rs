use serde_json::json;

use crate::adapters::alarm_store::AlarmStore;
use crate::logging::log_info;
use crate::runtime::contract::{AlarmRecord, DeleteAlarmOutcome, ErrorAlarmSpec};
use crate::runtime::naming::error_alarm_name;

/// Upsert the error alarm for one function. Remote failures propagate
/// untouched; the caller decides whether they abort anything.
pub async fn ensure_error_alarm(
    store: &impl AlarmStore,
    function_name: &str,
    threshold: f64,
    period_seconds: i32,
    notification_target: &str,
) -> Result<ErrorAlarmSpec, String> {
    let spec =
        ErrorAlarmSpec::for_function(function_name, threshold, period_seconds, notification_target);
    store.put_alarm(&spec).await?;
    Ok(spec)
}

/// Exact-name lookup. An empty or non-matching response is `Ok(None)`, not
/// an error.
pub async fn find_existing_alarm(
    store: &impl AlarmStore,
    function_name: &str,
) -> Result<Option<AlarmRecord>, String> {
    let alarm_name = error_alarm_name(function_name);
    let alarms = store
        .describe_alarms(std::slice::from_ref(&alarm_name))
        .await?;

    Ok(alarms
        .into_iter()
        .find(|alarm| alarm.alarm_name == alarm_name))
}

/// Delete the function's error alarm if it exists. Deleting an alarm that
/// was never created is a logged no-op, never an error.
pub async fn delete_error_alarm(
    store: &impl AlarmStore,
    function_name: &str,
) -> Result<DeleteAlarmOutcome, String> {
    match find_existing_alarm(store, function_name).await? {
        Some(existing) => {
            store
                .delete_alarms(std::slice::from_ref(&existing.alarm_name))
                .await?;
            log_info(
                "alarm_handler",
                "alarm_deleted",
                json!({
                    "function_name": function_name,
                    "alarm_name": existing.alarm_name.clone(),
                }),
            );
            Ok(DeleteAlarmOutcome::Deleted {
                alarm_name: existing.alarm_name,
            })
        }
        None => {
            log_info(
                "alarm_handler",
                "no_alarms_found",
                json!({ "function_name": function_name }),
            );
            Ok(DeleteAlarmOutcome::NotFound {
                function_name: function_name.to_string(),
            })
        }
    }
}
