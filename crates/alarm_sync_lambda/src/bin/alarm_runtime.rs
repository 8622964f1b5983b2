use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Deserialize;
use serde_json::Value;

use alarm_sync_lambda::adapters::alarm_store::CloudWatchAlarmStore;
use alarm_sync_lambda::adapters::function_catalog::LambdaFunctionCatalog;
use alarm_sync_lambda::handlers::alarm::{delete_error_alarm, find_existing_alarm};
use alarm_sync_lambda::handlers::sync::{synchronize_all, SyncSettings};
use alarm_sync_lambda::runtime::contract::DEFAULT_SYNC_WORKERS;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
enum AlarmCommand {
    UpdateAlarms {
        errors_threshold: Option<f64>,
        errors_period: Option<i32>,
    },
    GetAlarm {
        function_name: String,
    },
    DeleteAlarm {
        function_name: String,
    },
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let command: AlarmCommand = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid alarm command: {error}")))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let alarm_store = CloudWatchAlarmStore::new(aws_sdk_cloudwatch::Client::new(&aws_config));

    match command {
        AlarmCommand::UpdateAlarms {
            errors_threshold,
            errors_period,
        } => {
            let notification_target = std::env::var("SNS_ALARMS_TOPIC")
                .map_err(|_| Error::from("SNS_ALARMS_TOPIC must be configured"))?;
            let function_name_prefix = std::env::var("ALARM_FUNCTION_PREFIX").ok();
            let sync_workers = match std::env::var("ALARM_SYNC_WORKERS") {
                Ok(value) => value
                    .parse::<usize>()
                    .map_err(|_| Error::from("ALARM_SYNC_WORKERS must be an integer"))?,
                Err(_) => DEFAULT_SYNC_WORKERS,
            };

            let mut settings = SyncSettings::new(notification_target);
            if let Some(threshold) = errors_threshold {
                settings.errors_threshold = threshold;
            }
            if let Some(period) = errors_period {
                settings.errors_period_seconds = period;
            }
            settings.sync_workers = sync_workers;

            let catalog = LambdaFunctionCatalog::new(
                aws_sdk_lambda::Client::new(&aws_config),
                function_name_prefix,
            );
            let summary = synchronize_all(&catalog, &alarm_store, &settings)
                .await
                .map_err(|error| Error::from(error.message))?;
            serde_json::to_value(summary)
                .map_err(|error| Error::from(format!("failed to serialize sync summary: {error}")))
        }
        AlarmCommand::GetAlarm { function_name } => {
            let alarm = find_existing_alarm(&alarm_store, &function_name)
                .await
                .map_err(Error::from)?;
            serde_json::to_value(alarm)
                .map_err(|error| Error::from(format!("failed to serialize alarm record: {error}")))
        }
        AlarmCommand::DeleteAlarm { function_name } => {
            let outcome = delete_error_alarm(&alarm_store, &function_name)
                .await
                .map_err(Error::from)?;
            serde_json::to_value(outcome).map_err(|error| {
                Error::from(format!("failed to serialize delete outcome: {error}"))
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
