use aws_sdk_cloudwatch::types::{ComparisonOperator, Dimension, MetricAlarm, Statistic};

use crate::runtime::contract::{AlarmRecord, ErrorAlarmSpec};

/// Port over the remote monitoring service. Alarm records are keyed by name
/// on the remote side; `put_alarm` is an upsert.
#[allow(async_fn_in_trait)]
pub trait AlarmStore {
    async fn put_alarm(&self, spec: &ErrorAlarmSpec) -> Result<(), String>;
    async fn describe_alarms(&self, alarm_names: &[String]) -> Result<Vec<AlarmRecord>, String>;
    async fn delete_alarms(&self, alarm_names: &[String]) -> Result<(), String>;
}

pub struct CloudWatchAlarmStore {
    cloudwatch_client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchAlarmStore {
    pub fn new(cloudwatch_client: aws_sdk_cloudwatch::Client) -> Self {
        Self { cloudwatch_client }
    }
}

impl AlarmStore for CloudWatchAlarmStore {
    async fn put_alarm(&self, spec: &ErrorAlarmSpec) -> Result<(), String> {
        let mut request = self
            .cloudwatch_client
            .put_metric_alarm()
            .alarm_name(&spec.alarm_name)
            .metric_name(&spec.metric_name)
            .namespace(&spec.namespace)
            .statistic(Statistic::from(spec.statistic.as_str()))
            .comparison_operator(ComparisonOperator::from(spec.comparison_operator.as_str()))
            .threshold(spec.threshold)
            .period(spec.period_seconds)
            .evaluation_periods(spec.evaluation_periods)
            .actions_enabled(spec.actions_enabled)
            .alarm_description(&spec.alarm_description);

        for dimension in &spec.dimensions {
            request = request.dimensions(
                Dimension::builder()
                    .name(&dimension.name)
                    .value(&dimension.value)
                    .build(),
            );
        }
        for action in &spec.alarm_actions {
            request = request.alarm_actions(action);
        }

        request
            .send()
            .await
            .map(|_| ())
            .map_err(|error| format!("failed to put metric alarm {}: {error}", spec.alarm_name))
    }

    async fn describe_alarms(&self, alarm_names: &[String]) -> Result<Vec<AlarmRecord>, String> {
        let mut request = self.cloudwatch_client.describe_alarms();
        for alarm_name in alarm_names {
            request = request.alarm_names(alarm_name);
        }

        let output = request
            .send()
            .await
            .map_err(|error| format!("failed to describe alarms: {error}"))?;

        Ok(output
            .metric_alarms()
            .iter()
            .filter_map(alarm_record_from_metric_alarm)
            .collect())
    }

    async fn delete_alarms(&self, alarm_names: &[String]) -> Result<(), String> {
        let mut request = self.cloudwatch_client.delete_alarms();
        for alarm_name in alarm_names {
            request = request.alarm_names(alarm_name);
        }

        request
            .send()
            .await
            .map(|_| ())
            .map_err(|error| format!("failed to delete alarms: {error}"))
    }
}

fn alarm_record_from_metric_alarm(alarm: &MetricAlarm) -> Option<AlarmRecord> {
    Some(AlarmRecord {
        alarm_name: alarm.alarm_name()?.to_string(),
        alarm_arn: alarm.alarm_arn().map(str::to_string),
        state: alarm.state_value().map(|state| state.as_str().to_string()),
        metric_name: alarm.metric_name().map(str::to_string),
        namespace: alarm.namespace().map(str::to_string),
        threshold: alarm.threshold(),
        period_seconds: alarm.period(),
    })
}
