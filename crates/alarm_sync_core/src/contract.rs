use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::naming::{error_alarm_description, error_alarm_name};

pub const ERRORS_METRIC_NAME: &str = "Errors";
pub const LAMBDA_METRIC_NAMESPACE: &str = "AWS/Lambda";
pub const ERRORS_STATISTIC: &str = "Sum";
pub const ERRORS_COMPARISON_OPERATOR: &str = "GreaterThanThreshold";
pub const FUNCTION_NAME_DIMENSION: &str = "FunctionName";

pub const DEFAULT_ERRORS_THRESHOLD: f64 = 1.0;
pub const DEFAULT_ERRORS_PERIOD_SECONDS: i32 = 60;
pub const DEFAULT_EVALUATION_PERIODS: i32 = 1;
pub const DEFAULT_SYNC_WORKERS: usize = 10;

/// Enumeration result keyed by function name. Metadata values are carried
/// for observability; the synchronizer only consumes the key set.
pub type FunctionListing = BTreeMap<String, FunctionMetadata>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmDimension {
    pub name: String,
    pub value: String,
}

/// Fully resolved upsert request for one function's error alarm. The remote
/// service keys alarms by `alarm_name`, so a second put with the same name
/// overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorAlarmSpec {
    pub alarm_name: String,
    pub function_name: String,
    pub metric_name: String,
    pub namespace: String,
    pub statistic: String,
    pub comparison_operator: String,
    pub threshold: f64,
    pub period_seconds: i32,
    pub evaluation_periods: i32,
    pub actions_enabled: bool,
    pub alarm_description: String,
    pub dimensions: Vec<AlarmDimension>,
    pub alarm_actions: Vec<String>,
}

impl ErrorAlarmSpec {
    pub fn for_function(
        function_name: &str,
        threshold: f64,
        period_seconds: i32,
        notification_target: &str,
    ) -> Self {
        Self {
            alarm_name: error_alarm_name(function_name),
            function_name: function_name.to_string(),
            metric_name: ERRORS_METRIC_NAME.to_string(),
            namespace: LAMBDA_METRIC_NAMESPACE.to_string(),
            statistic: ERRORS_STATISTIC.to_string(),
            comparison_operator: ERRORS_COMPARISON_OPERATOR.to_string(),
            threshold,
            period_seconds,
            evaluation_periods: DEFAULT_EVALUATION_PERIODS,
            actions_enabled: true,
            alarm_description: error_alarm_description(function_name),
            dimensions: vec![AlarmDimension {
                name: FUNCTION_NAME_DIMENSION.to_string(),
                value: function_name.to_string(),
            }],
            alarm_actions: vec![notification_target.to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FunctionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

/// The remote service's view of an alarm, as reported by an exact-name
/// lookup. The service owns the record; nothing is persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmRecord {
    pub alarm_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i32>,
}

pub const SYNC_OUTCOME_CREATED: &str = "created";
pub const SYNC_OUTCOME_FAILED: &str = "failed";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmSyncOutcome {
    pub function_name: String,
    pub alarm_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Barrier result of one synchronization run. `outcomes` is in completion
/// order, which is not submission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmSyncSummary {
    pub functions_discovered: usize,
    pub alarms_created: usize,
    pub alarms_failed: usize,
    pub outcomes: Vec<AlarmSyncOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeleteAlarmOutcome {
    Deleted { alarm_name: String },
    NotFound { function_name: String },
}
