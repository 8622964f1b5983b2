pub const ERROR_ALARM_PREFIX: &str = "LambdaError_";

/// Alarm names are a pure function of the monitored function name, so a
/// repeated upsert lands on the same remote record.
pub fn error_alarm_name(function_name: &str) -> String {
    format!("{ERROR_ALARM_PREFIX}{function_name}")
}

pub fn error_alarm_description(function_name: &str) -> String {
    format!("Alarm for lambda {function_name} errors")
}
