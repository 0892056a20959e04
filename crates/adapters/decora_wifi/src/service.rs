//! Fan service calls decoded from their JSON payload.

use serde::Deserialize;

use minihub_domain::error::{MiniHubError, ValidationError};

use crate::speed::FanSpeed;

/// A validated fan service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCommand {
    TurnOn(Option<FanSpeed>),
    TurnOff,
    SetSpeed(FanSpeed),
    Update,
}

#[derive(Deserialize)]
struct SpeedData {
    #[serde(default)]
    speed: Option<FanSpeed>,
}

impl FanCommand {
    /// Decode `service` and its `data`.
    ///
    /// `null` data is treated as an empty object.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnsupportedService`] for an unknown service,
    /// [`ValidationError::InvalidServiceData`] for a missing or unknown speed.
    pub fn parse(service: &str, data: &serde_json::Value) -> Result<Self, MiniHubError> {
        match service {
            "turn_on" => Ok(Self::TurnOn(requested_speed(service, data)?)),
            "turn_off" => Ok(Self::TurnOff),
            "set_speed" => requested_speed(service, data)?
                .map(Self::SetSpeed)
                .ok_or_else(|| invalid_speed(service)),
            "update" => Ok(Self::Update),
            other => Err(ValidationError::UnsupportedService {
                service: other.to_string(),
            }
            .into()),
        }
    }
}

fn requested_speed(
    service: &str,
    data: &serde_json::Value,
) -> Result<Option<FanSpeed>, MiniHubError> {
    if data.is_null() {
        return Ok(None);
    }
    SpeedData::deserialize(data)
        .map(|parsed| parsed.speed)
        .map_err(|_| invalid_speed(service))
}

fn invalid_speed(service: &str) -> MiniHubError {
    ValidationError::InvalidServiceData {
        service: service.to_string(),
        field: "speed",
    }
    .into()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn validation(result: Result<FanCommand, MiniHubError>) -> ValidationError {
        match result {
            Err(MiniHubError::Validation(err)) => err,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn should_parse_turn_on_with_and_without_speed() {
        assert_eq!(
            FanCommand::parse("turn_on", &json!({})).unwrap(),
            FanCommand::TurnOn(None)
        );
        assert_eq!(
            FanCommand::parse("turn_on", &serde_json::Value::Null).unwrap(),
            FanCommand::TurnOn(None)
        );
        assert_eq!(
            FanCommand::parse("turn_on", &json!({"speed": "low"})).unwrap(),
            FanCommand::TurnOn(Some(FanSpeed::Low))
        );
    }

    #[test]
    fn should_parse_set_speed() {
        assert_eq!(
            FanCommand::parse("set_speed", &json!({"speed": "max"})).unwrap(),
            FanCommand::SetSpeed(FanSpeed::Max)
        );
    }

    #[test]
    fn should_ignore_data_for_turn_off_and_update() {
        assert_eq!(
            FanCommand::parse("turn_off", &json!({"speed": "turbo"})).unwrap(),
            FanCommand::TurnOff
        );
        assert_eq!(
            FanCommand::parse("update", &json!(null)).unwrap(),
            FanCommand::Update
        );
    }

    #[test]
    fn should_reject_set_speed_without_speed() {
        assert_eq!(
            validation(FanCommand::parse("set_speed", &json!({}))),
            ValidationError::InvalidServiceData {
                service: "set_speed".to_string(),
                field: "speed",
            }
        );
    }

    #[test]
    fn should_reject_unknown_speed() {
        for (service, data) in [
            ("set_speed", json!({"speed": "turbo"})),
            ("turn_on", json!({"speed": "off"})),
            ("turn_on", json!({"speed": 50})),
            ("turn_on", json!("fast")),
        ] {
            assert!(
                matches!(
                    validation(FanCommand::parse(service, &data)),
                    ValidationError::InvalidServiceData { field: "speed", .. }
                ),
                "{service}"
            );
        }
    }

    #[test]
    fn should_reject_unknown_service() {
        assert_eq!(
            validation(FanCommand::parse("toggle", &json!({}))),
            ValidationError::UnsupportedService {
                service: "toggle".to_string()
            }
        );
    }
}
