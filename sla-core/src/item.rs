//! Agreement terms and submitted evidence.
//!
//! Both travel as one flat record whose meaningful fields depend on the item
//! code. They are decoded into sum types here so the evaluators never read a
//! field that does not belong to their category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::codes;

/// Terms of an airport shuttle agreement, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuttleTerms {
    pub driver_max_wait_time: u32,
    pub customer_short_wait_time: u32,
    pub customer_long_wait_time: u32,
}

/// Terms of a sauna availability agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaunaTerms {
    pub max_failures: u32,
    /// Minutes two failures must be apart to count separately
    pub min_time_between_2_failures: u32,
}

/// A facility-style term: an item code and a minimum quantity (0 = any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityTerm {
    pub code: String,
    pub quantity: u32,
}

/// A single required term of an agreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord", into = "ItemRecord")]
pub enum AgreementItem {
    AirportShuttle(ShuttleTerms),
    Sauna(SaunaTerms),
    RoomSize { value: f64 },
    Facility(FacilityTerm),
}

impl AgreementItem {
    /// Item code of this term.
    pub fn code(&self) -> &str {
        match self {
            Self::AirportShuttle(_) => codes::SERVICE_AIRPORT_SHUTTLE,
            Self::Sauna(_) => codes::SERVICE_SAUNA,
            Self::RoomSize { .. } => codes::ROOM_DESIGN_SIZE,
            Self::Facility(term) => &term.code,
        }
    }

    /// Required quantity; only facility terms carry one.
    pub fn quantity(&self) -> u32 {
        match self {
            Self::Facility(term) => term.quantity,
            _ => 0,
        }
    }
}

/// Wire shape of an agreement item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    driver_max_wait_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    customer_short_wait_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    customer_long_wait_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_failures: Option<u32>,
    #[serde(default, rename = "minTimeBetween2Failures", skip_serializing_if = "Option::is_none")]
    min_time_between_2_failures: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
}

impl TryFrom<ItemRecord> for AgreementItem {
    type Error = String;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let item = match record.code.as_str() {
            codes::SERVICE_AIRPORT_SHUTTLE => Self::AirportShuttle(ShuttleTerms {
                driver_max_wait_time: record.driver_max_wait_time.unwrap_or(0),
                customer_short_wait_time: record.customer_short_wait_time.unwrap_or(0),
                customer_long_wait_time: record.customer_long_wait_time.unwrap_or(0),
            }),
            codes::SERVICE_SAUNA => Self::Sauna(SaunaTerms {
                max_failures: record.max_failures.unwrap_or(0),
                min_time_between_2_failures: record.min_time_between_2_failures.unwrap_or(0),
            }),
            codes::ROOM_DESIGN_SIZE => Self::RoomSize {
                value: numeric_value(record.value.as_ref(), &record.code)?,
            },
            _ => Self::Facility(FacilityTerm {
                code: record.code,
                quantity: record.quantity.unwrap_or(0),
            }),
        };
        Ok(item)
    }
}

impl From<AgreementItem> for ItemRecord {
    fn from(item: AgreementItem) -> Self {
        match item {
            AgreementItem::AirportShuttle(terms) => Self {
                code: codes::SERVICE_AIRPORT_SHUTTLE.to_string(),
                driver_max_wait_time: Some(terms.driver_max_wait_time),
                customer_short_wait_time: Some(terms.customer_short_wait_time),
                customer_long_wait_time: Some(terms.customer_long_wait_time),
                ..Default::default()
            },
            AgreementItem::Sauna(terms) => Self {
                code: codes::SERVICE_SAUNA.to_string(),
                max_failures: Some(terms.max_failures),
                min_time_between_2_failures: Some(terms.min_time_between_2_failures),
                ..Default::default()
            },
            AgreementItem::RoomSize { value } => Self {
                code: codes::ROOM_DESIGN_SIZE.to_string(),
                value: Some(serde_json::Value::from(value)),
                ..Default::default()
            },
            AgreementItem::Facility(term) => Self {
                code: term.code,
                quantity: Some(term.quantity),
                ..Default::default()
            },
        }
    }
}

fn numeric_value(value: Option<&serde_json::Value>, code: &str) -> Result<f64, String> {
    match value {
        Some(v) => v
            .as_f64()
            .ok_or_else(|| format!("value of item {code} must be numeric, got {v}")),
        None => Err(format!("item {code} requires a numeric value")),
    }
}

/// Lifecycle status of an airport shuttle booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuttleStatus {
    Confirmed,
    DriverWaiting,
    InService,
    Completed,
    NotServed,
    WaitingTimeExceeded,
    Canceled,
}

impl ShuttleStatus {
    /// Whether the booking reached a state that can be evaluated.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::DriverWaiting | Self::InService)
    }
}

/// Observed timeline of one shuttle booking.
#[derive(Debug, Clone, PartialEq)]
pub struct ShuttleTrip {
    pub status: ShuttleStatus,
    pub pick_up_time: Option<DateTime<Utc>>,
    pub driver_arrive_at: Option<DateTime<Utc>>,
    pub customer_check_in_at: Option<DateTime<Utc>>,
    pub last_updated_arrival_time_by_customer_at: Option<DateTime<Utc>>,
    pub driver_notify_customer_do_not_show_up_at: Option<DateTime<Utc>>,
}

/// Outcome of one sauna request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaunaStatus {
    Success,
    Fail,
}

/// A single sauna request made by a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaunaRequest {
    pub request_at: DateTime<Utc>,
    pub status: SaunaStatus,
}

/// A facility observed in the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedFacility {
    pub code: String,
    pub name: Option<String>,
    pub quantity: u32,
}

/// Evidence submitted for one item code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "EvidenceRecord")]
pub enum Evidence {
    AirportShuttle(ShuttleTrip),
    Sauna(Vec<SaunaRequest>),
    RoomSize { value: f64 },
    Facility(ObservedFacility),
}

impl Evidence {
    /// Item code this evidence was submitted for.
    pub fn code(&self) -> &str {
        match self {
            Self::AirportShuttle(_) => codes::SERVICE_AIRPORT_SHUTTLE,
            Self::Sauna(_) => codes::SERVICE_SAUNA,
            Self::RoomSize { .. } => codes::ROOM_DESIGN_SIZE,
            Self::Facility(observed) => &observed.code,
        }
    }

    /// Observed quantity; only facility evidence carries one.
    pub fn quantity(&self) -> u32 {
        match self {
            Self::Facility(observed) => observed.quantity,
            _ => 0,
        }
    }

    /// Facility evidence without a name.
    pub fn facility(code: impl Into<String>, quantity: u32) -> Self {
        Self::Facility(ObservedFacility {
            code: code.into(),
            name: None,
            quantity,
        })
    }
}

/// Wire shape of a piece of evidence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvidenceRecord {
    code: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Option<u32>,
    #[serde(default)]
    pick_up_time: Option<DateTime<Utc>>,
    #[serde(default)]
    driver_arrive_at: Option<DateTime<Utc>>,
    #[serde(default)]
    customer_check_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_updated_arrival_time_by_customer_at: Option<DateTime<Utc>>,
    #[serde(default)]
    driver_notify_customer_do_not_show_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Option<ShuttleStatus>,
    #[serde(default)]
    sauna_requests: Option<Vec<SaunaRequest>>,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

impl TryFrom<EvidenceRecord> for Evidence {
    type Error = String;

    fn try_from(record: EvidenceRecord) -> Result<Self, Self::Error> {
        let evidence = match record.code.as_str() {
            codes::SERVICE_AIRPORT_SHUTTLE => Self::AirportShuttle(ShuttleTrip {
                status: record
                    .status
                    .ok_or_else(|| "airport shuttle evidence requires a status".to_string())?,
                pick_up_time: record.pick_up_time,
                driver_arrive_at: record.driver_arrive_at,
                customer_check_in_at: record.customer_check_in_at,
                last_updated_arrival_time_by_customer_at: record
                    .last_updated_arrival_time_by_customer_at,
                driver_notify_customer_do_not_show_up_at: record
                    .driver_notify_customer_do_not_show_up_at,
            }),
            codes::SERVICE_SAUNA => Self::Sauna(record.sauna_requests.unwrap_or_default()),
            codes::ROOM_DESIGN_SIZE => Self::RoomSize {
                value: numeric_value(record.value.as_ref(), &record.code)?,
            },
            _ => Self::Facility(ObservedFacility {
                code: record.code,
                name: record.name,
                quantity: record.quantity.unwrap_or(0),
            }),
        };
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_decoded_by_code() {
        let items: Vec<AgreementItem> = serde_json::from_value(json!([
            {"code": "SAS001", "driverMaxWaitTime": 30, "customerShortWaitTime": 10, "customerLongWaitTime": 15},
            {"code": "SSA001", "maxFailures": 2, "minTimeBetween2Failures": 10},
            {"code": "RSI001", "value": 25},
            {"code": "ITV001", "quantity": 1}
        ]))
        .unwrap();

        assert!(matches!(items[0], AgreementItem::AirportShuttle(t) if t.customer_long_wait_time == 15));
        assert!(matches!(items[1], AgreementItem::Sauna(t) if t.min_time_between_2_failures == 10));
        assert_eq!(items[2], AgreementItem::RoomSize { value: 25.0 });
        assert_eq!(items[3].code(), "ITV001");
        assert_eq!(items[3].quantity(), 1);
    }

    #[test]
    fn test_room_size_requires_number() {
        let err = serde_json::from_value::<AgreementItem>(json!({"code": "RSI001", "value": "big"}))
            .unwrap_err();
        assert!(err.to_string().contains("must be numeric"));

        let err = serde_json::from_value::<Evidence>(json!({"code": "RSI001"})).unwrap_err();
        assert!(err.to_string().contains("requires a numeric value"));
    }

    #[test]
    fn test_shuttle_evidence_timestamps() {
        let evidence: Evidence = serde_json::from_value(json!({
            "code": "SAS001",
            "status": "completed",
            "pickUpTime": "2021-03-01T10:00:00.000Z",
            "driverArriveAt": "2021-03-01T10:05:00.000Z"
        }))
        .unwrap();

        let Evidence::AirportShuttle(trip) = evidence else {
            panic!("expected shuttle evidence");
        };
        assert_eq!(trip.status, ShuttleStatus::Completed);
        assert!(trip.driver_arrive_at > trip.pick_up_time);
        assert!(trip.driver_notify_customer_do_not_show_up_at.is_none());
    }

    #[test]
    fn test_shuttle_evidence_requires_status() {
        let result = serde_json::from_value::<Evidence>(json!({"code": "SAS001"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_facility_evidence_defaults_quantity() {
        let evidence: Evidence =
            serde_json::from_value(json!({"code": "V001", "name": "Sea view"})).unwrap();
        assert_eq!(evidence.code(), "V001");
        assert_eq!(evidence.quantity(), 0);
    }
}
