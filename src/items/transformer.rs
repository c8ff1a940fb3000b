use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::error;

use super::api::HubSpotObject;
use super::IntegrationItem;
use crate::error::IntegrationError;

/// Layout of HubSpot timestamps, e.g. `2024-01-01T00:00:00.000000Z`
pub const HUBSPOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Parse a HubSpot timestamp (always UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, HUBSPOT_TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

/// Transform a HubSpot object into an integration item.
///
/// `name` comes from the `name` property and is empty when absent.
pub fn create_integration_item(
    object: &HubSpotObject,
    item_type: &str,
) -> Result<IntegrationItem, IntegrationError> {
    let creation_time = parse_field(&object.id, "createdAt", &object.created_at)?;
    let last_modified_time = parse_field(&object.id, "updatedAt", &object.updated_at)?;

    let name = object
        .properties
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(IntegrationItem {
        id: object.id.clone(),
        name,
        item_type: item_type.to_string(),
        creation_time,
        last_modified_time,
        properties: object.properties.clone(),
    })
}

fn parse_field(id: &str, field: &str, value: &str) -> Result<DateTime<Utc>, IntegrationError> {
    parse_timestamp(value).map_err(|e| {
        error!(id = %id, field = %field, value = %value, error = %e, "Unexpected HubSpot timestamp");
        IntegrationError::Server("Failed to parse HubSpot item".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::CONTACTS_ITEM_TYPE;
    use chrono::TimeZone;

    fn make_object(value: serde_json::Value) -> HubSpotObject {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_contact_to_item() {
        let object = make_object(serde_json::json!({
            "id": "1",
            "createdAt": "2024-01-01T00:00:00.000000Z",
            "updatedAt": "2024-01-02T00:00:00.000000Z",
            "properties": {"name": "Acme"}
        }));

        let item = create_integration_item(&object, CONTACTS_ITEM_TYPE).unwrap();

        assert_eq!(item.id, "1");
        assert_eq!(item.name, "Acme");
        assert_eq!(item.item_type, "hubspot_object_contacts");
        assert_eq!(item.creation_time, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            item.last_modified_time,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(item.properties["name"], "Acme");
    }

    #[test]
    fn test_missing_name_is_empty() {
        let object = make_object(serde_json::json!({
            "id": "7",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z",
            "properties": {"firstname": "Brian", "email": "bh@hubspot.com"}
        }));

        let item = create_integration_item(&object, CONTACTS_ITEM_TYPE).unwrap();
        assert_eq!(item.name, "");
        assert_eq!(item.properties.len(), 2);
        assert_eq!(item.properties["email"], "bh@hubspot.com");
    }

    #[test]
    fn test_fractional_seconds() {
        let parsed = parse_timestamp("2024-03-04T05:06:07.123456Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_micros(), 123456);

        let parsed = parse_timestamp("2024-03-04T05:06:07.250Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_other_formats_rejected() {
        assert!(parse_timestamp("2024-01-01 00:00:00").is_err());
        assert!(parse_timestamp("2024-01-01T00:00:00.000+01:00").is_err());
        assert!(parse_timestamp("01/02/2024").is_err());
    }

    #[test]
    fn test_bad_timestamp_fails_item() {
        let object = make_object(serde_json::json!({
            "id": "1",
            "createdAt": "yesterday",
            "updatedAt": "2024-01-02T00:00:00.000000Z",
            "properties": {}
        }));

        let err = create_integration_item(&object, CONTACTS_ITEM_TYPE).unwrap_err();
        assert!(matches!(err, IntegrationError::Server(_)));
    }
}
