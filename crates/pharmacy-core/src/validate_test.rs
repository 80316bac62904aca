use serde_json::json;

use super::*;

fn create_input(value: serde_json::Value) -> CreatePharmacyInput {
    serde_json::from_value(value).expect("create input")
}

fn update_input(value: serde_json::Value) -> UpdatePharmacyInput {
    serde_json::from_value(value).expect("update input")
}

fn valid_create() -> serde_json::Value {
    json!({
        "name": "  Pharmacie Conseil  ",
        "phone_number": "+250788123456",
        "address": "KN 3 Rd, Kigali",
        "latitude": -1.9536,
        "longitude": 29.8739,
        "services": ["Prescriptions", " ", " OTC "],
    })
}

#[test]
fn create_trims_and_defaults() {
    let new = create_input(valid_create()).validate().expect("valid");
    assert_eq!(new.name, "Pharmacie Conseil");
    assert_eq!(new.services, vec!["Prescriptions".to_string(), "OTC".to_string()]);
    assert!(!new.is_registered_by_pharmacy);
    assert!(new.email.is_none());
    assert!(new.contact_person.is_none());
}

#[test]
fn create_reports_first_missing_required_field() {
    for field in ["name", "phone_number", "address", "latitude", "longitude"] {
        let mut body = valid_create();
        body.as_object_mut().expect("object").remove(field);
        let err = create_input(body).validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingField(field));
        assert_eq!(err.to_string(), format!("{field} is required"));
    }
}

#[test]
fn create_treats_blank_required_text_as_missing() {
    let mut body = valid_create();
    body["name"] = json!("   ");
    assert_eq!(
        create_input(body).validate().unwrap_err(),
        ValidationError::MissingField("name")
    );
}

#[test]
fn create_rejects_out_of_range_coordinates() {
    let mut body = valid_create();
    body["latitude"] = json!(91.0);
    assert!(matches!(
        create_input(body).validate(),
        Err(ValidationError::InvalidField { field: "latitude", .. })
    ));

    let mut body = valid_create();
    body["longitude"] = json!(-180.5);
    assert!(matches!(
        create_input(body).validate(),
        Err(ValidationError::InvalidField { field: "longitude", .. })
    ));
}

#[test]
fn create_rejects_malformed_email_and_blank_email_is_absent() {
    let mut body = valid_create();
    body["email"] = json!("not-an-email");
    assert!(matches!(
        create_input(body).validate(),
        Err(ValidationError::InvalidField { field: "email", .. })
    ));

    let mut body = valid_create();
    body["email"] = json!("  ");
    assert!(create_input(body).validate().expect("valid").email.is_none());
}

#[test]
fn create_rejects_overlong_phone_number() {
    let mut body = valid_create();
    body["phone_number"] = json!("9".repeat(51));
    assert!(matches!(
        create_input(body).validate(),
        Err(ValidationError::InvalidField { field: "phone_number", .. })
    ));
}

#[test]
fn update_absent_fields_stay_none() {
    let patch = update_input(json!({ "name": "Renamed" })).validate().expect("valid");
    assert_eq!(patch.name.as_deref(), Some("Renamed"));
    assert!(patch.email.is_none());
    assert!(patch.services.is_none());
    assert!(patch.latitude.is_none());
}

#[test]
fn update_null_clears_nullable_fields() {
    let patch = update_input(json!({ "email": null, "opening_hours": null }))
        .validate()
        .expect("valid");
    assert_eq!(patch.email, Some(None));
    assert_eq!(patch.opening_hours, Some(None));
    assert!(patch.contact_person.is_none());
}

#[test]
fn update_null_on_required_fields_is_rejected() {
    assert_eq!(
        update_input(json!({ "name": null })).validate().unwrap_err(),
        ValidationError::MissingField("name")
    );
    assert!(matches!(
        update_input(json!({ "latitude": null })).validate(),
        Err(ValidationError::InvalidField { field: "latitude", .. })
    ));
    assert!(matches!(
        update_input(json!({ "services": null })).validate(),
        Err(ValidationError::InvalidField { field: "services", .. })
    ));
}

#[test]
fn update_rejects_unknown_fields() {
    let result = serde_json::from_value::<UpdatePharmacyInput>(json!({
        "name": "x",
        "created_at": "2020-01-01T00:00:00Z",
    }));
    assert!(result.is_err());

    let result = serde_json::from_value::<UpdatePharmacyInput>(json!({ "id": "other" }));
    assert!(result.is_err());
}

#[test]
fn update_services_replaced_in_given_order() {
    let patch = update_input(json!({ "services": ["B", "A"] }))
        .validate()
        .expect("valid");
    assert_eq!(patch.services, Some(vec!["B".to_string(), "A".to_string()]));
}
