use std::collections::HashSet;
use todo_core::{Person, PersonValidationError};

#[test]
fn new_person_has_no_id_until_persisted() {
    let person = Person::new("Ada", "Lovelace").unwrap();

    assert_eq!(person.id(), None);
    assert_eq!(person.first_name(), "Ada");
    assert_eq!(person.last_name(), "Lovelace");
    assert_eq!(person.full_name(), "Ada Lovelace");
}

#[test]
fn blank_names_are_rejected() {
    assert_eq!(
        Person::new("  ", "Lovelace").unwrap_err(),
        PersonValidationError::EmptyFirstName
    );
    assert_eq!(
        Person::new("Ada", "").unwrap_err(),
        PersonValidationError::EmptyLastName
    );
}

#[test]
fn setters_keep_previous_value_on_invalid_input() {
    let mut person = Person::with_id(7, "Ada", "Lovelace").unwrap();

    assert!(person.set_first_name("\t").is_err());
    assert_eq!(person.first_name(), "Ada");

    person.set_last_name("Byron").unwrap();
    assert_eq!(person.last_name(), "Byron");
}

#[test]
fn equality_and_hash_cover_id_and_names() {
    let a = Person::with_id(1, "Ada", "Lovelace").unwrap();
    let same = Person::with_id(1, "Ada", "Lovelace").unwrap();
    let other_id = Person::with_id(2, "Ada", "Lovelace").unwrap();

    assert_eq!(a, same);
    assert_ne!(a, other_id);

    let set: HashSet<Person> = [a, same, other_id].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn display_matches_person_info_format() {
    let person = Person::with_id(3, "Grace", "Hopper").unwrap();
    assert_eq!(person.to_string(), "PersonInfo {id: 3, name: Grace Hopper}");
}

#[test]
fn serde_roundtrip_and_validation() {
    let person = Person::with_id(5, "Alan", "Turing").unwrap();
    let json = serde_json::to_value(&person).unwrap();
    assert_eq!(json["id"], 5);
    assert_eq!(json["first_name"], "Alan");

    let decoded: Person = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, person);

    let err = serde_json::from_value::<Person>(serde_json::json!({
        "id": null,
        "first_name": " ",
        "last_name": "Turing"
    }))
    .unwrap_err();
    assert!(err.to_string().contains("first name"), "unexpected error: {err}");
}
