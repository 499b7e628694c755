use super::*;
use crate::convert::Json;
use crate::model::{Field, Model};

struct Order;

impl Model for Order {
    const TABLE: &'static str = "orders";
}

#[test]
fn keys_are_case_insensitive() {
    let mut hash = ConditionHash::new().push("UserName", "bob");
    assert!(hash.contains_key("username"));
    assert!(hash.contains_key("USERNAME"));
    assert_eq!(hash.get("userName", String::new()), "bob");

    hash.insert("USERNAME", "alice");
    assert_eq!(hash.len(), 1);
    assert_eq!(hash.get("username", String::new()), "alice");

    assert_eq!(hash.remove("UserName"), Some(Value::from("alice")));
    assert!(hash.is_empty());
}

#[test]
fn parse_string_to_int() {
    let hash = ConditionHash::new().push("x", "42").push("y", "abc");
    assert_eq!(hash.parse::<i32>("x", -1), (true, 42));
    assert_eq!(hash.parse::<i32>("y", -1), (false, -1));
    assert_eq!(hash.parse::<i32>("missing", -1), (false, -1));
}

#[test]
fn get_degrades_silently() {
    let hash = ConditionHash::new()
        .push("n", Value::Null)
        .push("big", i64::MAX)
        .push("list", vec![1, 2]);

    assert_eq!(hash.get("n", 7), 7);
    assert_eq!(hash.get::<i32>("big", 0), i32::MAX);
    assert_eq!(hash.get("list", 0), 0);
    assert_eq!(hash.get("list", String::from("d")), "d");
}

#[test]
fn numeric_values_cross_convert() {
    let hash = ConditionHash::new().push("price", 12.5f64).push("qty", 3i16);
    assert_eq!(hash.get::<i64>("price", 0), 12);
    assert_eq!(hash.get::<f64>("qty", 0.0), 3.0);
    assert_eq!(hash.get::<String>("qty", String::new()), "3");
}

#[test]
fn get_array_requires_every_element() {
    let hash = ConditionHash::new()
        .push("ids", vec!["1", "2", "3"])
        .push("mixed", vec![Value::from(1), Value::from("x")]);
    assert_eq!(hash.get_array::<i32>("ids"), Some(vec![1, 2, 3]));
    assert_eq!(hash.get_array::<i32>("mixed"), None);
    assert_eq!(hash.get_array::<i32>("missing"), None);
}

#[test]
fn composite_values_use_json_round_trip() {
    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Span {
        from: i32,
        to: i32,
    }

    let hash = ConditionHash::new().push("span", serde_json::json!({"from": 1, "to": 5}));
    let (ok, Json(span)) = hash.parse("span", Json(Span { from: 0, to: 0 }));
    assert!(ok);
    assert_eq!(span, Span { from: 1, to: 5 });
}

#[test]
fn is_required_rules() {
    let hash = ConditionHash::new()
        .push("empty", "")
        .push("name", "bob")
        .push("none", Value::Null)
        .push("zero", 0)
        .push("pair", vec![1, 2])
        .push("nothing", Vec::<i32>::new());

    assert!(!hash.is_required("empty", -1));
    assert!(hash.is_required("name", -1));
    assert!(!hash.is_required("none", -1));
    assert!(!hash.is_required("missing", -1));
    assert!(hash.is_required("zero", -1));

    assert!(hash.is_required("pair", -1));
    assert!(hash.is_required("pair", 2));
    assert!(!hash.is_required("pair", 3));
    assert!(!hash.is_required("nothing", -1));
    assert!(hash.is_required("nothing", -2));
    assert!(hash.is_required("nothing", 0));
}

#[test]
fn is_contains_checks_type_and_length() {
    let hash = ConditionHash::new()
        .push("status", 5)
        .push("name", "bob")
        .push("range", vec![1, 9])
        .push("triple", vec![1, 2, 3]);

    assert!(hash.is_contains::<i32>("status", -1));
    assert!(!hash.is_contains::<i32>("name", -1));
    assert!(hash.is_contains::<String>("name", -1));

    assert!(hash.is_contains::<Vec<i32>>("range", 2));
    assert!(!hash.is_contains::<Vec<i32>>("triple", 2));
    assert!(hash.is_contains::<Vec<i32>>("triple", -5));
}

#[test]
fn is_contains_with_predicate() {
    let hash = ConditionHash::new().push("age", "30");
    assert!(hash.is_contains_with::<i32>("age", |age| *age > 18));
    assert!(!hash.is_contains_with::<i32>("age", |age| *age > 40));
    assert!(!hash.is_contains_with::<i32>("missing", |_| true));
}

#[test]
fn order_by_first_call_wins() {
    let hash = ConditionHash::new()
        .order_by("created", false)
        .order_by("id", true);
    assert_eq!(hash.get(ORDER_BY_KEY, String::new()), "created");
    assert!(!hash.get(ASC_KEY, true));

    let supplied = ConditionHash::new().push("orderby", "name").order_by("id", true);
    assert_eq!(supplied.get(ORDER_BY_KEY, String::new()), "name");
    assert!(!supplied.contains_key(ASC_KEY));
}

#[test]
fn page_defaults() {
    let hash = ConditionHash::new();
    assert_eq!(hash.page_index(), 1);
    assert_eq!(hash.page_size(), 20);

    let hash = hash.push("pageindex", "3").push("PAGESIZE", 50);
    assert_eq!(hash.page_index(), 3);
    assert_eq!(hash.page_size(), 50);
}

#[test]
fn push_field_uses_entity_name() {
    const CUSTOMER_ID: Field<Order, i64> = Field::new("CustomerId", "customer_id");
    let hash = ConditionHash::new().push_field(&CUSTOMER_ID, 9);
    assert!(hash.contains_key("customerid"));
    assert!(!hash.contains_key("customer_id"));
}

#[derive(serde::Serialize)]
struct Profile {
    id: i64,
    name: String,
    score: f64,
    active: bool,
    tags: Vec<String>,
}

fn profile() -> Profile {
    Profile {
        id: 7,
        name: "bob".into(),
        score: 1.5,
        active: true,
        tags: vec!["a".into()],
    }
}

#[test]
fn from_serialize_imports_simple_fields() {
    let hash = ConditionHash::from_serialize(&profile(), &[]).unwrap();
    assert_eq!(hash.get("id", 0), 7);
    assert_eq!(hash.get("name", String::new()), "bob");
    assert_eq!(hash.get("score", 0.0), 1.5);
    assert!(!hash.contains_key("active"));
    assert!(!hash.contains_key("tags"));

    let hash = ConditionHash::from_serialize(&profile(), &["Active", "tags"]).unwrap();
    assert!(hash.get("active", false));
    assert_eq!(hash.get_array::<String>("tags"), Some(vec!["a".to_string()]));
}

#[test]
fn from_serialize_rejects_non_objects() {
    let err = ConditionHash::from_serialize(&vec![1, 2], &[]).unwrap_err();
    assert!(matches!(err, SqlError::Serialization(_)));
}

#[test]
fn diff_lists_changed_fields() {
    let hash = ConditionHash::new()
        .push("Name", "alice")
        .push("id", 7)
        .push("score", "")
        .push("unknown", 1);

    let diff = hash.diff(&profile());
    assert_eq!(diff, "name : bob -> alice\nscore : 1.5 -> <NULL>\n");
}

#[test]
fn collects_from_pairs() {
    let hash: ConditionHash = [("A", 1), ("b", 2)].into_iter().collect();
    assert_eq!(hash.get("a", 0), 1);
    assert_eq!(hash.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["a", "b"]);
}
