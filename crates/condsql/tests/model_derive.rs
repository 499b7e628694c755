#![allow(dead_code)]

use condsql::{ConditionHash, FieldRef, Model, ModelBuilder, OrderType, Value, WhereCompare};

#[derive(Debug, Clone, Model)]
#[orm(table = "orders")]
struct Order {
    id: i64,
    #[orm(column = "order_status")]
    status: i32,
    #[orm(name = "Title")]
    title: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    customer_id: i64,
    #[orm(skip)]
    note: String,
}

#[derive(Debug, Clone, Model)]
#[orm(table = "customers")]
struct Customer {
    id: i64,
    region: String,
}

#[test]
fn test_derived_descriptors() {
    assert_eq!(Order::TABLE, "orders");
    assert_eq!(Customer::TABLE, "customers");

    assert_eq!(Order::STATUS.name(), "status");
    assert_eq!(Order::STATUS.column(), "order_status");
    assert_eq!(Order::TITLE.name(), "Title");
    assert_eq!(Order::TITLE.column(), "title");
    assert_eq!(Order::CREATED_AT.column(), "created_at");
    assert_eq!(Order::CUSTOMER_ID.alias("o").qualified(), "o.customer_id");
    assert_eq!(Customer::REGION.qualified(), "customers.region");
}

#[test]
fn test_when_reads_bag() {
    let bag = ConditionHash::new().push("status", "5").push("customer_id", "");
    let mb = ModelBuilder::<Order>::with_conditions(bag)
        .table("o")
        .when(&Order::STATUS.alias("o"))
        .when(&Order::CUSTOMER_ID.alias("o"))
        .when(&Order::TITLE.alias("o"));

    assert_eq!(
        mb.render().unwrap(),
        "SELECT * FROM orders o WHERE o.order_status = @order_status"
    );
    assert_eq!(mb.params().get("order_status"), Some(&Value::I32(5)));
    assert_eq!(mb.params().len(), 1);
}

#[test]
fn test_compare_override_from_bag() {
    let bag = ConditionHash::new()
        .push("status", 3)
        .push("order_status_WhereCompare", "Greater");
    let sql = ModelBuilder::<Order>::with_conditions(bag)
        .table("o")
        .when(&Order::STATUS.alias("o"))
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM orders o WHERE o.order_status > @order_status");
}

#[test]
fn test_like_wraps_value() {
    let bag = ConditionHash::new().push("title", "bob");
    let mb = ModelBuilder::<Order>::with_conditions(bag)
        .table("")
        .when_cmp(&Order::TITLE, None, WhereCompare::Like);

    assert_eq!(mb.render().unwrap(), "SELECT * FROM orders WHERE title LIKE @title");
    assert_eq!(mb.params().get("title"), Some(&Value::Str("%bob%".into())));
}

#[test]
fn test_between_binds_rfc3339() {
    let bag = ConditionHash::new().push("created_at", vec!["2024-01-01", "2024-02-01"]);
    let mb = ModelBuilder::<Order>::with_conditions(bag)
        .table("o")
        .between(&Order::CREATED_AT.alias("o"));

    assert_eq!(
        mb.render().unwrap(),
        "SELECT * FROM orders o WHERE o.created_at BETWEEN @created_at1 AND @created_at2"
    );
    let lo = mb.params().get("created_at1").and_then(Value::as_str).unwrap();
    assert!(lo.starts_with("2024-01-01T00:00:00"));
}

#[test]
fn test_between_needs_two_values() {
    let bag = ConditionHash::new().push("created_at", vec!["2024-01-01"]);
    let sql = ModelBuilder::<Order>::with_conditions(bag)
        .table("o")
        .between(&Order::CREATED_AT.alias("o"))
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM orders o");
}

#[test]
fn test_join_select_and_page() {
    let bag = ConditionHash::new().push("PageIndex", 2).push("PageSize", 10);
    let order_id = Order::ID.alias("o");
    let region = Customer::REGION.alias("c");
    let stmt = ModelBuilder::<Order>::with_conditions(bag)
        .table("o")
        .left_join_on(&Customer::ID.alias("c"), &Order::CUSTOMER_ID.alias("o"))
        .select_fields(&[&order_id as &dyn FieldRef, &region])
        .order_by_field(&order_id, OrderType::Desc)
        .page(true, "")
        .build()
        .unwrap();

    let base = "SELECT o.id,c.region FROM orders o LEFT JOIN customers c ON c.id = o.customer_id ORDER BY o.id DESC";
    let (rows, count) = stmt.split_page();
    assert_eq!(rows, format!("{base} LIMIT 10,10"));
    assert_eq!(count, Some(format!("SELECT COUNT(0) AS Count FROM ({base}) AS CT").as_str()));
}

#[test]
fn test_bag_order_by() {
    let bag = ConditionHash::new().push("OrderBy", "o.created_at").push("ASC", true);
    let sql = ModelBuilder::<Order>::with_conditions(bag)
        .table("o")
        .order_by()
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM orders o ORDER BY o.created_at ASC");

    let bag = ConditionHash::new().push("OrderBy", "id; DROP TABLE orders");
    let sql = ModelBuilder::<Order>::with_conditions(bag)
        .table("o")
        .order_by()
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM orders o");
}

#[test]
fn test_update_from_bag() {
    let bag = ConditionHash::new().push("status", 2).push("id", 7);
    let mb = ModelBuilder::<Order>::with_conditions(bag)
        .update()
        .set(&Order::STATUS)
        .when(&Order::ID);

    assert_eq!(
        mb.render().unwrap(),
        "UPDATE orders SET `order_status`=@order_status WHERE id = @id"
    );
    assert_eq!(mb.params().get("id"), Some(&Value::I64(7)));
}

#[test]
fn test_insert_with_upsert() {
    let sql = ModelBuilder::<Order>::new()
        .insert()
        .value(&Order::STATUS, 1)
        .value(&Order::CUSTOMER_ID, 9_i64)
        .value_literal(&Order::CREATED_AT, "NOW()")
        .duplicate(&Order::STATUS, "VALUES(order_status)")
        .select_identity()
        .render()
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO orders (`order_status`,`customer_id`,created_at) VALUES (@order_status,@customer_id,NOW()) \
         ON DUPLICATE KEY UPDATE order_status=VALUES(order_status);SELECT LAST_INSERT_ID() AS id;"
    );
}

#[test]
fn test_missing_bag_is_precondition_error() {
    let err = ModelBuilder::<Order>::new()
        .table("")
        .when(&Order::STATUS)
        .build()
        .unwrap_err();
    assert!(err.is_precondition());
}
