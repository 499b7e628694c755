//! Tests for the statement assembler.

use super::*;
use crate::args;

#[test]
fn test_select_basic() {
    let sql = SqlBuilder::new().table("users").render().unwrap();
    assert_eq!(sql, "SELECT * FROM users");
}

#[test]
fn test_select_full_clause_order() {
    let sql = SqlBuilder::new()
        .select(&["u.id", "u.name"])
        .table_as("users", "u")
        .table("roles")
        .left_join("orders", "o", "o.user_id = u.id")
        .where_("u.age > @age", args![18])
        .where_("u.status = 1", args![])
        .group_by(&["u.id"])
        .order_by_desc("u.id")
        .limit(0, 10)
        .render()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT u.id,u.name FROM users u,roles LEFT JOIN orders o ON o.user_id = u.id \
         WHERE u.age > @age AND u.status = 1 GROUP BY u.id ORDER BY u.id DESC LIMIT 0,10"
    );
}

#[test]
fn test_select_requires_table() {
    let err = SqlBuilder::new().select(&["1"]).render().unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_join_kinds() {
    let sql = SqlBuilder::new()
        .table_as("a", "a")
        .join("b", "b", "b.id = a.id")
        .right_join("c", "c", "c.id = a.id")
        .inner_join("d", "d", "d.id = a.id")
        .straight_join("e", "e", "e.id = a.id")
        .render()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM a a JOIN b b ON b.id = a.id RIGHT JOIN c c ON c.id = a.id \
         INNER JOIN d d ON d.id = a.id STRAIGHT_JOIN e e ON e.id = a.id"
    );
}

#[test]
fn test_order_by_empty_field() {
    let sql = SqlBuilder::new()
        .table("t")
        .order_by("", OrderType::Asc)
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM t ORDER BY 1 ASC");
}

#[test]
fn test_where_positional_binding() {
    let qb = SqlBuilder::new()
        .table("users")
        .where_("age=@age and name=@name", args![10, "bob"]);

    assert_eq!(qb.params().get("age"), Some(&Value::I32(10)));
    assert_eq!(qb.params().get("name"), Some(&Value::from("bob")));
    assert_eq!(
        qb.render().unwrap(),
        "SELECT * FROM users WHERE age=@age and name=@name"
    );
}

#[test]
fn test_where_object_bulk_binding() {
    #[derive(serde::Serialize)]
    struct Filter {
        age: i32,
        name: &'static str,
    }

    let qb = SqlBuilder::new()
        .table("users")
        .where_object("age=@age", &Filter { age: 10, name: "bob" })
        .unwrap();
    assert_eq!(qb.params().get("age"), Some(&Value::I64(10)));
    assert_eq!(qb.params().get("name"), Some(&Value::from("bob")));

    let from_json = SqlBuilder::new()
        .table("users")
        .where_("age=@age", args![serde_json::json!({"age": 3})]);
    assert_eq!(from_json.params().get("age"), Some(&Value::I64(3)));
}

#[test]
fn test_where_object_rejects_scalars() {
    let err = SqlBuilder::new().where_object("a=@a", &5).unwrap_err();
    assert!(matches!(err, SqlError::Serialization(_)));
}

#[test]
fn test_where_count_mismatch_skips_scalars() {
    let qb = SqlBuilder::new()
        .table("t")
        .where_("a=@a and b=@b", args![1]);
    assert!(qb.params().is_empty());
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t WHERE a=@a and b=@b");
}

#[test]
fn test_where_if_gate() {
    let sql = SqlBuilder::new()
        .table("t")
        .where_if(false, "a=@a", args![1])
        .where_if(true, "b=@b", args![2])
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM t WHERE b=@b");
}

#[test]
fn test_where_in() {
    let qb = SqlBuilder::new().table("t").where_in("t.id", [3, 4]);
    assert_eq!(
        qb.render().unwrap(),
        "SELECT * FROM t WHERE t.id IN (@t_id_IN_0,@t_id_IN_1)"
    );
    assert_eq!(qb.params().get("t_id_IN_1"), Some(&Value::I32(4)));
}

#[test]
fn test_where_in_empty_matches_nothing() {
    let qb = SqlBuilder::new()
        .table("t")
        .where_in("id", Vec::<i32>::new())
        .where_in_if(false, "x", [1]);
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t WHERE 1=0");
    assert!(qb.params().is_empty());
}

#[test]
fn test_insert_basic() {
    let st = SqlBuilder::new()
        .insert("users")
        .value("name", "alice")
        .value("`key`", 7)
        .value_literal("created", "NOW()")
        .build()
        .unwrap();

    assert_eq!(
        st.sql,
        "INSERT INTO users (name,`key`,created) VALUES (@name,@key,NOW())"
    );
    assert_eq!(st.params.names(), vec!["name", "key"]);
}

#[test]
fn test_insert_placeholders_match_params() {
    let st = SqlBuilder::new()
        .insert("t")
        .value("a", 1)
        .value("b", 2)
        .value("c", 3)
        .build()
        .unwrap();
    assert_eq!(param_tokens(&st.sql).len(), st.params.len());
}

#[test]
fn test_insert_upsert_and_identity() {
    let sql = SqlBuilder::new()
        .insert("stock")
        .value("sku", "A1")
        .value("qty", 5)
        .duplicate("qty", "qty+VALUES(qty)")
        .duplicate("updated", "NOW()")
        .duplicate("", "x")
        .select_identity()
        .render()
        .unwrap();

    assert_eq!(
        sql,
        "INSERT INTO stock (sku,qty) VALUES (@sku,@qty) \
         ON DUPLICATE KEY UPDATE qty=qty+VALUES(qty),updated=NOW();SELECT LAST_INSERT_ID() AS id;"
    );
}

#[test]
fn test_duplicate_and_identity_ignored_outside_insert() {
    let sql = SqlBuilder::new()
        .table("t")
        .duplicate("a", "b")
        .select_identity()
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM t");
}

#[test]
fn test_insert_errors() {
    assert!(SqlBuilder::new().insert("t").render().unwrap_err().is_configuration());
    assert!(
        SqlBuilder::new()
            .insert("t")
            .table("u")
            .value("a", 1)
            .render()
            .unwrap_err()
            .is_configuration()
    );
}

#[test]
fn test_update_basic() {
    let st = SqlBuilder::new()
        .update("users")
        .set("status", 0)
        .set_literal("updated", "NOW()")
        .set_if(false, "skipped", 1)
        .where_("id=@id", args![9i64])
        .build()
        .unwrap();
    assert_eq!(
        st.sql,
        "UPDATE users SET `status`=@status,updated=NOW() WHERE id=@id"
    );
    assert_eq!(st.params.len(), 2);
}

#[test]
fn test_update_set_expression_names() {
    let qb = SqlBuilder::new()
        .update("t")
        .set("u.`Name`", "a")
        .set("score=@newScore", 3)
        .set("`", 1);
    assert_eq!(
        qb.render().unwrap(),
        "UPDATE t SET `Name`=@Name,`newScore`=@newScore"
    );
    assert_eq!(qb.params().get("newScore"), Some(&Value::I32(3)));
}

#[test]
fn test_update_errors() {
    let err = SqlBuilder::new().update("t").render().unwrap_err();
    assert!(err.is_configuration());

    let err = SqlBuilder::new()
        .update("t")
        .table("u")
        .set("a", 1)
        .render()
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_delete() {
    let sql = SqlBuilder::new()
        .delete("users")
        .where_("id=@id", args![1])
        .render()
        .unwrap();
    assert_eq!(sql, "DELETE FROM users WHERE id=@id");

    assert_eq!(
        SqlBuilder::new().delete("users").render().unwrap(),
        "DELETE FROM users"
    );
    assert!(SqlBuilder::new().delete("a").table("b").render().is_err());
}

#[test]
fn test_page_with_count() {
    let qb = SqlBuilder::new()
        .table("t")
        .where_("a=@a", args![1])
        .order_by_desc("id")
        .page(3, 20, true, "SUM(amount) AS Amount");

    assert!(qb.is_count_total());
    let st = qb.build().unwrap();
    let base = "SELECT * FROM t WHERE a=@a ORDER BY id DESC";
    assert_eq!(
        st.sql,
        format!("{base} LIMIT 40,20;SELECT COUNT(0) AS Count, SUM(amount) AS Amount FROM ({base}) AS CT")
    );
    assert_eq!(st.statements().len(), 2);

    let (rows, count) = st.split_page();
    assert_eq!(rows, format!("{base} LIMIT 40,20"));
    assert!(count.unwrap().ends_with(&format!("FROM ({base}) AS CT")));
}

#[test]
fn test_page_without_count_and_for_update() {
    let qb = SqlBuilder::new()
        .table("t")
        .for_update()
        .page(1, 10, false, "");
    assert!(!qb.is_count_total());
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t LIMIT 0,10 FOR UPDATE");

    let plain = SqlBuilder::new().table("t").for_update();
    assert_eq!(plain.render().unwrap(), "SELECT * FROM t FOR UPDATE");
}

#[test]
fn test_page_replaces_earlier_directive() {
    let sql = SqlBuilder::new()
        .table("t")
        .page(1, 10, true, "")
        .page(2, 5, false, "")
        .limit(0, 1)
        .limit(3, 4)
        .render()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM t LIMIT 3,4 LIMIT 5,5");
}

#[test]
fn test_clear_select_builds_count_query() {
    let qb = SqlBuilder::new()
        .select(&["u.id", "u.name"])
        .table_as("users", "u")
        .inner_join("roles", "r", "r.id = u.role_id")
        .where_("u.age > @age", args![18]);

    let count = qb.clone().clear_select().select(&["COUNT(0) AS COUNT"]);
    assert_eq!(
        count.render().unwrap(),
        "SELECT COUNT(0) AS COUNT FROM users u INNER JOIN roles r ON r.id = u.role_id WHERE u.age > @age"
    );
    assert_eq!(count.params().get("age"), Some(&Value::I32(18)));
}

#[test]
fn test_render_does_not_reset() {
    let qb = SqlBuilder::new().table("t").where_("a=@a", args![1]);
    assert_eq!(qb.render().unwrap(), qb.render().unwrap());
    assert_eq!(qb.params().len(), 1);
}

#[test]
fn test_mode_accessors() {
    assert!(SqlBuilder::new().is_select());
    assert!(SqlBuilder::new().insert("t").is_insert());
    assert!(SqlBuilder::new().update("t").is_update());
    let qb = SqlBuilder::new().delete("t");
    assert!(qb.is_delete());
    assert_eq!(qb.mode(), Mode::Delete);
}

#[test]
fn test_param_tokens() {
    assert_eq!(param_tokens("a=@a and b in (@b_IN_0)"), vec!["@a", "@b_IN_0"]);
    assert!(param_tokens("a=1").is_empty());
}
