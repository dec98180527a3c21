//! End-to-end construction and validation through the public API, using a
//! minimal rule engine that understands `required` and `admin_only`.

use std::sync::Arc;

use paramkit_schema::{
    build, build_scoped, AttributeError, AttributeOptions, Capabilities, Definition, RuleContext,
    RuleEngine, Scope, SchemaBuilder, TypeRegistry, Value,
};
use serde_json::json;

struct TestRules;

impl RuleEngine for TestRules {
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<AttributeError> {
        let mut errors = Vec::new();
        for (attr, rule) in ctx.rules() {
            match rule.name.as_str() {
                "required" if ctx.value(attr).is_blank() => {
                    errors.push(AttributeError::new(*attr, "required"));
                }
                "admin_only" if !ctx.value(attr).is_null() && !ctx.capability("admin") => {
                    errors.push(AttributeError::new(*attr, "admin only"));
                }
                _ => {}
            }
        }
        errors
    }
}

fn required() -> AttributeOptions {
    AttributeOptions::default().rule("required", true)
}

fn raw(json: serde_json::Value) -> Value {
    Value::from(json)
}

#[test]
fn end_to_end_local_errors_then_nested() {
    let registry = TypeRegistry::with_builtins();
    let mut b = SchemaBuilder::new(&registry);
    b.integer("id", required())
        .unwrap()
        .struct_block("post", AttributeOptions::default(), |post| {
            post.integer("id", required())?;
            Ok(())
        })
        .unwrap();
    let schema = b.build();

    let params = build(&schema, Some(&raw(json!({"id": null, "post": {"id": null}}))));
    let errors = params.errors(&TestRules);
    assert_eq!(errors.pairs(), [("id", "required"), ("post.id", "required")]);
}

#[test]
fn non_mapping_struct_input_builds_and_validates() {
    let registry = TypeRegistry::with_builtins();
    let mut b = SchemaBuilder::new(&registry);
    b.struct_block("post", AttributeOptions::default(), |post| {
        post.integer("id", required())?;
        post.integer("rank", AttributeOptions::default().with_default(1))?;
        Ok(())
    })
    .unwrap()
    .struct_collection_block("items", AttributeOptions::default(), |item| {
        item.integer("rank", AttributeOptions::default().with_default(1))?;
        Ok(())
    })
    .unwrap();
    let schema = b.build();

    let params = build(&schema, Some(&raw(json!({"post": "x", "items": ["x"]}))));
    assert_eq!(
        params.to_json(),
        json!({"post": {"id": null, "rank": 1}, "items": [{"rank": 1}]})
    );
    assert_eq!(params.errors(&TestRules).pairs(), [("post.id", "required")]);

    let absent = build(&schema, Some(&raw(json!({"post": null}))));
    assert!(absent.nested("post").is_none());
    assert!(absent.is_valid(&TestRules));
}

#[test]
fn struct_collection_error_key_format() {
    let registry = TypeRegistry::with_builtins();
    let mut b = SchemaBuilder::new(&registry);
    b.struct_collection_block("sections", AttributeOptions::default(), |section| {
        section.integer("id", required())?;
        Ok(())
    })
    .unwrap();
    let schema = b.build();

    let params = build(&schema, Some(&raw(json!({"sections": [{"id": null}]}))));
    let errors = params.errors(&TestRules);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.keys(), ["sections[0].id"]);
}

#[test]
fn collection_element_independence() {
    let registry = TypeRegistry::with_builtins();
    let mut b = SchemaBuilder::new(&registry);
    b.struct_collection_block("items", AttributeOptions::default(), |item| {
        item.string("name", required())?;
        Ok(())
    })
    .unwrap();
    let schema = b.build();

    let params = build(
        &schema,
        Some(&raw(json!({"items": [{"name": ""}, {"name": "ok"}]}))),
    );
    let errors = params.errors(&TestRules);
    assert_eq!(errors.pairs(), [("items[0].name", "required")]);
}

#[test]
fn absent_versus_defaulted_struct() {
    let registry = TypeRegistry::with_builtins();
    let mut address = SchemaBuilder::new(&registry);
    address
        .string("city", AttributeOptions::default().with_default("Paris"))
        .unwrap();
    let address = address.build();

    let mut b = SchemaBuilder::new(&registry);
    b.struct_field("home", Definition::from(&address), AttributeOptions::default())
        .unwrap()
        .struct_field(
            "office",
            Definition::from(&address),
            AttributeOptions::default().with_default(json!({})),
        )
        .unwrap();
    let schema = b.build();

    let params = build(&schema, Some(&raw(json!({}))));
    assert!(params.nested("home").is_none());
    assert_eq!(
        params.nested("office").map(|o| o.to_json()),
        Some(json!({"city": "Paris"}))
    );
}

#[test]
fn collections_pin_null_and_empty_behaviour() {
    let registry = TypeRegistry::with_builtins();
    let mut b = SchemaBuilder::new(&registry);
    b.collection_field(
        "ids",
        "integer",
        AttributeOptions::default().with_default(vec![1]),
    )
    .unwrap()
    .struct_collection_block("rows", AttributeOptions::default(), |row| {
        row.integer("n", AttributeOptions::default())?;
        Ok(())
    })
    .unwrap();
    let schema = b.build();

    let from_null = build(&schema, Some(&raw(json!({"ids": null, "rows": null}))));
    assert_eq!(from_null.to_json(), json!({"ids": [1], "rows": []}));

    let from_empty = build(&schema, Some(&raw(json!({"ids": [], "rows": []}))));
    assert_eq!(from_empty.to_json(), json!({"ids": [], "rows": []}));
}

#[test]
fn scope_capabilities_reach_nested_rules() {
    let registry = TypeRegistry::with_builtins();
    let mut b = SchemaBuilder::new(&registry);
    b.struct_collection_block("sections", AttributeOptions::default(), |section| {
        section.string("secret", AttributeOptions::default().rule("admin_only", true))?;
        Ok(())
    })
    .unwrap();
    let schema = b.build();
    let input = raw(json!({"sections": [{"secret": "x"}]}));

    let guest: Arc<dyn Scope> = Arc::new(Capabilities::new().grant("admin", false));
    let params = build_scoped(&schema, Some(&input), Some(guest));
    assert_eq!(
        params.errors(&TestRules).pairs(),
        [("sections[0].secret", "admin only")]
    );

    let admin: Arc<dyn Scope> = Arc::new(Capabilities::new().grant("admin", true));
    let params = build_scoped(&schema, Some(&input), Some(admin));
    assert!(params.is_valid(&TestRules));

    let unscoped = build(&schema, Some(&input));
    assert!(!unscoped.is_valid(&TestRules));
}

#[test]
fn construction_never_fails_on_hostile_input() {
    let registry = TypeRegistry::with_builtins();
    let mut b = SchemaBuilder::new(&registry);
    b.integer("n", AttributeOptions::default())
        .unwrap()
        .date("on", AttributeOptions::default())
        .unwrap()
        .collection_field("flags", "bool", AttributeOptions::default())
        .unwrap()
        .struct_block("inner", AttributeOptions::default(), |i| {
            i.float("x", AttributeOptions::default())?;
            Ok(())
        })
        .unwrap();
    let schema = b.build();

    let params = build(
        &schema,
        Some(&raw(json!({
            "n": {"deep": [1, 2]},
            "on": "33-03-2011",
            "flags": {"a": "maybe"},
            "inner": [1, 2, 3]
        }))),
    );
    assert_eq!(
        params.to_json(),
        json!({"n": null, "on": null, "flags": [null], "inner": {"x": null}})
    );
}
