//! Conversion behaviour across whole schema graphs.
//!
//! Covers references and cycles, discriminated unions, and the
//! input/output effect rules for shared components.

use proptest::prelude::*;
use scribe_schema::{
    ConversionConfig, EffectDirection, ErrorMode, NodeKind, OpenApiVersion, SchemaArena,
    SchemaConverter, SchemaError, Side,
};
use serde_json::json;

/// A named `Date` whose wire shape is a string and whose parsed shape is an
/// integer timestamp.
fn date_arena(effect: Option<EffectDirection>) -> (SchemaArena, scribe_schema::NodeId) {
    let mut arena = SchemaArena::new();
    let wire = arena.string();
    let parsed = arena.integer();
    let date = arena.pipe(wire, Some(parsed), effect);
    arena.set_name(date, "Date");
    (arena, date)
}

#[test]
fn test_second_conversion_is_reference() {
    let mut arena = SchemaArena::new();
    let id = arena.integer();
    let email = arena.string();
    let user = arena.named("User", NodeKind::object([("id", id), ("email", email)]));

    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);
    let first = converter.convert(user, Side::Output).unwrap();
    let second = converter.convert(user, Side::Output).unwrap();

    assert_eq!(second.to_value(), json!({"$ref": "#/components/schemas/User"}));
    assert_eq!(converter.definitions()["User"], first);
    assert_eq!(first.required, vec!["id", "email"]);
}

#[test]
fn test_custom_ref_prefix() {
    let mut arena = SchemaArena::new();
    let user = arena.named("User", NodeKind::Boolean);
    let list = arena.array(user);

    let config = ConversionConfig::new().ref_prefix("#/definitions/");
    let schema = SchemaConverter::new(&arena, &config)
        .convert(list, Side::Output)
        .unwrap();
    assert_eq!(
        schema.to_value(),
        json!({"type": "array", "items": {"$ref": "#/definitions/User"}})
    );
}

#[test]
fn test_recursive_named_node_via_lazy() {
    let mut arena = SchemaArena::new();
    let category = arena.reserve();
    let lazy = arena.lazy(move || category);
    let children = arena.array(lazy);
    let name = arena.string();
    arena.define(
        category,
        NodeKind::object([("name", name), ("children", children)]),
    );
    arena.set_name(category, "Category");

    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);
    let schema = converter
        .convert_component(category, Side::Output, "#")
        .unwrap();

    assert_eq!(schema.to_value(), json!({"$ref": "#/components/schemas/Category"}));
    assert_eq!(
        converter.definitions()["Category"].to_value(),
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "children": {
                    "type": "array",
                    "items": {"$ref": "#/components/schemas/Category"}
                }
            },
            "required": ["name", "children"]
        })
    );
}

#[test]
fn test_recursive_through_unnamed_wrapper() {
    let mut arena = SchemaArena::new();
    let node = arena.reserve();
    let next = arena.nullable(node);
    let value = arena.integer();
    arena.define(node, NodeKind::object([("value", value), ("next", next)]));
    arena.set_name(node, "Link");
    let wrapper = arena.optional(node);
    let holder = arena.object([("head", wrapper)]);

    let config = ConversionConfig::default();
    let schema = SchemaConverter::new(&arena, &config)
        .convert(holder, Side::Output)
        .unwrap();
    assert_eq!(
        schema.to_value(),
        json!({
            "type": "object",
            "properties": {"head": {"$ref": "#/components/schemas/Link"}}
        })
    );
}

#[test]
fn test_unregistered_cycle_reports_path() {
    let mut arena = SchemaArena::new();
    let node = arena.reserve();
    let lazy = arena.lazy(move || node);
    let children = arena.array(lazy);
    arena.define(node, NodeKind::object([("children", children)]));

    let config = ConversionConfig::default();
    let err = SchemaConverter::new(&arena, &config)
        .convert_at(node, Side::Input, "POST /tree > requestBody")
        .unwrap_err();

    match err {
        SchemaError::CircularReferenceWithoutRegistration { path } => {
            assert_eq!(path, "POST /tree > requestBody/properties/children/items");
        }
        other => panic!("expected circular error, got {other:?}"),
    }
}

#[test]
fn test_unregistered_cycle_degrades_in_warn_mode() {
    let mut arena = SchemaArena::new();
    let node = arena.reserve();
    let children = arena.array(node);
    arena.define(node, NodeKind::object([("children", children)]));

    let config = ConversionConfig::new().error_mode(ErrorMode::Warn);
    let schema = SchemaConverter::new(&arena, &config)
        .convert(node, Side::Input)
        .unwrap();
    assert_eq!(
        schema.to_value(),
        json!({
            "type": "object",
            "properties": {"children": {"type": "array", "items": {}}},
            "required": ["children"]
        })
    );
}

#[test]
fn test_shared_unnamed_node_is_inlined_twice() {
    let mut arena = SchemaArena::new();
    let s = arena.string();
    let pair = arena.object([("first", s), ("second", s)]);

    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);
    let schema = converter.convert(pair, Side::Output).unwrap();
    assert_eq!(schema.properties["first"], schema.properties["second"]);
    assert!(converter.definitions().is_empty());
}

#[test]
fn test_discriminated_union_mapping() {
    let mut arena = SchemaArena::new();
    let cat_kind = arena.literal("cat");
    let lives = arena.integer();
    let cat = arena.named("Cat", NodeKind::object([("kind", cat_kind), ("lives", lives)]));
    let dog_kind = arena.enumeration(["dog", "puppy"]);
    let good = arena.boolean();
    let dog = arena.named("Dog", NodeKind::object([("kind", dog_kind), ("good", good)]));
    let pet = arena.add(NodeKind::Union {
        options: vec![cat, dog],
        exclusive: false,
        discriminator: Some("kind".to_string()),
    });

    let config = ConversionConfig::default();
    let schema = SchemaConverter::new(&arena, &config)
        .convert(pet, Side::Output)
        .unwrap();

    assert_eq!(
        schema.to_value(),
        json!({
            "oneOf": [
                {"$ref": "#/components/schemas/Cat"},
                {"$ref": "#/components/schemas/Dog"}
            ],
            "discriminator": {
                "propertyName": "kind",
                "mapping": {
                    "cat": "#/components/schemas/Cat",
                    "dog": "#/components/schemas/Dog",
                    "puppy": "#/components/schemas/Dog"
                }
            }
        })
    );
}

#[test]
fn test_discriminator_omitted_for_unnamed_branch() {
    let mut arena = SchemaArena::new();
    let cat_kind = arena.literal("cat");
    let cat = arena.named("Cat", NodeKind::object([("kind", cat_kind)]));
    let dog_kind = arena.literal("dog");
    let dog = arena.object([("kind", dog_kind)]);
    let pet = arena.add(NodeKind::Union {
        options: vec![cat, dog],
        exclusive: false,
        discriminator: Some("kind".to_string()),
    });

    let config = ConversionConfig::default();
    let schema = SchemaConverter::new(&arena, &config)
        .convert(pet, Side::Output)
        .unwrap();
    assert_eq!(schema.one_of.len(), 2);
    assert!(schema.discriminator.is_none());
}

#[test]
fn test_context_effect_conflict_across_sides() {
    let (arena, date) = date_arena(None);
    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);

    let input = converter
        .convert_component(date, Side::Input, "POST /events > requestBody")
        .unwrap();
    assert!(input.is_reference());
    assert_eq!(
        converter.definitions()["Date"].to_value(),
        json!({"type": "string"})
    );

    let err = converter
        .convert_component(date, Side::Output, "GET /events > responses/200")
        .unwrap_err();
    match err {
        SchemaError::ConflictingEffectDirection {
            name,
            input_path,
            output_path,
        } => {
            assert_eq!(name, "Date");
            assert_eq!(input_path, "POST /events > requestBody");
            assert_eq!(output_path, "GET /events > responses/200");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn test_same_direction_renders_one_shape() {
    let (arena, date) = date_arena(Some(EffectDirection::Same));
    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);

    converter
        .convert_component(date, Side::Input, "POST /events > requestBody")
        .unwrap();
    let output = converter
        .convert_component(date, Side::Output, "GET /events > responses/200")
        .unwrap();

    assert!(output.is_reference());
    assert_eq!(converter.definitions().len(), 1);
    assert_eq!(
        converter.definitions()["Date"].to_value(),
        json!({"type": "string"})
    );
}

#[test]
fn test_declared_direction_ignores_side() {
    let (arena, date) = date_arena(Some(EffectDirection::Output));
    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);

    converter.convert_component(date, Side::Input, "#").unwrap();
    converter.convert_component(date, Side::Output, "#").unwrap();
    assert_eq!(
        converter.definitions()["Date"].to_value(),
        json!({"type": "integer"})
    );
}

#[test]
fn test_unnamed_transform_follows_side() {
    let mut arena = SchemaArena::new();
    let wire = arena.string();
    let parsed = arena.integer();
    let pipe = arena.pipe(wire, Some(parsed), None);

    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);
    assert_eq!(
        converter.convert(pipe, Side::Input).unwrap().to_value(),
        json!({"type": "string"})
    );
    assert_eq!(
        converter.convert(pipe, Side::Output).unwrap().to_value(),
        json!({"type": "integer"})
    );
}

#[test]
fn test_conflict_inside_enclosing_component() {
    let mut arena = SchemaArena::new();
    let wire = arena.string();
    let parsed = arena.integer();
    let at = arena.pipe(wire, Some(parsed), None);
    let event = arena.named("Event", NodeKind::object([("at", at)]));

    let config = ConversionConfig::default();
    let mut converter = SchemaConverter::new(&arena, &config);
    converter.convert_component(event, Side::Output, "#").unwrap();
    let err = converter
        .convert_component(event, Side::Input, "#")
        .unwrap_err();
    assert!(matches!(err, SchemaError::ConflictingEffectDirection { ref name, .. } if name == "Event"));
}

#[test]
fn test_duplicate_name_rejected() {
    let mut arena = SchemaArena::new();
    let a = arena.named("Thing", NodeKind::Boolean);
    let b = arena.named("Thing", NodeKind::Null);
    let both = arena.object([("a", a), ("b", b)]);

    let config = ConversionConfig::default();
    let err = SchemaConverter::new(&arena, &config)
        .convert(both, Side::Output)
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateSchemaName { ref name, .. } if name == "Thing"));

    let lenient = ConversionConfig::new().error_mode(ErrorMode::Ignore);
    let schema = SchemaConverter::new(&arena, &lenient)
        .convert(both, Side::Output)
        .unwrap();
    assert_eq!(schema.properties["b"].to_value(), json!({"type": "null"}));
}

#[test]
fn test_open_api_3_0_document_shapes() {
    let mut arena = SchemaArena::new();
    let s = arena.string();
    let nickname = arena.nullable(s);
    let user = arena.named("User", NodeKind::object([("nickname", nickname)]));
    arena.describe(user, "A user");
    let owner = arena.nullable(user);
    let repo = arena.object([("owner", owner)]);

    let config = ConversionConfig::new().version(OpenApiVersion::V3_0);
    let mut converter = SchemaConverter::new(&arena, &config);
    let schema = converter.convert(repo, Side::Output).unwrap();

    assert_eq!(
        schema.to_value(),
        json!({
            "type": "object",
            "properties": {
                "owner": {"allOf": [{"$ref": "#/components/schemas/User"}], "nullable": true}
            },
            "required": ["owner"]
        })
    );
    assert_eq!(
        converter.definitions()["User"].to_value(),
        json!({
            "type": "object",
            "description": "A user",
            "properties": {"nickname": {"type": "string", "nullable": true}},
            "required": ["nickname"]
        })
    );
}

proptest! {
    #[test]
    fn fixed_tuple_bounds(len in 0usize..12) {
        let mut arena = SchemaArena::new();
        let items: Vec<_> = (0..len).map(|_| arena.string()).collect();
        let tuple = arena.add(NodeKind::Tuple { items, rest: None });

        let config = ConversionConfig::default();
        let schema = SchemaConverter::new(&arena, &config)
            .convert(tuple, Side::Input)
            .unwrap();

        prop_assert_eq!(schema.prefix_items.len(), len);
        prop_assert_eq!(schema.min_items, Some(len as u64));
        prop_assert_eq!(schema.max_items, Some(len as u64));
        prop_assert!(schema.items.is_none());
    }
}
