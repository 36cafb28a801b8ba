//! Rendering schema nodes into OpenAPI schema objects.
//!
//! A [`SchemaConverter`] owns the [`ConversionContext`] for one document build.
//! Every node that carries a registration name is rendered once into the
//! definitions map and referenced everywhere else, which is also what lets
//! cyclic graphs terminate.
//!
//! ```
//! use scribe_schema::{ConversionConfig, SchemaArena, SchemaConverter, Side};
//!
//! let mut arena = SchemaArena::new();
//! let name = arena.string();
//! let user = arena.named("User", scribe_schema::NodeKind::object([("name", name)]));
//!
//! let config = ConversionConfig::default();
//! let mut converter = SchemaConverter::new(&arena, &config);
//!
//! let first = converter.convert(user, Side::Output).unwrap();
//! assert_eq!(first.required, vec!["name".to_string()]);
//!
//! let second = converter.convert(user, Side::Output).unwrap();
//! assert_eq!(second.reference.as_deref(), Some("#/components/schemas/User"));
//! ```

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ConversionConfig, ErrorMode, UnionStyle};
use crate::error::{SchemaError, SchemaResult};
use crate::node::{
    EffectDirection, NodeId, NodeKind, NodeMeta, NumberNode, SchemaArena, SchemaNode, Side,
    StringNode,
};
use crate::registry::{ConversionContext, EffectSource, RefStatus};
use crate::schema::{AdditionalProperties, Discriminator, Schema, SchemaType, SchemaTypeSet};

/// Converts nodes of one arena into schema objects.
#[derive(Debug)]
pub struct SchemaConverter<'a> {
    arena: &'a SchemaArena,
    config: &'a ConversionConfig,
    cx: ConversionContext,
}

impl<'a> SchemaConverter<'a> {
    /// Start a conversion pass.
    pub fn new(arena: &'a SchemaArena, config: &'a ConversionConfig) -> Self {
        Self {
            arena,
            config,
            cx: ConversionContext::new(),
        }
    }

    /// The arena being converted.
    pub fn arena(&self) -> &'a SchemaArena {
        self.arena
    }

    /// The active settings.
    pub fn config(&self) -> &'a ConversionConfig {
        self.config
    }

    /// The pass state.
    pub fn context(&self) -> &ConversionContext {
        &self.cx
    }

    /// Definitions collected so far.
    pub fn definitions(&self) -> &IndexMap<String, Schema> {
        self.cx.definitions()
    }

    /// Finish the pass, yielding the definitions.
    pub fn into_definitions(self) -> IndexMap<String, Schema> {
        self.cx.into_definitions()
    }

    /// Convert `id` with the root path `#`.
    ///
    /// The first conversion of a named node returns its full definition; later
    /// conversions return only the reference.
    pub fn convert(&mut self, id: NodeId, side: Side) -> SchemaResult<Schema> {
        self.convert_at(id, side, "#")
    }

    /// Convert `id`, labelling diagnostics with `root`.
    pub fn convert_at(&mut self, id: NodeId, side: Side, root: &str) -> SchemaResult<Schema> {
        let fresh = self.cx.reference(id).is_none();
        let schema = self.convert_component(id, side, root)?;
        if fresh {
            if let Some((name, RefStatus::Complete)) = self.cx.reference(id) {
                if let Some(definition) = self.cx.definitions().get(name) {
                    return Ok(definition.clone());
                }
            }
        }
        Ok(schema)
    }

    /// Convert `id`, always emitting a reference for named nodes.
    ///
    /// This is the form used inside documents, where request and response
    /// bodies point at `components.schemas`.
    pub fn convert_component(
        &mut self,
        id: NodeId,
        side: Side,
        root: &str,
    ) -> SchemaResult<Schema> {
        self.cx.reset_path(root);
        self.visit(id, side)
    }

    fn node(&self, id: NodeId) -> SchemaResult<&'a SchemaNode> {
        let arena: &'a SchemaArena = self.arena;
        arena
            .get(id)
            .ok_or(SchemaError::UnknownNode { index: id.index() })
    }

    fn reference(&self, name: &str) -> Schema {
        Schema::reference(self.config.reference_to(name))
    }

    fn is_3_1(&self) -> bool {
        self.config.version.is_3_1()
    }

    fn tolerate(&self, err: SchemaError) -> SchemaResult<()> {
        if !err.is_recoverable() {
            return Err(err);
        }
        match self.config.error_mode {
            ErrorMode::Throw => Err(err),
            ErrorMode::Warn => {
                warn!(error = %err, path = %self.cx.path_string(), "schema conversion degraded");
                Ok(())
            }
            ErrorMode::Ignore => Ok(()),
        }
    }

    fn fail(&self, err: SchemaError) -> SchemaResult<Schema> {
        self.tolerate(err).map(|()| Schema::any())
    }

    fn visit(&mut self, id: NodeId, side: Side) -> SchemaResult<Schema> {
        let node = self.node(id)?;

        if let Some((name, status)) = self.cx.reference(id) {
            let name = name.to_string();
            if status == RefStatus::Complete && self.cx.has_context_effects(&name) {
                self.cx.record_effect(&name, side, EffectSource::Context);
                if let Err(err) = self.cx.check_effects(&name) {
                    self.tolerate(err)?;
                }
            }
            return Ok(self.reference(&name));
        }

        if let Some(name) = node.name() {
            match self.cx.register(id, name) {
                Ok(()) => return self.visit_named(id, node, name, side),
                Err(err) => self.tolerate(err)?,
            }
        }

        if self.cx.closes_cycle(id) {
            return self.fail(SchemaError::circular(self.cx.path_string()));
        }
        let frame = self.cx.begin_visit(id);
        let rendered = self.render(node, side);
        self.cx.end_visit(id, frame);
        rendered
    }

    fn visit_named(
        &mut self,
        id: NodeId,
        node: &'a SchemaNode,
        name: &str,
        side: Side,
    ) -> SchemaResult<Schema> {
        debug!(schema = name, %side, "rendering named schema");
        self.cx.push_enclosing(name);
        let frame = self.cx.begin_visit(id);
        let rendered = self.render(node, side);
        self.cx.end_visit(id, frame);
        self.cx.pop_enclosing();

        let body = rendered?;
        if let Err(err) = self.cx.check_effects(name) {
            self.tolerate(err)?;
        }
        self.cx.complete(id, body);
        Ok(self.reference(name))
    }

    fn child(&mut self, id: NodeId, side: Side, segments: &[&str]) -> SchemaResult<Schema> {
        for segment in segments {
            self.cx.enter(*segment);
        }
        let result = self.visit(id, side);
        for _ in segments {
            self.cx.leave();
        }
        result
    }

    fn render(&mut self, node: &'a SchemaNode, side: Side) -> SchemaResult<Schema> {
        let schema = self.render_kind(&node.kind, side)?;
        Ok(self.attach_meta(schema, &node.meta))
    }

    fn render_kind(&mut self, kind: &'a NodeKind, side: Side) -> SchemaResult<Schema> {
        match kind {
            NodeKind::Boolean => Ok(Schema::boolean()),
            NodeKind::Null => Ok(self.null_schema()),
            NodeKind::Number(number) => Ok(render_number(number)),
            NodeKind::String(string) => Ok(render_string(string)),
            NodeKind::Literal(value) => Ok(self.render_literal(value)),
            NodeKind::Enum(values) => Ok(self.render_enum(values)),
            NodeKind::Any | NodeKind::Undefined => Ok(Schema::any()),
            NodeKind::Custom(kind) => {
                self.fail(SchemaError::unsupported(kind.clone(), self.cx.path_string()))
            }
            NodeKind::Array {
                items,
                min_items,
                max_items,
            } => {
                let mut schema = Schema::array(self.child(*items, side, &["items"])?);
                schema.min_items = *min_items;
                schema.max_items = *max_items;
                Ok(schema)
            }
            NodeKind::Tuple { items, rest } => self.render_tuple(items, *rest, side),
            NodeKind::Object {
                properties,
                rest,
                closed,
            } => self.render_object(properties, *rest, *closed, side),
            NodeKind::Record { key, value } => self.render_record(*key, *value, side),
            NodeKind::Union {
                options,
                exclusive,
                discriminator,
            } => self.render_union(options, *exclusive, discriminator.as_deref(), side),
            NodeKind::Intersect(options) => self.render_intersect(options, side),
            NodeKind::Nullable(inner) => {
                let schema = self.visit(*inner, side)?;
                Ok(self.make_nullable(schema))
            }
            NodeKind::Optional { inner, default } => {
                let schema = self.visit(*inner, side)?;
                Ok(match default {
                    Some(value) => self.with_default(schema, value.clone()),
                    None => schema,
                })
            }
            NodeKind::Lazy(getter) => {
                let target = match self.cx.resolved_getter(*getter) {
                    Some(target) => target,
                    None => {
                        let resolve = self
                            .arena
                            .getter(*getter)
                            .ok_or(SchemaError::UnknownGetter {
                                index: getter.index(),
                            })?;
                        let target = resolve();
                        self.cx.cache_getter(*getter, target);
                        target
                    }
                };
                self.visit(target, side)
            }
            NodeKind::Pipe {
                base,
                result,
                effect,
            } => self.render_pipe(*base, *result, *effect, side),
        }
    }

    fn null_schema(&self) -> Schema {
        if self.is_3_1() {
            Schema::typed(SchemaType::Null)
        } else {
            Schema {
                nullable: true,
                enum_values: vec![Value::Null],
                ..Schema::default()
            }
        }
    }

    fn render_literal(&self, value: &Value) -> Schema {
        if value.is_null() {
            let mut schema = self.null_schema();
            if self.is_3_1() {
                schema.const_value = Some(Value::Null);
            }
            return schema;
        }
        let mut schema = Schema::typed(SchemaType::of_value(value));
        if self.is_3_1() {
            schema.const_value = Some(value.clone());
        } else {
            schema.enum_values = vec![value.clone()];
        }
        schema
    }

    fn render_enum(&self, values: &[Value]) -> Schema {
        let mut types: Vec<SchemaType> = Vec::new();
        for value in values {
            let ty = SchemaType::of_value(value);
            if !types.contains(&ty) {
                types.push(ty);
            }
        }

        if self.is_3_1() {
            let schema_type = match types.as_slice() {
                [] => None,
                [single] => Some(SchemaTypeSet::Single(*single)),
                _ => Some(SchemaTypeSet::Multiple(types)),
            };
            return Schema {
                schema_type,
                enum_values: values.to_vec(),
                ..Schema::default()
            };
        }

        let nullable = types.contains(&SchemaType::Null);
        types.retain(|ty| *ty != SchemaType::Null);
        match types.as_slice() {
            [] | [_] => Schema {
                schema_type: types.first().map(|ty| SchemaTypeSet::Single(*ty)),
                enum_values: values.to_vec(),
                nullable,
                ..Schema::default()
            },
            _ => {
                let mut one_of: Vec<Schema> = types
                    .iter()
                    .map(|ty| Schema {
                        schema_type: Some(SchemaTypeSet::Single(*ty)),
                        enum_values: values
                            .iter()
                            .filter(|v| SchemaType::of_value(v) == *ty)
                            .cloned()
                            .collect(),
                        ..Schema::default()
                    })
                    .collect();
                if nullable {
                    one_of.push(self.null_schema());
                }
                Schema {
                    one_of,
                    ..Schema::default()
                }
            }
        }
    }

    fn render_tuple(
        &mut self,
        items: &[NodeId],
        rest: Option<NodeId>,
        side: Side,
    ) -> SchemaResult<Schema> {
        let mut schema = Schema::typed(SchemaType::Array);
        let len = items.len() as u64;

        if self.is_3_1() {
            for (index, item) in items.iter().enumerate() {
                let converted = self.child(*item, side, &["prefixItems", &index.to_string()])?;
                schema.prefix_items.push(converted);
            }
            match rest {
                Some(rest) => {
                    schema.items = Some(Box::new(self.child(rest, side, &["items"])?));
                }
                None => {
                    schema.min_items = Some(len);
                    schema.max_items = Some(len);
                }
            }
            return Ok(schema);
        }

        let mut members = Vec::with_capacity(items.len() + 1);
        for (index, item) in items.iter().enumerate() {
            members.push(self.child(*item, side, &["items", "oneOf", &index.to_string()])?);
        }
        if let Some(rest) = rest {
            let index = members.len().to_string();
            members.push(self.child(rest, side, &["items", "oneOf", &index])?);
        } else {
            schema.min_items = Some(len);
            schema.max_items = Some(len);
        }
        if !members.is_empty() {
            schema.items = Some(Box::new(Schema {
                one_of: members,
                ..Schema::default()
            }));
        }
        Ok(schema)
    }

    fn render_object(
        &mut self,
        properties: &'a IndexMap<String, NodeId>,
        rest: Option<NodeId>,
        closed: bool,
        side: Side,
    ) -> SchemaResult<Schema> {
        let mut schema = Schema::object();
        for (key, child) in properties {
            let converted = self.child(*child, side, &["properties", key])?;
            schema.properties.insert(key.clone(), converted);
            if !self.arena.is_optional(*child) {
                schema.required.push(key.clone());
            }
        }
        schema.additional_properties = match rest {
            Some(rest) => Some(AdditionalProperties::Schema(Box::new(self.child(
                rest,
                side,
                &["additionalProperties"],
            )?))),
            None if closed => Some(AdditionalProperties::Allowed(false)),
            None => None,
        };
        Ok(schema)
    }

    fn render_record(&mut self, key: NodeId, value: NodeId, side: Side) -> SchemaResult<Schema> {
        let mut schema = Schema::object();
        let values = self.child(value, side, &["additionalProperties"])?;
        let (_, key_node) = self
            .arena
            .resolve(key)
            .ok_or(SchemaError::UnknownNode { index: key.index() })?;

        if self.is_3_1() {
            let constrained = key_node.name().is_some()
                || matches!(
                    &key_node.kind,
                    NodeKind::String(StringNode {
                        pattern: Some(_),
                        ..
                    }) | NodeKind::Enum(_)
                        | NodeKind::Literal(_)
                );
            if constrained {
                schema.property_names = Some(Box::new(self.child(key, side, &["propertyNames"])?));
            }
            schema.additional_properties = Some(AdditionalProperties::Schema(Box::new(values)));
            return Ok(schema);
        }

        let finite: Option<Vec<String>> = match &key_node.kind {
            NodeKind::Enum(options) => Some(options.iter().map(key_string).collect()),
            NodeKind::Literal(option) => Some(vec![key_string(option)]),
            _ => None,
        };
        match finite {
            Some(keys) => {
                for key in keys {
                    schema.properties.insert(key.clone(), values.clone());
                    schema.required.push(key);
                }
                schema.additional_properties = Some(AdditionalProperties::Allowed(false));
            }
            None => {
                schema.additional_properties =
                    Some(AdditionalProperties::Schema(Box::new(values)));
            }
        }
        Ok(schema)
    }

    fn render_union(
        &mut self,
        options: &[NodeId],
        exclusive: bool,
        discriminator: Option<&str>,
        side: Side,
    ) -> SchemaResult<Schema> {
        let kept: Vec<NodeId> = options
            .iter()
            .copied()
            .filter(|option| {
                !matches!(
                    self.arena.resolve(*option).map(|(_, node)| &node.kind),
                    Some(NodeKind::Undefined)
                )
            })
            .collect();

        match kept.as_slice() {
            [] => return Ok(Schema::any()),
            [only] => return self.visit(*only, side),
            _ => {}
        }

        let one_of = exclusive
            || discriminator.is_some()
            || self.config.union_style == UnionStyle::OneOf;
        let keyword = if one_of { "oneOf" } else { "anyOf" };

        let mut branches = Vec::with_capacity(kept.len());
        for (index, option) in kept.iter().enumerate() {
            branches.push(self.child(*option, side, &[keyword, &index.to_string()])?);
        }

        let mut schema = Schema::default();
        if one_of {
            schema.one_of = branches;
        } else {
            schema.any_of = branches;
        }
        if let Some(property) = discriminator {
            schema.discriminator = self.discriminator(&kept, property);
        }
        Ok(schema)
    }

    /// Mapping from discriminant values to branch references, when every
    /// branch is a named object whose discriminant is a literal or enum.
    fn discriminator(&self, branches: &[NodeId], property: &str) -> Option<Discriminator> {
        let mut mapping = IndexMap::new();
        for branch in branches {
            let (_, node) = self.arena.resolve(*branch)?;
            let name = node.name()?;
            let NodeKind::Object { properties, .. } = &node.kind else {
                return None;
            };
            let (_, discriminant) = self.arena.resolve(*properties.get(property)?)?;
            let values = match &discriminant.kind {
                NodeKind::Literal(value) => std::slice::from_ref(value),
                NodeKind::Enum(values) => values.as_slice(),
                _ => return None,
            };
            for value in values {
                mapping.insert(key_string(value), self.config.reference_to(name));
            }
        }
        Some(Discriminator {
            property_name: property.to_string(),
            mapping,
        })
    }

    fn render_intersect(&mut self, options: &[NodeId], side: Side) -> SchemaResult<Schema> {
        let mut parts = Vec::with_capacity(options.len());
        for (index, option) in options.iter().enumerate() {
            parts.push(self.child(*option, side, &["allOf", &index.to_string()])?);
        }

        if !options.is_empty() && self.flattenable(options) {
            let mut merged = Schema::object();
            for part in parts {
                merged.properties.extend(part.properties);
                merged.required.extend(part.required);
            }
            return Ok(merged);
        }

        Ok(Schema {
            all_of: parts,
            ..Schema::default()
        })
    }

    /// Whether the options are unnamed open objects with disjoint keys.
    fn flattenable(&self, options: &[NodeId]) -> bool {
        let mut seen = std::collections::HashSet::new();
        options.iter().all(|option| {
            let Some((_, node)) = self.arena.resolve(*option) else {
                return false;
            };
            let plain = node.meta == NodeMeta::default();
            match &node.kind {
                NodeKind::Object {
                    properties,
                    rest: None,
                    closed: false,
                } if plain => properties.keys().all(|key| seen.insert(key.as_str())),
                _ => false,
            }
        })
    }

    fn make_nullable(&self, mut schema: Schema) -> Schema {
        if !self.is_3_1() {
            if schema.is_reference() {
                return Schema {
                    all_of: vec![schema],
                    nullable: true,
                    ..Schema::default()
                };
            }
            schema.nullable = true;
            push_null(&mut schema.enum_values);
            return schema;
        }

        let null = Schema::typed(SchemaType::Null);
        if schema.is_reference() {
            return Schema {
                any_of: vec![schema, null],
                ..Schema::default()
            };
        }
        if !schema.any_of.is_empty() {
            if !schema.any_of.contains(&null) {
                schema.any_of.push(null);
            }
            return schema;
        }
        if !schema.one_of.is_empty() {
            if !schema.one_of.contains(&null) {
                schema.one_of.push(null);
            }
            return schema;
        }
        if let Some(constant) = schema.const_value.take() {
            schema.enum_values = vec![constant];
        }
        if let Some(ty) = schema.schema_type.take() {
            schema.schema_type = Some(ty.with(SchemaType::Null));
            if !schema.enum_values.is_empty() {
                push_null(&mut schema.enum_values);
            }
            return schema;
        }
        if !schema.enum_values.is_empty() {
            push_null(&mut schema.enum_values);
            return schema;
        }
        if schema.is_empty() {
            return schema;
        }
        Schema {
            any_of: vec![schema, null],
            ..Schema::default()
        }
    }

    fn with_default(&self, mut schema: Schema, default: Value) -> Schema {
        if schema.is_reference() && !self.is_3_1() {
            schema = Schema {
                all_of: vec![schema],
                ..Schema::default()
            };
        }
        schema.default = Some(default);
        schema
    }

    fn render_pipe(
        &mut self,
        base: NodeId,
        result: Option<NodeId>,
        effect: Option<EffectDirection>,
        side: Side,
    ) -> SchemaResult<Schema> {
        match (effect, result) {
            (Some(EffectDirection::Same), _) | (None, None) => self.visit(base, side),
            (Some(EffectDirection::Input), _) => {
                self.cx.record_enclosing(Side::Input, EffectSource::Declared);
                self.visit(base, side)
            }
            (Some(EffectDirection::Output), result) => {
                self.cx.record_enclosing(Side::Output, EffectSource::Declared);
                self.visit(result.unwrap_or(base), side)
            }
            (None, Some(result)) => {
                self.cx.record_enclosing(side, EffectSource::Context);
                match side {
                    Side::Input => self.visit(base, side),
                    Side::Output => self.visit(result, side),
                }
            }
        }
    }

    fn attach_meta(&self, mut schema: Schema, meta: &NodeMeta) -> Schema {
        if meta.description.is_none() && meta.example.is_none() && !meta.deprecated {
            return schema;
        }
        if schema.is_reference() && !self.is_3_1() {
            schema = Schema {
                all_of: vec![schema],
                ..Schema::default()
            };
        }
        if meta.description.is_some() {
            schema.description = meta.description.clone();
        }
        if meta.example.is_some() {
            schema.example = meta.example.clone();
        }
        schema.deprecated |= meta.deprecated;
        schema
    }
}

fn render_number(number: &NumberNode) -> Schema {
    let mut schema = if number.integer {
        Schema::integer()
    } else {
        Schema::number()
    };
    schema.minimum = number.minimum;
    schema.maximum = number.maximum;
    schema
}

fn render_string(string: &StringNode) -> Schema {
    let mut schema = Schema::string();
    schema.pattern = string.pattern.clone();
    schema.format = string.format.clone();
    schema.min_length = string.min_length;
    schema.max_length = string.max_length;
    schema
}

fn push_null(values: &mut Vec<Value>) {
    if !values.is_empty() && !values.contains(&Value::Null) {
        values.push(Value::Null);
    }
}

fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenApiVersion;
    use serde_json::json;

    fn v3_0() -> ConversionConfig {
        ConversionConfig::new().version(OpenApiVersion::V3_0)
    }

    fn render(arena: &SchemaArena, config: &ConversionConfig, id: NodeId) -> Value {
        let mut converter = SchemaConverter::new(arena, config);
        converter.convert(id, Side::Output).unwrap().to_value()
    }

    #[test]
    fn test_primitives() {
        let mut arena = SchemaArena::new();
        let int = arena.add(NodeKind::Number(NumberNode {
            integer: true,
            minimum: Some(1.0),
            maximum: None,
        }));
        let email = arena.add(NodeKind::String(StringNode {
            format: Some("email".to_string()),
            max_length: Some(64),
            ..StringNode::default()
        }));
        let config = ConversionConfig::default();

        assert_eq!(
            render(&arena, &config, int),
            json!({"type": "integer", "minimum": 1.0})
        );
        assert_eq!(
            render(&arena, &config, email),
            json!({"type": "string", "format": "email", "maxLength": 64})
        );
    }

    #[test]
    fn test_null_and_literal_per_version() {
        let mut arena = SchemaArena::new();
        let null = arena.add(NodeKind::Null);
        let lit = arena.literal("admin");

        let v31 = ConversionConfig::default();
        assert_eq!(render(&arena, &v31, null), json!({"type": "null"}));
        assert_eq!(
            render(&arena, &v31, lit),
            json!({"type": "string", "const": "admin"})
        );

        let v30 = v3_0();
        assert_eq!(
            render(&arena, &v30, null),
            json!({"nullable": true, "enum": [null]})
        );
        assert_eq!(
            render(&arena, &v30, lit),
            json!({"type": "string", "enum": ["admin"]})
        );
    }

    #[test]
    fn test_enum_type_inference() {
        let mut arena = SchemaArena::new();
        let numbers = arena.enumeration([1, 2, 3]);
        let mixed = arena.add(NodeKind::Enum(vec![json!("a"), json!(1)]));

        let v31 = ConversionConfig::default();
        assert_eq!(
            render(&arena, &v31, numbers),
            json!({"type": "number", "enum": [1, 2, 3]})
        );
        assert_eq!(
            render(&arena, &v31, mixed),
            json!({"type": ["string", "number"], "enum": ["a", 1]})
        );

        assert_eq!(
            render(&arena, &v3_0(), mixed),
            json!({"oneOf": [
                {"type": "string", "enum": ["a"]},
                {"type": "number", "enum": [1]}
            ]})
        );
    }

    #[test]
    fn test_object_required_and_rest() {
        let mut arena = SchemaArena::new();
        let s = arena.string();
        let opt = arena.optional(s);
        let int = arena.integer();
        let id = arena.add(NodeKind::Object {
            properties: [("name".to_string(), s), ("nick".to_string(), opt)]
                .into_iter()
                .collect(),
            rest: Some(int),
            closed: false,
        });
        let closed = arena.add(NodeKind::Object {
            properties: IndexMap::new(),
            rest: None,
            closed: true,
        });
        let config = ConversionConfig::default();

        assert_eq!(
            render(&arena, &config, id),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}, "nick": {"type": "string"}},
                "required": ["name"],
                "additionalProperties": {"type": "integer"}
            })
        );
        assert_eq!(
            render(&arena, &config, closed),
            json!({"type": "object", "additionalProperties": false})
        );
    }

    #[test]
    fn test_tuple_3_1_without_rest() {
        let mut arena = SchemaArena::new();
        let a = arena.string();
        let b = arena.integer();
        let c = arena.boolean();
        let tuple = arena.add(NodeKind::Tuple {
            items: vec![a, b, c],
            rest: None,
        });
        let schema = SchemaConverter::new(&arena, &ConversionConfig::default())
            .convert(tuple, Side::Input)
            .unwrap();
        assert_eq!(schema.prefix_items.len(), 3);
        assert_eq!(schema.min_items, Some(3));
        assert_eq!(schema.max_items, Some(3));
        assert!(schema.items.is_none());
    }

    #[test]
    fn test_tuple_with_rest() {
        let mut arena = SchemaArena::new();
        let a = arena.string();
        let rest = arena.integer();
        let tuple = arena.add(NodeKind::Tuple {
            items: vec![a],
            rest: Some(rest),
        });

        assert_eq!(
            render(&arena, &ConversionConfig::default(), tuple),
            json!({"type": "array", "prefixItems": [{"type": "string"}], "items": {"type": "integer"}})
        );
        assert_eq!(
            render(&arena, &v3_0(), tuple),
            json!({"type": "array", "items": {"oneOf": [{"type": "string"}, {"type": "integer"}]}})
        );
    }

    #[test]
    fn test_tuple_3_0_without_rest() {
        let mut arena = SchemaArena::new();
        let a = arena.string();
        let b = arena.integer();
        let tuple = arena.add(NodeKind::Tuple {
            items: vec![a, b],
            rest: None,
        });
        assert_eq!(
            render(&arena, &v3_0(), tuple),
            json!({
                "type": "array",
                "items": {"oneOf": [{"type": "string"}, {"type": "integer"}]},
                "minItems": 2,
                "maxItems": 2
            })
        );
    }

    #[test]
    fn test_record_keys() {
        let mut arena = SchemaArena::new();
        let key = arena.enumeration(["a", "b"]);
        let value = arena.integer();
        let record = arena.add(NodeKind::Record { key, value });

        assert_eq!(
            render(&arena, &ConversionConfig::default(), record),
            json!({
                "type": "object",
                "additionalProperties": {"type": "integer"},
                "propertyNames": {"type": "string", "enum": ["a", "b"]}
            })
        );
        assert_eq!(
            render(&arena, &v3_0(), record),
            json!({
                "type": "object",
                "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
                "required": ["a", "b"],
                "additionalProperties": false
            })
        );

        let plain_key = arena.string();
        let open = arena.add(NodeKind::Record {
            key: plain_key,
            value,
        });
        assert_eq!(
            render(&arena, &v3_0(), open),
            json!({"type": "object", "additionalProperties": {"type": "integer"}})
        );
    }

    #[test]
    fn test_union_drops_undefined() {
        let mut arena = SchemaArena::new();
        let s = arena.string();
        let undefined = arena.add(NodeKind::Undefined);
        let single = arena.add(NodeKind::union([s, undefined]));
        let i = arena.integer();
        let pair = arena.add(NodeKind::union([s, undefined, i]));

        let config = ConversionConfig::default();
        assert_eq!(render(&arena, &config, single), json!({"type": "string"}));
        assert_eq!(
            render(&arena, &config, pair),
            json!({"anyOf": [{"type": "string"}, {"type": "integer"}]})
        );

        let one_of = ConversionConfig::new().union_style(UnionStyle::OneOf);
        assert_eq!(
            render(&arena, &one_of, pair),
            json!({"oneOf": [{"type": "string"}, {"type": "integer"}]})
        );
    }

    #[test]
    fn test_intersect_flatten_and_all_of() {
        let mut arena = SchemaArena::new();
        let s = arena.string();
        let i = arena.integer();
        let a = arena.object([("a", s)]);
        let b = arena.object([("b", i)]);
        let flat = arena.add(NodeKind::Intersect(vec![a, b]));
        let config = ConversionConfig::default();

        assert_eq!(
            render(&arena, &config, flat),
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": "integer"}},
                "required": ["a", "b"]
            })
        );

        let overlap = arena.object([("a", i)]);
        let kept = arena.add(NodeKind::Intersect(vec![a, overlap]));
        let value = render(&arena, &config, kept);
        assert_eq!(value["allOf"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_nullable_3_1() {
        let mut arena = SchemaArena::new();
        let s = arena.string();
        let nullable = arena.nullable(s);
        let user = arena.named("User", NodeKind::object([("name", s)]));
        let nullable_ref = arena.nullable(user);
        let lit = arena.literal("x");
        let nullable_lit = arena.nullable(lit);

        let config = ConversionConfig::default();
        assert_eq!(
            render(&arena, &config, nullable),
            json!({"type": ["string", "null"]})
        );
        assert_eq!(
            render(&arena, &config, nullable_ref),
            json!({"anyOf": [{"$ref": "#/components/schemas/User"}, {"type": "null"}]})
        );
        assert_eq!(
            render(&arena, &config, nullable_lit),
            json!({"type": ["string", "null"], "enum": ["x", null]})
        );
    }

    #[test]
    fn test_nullable_3_0() {
        let mut arena = SchemaArena::new();
        let e = arena.enumeration(["a", "b"]);
        let nullable = arena.nullable(e);
        let user = arena.named("User", NodeKind::object([("tag", e)]));
        let nullable_ref = arena.nullable(user);

        let config = v3_0();
        assert_eq!(
            render(&arena, &config, nullable),
            json!({"type": "string", "enum": ["a", "b", null], "nullable": true})
        );
        assert_eq!(
            render(&arena, &config, nullable_ref),
            json!({"allOf": [{"$ref": "#/components/schemas/User"}], "nullable": true})
        );
    }

    #[test]
    fn test_optional_default() {
        let mut arena = SchemaArena::new();
        let user = arena.named("User", NodeKind::Any);
        let with_default = arena.add(NodeKind::Optional {
            inner: user,
            default: Some(json!({})),
        });

        assert_eq!(
            render(&arena, &ConversionConfig::default(), with_default),
            json!({"$ref": "#/components/schemas/User", "default": {}})
        );
        assert_eq!(
            render(&arena, &v3_0(), with_default),
            json!({"allOf": [{"$ref": "#/components/schemas/User"}], "default": {}})
        );
    }

    #[test]
    fn test_metadata_attached() {
        let mut arena = SchemaArena::new();
        let s = arena.string();
        arena.describe(s, "Display name");
        arena.set_example(s, json!("Ada"));
        arena.deprecate(s);

        assert_eq!(
            render(&arena, &ConversionConfig::default(), s),
            json!({"type": "string", "description": "Display name", "example": "Ada", "deprecated": true})
        );
    }

    #[test]
    fn test_named_reused_as_reference() {
        let mut arena = SchemaArena::new();
        let s = arena.string();
        let user = arena.named("User", NodeKind::object([("name", s)]));
        let config = ConversionConfig::default();
        let mut converter = SchemaConverter::new(&arena, &config);

        let first = converter.convert(user, Side::Output).unwrap();
        assert!(!first.is_reference());
        let second = converter.convert(user, Side::Output).unwrap();
        assert_eq!(
            second,
            Schema::reference("#/components/schemas/User")
        );
        assert_eq!(converter.definitions()["User"], first);
    }

    #[test]
    fn test_custom_kind_modes() {
        let mut arena = SchemaArena::new();
        let custom = arena.add(NodeKind::Custom("bigint".to_string()));

        let throw = ConversionConfig::default();
        let err = SchemaConverter::new(&arena, &throw)
            .convert(custom, Side::Input)
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedNodeKind { ref kind, .. } if kind == "bigint"));

        for mode in [ErrorMode::Ignore, ErrorMode::Warn] {
            let config = ConversionConfig::new().error_mode(mode);
            let schema = SchemaConverter::new(&arena, &config)
                .convert(custom, Side::Input)
                .unwrap();
            assert!(schema.is_empty());
        }
    }

    #[test]
    fn test_unknown_node_always_propagates() {
        let arena = SchemaArena::new();
        let mut other = SchemaArena::new();
        let dangling = other.boolean();
        let config = ConversionConfig::new().error_mode(ErrorMode::Ignore);
        let err = SchemaConverter::new(&arena, &config)
            .convert(dangling, Side::Input)
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownNode { index: 0 });
    }
}
