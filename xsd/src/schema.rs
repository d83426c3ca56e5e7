use super::{
    annotation::Annotation,
    attribute_decl::AttributeDeclaration,
    attribute_group_def::AttributeGroupDefinition,
    bucket::{BucketKind, BucketLookup},
    components::{
        Component, ComponentTable, ComponentTraits, HasArenaContainer, Lookup, LookupTables,
        NamedXml,
    },
    element_decl::ElementDeclaration,
    error::XsdError,
    identity_constraint_def::IdentityConstraintDefinition,
    import::Import,
    mapping_context::{RootContext, TopLevel, TopLevelElements},
    model_group_def::ModelGroupDefinition,
    notation_decl::NotationDeclaration,
    shared::TypeDefinition,
    values::actual_value,
    xstypes::{Sequence, Set},
    ComplexTypeDefinition, MappingContext, Ref, SimpleTypeDefinition,
};
use roxmltree::Node;

/// Schema Component: Schema, a kind of Annotated Component (§3.17)
#[derive(Clone, Debug)]
pub struct Schema {
    pub annotations: Sequence<Ref<Annotation>>,
    pub type_definitions: Set<TypeDefinition>,
    pub attribute_declarations: Set<Ref<AttributeDeclaration>>,
    pub element_declarations: Set<Ref<ElementDeclaration>>,
    pub attribute_group_definitions: Set<Ref<AttributeGroupDefinition>>,
    pub model_group_definitions: Set<Ref<ModelGroupDefinition>>,
    pub notation_declarations: Set<Ref<NotationDeclaration>>,
    pub identity_constraint_definitions: Set<Ref<IdentityConstraintDefinition>>,

    /// This property is not required by the XSD specification, but is used to
    /// store the original target namespace of the schema.
    pub target_namespace: Option<String>,
}

impl Schema {
    pub fn map_from_xml(
        root_context: &mut RootContext,
        schema: Node,
    ) -> Result<Self, crate::error::XsdError> {
        assert_eq!(schema.tag_name().name(), "schema");

        let target_namespace = schema
            .attribute("targetNamespace")
            .map(|s| actual_value(s, schema));

        let mut context = MappingContext::new(root_context, schema);

        let mut type_definitions = Set::new();
        let mut attribute_declarations = Set::new();
        let mut element_declarations = Set::new();
        let mut attribute_group_definitions = Set::new();
        let mut model_group_definitions = Set::new();
        let mut notation_declarations = Set::new();
        let mut identity_constraint_definitions = Set::new();

        for import in schema
            .children()
            .filter(|c| c.tag_name().name() == Import::TAG_NAME)
        {
            let import = Import::map_from_xml(import, schema)?;
            let child_schema = context.root_mut().resolve_import(&import);

            // NOTE: Import failure is not an error, but there should be a way to emit a
            // notification (and corresponding errors) to the user.

            if let Some(child_schema) = child_schema {
                type_definitions.extend(child_schema.type_definitions);
                attribute_declarations.extend(child_schema.attribute_declarations);
                element_declarations.extend(child_schema.element_declarations);
                attribute_group_definitions.extend(child_schema.attribute_group_definitions);
                model_group_definitions.extend(child_schema.model_group_definitions);
                notation_declarations.extend(child_schema.notation_declarations);
                identity_constraint_definitions
                    .extend(child_schema.identity_constraint_definitions);
            } else {
                tracing::warn!(?import, "failed to resolve import");
            }
        }

        for include in schema
            .children()
            .filter(|c| c.tag_name().name() == "include")
        {
            let location = include
                .attribute("schemaLocation")
                .ok_or_else(|| {
                    XsdError::SchemaRepresentation(
                        "src-include",
                        "<include> is missing a schemaLocation attribute".to_string(),
                    )
                })?
                .to_string();

            let child_schema = acquire_assembled_schema(
                &mut context,
                BucketKind::Include,
                &location,
                target_namespace.as_deref(),
            )?;

            type_definitions.extend(child_schema.type_definitions);
            attribute_declarations.extend(child_schema.attribute_declarations);
            element_declarations.extend(child_schema.element_declarations);
            attribute_group_definitions.extend(child_schema.attribute_group_definitions);
            model_group_definitions.extend(child_schema.model_group_definitions);
            notation_declarations.extend(child_schema.notation_declarations);
            identity_constraint_definitions.extend(child_schema.identity_constraint_definitions);
        }

        for redefine in schema
            .children()
            .filter(|c| c.tag_name().name() == "redefine")
        {
            let location = redefine
                .attribute("schemaLocation")
                .ok_or_else(|| {
                    XsdError::SchemaRepresentation(
                        "src-redefine",
                        "<redefine> is missing a schemaLocation attribute".to_string(),
                    )
                })?
                .to_string();

            let child_schema = acquire_assembled_schema(
                &mut context,
                BucketKind::Redefine,
                &location,
                target_namespace.as_deref(),
            )?;

            type_definitions.extend(child_schema.type_definitions.iter().copied());
            attribute_declarations.extend(child_schema.attribute_declarations);
            element_declarations.extend(child_schema.element_declarations);
            attribute_group_definitions
                .extend(child_schema.attribute_group_definitions.iter().copied());
            model_group_definitions.extend(child_schema.model_group_definitions.iter().copied());
            notation_declarations.extend(child_schema.notation_declarations);
            identity_constraint_definitions.extend(child_schema.identity_constraint_definitions);

            redefine_children(
                &mut context,
                redefine,
                schema,
                &mut type_definitions,
                &mut attribute_group_definitions,
                &mut model_group_definitions,
            )?;
        }

        fn reserve_top_level<'a, 'input: 'a, C>(
            context: &mut MappingContext<'a, '_, 'input, '_>,
            node: Node<'a, 'input>,
            schema: Node,
        ) where
            C: Component + NamedXml,
            ComponentTraits: HasArenaContainer<C>,
            LookupTables: Lookup<Ref<C>>,
            TopLevelElements<'a, 'input>: TopLevel<'a, 'input, C>,
        {
            let name = C::get_name_from_xml(node, schema);
            let ref_ = context.reserve::<C>();
            context.register_with_name(name, ref_);
            context.top_level_refs.insert(node, ref_);
        }

        for top_level_element in schema.children().filter(|e| e.is_element()) {
            match top_level_element.tag_name().name() {
                SimpleTypeDefinition::TAG_NAME => {
                    // TODO unnamed top level allowed?
                    let name = SimpleTypeDefinition::name_from_xml(top_level_element, schema)
                        .ok_or(crate::error::XsdError::UnnamedTopLevelElement)?;
                    let std_ref = context.reserve();
                    context.register_with_name(name, TypeDefinition::Simple(std_ref));
                    context.top_level_refs.insert(top_level_element, std_ref);
                }
                ComplexTypeDefinition::TAG_NAME => {
                    let name = ComplexTypeDefinition::name_from_xml(top_level_element, schema)
                        .ok_or(crate::error::XsdError::UnnamedTopLevelElement)?;
                    let ctd_ref = context.reserve();
                    context.register_with_name(name, TypeDefinition::Complex(ctd_ref));
                    context.top_level_refs.insert(top_level_element, ctd_ref);
                }
                AttributeDeclaration::TAG_NAME => {
                    reserve_top_level::<AttributeDeclaration>(
                        &mut context,
                        top_level_element,
                        schema,
                    );
                }
                ElementDeclaration::TAG_NAME => {
                    reserve_top_level::<ElementDeclaration>(
                        &mut context,
                        top_level_element,
                        schema,
                    );
                }
                AttributeGroupDefinition::TAG_NAME => {
                    reserve_top_level::<AttributeGroupDefinition>(
                        &mut context,
                        top_level_element,
                        schema,
                    );
                }
                ModelGroupDefinition::TAG_NAME => {
                    reserve_top_level::<ModelGroupDefinition>(
                        &mut context,
                        top_level_element,
                        schema,
                    );
                }
                NotationDeclaration::TAG_NAME => {
                    reserve_top_level::<NotationDeclaration>(
                        &mut context,
                        top_level_element,
                        schema,
                    );
                }
                IdentityConstraintDefinition::KEY_TAG_NAME
                | IdentityConstraintDefinition::KEYREF_TAG_NAME
                | IdentityConstraintDefinition::UNIQUE_TAG_NAME => {
                    reserve_top_level::<IdentityConstraintDefinition>(
                        &mut context,
                        top_level_element,
                        schema,
                    );
                }

                // These tags don't directly contribute top-level components
                Annotation::TAG_NAME | Import::TAG_NAME => {}

                _ => {
                    return Err(crate::error::XsdError::UnknownTopLevelElement(
                        top_level_element.tag_name().name().into(),
                    ))
                }
            }

            top_level_element.descendants().for_each(|e| {
                // "The identity-constraint definitions corresponding to all the <key>, <keyref>,
                // and <unique> element information items *anywhere within* the [children], if any
                // [...]" - Spec pt.1, 3.17.2 XML Representation of Schema Components,
                // {identity-constraint definitions} representation
                if IdentityConstraintDefinition::TAG_NAMES.contains(&e.tag_name().name()) {
                    reserve_top_level::<IdentityConstraintDefinition>(&mut context, e, schema);
                }
            });
        }

        // {type definitions}
        //   The simple and complex type definitions corresponding to all the <simpleType> and
        //   <complexType> element information items in the [children], if any, plus any
        //   definitions brought in via <include> (see Assembling a schema for a single target
        //   namespace from multiple schema definition documents (<include>) (§4.2.3)), <override>
        //   (see Overriding component definitions (<override>) (§4.2.5)), <redefine> (see
        //   Including modified component definitions (<redefine>) (§4.2.4)), and <import> (see
        //   References to schema components across namespaces (<import>) (§4.2.6)).
        for simple_type in schema
            .children()
            .filter(|e| e.tag_name().name() == SimpleTypeDefinition::TAG_NAME)
        {
            let simple_type_def = context.request_ref_by_node(simple_type);
            type_definitions.push(TypeDefinition::Simple(simple_type_def));
        }
        for complex_type in schema
            .children()
            .filter(|e| e.tag_name().name() == ComplexTypeDefinition::TAG_NAME)
        {
            let complex_type_def = context.request_ref_by_node(complex_type);
            type_definitions.push(TypeDefinition::Complex(complex_type_def));
        }

        // {attribute declarations}
        //   The (top-level) attribute declarations corresponding to all the <attribute> element
        //   information items in the [children], if any, plus any declarations brought in via
        //   <include>, <override>, <redefine>, and <import>.
        for attribute_decl in schema
            .children()
            .filter(|e| e.tag_name().name() == AttributeDeclaration::TAG_NAME)
        {
            let attribute_decl = context.request_ref_by_node(attribute_decl);
            attribute_declarations.push(attribute_decl);
        }

        // {element declarations}
        //   The (top-level) element declarations corresponding to all the <element> element
        //   information items in the [children], if any, plus any declarations brought in via
        //   <include>, <override>, <redefine>, and <import>.
        for element_decl in schema
            .children()
            .filter(|e| e.tag_name().name() == ElementDeclaration::TAG_NAME)
        {
            let element_decl = context.request_ref_by_node(element_decl);
            element_declarations.push(element_decl);
        }

        // {attribute group definitions}
        //   The attribute group definitions corresponding to all the <attributeGroup> element
        //   information items in the [children], if any, plus any definitions brought in via
        //   <include>, <override>, <redefine>, and <import>.
        for attribute_group_def in schema
            .children()
            .filter(|e| e.tag_name().name() == AttributeGroupDefinition::TAG_NAME)
        {
            let attribute_group_def = context.request_ref_by_node(attribute_group_def);
            attribute_group_definitions.push(attribute_group_def);
        }

        // {model group definitions}
        //   The model group definitions corresponding to all the <group> element information items
        //   in the [children], if any, plus any definitions brought in via <include>, <redefine>
        //   and <import>.
        for model_group_def in schema
            .children()
            .filter(|e| e.tag_name().name() == ModelGroupDefinition::TAG_NAME)
        {
            let model_group_def = context.request_ref_by_node(model_group_def);
            model_group_definitions.push(model_group_def);
        }

        // {notation declarations}
        //   The notation declarations corresponding to all the <notation> element information
        //   items in the [children], if any, plus any declarations brought in via <include>,
        //   <override>, <redefine>, and <import>.
        for notation_decl in schema
            .children()
            .filter(|e| e.tag_name().name() == NotationDeclaration::TAG_NAME)
        {
            let notation_decl = context.request_ref_by_node(notation_decl);
            notation_declarations.push(notation_decl);
        }

        // {identity-constraint definitions}
        //   The identity-constraint definitions corresponding to all the <key>, <keyref>, and
        //   <unique> element information items anywhere within the [children], if any, plus any
        //   definitions brought in via <include>, <override>, <redefine>, and <import>.
        for icd in schema
            .descendants()
            .filter(|e| IdentityConstraintDefinition::TAG_NAMES.contains(&e.tag_name().name()))
        {
            let icd = context.request_ref_by_node(icd);
            identity_constraint_definitions.push(icd);
        }

        // {annotations}
        //   The ·annotation mapping· of the set of elements containing the <schema> and all the
        //   <include>, <redefine>, <override>, <import>, and <defaultOpenContent> [children], if
        //   any, as defined in XML Representation of Annotation Schema Components (§3.15.2).
        let mut annot_elements = vec![schema];
        schema
            .children()
            .filter(|e| {
                [
                    "include",
                    "redefine",
                    "override",
                    "import",
                    "defaultOpenContent",
                ]
                .contains(&e.tag_name().name())
            })
            .for_each(|e| annot_elements.push(e));
        let annotations =
            Annotation::xml_element_set_annotation_mapping(&mut context, &annot_elements);

        Ok(Self {
            annotations,
            type_definitions,
            attribute_declarations,
            element_declarations,
            attribute_group_definitions,
            model_group_definitions,
            notation_declarations,
            identity_constraint_definitions,

            target_namespace,
        })
    }

    pub fn find_element_by_name(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
        components: &impl ComponentTable,
    ) -> Option<Ref<ElementDeclaration>> {
        self.element_declarations
            .iter()
            .find(|ed| {
                let ed = ed.get(components);
                ed.target_namespace.as_deref() == namespace_uri && ed.name == local_name
            })
            .copied()
    }

    pub fn find_type_by_name(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
        components: &impl ComponentTable,
    ) -> Option<TypeDefinition> {
        self.type_definitions
            .iter()
            .find(|t| {
                let (name, target_namespace) = match t {
                    TypeDefinition::Simple(s) => {
                        let s = s.get(components);
                        (s.name.as_deref(), s.target_namespace.as_deref())
                    }
                    TypeDefinition::Complex(c) => {
                        let c = c.get(components);
                        (c.name.as_deref(), c.target_namespace.as_deref())
                    }
                };
                name == Some(local_name) && target_namespace == namespace_uri
            })
            .copied()
    }

    pub fn find_attribute_by_name(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
        components: &impl ComponentTable,
    ) -> Option<Ref<AttributeDeclaration>> {
        self.attribute_declarations
            .iter()
            .find(|ad| {
                let ad = ad.get(components);
                ad.target_namespace.as_deref() == namespace_uri && ad.name == local_name
            })
            .copied()
    }
}

/// Acquire the schema document at `location`, referenced via `<include>`/`<redefine>` from a
/// schema whose own target namespace is `caller_ns`. Returns its already-assembled [`Schema`],
/// either freshly parsed and mapped or reused from the bucket graph's cache.
fn acquire_assembled_schema(
    context: &mut MappingContext,
    kind: BucketKind,
    location: &str,
    caller_ns: Option<&str>,
) -> Result<Schema, XsdError> {
    let src_code = match kind {
        BucketKind::Include => "src-include",
        BucketKind::Redefine => "src-redefine",
        BucketKind::Import | BucketKind::Main => XsdError::SRC_RESOLVE,
    };

    let text = context.root_mut().resolve_location(location)?;

    let peek_options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let peek = roxmltree::Document::parse_with_options(&text, peek_options)
        .map_err(|e| XsdError::SchemaRepresentation(src_code, e.to_string()))?;
    let peek_root = peek.root_element();
    let doc_target_ns: Option<String> = peek_root
        .attribute("targetNamespace")
        .map(|v| actual_value(v, peek_root));

    if let Some(doc_ns) = doc_target_ns.as_deref() {
        if Some(doc_ns) != caller_ns {
            return Err(XsdError::SchemaRepresentation(
                src_code,
                format!(
                    "schema document {location:?} declares target namespace {doc_ns:?}, which \
                     does not match the including schema's target namespace {caller_ns:?}"
                ),
            ));
        }
    }

    let (effective_ns, lookup) = context.root_mut().bucket_graph_mut().acquire(
        kind,
        location,
        doc_target_ns.as_deref(),
        caller_ns,
    )?;

    match lookup {
        BucketLookup::Cached(schema) => Ok(schema),
        BucketLookup::New => {
            let final_text = if doc_target_ns.is_none() && effective_ns.is_some() {
                rewrite_chameleon_target_namespace(&text, effective_ns.as_deref().unwrap())
            } else {
                text
            };

            let options = roxmltree::ParsingOptions {
                allow_dtd: true,
                ..Default::default()
            };
            let doc = roxmltree::Document::parse_with_options(&final_text, options)
                .map_err(|e| XsdError::SchemaRepresentation(src_code, e.to_string()))?;
            let child_schema = Schema::map_from_xml(context.root_mut(), doc.root_element())?;

            context
                .root_mut()
                .bucket_graph_mut()
                .insert(location, effective_ns, child_schema.clone());

            Ok(child_schema)
        }
    }
}

/// Splice a synthetic `targetNamespace` attribute into a chameleon document's `<schema>` opening
/// tag before parsing, so every top-level component it declares picks up the including schema's
/// target namespace exactly as if it had been written there directly.
fn rewrite_chameleon_target_namespace(text: &str, namespace: &str) -> String {
    let tag_start = text
        .find("<schema")
        .expect("schema document must have a <schema> root element");
    let tag_end = text[tag_start..]
        .find('>')
        .map(|i| tag_start + i)
        .expect("<schema> opening tag must be closed");

    let mut rewritten = String::with_capacity(text.len() + namespace.len() + 24);
    rewritten.push_str(&text[..tag_end]);
    rewritten.push_str(" targetNamespace=\"");
    rewritten.push_str(namespace);
    rewritten.push('"');
    rewritten.push_str(&text[tag_end..]);
    rewritten
}

/// Process the `<simpleType>`/`<complexType>`/`<attributeGroup>`/`<group>` children of a
/// `<redefine>` element, each of which redefines the same-named global component brought in by
/// `acquire_assembled_schema`'s merge. The redefining component is mapped while the name table
/// still resolves its own name to the pre-redefinition component (so a self-referencing
/// `base`/`ref` picks up the original definition, per WXS redefinition semantics), and only
/// afterwards is the name repointed at the redefiner for every other reference in the including
/// document.
fn redefine_children(
    context: &mut MappingContext,
    redefine: Node,
    schema: Node,
    type_definitions: &mut Set<TypeDefinition>,
    attribute_group_definitions: &mut Set<Ref<AttributeGroupDefinition>>,
    model_group_definitions: &mut Set<Ref<ModelGroupDefinition>>,
) -> Result<(), XsdError> {
    for child in redefine.children().filter(|c| c.is_element()) {
        match child.tag_name().name() {
            SimpleTypeDefinition::TAG_NAME => {
                let name = SimpleTypeDefinition::name_from_xml(child, schema)
                    .ok_or(XsdError::UnnamedTopLevelElement)?;
                let old: TypeDefinition = context.resolve(&name);

                let new_ref: Ref<SimpleTypeDefinition> = context.reserve();
                context.top_level_refs.insert(child, new_ref);
                let new_ref = context.request_ref_by_node::<SimpleTypeDefinition>(child);

                context
                    .root_mut()
                    .redefine_with_name(name, TypeDefinition::Simple(new_ref));
                type_definitions.retain(|t| *t != old);
                type_definitions.push(TypeDefinition::Simple(new_ref));
            }
            ComplexTypeDefinition::TAG_NAME => {
                let name = ComplexTypeDefinition::name_from_xml(child, schema)
                    .ok_or(XsdError::UnnamedTopLevelElement)?;
                let old: TypeDefinition = context.resolve(&name);

                let new_ref: Ref<ComplexTypeDefinition> = context.reserve();
                context.top_level_refs.insert(child, new_ref);
                let new_ref = context.request_ref_by_node::<ComplexTypeDefinition>(child);

                context
                    .root_mut()
                    .redefine_with_name(name, TypeDefinition::Complex(new_ref));
                type_definitions.retain(|t| *t != old);
                type_definitions.push(TypeDefinition::Complex(new_ref));
            }
            AttributeGroupDefinition::TAG_NAME => {
                let name = AttributeGroupDefinition::get_name_from_xml(child, schema);
                let old: Ref<AttributeGroupDefinition> = context.resolve(&name);

                let new_ref: Ref<AttributeGroupDefinition> = context.reserve();
                context.top_level_refs.insert(child, new_ref);
                let new_ref = context.request_ref_by_node::<AttributeGroupDefinition>(child);

                context.root_mut().redefine_with_name(name, new_ref);
                attribute_group_definitions.retain(|&r| r != old);
                attribute_group_definitions.push(new_ref);
            }
            ModelGroupDefinition::TAG_NAME => {
                let name = ModelGroupDefinition::get_name_from_xml(child, schema);
                let old: Ref<ModelGroupDefinition> = context.resolve(&name);

                let new_ref: Ref<ModelGroupDefinition> = context.reserve();
                context.top_level_refs.insert(child, new_ref);
                let new_ref = context.request_ref_by_node::<ModelGroupDefinition>(child);

                context.root_mut().redefine_with_name(name, new_ref);
                model_group_definitions.retain(|&r| r != old);
                model_group_definitions.push(new_ref);
            }
            Annotation::TAG_NAME => {}
            _ => {
                return Err(XsdError::SchemaRepresentation(
                    "src-redefine",
                    format!(
                        "unexpected <redefine> child: {}",
                        child.tag_name().name()
                    ),
                ))
            }
        }
    }

    Ok(())
}

// TODO: impl AnnotatedComponent
