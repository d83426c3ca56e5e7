use super::{
    annotation::Annotation,
    assertion::Assertion,
    attribute_decl::{self, AttributeDeclaration},
    attribute_use::AttributeUse,
    builtins::XS_ANY_TYPE_NAME,
    components::{Component, Named},
    constraining_facet::ConstrainingFacet,
    element_decl::{self, ElementDeclaration},
    mapping_context::TopLevelMappable,
    model_group::Compositor,
    particle::MaxOccurs,
    shared::TypeDefinition,
    simple_type_def::{self, SimpleTypeDefinition},
    values::{actual_value, ActualValue},
    wildcard::Wildcard,
    xstypes::{AnyURI, NCName, QName, Sequence, Set},
    AttributeGroupDefinition, MappingContext, ModelGroup, Particle, Ref, Term,
};
use roxmltree::Node;

/// Schema Component: Complex Type Definition, a kind of Type Definition (§3.4)
#[derive(Clone, Debug)]
pub struct ComplexTypeDefinition {
    pub annotations: Sequence<Ref<Annotation>>,
    pub name: Option<NCName>,
    pub target_namespace: Option<AnyURI>,
    pub base_type_definition: TypeDefinition,
    pub final_: Set<DerivationMethod>,
    /// Required if `name` is `None`, otherwise must be `None`.
    pub context: Option<Context>,
    pub derivation_method: Option<DerivationMethod>,
    pub abstract_: bool,
    pub attribute_uses: Set<Ref<AttributeUse>>,
    pub attribute_wildcard: Option<Ref<Wildcard>>,
    pub content_type: ContentType,
    pub prohibited_substitutions: Set<DerivationMethod>,
    pub assertions: Sequence<Ref<Assertion>>,
    pub(super) is_builtin: bool,
}

#[derive(Clone, Debug)]
pub enum Context {
    Element(Ref<ElementDeclaration>),
    ComplexType(Ref<ComplexTypeDefinition>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DerivationMethod {
    Extension,
    Restriction,
}

impl ActualValue<'_> for DerivationMethod {
    fn convert(src: &str, _parent: Node) -> Self {
        match src {
            "extension" => Self::Extension,
            "restriction" => Self::Restriction,
            _ => panic!("Invalid value for complex type derivation method"),
        }
    }
}

/// Property Record: Content Type (§3.4)
///
/// Unlike most other property records, {simple type definition}, {particle} and {open content}
/// are mutually exclusive depending on {variety}, so they're represented as the payload of the
/// respective variant instead of as separate optional fields.
#[derive(Clone, Debug)]
pub enum ContentType {
    Empty,
    Simple {
        simple_type_definition: Ref<SimpleTypeDefinition>,
    },
    ElementOnly {
        particle: Ref<Particle>,
        open_content: Option<OpenContent>,
    },
    Mixed {
        particle: Ref<Particle>,
        open_content: Option<OpenContent>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContentTypeVariety {
    Empty,
    Simple,
    ElementOnly,
    Mixed,
}

impl ContentType {
    pub fn variety(&self) -> ContentTypeVariety {
        match self {
            Self::Empty => ContentTypeVariety::Empty,
            Self::Simple { .. } => ContentTypeVariety::Simple,
            Self::ElementOnly { .. } => ContentTypeVariety::ElementOnly,
            Self::Mixed { .. } => ContentTypeVariety::Mixed,
        }
    }

    pub fn simple_type_definition(&self) -> Option<Ref<SimpleTypeDefinition>> {
        match self {
            Self::Simple {
                simple_type_definition,
            } => Some(*simple_type_definition),
            _ => None,
        }
    }

    pub fn particle(&self) -> Option<Ref<Particle>> {
        match self {
            Self::ElementOnly { particle, .. } | Self::Mixed { particle, .. } => Some(*particle),
            _ => None,
        }
    }

    pub fn open_content(&self) -> Option<&OpenContent> {
        match self {
            Self::ElementOnly { open_content, .. } | Self::Mixed { open_content, .. } => {
                open_content.as_ref()
            }
            _ => None,
        }
    }
}

/// Property Record: Open Content
#[derive(Clone, Debug)]
pub struct OpenContent {
    pub mode: OpenContentMode,
    pub wildcard: Ref<Wildcard>,
}

#[derive(Clone, Debug)]
pub enum OpenContentMode {
    Interleave,
    Suffix,
}

impl ComplexTypeDefinition {
    pub const TAG_NAME: &'static str = "complexType";

    pub(super) fn name_from_xml(complex_type: Node, schema: Node) -> Option<QName> {
        // {name}
        //   The ·actual value· of the name [attribute] if present, otherwise ·absent·.
        let name = complex_type
            .attribute("name")
            .map(|v| actual_value::<String>(v, complex_type));

        // {target namespace}
        //   The ·actual value· of the targetNamespace [attribute] of the <schema> ancestor element
        //   information item if present, otherwise ·absent·.
        let target_namespace = schema
            .attribute("targetNamespace")
            .map(|v| actual_value::<String>(v, complex_type));

        name.map(|name| QName::with_optional_namespace(target_namespace, name))
    }

    pub(super) fn map_from_xml(
        context: &mut MappingContext,
        complex_type: Node,
        schema: Node,
        ancestor_element: Option<Ref<ElementDeclaration>>,
        tlref: Option<Ref<Self>>,
    ) -> Ref<Self> {
        let complex_type_ref = tlref.unwrap_or_else(|| context.reserve());

        if let Some(simple_content) = complex_type
            .children()
            .find(|c| c.tag_name().name() == "simpleContent")
        {
            Self::map_with_simple_content(
                context,
                complex_type_ref,
                complex_type,
                simple_content,
                schema,
                ancestor_element,
            );
        } else if let Some(complex_content) = complex_type
            .children()
            .find(|c| c.tag_name().name() == "complexContent")
        {
            Self::map_with_explicit_complex_content(
                context,
                complex_type_ref,
                complex_type,
                complex_content,
                schema,
                ancestor_element,
            );
        } else {
            Self::map_with_implicit_complex_content(
                context,
                complex_type_ref,
                complex_type,
                schema,
                ancestor_element,
            );
        }

        assert!(
            context.components().is_present(complex_type_ref),
            "ComplexTypeDefinition mapper failed to populate ref"
        );
        complex_type_ref
    }

    /// Maps a `<complexType>` with a `<simpleContent>` child (§3.4.2, simple content case).
    fn map_with_simple_content(
        context: &mut MappingContext,
        complex_type_ref: Ref<Self>,
        complex_type: Node,
        simple_content: Node,
        schema: Node,
        ancestor_element: Option<Ref<ElementDeclaration>>,
    ) {
        let content = simple_content
            .children()
            .find(|c| ["restriction", "extension"].contains(&c.tag_name().name()))
            .unwrap();

        let derivation_method = match content.tag_name().name() {
            "restriction" => DerivationMethod::Restriction,
            "extension" => DerivationMethod::Extension,
            _ => unreachable!(),
        };

        // {base type definition}
        //   The type definition ·resolved· to by the ·actual value· of the base [attribute]
        let base_type_definition: TypeDefinition = content
            .attribute("base")
            .map(|base| actual_value::<QName>(base, content))
            .map(|n| context.resolve(&n))
            .unwrap();

        let content_type = ContentType::map_simple(
            context,
            complex_type_ref,
            content,
            schema,
            derivation_method,
            base_type_definition,
        );

        let common = Self::map_common(
            context,
            complex_type,
            schema,
            ancestor_element,
            base_type_definition,
            Some(derivation_method),
        );

        let attribute_uses = Self::map_attribute_uses_property(
            context,
            complex_type_ref,
            content,
            schema,
            base_type_definition,
            derivation_method,
        );
        let attribute_wildcard = Self::map_attribute_wildcard_property(
            context,
            content,
            schema,
            base_type_definition,
            derivation_method,
        );

        context.insert(
            complex_type_ref,
            Self {
                base_type_definition,
                derivation_method: Some(derivation_method),
                content_type,
                attribute_uses,
                attribute_wildcard,
                ..common
            },
        );
    }

    fn map_with_explicit_complex_content(
        context: &mut MappingContext,
        complex_type_ref: Ref<Self>,
        complex_type: Node,
        complex_content: Node,
        schema: Node,
        ancestor_element: Option<Ref<ElementDeclaration>>,
    ) {
        let content = complex_content
            .children()
            .find(|c| ["restriction", "extension"].contains(&c.tag_name().name()))
            .unwrap();

        // {base type definition}
        //   The type definition ·resolved· to by the ·actual value· of the base [attribute]
        let base_type_definition: TypeDefinition = content
            .attribute("base")
            .map(|base| actual_value::<QName>(base, content))
            .map(|n| context.resolve(&n))
            .unwrap();

        // {derivation method}
        //   If the <restriction> alternative is chosen, then restriction, otherwise (the
        //   <extension> alternative is chosen) extension.
        let derivation_method = match content.tag_name().name() {
            "restriction" => DerivationMethod::Restriction,
            "extension" => DerivationMethod::Extension,
            _ => unreachable!(),
        };

        let content_type = ContentType::map_complex(
            context,
            complex_type_ref,
            complex_type,
            Some(complex_content),
            schema,
            derivation_method,
            base_type_definition,
        );

        let common = Self::map_common(
            context,
            complex_type,
            schema,
            ancestor_element,
            base_type_definition,
            Some(derivation_method),
        );

        let attribute_uses = Self::map_attribute_uses_property(
            context,
            complex_type_ref,
            content,
            schema,
            base_type_definition,
            derivation_method,
        );
        let attribute_wildcard = Self::map_attribute_wildcard_property(
            context,
            content,
            schema,
            base_type_definition,
            derivation_method,
        );

        context.insert(
            complex_type_ref,
            Self {
                base_type_definition,
                derivation_method: Some(derivation_method),
                content_type,
                attribute_uses,
                attribute_wildcard,
                ..common
            },
        );
    }

    fn map_with_implicit_complex_content(
        context: &mut MappingContext,
        complex_type_ref: Ref<Self>,
        complex_type: Node,
        schema: Node,
        ancestor_element: Option<Ref<ElementDeclaration>>,
    ) {
        // {base type definition} ·xs:anyType·
        let base_type_definition = context.resolve(&XS_ANY_TYPE_NAME);

        // {derivation method}    restriction
        let derivation_method = DerivationMethod::Restriction;

        let content_type = ContentType::map_complex(
            context,
            complex_type_ref,
            complex_type,
            None,
            schema,
            derivation_method,
            base_type_definition,
        );

        let common = Self::map_common(
            context,
            complex_type,
            schema,
            ancestor_element,
            base_type_definition,
            Some(derivation_method),
        );

        let attribute_uses = Self::map_attribute_uses_property(
            context,
            complex_type_ref,
            complex_type,
            schema,
            base_type_definition,
            derivation_method,
        );
        let attribute_wildcard = Self::map_attribute_wildcard_property(
            context,
            complex_type,
            schema,
            base_type_definition,
            derivation_method,
        );

        context.insert(
            complex_type_ref,
            Self {
                base_type_definition,
                derivation_method: Some(derivation_method),
                content_type,
                attribute_uses,
                attribute_wildcard,
                ..common
            },
        );
    }

    /// Maps the properties shared by all three content model alternatives. The properties
    /// populated in the alternative-specific mappers ({base type definition}, {derivation method},
    /// {content type}, {attribute uses} and {attribute wildcard}) are left at placeholder values
    /// and overwritten by the caller via functional-update syntax.
    fn map_common(
        mapping_context: &mut MappingContext,
        complex_type: Node,
        schema: Node,
        ancestor_element: Option<Ref<ElementDeclaration>>,
        base_type_definition: TypeDefinition,
        derivation_method: Option<DerivationMethod>,
    ) -> Self {
        // {name}
        //   The ·actual value· of the name [attribute] if present, otherwise ·absent·.
        let name = complex_type
            .attribute("name")
            .map(|v| actual_value::<String>(v, complex_type));

        // {target namespace}
        //   The ·actual value· of the targetNamespace [attribute] of the <schema> ancestor element
        //   information item if present, otherwise ·absent·.
        let target_namespace = schema
            .attribute("targetNamespace")
            .map(|v| actual_value::<String>(v, complex_type));

        // {abstract}
        //   The ·actual value· of the abstract [attribute], if present, otherwise false.
        let abstract_ = complex_type
            .attribute("abstract")
            .map(|v| actual_value::<bool>(v, complex_type))
            .unwrap_or(false);

        // {prohibited substitutions}
        //   A subset of {extension, restriction}, as determined by the ·actual value· of the
        //   block [attribute], if present, otherwise the ·actual value· of the blockDefault
        //   [attribute] of the ancestor <schema> element, if present, otherwise the empty string.
        let prohibited_substitutions =
            Self::map_derivation_set(complex_type, schema, "block", "blockDefault");

        // {final}
        //   As above, but with the final and finalDefault [attributes].
        let final_ = Self::map_derivation_set(complex_type, schema, "final", "finalDefault");

        // {context}
        //   If the name [attribute] is present, then ·absent·, otherwise (among the ancestor
        //   element information items there will be a nearest <element>), the Element Declaration
        //   corresponding to the nearest <element> information item among the ancestor element
        //   information items.
        let context = if complex_type.has_attribute("name") {
            None
        } else {
            let ancestor_element = ancestor_element.expect(
                "Expected an unnamed complex type definition to have an ancestor <element>",
            );
            Some(Context::Element(ancestor_element))
        };

        // {assertions}
        //   A sequence whose members are Assertions drawn from the following sources, in order:
        //   1 The {assertions} of the {base type definition}.
        //   2 Assertions corresponding to all the <assert> element information items among the
        //     [children] of <complexType>, <restriction> and <extension>, if any, in document
        //     order.
        let mut assertions = Sequence::new();
        if let Some(base_complex) = base_type_definition.complex() {
            assertions.extend(mapping_context.request(base_complex).assertions.clone());
        }
        let assert_elements: Vec<Node> = complex_type
            .children()
            .chain(
                complex_type
                    .children()
                    .filter(|c| ["simpleContent", "complexContent"].contains(&c.tag_name().name()))
                    .flat_map(|c| c.children()),
            )
            .filter(|c| c.tag_name().name() == "assert")
            .collect();
        assertions.extend(
            assert_elements
                .into_iter()
                .map(|assert| Assertion::map_from_xml(mapping_context, assert, schema)),
        );

        // {annotations}
        //   The ·annotation mapping· of the set of elements containing the <complexType>, the
        //   <openContent> [child], if present, the <attributeGroup> [children], if present, and
        //   the <simpleContent> and <complexContent> [children], if present, and their
        //   <restriction> and <extension> [children], if present, and their <openContent> and
        //   <attributeGroup> [children], if present, as defined in XML Representation of
        //   Annotation Schema Components (§3.15.2).
        let mut annot_elements = vec![complex_type];
        for child in complex_type.children().filter(|e| {
            [
                "openContent",
                "attributeGroup",
                "simpleContent",
                "complexContent",
            ]
            .contains(&e.tag_name().name())
        }) {
            annot_elements.push(child);
            if ["simpleContent", "complexContent"].contains(&child.tag_name().name()) {
                if let Some(content) = child
                    .children()
                    .find(|c| ["restriction", "extension"].contains(&c.tag_name().name()))
                {
                    annot_elements.push(content);
                    content
                        .children()
                        .filter(|c| ["openContent", "attributeGroup"].contains(&c.tag_name().name()))
                        .for_each(|c| annot_elements.push(c));
                }
            }
        }
        let annotations =
            Annotation::xml_element_set_annotation_mapping(mapping_context, &annot_elements);

        Self {
            annotations,
            name,
            target_namespace,
            final_,
            context,
            abstract_,
            prohibited_substitutions,
            assertions,

            // Populated by the specific mapping implementations
            base_type_definition,
            derivation_method,
            content_type: ContentType::Empty,
            attribute_uses: Set::new(),
            attribute_wildcard: None,
            is_builtin: false,
        }
    }

    /// Shared logic for the {final} and {prohibited substitutions} properties, both of which are
    /// a subset of {extension, restriction} computed from a pair of local/default attributes.
    fn map_derivation_set(
        complex_type: Node,
        schema: Node,
        local_attrib: &str,
        default_attrib: &str,
    ) -> Set<DerivationMethod> {
        let effective_value = complex_type
            .attribute(local_attrib)
            .or_else(|| schema.attribute(default_attrib))
            .unwrap_or_default();

        if effective_value.is_empty() {
            Set::new()
        } else if effective_value == "#all" {
            vec![DerivationMethod::Extension, DerivationMethod::Restriction]
        } else {
            actual_value::<Vec<DerivationMethod>>(effective_value, complex_type)
        }
    }

    /// Maps the {attribute uses} property (§3.4.2, shared by all three content alternatives).
    /// `children_elem` is the element whose direct children carry the `<attribute>` and
    /// `<attributeGroup>` declarations: the `<restriction>`/`<extension>` element when the type
    /// has an explicit `<simpleContent>`/`<complexContent>` wrapper, or the `<complexType>`
    /// element itself otherwise.
    fn map_attribute_uses_property(
        context: &mut MappingContext,
        complex_type_ref: Ref<Self>,
        children_elem: Node,
        schema: Node,
        base_type_definition: TypeDefinition,
        derivation_method: DerivationMethod,
    ) -> Set<Ref<AttributeUse>> {
        let mut attribute_uses = Set::new();
        let mut excluded_names = Vec::<QName>::new();

        // 1 The set of attribute uses corresponding to the <attribute> [children], if any.
        for attribute in children_elem
            .children()
            .filter(|c| c.tag_name().name() == "attribute")
        {
            let (attribute_decl, attribute_use) = AttributeDeclaration::map_from_xml_local(
                context,
                attribute,
                schema,
                attribute_decl::ScopeParent::ComplexType(complex_type_ref),
            );
            if let Some(attribute_use) = attribute_use {
                let declaration = attribute_use_declaration(context.components(), attribute_use);
                if let Some(name) = context.request(declaration).name() {
                    excluded_names.push(name);
                }
                attribute_uses.push(attribute_use);
            } else if let Some(attribute_decl) = attribute_decl {
                // use="prohibited": no attribute use is produced, but its name still blocks
                // inheritance of a same-named attribute use from the base type.
                if let Some(name) = context.request(attribute_decl).name() {
                    excluded_names.push(name);
                }
            }
        }

        // 2 The {attribute uses} of the attribute groups ·resolved· to by the ·actual value·s of
        //   the ref [attribute] of the <attributeGroup> [children], if any.
        let group_refs = Self::resolve_attribute_group_refs(context, children_elem);
        for group_ref in group_refs {
            let inherited = context.request(group_ref).attribute_uses.clone();
            for attribute_use in inherited {
                let declaration = attribute_use_declaration(context.components(), attribute_use);
                if let Some(name) = context.request(declaration).name() {
                    excluded_names.push(name);
                }
                attribute_uses.push(attribute_use);
            }
        }

        // 3 The attribute uses "inherited" from the {base type definition} T:
        if let Some(base_complex) = base_type_definition.complex() {
            let base_uses = context.request(base_complex).attribute_uses.clone();
            for base_use in base_uses {
                if derivation_method == DerivationMethod::Restriction {
                    // 3.2 With {derivation method} = restriction, an attribute use whose
                    //     {attribute declaration} has already been accounted for above (either
                    //     directly, via a group, or via an explicit use="prohibited") is not
                    //     inherited.
                    let declaration = attribute_use_declaration(context.components(), base_use);
                    let name = context.request(declaration).name();
                    if name
                        .as_ref()
                        .is_some_and(|name| excluded_names.contains(name))
                    {
                        continue;
                    }
                }
                // 3.1 With {derivation method} = extension, every attribute use in T.{attribute
                //     uses} is inherited unconditionally.
                attribute_uses.push(base_use);
            }
        }

        attribute_uses
    }

    /// The referenced definitions of the `<attributeGroup ref="...">` [children] of
    /// `children_elem` (§3.4.2, clause 2, and §3.6.2.2).
    fn resolve_attribute_group_refs(
        context: &mut MappingContext,
        children_elem: Node,
    ) -> Vec<Ref<AttributeGroupDefinition>> {
        children_elem
            .children()
            .filter(|c| c.tag_name().name() == "attributeGroup" && c.has_attribute("ref"))
            .map(|c| {
                let ref_ = actual_value::<QName>(c.attribute("ref").unwrap(), c);
                context.resolve(&ref_)
            })
            .collect()
    }

    /// Maps the {attribute wildcard} property (§3.4.2.2), shared by all three content
    /// alternatives. `children_elem` is as in [`Self::map_attribute_uses_property`].
    fn map_attribute_wildcard_property(
        context: &mut MappingContext,
        children_elem: Node,
        schema: Node,
        base_type_definition: TypeDefinition,
        derivation_method: DerivationMethod,
    ) -> Option<Ref<Wildcard>> {
        let local_any_attribute = children_elem
            .children()
            .find(|c| c.tag_name().name() == "anyAttribute");
        let group_refs = Self::resolve_attribute_group_refs(context, children_elem);
        let group_wildcards: Vec<_> = group_refs
            .iter()
            .filter_map(|&r| context.request(r).attribute_wildcard)
            .collect();
        let own_wildcard = Wildcard::map_attribute_wildcard_common(
            context,
            local_any_attribute,
            schema,
            group_wildcards,
        );

        // With {derivation method} = extension, a wildcard inherited from a complex base type is
        // combined with the locally computed one via wildcard union (§3.10.6.3); restriction does
        // not inherit a base wildcard.
        if derivation_method == DerivationMethod::Extension {
            if let Some(base_complex) = base_type_definition.complex() {
                let base_wildcard = context.request(base_complex).attribute_wildcard;
                return match (own_wildcard, base_wildcard) {
                    (Some(own), Some(base)) => {
                        let union = base
                            .get(context.components())
                            .union(own.get(context.components()));
                        Some(context.create(union))
                    }
                    (Some(own), None) => Some(own),
                    (None, Some(base)) => Some(base),
                    (None, None) => None,
                };
            }
        }

        own_wildcard
    }
}

/// Returns the {attribute declaration} of an Attribute Use.
fn attribute_use_declaration(
    components: &impl super::components::ComponentTable,
    attribute_use: Ref<AttributeUse>,
) -> Ref<AttributeDeclaration> {
    attribute_use.get(components).attribute_declaration
}

impl ContentType {
    fn map_complex(
        context: &mut MappingContext,
        complex_type_ref: Ref<ComplexTypeDefinition>,
        complex_type: Node,
        complex_content: Option<Node>,
        schema: Node,
        derivation_method: DerivationMethod,
        base_type_definition: TypeDefinition,
    ) -> Self {
        // When the mapping rule below refers to "the [children]", ...
        let children_elem = if let Some(complex_content) = complex_content {
            // ... for a <complexType> source declaration with a <complexContent> child, the
            // [children] of <extension> or <restriction> (whichever appears as a child of
            // <complexContent>) are meant
            complex_content
                .children()
                .find(|c| ["extension", "restriction"].contains(&c.tag_name().name()))
                .unwrap()
        } else {
            // If no <complexContent> is present, then the [children] of the <complexType> source
            // declaration itself are meant
            complex_type
        };

        // 1 Let the effective mixed be the appropriate case among the following:
        let effective_mixed =
            if let Some(mixed) = complex_content.and_then(|cc| cc.attribute("mixed")) {
                // 1.1 If the mixed [attribute] is present on <complexContent>, then its ·actual value·;
                actual_value::<bool>(mixed, complex_type)
            } else if let Some(mixed) = complex_type.attribute("mixed") {
                // 1.2 If the mixed [attribute] is present on <complexType>, then its ·actual value·;
                actual_value::<bool>(mixed, complex_type)
            } else {
                // 1.3 otherwise false.
                false
            };

        // 2 Let the explicit content be the appropriate case among the following:
        let explicit_content: Option<Ref<Particle>> = if
        // 2.1.1 There is no <group>, <all>, <choice> or <sequence> among the [children];
        !children_elem
            .children()
            .any(|c| ["group", "all", "choice", "sequence"].contains(&c.tag_name().name()))
            // 2.1.2 There is an <all> or <sequence> among the [children] with no [children] of
            //   its own excluding <annotation>;
            || children_elem.children().any(|c| {
                ["all", "sequence"].contains(&c.tag_name().name())
                    && !c.children().any(|c| c.tag_name().name() != Annotation::TAG_NAME)
            })
            // 2.1.3 There is among the [children] a <choice> element whose minOccurs [attribute]
            //   has the ·actual value· 0 and which has no [children] of its own except for
            //   <annotation>;
            || children_elem.children().any(|c| {
                c.tag_name().name() == "choice"
                    && c.attribute("minOccurs")
                        .map(|v| actual_value::<u64>(v, complex_type))
                        == Some(0)
                    && !c.children().any(|c| c.tag_name().name() != Annotation::TAG_NAME)
            })
            // 2.1.4 The <group>, <all>, <choice> or <sequence> element among the [children] has a
            //   maxOccurs [attribute] with an ·actual value· of 0;
            || children_elem
                .children()
                .find(|c| ["group", "all", "choice", "sequence"].contains(&c.tag_name().name()))
                .and_then(|c| c.attribute("maxOccurs"))
                .filter(|m| *m != "unbounded")
                .map(|v| actual_value::<u64>(v, complex_type))
                == Some(0)
        {
            // then empty
            None
        } else {
            // 2.2 otherwise the particle corresponding to the <all>, <choice>, <group> or
            //   <sequence> among the [children].
            children_elem.children().find_map(|c| match c.tag_name().name() {
                "all" | "choice" | "sequence" => Some(Particle::map_from_xml_model_group(
                    context,
                    c,
                    schema,
                    element_decl::ScopeParent::ComplexType(complex_type_ref),
                )),
                "group" => Some(Particle::map_from_xml_group_reference(context, c)),
                _ => None,
            })
        };

        // 3 Let the effective content be the appropriate case among the following:
        let effective_content = if let Some(explicit_content) = explicit_content {
            // 3.2 otherwise the ·explicit content·.
            Some(explicit_content)
        } else if effective_mixed {
            // 3.1.1 If the ·explicit content· is empty and the ·effective mixed· is true, then a
            //   particle whose properties are as follows:
            //   {min occurs} 1
            //   {max occurs} 1
            //   {term}       a model group whose {compositor} is sequence and whose {particles}
            //                is empty.
            let term = Term::ModelGroup(context.create(ModelGroup {
                compositor: Compositor::Sequence,
                particles: Sequence::new(),
                annotations: Sequence::new(),
            }));
            Some(context.create(Particle {
                min_occurs: 1,
                max_occurs: MaxOccurs::Count(1),
                term,
                annotations: Sequence::new(),
            }))
        } else {
            // 3.1.2 otherwise empty.
            None
        };

        // 4 Let the explicit content type be the appropriate case among the following:
        let explicit_content_type = if derivation_method == DerivationMethod::Restriction {
            // 4.1 If {derivation method} = restriction, then the appropriate case among the
            //   following:
            if let Some(effective_content) = effective_content {
                // 4.1.2 otherwise a Content Type as follows:
                if effective_mixed {
                    Self::Mixed {
                        particle: effective_content,
                        open_content: None,
                    }
                } else {
                    Self::ElementOnly {
                        particle: effective_content,
                        open_content: None,
                    }
                }
            } else {
                // 4.1.1 If the ·effective content· is empty, then a Content Type as follows:
                Self::Empty
            }
        } else {
            // 4.2 If {derivation method} = extension, then the appropriate case among the
            //   following:
            let base_content_type = base_type_definition
                .complex()
                .map(|base| context.request(base).content_type.clone());

            match &base_content_type {
                // 4.2.1 If the {base type definition} is a simple type definition, or is a
                //   complex type definition whose {content type}.{variety} = empty or simple,
                //   then a Content Type as per clause 4.1.1 and clause 4.1.2 above (both of which
                //   only depend on the ·effective content· and the ·effective mixed·, not on the
                //   {base type definition}).
                None
                | Some(ContentType::Empty)
                | Some(ContentType::Simple { .. }) => {
                    if let Some(effective_content) = effective_content {
                        if effective_mixed {
                            Self::Mixed {
                                particle: effective_content,
                                open_content: None,
                            }
                        } else {
                            Self::ElementOnly {
                                particle: effective_content,
                                open_content: None,
                            }
                        }
                    } else {
                        Self::Empty
                    }
                }
                // 4.2.2 If the {base type definition} is a complex type definition whose {content
                //   type}.{variety} = element-only or mixed and the ·effective content· is empty,
                //   then {base type definition}.{content type}.
                Some(base_content @ (ContentType::ElementOnly { .. } | ContentType::Mixed { .. }))
                    if effective_content.is_none() =>
                {
                    base_content.clone()
                }
                // 4.2.3 otherwise a Content Type as follows:
                //   {variety}    The {variety} of the {base type definition}'s {content type}.
                //   {particle}   A particle whose {term} is a sequence model group made up of the
                //                base type's particle followed by the ·effective content·.
                //   {open content} ·absent·.
                Some(base_content) => {
                    let base_particle = base_content.particle().unwrap();
                    let effective_content = effective_content.unwrap();

                    let wrapped_base = context.create(Particle {
                        min_occurs: 1,
                        max_occurs: MaxOccurs::Count(1),
                        term: base_particle.get(context.components()).term,
                        annotations: Sequence::new(),
                    });

                    let term = Term::ModelGroup(context.create(ModelGroup {
                        compositor: Compositor::Sequence,
                        particles: vec![wrapped_base, effective_content],
                        annotations: Sequence::new(),
                    }));
                    let particle = context.create(Particle {
                        min_occurs: 1,
                        max_occurs: MaxOccurs::Count(1),
                        term,
                        annotations: Sequence::new(),
                    });

                    match base_content.variety() {
                        ContentTypeVariety::Mixed => Self::Mixed {
                            particle,
                            open_content: None,
                        },
                        _ => Self::ElementOnly {
                            particle,
                            open_content: None,
                        },
                    }
                }
            }
        };

        // 5 Let the wildcard element be the appropriate case among the following:
        let wildcard_element = if let Some(open_content) = children_elem
            .children()
            .find(|c| c.tag_name().name() == "openContent")
        {
            // 5.1 If the <openContent> [child] is present, then the <openContent> [child].
            Some(open_content)
        } else if let Some(default_open_content) = schema
            .children()
            .find(|c| c.tag_name().name() == "defaultOpenContent")
        {
            // 5.2 If the <openContent> [child] is not present, the <schema> ancestor has a
            //   <defaultOpenContent> [child], and one of the following is true
            if explicit_content_type.variety() != ContentTypeVariety::Empty
                || default_open_content
                    .attribute("appliesToEmpty")
                    .map(|v| actual_value::<bool>(v, complex_type))
                    == Some(true)
            {
                // then the <defaultOpenContent> [child] of the <schema>.
                Some(default_open_content)
            } else {
                None
            }
        } else {
            // 5.3 otherwise ·absent·.
            None
        };

        // 6 Then the value of the property is the appropriate case among the following:
        if wildcard_element
            .map(|e| e.attribute("mode") == Some("none"))
            .unwrap_or(true)
        {
            // 6.1 If the ·wildcard element· is ·absent· or is present and has mode = 'none', then
            //   the ·explicit content type·.
            explicit_content_type
        } else {
            // The wildcard element must be present
            let wildcard_element = wildcard_element.unwrap();

            // 6.2 otherwise
            //   {variety}    The {variety} of the ·explicit content type· if it's not empty;
            //                otherwise element-only.
            //   {particle}   The {particle} of the ·explicit content type· if the {variety} of
            //                the ·explicit content type· is not empty; otherwise a Particle
            //                matching an empty sequence.
            let (variety, particle) = match &explicit_content_type {
                Self::Empty => {
                    let term = Term::ModelGroup(context.create(ModelGroup {
                        compositor: Compositor::Sequence,
                        particles: Sequence::new(),
                        annotations: Sequence::new(),
                    }));
                    let particle = context.create(Particle {
                        min_occurs: 1,
                        max_occurs: MaxOccurs::Count(1),
                        term,
                        annotations: Sequence::new(),
                    });
                    (ContentTypeVariety::ElementOnly, particle)
                }
                _ => (
                    explicit_content_type.variety(),
                    explicit_content_type.particle().unwrap(),
                ),
            };

            // {open content} An Open Content as follows:
            //   {mode}     The ·actual value· of the mode [attribute] of the ·wildcard element·,
            //              if present, otherwise interleave.
            let mode = wildcard_element
                .attribute("mode")
                .map(|v| match v {
                    "interleave" => OpenContentMode::Interleave,
                    "suffix" => OpenContentMode::Suffix,
                    _ => unreachable!(),
                })
                .unwrap_or(OpenContentMode::Interleave);

            //   {wildcard} Let W be the wildcard corresponding to the <any> [child] of the
            //              ·wildcard element·. If the {open content} of the ·explicit content
            //              type· is ·absent·, then W; otherwise a wildcard whose {process
            //              contents} and {annotations} are those of W, and whose {namespace
            //              constraint} is the wildcard union of the {namespace constraint} of W
            //              and of {open content}.{wildcard} of the ·explicit content type·, as
            //              defined in Attribute Wildcard Union (§3.10.6.3).
            let any = wildcard_element
                .children()
                .find(|c| c.tag_name().name() == "any")
                .unwrap();
            let w = Wildcard::map_from_xml_any(context, any, schema);
            let wildcard = match explicit_content_type.open_content() {
                None => w,
                Some(existing) => {
                    let union = w
                        .get(context.components())
                        .union(existing.wildcard.get(context.components()));
                    context.create(union)
                }
            };

            let open_content = Some(OpenContent { mode, wildcard });

            match variety {
                ContentTypeVariety::Mixed => Self::Mixed {
                    particle,
                    open_content,
                },
                _ => Self::ElementOnly {
                    particle,
                    open_content,
                },
            }
        }
    }

    /// Maps the {content type} property for a `<complexType>` with a `<simpleContent>` child
    /// (§3.4.2, the "simple content" alternative). `content` is the `<restriction>` or
    /// `<extension>` element, `base_type_definition` the type resolved by its base [attribute].
    fn map_simple(
        context: &mut MappingContext,
        complex_type_ref: Ref<ComplexTypeDefinition>,
        content: Node,
        schema: Node,
        derivation_method: DerivationMethod,
        base_type_definition: TypeDefinition,
    ) -> Self {
        // The {simple type definition} that the base type contributes to this derivation: the
        // base's own {content type}.{simple type definition} if it's a complex type with simple
        // content, otherwise the base itself if it's a simple type.
        let base_simple_type = if let Some(base_complex) = base_type_definition.complex() {
            context
                .request(base_complex)
                .content_type
                .simple_type_definition()
                .expect("base of <simpleContent> derivation must itself have simple content")
        } else {
            base_type_definition
                .simple()
                .expect("base of <simpleContent> derivation must be simple or have simple content")
        };

        let simple_type_definition = match derivation_method {
            // Extension of simple content doesn't restrict the value space any further; the
            // {content type} is simply inherited from the base.
            DerivationMethod::Extension => base_simple_type,

            DerivationMethod::Restriction => {
                // If the <restriction> has an inline <simpleType> child, it maps directly to the
                // new {simple type definition}.
                if let Some(simple_type) = content
                    .children()
                    .find(|c| c.tag_name().name() == SimpleTypeDefinition::TAG_NAME)
                {
                    SimpleTypeDefinition::map_from_xml(
                        context,
                        simple_type,
                        schema,
                        None,
                        Some(simple_type_def::Context::ComplexType(complex_type_ref)),
                    )
                } else {
                    // Otherwise synthesize an anonymous simple type restricting the base's simple
                    // content type definition by the facet-bearing [children] of <restriction>,
                    // following the same overlay rule as Simple Type Restriction (§3.16.6.4).
                    Self::map_simple_content_facet_restriction(
                        context,
                        complex_type_ref,
                        content,
                        schema,
                        base_simple_type,
                    )
                }
            }
        };

        Self::Simple {
            simple_type_definition,
        }
    }

    fn map_simple_content_facet_restriction(
        context: &mut MappingContext,
        complex_type_ref: Ref<ComplexTypeDefinition>,
        restriction: Node,
        schema: Node,
        base_simple_type: Ref<SimpleTypeDefinition>,
    ) -> Ref<SimpleTypeDefinition> {
        let facet_nodes: Vec<Node> = restriction
            .children()
            .filter(|c| c.is_element())
            .filter(|c| {
                ![
                    SimpleTypeDefinition::TAG_NAME,
                    "attribute",
                    "attributeGroup",
                    "anyAttribute",
                    "assert",
                    Annotation::TAG_NAME,
                ]
                .contains(&c.tag_name().name())
            })
            .collect();
        let s = ConstrainingFacet::map_from_xml(context, &facet_nodes, schema).unwrap_or_default();

        context.request(base_simple_type);
        let b = base_simple_type.get(context.components()).facets.clone();

        let mut r = s.clone();
        // Every facet in B is in R, unless it is of the same kind as some facet in S.
        r.extend(b.iter().copied().filter(|f1| {
            let f1 = f1.get(context.components());
            !s.iter()
                .any(|f2| f1.is_of_same_kind_as(f2.get(context.components())))
        }));

        let base = base_simple_type.get(context.components());
        let new_type = SimpleTypeDefinition {
            annotations: Sequence::new(),
            name: None,
            target_namespace: None,
            final_: Set::new(),
            context: Some(simple_type_def::Context::ComplexType(complex_type_ref)),
            base_type_definition: TypeDefinition::Simple(base_simple_type),
            facets: r.into(),
            fundamental_facets: base.fundamental_facets.clone(),
            variety: base.variety,
            primitive_type_definition: base.primitive_type_definition,
            item_type_definition: base.item_type_definition,
            member_type_definitions: base.member_type_definitions.clone(),
            is_builtin: false,
        };

        context.create(new_type)
    }
}

impl Component for ComplexTypeDefinition {
    const DISPLAY_NAME: &'static str = "ComplexTypeDefinition";
}

impl Named for ComplexTypeDefinition {
    fn name(&self) -> Option<QName> {
        self.name.as_ref().map(|local_name| {
            QName::with_optional_namespace(self.target_namespace.as_ref(), local_name)
        })
    }
}

impl TopLevelMappable for ComplexTypeDefinition {
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        complex_type: Node,
        schema: Node,
    ) {
        Self::map_from_xml(context, complex_type, schema, None, Some(self_ref));
    }
}
