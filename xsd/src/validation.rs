//! The DOM-recursive instance validator: implements Element Locally Valid (Element) and its
//! dependents (pt. 1, §3.3.4) by walking a parsed instance document directly. Attribute checking
//! (§3.4.4.2 items 2-4), identity-constraint evaluation (§3.11.4), and content-model matching all
//! recurse through the same DOM tree the top-level caller hands in.
//!
//! This module's per-token content-model matcher ([`match_transition_for_qname`]) and several of
//! its attribute/value helpers are shared with [`crate::streaming`], which drives the same checks
//! incrementally from `start_element`/`text`/`end_element` events rather than a materialized DOM
//! tree — see that module for the push-style validator the specification's §4.4/§4.5 describe.

use std::collections::HashSet;

use roxmltree::Node;

use crate::{
    builtins::XSI_NAMESPACE,
    complex_type_def::{ContentType, ContentTypeVariety, OpenContent, OpenContentMode},
    datatype,
    error::ValidityError,
    identity_constraint_def::{IdentityConstraintCategory, IdentityConstraintDefinition},
    shared::ValueConstraintVariety,
    state_machine::Transition,
    wildcard::ProcessContents,
    xpath,
    xstypes::QName,
    AttributeDeclaration, AttributeUse, ComplexTypeDefinition, ElementDeclaration, Particle, Ref,
    Schema, SchemaComponentTable, SimpleTypeDefinition, TypeDefinition,
};

fn element_qname(e: &Node) -> QName {
    QName::with_optional_namespace(e.tag_name().namespace(), e.tag_name().name())
}

fn attribute_qname(a: &roxmltree::Attribute) -> QName {
    QName::with_optional_namespace(a.namespace(), a.name())
}

pub(crate) fn decl_qname(d: &ElementDeclaration) -> QName {
    QName::with_optional_namespace(d.target_namespace.as_deref(), &d.name)
}

pub(crate) fn attr_decl_qname(d: &AttributeDeclaration) -> QName {
    QName::with_optional_namespace(d.target_namespace.as_deref(), &d.name)
}

fn is_xsi_meta_attribute(a: &roxmltree::Attribute) -> bool {
    is_xsi_meta_qname(a.namespace(), a.name())
}

/// Whether `(namespace, name)` names one of the four `xsi:*` meta-attributes (§3.2.7), which are
/// never matched against a type's attribute uses/wildcard.
pub(crate) fn is_xsi_meta_qname(namespace: Option<&str>, name: &str) -> bool {
    namespace == Some(XSI_NAMESPACE)
        && matches!(
            name,
            "type" | "nil" | "schemaLocation" | "noNamespaceSchemaLocation"
        )
}

pub(crate) enum Matched {
    Element(Ref<ElementDeclaration>),
    Wildcard(Ref<crate::Wildcard>),
}

/// Substitution Group OK (Transitive) (§3.3.6.3), restricted to the one property that matters for
/// content-model matching: whether `candidate` is reachable from `head` by following
/// `{substitution group affiliations}` zero or more times, with `head` itself not disallowing
/// `substitution`. Derivation-method compatibility against `{final}`/`{disallowed substitutions}`
/// (schema-construction-time checks, per `cos-ct-extends`/blocking) is assumed already enforced by
/// the fixup pipeline and is not re-checked here.
pub(crate) fn is_substitutable_for(
    candidate: Ref<ElementDeclaration>,
    head: Ref<ElementDeclaration>,
    components: &SchemaComponentTable,
) -> bool {
    if head.get(components).disallowed_substitutions.contains(&crate::element_decl::SubstitutionMethod::Substitution) {
        return false;
    }

    let mut frontier = vec![candidate];
    let mut seen = HashSet::new();
    while let Some(current) = frontier.pop() {
        if current == head {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        frontier.extend(current.get(components).substitution_group_affiliations.iter().copied());
    }
    false
}

/// The core of §3.9.4.2 item 2.3's per-token match: given the transitions leaving `state`, find
/// one accepting `qname` — either directly (an `ElementDeclaration` transition naming it, or one
/// naming a substitution-group head it's ·substitutable· for) or via a `Wildcard` transition whose
/// namespace constraint allows it. Takes only a `QName`, not a DOM node, so both the DOM-recursive
/// validator and the streaming validator can drive the same automaton one token at a time.
pub(crate) fn match_transition_for_qname(
    ts: &std::collections::HashMap<Transition, u32>,
    schema: &Schema,
    qname: &QName,
    components: &SchemaComponentTable,
) -> Option<(u32, Matched)> {
    for (label, to) in ts {
        match label {
            Transition::ElementDeclaration(decl_ref) => {
                let decl = decl_ref.get(components);
                let resolved = if decl.target_namespace.as_deref() == qname.namespace_name()
                    && decl.name == qname.local_name()
                {
                    Some(*decl_ref)
                } else {
                    schema
                        .find_element_by_name(qname.namespace_name(), qname.local_name(), components)
                        .filter(|s_ref| is_substitutable_for(*s_ref, *decl_ref, components))
                };
                if let Some(decl_ref) = resolved {
                    return Some((*to, Matched::Element(decl_ref)));
                }
            }
            Transition::Wildcard(wildcard_ref) => {
                let wildcard = wildcard_ref.get(components);
                if wildcard.namespace_constraint.allows(qname.namespace_name()) {
                    return Some((*to, Matched::Wildcard(*wildcard_ref)));
                }
            }
        }
    }
    None
}

/// 3.9.4.2 Element Sequence Locally Valid (Particle) / 3.9.4.3 Element Sequence Accepted
/// (Particle), extended to recursively validate each matched child (the specification's push
/// validator does this as a side effect of descending into each `start_element`; here it has to
/// be done explicitly once the content-model shape has been confirmed).
fn element_sequence_locally_valid_particle(
    schema: &Schema,
    s: &[Node],
    particle: &Particle,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    let state_machine = crate::state_machine::create_state_machine(particle, components);

    let mut current_state = state_machine.start_state.unwrap();

    for el in s {
        let ts = state_machine.get_transitions(current_state);
        let matched = match_transition_for_qname(ts, schema, &element_qname(el), components);

        let Some((to, matched)) = matched else {
            let expected = expected_tokens(&state_machine, current_state, components);
            return Err(ValidityError::ContentModelRejected {
                found: Some(element_qname(el)),
                expected,
            });
        };

        match matched {
            Matched::Element(decl_ref) => {
                element_locally_valid_element(schema, el, Some(decl_ref.get(components)), components)?;
            }
            Matched::Wildcard(wildcard_ref) => {
                validate_wildcard_matched_element(schema, el, wildcard_ref.get(components), components)?;
            }
        }

        current_state = to;
    }

    if !state_machine.is_end_state(current_state) {
        let expected = expected_tokens(&state_machine, current_state, components);
        return Err(ValidityError::ContentModelRejected {
            found: None,
            expected,
        });
    }

    Ok(())
}

/// The set of tokens (element local names, qualified by namespace where present, or `"(end)"`)
/// that would be accepted from `state`, for `cvc-complex-type.2.4`'s diagnostic message.
pub(crate) fn expected_tokens(
    state_machine: &crate::state_machine::Dfa,
    state: u32,
    components: &SchemaComponentTable,
) -> Vec<String> {
    let mut expected: Vec<String> = state_machine
        .get_transitions(state)
        .keys()
        .map(|label| match label {
            Transition::ElementDeclaration(decl_ref) => decl_qname(decl_ref.get(components)).to_string(),
            Transition::Wildcard(_) => "*".to_string(),
        })
        .collect();
    if state_machine.is_end_state(state) {
        expected.push("(end)".to_string());
    }
    expected.sort();
    expected.dedup();
    expected
}

/// Validates a child matched by an attribute/element wildcard transition, per `processContents`
/// (§3.10.4): `skip` performs no further validation, `strict` requires a resolvable global
/// element declaration, `lax` validates against one if found and otherwise accepts untyped.
fn validate_wildcard_matched_element(
    schema: &Schema,
    e: &Node,
    wildcard: &crate::Wildcard,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    match wildcard.process_contents {
        ProcessContents::Skip => Ok(()),
        ProcessContents::Strict => {
            let decl_ref = schema
                .find_element_by_name(e.tag_name().namespace(), e.tag_name().name(), components)
                .ok_or_else(|| ValidityError::NoElementDeclaration(element_qname(e)))?;
            element_locally_valid_element(schema, e, Some(decl_ref.get(components)), components)
        }
        ProcessContents::Lax => {
            match schema.find_element_by_name(e.tag_name().namespace(), e.tag_name().name(), components) {
                Some(decl_ref) => {
                    element_locally_valid_element(schema, e, Some(decl_ref.get(components)), components)
                }
                None => Ok(()),
            }
        }
    }
}

/// 3.4.4.3 Element Sequence Locally Valid (Complex Content)
fn element_sequence_locally_valid_complex_content(
    schema: &Schema,
    s: &[Node],
    particle: &Particle,
    open_content: &Option<OpenContent>,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    match open_content {
        None => element_sequence_locally_valid_particle(schema, s, particle, components),
        Some(open_content) => {
            let wildcard = open_content.wildcard.get(components);
            match open_content.mode {
                // §1.1 XSD 1.1 `<openContent>`; this schema processor targets XSD 1.0 semantics
                // (see the specification's non-goals), so open content is only reachable when a
                // 1.1 schema is fed in. Supported here on a best-effort basis: a suffix/interleave
                // split is found greedily rather than by trying every partition, which is
                // sufficient for the common case of a wildcard-only suffix/interleave but does not
                // implement the full nondeterministic search the formal definition allows.
                OpenContentMode::Suffix => {
                    let mut split = s.len();
                    while split > 0
                        && element_sequence_locally_valid_particle(schema, &s[..split], particle, components)
                            .is_err()
                    {
                        split -= 1;
                    }
                    element_sequence_locally_valid_particle(schema, &s[..split], particle, components)?;
                    for el in &s[split..] {
                        if !wildcard.namespace_constraint.allows(el.tag_name().namespace()) {
                            return Err(ValidityError::ContentModelRejected {
                                found: Some(element_qname(el)),
                                expected: vec!["*".to_string()],
                            });
                        }
                        validate_wildcard_matched_element(schema, el, wildcard, components)?;
                    }
                    Ok(())
                }
                OpenContentMode::Interleave => {
                    let mut particle_items = Vec::new();
                    for el in s {
                        if wildcard.namespace_constraint.allows(el.tag_name().namespace()) {
                            validate_wildcard_matched_element(schema, el, wildcard, components)?;
                        } else {
                            particle_items.push(*el);
                        }
                    }
                    element_sequence_locally_valid_particle(schema, &particle_items, particle, components)
                }
            }
        }
    }
}

/// 3.4.4.2 Element Locally Valid (Complex Type)
fn element_locally_valid_complex_type(
    schema: &Schema,
    e: &Node,
    e_is_nilled: bool,
    t: &ComplexTypeDefinition,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    if !e_is_nilled {
        match &t.content_type {
            ContentType::Empty => {
                if e.has_children() {
                    return Err(ValidityError::EmptyContentHasChildren(element_qname(e)));
                }
            }
            ContentType::Simple {
                simple_type_definition,
            } => {
                if e.children().any(|c| c.is_element()) {
                    return Err(ValidityError::EmptyContentHasChildren(element_qname(e)));
                }

                let initial_value: String = e
                    .children()
                    .filter(|c| c.is_text())
                    .map(|c| c.text().unwrap())
                    .collect();

                let violations =
                    datatype::check(&initial_value, simple_type_definition.get(components), components);
                if !violations.is_empty() {
                    return Err(ValidityError::DatatypeInvalid(violations));
                }
            }
            ContentType::ElementOnly {
                particle,
                open_content,
            }
            | ContentType::Mixed {
                particle,
                open_content,
            } => {
                if t.content_type.variety() == ContentTypeVariety::ElementOnly
                    && e.children()
                        .any(|c| c.is_text() && !c.text().unwrap().trim().is_empty())
                {
                    return Err(ValidityError::CharacterContentNotAllowed(element_qname(e)));
                }

                let s = e.children().filter(|c| c.is_element()).collect::<Vec<_>>();
                let particle = particle.get(components);
                element_sequence_locally_valid_complex_content(
                    schema,
                    &s,
                    particle,
                    open_content,
                    components,
                )?;
            }
        }
    }

    attributes_locally_valid(schema, e, t, components)?;

    Ok(())
}

/// 3.4.4.2 items 2-4 and §4.5: matches every instance attribute to an attribute use or the type's
/// attribute wildcard, checks each matched value against its declared type, and confirms every
/// required attribute use is present. Default-attribute materialization (§4.5, "if the validator
/// has a mutable target DOM") is out of scope: `roxmltree::Document` is immutable, so a missing
/// defaulted attribute is treated as satisfying any use it fills without being written back.
fn attributes_locally_valid(
    schema: &Schema,
    e: &Node,
    t: &ComplexTypeDefinition,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    let elt_qname = element_qname(e);
    let mut matched_uses: HashSet<Ref<AttributeUse>> = HashSet::new();
    let mut id_attribute_count = 0usize;

    for attribute in e.attributes() {
        if is_xsi_meta_attribute(&attribute) {
            continue;
        }

        let matched_use = t.attribute_uses.iter().find_map(|au_ref| {
            let au = au_ref.get(components);
            let ad = au.attribute_declaration.get(components);
            (ad.target_namespace.as_deref() == attribute.namespace() && ad.name == attribute.name())
                .then_some((*au_ref, au, ad))
        });

        if let Some((au_ref, au, ad)) = matched_use {
            matched_uses.insert(au_ref);
            check_attribute_value(attribute.value(), ad.type_definition.get(components), components)?;
            if let Some(vc) = au.value_constraint.as_ref().or(ad.value_constraint.as_ref()) {
                check_fixed_value(attribute.value(), vc, &elt_qname)?;
            }
            if datatype::is_id_derived(ad.type_definition.get(components), components) {
                id_attribute_count += 1;
            }
        } else {
            match &t.attribute_wildcard {
                Some(wildcard_ref) => {
                    let wildcard = wildcard_ref.get(components);
                    if !wildcard.namespace_constraint.allows(attribute.namespace()) {
                        return Err(ValidityError::AttributeWildcardRejected(
                            attribute_qname(&attribute),
                            elt_qname,
                        ));
                    }

                    let decl_ref = schema.find_attribute_by_name(
                        attribute.namespace(),
                        attribute.name(),
                        components,
                    );

                    match (wildcard.process_contents, decl_ref) {
                        (ProcessContents::Skip, _) => {}
                        (ProcessContents::Strict, None) => {
                            return Err(ValidityError::AttributeWildcardRejected(
                                attribute_qname(&attribute),
                                elt_qname,
                            ));
                        }
                        (ProcessContents::Strict, Some(decl_ref))
                        | (ProcessContents::Lax, Some(decl_ref)) => {
                            let ad = decl_ref.get(components);
                            check_attribute_value(attribute.value(), ad.type_definition.get(components), components)?;
                            if datatype::is_id_derived(ad.type_definition.get(components), components) {
                                id_attribute_count += 1;
                            }
                        }
                        (ProcessContents::Lax, None) => {}
                    }
                }
                None => {
                    return Err(ValidityError::AttributeNotAllowed(
                        attribute_qname(&attribute),
                        elt_qname,
                    ));
                }
            }
        }
    }

    // "wild ID" rule (§3.4.4.2 item 2.2): at most one ID-derived attribute per element.
    if id_attribute_count > 1 {
        return Err(ValidityError::MultipleIdAttributes(elt_qname));
    }

    for au_ref in &t.attribute_uses {
        if matched_uses.contains(au_ref) {
            continue;
        }
        let au = au_ref.get(components);
        if au.required {
            let ad = au.attribute_declaration.get(components);
            return Err(ValidityError::RequiredAttributeMissing(
                attr_decl_qname(ad),
                elt_qname,
            ));
        }
    }

    Ok(())
}

pub(crate) fn check_attribute_value(
    value: &str,
    st: &SimpleTypeDefinition,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    let violations = datatype::check(value, st, components);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidityError::DatatypeInvalid(violations))
    }
}

pub(crate) fn check_fixed_value(
    value: &str,
    vc: &crate::shared::ValueConstraint,
    elt_qname: &QName,
) -> Result<(), ValidityError> {
    if vc.variety != ValueConstraintVariety::Fixed {
        return Ok(());
    }
    let normalized = collapse_whitespace(value);
    let expected = collapse_whitespace(&vc.lexical_form);
    if normalized != expected {
        return Err(ValidityError::FixedValueMismatch(elt_qname.clone()));
    }
    Ok(())
}

/// Whitespace-collapsed string equality, used for fixed-value comparison (§9's open question 3
/// leaves "canonical lexical representation" equality to the datatype library; here it is
/// approximated as `xs:string`'s `collapse` normalization followed by ordinary equality).
pub(crate) fn collapse_whitespace(s: &str) -> String {
    dt_builtins::whitespace::normalize(s, dt_builtins::whitespace::WhiteSpace::Collapse)
}

pub(crate) fn string_valid(string: &str, t: &SimpleTypeDefinition, components: &SchemaComponentTable) -> bool {
    datatype::is_valid(string, t, components)
}

fn element_locally_valid_type(
    schema: &Schema,
    e: &Node,
    t: Option<TypeDefinition>,
    e_is_nilled: bool,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    let Some(t) = t else {
        return Err(ValidityError::NoElementDeclaration(element_qname(e)));
    };

    match t {
        TypeDefinition::Simple(t) => {
            let t = t.get(components);

            if e.attributes().any(|a| !is_xsi_meta_attribute(&a)) {
                return Err(ValidityError::AttributeNotAllowed(
                    e.attributes()
                        .find(|a| !is_xsi_meta_attribute(a))
                        .map(|a| attribute_qname(&a))
                        .unwrap(),
                    element_qname(e),
                ));
            }

            if e.children().any(|c| c.is_element()) {
                return Err(ValidityError::EmptyContentHasChildren(element_qname(e)));
            }

            if !e_is_nilled {
                let initial_value: String = e
                    .children()
                    .filter(|c| c.is_text())
                    .map(|c| c.text().unwrap())
                    .collect();

                if string_valid(&initial_value, t, components) {
                    Ok(())
                } else {
                    Err(ValidityError::DatatypeInvalid(datatype::check(
                        &initial_value,
                        t,
                        components,
                    )))
                }
            } else {
                Ok(())
            }
        }
        TypeDefinition::Complex(t) => {
            let t = t.get(components);

            if t.abstract_ {
                return Err(ValidityError::AbstractTypeUsed(element_qname(e)));
            }

            element_locally_valid_complex_type(schema, e, e_is_nilled, t, components)
        }
    }
}

/// Resolves an `xsi:type` attribute's lexical QName to a [`TypeDefinition`] (§3.3.4.4's
/// "instance-specified type definition"). Full `cos-ct-derived-ok`/`{block}`-set checking against
/// the declared type is not implemented (see `SPEC_FULL.md`'s known simplifications): any
/// resolvable type is accepted.
fn resolve_xsi_type(
    schema: &Schema,
    e: &Node,
    xsi_type: &roxmltree::Attribute,
    components: &SchemaComponentTable,
) -> Result<TypeDefinition, ValidityError> {
    let qname = QName::parse(xsi_type.value(), *e).map_err(|err| {
        ValidityError::InvalidXsiType(element_qname(e), err.to_string())
    })?;
    schema
        .find_type_by_name(qname.namespace_name(), qname.local_name(), components)
        .ok_or_else(|| {
            ValidityError::InvalidXsiType(element_qname(e), format!("unresolvable type {qname}"))
        })
}

pub fn element_locally_valid_element(
    schema: &Schema,
    e: &Node,
    d: Option<&ElementDeclaration>,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    let Some(d) = d else {
        return Err(ValidityError::NoElementDeclaration(element_qname(e)));
    };
    if e.tag_name().namespace() != d.target_namespace.as_deref() || e.tag_name().name() != d.name {
        return Err(ValidityError::NoElementDeclaration(element_qname(e)));
    }

    if d.abstract_ {
        return Err(ValidityError::AbstractElement(decl_qname(d)));
    }

    let xsi_nil = e
        .attributes()
        .find(|a| a.namespace() == Some(XSI_NAMESPACE) && a.name() == "nil");
    let is_nilled = if !d.nillable {
        if xsi_nil.is_some() {
            return Err(ValidityError::NilledElementHasContent(decl_qname(d)));
        }
        false
    } else if let Some(xsi_nil) = xsi_nil {
        let nil_value = collapse_whitespace(xsi_nil.value());
        if nil_value == "false" || nil_value == "0" {
            false
        } else if nil_value == "true" || nil_value == "1" {
            if e.has_children() {
                return Err(ValidityError::NilledElementHasContent(decl_qname(d)));
            }
            if d.value_constraint
                .as_ref()
                .map_or(false, |vc| vc.variety == ValueConstraintVariety::Fixed)
            {
                return Err(ValidityError::NilledElementHasFixed(decl_qname(d)));
            }
            true
        } else {
            return Err(ValidityError::InvalidXsiType(
                decl_qname(d),
                format!("invalid xsi:nil value {nil_value:?}"),
            ));
        }
    } else {
        false
    };

    let xsi_type = e
        .attributes()
        .find(|a| a.namespace() == Some(XSI_NAMESPACE) && a.name() == "type");
    let governing_type_definition = match xsi_type {
        Some(xsi_type) => resolve_xsi_type(schema, e, &xsi_type, components)?,
        None => d.type_definition,
    };

    if d.value_constraint.is_some() && !e.has_children() && !is_nilled {
        let value_constraint = d.value_constraint.as_ref().unwrap();
        element_locally_valid_type_with_value(
            schema,
            e,
            governing_type_definition,
            &value_constraint.lexical_form,
            components,
        )?;
    } else {
        element_locally_valid_type(schema, e, Some(governing_type_definition), is_nilled, components)?;

        if let Some(value_constraint) = d.value_constraint.as_ref() {
            if value_constraint.variety == ValueConstraintVariety::Fixed && !is_nilled {
                if e.has_children() {
                    return Err(ValidityError::FixedValueMismatch(decl_qname(d)));
                }

                let actual_value: String = e
                    .children()
                    .filter(|c| c.is_text())
                    .map(|c| c.text().unwrap())
                    .collect();
                if collapse_whitespace(&actual_value) != collapse_whitespace(&value_constraint.lexical_form)
                {
                    return Err(ValidityError::FixedValueMismatch(decl_qname(d)));
                }
            }
        }
    }

    check_identity_constraints(e, d, components)?;

    Ok(())
}

/// Validates an empty-content element against `D.{value constraint}.{lexical form}` used as its
/// normalized value (§3.3.4.2 item 5.1): the actual instance has no content, so the default is
/// substituted in before checking datatype validity.
fn element_locally_valid_type_with_value(
    schema: &Schema,
    e: &Node,
    t: TypeDefinition,
    default_lexical_form: &str,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    match t {
        TypeDefinition::Simple(st) => {
            let st = st.get(components);
            let violations = datatype::check(default_lexical_form, st, components);
            if violations.is_empty() {
                Ok(())
            } else {
                Err(ValidityError::DatatypeInvalid(violations))
            }
        }
        TypeDefinition::Complex(ct) => {
            let ct = ct.get(components);
            match &ct.content_type {
                ContentType::Simple {
                    simple_type_definition,
                } => {
                    let st = simple_type_definition.get(components);
                    let violations = datatype::check(default_lexical_form, st, components);
                    if violations.is_empty() {
                        Ok(())
                    } else {
                        Err(ValidityError::DatatypeInvalid(violations))
                    }
                }
                _ => element_locally_valid_type(schema, e, Some(t), false, components),
            }
        }
    }
}

/// Identity-Constraint Satisfied (§3.11.4), evaluated directly over the DOM from the declaring
/// element's own scope. This is the common case the specification's six test scenarios exercise
/// (selector/fields evaluated relative to the element that carries the `key`/`keyref`/`unique`);
/// a `keyref` whose referenced `key`/`unique` is declared on a different (ancestor) element's
/// declaration than the keyref's own declaring element is not supported — see `DESIGN.md`.
fn check_identity_constraints(
    e: &Node,
    d: &ElementDeclaration,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    for idc_ref in &d.identity_constraint_definitions {
        let idc = idc_ref.get(components);
        let idc_qname = QName::with_optional_namespace(idc.target_namespace.as_deref(), &idc.name);

        match idc.identity_constraint_category {
            IdentityConstraintCategory::Key | IdentityConstraintCategory::Unique => {
                build_node_table(*e, idc, &idc_qname, true)?;
            }
            IdentityConstraintCategory::KeyRef => {
                let entries = build_node_table(*e, idc, &idc_qname, false)?;
                let referenced = idc
                    .referenced_key
                    .expect("keyref always has a referenced key (src-resolve-checked)")
                    .get(components);
                let target_table = build_node_table(*e, referenced, &idc_qname, true)?;
                for entry in &entries {
                    if !target_table.iter().any(|t| t == entry) {
                        return Err(ValidityError::KeyrefNoMatch(idc_qname));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Builds the key-sequence table for `idc` scoped at `scope` (§3.11.4's node-table), per
/// `IdentityConstraintCategory`:
/// - `key`/`unique` (`strict = true`): every target must resolve all fields (else
///   `cvc-identity-constraint`'s "not all fields present"), and no two targets may produce equal
///   key-sequences (`Duplicate key-sequence`).
/// - `keyref`'s own selector/fields (`strict = false`): a target with an unresolved field is
///   simply skipped (§3.11.4 note: "If ... the keyref's selector does not select a node ... or
///   any of its fields ... fail to resolve ..., no further check is needed").
fn build_node_table(
    scope: Node,
    idc: &IdentityConstraintDefinition,
    idc_qname: &QName,
    strict: bool,
) -> Result<Vec<Vec<String>>, ValidityError> {
    let selector = xpath::compile(&idc.selector)
        .map_err(|_| ValidityError::IdentityConstraintFieldsUnresolved(idc_qname.clone()))?;
    let field_paths = idc
        .fields
        .iter()
        .map(xpath::compile)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ValidityError::IdentityConstraintFieldsUnresolved(idc_qname.clone()))?;

    let targets = xpath::select(scope, &selector);
    let mut table = Vec::with_capacity(targets.len());

    for target in targets {
        let mut sequence = Vec::with_capacity(field_paths.len());
        let mut unresolved = false;
        for field_path in &field_paths {
            match xpath::evaluate_field(target, field_path) {
                xpath::FieldValue::Resolved(value) => sequence.push(collapse_whitespace(&value)),
                xpath::FieldValue::Absent => {
                    unresolved = true;
                    break;
                }
                xpath::FieldValue::Ambiguous => {
                    return Err(ValidityError::IdentityConstraintFieldsUnresolved(idc_qname.clone()));
                }
            }
        }

        if unresolved {
            if strict {
                return Err(ValidityError::IdentityConstraintFieldsUnresolved(idc_qname.clone()));
            }
            continue;
        }

        if strict && table.contains(&sequence) {
            return Err(ValidityError::DuplicateKeySequence(idc_qname.clone()));
        }

        table.push(sequence);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{read_schema, BuiltinOverwriteAction, RegisterBuiltins};

    fn load(xsd: &str) -> (Schema, SchemaComponentTable) {
        let doc = roxmltree::Document::parse(xsd).unwrap();
        read_schema(doc, None, BuiltinOverwriteAction::Deny, RegisterBuiltins::Yes, &[]).unwrap()
    }

    fn validate(xsd: &str, xml: &str) -> Result<(), ValidityError> {
        let (schema, components) = load(xsd);
        let instance = roxmltree::Document::parse(xml).unwrap();
        let e = instance.root_element();
        let ged = schema.find_element_by_name(e.tag_name().namespace(), e.tag_name().name(), &components);
        element_locally_valid_element(&schema, &e, ged.map(|g| g.get(&components)), &components)
    }

    const INT_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="A" type="xs:int"/>
        </xs:schema>
    "#;

    #[test]
    fn valid_simple_type_value() {
        validate(INT_SCHEMA, "<A>42</A>").unwrap();
    }

    #[test]
    fn invalid_simple_type_value() {
        let err = validate(INT_SCHEMA, "<A>x</A>").unwrap_err();
        assert_eq!(err.code(), "cvc-datatype-valid.1.2.1");
    }

    const SEQUENCE_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="B" type="xs:string"/>
          <xs:element name="root" type="C"/>
          <xs:complexType name="C">
            <xs:sequence>
              <xs:element ref="B" minOccurs="1" maxOccurs="2"/>
            </xs:sequence>
          </xs:complexType>
        </xs:schema>
    "#;

    #[test]
    fn content_model_rejects_too_many_repetitions() {
        let err = validate(
            SEQUENCE_SCHEMA,
            "<root><B/><B/><B/></root>",
        )
        .unwrap_err();
        assert_eq!(err.code(), "cvc-complex-type.2.4");
        match err {
            ValidityError::ContentModelRejected { expected, .. } => {
                assert!(expected.contains(&"(end)".to_string()));
                assert!(!expected.iter().any(|t| t == "B"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    const KEY_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="list">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="item" minOccurs="0" maxOccurs="unbounded">
                  <xs:complexType>
                    <xs:attribute name="id" type="xs:string"/>
                  </xs:complexType>
                </xs:element>
              </xs:sequence>
            </xs:complexType>
            <xs:key name="itemKey">
              <xs:selector xpath="item"/>
              <xs:field xpath="@id"/>
            </xs:key>
          </xs:element>
        </xs:schema>
    "#;

    #[test]
    fn duplicate_key_sequence_is_rejected() {
        let err = validate(
            KEY_SCHEMA,
            r#"<list><item id="1"/><item id="1"/></list>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ValidityError::DuplicateKeySequence(_)));
        assert!(err.to_string().ends_with("Duplicate key-sequence"));
    }

    #[test]
    fn distinct_keys_are_accepted() {
        validate(KEY_SCHEMA, r#"<list><item id="1"/><item id="2"/></list>"#).unwrap();
    }

    const KEYREF_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="list">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="item" minOccurs="0" maxOccurs="unbounded">
                  <xs:complexType>
                    <xs:attribute name="id" type="xs:string"/>
                  </xs:complexType>
                </xs:element>
                <xs:element name="ref" minOccurs="0" maxOccurs="unbounded">
                  <xs:complexType>
                    <xs:attribute name="to" type="xs:string"/>
                  </xs:complexType>
                </xs:element>
              </xs:sequence>
            </xs:complexType>
            <xs:key name="itemKey">
              <xs:selector xpath="item"/>
              <xs:field xpath="@id"/>
            </xs:key>
            <xs:keyref name="refKey" refer="itemKey">
              <xs:selector xpath="ref"/>
              <xs:field xpath="@to"/>
            </xs:keyref>
          </xs:element>
        </xs:schema>
    "#;

    #[test]
    fn keyref_with_no_matching_key_is_rejected() {
        let err = validate(
            KEYREF_SCHEMA,
            r#"<list><item id="1"/><ref to="2"/></list>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ValidityError::KeyrefNoMatch(_)));
        assert!(err.to_string().ends_with("No match found for key-sequence"));
    }

    #[test]
    fn keyref_with_matching_key_is_accepted() {
        validate(
            KEYREF_SCHEMA,
            r#"<list><item id="1"/><ref to="1"/></list>"#,
        )
        .unwrap();
    }

    const SUBSTITUTION_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="shape" abstract="true"/>
          <xs:element name="circle" substitutionGroup="shape"/>
          <xs:element name="root">
            <xs:complexType>
              <xs:sequence>
                <xs:element ref="shape"/>
              </xs:sequence>
            </xs:complexType>
          </xs:element>
        </xs:schema>
    "#;

    #[test]
    fn substitution_group_member_is_accepted() {
        validate(SUBSTITUTION_SCHEMA, "<root><circle/></root>").unwrap();
    }

    #[test]
    fn abstract_head_element_itself_is_rejected() {
        let err = validate(SUBSTITUTION_SCHEMA, "<root><shape/></root>").unwrap_err();
        assert!(matches!(err, ValidityError::AbstractElement(_)));
    }
}
