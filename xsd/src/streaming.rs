//! The push-style (streaming) instance validator mandated by §4.4/§4.5: a [`Validator`] consumes
//! `start_element`/`text`/`end_element` events one at a time and drives the same content-model
//! automaton and attribute/value checks [`crate::validation`]'s DOM-recursive predicate uses,
//! without ever materializing the whole instance document. A [`ValidationOutcome`]-returning
//! convenience wrapper, [`validate_document`], replays a parsed `roxmltree::Document` through the
//! same `Validator` for callers that already have one in memory; a true incremental parse (no DOM
//! at all) is driven by `validator`'s `quick_xml`-based SAX plug, which calls the same three
//! methods directly from `quick_xml::Reader` events.
//!
//! Three simplifications from the DOM path, recorded here rather than in `DESIGN.md` alone since
//! they shape this module's structure:
//! - Identity-constraint selector/field evaluation needs a subtree to walk. Rather than stepping a
//!   selector automaton incrementally alongside the content model, each element's children are
//!   accumulated into an [`crate::xpath::OwnedNode`] as they close, and `key`/`unique`/`keyref`
//!   checks run the same [`xpath::select_owned`]/[`xpath::evaluate_field_owned`] algorithm over
//!   that subtree once the declaring element itself reaches `end_element`.
//! - `xsi:type`/element/attribute names arrive as already-namespace-resolved [`QName`]s: the
//!   caller (DOM replay or the SAX plug) owns namespace-binding resolution, since it already has
//!   to track it for its own purposes, and there is no DOM node to hand to `QName::parse`.
//! - A `skipDepth` violation only ever suppresses the subtree rooted at the element that caused
//!   it (a wildcard with `processContents = skip`, or the first content-model/attribute error),
//!   mirroring the DOM-recursive validator's per-branch short-circuiting rather than aborting the
//!   whole document.

use std::collections::HashSet;

use crate::{
    builtins::XSI_NAMESPACE,
    complex_type_def::{ContentType, ContentTypeVariety},
    datatype,
    error::ValidityError,
    shared::ValueConstraintVariety,
    state_machine::Dfa,
    validation::{self, Matched},
    wildcard::ProcessContents,
    xpath::{self, OwnedChild, OwnedNode},
    xstypes::QName,
    AttributeUse, ComplexTypeDefinition, ElementDeclaration, Ref, Schema, SchemaComponentTable,
    SimpleTypeDefinition, TypeDefinition, Wildcard,
};

/// One attribute information item on a [`ElementStart`] event, already namespace-resolved.
#[derive(Clone, Debug)]
pub struct AttributeEvent {
    pub qname: QName,
    pub value: String,
}

/// A `start_element` event: the element's expanded name, its attributes (including `xsi:*` meta
/// attributes, which [`Validator`] filters out itself), and its `xsi:nil`/`xsi:type` values if
/// present, each already namespace-resolved by the caller.
#[derive(Clone, Debug)]
pub struct ElementStart {
    pub qname: QName,
    pub attributes: Vec<AttributeEvent>,
    pub xsi_nil: Option<String>,
    pub xsi_type: Option<QName>,
}

/// Options accepted by [`Validator::new`]/[`validate_document`].
#[derive(Copy, Clone, Debug, Default)]
pub struct ValidationOptions {
    /// Whether to materialize default/fixed attribute values the instance omitted (§4.5's
    /// `VC_I_CREATE`). Since the streaming validator never holds a mutable target tree, a
    /// materialized value is reported via [`ValidationOutcome::materialized_attributes`] rather
    /// than written back into a document.
    pub materialize_defaults: bool,
}

/// A default/fixed attribute value synthesized for an omitted attribute use, when
/// [`ValidationOptions::materialize_defaults`] is set.
#[derive(Clone, Debug)]
pub struct MaterializedAttribute {
    pub element: QName,
    pub attribute: QName,
    pub value: String,
}

/// The result of driving a [`Validator`] to the end of a document.
#[derive(Clone, Debug, Default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidityError>,
    pub materialized_attributes: Vec<MaterializedAttribute>,
}

/// Per-element bookkeeping kept on [`Validator`]'s stack, reused from a pool across elements
/// rather than reallocated per `start_element` (§4.4's "element information item stack").
#[derive(Default)]
struct ElementFrame {
    namespace: Option<String>,
    local_name: String,
    decl: Option<Ref<ElementDeclaration>>,
    content_variety: Option<ContentTypeVariety>,
    simple_type: Option<Ref<SimpleTypeDefinition>>,
    dfa: Option<Dfa>,
    dfa_state: u32,
    is_nilled: bool,
    value_constraint: Option<crate::shared::ValueConstraint>,
    value_constraint_is_fixed: bool,
    had_children: bool,
    had_element_child: bool,
    reported_character_content_error: bool,
    owned: OwnedNode,
    /// This element was started underneath a `skipDepth` (either inherited, or caused by this
    /// element itself being wildcard-skipped or unresolvable): no checks run for it at all.
    skip: bool,
}

impl ElementFrame {
    fn qname(&self) -> QName {
        QName::with_optional_namespace(self.namespace.clone(), self.local_name.clone())
    }

    fn init(&mut self, qname: &QName) {
        self.namespace = qname.namespace_name().map(str::to_owned);
        self.local_name = qname.local_name().to_owned();
        self.owned = OwnedNode::new(self.namespace.clone(), self.local_name.clone());
    }
}

/// The push-style validator described by §4.4 (Validation Model) and §4.5 (Schema-Validity
/// Assessment): `start_element`/`text`/`end_element` are called once per SAX-style event, in
/// document order, and drive the same content-model automaton and value checks the DOM-recursive
/// predicate in [`crate::validation`] uses. Unlike that predicate, a `Validator` never holds the
/// whole instance in memory and never aborts on the first error: each local violation is recorded
/// and the enclosing subtree is marked to skip further checks (`skipDepth`), exactly as a
/// conforming streaming processor is expected to recover and keep parsing.
pub struct Validator<'s> {
    schema: &'s Schema,
    components: &'s SchemaComponentTable,
    options: ValidationOptions,
    stack: Vec<ElementFrame>,
    pool: Vec<ElementFrame>,
    depth: u32,
    skip_depth: Option<u32>,
    errors: Vec<ValidityError>,
    materialized_attributes: Vec<MaterializedAttribute>,
}

impl<'s> Validator<'s> {
    pub fn new(
        schema: &'s Schema,
        components: &'s SchemaComponentTable,
        options: ValidationOptions,
    ) -> Self {
        Self {
            schema,
            components,
            options,
            stack: Vec::new(),
            pool: Vec::new(),
            depth: 0,
            skip_depth: None,
            errors: Vec::new(),
            materialized_attributes: Vec::new(),
        }
    }

    fn acquire_frame(&mut self) -> ElementFrame {
        self.pool.pop().unwrap_or_default()
    }

    fn release_frame(&mut self, _frame: ElementFrame) {
        self.pool.push(ElementFrame::default());
    }

    fn record(&mut self, err: ValidityError) {
        self.errors.push(err);
    }

    /// Handles a `<elem ...>` event: resolves the governing element declaration/type (transitioning
    /// the parent's content-model state if there is one), validates attributes immediately, and
    /// pushes a fresh frame for the element's own content to accumulate into.
    pub fn start_element(&mut self, element: ElementStart) -> Result<(), ValidityError> {
        let ElementStart {
            qname,
            attributes,
            xsi_nil,
            xsi_type,
        } = element;

        self.depth += 1;
        let depth = self.depth;

        if self.skip_depth.map_or(false, |s| depth >= s) {
            let mut frame = self.acquire_frame();
            frame.init(&qname);
            frame.skip = true;
            self.stack.push(frame);
            return Ok(());
        }

        let schema = self.schema;
        let components = self.components;

        // Resolve against the parent's content model, if any; the root element instead resolves
        // directly against the schema's global element declarations (cvc-elt.1.1).
        let mut content_model_error = None;
        let resolution: Option<Matched> = if let Some(parent_idx) = self.stack.len().checked_sub(1)
        {
            let variety = self.stack[parent_idx].content_variety;
            match variety {
                Some(ContentTypeVariety::ElementOnly) | Some(ContentTypeVariety::Mixed) => {
                    let parent = &mut self.stack[parent_idx];
                    if let Some(dfa) = &parent.dfa {
                        let ts = dfa.get_transitions(parent.dfa_state);
                        match validation::match_transition_for_qname(ts, schema, &qname, components)
                        {
                            Some((to, matched)) => {
                                parent.dfa_state = to;
                                parent.had_element_child = true;
                                Some(matched)
                            }
                            None => {
                                let expected = validation::expected_tokens(dfa, parent.dfa_state, components);
                                content_model_error = Some(ValidityError::ContentModelRejected {
                                    found: Some(qname.clone()),
                                    expected,
                                });
                                None
                            }
                        }
                    } else {
                        None
                    }
                }
                Some(ContentTypeVariety::Empty) | Some(ContentTypeVariety::Simple) => {
                    content_model_error = Some(ValidityError::EmptyContentHasChildren(
                        self.stack[parent_idx].qname(),
                    ));
                    None
                }
                None => None,
            }
        } else {
            None
        };

        if let Some(err) = content_model_error {
            self.record(err.clone());
            self.skip_depth = Some(depth);
            let mut frame = self.acquire_frame();
            frame.init(&qname);
            frame.skip = true;
            self.stack.push(frame);
            return Err(err);
        }

        let decl_ref = match resolution {
            Some(Matched::Element(decl_ref)) => Some(decl_ref),
            Some(Matched::Wildcard(wildcard_ref)) => {
                match self.resolve_wildcard_matched(wildcard_ref, &qname) {
                    Ok(decl_ref) => decl_ref,
                    Err(err) => {
                        self.record(err.clone());
                        self.skip_depth = Some(depth);
                        let mut frame = self.acquire_frame();
                        frame.init(&qname);
                        frame.skip = true;
                        self.stack.push(frame);
                        return Err(err);
                    }
                }
            }
            None if self.stack.is_empty() => {
                match schema.find_element_by_name(qname.namespace_name(), qname.local_name(), components) {
                    Some(decl_ref) => Some(decl_ref),
                    None => {
                        let err = ValidityError::NoElementDeclaration(qname.clone());
                        self.record(err.clone());
                        self.skip_depth = Some(depth);
                        let mut frame = self.acquire_frame();
                        frame.init(&qname);
                        frame.skip = true;
                        self.stack.push(frame);
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        let mut frame = self.acquire_frame();
        frame.init(&qname);

        let Some(decl_ref) = decl_ref else {
            // A `processContents = skip` wildcard matched: no declaration to validate against,
            // but this is not itself a validity error.
            frame.skip = true;
            self.stack.push(frame);
            return Ok(());
        };

        let decl = decl_ref.get(components);
        frame.decl = Some(decl_ref);

        if decl.abstract_ {
            let err = ValidityError::AbstractElement(validation::decl_qname(decl));
            self.record(err.clone());
            frame.skip = true;
            self.stack.push(frame);
            return Err(err);
        }

        // xsi:nil (cvc-elt.3.2.1/.2): the "has content" half of .1 can't be checked yet (we don't
        // know the children yet), so only the parts decidable now run here; the rest is deferred
        // to `end_element`.
        let is_nilled = match &xsi_nil {
            None => false,
            Some(_) if !decl.nillable => {
                let err = ValidityError::NilledElementHasContent(validation::decl_qname(decl));
                self.record(err.clone());
                frame.skip = true;
                self.stack.push(frame);
                return Err(err);
            }
            Some(value) => {
                let normalized = validation::collapse_whitespace(value);
                if normalized == "false" || normalized == "0" {
                    false
                } else if normalized == "true" || normalized == "1" {
                    if decl
                        .value_constraint
                        .as_ref()
                        .is_some_and(|vc| vc.variety == ValueConstraintVariety::Fixed)
                    {
                        let err = ValidityError::NilledElementHasFixed(validation::decl_qname(decl));
                        self.record(err.clone());
                        frame.skip = true;
                        self.stack.push(frame);
                        return Err(err);
                    }
                    true
                } else {
                    let err = ValidityError::InvalidXsiType(
                        validation::decl_qname(decl),
                        format!("invalid xsi:nil value {normalized:?}"),
                    );
                    self.record(err.clone());
                    frame.skip = true;
                    self.stack.push(frame);
                    return Err(err);
                }
            }
        };
        frame.is_nilled = is_nilled;

        let governing_type = match &xsi_type {
            Some(xsi_type) => {
                match schema.find_type_by_name(xsi_type.namespace_name(), xsi_type.local_name(), components) {
                    Some(t) => t,
                    None => {
                        let err = ValidityError::InvalidXsiType(
                            validation::decl_qname(decl),
                            format!("unresolvable type {xsi_type}"),
                        );
                        self.record(err.clone());
                        frame.skip = true;
                        self.stack.push(frame);
                        return Err(err);
                    }
                }
            }
            None => decl.type_definition,
        };

        frame.value_constraint = decl.value_constraint.clone();
        frame.value_constraint_is_fixed = decl
            .value_constraint
            .as_ref()
            .is_some_and(|vc| vc.variety == ValueConstraintVariety::Fixed);

        match governing_type {
            TypeDefinition::Simple(st_ref) => {
                frame.content_variety = Some(ContentTypeVariety::Simple);
                frame.simple_type = Some(st_ref);
                if let Err(err) = self.validate_no_attributes(&qname, &attributes) {
                    self.record(err.clone());
                    self.stack.push(frame);
                    return Err(err);
                }
            }
            TypeDefinition::Complex(ct_ref) => {
                let ct = ct_ref.get(components);
                if ct.abstract_ {
                    let err = ValidityError::AbstractTypeUsed(qname.clone());
                    self.record(err.clone());
                    frame.skip = true;
                    self.stack.push(frame);
                    return Err(err);
                }

                frame.content_variety = Some(ct.content_type.variety());
                frame.simple_type = ct.content_type.simple_type_definition();
                if let ContentType::ElementOnly { particle, .. } | ContentType::Mixed { particle, .. } =
                    &ct.content_type
                {
                    let particle = particle.get(components);
                    frame.dfa = Some(crate::state_machine::create_state_machine(particle, components));
                    frame.dfa_state = frame.dfa.as_ref().unwrap().start_state.unwrap();
                }

                if let Err(err) = self.validate_attributes(&qname, ct, &attributes) {
                    self.record(err.clone());
                    self.stack.push(frame);
                    return Err(err);
                }
            }
        }

        self.stack.push(frame);
        Ok(())
    }

    /// `processContents` dispatch for a wildcard-matched child (§3.10.4), returning the element
    /// declaration to validate against, if any (`None` for `skip`, or `lax` with no declaration
    /// found).
    fn resolve_wildcard_matched(
        &self,
        wildcard_ref: Ref<Wildcard>,
        qname: &QName,
    ) -> Result<Option<Ref<ElementDeclaration>>, ValidityError> {
        let wildcard = wildcard_ref.get(self.components);
        match &wildcard.process_contents {
            ProcessContents::Skip => Ok(None),
            ProcessContents::Strict => self
                .schema
                .find_element_by_name(qname.namespace_name(), qname.local_name(), self.components)
                .map(Some)
                .ok_or_else(|| ValidityError::NoElementDeclaration(qname.clone())),
            ProcessContents::Lax => Ok(self.schema.find_element_by_name(
                qname.namespace_name(),
                qname.local_name(),
                self.components,
            )),
        }
    }

    fn validate_no_attributes(
        &self,
        elt_qname: &QName,
        attributes: &[AttributeEvent],
    ) -> Result<(), ValidityError> {
        if let Some(attribute) = attributes
            .iter()
            .find(|a| !validation::is_xsi_meta_qname(a.qname.namespace_name(), a.qname.local_name()))
        {
            return Err(ValidityError::AttributeNotAllowed(
                attribute.qname.clone(),
                elt_qname.clone(),
            ));
        }
        Ok(())
    }

    /// 3.4.4.2 items 2-4 and §4.5, driven from a batch of attribute events rather than a DOM
    /// node's `.attributes()`. Materializes omitted defaulted attributes into
    /// `self.materialized_attributes` when `options.materialize_defaults` is set.
    fn validate_attributes(
        &mut self,
        elt_qname: &QName,
        t: &ComplexTypeDefinition,
        attributes: &[AttributeEvent],
    ) -> Result<(), ValidityError> {
        let components = self.components;
        let schema = self.schema;
        let mut matched_uses: HashSet<Ref<AttributeUse>> = HashSet::new();
        let mut id_attribute_count = 0usize;

        for attribute in attributes {
            if validation::is_xsi_meta_qname(attribute.qname.namespace_name(), attribute.qname.local_name()) {
                continue;
            }

            let matched_use = t.attribute_uses.iter().find_map(|au_ref| {
                let au = au_ref.get(components);
                let ad = au.attribute_declaration.get(components);
                (ad.target_namespace.as_deref() == attribute.qname.namespace_name()
                    && ad.name == attribute.qname.local_name())
                .then_some((*au_ref, au, ad))
            });

            if let Some((au_ref, au, ad)) = matched_use {
                matched_uses.insert(au_ref);
                validation::check_attribute_value(
                    &attribute.value,
                    ad.type_definition.get(components),
                    components,
                )?;
                if let Some(vc) = au.value_constraint.as_ref().or(ad.value_constraint.as_ref()) {
                    validation::check_fixed_value(&attribute.value, vc, elt_qname)?;
                }
                if datatype::is_id_derived(ad.type_definition.get(components), components) {
                    id_attribute_count += 1;
                }
            } else {
                match &t.attribute_wildcard {
                    Some(wildcard_ref) => {
                        let wildcard = wildcard_ref.get(components);
                        if !wildcard
                            .namespace_constraint
                            .allows(attribute.qname.namespace_name())
                        {
                            return Err(ValidityError::AttributeWildcardRejected(
                                attribute.qname.clone(),
                                elt_qname.clone(),
                            ));
                        }

                        let decl_ref = schema.find_attribute_by_name(
                            attribute.qname.namespace_name(),
                            attribute.qname.local_name(),
                            components,
                        );

                        match (&wildcard.process_contents, decl_ref) {
                            (ProcessContents::Skip, _) => {}
                            (ProcessContents::Strict, None) => {
                                return Err(ValidityError::AttributeWildcardRejected(
                                    attribute.qname.clone(),
                                    elt_qname.clone(),
                                ));
                            }
                            (ProcessContents::Strict, Some(decl_ref))
                            | (ProcessContents::Lax, Some(decl_ref)) => {
                                let ad = decl_ref.get(components);
                                validation::check_attribute_value(
                                    &attribute.value,
                                    ad.type_definition.get(components),
                                    components,
                                )?;
                                if datatype::is_id_derived(ad.type_definition.get(components), components) {
                                    id_attribute_count += 1;
                                }
                            }
                            (ProcessContents::Lax, None) => {}
                        }
                    }
                    None => {
                        return Err(ValidityError::AttributeNotAllowed(
                            attribute.qname.clone(),
                            elt_qname.clone(),
                        ));
                    }
                }
            }
        }

        if id_attribute_count > 1 {
            return Err(ValidityError::MultipleIdAttributes(elt_qname.clone()));
        }

        for au_ref in &t.attribute_uses {
            if matched_uses.contains(au_ref) {
                continue;
            }
            let au = au_ref.get(components);
            let ad = au.attribute_declaration.get(components);
            if au.required {
                return Err(ValidityError::RequiredAttributeMissing(
                    validation::attr_decl_qname(ad),
                    elt_qname.clone(),
                ));
            }
            if self.options.materialize_defaults {
                if let Some(vc) = au.value_constraint.as_ref().or(ad.value_constraint.as_ref()) {
                    self.materialized_attributes.push(MaterializedAttribute {
                        element: elt_qname.clone(),
                        attribute: validation::attr_decl_qname(ad),
                        value: vc.lexical_form.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Handles a run of character data inside the current element.
    pub fn text(&mut self, text: &str) {
        let depth = self.depth;
        if self.skip_depth.map_or(false, |s| depth >= s) {
            if let Some(frame) = self.stack.last_mut() {
                frame.owned.children.push(OwnedChild::Text(text.to_string()));
            }
            return;
        }

        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if frame.skip {
            return;
        }

        frame.had_children = true;
        frame.owned.children.push(OwnedChild::Text(text.to_string()));

        if frame.content_variety == Some(ContentTypeVariety::ElementOnly)
            && !text.trim().is_empty()
            && !frame.reported_character_content_error
        {
            frame.reported_character_content_error = true;
            let qname = frame.qname();
            self.record(ValidityError::CharacterContentNotAllowed(qname));
        }
    }

    /// Handles a `</elem>` event: finalizes the just-closed element's content-model end-state,
    /// value, and identity-constraint checks, then folds its accumulated subtree into its
    /// parent's (for identity-constraint evaluation further up the document).
    pub fn end_element(&mut self) -> Result<(), ValidityError> {
        let mut frame = self
            .stack
            .pop()
            .expect("end_element called without a matching start_element");
        self.depth -= 1;
        if let Some(skip_from) = self.skip_depth {
            if self.depth < skip_from {
                self.skip_depth = None;
            }
        }

        let result = if frame.skip {
            Ok(())
        } else {
            self.finish_frame(&mut frame)
        };

        if let Err(ref err) = result {
            self.record(err.clone());
        }

        let owned = std::mem::take(&mut frame.owned);
        if let Some(parent) = self.stack.last_mut() {
            parent.had_children = true;
            parent.owned.children.push(OwnedChild::Element(owned));
        }

        self.release_frame(frame);
        result
    }

    fn finish_frame(&self, frame: &mut ElementFrame) -> Result<(), ValidityError> {
        let components = self.components;
        let qname = frame.qname();

        if let Some(dfa) = &frame.dfa {
            if !dfa.is_end_state(frame.dfa_state) {
                let expected = validation::expected_tokens(dfa, frame.dfa_state, components);
                return Err(ValidityError::ContentModelRejected {
                    found: None,
                    expected,
                });
            }
        }

        if frame.is_nilled {
            if frame.had_children {
                return Err(ValidityError::NilledElementHasContent(qname));
            }
        } else if frame.value_constraint.is_some() && !frame.had_children {
            // Empty content with a value constraint (§3.3.4.2 item 5.1): substitute the default
            // lexical form in before checking datatype validity.
            let vc = frame.value_constraint.as_ref().unwrap();
            if let Some(st_ref) = frame.simple_type {
                let violations = datatype::check(&vc.lexical_form, st_ref.get(components), components);
                if !violations.is_empty() {
                    return Err(ValidityError::DatatypeInvalid(violations));
                }
            }
        } else {
            if frame.content_variety == Some(ContentTypeVariety::Simple) {
                if let Some(st_ref) = frame.simple_type {
                    let value = frame.owned.initial_value();
                    let violations = datatype::check(&value, st_ref.get(components), components);
                    if !violations.is_empty() {
                        return Err(ValidityError::DatatypeInvalid(violations));
                    }
                }
            }

            if frame.value_constraint_is_fixed {
                let vc = frame.value_constraint.as_ref().unwrap();
                if frame.had_element_child {
                    return Err(ValidityError::FixedValueMismatch(qname));
                }
                let actual = frame.owned.initial_value();
                if validation::collapse_whitespace(&actual)
                    != validation::collapse_whitespace(&vc.lexical_form)
                {
                    return Err(ValidityError::FixedValueMismatch(qname));
                }
            }
        }

        if let Some(decl_ref) = frame.decl {
            check_identity_constraints_owned(&frame.owned, decl_ref.get(components), components)?;
        }

        Ok(())
    }

    /// Consumes the validator, returning the accumulated outcome. Call once the document's root
    /// element has been fully closed (the stack is empty).
    pub fn finish(self) -> ValidationOutcome {
        ValidationOutcome {
            valid: self.errors.is_empty(),
            errors: self.errors,
            materialized_attributes: self.materialized_attributes,
        }
    }
}

/// Identity-Constraint Satisfied (§3.11.4), evaluated over an [`OwnedNode`] subtree rather than a
/// `roxmltree` one; otherwise identical to `validation::check_identity_constraints`.
fn check_identity_constraints_owned(
    scope: &OwnedNode,
    d: &ElementDeclaration,
    components: &SchemaComponentTable,
) -> Result<(), ValidityError> {
    use crate::identity_constraint_def::IdentityConstraintCategory;

    for idc_ref in &d.identity_constraint_definitions {
        let idc = idc_ref.get(components);
        let idc_qname = QName::with_optional_namespace(idc.target_namespace.as_deref(), &idc.name);

        match idc.identity_constraint_category {
            IdentityConstraintCategory::Key | IdentityConstraintCategory::Unique => {
                build_node_table_owned(scope, idc, &idc_qname, true)?;
            }
            IdentityConstraintCategory::KeyRef => {
                let entries = build_node_table_owned(scope, idc, &idc_qname, false)?;
                let referenced = idc
                    .referenced_key
                    .expect("keyref always has a referenced key (src-resolve-checked)")
                    .get(components);
                let target_table = build_node_table_owned(scope, referenced, &idc_qname, true)?;
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

fn build_node_table_owned(
    scope: &OwnedNode,
    idc: &crate::identity_constraint_def::IdentityConstraintDefinition,
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

    let targets = xpath::select_owned(scope, &selector);
    let mut table = Vec::with_capacity(targets.len());

    for target in targets {
        let mut sequence = Vec::with_capacity(field_paths.len());
        let mut unresolved = false;
        for field_path in &field_paths {
            match xpath::evaluate_field_owned(target, field_path) {
                xpath::FieldValue::Resolved(value) => {
                    sequence.push(validation::collapse_whitespace(&value))
                }
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

/// Replays a parsed `roxmltree::Document` through a fresh [`Validator`] (§6's convenience
/// wrapper): useful for callers that already hold a DOM, e.g. because they also need it for
/// something other than validation. A caller driving a true incremental parse should construct
/// and drive a [`Validator`] directly instead.
pub fn validate_document(
    schema: &Schema,
    components: &SchemaComponentTable,
    doc: &roxmltree::Document,
    options: ValidationOptions,
) -> ValidationOutcome {
    let mut validator = Validator::new(schema, components, options);
    replay_node(&mut validator, doc.root_element());
    validator.finish()
}

fn replay_node(validator: &mut Validator, node: roxmltree::Node) {
    let qname = QName::with_optional_namespace(
        node.tag_name().namespace().map(str::to_owned),
        node.tag_name().name().to_owned(),
    );

    let mut attributes = Vec::new();
    let mut xsi_nil = None;
    let mut xsi_type = None;
    for attribute in node.attributes() {
        if attribute.namespace() == Some(XSI_NAMESPACE) && attribute.name() == "nil" {
            xsi_nil = Some(attribute.value().to_string());
            continue;
        }
        if attribute.namespace() == Some(XSI_NAMESPACE) && attribute.name() == "type" {
            if let Ok(qn) = QName::parse(attribute.value(), node) {
                xsi_type = Some(qn);
            }
            continue;
        }
        attributes.push(AttributeEvent {
            qname: QName::with_optional_namespace(
                attribute.namespace().map(str::to_owned),
                attribute.name().to_owned(),
            ),
            value: attribute.value().to_string(),
        });
    }

    let _ = validator.start_element(ElementStart {
        qname,
        attributes,
        xsi_nil,
        xsi_type,
    });

    for child in node.children() {
        if child.is_element() {
            replay_node(validator, child);
        } else if let Some(text) = child.text() {
            validator.text(text);
        }
    }

    let _ = validator.end_element();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{read_schema, BuiltinOverwriteAction, RegisterBuiltins};

    fn load(xsd: &str) -> (Schema, SchemaComponentTable) {
        let doc = roxmltree::Document::parse(xsd).unwrap();
        read_schema(doc, None, BuiltinOverwriteAction::Deny, RegisterBuiltins::Yes, &[]).unwrap()
    }

    fn validate(xsd: &str, xml: &str) -> ValidationOutcome {
        let (schema, components) = load(xsd);
        let instance = roxmltree::Document::parse(xml).unwrap();
        validate_document(&schema, &components, &instance, ValidationOptions::default())
    }

    const INT_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="A" type="xs:int"/>
        </xs:schema>
    "#;

    #[test]
    fn valid_simple_type_value() {
        let outcome = validate(INT_SCHEMA, "<A>42</A>");
        assert!(outcome.valid, "{:?}", outcome.errors);
    }

    #[test]
    fn invalid_simple_type_value() {
        let outcome = validate(INT_SCHEMA, "<A>x</A>");
        assert!(!outcome.valid);
        assert_eq!(outcome.errors[0].code(), "cvc-datatype-valid.1.2.1");
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
        let outcome = validate(SEQUENCE_SCHEMA, "<root><B/><B/><B/></root>");
        assert!(!outcome.valid);
        match &outcome.errors[0] {
            ValidityError::ContentModelRejected { expected, .. } => {
                assert!(expected.contains(&"(end)".to_string()));
                assert!(!expected.iter().any(|t| t == "B"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn content_model_accepts_within_bounds() {
        let outcome = validate(SEQUENCE_SCHEMA, "<root><B/><B/></root>");
        assert!(outcome.valid, "{:?}", outcome.errors);
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
        let outcome = validate(KEY_SCHEMA, r#"<list><item id="1"/><item id="1"/></list>"#);
        assert!(!outcome.valid);
        assert!(matches!(
            outcome.errors[0],
            ValidityError::DuplicateKeySequence(_)
        ));
    }

    #[test]
    fn distinct_keys_are_accepted() {
        let outcome = validate(KEY_SCHEMA, r#"<list><item id="1"/><item id="2"/></list>"#);
        assert!(outcome.valid, "{:?}", outcome.errors);
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
        let outcome = validate(KEYREF_SCHEMA, r#"<list><item id="1"/><ref to="2"/></list>"#);
        assert!(!outcome.valid);
        assert!(matches!(outcome.errors[0], ValidityError::KeyrefNoMatch(_)));
    }

    #[test]
    fn keyref_with_matching_key_is_accepted() {
        let outcome = validate(KEYREF_SCHEMA, r#"<list><item id="1"/><ref to="1"/></list>"#);
        assert!(outcome.valid, "{:?}", outcome.errors);
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
        let outcome = validate(SUBSTITUTION_SCHEMA, "<root><circle/></root>");
        assert!(outcome.valid, "{:?}", outcome.errors);
    }

    #[test]
    fn abstract_head_element_itself_is_rejected() {
        let outcome = validate(SUBSTITUTION_SCHEMA, "<root><shape/></root>");
        assert!(!outcome.valid);
        assert!(matches!(outcome.errors[0], ValidityError::AbstractElement(_)));
    }

    const DEFAULT_ATTRIBUTE_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="item">
            <xs:complexType>
              <xs:attribute name="status" type="xs:string" default="pending"/>
            </xs:complexType>
          </xs:element>
        </xs:schema>
    "#;

    #[test]
    fn materializes_default_attribute_when_requested() {
        let (schema, components) = load(DEFAULT_ATTRIBUTE_SCHEMA);
        let instance = roxmltree::Document::parse("<item/>").unwrap();
        let outcome = validate_document(
            &schema,
            &components,
            &instance,
            ValidationOptions {
                materialize_defaults: true,
            },
        );
        assert!(outcome.valid, "{:?}", outcome.errors);
        assert_eq!(outcome.materialized_attributes.len(), 1);
        assert_eq!(outcome.materialized_attributes[0].value, "pending");
    }

    const SKIP_DEPTH_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="root">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="B" minOccurs="1" maxOccurs="1">
                  <xs:complexType>
                    <xs:sequence>
                      <xs:element name="n" type="xs:int"/>
                    </xs:sequence>
                  </xs:complexType>
                </xs:element>
              </xs:sequence>
            </xs:complexType>
          </xs:element>
        </xs:schema>
    "#;

    #[test]
    fn skip_depth_suppresses_errors_below_a_rejected_element() {
        // the second <B> already violates maxOccurs=1; its own invalid <n> content must not add
        // a second, redundant error once skip_depth is in effect for its whole subtree.
        let outcome = validate(
            SKIP_DEPTH_SCHEMA,
            "<root><B><n>1</n></B><B><n>not-a-number</n></B></root>",
        );
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            ValidityError::ContentModelRejected { .. }
        ));
    }
}
