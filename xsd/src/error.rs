use crate::xstypes::QName;
use thiserror::Error;

/// Errors produced while mapping a schema document's XML representation into the component
/// model, and while running the fixup pipeline over the resulting construction table.
///
/// Each variant carries the WXS error code it corresponds to (via [`XsdError::code`]) so that the
/// code is preserved verbatim for callers that match on it, per the "error reporting back-compat"
/// design note.
#[derive(Debug, Error)]
pub enum XsdError {
    /// A QName's prefix could not be resolved against the in-scope namespaces of its host element.
    #[error("failed to resolve prefix {0:?} to a namespace URI")]
    NamePrefixNotResolved(String),

    /// A `ref`/`type`/`base`/`itemType`/`memberTypes`/keyref-`refer` attribute named a component
    /// that was never declared anywhere in the assembled schema graph.
    #[error("{src_resolve}: could not resolve reference to {0}", src_resolve = Self::SRC_RESOLVE)]
    UnresolvedReference(QName),

    /// Two global components of the same kind were declared with the same expanded name.
    #[error("duplicate global {kind} declaration: {name}")]
    DuplicateGlobal { kind: &'static str, name: QName },

    /// A type's base-type chain, a model-group definition, an attribute-group definition, or a
    /// union's member types formed a cycle.
    #[error("circular definition involving {0}")]
    CircularDefinition(QName),

    /// An attribute-group reference graph failed to terminate, or expansion produced two
    /// attribute uses with the same expanded name (`ag-props-correct`).
    #[error("{ag_props_correct}: {0}", ag_props_correct = Self::AG_PROPS_CORRECT)]
    AttributeGroupExpansionFailed(String),

    /// `all` was used as a particle term somewhere other than the top of a content type
    /// (`cos-all-limited`).
    #[error("{cos_all_limited}: 'all' group not at the top of a content model", cos_all_limited = Self::COS_ALL_LIMITED)]
    AllGroupNotTopLevel,

    /// The content model compiled from a particle tree is not deterministic under Unique Particle
    /// Attribution (`cos-nonambig`).
    #[error("{cos_nonambig}: content model for {0} is not deterministic", cos_nonambig = Self::COS_NONAMBIG)]
    ContentModelNotDeterministic(QName),

    /// A wildcard intersection or union required by attribute-group/type expansion could not be
    /// expressed as a single namespace constraint (WXS §3.10.6).
    #[error("inexpressible wildcard {0}")]
    InexpressibleWildcard(&'static str),

    /// `st-props-correct`/`cos-st-restricts`: a simple type's restriction/list/union structure
    /// violates the Simple Type Definition constraints.
    #[error("{cos_st_restricts}: {0}", cos_st_restricts = Self::COS_ST_RESTRICTS)]
    SimpleTypeRestrictionInvalid(String),

    /// `ct-props-correct`/`cos-ct-extends`/`derivation-ok-restriction`: a complex type's
    /// derivation from its base violates the Complex Type Definition constraints.
    #[error("{ct_props_correct}: {0}", ct_props_correct = Self::CT_PROPS_CORRECT)]
    ComplexTypeDerivationInvalid(String),

    /// `a-props-correct`/`au-props-correct`: an attribute declaration or attribute use carries an
    /// invalid value constraint (e.g. a value constraint on an ID-derived attribute).
    #[error("{a_props_correct}: {0}", a_props_correct = Self::A_PROPS_CORRECT)]
    AttributePropertiesInvalid(String),

    /// `e-props-correct`: an element declaration's substitution-group affiliation, type
    /// derivation, or `block`/`final` interaction is invalid.
    #[error("{e_props_correct}: {0}", e_props_correct = Self::E_PROPS_CORRECT)]
    ElementPropertiesInvalid(String),

    /// The selector/field attribute of an identity constraint did not parse as a member of the
    /// supported XPath subset (path with `//` at the head, QName/`*` steps, trailing `@attr` for
    /// fields, `|` for unions).
    #[error("identity-constraint expression {0:?} is not in the supported XPath subset")]
    InvalidXPathSubset(String),

    /// A `keyref`'s `refer` attribute named an identity constraint with a different field count,
    /// or named a `keyref` itself (only `key`/`unique` may be referenced).
    #[error("keyref {0} refers to an incompatible identity constraint")]
    IncompatibleKeyref(QName),

    /// A schema representation error not covered by a more specific variant above
    /// (`src-*` family): malformed attributes, missing required children, illegal attribute
    /// combinations caught directly by the parser.
    #[error("{0}: {1}")]
    SchemaRepresentation(&'static str, String),

    /// Failure to acquire or parse an imported/included/redefined schema document.
    #[error("failed to resolve schema document: {0}")]
    Resource(#[from] crate::import::ImportError),

    /// An invariant the implementation itself is responsible for upholding was violated; this
    /// indicates a bug rather than a malformed schema.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// A top-level schema child that is required to carry a `name` attribute (a global type,
    /// element, attribute, group, attribute group, or notation) did not have one.
    #[error("{0}: top-level component is missing a name attribute", Self::SRC_RESOLVE)]
    UnnamedTopLevelElement,

    /// A child of `<schema>` (or of an included/redefined document) was not one of the XSD
    /// vocabulary elements the parser knows how to map.
    #[error("unknown top-level schema element: {0}")]
    UnknownTopLevelElement(String),
}

impl XsdError {
    pub const SRC_RESOLVE: &'static str = "src-resolve";
    pub const AG_PROPS_CORRECT: &'static str = "ag-props-correct";
    pub const COS_ALL_LIMITED: &'static str = "cos-all-limited";
    pub const COS_NONAMBIG: &'static str = "cos-nonambig";
    pub const COS_ST_RESTRICTS: &'static str = "cos-st-restricts";
    pub const CT_PROPS_CORRECT: &'static str = "ct-props-correct";
    pub const A_PROPS_CORRECT: &'static str = "a-props-correct";
    pub const E_PROPS_CORRECT: &'static str = "e-props-correct";

    /// The WXS error code associated with this error, where one applies.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::UnresolvedReference(_) => Some(Self::SRC_RESOLVE),
            Self::AttributeGroupExpansionFailed(_) => Some(Self::AG_PROPS_CORRECT),
            Self::AllGroupNotTopLevel => Some(Self::COS_ALL_LIMITED),
            Self::ContentModelNotDeterministic(_) => Some(Self::COS_NONAMBIG),
            Self::SimpleTypeRestrictionInvalid(_) => Some(Self::COS_ST_RESTRICTS),
            Self::ComplexTypeDerivationInvalid(_) => Some(Self::CT_PROPS_CORRECT),
            Self::AttributePropertiesInvalid(_) => Some(Self::A_PROPS_CORRECT),
            Self::ElementPropertiesInvalid(_) => Some(Self::E_PROPS_CORRECT),
            Self::SchemaRepresentation(code, _) => Some(code),
            _ => None,
        }
    }
}

/// Errors produced while assessing an instance document's schema-validity (`cvc-*` family, pt. 1
/// §5.2). Unlike [`XsdError`], these never indicate a malformed schema: the compiled schema is
/// already known good by the time an instance is validated. One of these is raised per violated
/// constraint; the DOM-recursive validator in `validation.rs` stops at the first violation found
/// in each local check rather than accumulating every one, mirroring a typical streaming
/// validator's report-first-and-skip-descendants behavior (§4.4's `skipDepth`).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidityError {
    /// No element declaration could be resolved for the root element's expanded name
    /// (`cvc-elt.1.1`).
    #[error("cvc-elt.1.1: no declaration found for element {0}")]
    NoElementDeclaration(crate::xstypes::QName),

    /// `D.{abstract} = true` (`cvc-elt.3.1`).
    #[error("cvc-elt.3.1: element {0} is declared abstract")]
    AbstractElement(crate::xstypes::QName),

    /// `xsi:nil="true"` on an element with non-whitespace character or element children
    /// (`cvc-elt.3.2.1`).
    #[error("cvc-elt.3.2.1: element {0} is nilled but has content")]
    NilledElementHasContent(crate::xstypes::QName),

    /// `xsi:nil="true"` on an element whose declaration has a `fixed` value constraint
    /// (`cvc-elt.3.2.2`).
    #[error("cvc-elt.3.2.2: nilled element {0} has a fixed value constraint")]
    NilledElementHasFixed(crate::xstypes::QName),

    /// An `xsi:type`-specified type is not validly derived given the applicable `{block}` set, or
    /// names an unresolvable type (`cvc-elt.4`).
    #[error("cvc-elt.4: xsi:type on element {0} is invalid: {1}")]
    InvalidXsiType(crate::xstypes::QName, String),

    /// A complex type definition with `{abstract} = true` was selected to validate an element
    /// (`cvc-type.3.1.1`).
    #[error("cvc-type.3.1.1: abstract type selected to validate element {0}")]
    AbstractTypeUsed(crate::xstypes::QName),

    /// `T.{content type}.{variety} = empty` but the element has content (`cvc-complex-type.2.1`).
    #[error("cvc-complex-type.2.1: element {0} has content but its type has empty content")]
    EmptyContentHasChildren(crate::xstypes::QName),

    /// Character data present where `T.{content type}.{variety} = element-only` disallows it
    /// (`cvc-complex-type.2.3`).
    #[error("cvc-complex-type.2.3: element {0} has character content not allowed by its type")]
    CharacterContentNotAllowed(crate::xstypes::QName),

    /// The child element sequence does not match the content model's particle automaton
    /// (`cvc-complex-type.2.4`). `expected` lists the tokens (element local names, or `"(end)"`
    /// for a valid end of content) that would have been accepted instead.
    #[error(
        "cvc-complex-type.2.4: invalid content was found starting with element {found:?}; one of {expected:?} is expected"
    )]
    ContentModelRejected {
        found: Option<crate::xstypes::QName>,
        expected: Vec<String>,
    },

    /// An attribute information item not matched by any attribute use nor the type's attribute
    /// wildcard (`cvc-complex-type.3.2.1`).
    #[error("cvc-complex-type.3.2.1: attribute {0} is not allowed on element {1}")]
    AttributeNotAllowed(crate::xstypes::QName, crate::xstypes::QName),

    /// A required attribute use has no matching attribute information item
    /// (`cvc-complex-type.4`).
    #[error("cvc-complex-type.4: attribute {0} is required on element {1}")]
    RequiredAttributeMissing(crate::xstypes::QName, crate::xstypes::QName),

    /// A wildcard-matched attribute's namespace is outside the wildcard's range, or
    /// `processContents = strict` found no global declaration (`cvc-wildcard-namespace`/
    /// `cvc-complex-type.3.2.2`).
    #[error("cvc-wildcard-namespace: attribute {0} on element {1} is not allowed by the wildcard")]
    AttributeWildcardRejected(crate::xstypes::QName, crate::xstypes::QName),

    /// More than one wildcard-matched (or declared) attribute is ID-derived
    /// (`cvc-complex-type.3.2.1`, the "wild ID" rule, §3.4.4.2 item 2.2).
    #[error("cvc-complex-type.3.2.1: element {0} has more than one ID-derived attribute")]
    MultipleIdAttributes(crate::xstypes::QName),

    /// An attribute or element's normalized value is not valid against its simple type
    /// (`cvc-attribute.3`/`cvc-datatype-valid.1.2.1`).
    #[error("{}", .0.first().map(ToString::to_string).unwrap_or_else(|| "cvc-datatype-valid.1.2.1: invalid value".to_string()))]
    DatatypeInvalid(Vec<crate::datatype::SimpleTypeViolation>),

    /// `D.{value constraint}.{variety} = fixed` and the element's actual value differs from the
    /// fixed value (`cvc-elt.5.2.2.2`).
    #[error("cvc-elt.5.2.2.2: element {0} does not match its fixed value constraint")]
    FixedValueMismatch(crate::xstypes::QName),

    /// An identity-constraint's selector reached a target for which a field is not resolved
    /// (`key`/`unique` only) (`cvc-identity-constraint`).
    #[error("cvc-identity-constraint: {0}: not all fields could be evaluated for a target node")]
    IdentityConstraintFieldsUnresolved(crate::xstypes::QName),

    /// Two targets of the same `key`/`unique` constraint produced equal key-sequences
    /// (`cvc-identity-constraint`).
    #[error("cvc-identity-constraint: {0}: Duplicate key-sequence")]
    DuplicateKeySequence(crate::xstypes::QName),

    /// A `keyref`'s key-sequence has no matching entry in its referenced `key`/`unique`'s
    /// node-table (`cvc-identity-constraint`).
    #[error("cvc-identity-constraint: {0}: No match found for key-sequence")]
    KeyrefNoMatch(crate::xstypes::QName),
}

impl ValidityError {
    /// The WXS error code associated with this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoElementDeclaration(_) => "cvc-elt.1.1",
            Self::AbstractElement(_) => "cvc-elt.3.1",
            Self::NilledElementHasContent(_) => "cvc-elt.3.2.1",
            Self::NilledElementHasFixed(_) => "cvc-elt.3.2.2",
            Self::InvalidXsiType(..) => "cvc-elt.4",
            Self::AbstractTypeUsed(_) => "cvc-type.3.1.1",
            Self::EmptyContentHasChildren(_) => "cvc-complex-type.2.1",
            Self::CharacterContentNotAllowed(_) => "cvc-complex-type.2.3",
            Self::ContentModelRejected { .. } => "cvc-complex-type.2.4",
            Self::AttributeNotAllowed(..) => "cvc-complex-type.3.2.1",
            Self::RequiredAttributeMissing(..) => "cvc-complex-type.4",
            Self::AttributeWildcardRejected(..) => "cvc-wildcard-namespace",
            Self::MultipleIdAttributes(_) => "cvc-complex-type.3.2.1",
            Self::DatatypeInvalid(violations) => violations
                .first()
                .map(|_| "cvc-datatype-valid.1.2.1")
                .unwrap_or("cvc-datatype-valid.1.2.1"),
            Self::FixedValueMismatch(_) => "cvc-elt.5.2.2.2",
            Self::IdentityConstraintFieldsUnresolved(_) => "cvc-identity-constraint",
            Self::DuplicateKeySequence(_) => "cvc-identity-constraint",
            Self::KeyrefNoMatch(_) => "cvc-identity-constraint",
        }
    }
}
