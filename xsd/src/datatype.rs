//! Bridges the constraining-facet model (`constraining_facet.rs`) to the value-level
//! datatype library (`dt_builtins`), implementing String Valid (pt. 1, §3.16.4) and
//! Datatype Valid (pt. 2, §4.1.4/§4.1.5).
//!
//! Facet overlay already happened during Simple Type Restriction (Facets) (§3.16.6.4): a
//! [`SimpleTypeDefinition`]'s own `{facets}` is the fully overlaid effective set (inherited
//! facets plus local restriction), so this module never walks `{base type definition}` looking
//! for an ancestor's `whiteSpace`/`pattern`/`enumeration`/... facet — it queries the given type's
//! own `ConstrainingFacets` directly. It does walk `{primitive type definition}`, since that is
//! the one thing facet overlay doesn't resolve: which of the ~44 built-ins governs the lexical
//! space and computed value of an atomic type.

use dt_builtins::whitespace::WhiteSpace as BuiltinWhiteSpace;

use crate::{
    constraining_facet::WhiteSpaceValue, simple_type_def::Variety, SchemaComponentTable,
    SimpleTypeDefinition, TypeDefinition,
};

/// A `cvc-*` instance-validity violation against a simple type's lexical space or constraining
/// facets. Multiple violations may apply to a single value; see [`check`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SimpleTypeViolation {
    #[error("cvc-datatype-valid.1.2.1: {lexical:?} is not in the lexical space of {type_name}")]
    NotInLexicalSpace { type_name: String, lexical: String },

    #[error("cvc-length-valid: length {actual} of {lexical:?} != {{length}} {expected}")]
    Length {
        lexical: String,
        actual: usize,
        expected: u64,
    },

    #[error("cvc-minLength-valid: length {actual} of {lexical:?} < {{minLength}} {expected}")]
    MinLength {
        lexical: String,
        actual: usize,
        expected: u64,
    },

    #[error("cvc-maxLength-valid: length {actual} of {lexical:?} > {{maxLength}} {expected}")]
    MaxLength {
        lexical: String,
        actual: usize,
        expected: u64,
    },

    #[error("cvc-pattern-valid: {lexical:?} does not match the pattern facet")]
    Pattern { lexical: String },

    #[error("{0}")]
    InvalidPattern(String),

    #[error("cvc-enumeration-valid: {lexical:?} is not one of the enumeration facet's values")]
    Enumeration { lexical: String },

    #[error("cvc-maxInclusive-valid: {lexical:?} > {{maxInclusive}} {bound}")]
    MaxInclusive { lexical: String, bound: String },

    #[error("cvc-maxExclusive-valid: {lexical:?} >= {{maxExclusive}} {bound}")]
    MaxExclusive { lexical: String, bound: String },

    #[error("cvc-minInclusive-valid: {lexical:?} < {{minInclusive}} {bound}")]
    MinInclusive { lexical: String, bound: String },

    #[error("cvc-minExclusive-valid: {lexical:?} <= {{minExclusive}} {bound}")]
    MinExclusive { lexical: String, bound: String },

    #[error("cvc-totalDigits-valid: {lexical:?} has more than {{totalDigits}} {expected} digits")]
    TotalDigits { lexical: String, expected: u64 },

    #[error(
        "cvc-fractionDigits-valid: {lexical:?} has more than {{fractionDigits}} {expected} fraction digits"
    )]
    FractionDigits { lexical: String, expected: u64 },

    #[error("cvc-type.3.1.3: {lexical:?} matches none of the union's member types")]
    NoMatchingUnionMember { lexical: String },
}

/// The governing built-in type's local name for an atomic simple type, i.e. the local name used
/// to dispatch into `dt_builtins`. `anySimpleType`/`anyAtomicType` (whose `primitive_type_definition`
/// is `absent`) fall back to the type's own name, which `dt_builtins::validate_lexical` and
/// friends treat as unconstrained.
fn governing_primitive_name<'a>(
    st: &'a SimpleTypeDefinition,
    components: &'a SchemaComponentTable,
) -> &'a str {
    match st.primitive_type_definition {
        Some(prim) => prim.get(components).name.as_deref().unwrap_or(""),
        None => st.name.as_deref().unwrap_or(""),
    }
}

/// Whether `st` is `xs:ID` or a type derived by restriction from it. Used by `a-props-correct`
/// (no value constraint on an ID-derived attribute) and the "wild ID" instance-validation rule
/// (§3.4.4.2 item 2.2: at most one attribute per element may be ID-derived).
pub fn is_id_derived(st: &SimpleTypeDefinition, components: &SchemaComponentTable) -> bool {
    let mut current = st;
    // Base-type chains are finite and acyclic (checked during fixup), so this always terminates
    // at `anySimpleType`, whose base type is the complex type `anyType`.
    loop {
        if current.name.as_deref() == Some("ID") {
            return true;
        }
        match &current.base_type_definition {
            TypeDefinition::Simple(base) => current = base.get(components),
            TypeDefinition::Complex(_) => return false,
        }
    }
}

/// The effective `whiteSpace` facet value (§4.3.6), defaulting per the `{item type definition}`'s
/// variety when no `whiteSpace` facet is present anywhere in the restriction chain (this can only
/// happen for `xs:anySimpleType` itself, since every primitive carries its own default `whiteSpace`
/// facet — see `builtins.rs`'s `register_builtin_primitive_types` — and that facet is always
/// carried forward by overlay).
fn effective_white_space(
    st: &SimpleTypeDefinition,
    components: &SchemaComponentTable,
) -> WhiteSpaceValue {
    st.facets
        .white_space(components)
        .map(|ws| ws.value)
        .unwrap_or(match st.variety {
            Some(Variety::List) => WhiteSpaceValue::Collapse,
            _ => WhiteSpaceValue::Preserve,
        })
}

fn to_builtin_white_space(value: WhiteSpaceValue) -> BuiltinWhiteSpace {
    match value {
        WhiteSpaceValue::Preserve => BuiltinWhiteSpace::Preserve,
        WhiteSpaceValue::Replace => BuiltinWhiteSpace::Replace,
        WhiteSpaceValue::Collapse => BuiltinWhiteSpace::Collapse,
    }
}

/// Applies this type's effective `whiteSpace` facet (§4.3.6) to `lexical`, producing its
/// ·normalized value·.
pub fn normalize(lexical: &str, st: &SimpleTypeDefinition, components: &SchemaComponentTable) -> String {
    let ws = to_builtin_white_space(effective_white_space(st, components));
    dt_builtins::whitespace::normalize(lexical, ws)
}

/// Checks an already whitespace-normalized atomic value against its lexical space and the
/// length/pattern/enumeration/bound/digit-count facets local to `st`'s own (overlaid)
/// `ConstrainingFacets`.
fn check_atomic(
    normalized: &str,
    st: &SimpleTypeDefinition,
    components: &SchemaComponentTable,
) -> Vec<SimpleTypeViolation> {
    let mut violations = Vec::new();
    let prim_name = governing_primitive_name(st, components);

    if dt_builtins::validate_lexical(prim_name, normalized).is_err() {
        violations.push(SimpleTypeViolation::NotInLexicalSpace {
            type_name: prim_name.to_string(),
            lexical: normalized.to_string(),
        });
        // Facets operate on the value space; without a value there is nothing further to check.
        return violations;
    }

    if let Some(pattern) = st.facets.patterns(components) {
        for value in pattern.value.iter() {
            match dt_builtins::pattern::compile(value) {
                Ok(re) => {
                    if !re.is_match(normalized) {
                        violations.push(SimpleTypeViolation::Pattern {
                            lexical: normalized.to_string(),
                        });
                    }
                }
                Err(e) => violations.push(SimpleTypeViolation::InvalidPattern(e.to_string())),
            }
        }
    }

    if let Some(enumeration) = st.facets.enumerations(components) {
        let matches = enumeration.value.iter().any(|candidate| {
            dt_builtins::values_equal(prim_name, normalized, candidate)
                .unwrap_or_else(|| normalized == candidate)
        });
        if !matches {
            violations.push(SimpleTypeViolation::Enumeration {
                lexical: normalized.to_string(),
            });
        }
    }

    let char_len = normalized.chars().count() as u64;
    if let Some(length) = st.facets.length(components) {
        if char_len != length.value {
            violations.push(SimpleTypeViolation::Length {
                lexical: normalized.to_string(),
                actual: char_len as usize,
                expected: length.value,
            });
        }
    }
    if let Some(min_length) = st.facets.min_length(components) {
        if char_len < min_length.value {
            violations.push(SimpleTypeViolation::MinLength {
                lexical: normalized.to_string(),
                actual: char_len as usize,
                expected: min_length.value,
            });
        }
    }
    if let Some(max_length) = st.facets.max_length(components) {
        if char_len > max_length.value {
            violations.push(SimpleTypeViolation::MaxLength {
                lexical: normalized.to_string(),
                actual: char_len as usize,
                expected: max_length.value,
            });
        }
    }

    // minInclusive/maxInclusive/minExclusive/maxExclusive/totalDigits/fractionDigits: compared
    // numerically through dt_builtins's digit-string Decimal for the decimal/integer family, and
    // via whitespace-normalized lexical string ordering otherwise (a documented simplification;
    // full Part 2 ordering for the date/time family is not implemented).
    let actual_decimal = dt_builtins::as_decimal(prim_name, normalized);

    if let Some(total_digits) = st.facets.total_digits(components) {
        if let Some(actual) = &actual_decimal {
            if actual.total_digits() > total_digits.value {
                violations.push(SimpleTypeViolation::TotalDigits {
                    lexical: normalized.to_string(),
                    expected: total_digits.value,
                });
            }
        }
    }
    if let Some(fraction_digits) = st.facets.fraction_digits(components) {
        if let Some(actual) = &actual_decimal {
            if actual.fraction_digit_count() > fraction_digits.value {
                violations.push(SimpleTypeViolation::FractionDigits {
                    lexical: normalized.to_string(),
                    expected: fraction_digits.value,
                });
            }
        }
    }

    if let Some(min_inclusive) = st.facets.min_inclusive(components) {
        let holds = match (&actual_decimal, dt_builtins::decimal::Decimal::parse(&min_inclusive.value)) {
            (Some(actual), Ok(bound)) => *actual >= bound,
            _ => normalized >= min_inclusive.value.as_str(),
        };
        if !holds {
            violations.push(SimpleTypeViolation::MinInclusive {
                lexical: normalized.to_string(),
                bound: min_inclusive.value.clone(),
            });
        }
    }
    if let Some(max_inclusive) = st.facets.max_inclusive(components) {
        let holds = match (&actual_decimal, dt_builtins::decimal::Decimal::parse(&max_inclusive.value)) {
            (Some(actual), Ok(bound)) => *actual <= bound,
            _ => normalized <= max_inclusive.value.as_str(),
        };
        if !holds {
            violations.push(SimpleTypeViolation::MaxInclusive {
                lexical: normalized.to_string(),
                bound: max_inclusive.value.clone(),
            });
        }
    }
    if let Some(min_exclusive) = st.facets.min_exclusive(components) {
        let holds = match (&actual_decimal, dt_builtins::decimal::Decimal::parse(&min_exclusive.value)) {
            (Some(actual), Ok(bound)) => *actual > bound,
            _ => normalized > min_exclusive.value.as_str(),
        };
        if !holds {
            violations.push(SimpleTypeViolation::MinExclusive {
                lexical: normalized.to_string(),
                bound: min_exclusive.value.clone(),
            });
        }
    }
    if let Some(max_exclusive) = st.facets.max_exclusive(components) {
        let holds = match (&actual_decimal, dt_builtins::decimal::Decimal::parse(&max_exclusive.value)) {
            (Some(actual), Ok(bound)) => *actual < bound,
            _ => normalized < max_exclusive.value.as_str(),
        };
        if !holds {
            violations.push(SimpleTypeViolation::MaxExclusive {
                lexical: normalized.to_string(),
                bound: max_exclusive.value.clone(),
            });
        }
    }

    violations
}

/// Checks a list value's items (already whitespace-normalized and split on whitespace) against
/// `st`'s own `length`/`minLength`/`maxLength`/`enumeration`/`pattern` facets (which for a list
/// type constrain the *number of items*, per §4.3.1-5) plus each item's own validity against
/// `item_type`.
fn check_list(
    normalized: &str,
    st: &SimpleTypeDefinition,
    item_type: &SimpleTypeDefinition,
    components: &SchemaComponentTable,
) -> Vec<SimpleTypeViolation> {
    let mut violations = Vec::new();
    let items: Vec<&str> = normalized.split_whitespace().collect();

    for &item in &items {
        violations.extend(check_against(item, item_type, components));
    }

    let item_count = items.len() as u64;
    if let Some(length) = st.facets.length(components) {
        if item_count != length.value {
            violations.push(SimpleTypeViolation::Length {
                lexical: normalized.to_string(),
                actual: item_count as usize,
                expected: length.value,
            });
        }
    }
    if let Some(min_length) = st.facets.min_length(components) {
        if item_count < min_length.value {
            violations.push(SimpleTypeViolation::MinLength {
                lexical: normalized.to_string(),
                actual: item_count as usize,
                expected: min_length.value,
            });
        }
    }
    if let Some(max_length) = st.facets.max_length(components) {
        if item_count > max_length.value {
            violations.push(SimpleTypeViolation::MaxLength {
                lexical: normalized.to_string(),
                actual: item_count as usize,
                expected: max_length.value,
            });
        }
    }
    if let Some(enumeration) = st.facets.enumerations(components) {
        if !enumeration.value.iter().any(|candidate| candidate == normalized) {
            violations.push(SimpleTypeViolation::Enumeration {
                lexical: normalized.to_string(),
            });
        }
    }
    if let Some(pattern) = st.facets.patterns(components) {
        for value in pattern.value.iter() {
            if let Ok(re) = dt_builtins::pattern::compile(value) {
                if !re.is_match(normalized) {
                    violations.push(SimpleTypeViolation::Pattern {
                        lexical: normalized.to_string(),
                    });
                }
            }
        }
    }

    violations
}

/// Dispatches on `st.variety` to implement Datatype Valid (§4.1.4): atomic types are checked
/// against their lexical space and facets directly; list types split on whitespace and check
/// each item; union types succeed if any member type accepts the whole value.
fn check_against(
    normalized: &str,
    st: &SimpleTypeDefinition,
    components: &SchemaComponentTable,
) -> Vec<SimpleTypeViolation> {
    match st.variety {
        Some(Variety::List) => {
            let item_type = st
                .item_type_definition
                .expect("list simple type must have an item type definition")
                .get(components);
            check_list(normalized, st, item_type, components)
        }
        Some(Variety::Union) => {
            let members = st
                .member_type_definitions
                .as_ref()
                .expect("union simple type must have member type definitions");
            let any_member_valid = members
                .iter()
                .any(|member| check_against(normalized, member.get(components), components).is_empty());
            if any_member_valid {
                Vec::new()
            } else {
                vec![SimpleTypeViolation::NoMatchingUnionMember {
                    lexical: normalized.to_string(),
                }]
            }
        }
        // Variety::Atomic, and xs:anySimpleType itself (variety absent).
        _ => check_atomic(normalized, st, components),
    }
}

/// String Valid (pt. 1, §3.16.4): `string` is ·valid· with respect to `st` if, after
/// whitespace-normalizing per `st`'s effective `whiteSpace` facet, it is in `st`'s value space
/// per Datatype Valid (§4.1.4) and satisfies every constraining facet in `st.{facets}`. Returns
/// every violation found, in no particular order; an empty vector means `string` is valid.
pub fn check(
    string: &str,
    st: &SimpleTypeDefinition,
    components: &SchemaComponentTable,
) -> Vec<SimpleTypeViolation> {
    let normalized = normalize(string, st, components);
    check_against(&normalized, st, components)
}

/// Convenience wrapper over [`check`] for callers that only need a yes/no answer.
pub fn is_valid(string: &str, st: &SimpleTypeDefinition, components: &SchemaComponentTable) -> bool {
    check(string, st, components).is_empty()
}
