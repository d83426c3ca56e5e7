//! Compiles and evaluates the XPath subset used by identity-constraint `selector`/`field`
//! expressions (pt. 1, §3.11.3): a path with `//` (descendant-or-self) permitted only at the
//! head, steps of QName or `*`, an optional trailing `@attr` step for fields, and `|` for unions
//! of such paths. Anything outside this grammar — axes, predicates, `..`, `//` past the head —
//! fails to compile with [`XsdError::InvalidXPathSubset`].
//!
//! Evaluation walks a subtree directly from a context node, rather than a token/byte stream: the
//! DOM-recursive validator (`validation.rs`) walks a `roxmltree` subtree via [`select`]/
//! [`evaluate_field`]; the streaming validator (`crate::streaming`) walks the [`OwnedNode`]
//! subtree it accumulates per element via [`select_owned`]/[`evaluate_field_owned`].

use roxmltree::Node;

use crate::{assertion::XPathExpression, error::XsdError};

/// A single name test in a step: a concrete expanded name, or `*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameTest {
    Named {
        namespace: Option<String>,
        local_name: String,
    },
    Wildcard,
}

/// One `|`-branch of a compiled path.
#[derive(Clone, Debug)]
pub struct PathAlternative {
    /// Whether the first step is reached via the descendant axis (`//`) rather than the child
    /// axis. Only ever applies to the first step, per the supported grammar.
    pub descendant: bool,
    /// Element steps, in document order. Empty means the path selects the context node itself
    /// (`.` or `//.`-equivalent bare selector).
    pub steps: Vec<NameTest>,
    /// The trailing `@attr` step, if present (fields only).
    pub attribute: Option<NameTest>,
}

/// A compiled selector/field expression: the union (`|`) of its alternatives.
#[derive(Clone, Debug)]
pub struct CompiledPath {
    pub alternatives: Vec<PathAlternative>,
}

fn resolve_name(
    name: &str,
    expr: &XPathExpression,
    is_attribute: bool,
) -> Result<NameTest, XsdError> {
    if name == "*" {
        return Ok(NameTest::Wildcard);
    }

    let valid_token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
            && s.matches(':').count() <= 1
    };
    if !valid_token(name) {
        return Err(XsdError::InvalidXPathSubset(name.to_string()));
    }

    let (prefix, local_name) = match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    };

    let namespace = match prefix {
        Some(prefix) => {
            let binding = expr
                .namespace_bindings
                .iter()
                .find(|b| b.prefix == prefix)
                .ok_or_else(|| XsdError::InvalidXPathSubset(name.to_string()))?;
            Some(binding.namespace.clone())
        }
        // Unprefixed attribute name tests never pick up a default namespace (plain XPath
        // semantics); unprefixed element name tests pick up {default namespace} if present.
        None if is_attribute => None,
        None => expr.default_namespace.clone(),
    };

    Ok(NameTest::Named {
        namespace,
        local_name: local_name.to_string(),
    })
}

fn compile_branch(branch: &str, expr: &XPathExpression) -> Result<PathAlternative, XsdError> {
    let mut rest = branch.trim();

    if let Some(stripped) = rest.strip_prefix('.') {
        rest = stripped;
    }

    let descendant = if let Some(stripped) = rest.strip_prefix("//") {
        rest = stripped;
        true
    } else if let Some(stripped) = rest.strip_prefix('/') {
        rest = stripped;
        false
    } else {
        false
    };

    if rest.contains("//") {
        return Err(XsdError::InvalidXPathSubset(branch.to_string()));
    }

    if rest.is_empty() {
        return Ok(PathAlternative {
            descendant,
            steps: Vec::new(),
            attribute: None,
        });
    }

    let mut segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(XsdError::InvalidXPathSubset(branch.to_string()));
    }

    let mut attribute = None;
    if let Some(last) = segments.last().copied() {
        if let Some(attr_name) = last.strip_prefix('@') {
            attribute = Some(resolve_name(attr_name, expr, true)?);
            segments.pop();
        }
    }

    // An `@attr` step may only appear in the tail position; a bare name test must not itself
    // start with `@` anywhere else in the path (already excluded by `resolve_name`'s character
    // class, since `@` is not a valid name-test character).
    let mut steps = Vec::with_capacity(segments.len());
    for segment in segments {
        steps.push(resolve_name(segment, expr, false)?);
    }

    Ok(PathAlternative {
        descendant,
        steps,
        attribute,
    })
}

/// Compiles a selector/field [`XPathExpression`] into the steps used for DOM evaluation. Returns
/// `XsdError::InvalidXPathSubset` if `expr.expression` is not in the supported grammar.
pub fn compile(expr: &XPathExpression) -> Result<CompiledPath, XsdError> {
    let alternatives = expr
        .expression
        .split('|')
        .map(|branch| compile_branch(branch, expr))
        .collect::<Result<Vec<_>, _>>()?;

    if alternatives.is_empty() {
        return Err(XsdError::InvalidXPathSubset(expr.expression.clone()));
    }

    Ok(CompiledPath { alternatives })
}

fn name_test_matches(test: &NameTest, namespace: Option<&str>, local_name: &str) -> bool {
    match test {
        NameTest::Wildcard => true,
        NameTest::Named {
            namespace: expected_ns,
            local_name: expected_local,
        } => expected_ns.as_deref() == namespace && expected_local == local_name,
    }
}

fn collect_children<'a, 'input>(node: Node<'a, 'input>, test: &NameTest, out: &mut Vec<Node<'a, 'input>>) {
    for child in node.children().filter(|c| c.is_element()) {
        let tag = child.tag_name();
        if name_test_matches(test, tag.namespace(), tag.name()) {
            out.push(child);
        }
    }
}

fn collect_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    test: &NameTest,
    out: &mut Vec<Node<'a, 'input>>,
) {
    for child in node.children().filter(|c| c.is_element()) {
        let tag = child.tag_name();
        if name_test_matches(test, tag.namespace(), tag.name()) {
            out.push(child);
        }
        collect_descendants(child, test, out);
    }
}

/// Evaluates a single alternative's element steps (not its trailing `@attr` step, if any) from
/// `context`, returning every element node the path reaches.
fn walk_alternative<'a, 'input>(
    context: Node<'a, 'input>,
    alt: &PathAlternative,
) -> Vec<Node<'a, 'input>> {
    if alt.steps.is_empty() {
        return vec![context];
    }

    let mut current = vec![context];
    for (i, step) in alt.steps.iter().enumerate() {
        let mut next = Vec::new();
        for node in &current {
            if i == 0 && alt.descendant {
                collect_descendants(*node, step, &mut next);
            } else {
                collect_children(*node, step, &mut next);
            }
        }
        current = next;
    }
    current
}

/// Selector target nodes reached from `context` by any alternative of `path` (§3.11.3's
/// {selector} evaluation). Selector expressions never carry a trailing `@attr` step.
pub fn select<'a, 'input>(context: Node<'a, 'input>, path: &CompiledPath) -> Vec<Node<'a, 'input>> {
    let mut out = Vec::new();
    for alt in &path.alternatives {
        out.extend(walk_alternative(context, alt));
    }
    out
}

/// The result of evaluating a field path against a single selector target node.
pub enum FieldValue {
    /// No alternative of the field path matched any node under the target.
    Absent,
    /// Exactly one alternative matched exactly one node, whose ·initial value· (element step) or
    /// attribute value (`@attr` step) is the field's value.
    Resolved(String),
    /// More than one node matched; `cos-identity-constraint`'s "each field must match at most
    /// one node" is violated.
    Ambiguous,
}

/// Evaluates a field path against a single selector target node, per §3.11.3's {fields}
/// evaluation (one value, or none, per target).
pub fn evaluate_field(target: Node, path: &CompiledPath) -> FieldValue {
    let mut values = Vec::new();

    for alt in &path.alternatives {
        let nodes = walk_alternative(target, alt);
        match &alt.attribute {
            Some(attr_test) => {
                for node in &nodes {
                    for attribute in node.attributes() {
                        if name_test_matches(attr_test, attribute.namespace(), attribute.name()) {
                            values.push(attribute.value().to_string());
                        }
                    }
                }
            }
            None => {
                for node in &nodes {
                    // The ·initial value·: the concatenation of the [character code] of each
                    // character information item child, in order (Part 1, §3.1.4).
                    let initial_value: String = node
                        .children()
                        .filter(|c| c.is_text())
                        .map(|c| c.text().unwrap_or(""))
                        .collect();
                    values.push(initial_value);
                }
            }
        }
    }

    match values.len() {
        0 => FieldValue::Absent,
        1 => FieldValue::Resolved(values.into_iter().next().unwrap()),
        _ => FieldValue::Ambiguous,
    }
}

/// An owned element snapshot, built incrementally by [`crate::streaming::Validator`] as
/// `start_element`/`text`/`end_element` events arrive, so that identity-constraint
/// selector/field evaluation (`select_owned`/`evaluate_field_owned`) has a subtree to walk
/// without requiring the whole instance document to be parsed into a `roxmltree::Document`
/// up front. Mirrors just enough of `roxmltree::Node` for [`select`]/[`evaluate_field`]'s logic
/// to be re-expressed over it.
#[derive(Clone, Debug, Default)]
pub struct OwnedNode {
    pub namespace: Option<String>,
    pub local_name: String,
    pub attributes: Vec<(Option<String>, String, String)>,
    pub children: Vec<OwnedChild>,
}

#[derive(Clone, Debug)]
pub enum OwnedChild {
    Element(OwnedNode),
    Text(String),
}

impl OwnedNode {
    pub fn new(namespace: Option<String>, local_name: String) -> Self {
        Self {
            namespace,
            local_name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn element_children(&self) -> impl Iterator<Item = &OwnedNode> {
        self.children.iter().filter_map(|c| match c {
            OwnedChild::Element(n) => Some(n),
            OwnedChild::Text(_) => None,
        })
    }

    /// The ·initial value· (Part 1, §3.1.4): the concatenation of this node's direct text
    /// children, in order.
    pub fn initial_value(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                OwnedChild::Text(t) => Some(t.as_str()),
                OwnedChild::Element(_) => None,
            })
            .collect()
    }
}

fn collect_children_owned<'a>(node: &'a OwnedNode, test: &NameTest, out: &mut Vec<&'a OwnedNode>) {
    for child in node.element_children() {
        if name_test_matches(test, child.namespace.as_deref(), &child.local_name) {
            out.push(child);
        }
    }
}

fn collect_descendants_owned<'a>(node: &'a OwnedNode, test: &NameTest, out: &mut Vec<&'a OwnedNode>) {
    for child in node.element_children() {
        if name_test_matches(test, child.namespace.as_deref(), &child.local_name) {
            out.push(child);
        }
        collect_descendants_owned(child, test, out);
    }
}

fn walk_alternative_owned<'a>(context: &'a OwnedNode, alt: &PathAlternative) -> Vec<&'a OwnedNode> {
    if alt.steps.is_empty() {
        return vec![context];
    }

    let mut current = vec![context];
    for (i, step) in alt.steps.iter().enumerate() {
        let mut next = Vec::new();
        for node in &current {
            if i == 0 && alt.descendant {
                collect_descendants_owned(node, step, &mut next);
            } else {
                collect_children_owned(node, step, &mut next);
            }
        }
        current = next;
    }
    current
}

/// [`select`], re-expressed over an [`OwnedNode`] subtree instead of a `roxmltree` one.
pub fn select_owned<'a>(context: &'a OwnedNode, path: &CompiledPath) -> Vec<&'a OwnedNode> {
    let mut out = Vec::new();
    for alt in &path.alternatives {
        out.extend(walk_alternative_owned(context, alt));
    }
    out
}

/// [`evaluate_field`], re-expressed over an [`OwnedNode`] subtree instead of a `roxmltree` one.
pub fn evaluate_field_owned(target: &OwnedNode, path: &CompiledPath) -> FieldValue {
    let mut values = Vec::new();

    for alt in &path.alternatives {
        let nodes = walk_alternative_owned(target, alt);
        match &alt.attribute {
            Some(attr_test) => {
                for node in &nodes {
                    for (namespace, name, value) in &node.attributes {
                        if name_test_matches(attr_test, namespace.as_deref(), name) {
                            values.push(value.clone());
                        }
                    }
                }
            }
            None => {
                for node in &nodes {
                    values.push(node.initial_value());
                }
            }
        }
    }

    match values.len() {
        0 => FieldValue::Absent,
        1 => FieldValue::Resolved(values.into_iter().next().unwrap()),
        _ => FieldValue::Ambiguous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xstypes::Set;

    fn expr(expression: &str) -> XPathExpression {
        XPathExpression {
            namespace_bindings: Set::new(),
            default_namespace: None,
            base_uri: None,
            expression: expression.to_string(),
        }
    }

    #[test]
    fn compiles_descendant_head() {
        let compiled = compile(&expr("//item")).unwrap();
        assert_eq!(compiled.alternatives.len(), 1);
        assert!(compiled.alternatives[0].descendant);
        assert_eq!(
            compiled.alternatives[0].steps,
            vec![NameTest::Named {
                namespace: None,
                local_name: "item".to_string()
            }]
        );
    }

    #[test]
    fn compiles_field_with_attribute_step() {
        let compiled = compile(&expr("@id")).unwrap();
        assert!(compiled.alternatives[0].steps.is_empty());
        assert_eq!(
            compiled.alternatives[0].attribute,
            Some(NameTest::Named {
                namespace: None,
                local_name: "id".to_string()
            })
        );
    }

    #[test]
    fn compiles_union() {
        let compiled = compile(&expr("a|b")).unwrap();
        assert_eq!(compiled.alternatives.len(), 2);
    }

    #[test]
    fn rejects_double_slash_not_at_head() {
        assert!(compile(&expr("a//b")).is_err());
    }

    #[test]
    fn rejects_predicate() {
        assert!(compile(&expr("item[@id]")).is_err());
    }

    #[test]
    fn select_and_field_over_a_small_document() {
        let doc = roxmltree::Document::parse(
            "<list><item id=\"1\">a</item><item id=\"2\">b</item></list>",
        )
        .unwrap();
        let root = doc.root_element();

        let selector = compile(&expr("item")).unwrap();
        let targets = select(root, &selector);
        assert_eq!(targets.len(), 2);

        let field = compile(&expr("@id")).unwrap();
        let values: Vec<_> = targets
            .iter()
            .map(|t| match evaluate_field(*t, &field) {
                FieldValue::Resolved(v) => v,
                _ => panic!("expected a resolved field value"),
            })
            .collect();
        assert_eq!(values, vec!["1", "2"]);
    }
}
