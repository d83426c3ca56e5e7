//! The schema bucket graph: bookkeeping for the transitive closure of schema documents reachable
//! from the root schema via `<import>`, `<include>`, and `<redefine>`.
//!
//! A "bucket" is one successfully-acquired schema document. Buckets are looked up by absolute
//! location so that a document referenced from multiple places is only ever parsed once (twice
//! for a chameleon include seen under two different target namespaces, see below). This module
//! only tracks *which* document goes with *which* namespace and in what role; the actual parsing
//! and component mapping happens in [`crate::schema::Schema::map_from_xml`], which is invoked once
//! per distinct bucket and whose resulting component sets are cached here for reuse.

use std::collections::HashMap;

use crate::{error::XsdError, Schema};

/// The relation under which a schema document was first reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BucketKind {
    /// The schema document the caller asked to process directly.
    Main,
    /// Reached via `<import>`: a different (or absent) target namespace, pulled in by reference
    /// only (its components are resolvable by name but not folded into the importer's own
    /// `{type definitions}` etc. sets).
    Import,
    /// Reached via `<include>`: the same target namespace (or chameleon), folded into the
    /// including schema's own component sets.
    Include,
    /// Reached via `<redefine>`: like `<include>`, but some of the redefined bucket's components
    /// are overridden by same-named components declared in the `<redefine>` element.
    Redefine,
}

impl BucketKind {
    /// Whether two references to the same location, with kinds `self` and `other`, are
    /// compatible. `src-import`/`src-include`/`src-redefine` forbid mixing import with
    /// include/redefine of the same document, but include and redefine may mix freely (a document
    /// can legitimately be both included and redefined by different callers), and re-referencing
    /// under the same kind is always fine.
    fn compatible_with(self, other: BucketKind) -> bool {
        use BucketKind::*;
        match (self, other) {
            (Import, Import) => true,
            (Import, _) | (_, Import) => false,
            _ => true,
        }
    }
}

/// One entry in the bucket graph: a schema document acquired under a specific kind and effective
/// target namespace.
#[derive(Clone, Debug)]
pub struct SchemaBucket {
    pub kind: BucketKind,
    pub location: String,
    /// The target namespace the document itself declares (`None` for a chameleon document).
    pub original_target_namespace: Option<String>,
    /// The target namespace the document's components were actually mapped under. Differs from
    /// `original_target_namespace` only for a chameleon include/redefine, where it is the
    /// including schema's target namespace.
    pub effective_target_namespace: Option<String>,
}

/// Outcome of asking the bucket graph to acquire a schema document.
pub enum BucketLookup {
    /// The document hasn't been seen before (under this kind/effective-namespace combination) and
    /// must be fetched and mapped by the caller.
    New,
    /// The document was already mapped under this exact (location, effective namespace) pair; its
    /// component sets were cached and should be reused instead of re-parsing.
    Cached(Schema),
}

#[derive(Default)]
pub struct BucketGraph {
    /// The bucket each location was first reached under, used to diagnose
    /// import-vs-include/redefine conflicts on a later reference to the same location. A location
    /// appears here at most once, recording the *first* kind/namespace it was acquired under.
    buckets: HashMap<String, SchemaBucket>,
    /// Mapped component sets, keyed by the document's absolute location and the effective target
    /// namespace its components ended up under. A non-chameleon document has exactly one entry
    /// here; a chameleon included from callers with two different target namespaces has two.
    cache: HashMap<(String, Option<String>), Schema>,
    main_location: Option<String>,
}

impl BucketGraph {
    pub fn new(main_location: Option<String>) -> Self {
        Self {
            main_location,
            ..Self::default()
        }
    }

    /// Ask to acquire `location` under `kind`, with the caller's target namespace `caller_ns`
    /// (used to detect chameleon re-use and, for include/redefine, to validate namespace
    /// agreement). `doc_target_ns` is the target namespace the document itself declares, if any,
    /// *before* any chameleon rewriting.
    ///
    /// Returns the effective target namespace components of this bucket should be mapped under,
    /// along with whether the bucket still needs to be parsed.
    pub fn acquire(
        &mut self,
        kind: BucketKind,
        location: &str,
        doc_target_ns: Option<&str>,
        caller_ns: Option<&str>,
    ) -> Result<(Option<String>, BucketLookup), XsdError> {
        if self.main_location.as_deref() == Some(location) {
            return Err(XsdError::SchemaRepresentation(
                match kind {
                    BucketKind::Import => XsdError::SRC_RESOLVE,
                    BucketKind::Include | BucketKind::Redefine => "src-include",
                    BucketKind::Main => XsdError::SRC_RESOLVE,
                },
                format!("schema document {location:?} references itself"),
            ));
        }

        if let Some(existing) = self.buckets.get(location) {
            if !existing.kind.compatible_with(kind) {
                let existing_kind = existing.kind;
                return Err(XsdError::SchemaRepresentation(
                    "src-import",
                    format!(
                        "schema document {location:?} was already referenced as {existing_kind:?} \
                         and cannot also be referenced as {kind:?}"
                    ),
                ));
            }
        }

        // Chameleon: an include/redefine target with no target namespace of its own takes on the
        // caller's. An import is never a chameleon (it has its own namespace rules, enforced by
        // `Import::map_from_xml`/`validate_imported_schema`).
        let effective_ns = match kind {
            BucketKind::Import => doc_target_ns.map(str::to_owned),
            BucketKind::Include | BucketKind::Redefine | BucketKind::Main => {
                match doc_target_ns {
                    Some(ns) => Some(ns.to_owned()),
                    None => caller_ns.map(str::to_owned),
                }
            }
        };

        self.buckets
            .entry(location.to_string())
            .or_insert_with(|| SchemaBucket {
                kind,
                location: location.to_string(),
                original_target_namespace: doc_target_ns.map(str::to_owned),
                effective_target_namespace: effective_ns.clone(),
            });

        let cache_key = (location.to_string(), effective_ns.clone());
        if let Some(schema) = self.cache.get(&cache_key) {
            return Ok((effective_ns, BucketLookup::Cached(schema.clone())));
        }

        if doc_target_ns.is_none() && matches!(kind, BucketKind::Include | BucketKind::Redefine) {
            tracing::warn!(
                "chameleon include/redefine of {:?} under namespace {:?}",
                location,
                caller_ns
            );
        }

        Ok((effective_ns, BucketLookup::New))
    }

    /// Record the mapped component sets for a bucket that was just parsed, so later `acquire`
    /// calls for the same (location, effective namespace) pair reuse it.
    pub fn insert(&mut self, location: &str, effective_ns: Option<String>, schema: Schema) {
        self.cache
            .insert((location.to_string(), effective_ns), schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_schema() -> Schema {
        Schema {
            annotations: Vec::new(),
            type_definitions: Vec::new(),
            attribute_declarations: Vec::new(),
            element_declarations: Vec::new(),
            attribute_group_definitions: Vec::new(),
            model_group_definitions: Vec::new(),
            notation_declarations: Vec::new(),
            identity_constraint_definitions: Vec::new(),
            target_namespace: None,
        }
    }

    #[test]
    fn rejects_self_reference() {
        let mut graph = BucketGraph::new(Some("main.xsd".to_string()));
        let err = graph
            .acquire(BucketKind::Include, "main.xsd", None, None)
            .unwrap_err();
        assert!(matches!(err, XsdError::SchemaRepresentation(_, _)));
    }

    #[test]
    fn rejects_import_include_mix() {
        let mut graph = BucketGraph::new(None);
        graph
            .acquire(BucketKind::Import, "shared.xsd", None, Some("urn:a"))
            .unwrap();
        let err = graph
            .acquire(BucketKind::Include, "shared.xsd", Some("urn:a"), Some("urn:a"))
            .unwrap_err();
        assert!(matches!(err, XsdError::SchemaRepresentation(_, _)));
    }

    #[test]
    fn allows_include_then_redefine_of_same_location() {
        let mut graph = BucketGraph::new(None);
        graph
            .acquire(BucketKind::Include, "shared.xsd", Some("urn:a"), Some("urn:a"))
            .unwrap();
        graph
            .acquire(BucketKind::Redefine, "shared.xsd", Some("urn:a"), Some("urn:a"))
            .unwrap();
    }

    #[test]
    fn chameleon_reparses_under_a_new_caller_namespace() {
        let mut graph = BucketGraph::new(None);

        let (ns1, lookup1) = graph
            .acquire(BucketKind::Include, "cham.xsd", None, Some("urn:a"))
            .unwrap();
        assert_eq!(ns1.as_deref(), Some("urn:a"));
        assert!(matches!(lookup1, BucketLookup::New));
        graph.insert("cham.xsd", ns1, empty_schema());

        let (ns2, lookup2) = graph
            .acquire(BucketKind::Include, "cham.xsd", None, Some("urn:b"))
            .unwrap();
        assert_eq!(ns2.as_deref(), Some("urn:b"));
        assert!(matches!(lookup2, BucketLookup::New));
        graph.insert("cham.xsd", ns2, empty_schema());

        let (ns3, lookup3) = graph
            .acquire(BucketKind::Include, "cham.xsd", None, Some("urn:a"))
            .unwrap();
        assert_eq!(ns3.as_deref(), Some("urn:a"));
        assert!(matches!(lookup3, BucketLookup::Cached(_)));
    }
}
