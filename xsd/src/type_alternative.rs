use super::{
    annotation::Annotation,
    assertion::XPathExpression,
    components::{AnnotatedComponent, Component},
    shared::TypeDefinition,
    values::actual_value,
    xstypes::{QName, Sequence},
    MappingContext, Ref,
};
use roxmltree::Node;

/// Schema Component: Type Alternative, a kind of Annotated Component (§3.12)
#[derive(Clone, Debug)]
pub struct TypeAlternative {
    pub annotations: Sequence<Ref<Annotation>>,
    pub test: Option<XPathExpression>,
    pub type_definition: TypeDefinition,
}

impl TypeAlternative {
    pub const TAG_NAME: &'static str = "alternative";

    /// Maps a Type Alternative from its `<alternative>` XML representation (§3.12.2).
    ///
    /// This only handles `<alternative>` elements with a `test` [attribute]; the final,
    /// test-less `<alternative>` (which maps to the {default type definition} of the owning
    /// Type Table) is synthesized by the caller instead.
    pub(super) fn map_from_xml(context: &mut MappingContext, alternative: Node, schema: Node) -> Ref<Self> {
        assert_eq!(alternative.tag_name().name(), Self::TAG_NAME);

        // {test}
        //   An XPath Expression property record, as described in section XML Representation of
        //   Assertion Schema Components (§3.13.2), with <alternative> as the "host element" and
        //   test as the designated expression [attribute], if a test [attribute] is present,
        //   otherwise ·absent·.
        let test = alternative
            .attribute("test")
            .map(|xpath| XPathExpression::map_from_xml(xpath, alternative, schema));

        // {type definition}
        //   The type definition ·resolved· to by the ·actual value· of the type [attribute].
        let type_ = actual_value::<QName>(alternative.attribute("type").unwrap(), alternative);
        let type_definition = context.resolve(&type_);

        // {annotations}
        //   The ·annotation mapping· of the <alternative> element, as defined in XML
        //   Representation of Annotation Schema Components (§3.15.2).
        let annotations = Annotation::xml_element_annotation_mapping(context, alternative);

        context.create(Self {
            annotations,
            test,
            type_definition,
        })
    }
}

impl Component for TypeAlternative {
    const DISPLAY_NAME: &'static str = "TypeAlternative";
}

impl AnnotatedComponent for TypeAlternative {
    fn annotations(&self) -> &[Ref<Annotation>] {
        &self.annotations
    }
}
