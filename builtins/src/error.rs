use thiserror::Error;

/// Failure to validate or compute the value of a built-in XSD datatype's lexical
/// representation.
#[derive(Debug, Clone, Error)]
pub enum DatatypeError {
    #[error("{lexical:?} is not in the lexical space of {type_name}")]
    Lexical {
        type_name: &'static str,
        lexical: String,
    },

    #[error("{lexical:?} is out of the value range of {type_name}")]
    OutOfRange {
        type_name: &'static str,
        lexical: String,
    },

    #[error("invalid pattern facet: {0}")]
    InvalidPattern(String),
}
