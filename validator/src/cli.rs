use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BuiltinOverwriteAction {
    Deny,
    Warn,
    Allow,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RegisterBuiltins {
    Yes,
    No,
}

/// Validate an XML document against a W3C XML Schema document.
#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    /// The schema document (.xsd) to validate against
    #[clap(value_parser)]
    pub schema: PathBuf,

    /// The XML document to validate
    #[clap(value_parser)]
    pub input: PathBuf,

    /// Allow a XML Document Type Definition (DTD) to occur in the schema or instance document
    #[clap(long)]
    pub allow_dtd: bool,

    /// The action to take when a schema tries to overwrite a built-in type
    #[clap(long, default_value = "deny", value_enum)]
    pub builtin_overwrite: BuiltinOverwriteAction,

    /// Whether to register the builtin simple types and attributes before processing the schema
    #[clap(long, default_value = "yes", value_enum)]
    pub register_builtins: RegisterBuiltins,

    /// Print the full validation diagnostics, not just the pass/fail verdict
    #[clap(long)]
    pub verbose: bool,

    /// Validate by driving the schema-aware SAX reader directly off the input file, instead of
    /// materializing a DOM and replaying it
    #[clap(long)]
    pub sax: bool,

    /// Report the default/fixed attribute values schema-validity would otherwise require the
    /// application to materialize (VC_I_CREATE)
    #[clap(long)]
    pub materialize_defaults: bool,
}
