mod cli;
mod resolver;
mod sax_plug;

use std::io::BufReader;
use std::path::Path;

use clap::Parser;
use dt_xsd::{ValidationOptions, Validator};
use quick_xml::reader::NsReader;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let schema_path = cli
        .schema
        .canonicalize()
        .unwrap_or_else(|_| cli.schema.clone());
    let schema_dir = schema_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let xsd = std::fs::read_to_string(&cli.schema).unwrap();
    let options = roxmltree::ParsingOptions {
        allow_dtd: cli.allow_dtd,
        ..Default::default()
    };
    let xsd = roxmltree::Document::parse_with_options(&xsd, options).unwrap();

    let import_resolvers: [Box<dyn dt_xsd::import::ImportResolver>; 1] =
        [Box::new(resolver::LocalImportResolver::new(schema_dir))];

    let (schema, components) = dt_xsd::read_schema(
        xsd,
        Some(schema_path.to_string_lossy().into_owned()),
        match cli.builtin_overwrite {
            cli::BuiltinOverwriteAction::Deny => dt_xsd::BuiltinOverwriteAction::Deny,
            cli::BuiltinOverwriteAction::Warn => dt_xsd::BuiltinOverwriteAction::Warn,
            cli::BuiltinOverwriteAction::Allow => dt_xsd::BuiltinOverwriteAction::Allow,
        },
        match cli.register_builtins {
            cli::RegisterBuiltins::Yes => dt_xsd::RegisterBuiltins::Yes,
            cli::RegisterBuiltins::No => dt_xsd::RegisterBuiltins::No,
        },
        &import_resolvers,
    )
    .expect("schema failed to process");

    let validation_options = ValidationOptions {
        materialize_defaults: cli.materialize_defaults,
    };

    let outcome = if cli.sax {
        let file = std::fs::File::open(&cli.input).unwrap();
        let reader = NsReader::from_reader(BufReader::new(file));
        let mut validator = Validator::new(&schema, &components, validation_options);
        let plug = sax_plug::SaxPlug::new(reader);
        plug.drive(&mut validator)
            .expect("input document is not well-formed XML");
        validator.finish()
    } else {
        let xml_input = std::fs::read_to_string(&cli.input).unwrap();
        let xml = roxmltree::Document::parse(&xml_input).unwrap();
        dt_xsd::validate_document(&schema, &components, &xml, validation_options)
    };

    if cli.verbose {
        eprintln!(
            "{} schema-validity error(s) found",
            outcome.errors.len()
        );
    }
    for err in &outcome.errors {
        println!("error: {err}");
    }
    for attr in &outcome.materialized_attributes {
        println!(
            "materialized: {}/@{} = {:?}",
            attr.element, attr.attribute, attr.value
        );
    }
    match outcome.valid {
        true => println!("Result: valid"),
        false => println!("Result: invalid"),
    }
    std::process::exit(if outcome.valid { 0 } else { 1 });
}
