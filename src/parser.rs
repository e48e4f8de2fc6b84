use crate::{
    error::{Error, Mismatch, ValidationError},
    parsed::ParsedArgs,
    schema::{FieldKind, FieldValue, Schema},
};
use std::ffi::OsString;

/// Post-parse hooks. `validate` runs cross-field consistency checks over the
/// populated record; `process` may write derived values. Both default to
/// no-ops.
pub trait Hooks {
    fn validate(&self, _args: &ParsedArgs) -> Result<(), ValidationError> {
        Ok(())
    }

    fn process(&self, _args: &mut ParsedArgs) -> Result<(), ValidationError> {
        Ok(())
    }
}

struct NoHooks;

impl Hooks for NoHooks {}

/// Typed layer over clap. Builds one `--<field>` option per schema argument,
/// parses, checks every bound value against its declared kind (exact
/// equality, no coercion), and copies values into a [`ParsedArgs`] record.
pub struct TypedParser {
    program: String,
    schema: Schema,
    hooks: Box<dyn Hooks>,
}

impl TypedParser {
    pub fn new(program: impl Into<String>, schema: Schema) -> Self {
        Self {
            program: program.into(),
            schema,
            hooks: Box::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    fn command(&self) -> clap::Command<'_> {
        let mut command =
            clap::Command::new(self.program.clone()).about(self.schema.summary.as_deref());
        for argument in &self.schema.arguments {
            let mut arg = clap::Arg::new(argument.name.as_str())
                .long(argument.name.as_str())
                .help(argument.help.as_str())
                .takes_value(true)
                .required(argument.required);
            if argument.kind == FieldKind::List {
                arg = arg.multiple_values(true);
            }
            // Negative numbers would otherwise be read as flags.
            if matches!(argument.kind, FieldKind::Int | FieldKind::Float) {
                arg = arg.allow_hyphen_values(true);
            }
            command = command.arg(arg);
        }
        command
    }

    /// Parses the process's own command line.
    pub fn parse(&self) -> Result<ParsedArgs, Error> {
        self.parse_from(std::env::args())
    }

    /// Parses `argv` (the first element is the program name). Missing
    /// required flags and unknown flags surface as [`Error::Parse`] from the
    /// underlying parser; the typed checks run afterwards, field by field.
    pub fn parse_from<I, T>(&self, argv: I) -> Result<ParsedArgs, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(argv)?;

        let mut args = ParsedArgs::new(self.schema.constants.clone());
        for argument in &self.schema.arguments {
            let bound = if argument.kind == FieldKind::List {
                matches
                    .values_of(argument.name.as_str())
                    .map(|values| FieldValue::List(values.map(str::to_string).collect()))
            } else {
                matches
                    .value_of(argument.name.as_str())
                    .map(|raw| {
                        FieldValue::from_raw(argument.kind, raw).ok_or_else(|| {
                            Error::TypeMismatch {
                                field: argument.name.clone(),
                                mismatch: Mismatch::new(
                                    argument.kind.to_string(),
                                    format!("\"{raw}\""),
                                ),
                            }
                        })
                    })
                    .transpose()?
            };
            let value = match bound.or_else(|| argument.default.clone()) {
                Some(value) => value,
                None => {
                    // Optional argument with no default: the field would stay
                    // unset, which breaks the every-field-holds-a-value
                    // invariant.
                    return Err(Error::TypeMismatch {
                        field: argument.name.clone(),
                        mismatch: Mismatch::new(
                            argument.kind.to_string(),
                            "no value".to_string(),
                        ),
                    });
                }
            };

            let decl = self
                .schema
                .decl(&argument.name)
                .ok_or_else(|| Error::UndeclaredField(argument.name.clone()))?;
            if value.kind() != decl.kind {
                return Err(Error::TypeMismatch {
                    field: argument.name.clone(),
                    mismatch: Mismatch::new(decl.kind.to_string(), value.kind().to_string()),
                });
            }
            args.assign(argument.name.clone(), value);
        }

        self.hooks.validate(&args)?;
        self.hooks.process(&mut args)?;
        tracing::debug!(program = %self.program, "parsed command line");
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArgSpec, FieldDecl};
    use pretty_assertions::assert_eq;

    const TRAINER_DOC: &str = "Trains a model.\n\n:lr: learning rate\n:epochs: number of passes";

    fn trainer() -> TypedParser {
        let schema = Schema::builder()
            .doc(TRAINER_DOC)
            .field(FieldDecl::new("lr", FieldKind::Float))
            .field(FieldDecl::new("epochs", FieldKind::Int).default(FieldValue::Int(10)))
            .build()
            .unwrap();
        TypedParser::new("train", schema)
    }

    #[test]
    fn parses_typed_values() {
        let args = trainer()
            .parse_from(["train", "--lr", "0.01", "--epochs", "7"])
            .unwrap();
        assert_eq!(args.get_float("lr"), Some(0.01));
        assert_eq!(args.get_int("epochs"), Some(7));
    }

    #[test]
    fn default_applies_when_flag_absent() {
        let args = trainer().parse_from(["train", "--lr", "0.01"]).unwrap();
        assert_eq!(args.get_int("epochs"), Some(10));
        assert_eq!(
            serde_json::to_value(args.as_dict()).unwrap(),
            serde_json::json!({"epochs": 10, "lr": 0.01})
        );
    }

    #[test]
    fn missing_required_flag_is_a_parse_error() {
        let err = trainer().parse_from(["train"]).unwrap_err();
        match err {
            Error::Parse(inner) => assert!(inner.to_string().contains("--lr")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn untyped_text_is_a_type_error() {
        let err = trainer()
            .parse_from(["train", "--lr", "0.01", "--epochs", "abc"])
            .unwrap_err();
        match err {
            Error::TypeMismatch { field, mismatch } => {
                assert_eq!(field, "epochs");
                assert_eq!(mismatch, Mismatch::new("int".to_string(), "\"abc\"".to_string()));
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_flag_is_a_parse_error() {
        let err = trainer()
            .parse_from(["train", "--lr", "0.01", "--bogus", "1"])
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn help_text_carries_kind_and_description() {
        let err = trainer().parse_from(["train", "--help"]).unwrap_err();
        match err {
            Error::Parse(inner) => {
                let rendered = inner.to_string();
                assert!(rendered.contains("Trains a model."));
                assert!(rendered.contains("(float) learning rate"));
                assert!(rendered.contains("(int) number of passes"));
            }
            other => panic!("expected help output, got {other:?}"),
        }
    }

    #[test]
    fn custom_kind_contradicting_declaration_fails_exactly() {
        // The custom argument parses "7" as a float; the declaration says
        // int. Exact kind equality rejects the widening.
        let schema = Schema::builder()
            .field(FieldDecl::new("epochs", FieldKind::Int))
            .argument(ArgSpec::new("epochs").kind(FieldKind::Float))
            .build()
            .unwrap();
        let err = TypedParser::new("train", schema)
            .parse_from(["train", "--epochs", "7"])
            .unwrap_err();
        match err {
            Error::TypeMismatch { field, mismatch } => {
                assert_eq!(field, "epochs");
                assert_eq!(mismatch, Mismatch::new("int".to_string(), "float".to_string()));
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn argument_for_undeclared_field_is_rejected_at_parse() {
        let schema = Schema::builder()
            .argument(ArgSpec::new("stray").kind(FieldKind::Str))
            .build()
            .unwrap();
        let err = TypedParser::new("train", schema)
            .parse_from(["train", "--stray", "x"])
            .unwrap_err();
        match err {
            Error::UndeclaredField(field) => assert_eq!(field, "stray"),
            other => panic!("expected undeclared field error, got {other:?}"),
        }
    }

    #[test]
    fn optional_argument_without_default_cannot_stay_unset() {
        let schema = Schema::builder()
            .field(FieldDecl::new("seed", FieldKind::Int))
            .argument(ArgSpec::new("seed").required(false))
            .build()
            .unwrap();
        let err = TypedParser::new("train", schema)
            .parse_from(["train"])
            .unwrap_err();
        match err {
            Error::TypeMismatch { field, mismatch } => {
                assert_eq!(field, "seed");
                assert_eq!(mismatch.found, "no value");
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn list_field_collects_all_values() {
        let schema = Schema::builder()
            .field(FieldDecl::new("tags", FieldKind::List).default(FieldValue::List(vec![])))
            .build()
            .unwrap();
        let parser = TypedParser::new("train", schema);

        let args = parser.parse_from(["train", "--tags", "a", "b"]).unwrap();
        assert_eq!(
            args.get_list("tags"),
            Some(&["a".to_string(), "b".to_string()][..])
        );

        let args = parser.parse_from(["train"]).unwrap();
        assert_eq!(args.get_list("tags"), Some(&[][..]));
    }

    #[test]
    fn independent_parses_never_share_list_storage() {
        let schema = Schema::builder()
            .field(FieldDecl::new("tags", FieldKind::List).default(FieldValue::List(vec![])))
            .build()
            .unwrap();
        let parser = TypedParser::new("train", schema);

        let mut first = parser.parse_from(["train"]).unwrap();
        let second = parser.parse_from(["train"]).unwrap();
        first.set("tags", FieldValue::List(vec!["mutated".to_string()]));
        assert_eq!(second.get_list("tags"), Some(&[][..]));
    }

    struct PositiveLr;

    impl Hooks for PositiveLr {
        fn validate(&self, args: &ParsedArgs) -> Result<(), ValidationError> {
            match args.get_float("lr") {
                Some(lr) if lr > 0.0 => Ok(()),
                _ => Err(ValidationError::new("lr must be positive")),
            }
        }

        fn process(&self, args: &mut ParsedArgs) -> Result<(), ValidationError> {
            let total = args.get_int("epochs").unwrap_or(0);
            args.set("total_steps", FieldValue::Int(total * 100));
            Ok(())
        }
    }

    #[test]
    fn validation_hook_failure_surfaces_as_is() {
        let err = trainer()
            .with_hooks(PositiveLr)
            .parse_from(["train", "--lr", "-1.0"])
            .unwrap_err();
        match err {
            Error::Validation(inner) => {
                assert_eq!(inner, ValidationError::new("lr must be positive"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn process_hook_writes_derived_values() {
        let args = trainer()
            .with_hooks(PositiveLr)
            .parse_from(["train", "--lr", "0.01"])
            .unwrap();
        assert_eq!(args.get_int("total_steps"), Some(1000));
    }
}
