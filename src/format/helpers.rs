//! Building blocks for formats: file headers and variable declarations

use super::FormatArgs;
use crate::dictionary::Dictionary;
use crate::reference::Segment;
use crate::tokens::{value_to_string, Token};
use serde_json::Value;

const HEADER_LINES: [&str; 1] = ["Do not edit directly"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/** ... */`
    Long,
    /// `// ...`
    Short,
    /// `<!-- ... -->`
    Xml,
}

/// Header comment for generated files, empty when `showFileHeader` is off.
///
/// Extra lines can be supplied through the `fileHeader` option as an array of
/// strings.
pub fn file_header(args: &FormatArgs<'_>, style: CommentStyle) -> String {
    if !args.options.show_file_header() {
        return String::new();
    }

    let mut lines: Vec<String> = HEADER_LINES.iter().map(|line| line.to_string()).collect();
    if let Some(Value::Array(extra)) = args.option("fileHeader") {
        lines.extend(extra.iter().map(value_to_string));
    }

    match style {
        CommentStyle::Long => {
            let body: String = lines.iter().map(|line| format!(" * {line}\n")).collect();
            format!("/**\n{body} */\n\n")
        }
        CommentStyle::Short => {
            let body: String = lines.iter().map(|line| format!("// {line}\n")).collect();
            format!("{body}\n")
        }
        CommentStyle::Xml => {
            let body: String = lines.iter().map(|line| format!("  {line}\n")).collect();
            format!("<!--\n{body}-->\n")
        }
    }
}

/// Flavour of variable declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableFormat {
    /// `  --name: value;`
    Css,
    /// `$name: value;`
    Sass,
    /// `@name: value;`
    Less,
}

impl VariableFormat {
    fn prefix(self) -> &'static str {
        match self {
            VariableFormat::Css => "--",
            VariableFormat::Sass => "$",
            VariableFormat::Less => "@",
        }
    }

    fn indentation(self) -> &'static str {
        match self {
            VariableFormat::Css => "  ",
            VariableFormat::Sass | VariableFormat::Less => "",
        }
    }

    /// How another variable is referenced in this syntax.
    pub fn reference(self, name: &str) -> String {
        match self {
            VariableFormat::Css => format!("var(--{name})"),
            VariableFormat::Sass | VariableFormat::Less => format!("{}{name}", self.prefix()),
        }
    }

    fn comment(self, text: &str) -> String {
        match self {
            VariableFormat::Css => format!(" /* {text} */"),
            VariableFormat::Sass | VariableFormat::Less => format!(" // {text}"),
        }
    }
}

/// Returns a function rendering one token as a variable declaration.
///
/// With `output_references`, a string value declared with references is
/// rebuilt from its declaration: literal text is kept and every reference
/// becomes a reference to the target variable. A target removed by the
/// file's filter is written as its resolved value, since the variable would
/// not exist in the output.
pub fn create_property_formatter(
    format: VariableFormat,
    dictionary: &Dictionary,
    output_references: bool,
) -> impl Fn(&Token) -> String + '_ {
    move |token| {
        let declared = token
            .original
            .value
            .as_str()
            .filter(|_| output_references && dictionary.uses_reference(&token.original.value));
        let mut value = match declared {
            Some(declared) => value_with_references(format, dictionary, declared),
            None => value_to_string(&token.value),
        };

        if token.attribute("category") == Some("asset") {
            value = format!("\"{value}\"");
        }

        let mut line = format!(
            "{}{}{}: {}",
            format.indentation(),
            format.prefix(),
            token.name,
            value
        );
        line.push(';');
        if let Some(comment) = token.extra.get("comment").and_then(Value::as_str) {
            line.push_str(&format.comment(comment));
        }
        line
    }
}

fn value_with_references(format: VariableFormat, dictionary: &Dictionary, declared: &str) -> String {
    let syntax = dictionary.syntax();
    syntax
        .scan(declared)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text,
            Segment::Reference(path) => match dictionary.tokens().lookup(&path) {
                Some(target) if !target.name.is_empty() => format.reference(&target.name),
                _ => dictionary
                    .unfiltered_tokens()
                    .lookup(&path)
                    .map(|target| value_to_string(&target.value))
                    .unwrap_or_else(|| syntax.format_reference(&path)),
            },
        })
        .collect()
}

/// Variable declarations for every token of `dictionary`, one per line.
/// With `output_references`, referenced tokens are declared first.
pub fn formatted_variables(
    format: VariableFormat,
    dictionary: &Dictionary,
    output_references: bool,
) -> String {
    let tokens: Vec<&Token> = if output_references {
        dictionary.sorted_by_reference()
    } else {
        dictionary.all_tokens().iter().collect()
    };

    let formatter = create_property_formatter(format, dictionary, output_references);
    tokens
        .into_iter()
        .map(|token| formatter(token))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
