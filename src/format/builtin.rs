use super::helpers::{file_header, formatted_variables, CommentStyle, VariableFormat};
use super::{Format, FormatArgs};
use crate::error::Result;
use crate::reference;
use crate::registry::Registry;
use crate::tokens::{value_to_string, Token};
use serde::Serialize;
use serde_json::{Map, Value};
use tera::{Context, Tera};

const ANDROID_RESOURCES: &str = include_str!("templates/android_resources.xml");

pub fn register_defaults(registry: &mut Registry) {
    registry.register_format(Format::new("css/variables", css_variables));
    registry.register_format(Format::new("scss/variables", |args| {
        variables(args, VariableFormat::Sass, CommentStyle::Short)
    }));
    registry.register_format(Format::new("less/variables", |args| {
        variables(args, VariableFormat::Less, CommentStyle::Short)
    }));
    registry.register_format(Format::new("json/flat", json_flat));
    registry.register_format(Format::new("json/nested", json_nested).nested());
    registry.register_format(Format::new("javascript/module", javascript_module).nested());
    registry.register_format(Format::new("android/resources", android_resources));
}

fn css_variables(args: &FormatArgs<'_>) -> Result<String> {
    let selector = args
        .option("selector")
        .and_then(Value::as_str)
        .unwrap_or(":root");
    Ok(format!(
        "{}{} {{\n{}\n}}\n",
        file_header(args, CommentStyle::Long),
        selector,
        formatted_variables(VariableFormat::Css, args.dictionary, args.output_references())
    ))
}

fn variables(args: &FormatArgs<'_>, format: VariableFormat, style: CommentStyle) -> Result<String> {
    Ok(format!(
        "{}{}\n",
        file_header(args, style),
        formatted_variables(format, args.dictionary, args.output_references())
    ))
}

/// `{"token-name": value}` for every token.
fn json_flat(args: &FormatArgs<'_>) -> Result<String> {
    let flat: Map<String, Value> = args
        .dictionary
        .all_tokens()
        .iter()
        .map(|token| (token.name.clone(), token.value.clone()))
        .collect();
    Ok(format!("{}\n", serde_json::to_string_pretty(&flat)?))
}

/// The token tree with every token reduced to its value.
fn json_nested(args: &FormatArgs<'_>) -> Result<String> {
    let nested = args.dictionary.tokens().to_json_with(&|token| token.value.clone());
    Ok(format!("{}\n", serde_json::to_string_pretty(&nested)?))
}

fn javascript_module(args: &FormatArgs<'_>) -> Result<String> {
    Ok(format!(
        "{}module.exports = {};\n",
        file_header(args, CommentStyle::Long),
        serde_json::to_string_pretty(&args.dictionary.tokens().to_json())?
    ))
}

#[derive(Serialize)]
struct Resource {
    kind: String,
    name: String,
    value: String,
    comment: Option<String>,
}

fn android_resources(args: &FormatArgs<'_>) -> Result<String> {
    let resources: Vec<Resource> = args
        .dictionary
        .all_tokens()
        .iter()
        .map(|token| {
            let kind = resource_kind(args, token);
            Resource {
                value: resource_value(args, token, &kind),
                name: token.name.clone(),
                comment: token
                    .extra
                    .get("comment")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                kind,
            }
        })
        .collect();

    let mut context = Context::new();
    context.insert("header", &file_header(args, CommentStyle::Xml));
    context.insert("resources", &resources);

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_template("android/resources", ANDROID_RESOURCES)?;
    Ok(tera.render("android/resources", &context)?)
}

/// Resource element for a token: the `resourceType` option, then the
/// `resourceMap` option keyed by category, then the default map.
fn resource_kind(args: &FormatArgs<'_>, token: &Token) -> String {
    if let Some(kind) = args.option("resourceType").and_then(Value::as_str) {
        return kind.to_string();
    }
    let category = token.attribute("category").unwrap_or_default();
    if let Some(kind) = args
        .option("resourceMap")
        .and_then(|map| map.get(category))
        .and_then(Value::as_str)
    {
        return kind.to_string();
    }
    match category {
        "color" => "color",
        "size" => "dimen",
        "time" | "number" => "integer",
        _ => "string",
    }
    .to_string()
}

fn resource_value(args: &FormatArgs<'_>, token: &Token, kind: &str) -> String {
    let dictionary = args.dictionary;
    if args.output_references() && dictionary.uses_reference(&token.original.value) {
        let visible = reference::get_references(&token.original.value, dictionary.syntax())
            .into_iter()
            .find_map(|path| dictionary.tokens().lookup(&path));
        if let Some(target) = visible {
            return format!("@{kind}/{}", target.name);
        }
    }
    value_to_string(&token.value)
}
