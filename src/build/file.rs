//! Building and cleaning single output files

use super::messages::{MessageGroups, FILTERED_REFERENCE_WARNINGS, NAME_COLLISION_WARNINGS};
use super::report::{Collision, FileOutcome, FileReport, FilteredReference};
use super::reporter::{LineStyle, Reporter};
use crate::config::{DoneArgs, FileConfig, PlatformConfig};
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::filter::filter_dictionary;
use crate::format::{Format, FormatArgs};
use crate::registry::Registry;
use crate::tokens::Token;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const COLLISION_HELP: [&str; 4] = [
    "This many-to-one issue is usually caused by some combination of:",
    "* conflicting or similar paths/names in token definitions",
    "* platform transforms/transformGroups affecting names, especially when removing specificity",
    "* overly inclusive file filters",
];
const FILTERED_REFERENCE_HELP: &str = "This is caused when combining a filter and `outputReferences`.";

/// Everything shared by the files of one platform.
pub(crate) struct PlatformContext<'a> {
    pub registry: &'a Registry,
    pub platform: &'a PlatformConfig,
    pub dictionary: &'a Dictionary,
    pub base_dir: &'a Path,
    pub reporter: &'a dyn Reporter,
}

impl PlatformContext<'_> {
    fn silent(&self, file: &FileConfig) -> bool {
        file.silent || self.platform.silent
    }

    fn writes(&self, file: &FileConfig) -> bool {
        self.platform.writes_files() && file.write.unwrap_or(true)
    }

    fn disk_path(&self, full_destination: &str) -> PathBuf {
        self.base_dir.join(full_destination)
    }

    fn filtered(&self, file: &FileConfig) -> Result<Dictionary> {
        let predicate = file
            .filter
            .as_ref()
            .map(|filter| filter.resolve(self.registry))
            .transpose()?;
        Ok(filter_dictionary(self.dictionary, predicate.as_ref()))
    }
}

fn destination(file: &FileConfig) -> Result<&str> {
    file.destination
        .as_deref()
        .filter(|destination| !destination.is_empty())
        .ok_or_else(|| Error::config("Please enter a valid destination"))
}

fn format<'r>(registry: &'r Registry, file: &FileConfig) -> Result<&'r Format> {
    let name = file
        .format
        .as_deref()
        .ok_or_else(|| Error::config("Please enter a valid file format"))?;
    registry
        .format(name)
        .ok_or_else(|| Error::config(format!("Please enter a valid file format: unknown format \"{name}\"")))
}

/// Filter, format, write and report one file.
pub(crate) fn build_file(
    context: &PlatformContext<'_>,
    file: &FileConfig,
    messages: &mut MessageGroups,
) -> Result<FileReport> {
    let format = format(context.registry, file)?;
    let destination = destination(file)?;
    let full_destination = context.platform.full_destination(destination);
    let silent = context.silent(file);

    let dictionary = context.filtered(file)?;
    if dictionary.is_empty() {
        if !silent {
            context.reporter.log_styled(
                LineStyle::Failure,
                &format!("No properties for {destination}. File not created."),
            );
        }
        debug!("Skipping {}: no tokens after filtering", full_destination);
        return Ok(FileReport::new(full_destination, FileOutcome::Skipped));
    }

    let collision_group = MessageGroups::key(NAME_COLLISION_WARNINGS, destination);
    messages.clear(&collision_group);
    let collisions = if format.is_nested() {
        Vec::new()
    } else {
        name_collisions(dictionary.all_tokens())
    };
    for collision in &collisions {
        messages.add(&collision_group, collision_message(collision));
    }

    let args = FormatArgs::new(&dictionary, context.platform, file);
    let reference_group = MessageGroups::key(FILTERED_REFERENCE_WARNINGS, destination);
    messages.clear(&reference_group);
    let filtered_references = if args.output_references() {
        filtered_references(&dictionary)
    } else {
        Vec::new()
    };
    for filtered in &filtered_references {
        messages.add(
            &reference_group,
            format!("{} -> {}", filtered.token, filtered.reference),
        );
    }

    let result = format.format(&args).map_err(|e| Error::Format {
        format: format.name.clone(),
        destination: full_destination.clone(),
        message: e.to_string(),
    })?;

    let outcome = if context.writes(file) {
        let path = context.disk_path(&full_destination);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &result)?;
        info!("Wrote {}", path.display());
        FileOutcome::Written
    } else {
        FileOutcome::Formatted
    };

    let done = DoneArgs {
        file,
        platform: context.platform,
        dictionary: context.dictionary,
        result: &result,
    };
    if let Some(hook) = &context.platform.done {
        hook.call(&done);
    }
    if let Some(hook) = &file.done {
        hook.call(&done);
    }

    if !silent {
        report_status(context.reporter, destination, &full_destination, messages);
    }

    Ok(FileReport {
        destination: full_destination,
        outcome,
        collisions,
        filtered_references,
    })
}

/// Tokens sharing an output name, in order of first appearance.
pub(crate) fn name_collisions(tokens: &[Token]) -> Vec<Collision> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: HashMap<&str, Vec<&Token>> = HashMap::new();
    for token in tokens {
        let entry = by_name.entry(token.name.as_str()).or_default();
        if entry.is_empty() {
            order.push(token.name.as_str());
        }
        entry.push(token);
    }

    order
        .into_iter()
        .filter_map(|name| {
            let tokens = by_name.get(name)?;
            (tokens.len() > 1).then(|| Collision {
                name: name.to_string(),
                tokens: tokens
                    .iter()
                    .map(|token| (token.path_string(), token.value_string()))
                    .collect(),
            })
        })
        .collect()
}

fn collision_message(collision: &Collision) -> String {
    let sources: Vec<String> = collision
        .tokens
        .iter()
        .map(|(path, value)| format!("{path}   {value}"))
        .collect();
    format!(
        "Output name {} was generated by:\n        {}",
        collision.name,
        sources.join("\n        ")
    )
}

/// References used by visible tokens whose targets the filter removed.
fn filtered_references(dictionary: &Dictionary) -> Vec<FilteredReference> {
    dictionary
        .all_tokens()
        .iter()
        .flat_map(|token| {
            dictionary
                .filtered_references(&token.original.value)
                .into_iter()
                .map(move |path| FilteredReference {
                    token: token.path_string(),
                    reference: path.join("."),
                })
        })
        .collect()
}

fn report_status(
    reporter: &dyn Reporter,
    destination: &str,
    full_destination: &str,
    messages: &mut MessageGroups,
) {
    let collision_group = MessageGroups::key(NAME_COLLISION_WARNINGS, destination);
    let reference_group = MessageGroups::key(FILTERED_REFERENCE_WARNINGS, destination);

    if messages.count(&collision_group) == 0 && messages.count(&reference_group) == 0 {
        reporter.log_styled(LineStyle::Success, &format!("✔︎ {full_destination}"));
        return;
    }

    reporter.log_styled(LineStyle::Plain, &format!("⚠️ {full_destination}"));

    let collisions = messages.flush(&collision_group);
    if !collisions.is_empty() {
        reporter.log_styled(
            LineStyle::Failure,
            &format!(
                "While building {destination}, token collisions were found; output may be unexpected.\n    {}\n{}",
                collisions.join("\n    "),
                COLLISION_HELP.join("\n    ")
            ),
        );
    }

    let references = messages.flush(&reference_group);
    if !references.is_empty() {
        reporter.log_styled(
            LineStyle::Failure,
            &format!(
                "While building {destination}, filtered out token references were found; output may be unexpected. Here are the references that are used but not defined in the file\n    {}\n{FILTERED_REFERENCE_HELP}",
                references.join("\n    ")
            ),
        );
    }
}

/// Delete the file a build with the same configuration would write.
pub(crate) fn clean_file(context: &PlatformContext<'_>, file: &FileConfig) -> Result<FileReport> {
    let destination = destination(file)?;
    let full_destination = context.platform.full_destination(destination);
    let silent = context.silent(file);

    if !context.writes(file) || context.filtered(file)?.is_empty() {
        return Ok(FileReport::new(full_destination, FileOutcome::Skipped));
    }

    let path = context.disk_path(&full_destination);
    if !path.exists() {
        if !silent {
            context.reporter.log_styled(
                LineStyle::Warning,
                &format!("! {full_destination}, does not exist"),
            );
        }
        return Ok(FileReport::new(full_destination, FileOutcome::NotFound));
    }

    fs::remove_file(&path)?;
    if !silent {
        context
            .reporter
            .log_styled(LineStyle::Failure, &format!("- {full_destination}"));
    }
    Ok(FileReport::new(full_destination, FileOutcome::Deleted))
}

/// Remove the now-empty directories above a cleaned destination, never
/// leaving the base directory.
pub(crate) fn clean_dirs(context: &PlatformContext<'_>, full_destination: &str) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    let mut relative = Path::new(full_destination).parent();

    while let Some(dir) = relative.filter(|dir| !dir.as_os_str().is_empty()) {
        let path = context.disk_path(&dir.to_string_lossy());
        if !path.starts_with(context.base_dir) || path == context.base_dir {
            break;
        }
        if path.is_dir() {
            if fs::read_dir(&path)?.next().is_some() {
                break;
            }
            fs::remove_dir(&path)?;
            let shown = dir.to_string_lossy().to_string();
            if !context.platform.silent {
                context
                    .reporter
                    .log_styled(LineStyle::Failure, &format!("- {shown}"));
            }
            removed.push(shown);
        }
        relative = dir.parent();
    }
    Ok(removed)
}
