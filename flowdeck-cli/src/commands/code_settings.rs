//! `flowdeck code-settings`: edit a code step through its settings form.

use std::fs;
use std::path::Path;

use anyhow::Context;
use anyhow::bail;

use flowdeck_lib::error::FormError;
use flowdeck_lib::form::CodeSettingsForm;
use flowdeck_lib::form::INPUTS_HELP;
use flowdeck_lib::model::Action;
use flowdeck_lib::model::CodeAction;
use flowdeck_lib::model::FlowVersion;

use crate::cli::CodeSettingsArgs;

/// Edits requested on the command line, with file contents already read.
#[derive(Debug, Default)]
struct Edits {
    code: Option<String>,
    package_json: Option<String>,
    renames: Vec<(String, String)>,
    removes: Vec<String>,
    inputs: Vec<(String, String)>,
}

impl Edits {
    fn from_args(args: &CodeSettingsArgs) -> anyhow::Result<Self> {
        Ok(Self {
            code: args.code_file.as_deref().map(read).transpose()?,
            package_json: args.package_json_file.as_deref().map(read).transpose()?,
            renames: args.rename_inputs.clone(),
            removes: args.remove_inputs.clone(),
            inputs: args.inputs.clone(),
        })
    }

    /// Applies edits in a fixed order: sources, renames, removals, inputs.
    fn apply(self, form: &mut CodeSettingsForm) -> Result<(), FormError> {
        if let Some(code) = self.code {
            form.set_code(code)?;
        }
        if let Some(package_json) = self.package_json {
            form.set_package_json(package_json)?;
        }
        for (from, to) in self.renames {
            form.rename_input(&from, to)?;
        }
        for key in self.removes {
            form.remove_input(&key)?;
        }
        for (key, value) in self.inputs {
            form.set_input(key, value)?;
        }
        Ok(())
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn find_code_step(version: &FlowVersion, name: &str) -> anyhow::Result<CodeAction> {
    match version.action(name) {
        Some(Action::Code(step)) => Ok(step.clone()),
        Some(_) => bail!("step '{}' is not a code step", name),
        None => bail!("flow version has no step named '{}'", name),
    }
}

/// The step as the form's final values describe it, or `None` when the
/// edits left the form at its defaults.
fn edited_step(form: &CodeSettingsForm) -> Option<CodeAction> {
    if !form.is_dirty() {
        return None;
    }
    let values = form.values();
    Some(
        form.step()
            .with_new_code(values.source_code.clone(), values.input.clone()),
    )
}

pub fn run(args: &CodeSettingsArgs) -> anyhow::Result<()> {
    if args.help_inputs {
        println!("{}", INPUTS_HELP.trim());
        return Ok(());
    }

    let text = read(&args.file)?;
    let version: FlowVersion = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a flow version", args.file.display()))?;
    let step = find_code_step(&version, &args.step)?;

    let mut form = CodeSettingsForm::new(step, args.read_only, |action| {
        log::debug!("Code step '{}' updated", action.name);
    });

    Edits::from_args(args)?
        .apply(&mut form)
        .context("failed to edit code step")?;

    if !form.errors().is_empty() {
        for (field, message) in form.errors().iter() {
            eprintln!("{}: {}", field, message);
        }
        bail!("code step '{}' is invalid", form.step().name);
    }

    match edited_step(&form) {
        Some(action) => println!("{}", serde_json::to_string_pretty(&action)?),
        None => println!("No changes to '{}'.", form.step().name),
    }
    Ok(())
}
