//! Pass-through flag handling for the command line.
//!
//! Our own flags are taken out of the argument list before the rest is handed
//! to the pipeline's parser, which would otherwise reject them.

use crate::error::{Error, Result};

pub fn arguments() -> Vec<String> {
    std::env::args().collect()
}

/// Remove `--<name> <value>` or `--<name>=<value>` from `arguments`.
///
/// Only the first occurrence is consumed. A separate value is only taken if
/// it does not look like another flag. One pair of surrounding `"` is
/// stripped from the value. Giving the flag without a usable value is an
/// error; leaving it out is not.
pub fn extract_argument(
    mut arguments: Vec<String>,
    name: &str,
) -> Result<(Vec<String>, Option<String>)> {
    let lookup = format!("--{name}");
    let prefix = format!("{lookup}=");

    let mut present = false;
    let mut raw = None;

    if let Some(index) = arguments
        .iter()
        .position(|arg| *arg == lookup || arg.starts_with(&prefix))
    {
        present = true;
        let arg = arguments.remove(index);
        if arg == lookup {
            if arguments.get(index).is_some_and(|next| !next.starts_with('-')) {
                raw = Some(arguments.remove(index));
            }
        } else {
            raw = Some(arg[prefix.len()..].to_string());
        }
    }

    let value = remove_surrounding_quotes(raw);
    if present && value.is_none() {
        return Err(Error::MissingArgumentValue {
            name: name.to_string(),
        });
    }

    Ok((arguments, value))
}

fn remove_surrounding_quotes(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.strip_prefix('"').unwrap_or(&value);
    let value = value.strip_suffix('"').unwrap_or(value);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
