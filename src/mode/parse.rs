//! MODE flag string interpretation.

use crate::isupport::CapabilityTable;

use super::ModeChange;

/// Interpret a MODE flag string and its parameters.
///
/// The flag string must start with `+` or `-`; otherwise nothing is
/// returned. Membership modes from the prefix table always take a
/// parameter. Other modes take one according to their class. A mode found
/// in neither table stops interpretation, as does a mode that needs a
/// parameter when none are left; changes resolved before that point are
/// kept. Output follows the flag string left to right.
///
/// ```
/// use slirc_client::isupport::CapabilityTable;
/// use slirc_client::mode::{interpret, ModeChange};
///
/// let table = CapabilityTable::default();
/// let changes = interpret("+ok-n", &["alice", "secret"], &table);
/// assert_eq!(
///     changes,
///     vec![
///         ModeChange::with_argument(true, 'o', "alice"),
///         ModeChange::with_argument(true, 'k', "secret"),
///         ModeChange::new(false, 'n'),
///     ]
/// );
/// ```
pub fn interpret<S: AsRef<str>>(
    flags: &str,
    params: &[S],
    table: &CapabilityTable,
) -> Vec<ModeChange> {
    let mut changes = Vec::new();
    let mut chars = flags.chars();
    let mut args = params.iter().map(AsRef::as_ref);

    let mut adding = match chars.next() {
        Some('+') => true,
        Some('-') => false,
        _ => return changes,
    };

    for c in chars {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            mode => {
                let takes_param = if table.is_prefix_mode(mode) {
                    true
                } else if let Some(class) = table.mode_class(mode) {
                    class.takes_param(adding)
                } else {
                    tracing::debug!(%mode, flags, "unknown channel mode, stopping");
                    break;
                };

                if takes_param {
                    let Some(arg) = args.next() else {
                        tracing::trace!(%mode, flags, "mode parameters exhausted");
                        break;
                    };
                    changes.push(ModeChange::with_argument(adding, mode, arg));
                } else {
                    changes.push(ModeChange::new(adding, mode));
                }
            }
        }
    }

    changes
}
