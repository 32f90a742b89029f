//! `passlock generate` — print a random password.  No vault needed.

use crate::cli::output;
use crate::errors::Result;
use crate::password;

/// Execute the `generate` command.
pub fn execute(length: Option<i64>) -> Result<()> {
    let generated = password::generate(length);
    println!("{generated}");

    if let Some(requested) = length {
        let actual = generated.chars().count();
        if i64::try_from(actual).ok() != Some(requested) {
            output::warning(&format!(
                "Length {requested} is out of range; generated {actual} characters."
            ));
        }
    }

    Ok(())
}
