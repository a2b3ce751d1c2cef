pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve structured input from `--input <file>` first, then piped stdin.
///
/// Returns None when neither is present so the caller can fall back to flags.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_input(path).map(Some),
        None => stdin::read_stdin(),
    }
}
