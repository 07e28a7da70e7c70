pub mod file;
pub mod stdin;

use log::debug;
use serde::de::DeserializeOwned;

/// Read typed input from `--input <file>` or piped stdin.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        debug!("reading {what} from {path}");
        return file::read_document(path);
    }
    match stdin::read_stdin()? {
        Some(data) => {
            debug!("reading {what} from stdin");
            Ok(serde_json::from_value(data)?)
        }
        None => Err(format!("--input <file.json|file.yaml> or stdin required for {what}").into()),
    }
}
