//! Collision-free names for uploaded files
//!
//! An upload never replaces an existing file. The candidates for
//! `report.txt` are tried in order:
//!
//! ```text
//! report.txt, report-copia.txt, report-copia1.txt, report-copia2.txt, ...
//! ```

const COPY_SUFFIX: &str = "-copia";

/// The `attempt`-th candidate name for `file_name` (0 is the name itself)
pub fn copy_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }

    let (stem, ext) = split_extension(file_name);
    let counter = if attempt == 1 {
        String::new()
    } else {
        (attempt - 1).to_string()
    };
    format!("{}{}{}{}", stem, COPY_SUFFIX, counter, ext)
}

/// Split `name.ext` into `("name", ".ext")` at the last dot. Dots that
/// only lead the name (`.profile`) do not start an extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if file_name[..idx].chars().any(|c| c != '.') => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}
