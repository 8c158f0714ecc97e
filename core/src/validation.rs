// Filename rules shared by client and server

/// Extensions accepted as DOT sources
pub const ALLOWED_EXTENSIONS: &[&str] = &["dot", "gv"];

/// Validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file selected")]
    EmptyFileName,

    #[error("Invalid file type. Only .dot and .gv files allowed")]
    InvalidExtension,

    #[error("Invalid file name: {0}")]
    UnsafeFileName(String),
}

/// Check that a name has a .dot or .gv extension (case-insensitive)
pub fn is_allowed_dot_file(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}

/// Reject names that could escape the directory they are resolved in
pub fn validate_plain_file_name(file_name: &str) -> Result<(), ValidationError> {
    if file_name.is_empty() {
        return Err(ValidationError::EmptyFileName);
    }

    if file_name.contains('/')
        || file_name.contains('\\')
        || file_name == "."
        || file_name == ".."
        || file_name.starts_with("..")
        || file_name.contains('\0')
    {
        return Err(ValidationError::UnsafeFileName(file_name.to_string()));
    }

    Ok(())
}

/// Validate a DOT file name
///
/// # Rules
/// - Name must not be empty
/// - Name must be a bare file name (no directories, no `..`)
/// - Extension must be .dot or .gv
pub fn validate_dot_file_name(file_name: &str) -> Result<(), ValidationError> {
    validate_plain_file_name(file_name)?;

    if !is_allowed_dot_file(file_name) {
        return Err(ValidationError::InvalidExtension);
    }

    Ok(())
}
