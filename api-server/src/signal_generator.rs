// Signal generator image selection
//
// DOT sources may embed a signal generator picture through an
// `image="signal_generator.png"` node attribute. Callers can ask for a
// different picture per request; the reference is rewritten before rendering.

/// Image used when the caller does not ask for one
pub const DEFAULT_SIGNAL_GENERATOR_IMAGE: &str = "signal_generator.png";

/// References that may be rewritten, checked in order
const KNOWN_REFERENCES: &[&str] = &["signal_generator.png", "signal_generator2.png"];

/// Whether a file name looks like a selectable signal generator image
pub fn is_signal_generator_image(file_name: &str) -> bool {
    file_name.starts_with("signal_generator") && file_name.ends_with(".png")
}

/// Rewrite the first known image reference that differs from `requested`
///
/// A reference already naming the requested image is skipped and the next
/// known reference is tried. Returns `None` when nothing needs rewriting.
pub fn substitute_image(source: &str, requested: &str) -> Option<String> {
    KNOWN_REFERENCES
        .iter()
        .filter(|known| **known != requested)
        .map(|known| format!("image=\"{}\"", known))
        .find(|attribute| source.contains(attribute.as_str()))
        .map(|attribute| source.replace(&attribute, &format!("image=\"{}\"", requested)))
}
