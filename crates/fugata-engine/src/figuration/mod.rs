//! Figuration: one-beat templates realizing chord voicings as note
//! sequences, plus the non-chord-tone injection post-pass.

mod apply;
mod library;
mod nct;
mod template;

#[cfg(test)]
mod tests;

pub use apply::apply_figuration;
pub use library::{select_template, template_library};
pub use nct::inject_non_chord_tones;
pub use template::{FigurationTemplate, NctFunction, TemplateStep};
