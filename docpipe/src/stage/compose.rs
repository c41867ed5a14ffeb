//! Task composition.
//!
//! A stage's task is its fixed instructional template followed by one
//! labeled section per declared dependency, in declaration order. Sections
//! for absent or unreadable dependencies are kept with an empty body so the
//! worker always sees the same document structure for a given stage.

/// Composes a task description from a template and labeled excerpts.
#[must_use]
pub fn compose_task(template: &str, sections: &[(String, String)]) -> String {
    let mut task = String::with_capacity(
        template.len() + sections.iter().map(|(l, e)| l.len() + e.len() + 24).sum::<usize>(),
    );
    task.push_str(template.trim_end());
    for (label, excerpt) in sections {
        task.push_str("\n\n--- ");
        task.push_str(label);
        task.push_str(" (excerpt) ---\n");
        task.push_str(excerpt);
    }
    task
}
