//! Centralized keybinding descriptions
//!
//! Shared by the footer hints and the help overlay so they never disagree
//! with the key handler.

pub type HelpSection = (&'static str, Vec<(&'static str, &'static str)>);

/// Keys shown in the help overlay, grouped by section
pub fn help_sections(read_only: bool) -> Vec<HelpSection> {
    let mut sections = vec![
        (
            "NAVIGATION",
            vec![
                ("<j>/<Down>", "Move down"),
                ("<k>/<Up>", "Move up"),
                ("<g>/<G>", "Top / bottom"),
                ("<]>/<Right>", "Next page"),
                ("<[>/<Left>", "Previous page"),
                ("<z>", "Cycle page size"),
            ],
        ),
        (
            "GENERAL",
            vec![
                ("</>", "Search by name"),
                ("<:>", "Switch namespace"),
                ("<Tab>", "Complete namespace"),
                ("<Esc>", "Clear / back"),
                ("<?>", "Show/hide help"),
                ("<q>", "Quit"),
            ],
        ),
    ];
    if !read_only {
        sections.push((
            "APPLICATION",
            vec![
                ("<p>", "Pause"),
                ("<s>", "Start"),
                ("<r>", "Restart"),
                ("<d>", "Delete"),
            ],
        ));
    }
    sections
}

/// Short hints for the footer line
pub fn footer_hints(read_only: bool) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![
        ("/", "search"),
        (":", "namespace"),
        ("[ ]", "page"),
        ("z", "page size"),
    ];
    if !read_only {
        hints.extend([
            ("p", "pause"),
            ("s", "start"),
            ("r", "restart"),
            ("d", "delete"),
        ]);
    }
    hints.extend([("?", "help"), ("q", "quit")]);
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_hides_lifecycle_keys() {
        assert!(footer_hints(true).iter().all(|(key, _)| *key != "r"));
        assert!(footer_hints(false).iter().any(|(key, _)| *key == "r"));
        assert!(footer_hints(true).iter().all(|(key, _)| *key != "d"));
        assert!(footer_hints(false).iter().any(|(key, _)| *key == "d"));
        assert_eq!(help_sections(true).len(), 2);
        assert_eq!(help_sections(false).len(), 3);
    }
}
