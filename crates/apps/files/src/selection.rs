//! Single and multi selection rules for listing entries.

use std::collections::BTreeSet;

use panel_host::{DirectoryListing, FileEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Keyboard modifier held during a click.
pub enum ClickModifier {
    /// Plain click.
    #[default]
    None,
    /// Multi-select gesture (Ctrl/Cmd-click).
    Multi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Follow-up the session must perform after a click.
pub enum SelectionEffect {
    /// Selection changed only.
    None,
    /// Navigate into this folder path.
    Navigate(String),
    /// Open this text entry in the editor.
    OpenEditor(FileEntry),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Active entry plus the modifier-click multi-selection.
pub struct SelectionManager {
    active: Option<FileEntry>,
    multi: BTreeSet<String>,
}

impl SelectionManager {
    /// Applies a click on `entry`.
    ///
    /// A plain click clears the multi-selection, makes `entry` active, and navigates into
    /// folders or opens text files. A multi click only toggles `entry` in the multi-selection.
    pub fn click(&mut self, entry: &FileEntry, modifier: ClickModifier) -> SelectionEffect {
        match modifier {
            ClickModifier::Multi => {
                if !self.multi.remove(&entry.name) {
                    self.multi.insert(entry.name.clone());
                }
                SelectionEffect::None
            }
            ClickModifier::None => {
                self.multi.clear();
                self.active = Some(entry.clone());
                if entry.is_folder() {
                    SelectionEffect::Navigate(entry.path.clone())
                } else if entry.is_text() {
                    SelectionEffect::OpenEditor(entry.clone())
                } else {
                    SelectionEffect::None
                }
            }
        }
    }

    /// Makes `entry` the active target without side effects (context menu).
    pub fn set_active(&mut self, entry: &FileEntry) {
        self.active = Some(entry.clone());
    }

    /// Adds every entry of `listing` to the multi-selection.
    pub fn select_all(&mut self, listing: &DirectoryListing) {
        self.multi = listing
            .entries
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
    }

    /// Clears both single and multi selection.
    pub fn clear(&mut self) {
        self.active = None;
        self.multi.clear();
    }

    /// Returns the active entry.
    pub fn active(&self) -> Option<&FileEntry> {
        self.active.as_ref()
    }

    /// Returns the multi-selected names.
    pub fn multi(&self) -> &BTreeSet<String> {
        &self.multi
    }

    /// Returns `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.multi.is_empty()
    }

    /// Returns `true` when `name` is active or multi-selected.
    pub fn is_selected(&self, name: &str) -> bool {
        self.multi.contains(name) || self.active.as_ref().is_some_and(|e| e.name == name)
    }

    /// Entries an action applies to: the multi-selection when present, else the active entry.
    pub fn targets(&self, listing: Option<&DirectoryListing>) -> Vec<FileEntry> {
        if self.multi.is_empty() {
            return self.active.iter().cloned().collect();
        }
        listing
            .map(|listing| {
                listing
                    .entries
                    .iter()
                    .filter(|entry| self.multi.contains(&entry.name))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use panel_host::FileKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn listing() -> DirectoryListing {
        DirectoryListing {
            domain: "example.com".to_string(),
            path: "site".to_string(),
            entries: vec![
                FileEntry::new("site/assets", FileKind::Folder),
                FileEntry::new("site/index.html", FileKind::Text),
                FileEntry::new("site/logo.png", FileKind::Image),
            ],
        }
    }

    #[test]
    fn plain_click_dispatches_by_kind() {
        let listing = listing();
        let mut selection = SelectionManager::default();
        assert_eq!(
            selection.click(&listing.entries[0], ClickModifier::None),
            SelectionEffect::Navigate("site/assets".to_string())
        );
        assert_eq!(
            selection.click(&listing.entries[1], ClickModifier::None),
            SelectionEffect::OpenEditor(listing.entries[1].clone())
        );
        assert_eq!(
            selection.click(&listing.entries[2], ClickModifier::None),
            SelectionEffect::None
        );
        assert_eq!(selection.active().map(|e| e.name.as_str()), Some("logo.png"));
    }

    #[test]
    fn modifier_click_toggles_and_never_navigates() {
        let listing = listing();
        let mut selection = SelectionManager::default();
        for entry in &listing.entries {
            assert_eq!(
                selection.click(entry, ClickModifier::Multi),
                SelectionEffect::None
            );
        }
        assert_eq!(selection.multi().len(), 3);
        selection.click(&listing.entries[0], ClickModifier::Multi);
        assert!(!selection.is_selected("assets"));
        assert_eq!(selection.targets(Some(&listing)).len(), 2);
    }

    #[test]
    fn plain_click_on_folder_clears_multi_selection() {
        let listing = listing();
        let mut selection = SelectionManager::default();
        selection.click(&listing.entries[1], ClickModifier::Multi);
        selection.click(&listing.entries[2], ClickModifier::Multi);
        let effect = selection.click(&listing.entries[0], ClickModifier::None);
        assert!(matches!(effect, SelectionEffect::Navigate(_)));
        assert!(selection.multi().is_empty());
        assert_eq!(
            selection.targets(Some(&listing)),
            vec![listing.entries[0].clone()]
        );
    }

    #[test]
    fn select_all_and_clear() {
        let listing = listing();
        let mut selection = SelectionManager::default();
        selection.select_all(&listing);
        assert_eq!(selection.targets(Some(&listing)), listing.entries);
        selection.clear();
        assert!(selection.is_empty());
        assert!(selection.targets(Some(&listing)).is_empty());
    }
}
