//! Entry context menu: item availability, viewport clamping, and dismissal.

use panel_host::FileEntry;
use tracing::debug;

const MENU_WIDTH_PX: i32 = 220;
const MENU_ITEM_HEIGHT_PX: i32 = 32;
const MENU_PADDING_PX: i32 = 12;
const VIEWPORT_MARGIN_PX: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Pointer position in viewport pixels.
pub struct Point {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Visible area the menu must stay within.
pub struct Viewport {
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Context menu command.
pub enum MenuItem {
    /// Open a folder or text file.
    Open,
    /// Preview a file.
    Preview,
    /// Download a file.
    Download,
    /// Rename the entry.
    Rename,
    /// Put the entry on the clipboard for copying.
    Copy,
    /// Put the entry on the clipboard for moving.
    Cut,
    /// Paste the clipboard into the current directory.
    Paste,
    /// Delete the entry.
    Delete,
    /// Show extended properties.
    Properties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A menu item and whether it can be chosen.
pub struct MenuItemState {
    /// Command.
    pub item: MenuItem,
    /// Whether the command is available for the entry.
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An open context menu.
pub struct ContextMenu {
    /// Top-left corner after clamping.
    pub position: Point,
    /// Entry the menu was opened on.
    pub entry: FileEntry,
    /// Items in display order.
    pub items: Vec<MenuItemState>,
}

impl ContextMenu {
    fn size(&self) -> (i32, i32) {
        menu_size(self.items.len())
    }

    /// Returns `true` when `point` falls inside the menu.
    pub fn contains(&self, point: Point) -> bool {
        let (w, h) = self.size();
        point.x >= self.position.x
            && point.x < self.position.x + w
            && point.y >= self.position.y
            && point.y < self.position.y + h
    }

    /// Returns whether `item` is listed and enabled.
    pub fn is_enabled(&self, item: MenuItem) -> bool {
        self.items
            .iter()
            .any(|state| state.item == item && state.enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why the menu closed.
pub enum DismissReason {
    /// Pointer pressed outside the menu.
    OutsideClick,
    /// The listing scrolled.
    Scroll,
    /// The viewport was resized.
    Resize,
    /// An item was chosen.
    ItemChosen,
}

fn menu_size(item_count: usize) -> (i32, i32) {
    let rows = i32::try_from(item_count).unwrap_or(i32::MAX / MENU_ITEM_HEIGHT_PX);
    (MENU_WIDTH_PX, rows * MENU_ITEM_HEIGHT_PX + MENU_PADDING_PX)
}

fn clamp_menu_position(at: Point, viewport: Viewport, item_count: usize) -> Point {
    let (w, h) = menu_size(item_count);
    let max_x = (viewport.w - w - VIEWPORT_MARGIN_PX).max(VIEWPORT_MARGIN_PX);
    let max_y = (viewport.h - h - VIEWPORT_MARGIN_PX).max(VIEWPORT_MARGIN_PX);
    Point::new(
        at.x.clamp(VIEWPORT_MARGIN_PX, max_x),
        at.y.clamp(VIEWPORT_MARGIN_PX, max_y),
    )
}

fn items_for(entry: &FileEntry, has_clipboard: bool) -> Vec<MenuItemState> {
    let file_only = !entry.is_folder();
    let mut items = vec![
        (MenuItem::Open, true),
        (MenuItem::Preview, file_only),
        (MenuItem::Download, file_only),
        (MenuItem::Rename, true),
        (MenuItem::Copy, true),
        (MenuItem::Cut, true),
    ];
    if has_clipboard {
        items.push((MenuItem::Paste, true));
    }
    items.push((MenuItem::Delete, true));
    items.push((MenuItem::Properties, true));
    items
        .into_iter()
        .map(|(item, enabled)| MenuItemState { item, enabled })
        .collect()
}

#[derive(Debug, Clone, Default)]
/// Holds at most one open context menu.
pub struct ContextMenuController {
    menu: Option<ContextMenu>,
    last_dismissal: Option<DismissReason>,
}

impl ContextMenuController {
    /// Opens the menu for `entry` at `at`, clamped inside `viewport`.
    pub fn open(
        &mut self,
        entry: &FileEntry,
        at: Point,
        viewport: Viewport,
        has_clipboard: bool,
    ) -> &ContextMenu {
        let items = items_for(entry, has_clipboard);
        let position = clamp_menu_position(at, viewport, items.len());
        debug!(path = %entry.path, x = position.x, y = position.y, "context menu opened");
        self.menu.insert(ContextMenu {
            position,
            entry: entry.clone(),
            items,
        })
    }

    /// Returns the open menu.
    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    /// Returns `true` while a menu is open.
    pub fn is_open(&self) -> bool {
        self.menu.is_some()
    }

    /// Returns why the last menu closed.
    pub fn last_dismissal(&self) -> Option<DismissReason> {
        self.last_dismissal
    }

    /// Closes the menu, returning it if one was open.
    pub fn dismiss(&mut self, reason: DismissReason) -> Option<ContextMenu> {
        let menu = self.menu.take()?;
        self.last_dismissal = Some(reason);
        Some(menu)
    }

    /// Handles a pointer press; closes the menu when the press lands outside it.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        match &self.menu {
            Some(menu) if !menu.contains(at) => self.dismiss(DismissReason::OutsideClick).is_some(),
            _ => false,
        }
    }

    /// Closes the menu on scroll.
    pub fn on_scroll(&mut self) -> bool {
        self.dismiss(DismissReason::Scroll).is_some()
    }

    /// Closes the menu on viewport resize.
    pub fn on_resize(&mut self) -> bool {
        self.dismiss(DismissReason::Resize).is_some()
    }

    /// Chooses `item`, closing the menu. Returns the entry it applies to when the item is
    /// enabled.
    pub fn choose(&mut self, item: MenuItem) -> Option<FileEntry> {
        if !self.menu.as_ref()?.is_enabled(item) {
            return None;
        }
        self.dismiss(DismissReason::ItemChosen).map(|menu| menu.entry)
    }
}
