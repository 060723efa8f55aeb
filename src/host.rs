//! Collaborators consulted by [`AssignedWindows`](crate::assigned::AssignedWindows).
//!
//! The assignment core never talks to the OS directly. Everything it needs to
//! know about a window (whether it still exists, which desktop it lives on,
//! where it sits in the global stacking order) and everything it needs to do
//! to one (focus it, restyle it, persist its tab sort key) goes through the
//! two traits below.
//!
//! [`MemoryHost`] is a self-contained implementation that keeps all of that
//! state in memory. The terminal demo, the `zone-sim` driver and the tests
//! run against it.

use std::collections::BTreeMap;
use std::fmt::Debug;

/// Persisted per-window key used to rebuild tab order within a zone group.
pub type TabSortKey = u64;

/// Durable per-window metadata owned outside the assignment core.
pub trait PropertyStore<W> {
    fn tab_sort_key(&self, window: W) -> Option<TabSortKey>;

    /// `None` clears the stored key.
    fn set_tab_sort_key(&mut self, window: W, key: Option<TabSortKey>);
}

/// Facts about, and best-effort actions on, live OS windows.
pub trait WindowSystem<W> {
    fn is_window_live(&self, window: W) -> bool;

    fn is_on_current_desktop(&self, window: W) -> bool;

    /// Bring `window` to the foreground. Failures are swallowed.
    fn activate(&mut self, window: W);

    /// Suppress rounded corners on `window`. Failures are swallowed.
    fn disable_round_corners(&mut self, window: W);

    /// Return the candidate nearest the front of the global z-order together
    /// with its ordinal depth (0 = frontmost window on the system), or `None`
    /// when no candidate appears in the z-order at all.
    ///
    /// Implementations must query the live order on every call.
    fn topmost_of(&self, candidates: &[W]) -> Option<(W, usize)>;
}

/// Walk a front-to-back window list and report the first window that is one of
/// `candidates`, along with how many windows were passed before reaching it.
pub fn lowest_z_order_window<W, I>(top_to_bottom: I, candidates: &[W]) -> Option<(W, usize)>
where
    W: Copy + Eq,
    I: IntoIterator<Item = W>,
{
    top_to_bottom
        .into_iter()
        .enumerate()
        .find(|(_, window)| candidates.contains(window))
        .map(|(depth, window)| (window, depth))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HostWindow {
    desktop: usize,
    round_corners: bool,
}

/// In-memory stand-in for the OS window list, virtual desktops and the window
/// property store.
#[derive(Debug, Clone)]
pub struct MemoryHost<W: Copy + Eq + Ord> {
    windows: BTreeMap<W, HostWindow>,
    // back-to-front; the last entry is the frontmost window
    z_order: Vec<W>,
    sort_keys: BTreeMap<W, TabSortKey>,
    foreground: Option<W>,
    current_desktop: usize,
}

impl<W: Copy + Eq + Ord + Debug> Default for MemoryHost<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Copy + Eq + Ord + Debug> MemoryHost<W> {
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            z_order: Vec::new(),
            sort_keys: BTreeMap::new(),
            foreground: None,
            current_desktop: 0,
        }
    }

    /// Open `window` on the current desktop, in front of everything else.
    /// Re-opening a live window only brings it to the front.
    pub fn open_window(&mut self, window: W) {
        let desktop = self.current_desktop;
        self.windows.entry(window).or_insert_with(|| {
            tracing::debug!(window = ?window, desktop, "host opened window");
            HostWindow {
                desktop,
                round_corners: true,
            }
        });
        self.bring_to_front(window);
    }

    /// Destroy `window`. Its properties go with it, and anything still holding
    /// its id now holds a stale handle. Returns `false` if it was not open.
    pub fn close_window(&mut self, window: W) -> bool {
        if self.windows.remove(&window).is_none() {
            return false;
        }
        tracing::debug!(window = ?window, "host closed window");
        self.z_order.retain(|w| *w != window);
        self.sort_keys.remove(&window);
        if self.foreground == Some(window) {
            self.foreground = self.frontmost_on_desktop(self.current_desktop);
        }
        true
    }

    pub fn bring_to_front(&mut self, window: W) {
        if !self.windows.contains_key(&window) {
            return;
        }
        if let Some(pos) = self.z_order.iter().position(|w| *w == window) {
            let item = self.z_order.remove(pos);
            self.z_order.push(item);
        } else {
            self.z_order.push(window);
        }
    }

    pub fn move_to_desktop(&mut self, window: W, desktop: usize) {
        let Some(entry) = self.windows.get_mut(&window) else {
            return;
        };
        entry.desktop = desktop;
        if desktop != self.current_desktop && self.foreground == Some(window) {
            self.foreground = self.frontmost_on_desktop(self.current_desktop);
        }
    }

    pub fn switch_desktop(&mut self, desktop: usize) {
        self.current_desktop = desktop;
        self.foreground = self.frontmost_on_desktop(desktop);
    }

    pub fn current_desktop(&self) -> usize {
        self.current_desktop
    }

    pub fn desktop_of(&self, window: W) -> Option<usize> {
        self.windows.get(&window).map(|w| w.desktop)
    }

    pub fn foreground(&self) -> Option<W> {
        self.foreground
    }

    pub fn round_corners_disabled(&self, window: W) -> bool {
        self.windows
            .get(&window)
            .is_some_and(|w| !w.round_corners)
    }

    pub fn live_windows(&self) -> impl Iterator<Item = W> + '_ {
        self.windows.keys().copied()
    }

    /// Windows ordered from the frontmost to the bottom of the stack.
    pub fn top_to_bottom(&self) -> impl Iterator<Item = W> + '_ {
        self.z_order.iter().rev().copied()
    }

    fn frontmost_on_desktop(&self, desktop: usize) -> Option<W> {
        self.top_to_bottom()
            .find(|w| self.windows.get(w).is_some_and(|e| e.desktop == desktop))
    }
}

impl<W: Copy + Eq + Ord + Debug> PropertyStore<W> for MemoryHost<W> {
    fn tab_sort_key(&self, window: W) -> Option<TabSortKey> {
        self.sort_keys.get(&window).copied()
    }

    /// Keys for windows that are not open are dropped, like properties set
    /// on a stale handle.
    fn set_tab_sort_key(&mut self, window: W, key: Option<TabSortKey>) {
        match key {
            Some(key) if self.windows.contains_key(&window) => {
                self.sort_keys.insert(window, key);
            }
            Some(_) => {
                tracing::debug!(window = ?window, "dropping sort key for a window that is not open");
            }
            None => {
                self.sort_keys.remove(&window);
            }
        }
    }
}

impl<W: Copy + Eq + Ord + Debug> WindowSystem<W> for MemoryHost<W> {
    fn is_window_live(&self, window: W) -> bool {
        self.windows.contains_key(&window)
    }

    fn is_on_current_desktop(&self, window: W) -> bool {
        self.desktop_of(window) == Some(self.current_desktop)
    }

    fn activate(&mut self, window: W) {
        if !self.is_window_live(window) {
            tracing::warn!(window = ?window, "cannot activate a closed window");
            return;
        }
        self.bring_to_front(window);
        self.foreground = Some(window);
    }

    fn disable_round_corners(&mut self, window: W) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.round_corners = false;
        }
    }

    fn topmost_of(&self, candidates: &[W]) -> Option<(W, usize)> {
        lowest_z_order_window(self.top_to_bottom(), candidates)
    }
}
