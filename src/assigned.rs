//! Bookkeeping for windows snapped into zones.
//!
//! [`AssignedWindows`] owns two indexes that must always agree:
//!
//! - window -> the zone-set it occupies
//! - zone-set -> the windows sharing exactly that zone-set, in tab order
//!
//! A zone-set is an ordered list of zone indices. Order matters: `[0, 1]` and
//! `[1, 0]` cover the same zones but are distinct groups with their own tab
//! order.
//!
//! Both maps are private and only [`AssignedWindows::assign`] and
//! [`AssignedWindows::dismiss`] mutate them, so callers cannot update one
//! without the other.

use std::collections::BTreeMap;
use std::fmt::Debug;

use thiserror::Error;

use crate::host::{PropertyStore, TabSortKey, WindowSystem};
use crate::settings::ZoneSettings;

pub type ZoneIndex = usize;
pub type ZoneIndexSet = Vec<ZoneIndex>;

/// A breach of the consistency rules between the two indexes.
///
/// These never come out of regular operations; they indicate corruption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError<W: Debug> {
    #[error("window {window:?} is indexed under {zones:?} but that group does not list it")]
    MissingFromGroup { window: W, zones: ZoneIndexSet },
    #[error("window {window:?} is listed {count} times in group {zones:?}")]
    DuplicateInGroup {
        window: W,
        zones: ZoneIndexSet,
        count: usize,
    },
    #[error("group {zones:?} lists window {window:?} which is not indexed under it")]
    UnindexedMember { window: W, zones: ZoneIndexSet },
    #[error("group {zones:?} is registered with no windows")]
    EmptyGroup { zones: ZoneIndexSet },
}

/// How a [`AssignedWindows::cycle_windows`] request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome<W> {
    /// The anchor window is not snapped anywhere.
    Untracked,
    /// The group ran out of windows, possibly after pruning closed ones.
    Exhausted,
    /// The next tab was focused.
    Activated(W),
    /// The next tab lives on another virtual desktop and was left alone.
    OtherDesktop(W),
}

#[derive(Debug, Clone)]
pub struct AssignedWindows<W: Copy + Eq + Ord> {
    settings: ZoneSettings,
    window_zones: BTreeMap<W, ZoneIndexSet>,
    zone_windows: BTreeMap<ZoneIndexSet, Vec<W>>,
}

impl<W: Copy + Eq + Ord + Debug> Default for AssignedWindows<W> {
    fn default() -> Self {
        Self::new(ZoneSettings::default())
    }
}

impl<W: Copy + Eq + Ord + Debug> AssignedWindows<W> {
    pub fn new(settings: ZoneSettings) -> Self {
        Self {
            settings,
            window_zones: BTreeMap::new(),
            zone_windows: BTreeMap::new(),
        }
    }

    pub fn settings(&self) -> ZoneSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: ZoneSettings) {
        self.settings = settings;
    }

    /// Snap `window` into `zones`, replacing any previous assignment.
    ///
    /// The window joins the group keyed by `zones` at the position its
    /// persisted tab sort key dictates, or at the end when it has none.
    /// An empty `zones` leaves the window unassigned.
    pub fn assign<H>(&mut self, host: &mut H, window: W, zones: &[ZoneIndex])
    where
        H: PropertyStore<W> + WindowSystem<W>,
    {
        self.dismiss(host, window);

        if zones.is_empty() {
            tracing::debug!(window = ?window, "assigned to no zones; left unsnapped");
            return;
        }

        let zones: ZoneIndexSet = zones.to_vec();
        self.window_zones.insert(window, zones.clone());

        if self.settings.disable_round_corners() {
            host.disable_round_corners(window);
        }

        let sort_key = host.tab_sort_key(window);
        tracing::debug!(window = ?window, zones = ?zones, sort_key = ?sort_key, "assigned window");
        self.insert_window_into_group(host, window, sort_key, zones);
    }

    /// Forget `window`'s assignment, if any, and clear its persisted tab sort
    /// key either way.
    pub fn dismiss<H>(&mut self, host: &mut H, window: W)
    where
        H: PropertyStore<W>,
    {
        if let Some(zones) = self.window_zones.remove(&window) {
            self.remove_from_group(window, &zones);
            tracing::debug!(window = ?window, zones = ?zones, "dismissed window");
        }

        host.set_tab_sort_key(window, None);
    }

    /// Copy of the window -> zone-set index.
    pub fn snapped_windows(&self) -> BTreeMap<W, ZoneIndexSet> {
        self.window_zones.clone()
    }

    /// The zone-set `window` occupies, or an empty set if it is not snapped.
    pub fn zone_index_set_from_window(&self, window: W) -> ZoneIndexSet {
        self.window_zones.get(&window).cloned().unwrap_or_default()
    }

    pub fn is_zone_empty(&self, zone: ZoneIndex) -> bool {
        !self
            .window_zones
            .values()
            .any(|zones| zones.contains(&zone))
    }

    /// Windows sharing exactly `zones`, in tab order.
    pub fn zone_set_windows(&self, zones: &[ZoneIndex]) -> &[W] {
        self.zone_windows
            .get(zones)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Registered zone-sets in key order.
    pub fn zone_sets(&self) -> impl Iterator<Item = &ZoneIndexSet> + '_ {
        self.zone_windows.keys()
    }

    pub fn len(&self) -> usize {
        self.window_zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window_zones.is_empty()
    }

    /// Focus the tab after (or before, with `reverse`) `window` within its
    /// zone group, wrapping at either end.
    ///
    /// Tabs whose window has been closed are dismissed as they are met and the
    /// search continues. A live tab on another virtual desktop ends the search
    /// without changing focus.
    pub fn cycle_windows<H>(&mut self, host: &mut H, window: W, reverse: bool) -> CycleOutcome<W>
    where
        H: PropertyStore<W> + WindowSystem<W>,
    {
        let Some(zones) = self.window_zones.get(&window).cloned() else {
            return CycleOutcome::Untracked;
        };

        // Every pass that does not return prunes one tab, so the group is gone
        // after at most `len` passes and the next lookup comes back empty.
        let attempts = self.zone_set_windows(&zones).len() + 1;
        for _ in 0..attempts {
            let Some(next) = self.next_zone_window(&zones, window, reverse) else {
                return CycleOutcome::Exhausted;
            };

            if !host.is_window_live(next) {
                tracing::debug!(window = ?next, zones = ?zones, "pruning closed window");
                self.dismiss(host, next);
                continue;
            }

            if !host.is_on_current_desktop(next) {
                tracing::debug!(window = ?next, "next tab is on another desktop");
                return CycleOutcome::OtherDesktop(next);
            }

            tracing::debug!(from = ?window, to = ?next, reverse, "cycling tab");
            host.activate(next);
            return CycleOutcome::Activated(next);
        }

        CycleOutcome::Exhausted
    }

    /// Find the frontmost window among the groups, other than
    /// `current_window_zones`, whose zone-set includes `target_zone`.
    ///
    /// Groups are visited in zone-set order and a later group must be strictly
    /// nearer the front to win, so ties go to the lexicographically smaller
    /// zone-set. A group with no member in the z-order contributes nothing.
    pub fn topmost_window_from_target_zone<H>(
        &self,
        host: &H,
        target_zone: ZoneIndex,
        current_window_zones: &[ZoneIndex],
    ) -> Option<W>
    where
        H: WindowSystem<W>,
    {
        let mut topmost: Option<(W, usize)> = None;
        for (zones, windows) in &self.zone_windows {
            if zones.as_slice() == current_window_zones || !zones.contains(&target_zone) {
                continue;
            }
            if windows.is_empty() {
                index_defect(format_args!("group {zones:?} is registered but empty"));
                return None;
            }
            let Some((window, depth)) = host.topmost_of(windows) else {
                continue;
            };
            if topmost.is_none_or(|(_, best)| depth < best) {
                topmost = Some((window, depth));
            }
        }

        tracing::debug!(target_zone, result = ?topmost, "resolved topmost window");
        topmost.map(|(window, _)| window)
    }

    /// Check that both indexes agree with each other.
    pub fn validate(&self) -> Result<(), IndexError<W>> {
        for (window, zones) in &self.window_zones {
            let count = self
                .zone_set_windows(zones)
                .iter()
                .filter(|w| *w == window)
                .count();
            match count {
                0 => {
                    return Err(IndexError::MissingFromGroup {
                        window: *window,
                        zones: zones.clone(),
                    });
                }
                1 => {}
                count => {
                    return Err(IndexError::DuplicateInGroup {
                        window: *window,
                        zones: zones.clone(),
                        count,
                    });
                }
            }
        }

        for (zones, windows) in &self.zone_windows {
            if windows.is_empty() {
                return Err(IndexError::EmptyGroup {
                    zones: zones.clone(),
                });
            }
            for window in windows {
                if self.window_zones.get(window) != Some(zones) {
                    return Err(IndexError::UnindexedMember {
                        window: *window,
                        zones: zones.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn insert_window_into_group<H>(
        &mut self,
        host: &mut H,
        window: W,
        sort_key: Option<TabSortKey>,
        zones: ZoneIndexSet,
    ) where
        H: PropertyStore<W>,
    {
        let windows = self.zone_windows.entry(zones).or_default();
        let sort_key = match sort_key {
            Some(key) => {
                // Unkeyed tabs never push the new one further back.
                let pos = windows
                    .iter()
                    .position(|tab| host.tab_sort_key(*tab).is_some_and(|k| k > key))
                    .unwrap_or(windows.len());
                windows.insert(pos, window);
                key
            }
            None => {
                let key = windows
                    .last()
                    .and_then(|tab| host.tab_sort_key(*tab))
                    .map_or(0, |k| k.saturating_add(1));
                windows.push(window);
                key
            }
        };

        host.set_tab_sort_key(window, Some(sort_key));
    }

    fn remove_from_group(&mut self, window: W, zones: &ZoneIndexSet) {
        let Some(windows) = self.zone_windows.get_mut(zones) else {
            index_defect(format_args!(
                "window {window:?} is indexed under unregistered group {zones:?}"
            ));
            return;
        };

        match windows.iter().position(|w| *w == window) {
            Some(pos) => {
                windows.remove(pos);
            }
            None => index_defect(format_args!(
                "window {window:?} is indexed under {zones:?} but missing from it"
            )),
        }

        if windows.is_empty() {
            self.zone_windows.remove(zones);
        }
    }

    fn next_zone_window(&self, zones: &[ZoneIndex], current: W, reverse: bool) -> Option<W> {
        let windows = self.zone_set_windows(zones);
        if windows.is_empty() {
            return None;
        }

        let len = windows.len() as isize;
        let next = match windows.iter().position(|w| *w == current) {
            Some(idx) => {
                let step = if reverse { -1isize } else { 1isize };
                (idx as isize + step).rem_euclid(len)
            }
            None if reverse => len - 1,
            None => 0,
        };
        Some(windows[next as usize])
    }
}

fn index_defect(message: std::fmt::Arguments<'_>) {
    tracing::error!("assignment index corrupted: {message}");
    if cfg!(debug_assertions) {
        panic!("assignment index corrupted: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn open(host: &mut MemoryHost<u32>, windows: &[u32]) {
        for w in windows {
            host.open_window(*w);
        }
    }

    #[test]
    fn assign_appends_and_numbers_sort_keys() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2, 3]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0, 1]);
        aw.assign(&mut host, 2, &[0, 1]);
        aw.assign(&mut host, 3, &[0, 1]);

        assert_eq!(aw.zone_set_windows(&[0, 1]), &[1, 2, 3]);
        assert_eq!(host.tab_sort_key(1), Some(0));
        assert_eq!(host.tab_sort_key(2), Some(1));
        assert_eq!(host.tab_sort_key(3), Some(2));
        assert!(aw.validate().is_ok());
    }

    #[test]
    fn zone_set_order_is_part_of_the_key() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0, 1]);
        aw.assign(&mut host, 2, &[1, 0]);

        assert_eq!(aw.zone_set_windows(&[0, 1]), &[1]);
        assert_eq!(aw.zone_set_windows(&[1, 0]), &[2]);
        assert_eq!(aw.zone_sets().count(), 2);
    }

    #[test]
    fn duplicate_zone_indices_are_kept_positionally() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[2, 2]);
        assert_eq!(aw.zone_index_set_from_window(1), vec![2, 2]);
        assert_eq!(aw.zone_set_windows(&[2, 2]), &[1]);
        assert!(aw.zone_set_windows(&[2]).is_empty());
    }

    /// Property store that ignores clears, so a window comes back to a group
    /// with the key it was persisted under.
    struct StickyKeys(MemoryHost<u32>);

    impl PropertyStore<u32> for StickyKeys {
        fn tab_sort_key(&self, window: u32) -> Option<TabSortKey> {
            self.0.tab_sort_key(window)
        }

        fn set_tab_sort_key(&mut self, window: u32, key: Option<TabSortKey>) {
            if key.is_some() {
                self.0.set_tab_sort_key(window, key);
            }
        }
    }

    impl WindowSystem<u32> for StickyKeys {
        fn is_window_live(&self, window: u32) -> bool {
            self.0.is_window_live(window)
        }

        fn is_on_current_desktop(&self, window: u32) -> bool {
            self.0.is_on_current_desktop(window)
        }

        fn activate(&mut self, window: u32) {
            self.0.activate(window);
        }

        fn disable_round_corners(&mut self, window: u32) {
            self.0.disable_round_corners(window);
        }

        fn topmost_of(&self, candidates: &[u32]) -> Option<(u32, usize)> {
            self.0.topmost_of(candidates)
        }
    }

    fn sticky(windows: &[u32]) -> StickyKeys {
        let mut inner = MemoryHost::new();
        open(&mut inner, windows);
        StickyKeys(inner)
    }

    #[test]
    fn keyed_insert_goes_before_first_greater_key() {
        let mut host = sticky(&[1, 2, 3, 4]);
        let mut aw = AssignedWindows::default();
        for w in [1, 2, 3] {
            aw.assign(&mut host, w, &[0]);
        }
        // keys are now 1 -> 0, 2 -> 1, 3 -> 2
        host.0.set_tab_sort_key(4, Some(1));
        aw.assign(&mut host, 4, &[0]);

        assert_eq!(aw.zone_set_windows(&[0]), &[1, 2, 4, 3]);
        assert_eq!(host.tab_sort_key(4), Some(1));
        assert!(aw.validate().is_ok());
    }

    #[test]
    fn keyed_reassign_restores_the_old_position() {
        let mut host = sticky(&[1, 2, 3]);
        let mut aw = AssignedWindows::default();
        for w in [1, 2, 3] {
            aw.assign(&mut host, w, &[0]);
        }
        aw.assign(&mut host, 1, &[1]);
        assert_eq!(aw.zone_set_windows(&[1]), &[1]);

        aw.assign(&mut host, 1, &[0]);
        assert_eq!(aw.zone_set_windows(&[0]), &[1, 2, 3]);
        assert!(aw.validate().is_ok());
    }

    #[test]
    fn keyed_insert_skips_unkeyed_tabs_and_appends_when_nothing_is_greater() {
        let mut host = sticky(&[1, 2, 3]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);
        aw.assign(&mut host, 2, &[0]);
        host.0.set_tab_sort_key(1, None);
        host.0.set_tab_sort_key(2, None);
        host.0.set_tab_sort_key(3, Some(0));

        aw.assign(&mut host, 3, &[0]);
        assert_eq!(aw.zone_set_windows(&[0]), &[1, 2, 3]);
        assert_eq!(host.tab_sort_key(3), Some(0));
    }

    #[test]
    fn append_after_unkeyed_tail_restarts_at_zero() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);
        host.set_tab_sort_key(1, None);
        aw.assign(&mut host, 2, &[0]);
        assert_eq!(host.tab_sort_key(2), Some(0));
    }

    #[test]
    fn reassign_moves_window_between_groups() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);
        aw.assign(&mut host, 2, &[0]);
        aw.assign(&mut host, 1, &[1]);

        assert_eq!(aw.zone_set_windows(&[0]), &[2]);
        assert_eq!(aw.zone_set_windows(&[1]), &[1]);
        assert_eq!(aw.zone_index_set_from_window(1), vec![1]);
        assert!(aw.validate().is_ok());
    }

    #[test]
    fn assign_with_no_zones_leaves_window_unsnapped() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[3]);
        aw.assign(&mut host, 1, &[]);
        assert!(aw.is_empty());
        assert_eq!(aw.zone_sets().count(), 0);
        assert!(aw.validate().is_ok());
    }

    #[test]
    fn round_corners_follow_settings() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);
        assert!(!host.round_corners_disabled(1));

        aw.set_settings(ZoneSettings::new().with_disable_round_corners(true));
        aw.assign(&mut host, 2, &[0]);
        assert!(host.round_corners_disabled(2));
    }

    #[test]
    fn next_zone_window_wraps_both_ways() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2, 3]);
        let mut aw = AssignedWindows::default();
        for w in [1, 2, 3] {
            aw.assign(&mut host, w, &[0]);
        }
        assert_eq!(aw.next_zone_window(&[0], 3, false), Some(1));
        assert_eq!(aw.next_zone_window(&[0], 1, true), Some(3));
        assert_eq!(aw.next_zone_window(&[0], 2, false), Some(3));
        assert_eq!(aw.next_zone_window(&[0], 2, true), Some(1));
        // an anchor that is no longer listed starts from the matching end
        assert_eq!(aw.next_zone_window(&[0], 9, false), Some(1));
        assert_eq!(aw.next_zone_window(&[0], 9, true), Some(3));
        assert_eq!(aw.next_zone_window(&[5], 1, false), None);
    }

    #[test]
    fn validate_reports_each_kind_of_corruption() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);

        let mut missing = aw.clone();
        missing.window_zones.insert(2, vec![0]);
        assert_eq!(
            missing.validate(),
            Err(IndexError::MissingFromGroup {
                window: 2,
                zones: vec![0]
            })
        );

        let mut duplicated = aw.clone();
        duplicated.zone_windows.get_mut(&vec![0]).unwrap().push(1);
        assert!(matches!(
            duplicated.validate(),
            Err(IndexError::DuplicateInGroup { count: 2, .. })
        ));

        let mut stray = aw.clone();
        stray.zone_windows.insert(vec![4], vec![2]);
        assert!(matches!(
            stray.validate(),
            Err(IndexError::UnindexedMember { window: 2, .. })
        ));

        let mut empty = aw.clone();
        empty.zone_windows.insert(vec![7], Vec::new());
        assert_eq!(
            empty.validate(),
            Err(IndexError::EmptyGroup { zones: vec![7] })
        );
    }

    #[test]
    #[should_panic(expected = "assignment index corrupted")]
    fn dismissing_a_member_missing_from_its_group_panics() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1, 2]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);
        aw.assign(&mut host, 2, &[0]);
        aw.zone_windows.get_mut(&vec![0]).unwrap().retain(|w| *w != 1);

        aw.dismiss(&mut host, 1);
    }

    #[test]
    #[should_panic(expected = "unregistered group")]
    fn dismissing_a_window_whose_group_is_gone_panics() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);
        aw.zone_windows.remove(&vec![0]);

        aw.dismiss(&mut host, 1);
    }

    #[test]
    #[should_panic(expected = "registered but empty")]
    fn topmost_over_an_empty_group_panics() {
        let mut host = MemoryHost::new();
        open(&mut host, &[1]);
        let mut aw = AssignedWindows::default();
        aw.assign(&mut host, 1, &[0]);
        aw.zone_windows.insert(vec![1, 2], Vec::new());

        aw.topmost_window_from_target_zone(&host, 2, &[0]);
    }

    #[test]
    fn index_error_messages_name_the_window_and_group() {
        let err: IndexError<u32> = IndexError::UnindexedMember {
            window: 8,
            zones: vec![1, 2],
        };
        assert_eq!(
            err.to_string(),
            "group [1, 2] lists window 8 which is not indexed under it"
        );
    }
}
