use zone_tabs::assigned::{AssignedWindows, CycleOutcome};
use zone_tabs::host::{MemoryHost, WindowSystem};
use zone_tabs::settings::ZoneSettings;

/// Opens `windows` on the host and snaps them all into zone 0, in order.
fn tabbed(windows: &[u32]) -> (AssignedWindows<u32>, MemoryHost<u32>) {
    let mut host = MemoryHost::new();
    let mut aw = AssignedWindows::new(ZoneSettings::default());
    for w in windows {
        host.open_window(*w);
        aw.assign(&mut host, *w, &[0]);
    }
    (aw, host)
}

#[test]
fn forward_from_last_wraps_to_first() {
    let (mut aw, mut host) = tabbed(&[1, 2, 3]);
    assert_eq!(
        aw.cycle_windows(&mut host, 3, false),
        CycleOutcome::Activated(1)
    );
    assert_eq!(host.foreground(), Some(1));
}

#[test]
fn backward_from_first_wraps_to_last() {
    let (mut aw, mut host) = tabbed(&[1, 2, 3]);
    assert_eq!(
        aw.cycle_windows(&mut host, 1, true),
        CycleOutcome::Activated(3)
    );
    assert_eq!(host.foreground(), Some(3));
}

#[test]
fn stepping_through_the_middle() {
    let (mut aw, mut host) = tabbed(&[1, 2, 3]);
    assert_eq!(
        aw.cycle_windows(&mut host, 1, false),
        CycleOutcome::Activated(2)
    );
    assert_eq!(
        aw.cycle_windows(&mut host, 2, false),
        CycleOutcome::Activated(3)
    );
    assert_eq!(
        aw.cycle_windows(&mut host, 3, true),
        CycleOutcome::Activated(2)
    );
}

#[test]
fn closed_successor_is_pruned_and_skipped() {
    let (mut aw, mut host) = tabbed(&[1, 2, 3]);
    host.close_window(2);

    assert_eq!(
        aw.cycle_windows(&mut host, 1, false),
        CycleOutcome::Activated(3)
    );
    assert_eq!(aw.zone_set_windows(&[0]), &[1, 3]);
    assert!(aw.zone_index_set_from_window(2).is_empty());
    assert!(aw.validate().is_ok());
}

#[test]
fn all_other_tabs_closed_lands_back_on_anchor() {
    let (mut aw, mut host) = tabbed(&[1, 2, 3]);
    host.close_window(2);
    host.close_window(3);
    host.activate(1);

    assert_eq!(
        aw.cycle_windows(&mut host, 1, false),
        CycleOutcome::Activated(1)
    );
    assert_eq!(aw.zone_set_windows(&[0]), &[1]);
}

#[test]
fn every_tab_closed_terminates_with_group_removed() {
    let (mut aw, mut host) = tabbed(&[1, 2, 3]);
    for w in [1, 2, 3] {
        host.close_window(w);
    }

    assert_eq!(
        aw.cycle_windows(&mut host, 1, true),
        CycleOutcome::Exhausted
    );
    assert!(aw.is_empty());
    assert_eq!(aw.zone_sets().count(), 0);
}

#[test]
fn tab_on_other_desktop_is_found_but_not_focused() {
    let (mut aw, mut host) = tabbed(&[1, 2]);
    host.move_to_desktop(2, 1);
    host.activate(1);

    assert_eq!(
        aw.cycle_windows(&mut host, 1, false),
        CycleOutcome::OtherDesktop(2)
    );
    assert_eq!(host.foreground(), Some(1));
    assert!(!host.is_on_current_desktop(2));
}

#[test]
fn untracked_anchor_does_nothing() {
    let (mut aw, mut host) = tabbed(&[1, 2]);
    host.activate(2);
    assert_eq!(
        aw.cycle_windows(&mut host, 7, false),
        CycleOutcome::Untracked
    );
    assert_eq!(host.foreground(), Some(2));
    assert_eq!(aw.len(), 2);
}

#[test]
fn cycling_stays_inside_the_anchor_group() {
    let mut host = MemoryHost::new();
    let mut aw = AssignedWindows::new(ZoneSettings::default());
    for w in [1, 2, 3] {
        host.open_window(w);
    }
    aw.assign(&mut host, 1, &[0]);
    aw.assign(&mut host, 2, &[0, 1]);
    aw.assign(&mut host, 3, &[0]);

    assert_eq!(
        aw.cycle_windows(&mut host, 3, false),
        CycleOutcome::Activated(1)
    );
    assert_eq!(
        aw.cycle_windows(&mut host, 2, false),
        CycleOutcome::Activated(2)
    );
}
