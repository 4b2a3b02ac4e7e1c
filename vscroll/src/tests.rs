use crate::*;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_i64(&mut self, start: i64, end_exclusive: i64) -> i64 {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as i64
    }
}

struct HostState {
    position: f64,
    size: f64,
    item_size: f64,
    overrides: HashMap<i64, f64>,
    backward_padding: f64,
    forward_padding: f64,
}

#[derive(Clone)]
struct TestViewport {
    host: Rc<RefCell<HostState>>,
}

impl Viewport for TestViewport {
    fn scroll_position(&self) -> f64 {
        self.host.borrow().position
    }

    fn set_scroll_position(&mut self, value: f64) {
        self.host.borrow_mut().position = value;
    }

    fn size(&self) -> f64 {
        self.host.borrow().size
    }

    fn item_size(&self, index: i64) -> Option<f64> {
        let host = self.host.borrow();
        Some(host.overrides.get(&index).copied().unwrap_or(host.item_size))
    }

    fn set_padding_size(&mut self, direction: Direction, size: f64) {
        let mut host = self.host.borrow_mut();
        match direction {
            Direction::Backward => host.backward_padding = size,
            Direction::Forward => host.forward_padding = size,
        }
    }
}

fn host(size: f64, item_size: f64) -> Rc<RefCell<HostState>> {
    Rc::new(RefCell::new(HostState {
        position: 0.0,
        size,
        item_size,
        overrides: HashMap::new(),
        backward_padding: 0.0,
        forward_padding: 0.0,
    }))
}

fn viewport(host: &Rc<RefCell<HostState>>) -> TestViewport {
    TestViewport {
        host: Rc::clone(host),
    }
}

type CallLog = Rc<RefCell<Vec<(i64, usize)>>>;

/// Synchronous datasource over the integers `min..=max`, `data == index`. Short reads
/// at either end follow the implicit BOF/EOF convention.
fn array_source(min: i64, max: i64, log: CallLog) -> impl FnMut(i64, usize, FetchHandle<i64>) {
    move |start, count, handle| {
        log.borrow_mut().push((start, count));
        let first = start.max(min);
        let last = (start + count as i64 - 1).min(max);
        if first > last {
            handle.success(Vec::new());
        } else {
            handle.success((first..=last).collect());
        }
    }
}

/// Datasource that parks every request for manual resolution.
type ParkedCalls = Rc<RefCell<Vec<(i64, usize, FetchHandle<i64>)>>>;

fn deferred_source(parked: ParkedCalls) -> impl FnMut(i64, usize, FetchHandle<i64>) {
    move |start, count, handle| {
        parked.borrow_mut().push((start, count, handle));
    }
}

fn assert_contiguous(items: &[Item<i64>]) {
    for pair in items.windows(2) {
        assert_eq!(
            pair[1].index,
            pair[0].index + 1,
            "resident indexes must be a gapless ascending run"
        );
    }
}

/// A session whose viewport window (with its margin) covers the whole bounded dataset
/// `[1..=20]`, so the initial cycle settles with everything resident.
fn full_window() -> (Workflow<i64>, Rc<RefCell<HostState>>, CallLog) {
    let settings = Settings::default()
        .with_bounds(Some(1), Some(20))
        .with_buffer_size(20)
        .with_padding(2.0)
        .with_scroll_debounce_ms(0);
    let host = host(100.0, 10.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(settings, array_source(1, 20, Rc::clone(&log)), viewport(&host))
        .expect("settings are valid");
    (workflow, host, log)
}

/// A session that only keeps a partial window resident: dataset `[1..=20]`, viewport
/// 100px, items 10px, regular padding. Settles at `[1..=15]`.
fn partial_window() -> (Workflow<i64>, Rc<RefCell<HostState>>, CallLog) {
    let settings = Settings::default()
        .with_bounds(Some(1), Some(20))
        .with_scroll_debounce_ms(0);
    let host = host(100.0, 10.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(settings, array_source(1, 20, Rc::clone(&log)), viewport(&host))
        .expect("settings are valid");
    (workflow, host, log)
}

#[test]
fn settings_validation_fails_fast() {
    let bad = Settings::default().with_buffer_size(0);
    assert_eq!(bad.validate(), Err(SettingsError::BufferSize(0)));

    let bad = Settings::default().with_padding(-1.0);
    assert!(matches!(bad.validate(), Err(SettingsError::Padding(_))));

    let bad = Settings::default().with_bounds(Some(10), Some(5));
    assert_eq!(
        bad.validate(),
        Err(SettingsError::Bounds { min: 10, max: 5 })
    );

    let host = host(100.0, 10.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let result = Workflow::new(
        Settings::default().with_buffer_size(0),
        array_source(1, 10, log),
        viewport(&host),
    );
    assert!(result.is_err());
}

#[test]
fn initial_fetch_requests_buffer_size_items_forward() {
    // empty buffer, no size information: the planner must fall back to a fixed window
    // of buffer_size items starting at the start index
    let settings = Settings::default()
        .with_start_index(1)
        .with_buffer_size(10)
        .with_bounds(Some(1), Some(100))
        .with_scroll_debounce_ms(0);
    let host = host(100.0, 20.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let workflow =
        Workflow::new(settings, array_source(1, 100, Rc::clone(&log)), viewport(&host))
            .expect("settings are valid");

    assert_eq!(log.borrow()[0], (1, 10));
    let first = workflow.items().first().map(|item| item.index);
    assert_eq!(first, Some(1));
    assert_eq!(workflow.errors().len(), 0);
}

#[test]
fn initial_cycle_settles_and_clears_flags() {
    let (workflow, _host, log) = full_window();
    assert_eq!(workflow.cycles_done(), 1);
    assert!(!workflow.is_loading());
    let info = workflow.buffer_info();
    assert_eq!(info.first_index, Some(1));
    assert_eq!(info.last_index, Some(20));
    assert!(info.bof);
    assert!(info.eof);
    assert_eq!(log.borrow().len(), 1);
    assert_contiguous(&workflow.items());
}

#[test]
fn fully_resident_window_means_no_fetch() {
    let (workflow, host, log) = full_window();
    let calls_before = log.borrow().len();

    // scroll so the viewport maps to the middle of the resident run
    host.borrow_mut().position = 40.0;
    workflow.on_scroll(0);

    assert_eq!(log.borrow().len(), calls_before, "no datasource call expected");
    assert_eq!(workflow.cycles_done(), 2);
    assert_eq!(workflow.items().len(), 20);
    assert_eq!(workflow.errors().len(), 0);
}

#[test]
fn removal_renumbers_tail_and_grows_forward_padding() {
    let (workflow, _host, _log) = full_window();
    workflow.remove(|item| item.index >= 5 && item.index <= 7);

    let items = workflow.items();
    assert_eq!(items.len(), 17);
    assert_contiguous(&items);
    assert_eq!(items.first().map(|i| i.index), Some(1));
    assert_eq!(items.last().map(|i| i.index), Some(17));
    // the item formerly at index 8 moved down to 5, payload intact
    let at_5 = items.iter().find(|item| item.index == 5).map(|i| i.data);
    assert_eq!(at_5, Some(8));

    let info = workflow.buffer_info();
    assert_eq!(info.abs_max_index, Some(17));
    // three 10px items became forward padding
    assert_eq!(workflow.viewport_info().forward_padding, 30.0);
}

#[test]
fn removing_item_renumbers_cache_in_lockstep() {
    let (workflow, host, _log) = full_window();
    // give index 8 a distinctive size so it is traceable through the shift
    host.borrow_mut().overrides.insert(8, 44.0);
    workflow.check();

    workflow.remove(|item| item.index == 5);

    // former index 8 now lives at 7, and its size record must have followed
    let items = workflow.items();
    let moved = items.iter().find(|item| item.data == 8).map(|i| i.index);
    assert_eq!(moved, Some(7));
    let size = items.iter().find(|item| item.data == 8).and_then(|i| i.size);
    assert_eq!(size, Some(44.0));
}

#[test]
fn cache_average_is_exact() {
    let mut cache = Cache::new(None);
    assert_eq!(cache.average_size(), None);

    for index in 0..5 {
        let mut item = Item::new(index, ());
        item.size = Some(7.5);
        cache.add(&item);
    }
    assert!(cache.recalculate_average_size());
    assert_eq!(cache.average_size(), Some(7.5));

    let sizes = [1.0, 2.0, 3.0, 4.0];
    let mut cache = Cache::new(None);
    for (index, size) in sizes.iter().enumerate() {
        let mut item = Item::new(index as i64, ());
        item.size = Some(*size);
        cache.add(&item);
    }
    cache.recalculate_average_size();
    assert_eq!(cache.average_size(), Some(2.5));
    // unchanged sizes do not report a change
    assert!(!cache.recalculate_average_size());
}

#[test]
fn cache_remove_and_shift_moves_records_down() {
    let mut cache = Cache::new(None);
    for index in 1..=5 {
        let mut item = Item::new(index, ());
        item.size = Some(index as f64);
        cache.add(&item);
    }
    cache.remove_and_shift(2);
    assert_eq!(cache.get(1), Some(1.0));
    // former 3..=5 now live at 2..=4
    assert_eq!(cache.get(2), Some(3.0));
    assert_eq!(cache.get(3), Some(4.0));
    assert_eq!(cache.get(4), Some(5.0));
    assert_eq!(cache.get(5), None);
    assert_eq!(cache.max_index(), Some(4));
}

#[test]
fn short_read_discovers_eof() {
    // dataset ends at 12 while the planner asks beyond it
    let settings = Settings::default()
        .with_bounds(Some(1), None)
        .with_scroll_debounce_ms(0);
    let host = host(100.0, 10.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(settings, array_source(1, 12, Rc::clone(&log)), viewport(&host))
        .expect("settings are valid");

    let info = workflow.buffer_info();
    assert_eq!(info.abs_max_index, Some(12));
    assert_eq!(info.last_index, Some(12));
    assert!(info.eof, "last resident index matches the discovered bound");
    assert_eq!(workflow.errors().len(), 0);
}

#[test]
fn fetch_error_is_recorded_and_cycle_ends_cleanly() {
    let settings = Settings::default().with_scroll_debounce_ms(0);
    let host = host(100.0, 10.0);
    let failing = |_start: i64, _count: usize, handle: FetchHandle<i64>| {
        handle.error("backend unavailable");
    };
    let workflow = Workflow::new(settings, failing, viewport(&host)).expect("settings are valid");

    let errors = workflow.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].process, Process::Fetch);
    assert_eq!(errors[0].message, "backend unavailable");
    assert!(!workflow.is_loading(), "loading flag must clear after an error");
    assert!(workflow.items().is_empty());
}

#[test]
fn invalid_fix_arguments_use_the_error_path() {
    let (workflow, _host, _log) = full_window();
    let position_before = workflow.viewport_info().scroll_position;

    workflow.fix(FixOptions {
        scroll_position: Some(f64::NAN),
        ..FixOptions::default()
    });
    let errors = workflow.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].process, Process::Fix);
    assert_eq!(workflow.viewport_info().scroll_position, position_before);

    workflow.fix(FixOptions {
        min_index: Some(10),
        max_index: Some(5),
        ..FixOptions::default()
    });
    assert_eq!(workflow.errors().len(), 2);
    assert!(!workflow.is_loading());
}

#[test]
fn fix_applies_bounds_updater_and_position() {
    let (workflow, _host, _log) = full_window();
    workflow.fix(FixOptions {
        scroll_position: Some(25.0),
        min_index: None,
        max_index: Some(40),
        updater: Some(Box::new(|item| item.data += 1000)),
    });
    assert_eq!(workflow.buffer_info().abs_max_index, Some(40));
    assert_eq!(workflow.viewport_info().scroll_position, 25.0);
    assert!(workflow.items().iter().all(|item| item.data > 1000));
    assert_eq!(workflow.errors().len(), 0);
}

#[test]
fn empty_append_is_a_validation_error() {
    let (workflow, _host, _log) = full_window();
    workflow.append(Vec::new(), false);
    let errors = workflow.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].process, Process::Append);
}

#[test]
fn append_at_eof_materializes() {
    let (workflow, _host, _log) = full_window();
    assert!(workflow.buffer_info().eof);

    workflow.append(vec![21], false);
    let items = workflow.items();
    assert_eq!(items.last().map(|i| (i.index, i.data)), Some((21, 21)));
    assert_contiguous(&items);
    assert_eq!(workflow.buffer_info().abs_max_index, Some(21));
    assert!(items.last().map(|i| !i.invisible).unwrap_or(false));
}

#[test]
fn prepend_at_bof_materializes_and_keeps_view_anchored() {
    let (workflow, host, _log) = full_window();
    let position_before = host.borrow().position;

    workflow.prepend(vec![0], false);
    let items = workflow.items();
    assert_eq!(items.first().map(|i| (i.index, i.data)), Some((0, 0)));
    assert_contiguous(&items);
    assert_eq!(workflow.buffer_info().abs_min_index, Some(0));
    // 10px of content appeared above the viewport; the position follows it
    assert_eq!(host.borrow().position, position_before + 10.0);
}

#[test]
fn append_away_from_eof_is_virtual() {
    let (workflow, _host, _log) = partial_window();
    let resident_before = workflow.items().len();
    assert!(!workflow.buffer_info().eof);
    let forward_before = workflow.viewport_info().forward_padding;

    workflow.append(vec![101, 102], false);
    assert_eq!(workflow.items().len(), resident_before, "nothing materializes");
    assert_eq!(workflow.buffer_info().abs_max_index, Some(22));
    // two average-sized (10px) items worth of virtual space
    assert_eq!(workflow.viewport_info().forward_padding, forward_before + 20.0);
}

#[test]
fn user_clip_trims_forward_only() {
    let (workflow, _host, _log) = partial_window();
    assert_eq!(workflow.items().len(), 15);
    let forward_before = workflow.viewport_info().forward_padding;

    workflow.clip(ClipOptions {
        forward_only: true,
        backward_only: false,
    });
    let items = workflow.items();
    // viewport is [0, 100]; items 12..=15 start past it and are evicted
    assert_eq!(items.first().map(|i| i.index), Some(1));
    assert_eq!(items.last().map(|i| i.index), Some(11));
    assert_contiguous(&items);
    assert_eq!(workflow.viewport_info().forward_padding, forward_before + 40.0);
}

#[test]
fn user_clip_trims_backward_only() {
    let (workflow, host, _log) = partial_window();
    // pull the tail of the dataset in first
    host.borrow_mut().position = 50.0;
    workflow.on_scroll(0);
    assert_eq!(workflow.items().len(), 20);

    workflow.clip(ClipOptions {
        forward_only: false,
        backward_only: true,
    });
    let items = workflow.items();
    // viewport is [50, 150]; items 1..=4 end before it and are evicted
    assert_eq!(items.first().map(|i| i.index), Some(5));
    assert_eq!(items.last().map(|i| i.index), Some(20));
    assert!(workflow.viewport_info().backward_padding >= 40.0);
}

#[test]
fn check_reconciles_changed_sizes() {
    let (workflow, host, _log) = full_window();
    host.borrow_mut().overrides.insert(10, 30.0);

    workflow.check();
    let items = workflow.items();
    let resized = items.iter().find(|item| item.index == 10).and_then(|i| i.size);
    assert_eq!(resized, Some(30.0));
    // 19 items at 10px plus one at 30px
    let expected_average = (19.0 * 10.0 + 30.0) / 20.0;
    assert_eq!(workflow.buffer_info().average_size, Some(expected_average));
    // check suppresses clipping for its loop: nothing was evicted
    assert_eq!(items.len(), 20);
    assert_eq!(workflow.errors().len(), 0);
}

#[test]
fn stale_fetch_after_reload_is_discarded() {
    let settings = Settings::default()
        .with_bounds(Some(1), Some(50))
        .with_scroll_debounce_ms(0);
    let host_state = host(100.0, 10.0);
    let parked: ParkedCalls = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(
        settings,
        deferred_source(Rc::clone(&parked)),
        viewport(&host_state),
    )
    .expect("settings are valid");

    assert!(workflow.is_loading());
    assert_eq!(parked.borrow().len(), 1);

    // interrupt the in-flight cycle; a second request is issued for the new one
    workflow.reload(Some(30));
    assert_eq!(parked.borrow().len(), 2);

    // the first continuation resolves late: it must be a no-op
    let (start, count, handle) = parked.borrow_mut().remove(0);
    handle.success((start..start + count as i64).collect());
    assert!(workflow.items().is_empty(), "stale result must not land");
    assert!(workflow.is_loading());

    // the second continuation (and whatever the follow-up loops request) drives the new
    // session to completion
    assert_eq!(parked.borrow().first().map(|call| call.0), Some(30));
    loop {
        let next = parked.borrow_mut().pop();
        let Some((start, count, handle)) = next else {
            break;
        };
        let last = (start + count as i64 - 1).min(50);
        let first = start.max(1);
        handle.success(if first > last {
            Vec::new()
        } else {
            (first..=last).collect()
        });
    }
    assert!(!workflow.is_loading());
    let items = workflow.items();
    assert_contiguous(&items);
    let (first, last) = (items.first(), items.last());
    assert!(first.is_some_and(|item| item.index <= 30));
    assert!(last.is_some_and(|item| item.index >= 30), "window centers on 30");
}

#[test]
fn scroll_mid_cycle_is_kept_within_the_same_cycle() {
    let settings = Settings::default()
        .with_bounds(Some(1), Some(50))
        .with_scroll_debounce_ms(0);
    let host_state = host(100.0, 10.0);
    let parked: ParkedCalls = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(
        settings,
        deferred_source(Rc::clone(&parked)),
        viewport(&host_state),
    )
    .expect("settings are valid");

    // a scroll event lands while the initial fetch is in flight
    host_state.borrow_mut().position = 30.0;
    workflow.on_scroll(0);
    assert_eq!(parked.borrow().len(), 1, "the pending cycle absorbs the scroll");

    // resolving the fetch lets the cycle loop into the scroll instead of terminating
    loop {
        let next = parked.borrow_mut().pop();
        let Some((start, count, handle)) = next else {
            break;
        };
        let last = (start + count as i64 - 1).min(50);
        handle.success((start.max(1)..=last).collect());
    }
    assert_eq!(workflow.cycles_done(), 1, "one cycle, several loops");
    assert!(!workflow.is_loading());
    assert_contiguous(&workflow.items());
}

#[test]
fn scroll_debounce_coalesces_events() {
    let settings = Settings::default()
        .with_bounds(Some(1), Some(20))
        .with_buffer_size(20)
        .with_padding(2.0)
        .with_scroll_debounce_ms(40);
    let host_state = host(100.0, 10.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(
        settings,
        array_source(1, 20, Rc::clone(&log)),
        viewport(&host_state),
    )
    .expect("settings are valid");
    let cycles_before = workflow.cycles_done();

    host_state.borrow_mut().position = 20.0;
    workflow.on_scroll(1000);
    host_state.borrow_mut().position = 40.0;
    workflow.on_scroll(1010);
    workflow.tick(1030);
    assert_eq!(workflow.cycles_done(), cycles_before, "still settling");

    workflow.tick(1060);
    assert_eq!(workflow.cycles_done(), cycles_before + 1, "one cycle for both events");
}

#[test]
fn loading_signal_notifies_on_change_only() {
    let settings = Settings::default()
        .with_bounds(Some(1), Some(50))
        .with_scroll_debounce_ms(0);
    let host_state = host(100.0, 10.0);
    let parked: ParkedCalls = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(
        settings,
        deferred_source(Rc::clone(&parked)),
        viewport(&host_state),
    )
    .expect("settings are valid");

    let observed: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&observed);
    workflow
        .is_loading_signal()
        .subscribe(move |value| sink.borrow_mut().push(*value));
    assert_eq!(*observed.borrow(), vec![true], "current value emitted on subscribe");

    loop {
        let next = parked.borrow_mut().pop();
        let Some((start, count, handle)) = next else {
            break;
        };
        let last = (start + count as i64 - 1).min(50);
        let first = start.max(1);
        handle.success(if first > last {
            Vec::new()
        } else {
            (first..=last).collect()
        });
    }
    assert_eq!(observed.borrow().last(), Some(&false));
    // loading flipped exactly once in each direction
    assert_eq!(*observed.borrow(), vec![true, false]);
}

#[test]
fn visible_edge_items_are_published() {
    let (workflow, _host, _log) = full_window();
    assert_eq!(workflow.first_visible_signal().get().index, Some(1));
    assert_eq!(workflow.last_visible_signal().get().index, Some(20));

    workflow.remove(|item| item.index <= 2);
    assert_eq!(workflow.first_visible_signal().get().index, Some(1));
    assert_eq!(workflow.last_visible_signal().get().index, Some(18));
}

#[test]
fn rendering_surface_sees_buffer_changes() {
    let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let (workflow, _host, _log) = full_window();
    let sink = Rc::clone(&seen);
    workflow.on_items(move |items| sink.borrow_mut().push(items.len()));
    assert_eq!(*seen.borrow(), vec![20], "current items on subscribe");

    workflow.remove(|item| item.index == 1);
    assert_eq!(seen.borrow().last(), Some(&19));
}

#[test]
fn dispose_silences_everything() {
    let (workflow, host, log) = full_window();
    workflow.dispose();
    let calls = log.borrow().len();

    host.borrow_mut().position = 60.0;
    workflow.on_scroll(0);
    workflow.reload(None);
    workflow.check();
    assert!(workflow.is_disposed());
    assert_eq!(log.borrow().len(), calls);
}

#[test]
fn buffer_set_items_requires_exact_adjacency() {
    let settings = Settings::default().with_bounds(Some(0), Some(100));
    let mut buffer: Buffer<i64> = Buffer::new(&settings, 0);

    let block = |range: std::ops::RangeInclusive<i64>| {
        range.map(|index| Item::new(index, index)).collect::<Vec<_>>()
    };

    assert!(buffer.set_items(block(10..=12)), "empty buffer accepts any block");
    assert!(buffer.set_items(block(7..=9)), "attaches at the front");
    assert!(buffer.set_items(block(13..=14)), "attaches at the back");
    assert!(!buffer.set_items(block(20..=22)), "gap ahead is rejected");
    assert!(!buffer.set_items(block(0..=3)), "gap behind is rejected");
    assert!(!buffer.set_items(block(8..=11)), "overlap is rejected");
    assert_eq!(buffer.first_index(), Some(7));
    assert_eq!(buffer.last_index(), Some(14));
}

#[test]
fn buffer_bof_eof_and_insertion_indexes() {
    let settings = Settings::default().with_bounds(Some(1), Some(9));
    let mut buffer: Buffer<i64> = Buffer::new(&settings, 5);

    // empty buffer: a finite bound alone counts as BOF/EOF
    assert!(buffer.bof());
    assert!(buffer.eof());
    // empty buffer falls back to the start index, or to the bound under assertion
    assert_eq!(buffer.get_index_to_append(false), 5);
    assert_eq!(buffer.get_index_to_append(true), 9);
    assert_eq!(buffer.get_index_to_prepend(false), 5);
    assert_eq!(buffer.get_index_to_prepend(true), 1);

    buffer.set_items((4..=6).map(|index| Item::new(index, index)).collect());
    assert!(!buffer.bof());
    assert!(!buffer.eof());
    assert_eq!(buffer.get_index_to_append(false), 7);
    assert_eq!(buffer.get_index_to_prepend(false), 3);
}

#[test]
fn infinite_mode_snaps_gaps_and_never_clips() {
    let settings = Settings::default()
        .with_bounds(Some(1), Some(200))
        .with_infinite(true)
        .with_scroll_debounce_ms(0);
    let host_state = host(100.0, 10.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(
        settings,
        array_source(1, 200, Rc::clone(&log)),
        viewport(&host_state),
    )
    .expect("settings are valid");
    let resident_after_init = workflow.items().len();

    // jump far ahead: the planned window no longer touches the resident run, so the
    // fetch boundary snaps adjacent to the buffer instead of leaving a hole
    host_state.borrow_mut().position = 1000.0;
    workflow.on_scroll(0);

    let items = workflow.items();
    assert_contiguous(&items);
    assert_eq!(items.first().map(|i| i.index), Some(1), "nothing was clipped");
    assert!(items.len() > resident_after_init);
    // the window now reaches at least the planned far end
    assert!(workflow.buffer_info().last_index.is_some_and(|last| last >= 115));
    assert_eq!(workflow.errors().len(), 0);
}

#[test]
fn random_workload_preserves_invariants() {
    let mut rng = Lcg::new(12345);
    let settings = Settings::default()
        .with_bounds(Some(1), Some(200))
        .with_scroll_debounce_ms(0);
    let host_state = host(100.0, 10.0);
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let workflow = Workflow::new(
        settings,
        array_source(1, 200, Rc::clone(&log)),
        viewport(&host_state),
    )
    .expect("settings are valid");

    for step in 0..40 {
        match rng.next_u64() % 4 {
            0 | 1 => {
                let position = rng.gen_range_i64(0, 2000) as f64;
                host_state.borrow_mut().position = position;
                workflow.on_scroll(step);
            }
            2 => {
                let info = workflow.buffer_info();
                if let (Some(first), Some(last)) = (info.first_index, info.last_index) {
                    if last > first + 2 {
                        let target = rng.gen_range_i64(first, last - 1);
                        workflow.remove(move |item| {
                            item.index >= target && item.index <= target + 1
                        });
                    }
                }
            }
            _ => {
                let info = workflow.buffer_info();
                if let Some(first) = info.first_index {
                    let size = rng.gen_range_i64(5, 40) as f64;
                    host_state.borrow_mut().overrides.insert(first, size);
                    workflow.check();
                }
            }
        }

        let items = workflow.items();
        assert_contiguous(&items);
        let info = workflow.buffer_info();
        if let (Some(first), Some(min)) = (info.first_index, info.abs_min_index) {
            assert!(min <= first, "abs_min_index must bound the window");
        }
        if let (Some(last), Some(max)) = (info.last_index, info.abs_max_index) {
            assert!(last <= max, "abs_max_index must bound the window");
        }
        assert!(!workflow.is_loading(), "synchronous cycles always settle");
    }
    assert_eq!(workflow.errors().len(), 0);
}
