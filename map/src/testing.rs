// map/src/testing.rs
//
// Test doubles: a virtual-time scheduler, an in-process instance registry and
// a recording map surface that behaves like Leaflet where the session depends
// on it (opening a popup reports `PopupOpened` synchronously).

use crate::config::TileConfig;
use crate::geo::LatLng;
use crate::lifecycle::{InstanceHandle, InstanceId, InstanceRegistry};
use crate::marker::{MarkerId, MarkerSpec};
use crate::scheduler::{Scheduler, Sleep, Task};
use crate::session::{EventSink, MapEvent, MapSurface};
use estate_shared::Listing;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::time::Duration;

pub fn listing(id: i64, coords: Option<(f64, f64)>) -> Listing {
    Listing {
        id,
        name: format!("Listing {id}"),
        property_type: "Apartment".to_string(),
        latitude: coords.map(|c| c.0),
        longitude: coords.map(|c| c.1),
        price: 5_500_000.0,
        full_address: "Bandra West, Mumbai".to_string(),
        plot_area: None,
        image_url: None,
        contact_phone: None,
    }
}

// ---------------------------------------------------------------------------
// Virtual clock
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ManualScheduler {
    now_ms: Cell<u64>,
    seq: Cell<u64>,
    queue: RefCell<Vec<(u64, u64, Task)>>,
    sleeps: Cell<u32>,
}

impl ManualScheduler {
    /// Moves time forward, running every task that comes due, in order.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms.get() + ms;
        loop {
            let next = {
                let mut q = self.queue.borrow_mut();
                let idx = q
                    .iter()
                    .enumerate()
                    .filter(|(_, (due, _, _))| *due <= target)
                    .min_by_key(|(_, (due, seq, _))| (*due, *seq))
                    .map(|(i, _)| i);
                idx.map(|i| q.remove(i))
            };
            let Some((due, _, task)) = next else { break };
            self.now_ms.set(due);
            task();
        }
        self.now_ms.set(target);
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, delay: Duration, task: Task) {
        let seq = self.seq.get() + 1;
        self.seq.set(seq);
        let due = self.now_ms.get() + delay.as_millis() as u64;
        self.queue.borrow_mut().push((due, seq, task));
    }

    fn sleep(&self, delay: Duration) -> Sleep {
        self.sleeps.set(self.sleeps.get() + 1);
        self.now_ms.set(self.now_ms.get() + delay.as_millis() as u64);
        Box::pin(std::future::ready(()))
    }
}

// ---------------------------------------------------------------------------
// Recording surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Tiles,
    AddMarker(i64),
    Open(MarkerId),
    Close(MarkerId),
    Watch(MarkerId),
    SetView(LatLng, f64),
    InvalidateSize,
    Remove,
}

/// Stand-in for the map container's child nodes.
#[derive(Default)]
pub struct FakeDom {
    pub children: RefCell<Vec<String>>,
}

#[derive(Default)]
struct SurfaceState {
    calls: Vec<SurfaceCall>,
    open: BTreeSet<MarkerId>,
    max_open: usize,
    watched: BTreeSet<MarkerId>,
    marker_sinks: HashMap<MarkerId, EventSink>,
    popup_sinks: HashMap<MarkerId, EventSink>,
    background: Option<EventSink>,
}

pub struct TestSurface {
    state: RefCell<SurfaceState>,
    dom: Rc<FakeDom>,
    size: (f64, f64),
}

impl TestSurface {
    pub fn new() -> Self {
        Self::in_dom(Rc::new(FakeDom::default()))
    }

    pub fn in_dom(dom: Rc<FakeDom>) -> Self {
        Self {
            state: RefCell::new(SurfaceState::default()),
            dom,
            size: (800.0, 600.0),
        }
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.borrow().calls.clone()
    }

    pub fn placed(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::AddMarker(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn open_popups(&self) -> Vec<MarkerId> {
        self.state.borrow().open.iter().copied().collect()
    }

    pub fn max_simultaneously_open(&self) -> usize {
        self.state.borrow().max_open
    }

    pub fn watched(&self) -> Vec<MarkerId> {
        self.state.borrow().watched.iter().copied().collect()
    }

    fn popup_sink(&self, m: MarkerId) -> Option<EventSink> {
        self.state.borrow().popup_sinks.get(&m).cloned()
    }

    pub fn pointer_into_popup(&self, m: MarkerId) {
        if let Some(sink) = self.popup_sink(m) {
            sink(MapEvent::PopupEnter(m));
        }
    }

    pub fn pointer_out_of_popup(&self, m: MarkerId) {
        if let Some(sink) = self.popup_sink(m) {
            sink(MapEvent::PopupLeave(m));
        }
    }

    pub fn click_background(&self) {
        let sink = self.state.borrow().background.clone();
        if let Some(sink) = sink {
            sink(MapEvent::BackgroundClick);
        }
    }
}

impl MapSurface for TestSurface {
    fn add_tile_layer(&self, _tiles: &TileConfig) -> Result<(), String> {
        self.state.borrow_mut().calls.push(SurfaceCall::Tiles);
        Ok(())
    }

    fn add_marker(&self, marker: &MarkerSpec, events: EventSink) -> Result<(), String> {
        let mut st = self.state.borrow_mut();
        st.calls.push(SurfaceCall::AddMarker(marker.listing_id));
        st.marker_sinks.insert(marker.id, events);
        self.dom
            .children
            .borrow_mut()
            .push(format!("marker:{}", marker.listing_id));
        Ok(())
    }

    fn open_popup(&self, marker: MarkerId) {
        let sink = {
            let mut st = self.state.borrow_mut();
            st.calls.push(SurfaceCall::Open(marker));
            st.open.insert(marker);
            st.max_open = st.max_open.max(st.open.len());
            st.marker_sinks.get(&marker).cloned()
        };
        if let Some(sink) = sink {
            sink(MapEvent::PopupOpened(marker));
        }
    }

    fn close_popup(&self, marker: MarkerId) {
        let mut st = self.state.borrow_mut();
        st.calls.push(SurfaceCall::Close(marker));
        st.open.remove(&marker);
    }

    fn watch_popup(&self, marker: MarkerId, events: EventSink) {
        let mut st = self.state.borrow_mut();
        st.calls.push(SurfaceCall::Watch(marker));
        if st.watched.insert(marker) {
            st.popup_sinks.insert(marker, events);
        }
    }

    fn on_background_click(&self, events: EventSink) {
        self.state.borrow_mut().background = Some(events);
    }

    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn set_view(&self, center: LatLng, zoom: f64) {
        self.state
            .borrow_mut()
            .calls
            .push(SurfaceCall::SetView(center, zoom));
    }

    fn invalidate_size(&self) {
        self.state.borrow_mut().calls.push(SurfaceCall::InvalidateSize);
    }

    fn remove(&self) -> Result<(), String> {
        self.state.borrow_mut().calls.push(SurfaceCall::Remove);
        self.dom.children.borrow_mut().clear();
        Ok(())
    }
}

/// In-process instance table.
#[derive(Default)]
pub struct LocalRegistry {
    next: Cell<u64>,
    live: RefCell<HashMap<InstanceId, Rc<dyn InstanceHandle>>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.borrow().is_empty()
    }
}

impl InstanceRegistry for LocalRegistry {
    fn lookup(&self, id: InstanceId) -> Option<Rc<dyn InstanceHandle>> {
        self.live.borrow().get(&id).cloned()
    }

    fn register(&self, handle: Rc<dyn InstanceHandle>) -> InstanceId {
        let id = InstanceId(self.next.get() + 1);
        self.next.set(id.0);
        self.live.borrow_mut().insert(id, handle);
        id
    }

    fn forget(&self, id: InstanceId) {
        self.live.borrow_mut().remove(&id);
    }
}
