// map/src/session.rs
//
// One live map instance: its markers, its popup controller, and the glue that
// turns surface events into controller transitions and controller commands
// back into surface calls.

use crate::config::{MapConfig, TileConfig};
use crate::geo::LatLng;
use crate::marker::{build_markers, MarkerId, MarkerSpec};
use crate::popup::{CloseCheck, PopupCommand, PopupController, PopupState};
use crate::scheduler::Scheduler;
use crate::viewport::{fit_viewport, Viewport};
use estate_shared::{CategoryColors, Listing};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    MarkerEnter(MarkerId),
    MarkerLeave(MarkerId),
    /// The library attached/rendered the popup element for this marker.
    PopupOpened(MarkerId),
    PopupEnter(MarkerId),
    PopupLeave(MarkerId),
    BackgroundClick,
}

/// Where a surface reports pointer events. Holds the session weakly, so a
/// sink that outlives its session does nothing.
pub type EventSink = Rc<dyn Fn(MapEvent)>;

/// The rendered map, as the session needs it.
pub trait MapSurface {
    fn add_tile_layer(&self, tiles: &TileConfig) -> Result<(), String>;

    /// Place the marker and report its hover-enter, hover-leave and
    /// popup-opened events to `events`.
    fn add_marker(&self, marker: &MarkerSpec, events: EventSink) -> Result<(), String>;

    fn open_popup(&self, marker: MarkerId);

    fn close_popup(&self, marker: MarkerId);

    /// Report pointer enter/leave on the marker's rendered popup element.
    /// Called every time the popup opens; must not stack listeners on an
    /// element that is already watched.
    fn watch_popup(&self, marker: MarkerId, events: EventSink);

    fn on_background_click(&self, events: EventSink);

    /// Viewport size in CSS pixels.
    fn size(&self) -> (f64, f64);

    fn set_view(&self, center: LatLng, zoom: f64);

    /// Recompute the map size after the container settled.
    fn invalidate_size(&self);

    /// Release listeners, layers and tiles.
    fn remove(&self) -> Result<(), String>;
}

pub struct MapSession<S: MapSurface> {
    surface: S,
    scheduler: Rc<dyn Scheduler>,
    config: MapConfig,
    markers: Vec<MarkerSpec>,
    viewport: Viewport,
    controller: RefCell<PopupController>,
    disposed: Cell<bool>,
}

impl<S: MapSurface + 'static> MapSession<S> {
    /// Places a marker per mappable listing, wires the popup controller and
    /// sets the initial view.
    pub fn build(
        surface: S,
        scheduler: Rc<dyn Scheduler>,
        config: MapConfig,
        listings: &[Listing],
        colors: &CategoryColors,
    ) -> Rc<Self> {
        let set = build_markers(listings, colors, &config);
        let viewport = fit_viewport(
            &set.points,
            surface.size(),
            &config.viewport,
            config.tiles.max_zoom,
        );

        let session = Rc::new(Self {
            surface,
            scheduler,
            config,
            markers: set.markers,
            viewport,
            controller: RefCell::new(PopupController::new()),
            disposed: Cell::new(false),
        });

        let sink = session.sink();
        for marker in &session.markers {
            if let Err(e) = session.surface.add_marker(marker, sink.clone()) {
                log_warn!(
                    "[PropertyMap] failed to place marker for listing {}: {e}",
                    marker.listing_id
                );
            }
        }
        session.surface.on_background_click(sink);
        session.surface.set_view(viewport.center, viewport.zoom);

        session
    }

    fn sink(self: &Rc<Self>) -> EventSink {
        let weak = Rc::downgrade(self);
        Rc::new(move |ev| {
            if let Some(session) = weak.upgrade() {
                session.handle(ev);
            }
        })
    }

    pub fn handle(self: &Rc<Self>, ev: MapEvent) {
        if self.disposed.get() {
            return;
        }

        // The borrow must end before commands run: opening a popup makes the
        // surface report `PopupOpened` synchronously.
        let cmds = {
            let mut c = self.controller.borrow_mut();
            match ev {
                MapEvent::MarkerEnter(m) => c.hover_enter(m),
                MapEvent::MarkerLeave(m) => c.hover_leave(m),
                MapEvent::PopupOpened(m) => c.popup_opened(m),
                MapEvent::PopupEnter(m) => {
                    c.popup_enter(m);
                    Vec::new()
                }
                MapEvent::PopupLeave(m) => c.popup_leave(m),
                MapEvent::BackgroundClick => c.background_click(),
            }
        };
        self.apply(cmds);
    }

    fn run_close_check(self: &Rc<Self>, check: CloseCheck) {
        if self.disposed.get() {
            return;
        }
        let cmds = self.controller.borrow_mut().close_check(check);
        self.apply(cmds);
    }

    fn apply(self: &Rc<Self>, cmds: Vec<PopupCommand>) {
        for cmd in cmds {
            match cmd {
                PopupCommand::Open(m) => self.surface.open_popup(m),
                PopupCommand::Close(m) => self.surface.close_popup(m),
                PopupCommand::WatchPopup(m) => self.surface.watch_popup(m, self.sink()),
                PopupCommand::ScheduleCloseCheck(check) => {
                    let weak = Rc::downgrade(self);
                    self.scheduler.defer(
                        self.config.close_debounce(),
                        Box::new(move || {
                            if let Some(session) = weak.upgrade() {
                                session.run_close_check(check);
                            }
                        }),
                    );
                }
            }
        }
    }

    /// One forced size recalculation once the container has settled.
    pub fn schedule_relayout(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.scheduler.defer(
            self.config.relayout_delay(),
            Box::new(move || {
                if let Some(session) = weak.upgrade()
                    && !session.disposed.get()
                {
                    session.surface.invalidate_size();
                }
            }),
        );
    }
}

impl<S: MapSurface> MapSession<S> {
    /// Tears the map down. Idempotent; events and timers that arrive
    /// afterwards are ignored.
    pub fn dispose(&self) -> Result<(), String> {
        if self.disposed.replace(true) {
            return Ok(());
        }
        self.surface.remove()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn popup_state(&self) -> PopupState {
        self.controller.borrow().state()
    }

    pub fn open_marker(&self) -> Option<MarkerId> {
        self.controller.borrow().open_marker()
    }

    pub fn markers(&self) -> &[MarkerSpec] {
        &self.markers
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{listing, ManualScheduler, SurfaceCall, TestSurface};
    use crate::viewport::ViewMode;

    fn session(listings: &[Listing]) -> (Rc<MapSession<TestSurface>>, Rc<ManualScheduler>) {
        let scheduler = Rc::new(ManualScheduler::default());
        let s = MapSession::build(
            TestSurface::new(),
            scheduler.clone(),
            MapConfig::default(),
            listings,
            &CategoryColors::new(),
        );
        (s, scheduler)
    }

    fn three() -> Vec<Listing> {
        vec![
            listing(1, Some((19.02, 72.82))),
            listing(2, Some((19.07, 72.87))),
            listing(3, None),
            listing(4, Some((19.11, 72.90))),
        ]
    }

    const A: MarkerId = MarkerId(0);
    const B: MarkerId = MarkerId(1);

    #[test]
    fn build_places_markers_and_fits_view() {
        let (s, _) = session(&three());
        let surface = s.surface();
        assert_eq!(surface.placed(), vec![1, 2, 4]);
        assert_eq!(s.viewport().mode, ViewMode::Fitted);
        assert!(surface.calls().iter().any(|c| matches!(c, SurfaceCall::SetView(_, _))));
    }

    #[test]
    fn at_most_one_popup_open_while_hopping_markers() {
        let (s, _) = session(&three());
        s.handle(MapEvent::MarkerEnter(A));
        s.handle(MapEvent::MarkerEnter(B));
        s.handle(MapEvent::MarkerEnter(MarkerId(2)));
        s.handle(MapEvent::MarkerEnter(A));
        assert_eq!(s.surface().open_popups(), vec![A]);
        assert!(s.surface().max_simultaneously_open() <= 1);
    }

    #[test]
    fn close_happens_after_the_debounce() {
        let (s, clock) = session(&three());
        s.handle(MapEvent::MarkerEnter(A));
        s.handle(MapEvent::MarkerLeave(A));

        clock.advance(99);
        assert_eq!(s.open_marker(), Some(A));

        clock.advance(1);
        assert_eq!(s.open_marker(), None);
        assert!(s.surface().open_popups().is_empty());
    }

    #[test]
    fn quick_reentry_keeps_popup_open() {
        let (s, clock) = session(&three());
        s.handle(MapEvent::MarkerEnter(A));
        s.handle(MapEvent::MarkerLeave(A));
        clock.advance(50);
        s.handle(MapEvent::MarkerEnter(A));
        clock.advance(200);
        assert_eq!(s.open_marker(), Some(A));
    }

    #[test]
    fn moving_onto_the_popup_keeps_it_open() {
        let (s, clock) = session(&three());
        s.handle(MapEvent::MarkerEnter(A));
        assert!(s.surface().watched().contains(&A));

        s.handle(MapEvent::MarkerLeave(A));
        clock.advance(40);
        s.surface().pointer_into_popup(A);
        clock.advance(500);
        assert_eq!(s.open_marker(), Some(A));

        s.surface().pointer_out_of_popup(A);
        clock.advance(100);
        assert_eq!(s.open_marker(), None);
    }

    #[test]
    fn background_click_closes_even_with_pointer_in_popup() {
        let (s, _) = session(&three());
        s.handle(MapEvent::MarkerEnter(A));
        s.surface().pointer_into_popup(A);
        s.surface().click_background();
        assert_eq!(s.open_marker(), None);
        assert!(s.surface().open_popups().is_empty());
    }

    #[test]
    fn timers_after_dispose_are_harmless() {
        let (s, clock) = session(&three());
        s.schedule_relayout();
        s.handle(MapEvent::MarkerEnter(A));
        s.handle(MapEvent::MarkerLeave(A));

        s.dispose().unwrap();
        clock.advance(1_000);

        let calls = s.surface().calls();
        assert!(!calls.contains(&SurfaceCall::InvalidateSize));
        assert!(!calls.contains(&SurfaceCall::Close(A)));
        assert!(s.dispose().is_ok());
    }

    #[test]
    fn timers_after_drop_are_harmless() {
        let (s, clock) = session(&three());
        s.schedule_relayout();
        s.handle(MapEvent::MarkerEnter(A));
        s.handle(MapEvent::MarkerLeave(A));
        drop(s);
        clock.advance(1_000);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn relayout_runs_once_after_delay() {
        let (s, clock) = session(&three());
        s.schedule_relayout();
        clock.advance(299);
        assert!(!s.surface().calls().contains(&SurfaceCall::InvalidateSize));
        clock.advance(1);
        let n = s
            .surface()
            .calls()
            .iter()
            .filter(|c| **c == SurfaceCall::InvalidateSize)
            .count();
        assert_eq!(n, 1);
    }
}
