// map/src/popup.rs
//
// Hover-driven popup state machine.
//
// Moving the pointer from a marker onto its popup crosses a short gap with no
// hover target, so a hover-leave never closes immediately: it schedules a
// close check. Timers are never cancelled. Instead every check carries the
// interaction epoch it was scheduled in and re-validates against the live
// state when it fires:
//   - the popup it targets must still be the open one,
//   - the pointer must not be inside that popup,
//   - no hover/popup interaction may have happened since it was scheduled.
//
// The controller is pure. It returns commands; `MapSession` applies them to
// the map surface and the scheduler.

use crate::marker::MarkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    Idle,
    Open {
        marker: MarkerId,
        pointer_inside_popup: bool,
    },
}

/// A deferred close request for one marker's popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseCheck {
    pub marker: MarkerId,
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupCommand {
    Open(MarkerId),
    Close(MarkerId),
    /// Attach pointer enter/leave listeners to the rendered popup element.
    WatchPopup(MarkerId),
    /// Run `close_check` after the debounce delay.
    ScheduleCloseCheck(CloseCheck),
}

#[derive(Debug, Default)]
pub struct PopupController {
    state: PopupState,
    epoch: u64,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn open_marker(&self) -> Option<MarkerId> {
        match self.state {
            PopupState::Idle => None,
            PopupState::Open { marker, .. } => Some(marker),
        }
    }

    pub fn pointer_inside_popup(&self) -> bool {
        matches!(
            self.state,
            PopupState::Open {
                pointer_inside_popup: true,
                ..
            }
        )
    }

    fn bump(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    fn schedule(&mut self, marker: MarkerId) -> PopupCommand {
        let epoch = self.bump();
        PopupCommand::ScheduleCloseCheck(CloseCheck { marker, epoch })
    }

    /// Pointer entered marker `m`.
    pub fn hover_enter(&mut self, m: MarkerId) -> Vec<PopupCommand> {
        self.bump();
        let mut cmds = Vec::new();

        match self.state {
            PopupState::Open { marker, .. } if marker == m => {
                self.state = PopupState::Open {
                    marker: m,
                    pointer_inside_popup: false,
                };
                return cmds;
            }
            PopupState::Open { marker, .. } => cmds.push(PopupCommand::Close(marker)),
            PopupState::Idle => {}
        }

        cmds.push(PopupCommand::Open(m));
        self.state = PopupState::Open {
            marker: m,
            pointer_inside_popup: false,
        };
        cmds
    }

    /// Pointer left marker `m`.
    pub fn hover_leave(&mut self, m: MarkerId) -> Vec<PopupCommand> {
        if self.open_marker() != Some(m) {
            return Vec::new();
        }
        vec![self.schedule(m)]
    }

    /// The library rendered `m`'s popup element.
    pub fn popup_opened(&mut self, m: MarkerId) -> Vec<PopupCommand> {
        if self.open_marker() != Some(m) {
            return Vec::new();
        }
        vec![PopupCommand::WatchPopup(m)]
    }

    /// Pointer entered the popup element of `m`.
    pub fn popup_enter(&mut self, m: MarkerId) {
        if self.open_marker() != Some(m) {
            return;
        }
        self.bump();
        self.state = PopupState::Open {
            marker: m,
            pointer_inside_popup: true,
        };
    }

    /// Pointer left the popup element of `m`.
    pub fn popup_leave(&mut self, m: MarkerId) -> Vec<PopupCommand> {
        if self.open_marker() != Some(m) {
            return Vec::new();
        }
        self.state = PopupState::Open {
            marker: m,
            pointer_inside_popup: false,
        };
        vec![self.schedule(m)]
    }

    /// Debounce elapsed for `check`.
    pub fn close_check(&mut self, check: CloseCheck) -> Vec<PopupCommand> {
        let still_current = check.epoch == self.epoch;
        match self.state {
            PopupState::Open {
                marker,
                pointer_inside_popup: false,
            } if marker == check.marker && still_current => {
                self.state = PopupState::Idle;
                vec![PopupCommand::Close(marker)]
            }
            _ => Vec::new(),
        }
    }

    /// Click on the map background: close whatever is open, regardless of pointer state.
    pub fn background_click(&mut self) -> Vec<PopupCommand> {
        self.bump();
        match std::mem::take(&mut self.state) {
            PopupState::Open { marker, .. } => vec![PopupCommand::Close(marker)],
            PopupState::Idle => Vec::new(),
        }
    }
}
