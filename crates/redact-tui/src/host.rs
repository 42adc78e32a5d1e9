use std::cell::RefCell;
use std::rc::Rc;

use redact_core::{Occurrence, OccurrenceKey};
use redact_session::{EditorHost, HostError, Marker};

/// What the terminal surface currently shows
#[derive(Debug, Default)]
pub struct HostView {
    pub revealed: Option<(OccurrenceKey, usize)>,
    pub markers: Vec<Marker>,
    pub closed: bool,
}

/// Editing surface backed by the terminal preview pane
pub struct TuiHost {
    view: Rc<RefCell<HostView>>,
}

impl TuiHost {
    pub fn new(view: Rc<RefCell<HostView>>) -> Self {
        Self { view }
    }
}

impl EditorHost for TuiHost {
    fn reveal(&mut self, occurrence: &Occurrence) -> Result<(), HostError> {
        let mut view = self.view.borrow_mut();
        if view.closed {
            return Err(HostError::Unavailable);
        }
        view.revealed = Some((occurrence.key.clone(), occurrence.line));
        Ok(())
    }

    fn publish_markers(&mut self, markers: &[Marker]) -> Result<(), HostError> {
        let mut view = self.view.borrow_mut();
        if view.closed {
            return Err(HostError::Unavailable);
        }
        view.markers = markers.to_vec();
        Ok(())
    }
}
