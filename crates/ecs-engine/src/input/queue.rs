/// Raw input events delivered by the host.
/// Keys are identified by their DOM `KeyboardEvent.key` string.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key went down.
    KeyDown { key: String },
    /// A key went up.
    KeyUp { key: String },
    /// Mouse wheel scrolled; positive `delta` scrolls down.
    Wheel { delta: f32 },
}

/// A queue of input events.
/// The host pushes events as they arrive; the runner drains them at the start
/// of each tick so listeners run inside the frame loop.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
