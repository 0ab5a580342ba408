use std::fmt;

use crate::foundation::ids::ListenerId;
use crate::rig::transition::TransitionRule;
use crate::stack::entry::StackEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendStackEventKind {
    Pushed,
    Popped,
}

/// Fired synchronously at the point of stack mutation.
#[derive(Clone, Copy, Debug)]
pub struct BlendStackEvent<'a> {
    pub kind: BlendStackEventKind,
    pub entry: &'a StackEntry,
    /// Rule that picked the entry's blend. Only set for pushes.
    pub transition: Option<&'a TransitionRule>,
}

type Listener = Box<dyn FnMut(&BlendStackEvent<'_>)>;

#[derive(Default)]
pub(crate) struct EventSink {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventSink {
    pub(crate) fn subscribe(&mut self, listener: impl FnMut(&BlendStackEvent<'_>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn broadcast(&mut self, event: &BlendStackEvent<'_>) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
