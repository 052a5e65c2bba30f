use std::rc::Rc;

/// What kind of state changed in a mutation.
///
/// `Category` lets category panels skip rebuilding the event scene;
/// everything else reports `Any`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateChange {
    Any,
    Category,
}

pub type Listener = Rc<dyn Fn(StateChange)>;

/// Synchronous listener registry. Listeners fire in registration order.
#[derive(Default)]
pub struct Observable {
    listeners: Vec<Listener>,
}

impl Observable {
    pub fn register(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn notify(&self, change: StateChange) {
        for listener in &self.listeners {
            listener(change);
        }
    }
}
