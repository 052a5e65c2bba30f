use crate::model::{CategoryId, ContainerCid, EventId};
use crate::time::{Time, TimePeriod};

/// What role an event plays in the container hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Normal,
    /// Groups sub-events; its period is the union of theirs and is
    /// recomputed by the db on every registration change.
    Container { cid: ContainerCid, subevents: Vec<EventId> },
    /// Belongs to the container with the matching cid.
    Subevent { container_id: ContainerCid },
}

/// An alert attached to an event, serialized as "TIME;MESSAGE".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub time: Time,
    pub message: String,
}

/// A point or interval on the timeline.
///
/// `period`, `fuzzy` and `ends_today` are only writable through setters:
/// locked events silently ignore changes to them, and every caller inherits
/// that rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub id: Option<EventId>,
    period: TimePeriod,
    pub text: String,
    pub category: Option<CategoryId>,
    fuzzy: bool,
    pub locked: bool,
    ends_today: bool,
    pub progress: Option<u8>,
    pub icon: Option<Vec<u8>>,
    pub description: Option<String>,
    pub hyperlink: Option<String>,
    pub alert: Option<Alert>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(period: TimePeriod, text: impl Into<String>) -> Self {
        Self {
            id: None,
            period,
            text: text.into(),
            category: None,
            fuzzy: false,
            locked: false,
            ends_today: false,
            progress: None,
            icon: None,
            description: None,
            hyperlink: None,
            alert: None,
            kind: EventKind::Normal,
        }
    }

    pub fn new_subevent(
        period: TimePeriod,
        text: impl Into<String>,
        container_id: ContainerCid,
    ) -> Self {
        let mut event = Self::new(period, text);
        event.kind = EventKind::Subevent { container_id };
        event
    }

    pub fn new_container(period: TimePeriod, text: impl Into<String>, cid: ContainerCid) -> Self {
        let mut event = Self::new(period, text);
        event.kind = EventKind::Container { cid, subevents: Vec::new() };
        event
    }

    pub fn period(&self) -> TimePeriod {
        self.period
    }

    /// The period used for display: an `ends_today` event stretches to `now`.
    pub fn display_period(&self, now: Time) -> TimePeriod {
        if self.ends_today && now > self.period.start() {
            TimePeriod::new(self.period.start(), now).expect("now is after start")
        } else {
            self.period
        }
    }

    pub fn set_period(&mut self, period: TimePeriod) {
        if !self.locked {
            self.period = period;
        }
    }

    /// Containers bypass the lock: their period is derived state owned by
    /// the db, not user-editable data.
    pub(crate) fn set_derived_period(&mut self, period: TimePeriod) {
        self.period = period;
    }

    pub fn fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        if !self.locked {
            self.fuzzy = fuzzy;
        }
    }

    pub fn ends_today(&self) -> bool {
        self.ends_today
    }

    pub fn set_ends_today(&mut self, ends_today: bool) {
        if !self.locked {
            self.ends_today = ends_today;
        }
    }

    pub fn mean_time(&self) -> Time {
        self.period.mean_time()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, EventKind::Container { .. })
    }

    pub fn is_subevent(&self) -> bool {
        matches!(self.kind, EventKind::Subevent { .. })
    }

    /// The cid of this container, if it is one.
    pub fn cid(&self) -> Option<ContainerCid> {
        match self.kind {
            EventKind::Container { cid, .. } => Some(cid),
            _ => None,
        }
    }

    /// The cid of the container this sub-event belongs to, if any.
    pub fn container_id(&self) -> Option<ContainerCid> {
        match self.kind {
            EventKind::Subevent { container_id } => Some(container_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(start: i64, end: i64) -> TimePeriod {
        TimePeriod::new(Time::new(start, 0), Time::new(end, 0)).unwrap()
    }

    #[test]
    fn locked_event_ignores_period_and_flag_edits() {
        let mut event = Event::new(period(0, 10), "meeting");
        event.locked = true;
        event.set_period(period(5, 15));
        event.set_fuzzy(true);
        event.set_ends_today(true);
        assert_eq!(event.period(), period(0, 10));
        assert!(!event.fuzzy());
        assert!(!event.ends_today());
    }

    #[test]
    fn unlocked_event_accepts_edits() {
        let mut event = Event::new(period(0, 10), "meeting");
        event.set_period(period(5, 15));
        event.set_fuzzy(true);
        assert_eq!(event.period(), period(5, 15));
        assert!(event.fuzzy());
    }

    #[test]
    fn ends_today_stretches_display_period() {
        let mut event = Event::new(period(0, 10), "ongoing");
        event.set_ends_today(true);
        let now = Time::new(50, 0);
        assert_eq!(event.display_period(now).end(), now);
        // Stored period is untouched.
        assert_eq!(event.period().end(), Time::new(10, 0));
    }

    #[test]
    fn kind_accessors() {
        let container = Event::new_container(period(0, 1), "[7]Container", 7);
        let sub = Event::new_subevent(period(0, 1), "child", 7);
        assert_eq!(container.cid(), Some(7));
        assert_eq!(container.container_id(), None);
        assert_eq!(sub.container_id(), Some(7));
        assert!(sub.is_subevent());
        assert!(container.is_container());
    }
}
