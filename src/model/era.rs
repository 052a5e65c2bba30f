use crate::color::Color;
use crate::model::EraId;
use crate::time::TimePeriod;

/// A named, colored background band spanning a time interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Era {
    pub id: Option<EraId>,
    pub period: TimePeriod,
    pub name: String,
    pub color: Color,
}

impl Era {
    pub fn new(period: TimePeriod, name: impl Into<String>, color: Color) -> Self {
        Self { id: None, period, name: name.into(), color }
    }
}
