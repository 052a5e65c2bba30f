use crate::color::{self, Color};
use crate::model::CategoryId;

/// A colored tag for events. `parent` is a weak reference by id; the db
/// guarantees it names an existing category and that the parent chain is
/// acyclic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Option<CategoryId>,
    pub name: String,
    pub color: Color,
    pub font_color: Color,
    pub parent: Option<CategoryId>,
}

impl Category {
    pub fn new(name: impl Into<String>, color: Color, parent: Option<CategoryId>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color,
            font_color: color::BLACK,
            parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_category_has_no_id() {
        let category = Category::new("Work", Color::new(255, 0, 0), None);
        assert_eq!(category.id, None);
        assert_eq!(category.font_color, color::BLACK);
    }
}
