use crate::mapping::{Key, Label, ResponseMapping};

/// Normalized screen coordinates, origin at the center, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const LEFT_UP: Position = Position { x: -0.8, y: 0.8 };
    pub const RIGHT_UP: Position = Position { x: 0.8, y: 0.8 };
    pub const LEFT_DOWN: Position = Position { x: -0.8, y: 0.7 };
    pub const RIGHT_DOWN: Position = Position { x: 0.8, y: 0.7 };

    pub fn is_left(&self) -> bool {
        self.x < 0.0
    }
}

/// A category label pinned to a screen corner for the length of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub label: Label,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    pub fn two_way(left: &Label, right: &Label) -> Self {
        Self::from_iter([
            (left.clone(), Position::LEFT_UP),
            (right.clone(), Position::RIGHT_UP),
        ])
    }

    pub fn four_way(left_up: &Label, left_down: &Label, right_up: &Label, right_down: &Label) -> Self {
        Self::from_iter([
            (left_up.clone(), Position::LEFT_UP),
            (left_down.clone(), Position::LEFT_DOWN),
            (right_up.clone(), Position::RIGHT_UP),
            (right_down.clone(), Position::RIGHT_DOWN),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// True when every left anchor maps to `left` and every right anchor to
    /// `right`, i.e. the reminders on screen match the keys being scored.
    pub fn agrees_with(&self, mapping: &ResponseMapping, left: &Key, right: &Key) -> bool {
        self.anchors.iter().all(|a| {
            let expected = if a.position.is_left() { left } else { right };
            mapping.get(&a.label) == Some(expected)
        })
    }
}

impl FromIterator<(Label, Position)> for AnchorSet {
    fn from_iter<I: IntoIterator<Item = (Label, Position)>>(iter: I) -> Self {
        Self {
            anchors: iter
                .into_iter()
                .map(|(label, position)| Anchor { label, position })
                .collect(),
        }
    }
}
