//! Layout of the dynamic address section.
//!
//! The layout is the single source of truth for what each address row is.
//! The section's rows mirror `slots` one-to-one; callers look positions up
//! with [`AddressLayout::index_of`] instead of computing them.

use std::fmt;

use crate::domain::error::DomainError;

/// What an address row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSlot {
    /// Street line `n`, starting at 1.
    Line(usize),
    AddLinePlaceholder,
    City,
    State,
    PostalCode,
}

impl AddressSlot {
    /// Key sent on the wire, or `None` for the placeholder.
    pub fn wire_key(self) -> Option<String> {
        match self {
            Self::Line(n) => Some(format!("address_{n}")),
            Self::AddLinePlaceholder => None,
            Self::City => Some("city".into()),
            Self::State => Some("state".into()),
            Self::PostalCode => Some("postal_code".into()),
        }
    }
}

impl fmt::Display for AddressSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(n) => write!(f, "address line {n}"),
            Self::AddLinePlaceholder => f.write_str("add-line placeholder"),
            Self::City => f.write_str("city"),
            Self::State => f.write_str("state"),
            Self::PostalCode => f.write_str("postal code"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLayout {
    slots: Vec<AddressSlot>,
    max_extra_lines: usize,
}

impl AddressLayout {
    pub const DEFAULT_MAX_EXTRA_LINES: usize = 5;

    /// `[Line(1), City, State, PostalCode]`.
    pub fn new(max_extra_lines: usize) -> Self {
        Self {
            slots: vec![
                AddressSlot::Line(1),
                AddressSlot::City,
                AddressSlot::State,
                AddressSlot::PostalCode,
            ],
            max_extra_lines,
        }
    }

    pub fn slots(&self) -> &[AddressSlot] {
        &self.slots
    }

    pub fn max_extra_lines(&self) -> usize {
        self.max_extra_lines
    }

    pub fn line_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, AddressSlot::Line(_)))
            .count()
    }

    /// Lines beyond the first.
    pub fn extra_line_count(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    pub fn is_placeholder_visible(&self) -> bool {
        self.slots.contains(&AddressSlot::AddLinePlaceholder)
    }

    pub fn can_add_line(&self) -> bool {
        !self.is_placeholder_visible() && self.extra_line_count() < self.max_extra_lines
    }

    pub fn index_of(&self, slot: AddressSlot) -> Option<usize> {
        self.slots.iter().position(|s| *s == slot)
    }

    pub fn slot_at(&self, index: usize) -> Option<AddressSlot> {
        self.slots.get(index).copied()
    }

    /// Number the next promoted line will get.
    pub fn next_line_number(&self) -> usize {
        self.line_count() + 1
    }

    /// Insert the placeholder after the last line. Returns its index, or
    /// `None` when a placeholder is already shown or the cap is reached.
    pub fn enable_placeholder(&mut self) -> Option<usize> {
        if !self.can_add_line() {
            return None;
        }
        let at = self.line_count();
        self.slots.insert(at, AddressSlot::AddLinePlaceholder);
        Some(at)
    }

    /// Turn the placeholder into the next line. Returns its index and the
    /// new slot, or `None` when no placeholder is shown.
    pub fn promote_placeholder(&mut self) -> Option<(usize, AddressSlot)> {
        let at = self.index_of(AddressSlot::AddLinePlaceholder)?;
        let line = AddressSlot::Line(self.next_line_number());
        self.slots[at] = line;
        Some((at, line))
    }

    /// Checks the layout against the row count of its section.
    pub fn ensure_len(&self, rows: usize) -> Result<(), DomainError> {
        if self.slots.len() == rows {
            Ok(())
        } else {
            Err(DomainError::AddressLayout(format!(
                "layout has {} slots but the section has {rows} rows",
                self.slots.len()
            )))
        }
    }
}

impl Default for AddressLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_EXTRA_LINES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_layout() {
        let layout = AddressLayout::default();
        assert_eq!(layout.index_of(AddressSlot::Line(1)), Some(0));
        assert_eq!(layout.index_of(AddressSlot::City), Some(1));
        assert_eq!(layout.index_of(AddressSlot::State), Some(2));
        assert_eq!(layout.index_of(AddressSlot::PostalCode), Some(3));
        assert_eq!(layout.extra_line_count(), 0);
        assert!(!layout.is_placeholder_visible());
    }

    #[test]
    fn placeholder_then_promotion_shifts_trailing_slots() {
        let mut layout = AddressLayout::default();
        assert_eq!(layout.enable_placeholder(), Some(1));
        assert_eq!(layout.enable_placeholder(), None);
        assert_eq!(layout.index_of(AddressSlot::City), Some(2));

        assert_eq!(layout.promote_placeholder(), Some((1, AddressSlot::Line(2))));
        assert_eq!(layout.promote_placeholder(), None);
        assert_eq!(layout.index_of(AddressSlot::City), Some(2));
        assert_eq!(layout.slot_at(1), Some(AddressSlot::Line(2)));

        assert_eq!(layout.enable_placeholder(), Some(2));
        assert_eq!(layout.index_of(AddressSlot::PostalCode), Some(5));
    }

    #[test]
    fn extra_lines_are_capped() {
        let mut layout = AddressLayout::new(5);
        for n in 0..5 {
            assert!(layout.enable_placeholder().is_some(), "cycle {n}");
            layout.promote_placeholder().unwrap();
        }
        assert_eq!(layout.extra_line_count(), 5);
        assert!(!layout.can_add_line());
        assert!(!layout.is_placeholder_visible());
        assert_eq!(layout.enable_placeholder(), None);
        assert_eq!(layout.slots().len(), 9);
    }

    #[test]
    fn wire_keys() {
        assert_eq!(AddressSlot::Line(3).wire_key().as_deref(), Some("address_3"));
        assert_eq!(AddressSlot::PostalCode.wire_key().as_deref(), Some("postal_code"));
        assert_eq!(AddressSlot::AddLinePlaceholder.wire_key(), None);
    }
}
