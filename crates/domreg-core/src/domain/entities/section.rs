//! A form section: ordered rows plus the cached submit-enabled aggregate.

use crate::domain::{
    entities::row::{Row, RowEvent},
    error::DomainError,
    value_objects::{FieldValue, SectionIndex, ValidationContext},
};

/// Events produced by section mutations, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEvent {
    RowValidated {
        row: usize,
        context: ValidationContext,
        is_valid: bool,
        message: Option<String>,
    },
    /// The cached aggregate for `context` flipped.
    SectionValidated {
        context: ValidationContext,
        is_valid: bool,
    },
    CheckMarkRowsUpdated,
    MultipleChoiceValueChanged {
        row: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Section {
    index: SectionIndex,
    rows: Vec<Row>,
    submit_enabled: bool,
}

impl Section {
    pub fn new(index: SectionIndex, rows: Vec<Row>) -> Self {
        Self {
            index,
            rows,
            submit_enabled: false,
        }
    }

    pub fn index(&self) -> SectionIndex {
        self.index
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last computed client-side aggregate.
    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    // ── Structure ─────────────────────────────────────────────────────────

    pub fn insert(&mut self, row: Row, at: usize) -> Result<(), DomainError> {
        if at > self.rows.len() {
            return Err(self.out_of_bounds(at));
        }
        self.rows.insert(at, row);
        Ok(())
    }

    pub fn remove(&mut self, at: usize) -> Result<Row, DomainError> {
        if at >= self.rows.len() {
            return Err(self.out_of_bounds(at));
        }
        Ok(self.rows.remove(at))
    }

    // ── Values ────────────────────────────────────────────────────────────

    /// Route `value` to the row at `index` according to the row's kind.
    ///
    /// `Selected(true)` on a check mark selects it exclusively;
    /// `Selected(false)` is ignored. Text goes to editable rows.
    pub fn update_value(
        &mut self,
        index: usize,
        value: FieldValue,
    ) -> Result<Vec<SectionEvent>, DomainError> {
        let section = self.index;
        let len = self.rows.len();
        let Some(row) = self.rows.get_mut(index) else {
            return Err(DomainError::RowOutOfBounds {
                section,
                row: index,
                len,
            });
        };

        match (row, value) {
            (Row::CheckMark(_), FieldValue::Selected(true)) => Ok(self.select_check_mark(index)),
            (Row::CheckMark(_), FieldValue::Selected(false)) => Ok(Vec::new()),
            (Row::InlineEditable(editable), FieldValue::Text(text)) => {
                let events = editable.set_value(text);
                Ok(self.absorb(index, events))
            }
            (_, value) => Err(DomainError::ValueKindMismatch {
                section,
                row: index,
                value: value.kind(),
            }),
        }
    }

    /// Set the transmitted code of a picker row without re-validating.
    pub fn set_id_value(&mut self, index: usize, id_value: Option<String>) -> Result<(), DomainError> {
        let section = self.index;
        match self.rows.get_mut(index) {
            Some(Row::InlineEditable(editable)) => {
                editable.set_id_value(id_value);
                Ok(())
            }
            Some(_) => Err(DomainError::NotEditable { section, row: index }),
            None => Err(self.out_of_bounds(index)),
        }
    }

    /// Write the server verdict onto the row's server-side rule.
    ///
    /// Rows without a server-side rule are left alone.
    pub fn apply_server_verdict(
        &mut self,
        index: usize,
        message: Option<String>,
    ) -> Result<Vec<SectionEvent>, DomainError> {
        let section = self.index;
        let event = match self.rows.get_mut(index) {
            Some(Row::InlineEditable(editable)) => editable.set_server_verdict(message),
            Some(_) => return Err(DomainError::NotEditable { section, row: index }),
            None => return Err(self.out_of_bounds(index)),
        };
        Ok(self.absorb(index, event.into_iter().collect()))
    }

    /// Re-validate every editable row and refresh the aggregate.
    pub fn trigger_validation(&mut self) -> Vec<SectionEvent> {
        let mut events = Vec::new();
        for index in 0..self.rows.len() {
            if let Some(editable) = self.rows[index].editable_mut() {
                let row_events = editable.validate();
                events.extend(self.absorb(index, row_events));
            }
        }
        events.extend(self.refresh_submit_enabled());
        events
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// AND over every editable row's validity for `context`.
    pub fn is_valid(&self, context: ValidationContext) -> bool {
        self.rows
            .iter()
            .filter_map(Row::editable)
            .all(|row| row.is_valid(context))
    }

    /// Index of the selected check-mark row, if any.
    pub fn selected_check_mark(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.check_mark().is_some_and(|c| c.is_selected))
    }

    /// `(wire key, wire value)` for every editable row that has a value.
    pub fn wire_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows
            .iter()
            .filter_map(Row::editable)
            .filter_map(|row| row.wire_value().map(|value| (row.wire_key(), value)))
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn select_check_mark(&mut self, index: usize) -> Vec<SectionEvent> {
        if self.selected_check_mark() == Some(index) {
            return Vec::new();
        }
        for (i, row) in self.rows.iter_mut().enumerate() {
            if let Row::CheckMark(check) = row {
                check.is_selected = i == index;
            }
        }
        vec![SectionEvent::CheckMarkRowsUpdated]
    }

    /// Attach the row index to row events and refresh the aggregate after
    /// every client-side flip.
    fn absorb(&mut self, row: usize, events: Vec<RowEvent>) -> Vec<SectionEvent> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            match event {
                RowEvent::ValidationChanged {
                    context,
                    is_valid,
                    message,
                } => {
                    out.push(SectionEvent::RowValidated {
                        row,
                        context,
                        is_valid,
                        message,
                    });
                    if context == ValidationContext::SUBMIT {
                        out.extend(self.refresh_submit_enabled());
                    }
                }
                RowEvent::ValueChanged => {
                    out.push(SectionEvent::MultipleChoiceValueChanged { row });
                }
            }
        }
        out
    }

    fn refresh_submit_enabled(&mut self) -> Option<SectionEvent> {
        let valid = self.is_valid(ValidationContext::SUBMIT);
        if valid == self.submit_enabled {
            return None;
        }
        self.submit_enabled = valid;
        Some(SectionEvent::SectionValidated {
            context: ValidationContext::SUBMIT,
            is_valid: valid,
        })
    }

    fn out_of_bounds(&self, row: usize) -> DomainError {
        DomainError::RowOutOfBounds {
            section: self.index,
            row,
            len: self.rows.len(),
        }
    }
}
