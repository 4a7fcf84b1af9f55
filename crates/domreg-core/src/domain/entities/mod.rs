//! Form entities. Rows own their rules; sections own their rows.

pub mod address;
pub mod row;
pub mod rule;
pub mod section;

pub use address::{AddressLayout, AddressSlot};
pub use row::{CheckMarkRow, EditableKeyValueRow, Row, RowEvent};
pub use rule::ValidationRule;
pub use section::{Section, SectionEvent};
