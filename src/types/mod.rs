//! Document model: workbook, sheets, rows, cells, columns and styles.

mod cell;
mod col;
mod document;
mod row;
mod sheet;
mod style;

pub use cell::*;
pub use col::*;
pub use document::*;
pub use row::*;
pub use sheet::*;
pub use style::*;

/// Push `item` and hand back a reference to it.
#[allow(clippy::indexing_slicing)]
pub(crate) fn push_get<T>(items: &mut Vec<T>, item: T) -> &mut T {
    let idx = items.len();
    items.push(item);
    &mut items[idx]
}

/// The element at `idx`, appending `make(position)` until it exists.
#[allow(clippy::indexing_slicing)]
pub(crate) fn get_or_grow<T>(items: &mut Vec<T>, idx: usize, mut make: impl FnMut(usize) -> T) -> &mut T {
    while items.len() <= idx {
        let next = items.len();
        items.push(make(next));
    }
    &mut items[idx]
}
