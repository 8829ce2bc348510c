use serde::Serialize;

use crate::ordering::TotalOrder;

/// Point-in-time copy of the retained elements, sorted ascending.
///
/// A snapshot owns its elements: later `record` calls never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot<E> {
    elements: Vec<E>,
}

impl<E> Snapshot<E> {
    /// Sorts `elements` ascending under `order`.
    pub(crate) fn from_unsorted<O>(mut elements: Vec<E>, order: &O) -> Self
    where
        O: TotalOrder<E> + ?Sized,
    {
        elements.sort_by(|a, b| order.compare(a, b));
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Least retained element, the next one a further record would evict.
    pub fn min(&self) -> Option<&E> {
        self.elements.first()
    }

    pub fn max(&self) -> Option<&E> {
        self.elements.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    pub fn iter_desc(&self) -> std::iter::Rev<std::slice::Iter<'_, E>> {
        self.elements.iter().rev()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.elements
    }

    pub fn into_vec(self) -> Vec<E> {
        self.elements
    }

    pub fn into_descending(mut self) -> Vec<E> {
        self.elements.reverse();
        self.elements
    }
}

impl<E: Serialize> Snapshot<E> {
    pub fn to_json_line(&self, label: &str) -> String {
        #[derive(Serialize)]
        struct Line<'a, E> {
            label: &'a str,
            len: usize,
            elements: &'a [E],
        }

        let payload = Line { label, len: self.elements.len(), elements: &self.elements };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

impl<E> IntoIterator for Snapshot<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Snapshot<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
