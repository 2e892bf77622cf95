use std::cmp::Ordering;

use crate::marker::{Marker, MarkerKind};

/// Insertion-ordered markers. After a bulk load, [`MarkerStore::sort`] puts
/// them in paint order, which is also hit-test priority: later entries win.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.markers.clear();
    }

    pub fn add(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn sort(&mut self) {
        self.markers.sort_by(paint_order);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Marker> {
        self.markers.iter_mut()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn visible(&self) -> impl Iterator<Item = (usize, &Marker)> {
        self.markers.iter().enumerate().filter(|(_, m)| m.visible)
    }
}

impl Extend<Marker> for MarkerStore {
    fn extend<I: IntoIterator<Item = Marker>>(&mut self, iter: I) {
        self.markers.extend(iter);
    }
}

impl<'a> IntoIterator for &'a MarkerStore {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

/// Generic < chunk < component < entity. Inactive components before active
/// ones, then by impact. Entities: asleep, frozen, awake (awake on top).
/// Remaining ties go to altitude so higher markers draw over lower ones.
fn paint_order(a: &Marker, b: &Marker) -> Ordering {
    a.kind
        .rank()
        .cmp(&b.kind.rank())
        .then_with(|| match (&a.kind, &b.kind) {
            (MarkerKind::Component(ca), MarkerKind::Component(cb)) => ca
                .active
                .cmp(&cb.active)
                .then_with(|| ca.impact.cmp(&cb.impact)),
            (MarkerKind::Entity(ea), MarkerKind::Entity(eb)) => ea.activity().cmp(&eb.activity()),
            _ => Ordering::Equal,
        })
        .then_with(|| a.position.z.total_cmp(&b.position.z))
}
