use std::collections::HashSet;

use crate::foundation::core::{LAYER_LIMIT, Percent};
use crate::scene::background::Background;
use crate::scene::card::Card;
use crate::scene::catalog::Template;
use crate::scene::element::{Element, ElementId, ElementKind, ElementPatch, Placement};
use crate::scene::history::History;

/// Position delta applied to duplicates, in percentage points.
pub const DUPLICATE_OFFSET: f64 = 5.0;

/// Authoritative state of one card being edited.
///
/// Every operation that changes the element sequence records a history snapshot before it
/// returns. Background changes are applied immediately and are not part of the undo log.
/// Operations naming an id that is not present are silent no-ops.
#[derive(Clone, Debug)]
pub struct SceneModel {
    elements: Vec<Element>,
    background: Background,
    history: History<Vec<Element>>,
    next_id: u64,
    issued: HashSet<ElementId>,
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneModel {
    /// Empty card on the default background. The empty state is the first history entry.
    pub fn new() -> Self {
        let mut model = Self {
            elements: Vec::new(),
            background: Background::default(),
            history: History::new(),
            next_id: 1,
            issued: HashSet::new(),
        };
        model.commit();
        model
    }

    /// Model seeded from a stored card.
    ///
    /// Numeric attributes are forced into range; missing or repeated element ids are replaced.
    pub fn from_card(card: Card) -> Self {
        let mut model = Self {
            elements: Vec::with_capacity(card.elements.len()),
            background: card.background,
            history: History::new(),
            next_id: 1,
            issued: HashSet::new(),
        };
        for mut el in card.elements {
            el.sanitize();
            if el.id.as_str().is_empty() || model.issued.contains(&el.id) {
                let fresh = model.fresh_id();
                tracing::debug!(old = %el.id, new = %fresh, "replacing element id");
                el.id = fresh;
            } else {
                model.issued.insert(el.id.clone());
            }
            model.elements.push(el);
        }
        model.commit();
        model
    }

    /// Snapshot of the current state as a storable card (without audio).
    pub fn to_card(&self) -> Card {
        Card {
            elements: self.elements.clone(),
            background: self.background.clone(),
            audio_url: None,
        }
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Active background.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the card has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether an element with `id` is present.
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Element by id.
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Elements in paint order: ascending layer, ties in insertion order.
    pub fn paint_order(&self) -> Vec<&Element> {
        paint_order(&self.elements)
    }

    /// Append a new element at the canvas center, above every existing one.
    pub fn add_element(&mut self, kind: ElementKind, placement: Placement) -> ElementId {
        let id = self.fresh_id();
        let layer = self.elements.len() as i64 + 1;
        let mut el = Element {
            id: id.clone(),
            kind,
            position: Percent::CENTER,
            size: placement.size,
            rotation: placement.rotation,
            layer,
        };
        el.sanitize();
        self.elements.push(el);
        self.commit();
        id
    }

    /// Append a new element with the default placement for its kind.
    pub fn add_default(&mut self, kind: ElementKind) -> ElementId {
        let placement = Placement::for_kind(&kind);
        self.add_element(kind, placement)
    }

    /// Remove an element. Returns whether it was present.
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| &e.id != id);
        let removed = self.elements.len() != before;
        if removed {
            self.commit();
        }
        removed
    }

    /// Merge a partial update into an element. Returns whether anything changed.
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let Some(el) = self.elements.iter_mut().find(|e| &e.id == id) else {
            return false;
        };
        let changed = el.apply(patch);
        if changed {
            self.commit();
        }
        changed
    }

    /// Clone an element, offset it and place it above everything else.
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        let source = self.get(id)?.clone();
        let layer = self.front_layer();
        let new_id = self.fresh_id();
        self.elements.push(Element {
            id: new_id.clone(),
            position: source.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET),
            layer,
            ..source
        });
        self.commit();
        Some(new_id)
    }

    /// Move an element above all others. Returns whether the element was present.
    pub fn bring_to_front(&mut self, id: &ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let layer = self.front_layer();
        self.set_layer(id, layer)
    }

    /// Move an element below all others. Returns whether the element was present.
    pub fn send_to_back(&mut self, id: &ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let layer = self.back_layer();
        self.set_layer(id, layer)
    }

    /// Remove every element. Confirmation is the caller's job.
    pub fn clear(&mut self) {
        if self.elements.is_empty() {
            return;
        }
        self.elements.clear();
        self.commit();
    }

    /// Replace the background. Not recorded in history.
    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Replace background and elements with a template's; every element gets a fresh id.
    pub fn apply_template(&mut self, template: &Template) {
        self.background = template.background.clone();
        let mut elements = Vec::with_capacity(template.elements.len());
        for el in &template.elements {
            let mut el = el.clone();
            el.id = self.fresh_id();
            el.sanitize();
            elements.push(el);
        }
        self.elements = elements;
        self.commit();
    }

    /// Restore the previous element snapshot. Returns whether the state moved.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.elements = snapshot;
                true
            }
            None => false,
        }
    }

    /// Restore the next element snapshot. Returns whether the state moved.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.elements = snapshot;
                true
            }
            None => false,
        }
    }

    /// Whether [`SceneModel::undo`] would move.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`SceneModel::redo`] would move.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Read access to the undo log.
    pub fn history(&self) -> &History<Vec<Element>> {
        &self.history
    }

    fn set_layer(&mut self, id: &ElementId, layer: i64) -> bool {
        let Some(el) = self.elements.iter_mut().find(|e| &e.id == id) else {
            return false;
        };
        el.layer = layer;
        self.commit();
        true
    }

    /// Layer key above every element.
    fn front_layer(&mut self) -> i64 {
        let top = self.elements.iter().map(|e| e.layer).max().unwrap_or(0);
        if top < LAYER_LIMIT {
            return top + 1;
        }
        self.compact_layers();
        self.elements.len() as i64 + 1
    }

    /// Layer key below every element.
    fn back_layer(&mut self) -> i64 {
        let bottom = self.elements.iter().map(|e| e.layer).min().unwrap_or(0);
        if bottom > -LAYER_LIMIT {
            return bottom - 1;
        }
        self.compact_layers();
        0
    }

    /// Renumber layers `1..=n` in paint order. The paint order itself is unchanged.
    fn compact_layers(&mut self) {
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by_key(|&i| self.elements[i].layer);
        for (rank, i) in order.into_iter().enumerate() {
            self.elements[i].layer = rank as i64 + 1;
        }
        tracing::debug!(elements = self.elements.len(), "compacted layer keys");
    }

    fn fresh_id(&mut self) -> ElementId {
        loop {
            let id = ElementId::new(format!("element-{}", self.next_id));
            self.next_id += 1;
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    fn commit(&mut self) {
        self.history.record(&self.elements);
    }
}

/// Stable sort by ascending layer.
pub fn paint_order(elements: &[Element]) -> Vec<&Element> {
    let mut out: Vec<&Element> = elements.iter().collect();
    out.sort_by_key(|e| e.layer);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
