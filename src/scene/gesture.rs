use crate::foundation::core::{Percent, Point};
use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::scene::element::{ElementId, ElementPatch};
use crate::scene::model::SceneModel;

/// An in-progress pointer drag of one element.
///
/// Pointer coordinates are in whatever space the canvas rectangle is measured in (usually
/// screen pixels); deltas are converted to canvas percentages.
#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
    id: ElementId,
    pointer_start: Point,
    element_start: Percent,
    canvas_width: f64,
    canvas_height: f64,
}

impl DragGesture {
    /// Pointer-down: capture the starting pointer, the element's position and the canvas size.
    pub fn begin(
        model: &SceneModel,
        id: &ElementId,
        pointer_start: Point,
        canvas_width: f64,
        canvas_height: f64,
    ) -> LoveNotesResult<Option<Self>> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(canvas_width) || !valid(canvas_height) {
            return Err(LoveNotesError::validation(
                "canvas rectangle must have a positive, finite size",
            ));
        }
        Ok(model.get(id).map(|el| Self {
            id: id.clone(),
            pointer_start,
            element_start: el.position,
            canvas_width,
            canvas_height,
        }))
    }

    /// Element being dragged.
    pub fn element(&self) -> &ElementId {
        &self.id
    }

    /// Clamped position for the pointer at `pointer`.
    pub fn position_at(&self, pointer: Point) -> Percent {
        let dx = (pointer.x - self.pointer_start.x) / self.canvas_width * 100.0;
        let dy = (pointer.y - self.pointer_start.y) / self.canvas_height * 100.0;
        self.element_start.offset(dx, dy)
    }

    /// Patch for a pointer-move event.
    pub fn moved(&self, pointer: Point) -> ElementPatch {
        let p = self.position_at(pointer);
        ElementPatch::position(p.x, p.y)
    }

    /// Pointer-move applied straight to the model. Returns whether the element moved.
    pub fn apply_move(&self, model: &mut SceneModel, pointer: Point) -> bool {
        model.update_element(&self.id, &self.moved(pointer))
    }

    /// Pointer-up. Consumes the gesture.
    pub fn end(self) {}
}
