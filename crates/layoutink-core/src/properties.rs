//! Property panel edits.
//!
//! Values come in and go out in the document's display unit; the store
//! always holds canvas pixels.

use crate::constraints::{Reconciled, TransformProposal};
use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::shapes::{
    EntityId, EntityKind, GroupId, LayoutShape, LockKind, Locks, Placeable, SerializableColor,
};
use kurbo::Point;

/// Position axis edited from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn lock(self) -> LockKind {
        match self {
            Axis::X => LockKind::X,
            Axis::Y => LockKind::Y,
        }
    }
}

/// Rectangle dimension edited from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

/// What the properties panel shows for the first selected entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSummary {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    /// Anchor in display units.
    pub position: Point,
    pub rotation: f64,
    /// Width and height in display units, rectangles and machines only.
    pub size: Option<(f64, f64)>,
    /// Area in display units squared, layouts with a known area only.
    pub area: Option<f64>,
    /// Area formatted with its unit label.
    pub area_text: Option<String>,
    pub locks: Option<Locks>,
    /// Number of selected entities.
    pub selected: usize,
    /// The group every selected entity belongs to, if they all share one.
    pub shared_group: Option<GroupId>,
}

impl Document {
    fn layout_mut(
        &mut self,
        id: EntityId,
        wrong_kind: fn(EntityId) -> EditorError,
    ) -> EditorResult<&mut LayoutShape> {
        let index = self.layout_index(id, wrong_kind)?;
        Ok(&mut self.layouts[index])
    }

    fn display_to_pixels(&self, value: f64) -> f64 {
        self.unit.to_pixels(value, self.config.pixels_per_mm)
    }

    fn pixels_to_display(&self, pixels: f64) -> f64 {
        self.unit.from_pixels(pixels, self.config.pixels_per_mm)
    }

    /// Set one coordinate of an entity's anchor from a display value.
    ///
    /// Returns `false` without changing anything when the axis is locked on
    /// a rectangle layout. Machines have no locks.
    pub fn set_position(&mut self, id: EntityId, axis: Axis, value: f64) -> EditorResult<bool> {
        let pixels = self.display_to_pixels(value);
        if let Some(layout) = self.layout(id) {
            if layout.locks().is_some_and(|locks| locks.get(axis.lock())) {
                log::debug!("Ignoring {:?} edit on locked {}", axis, id);
                return Ok(false);
            }
        }

        let entity = self.entity_mut(id).ok_or(EditorError::EntityNotFound(id))?;
        let mut position = entity.position();
        match axis {
            Axis::X => position.x = pixels,
            Axis::Y => position.y = pixels,
        }
        entity.set_position(position);
        Ok(true)
    }

    /// Resize a rectangle layout from a display value. Locks and the area
    /// lock apply exactly as for a resize gesture.
    pub fn set_size(
        &mut self,
        id: EntityId,
        dimension: Dimension,
        value: f64,
    ) -> EditorResult<Reconciled> {
        let pixels = self.display_to_pixels(value);
        let proposal = match dimension {
            Dimension::Width => TransformProposal::new().with_width(pixels),
            Dimension::Height => TransformProposal::new().with_height(pixels),
        };
        self.apply_transform(id, &proposal)
    }

    /// Flip one lock on a rectangle layout and return its new state.
    ///
    /// Releasing the area lock queues an area refresh, since resizes made
    /// while it was held did not update the area.
    pub fn toggle_lock(&mut self, id: EntityId, lock: LockKind) -> EditorResult<bool> {
        let shape = self.layout_mut(id, EditorError::NotARectangle)?;
        let locks = shape.locks_mut().ok_or(EditorError::NotARectangle(id))?;
        let value = !locks.get(lock);
        locks.set(lock, value);

        if lock == LockKind::Area && !value {
            self.mark_area_stale(id);
        }
        log::debug!("{:?} lock on {} is now {}", lock, id, value);
        Ok(value)
    }

    /// Rename an entity. An empty name clears a layout's label.
    pub fn set_name(&mut self, id: EntityId, name: impl Into<String>) -> EditorResult<()> {
        let name = name.into();
        if let Some(layout) = self.layouts.iter_mut().find(|l| l.id == id) {
            layout.name = (!name.is_empty()).then_some(name);
            return Ok(());
        }
        let index = self.machine_index(id)?;
        self.machines[index].name = name;
        Ok(())
    }

    pub fn set_color(&mut self, id: EntityId, color: SerializableColor) -> EditorResult<()> {
        if let Some(layout) = self.layouts.iter_mut().find(|l| l.id == id) {
            layout.color = color;
            return Ok(());
        }
        let index = self.machine_index(id)?;
        self.machines[index].color = color;
        Ok(())
    }

    /// Set rotation in degrees.
    pub fn set_rotation(&mut self, id: EntityId, degrees: f64) -> EditorResult<()> {
        if let Some(layout) = self.layouts.iter_mut().find(|l| l.id == id) {
            layout.rotation = degrees;
            return Ok(());
        }
        let index = self.machine_index(id)?;
        self.machines[index].rotation = degrees;
        Ok(())
    }

    /// The group shared by every selected entity.
    fn shared_group(&self) -> Option<GroupId> {
        let mut groups = self
            .selection
            .iter()
            .map(|id| self.entity(id).and_then(|e| e.group()));
        let first = groups.next()??;
        groups.all(|g| g == Some(first)).then_some(first)
    }

    /// Summarize the first selected entity for the properties panel.
    pub fn first_selected_summary(&self) -> Option<SelectionSummary> {
        let id = self.selection.first()?;
        let ppmm = self.config.pixels_per_mm;
        let selected = self.selection.len();
        let shared_group = self.shared_group();

        if let Some(layout) = self.layout(id) {
            let area = layout.area;
            return Some(SelectionSummary {
                id,
                kind: EntityKind::Layout,
                name: layout.name.clone().unwrap_or_default(),
                position: Point::new(
                    self.pixels_to_display(layout.position.x),
                    self.pixels_to_display(layout.position.y),
                ),
                rotation: layout.rotation,
                size: layout
                    .size()
                    .map(|(w, h)| (self.pixels_to_display(w), self.pixels_to_display(h))),
                area: area.map(|a| self.unit.area_from_pixels(a, ppmm)),
                area_text: area.map(|a| self.unit.format_area(a, ppmm)),
                locks: layout.locks().copied(),
                selected,
                shared_group,
            });
        }

        let machine = self.machine(id)?;
        Some(SelectionSummary {
            id,
            kind: EntityKind::Machine,
            name: machine.name.clone(),
            position: Point::new(
                self.pixels_to_display(machine.position.x),
                self.pixels_to_display(machine.position.y),
            ),
            rotation: machine.rotation,
            size: Some((
                self.pixels_to_display(machine.width),
                self.pixels_to_display(machine.height),
            )),
            area: None,
            area_text: None,
            locks: None,
            selected,
            shared_group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::MachineBlock;
    use crate::units::{PIXELS_PER_MM_96_DPI, Unit};

    fn px_document() -> Document {
        let mut doc = Document::new();
        doc.unit = Unit::Pixels;
        doc
    }

    #[test]
    fn test_set_position_converts_units() {
        let mut doc = Document::new();
        let id = doc.add_default_rectangle();
        assert!(doc.set_position(id, Axis::X, 10.0).unwrap());
        let x = doc.layout(id).map(|l| l.position.x).unwrap();
        assert!((x - 10.0 * PIXELS_PER_MM_96_DPI).abs() < 1e-9);
    }

    #[test]
    fn test_set_position_respects_axis_lock() {
        let mut doc = px_document();
        let id = doc.add_default_rectangle();
        doc.toggle_lock(id, LockKind::Y).unwrap();
        assert!(!doc.set_position(id, Axis::Y, 5.0).unwrap());
        assert!(doc.set_position(id, Axis::X, 5.0).unwrap());
        assert_eq!(doc.layout(id).map(|l| l.position), Some(Point::new(5.0, 100.0)));
    }

    #[test]
    fn test_machine_position_always_accepted() {
        let mut doc = px_document();
        let id = doc.add_default_machine();
        assert!(doc.set_position(id, Axis::Y, 42.0).unwrap());
        assert_eq!(doc.machine(id).map(|m| m.position), Some(Point::new(200.0, 42.0)));
    }

    #[test]
    fn test_set_size_goes_through_area_lock() {
        let mut doc = px_document();
        let id = doc.add_layout(LayoutShape::rectangle(Point::ZERO, 100.0, 50.0).with_area(5000.0));
        doc.toggle_lock(id, LockKind::Area).unwrap();

        let result = doc.set_size(id, Dimension::Width, 200.0).unwrap();
        assert!(result.area_corrected);
        assert_eq!(doc.layout(id).and_then(|l| l.size()), Some((200.0, 25.0)));
        assert!(doc.pending_area_refresh().is_empty());
    }

    #[test]
    fn test_set_size_locked_dimension_is_kept() {
        let mut doc = px_document();
        let id = doc.add_default_rectangle();
        doc.toggle_lock(id, LockKind::Height).unwrap();
        doc.set_size(id, Dimension::Height, 300.0).unwrap();
        assert_eq!(doc.layout(id).and_then(|l| l.size()), Some((100.0, 100.0)));
    }

    #[test]
    fn test_set_size_rejects_polygon_and_machine() {
        let mut doc = px_document();
        let poly = doc.add_default_polygon();
        let machine = doc.add_default_machine();
        assert!(matches!(
            doc.set_size(poly, Dimension::Width, 10.0),
            Err(EditorError::NotARectangle(_))
        ));
        assert!(matches!(
            doc.set_size(machine, Dimension::Width, 10.0),
            Err(EditorError::NotARectangle(_))
        ));
    }

    #[test]
    fn test_toggle_lock() {
        let mut doc = Document::new();
        let id = doc.add_layout(LayoutShape::rectangle(Point::ZERO, 10.0, 10.0).with_area(100.0));
        assert!(doc.toggle_lock(id, LockKind::Area).unwrap());
        assert!(doc.pending_area_refresh().is_empty());
        assert!(!doc.toggle_lock(id, LockKind::Area).unwrap());
        assert_eq!(doc.pending_area_refresh(), &[id]);

        let poly = doc.add_default_polygon();
        assert!(matches!(
            doc.toggle_lock(poly, LockKind::X),
            Err(EditorError::NotARectangle(_))
        ));
    }

    #[test]
    fn test_name_color_rotation() {
        let mut doc = Document::new();
        let rect = doc.add_default_rectangle();
        let machine = doc.add_default_machine();

        doc.set_name(rect, "Storage").unwrap();
        doc.set_name(machine, "Press").unwrap();
        assert_eq!(doc.layout(rect).and_then(|l| l.name.as_deref()), Some("Storage"));
        assert_eq!(doc.machine(machine).map(|m| m.name.as_str()), Some("Press"));
        doc.set_name(rect, "").unwrap();
        assert!(doc.layout(rect).and_then(|l| l.name.as_ref()).is_none());

        doc.set_color(machine, SerializableColor::blue()).unwrap();
        assert_eq!(doc.machine(machine).map(|m| m.color), Some(SerializableColor::blue()));

        doc.set_rotation(rect, 45.0).unwrap();
        assert_eq!(doc.layout(rect).map(|l| l.rotation), Some(45.0));

        let missing = uuid::Uuid::new_v4();
        assert!(matches!(
            doc.set_rotation(missing, 1.0),
            Err(EditorError::EntityNotFound(_))
        ));
    }

    #[test]
    fn test_summary_for_layout() {
        let mut doc = Document::new();
        doc.unit = Unit::Meters;
        let id = doc.add_layout(
            LayoutShape::rectangle(Point::ZERO, 1000.0 * PIXELS_PER_MM_96_DPI, 500.0)
                .with_name("Hall")
                .with_area(1000.0 * PIXELS_PER_MM_96_DPI * 1000.0 * PIXELS_PER_MM_96_DPI),
        );
        assert!(doc.first_selected_summary().is_none());

        doc.select(Some(id), false, true).unwrap();
        let summary = doc.first_selected_summary().unwrap();
        assert_eq!(summary.kind, EntityKind::Layout);
        assert_eq!(summary.name, "Hall");
        let (width, _) = summary.size.unwrap();
        assert!((width - 1.0).abs() < 1e-9);
        assert!((summary.area.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(summary.area_text.as_deref(), Some("1.000000 m²"));
        assert_eq!(summary.locks, Some(Locks::default()));
        assert_eq!(summary.selected, 1);
        assert!(summary.shared_group.is_none());
    }

    #[test]
    fn test_summary_for_machine_and_shared_group() {
        let mut doc = px_document();
        let machine = doc.add_machine(MachineBlock::new("Lathe", Point::new(4.0, 8.0), 30.0, 20.0));
        let rect = doc.add_default_rectangle();
        doc.select(Some(machine), false, true).unwrap();
        doc.select(Some(rect), true, true).unwrap();
        let group = doc.group().unwrap();

        let summary = doc.first_selected_summary().unwrap();
        assert_eq!(summary.kind, EntityKind::Machine);
        assert_eq!(summary.position, Point::new(4.0, 8.0));
        assert_eq!(summary.size, Some((30.0, 20.0)));
        assert!(summary.area.is_none());
        assert_eq!(summary.selected, 2);
        assert_eq!(summary.shared_group, Some(group));

        let loose = doc.add_default_polygon();
        doc.select(Some(loose), true, true).unwrap();
        assert!(doc.first_selected_summary().unwrap().shared_group.is_none());
    }
}
