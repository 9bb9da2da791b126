//! The document store: every entity on the canvas plus the interaction
//! state that mutates them.

use crate::area::{AreaCommit, AreaRequest, AreaResult, AreaService};
use crate::camera::ViewState;
use crate::config::EditorConfig;
use crate::constraints::{self, ReconcileLimits, Reconciled, TransformProposal};
use crate::error::{EditorError, EditorResult};
use crate::geometry;
use crate::selection::{ClickTracker, Instant, Selection};
use crate::shapes::{
    EntityId, EntityKind, GroupId, LayoutKind, LayoutShape, MachineBlock, Placeable, unrotate,
};
use crate::snap::{self, SnapConfig, SnapResult};
use crate::transform::DragSession;
use crate::units::Unit;
use kurbo::{Point, Rect};
use uuid::Uuid;

/// Inclusive overlap test, so touching bounds count as a hit.
fn bounds_overlap(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || a.x0 > b.x1 || a.y1 < b.y0 || a.y0 > b.y1)
}

/// Owned editor state for one canvas.
#[derive(Debug, Clone)]
pub struct Document {
    /// Layout shapes in draw order.
    pub(crate) layouts: Vec<LayoutShape>,
    /// Machine blocks in draw order, drawn above layouts.
    pub(crate) machines: Vec<MachineBlock>,
    pub(crate) selection: Selection,
    clicks: ClickTracker,
    /// Zoom and pan of the canvas.
    pub view: ViewState,
    pub snapping: SnapConfig,
    /// Unit used for labels and property edits.
    pub unit: Unit,
    pub(crate) config: EditorConfig,
    drag: Option<DragSession>,
    /// Layouts whose stored area no longer matches their geometry.
    pending_area: Vec<EntityId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an empty document. An invalid configuration is replaced by the
    /// defaults.
    pub fn with_config(config: EditorConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("{}, using default configuration", err);
                EditorConfig::default()
            }
        };
        let mut view = ViewState::with_limits(config.min_scale, config.max_scale);
        view.zoom_in_factor = config.zoom_in_factor;
        view.zoom_out_factor = config.zoom_out_factor;
        Self {
            layouts: Vec::new(),
            machines: Vec::new(),
            selection: Selection::new(),
            clicks: ClickTracker::new(),
            view,
            snapping: config.snapping,
            unit: config.unit,
            config,
            drag: None,
            pending_area: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layouts(&self) -> &[LayoutShape] {
        &self.layouts
    }

    pub fn machines(&self) -> &[MachineBlock] {
        &self.machines
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.contains(id)
    }

    pub fn layout(&self, id: EntityId) -> Option<&LayoutShape> {
        self.layouts.iter().find(|l| l.id == id)
    }

    pub fn machine(&self, id: EntityId) -> Option<&MachineBlock> {
        self.machines.iter().find(|m| m.id == id)
    }

    /// Look up any entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&dyn Placeable> {
        self.layout(id)
            .map(|l| l as &dyn Placeable)
            .or_else(|| self.machine(id).map(|m| m as &dyn Placeable))
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Placeable> {
        if let Some(layout) = self.layouts.iter_mut().find(|l| l.id == id) {
            return Some(layout);
        }
        self.machines
            .iter_mut()
            .find(|m| m.id == id)
            .map(|m| m as &mut dyn Placeable)
    }

    /// All entities, layouts first.
    pub fn entities(&self) -> impl Iterator<Item = &dyn Placeable> {
        self.layouts
            .iter()
            .map(|l| l as &dyn Placeable)
            .chain(self.machines.iter().map(|m| m as &dyn Placeable))
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty() && self.machines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layouts.len() + self.machines.len()
    }

    /// Index of a layout, reporting `wrong_kind` when the id names a machine.
    pub(crate) fn layout_index(
        &self,
        id: EntityId,
        wrong_kind: fn(EntityId) -> EditorError,
    ) -> EditorResult<usize> {
        match self.layouts.iter().position(|l| l.id == id) {
            Some(index) => Ok(index),
            None if self.machine(id).is_some() => Err(wrong_kind(id)),
            None => Err(EditorError::EntityNotFound(id)),
        }
    }

    pub(crate) fn machine_index(&self, id: EntityId) -> EditorResult<usize> {
        self.machines
            .iter()
            .position(|m| m.id == id)
            .ok_or(EditorError::EntityNotFound(id))
    }

    // --- Entity lifecycle ---

    /// Add a layout shape. Its area is queued for computation unless it
    /// already has one.
    pub fn add_layout(&mut self, shape: LayoutShape) -> EntityId {
        let id = shape.id;
        let needs_area = shape.area.is_none();
        self.layouts.push(shape);
        if needs_area {
            self.mark_area_stale(id);
        }
        log::debug!("Added layout {}", id);
        id
    }

    pub fn add_machine(&mut self, machine: MachineBlock) -> EntityId {
        let id = machine.id;
        self.machines.push(machine);
        log::debug!("Added machine {}", id);
        id
    }

    /// Toolbar rectangle: 100×100 at (100, 100).
    pub fn add_default_rectangle(&mut self) -> EntityId {
        self.add_layout(LayoutShape::rectangle(
            Point::new(100.0, 100.0),
            LayoutShape::DEFAULT_SIZE,
            LayoutShape::DEFAULT_SIZE,
        ))
    }

    /// Toolbar polygon: the five-vertex outline at (300, 100).
    pub fn add_default_polygon(&mut self) -> EntityId {
        self.add_layout(LayoutShape::default_polygon(Point::new(300.0, 100.0)))
    }

    /// Toolbar machine: "Machine 1", 50×50 at (200, 200).
    pub fn add_default_machine(&mut self) -> EntityId {
        self.add_machine(MachineBlock::new(
            "Machine 1",
            Point::new(200.0, 200.0),
            MachineBlock::DEFAULT_SIZE,
            MachineBlock::DEFAULT_SIZE,
        ))
    }

    /// Remove an entity and every reference to it.
    pub fn remove(&mut self, id: EntityId) -> EditorResult<EntityKind> {
        let kind = if let Some(index) = self.layouts.iter().position(|l| l.id == id) {
            self.layouts.remove(index);
            EntityKind::Layout
        } else if let Some(index) = self.machines.iter().position(|m| m.id == id) {
            self.machines.remove(index);
            EntityKind::Machine
        } else {
            return Err(EditorError::EntityNotFound(id));
        };

        self.selection.remove(id);
        self.pending_area.retain(|pending| *pending != id);
        if self.drag.as_ref().is_some_and(|drag| drag.dragged() == id) {
            self.drag = None;
        } else if let Some(drag) = &mut self.drag {
            drag.forget(id);
        }
        log::debug!("Removed {:?} {}", kind, id);
        Ok(kind)
    }

    /// Delete every selected entity. Returns the removed ids.
    pub fn remove_selected(&mut self) -> Vec<EntityId> {
        let ids: Vec<EntityId> = self.selection.iter().collect();
        ids.into_iter().filter(|id| self.remove(*id).is_ok()).collect()
    }

    // --- Selection and grouping ---

    /// Every entity sharing `group`, layouts first.
    pub fn group_members(&self, group: GroupId) -> Vec<EntityId> {
        self.entities()
            .filter(|e| e.group() == Some(group))
            .map(|e| e.id())
            .collect()
    }

    /// Select an entity.
    ///
    /// `None` clears the selection, or does nothing when `multi` is set.
    /// With `include_group` a grouped entity brings its whole group. Without
    /// `multi` the targets replace the selection, with it they are toggled.
    pub fn select(
        &mut self,
        id: Option<EntityId>,
        multi: bool,
        include_group: bool,
    ) -> EditorResult<()> {
        let Some(id) = id else {
            if !multi {
                self.selection.clear();
            }
            return Ok(());
        };

        let group = self
            .entity(id)
            .ok_or(EditorError::EntityNotFound(id))?
            .group();
        let targets = match group {
            Some(group) if include_group => self.group_members(group),
            _ => vec![id],
        };

        if multi {
            self.selection.toggle(targets);
        } else {
            self.selection.replace(targets);
        }
        Ok(())
    }

    /// Handle a click on an entity.
    ///
    /// A second click on an already selected grouped entity inside the
    /// drill-down window selects that entity alone. Any other click selects
    /// with group expansion, toggling when `shift` is held.
    pub fn click(&mut self, id: EntityId, shift: bool, now: Instant) -> EditorResult<()> {
        let grouped = self
            .entity(id)
            .ok_or(EditorError::EntityNotFound(id))?
            .group()
            .is_some();

        if grouped
            && self.selection.contains(id)
            && self.clicks.is_repeat(id, now, self.config.drill_down_window())
        {
            self.select(Some(id), false, false)?;
            self.clicks.reset();
            log::debug!("Drilled into group member {}", id);
            return Ok(());
        }

        self.select(Some(id), shift, true)?;
        if grouped {
            self.clicks.record(id, now);
        } else {
            self.clicks.reset();
        }
        Ok(())
    }

    /// Click on empty canvas.
    pub fn click_empty(&mut self) {
        self.selection.clear();
    }

    /// Escape key: clear the selection and forget the last click.
    pub fn escape(&mut self) {
        self.selection.clear();
        self.clicks.reset();
    }

    pub fn select_all(&mut self) {
        let ids: Vec<EntityId> = self.entities().map(|e| e.id()).collect();
        self.selection.replace(ids);
    }

    /// Finish a marquee drag between two screen points.
    ///
    /// Boxes no larger than the marquee threshold on both axes are ignored
    /// and `false` is returned. Otherwise the selection becomes every entity
    /// whose unrotated bounds touch the box, without group expansion.
    pub fn select_in_screen_rect(&mut self, start: Point, end: Point) -> bool {
        let threshold = self.config.marquee_threshold;
        if (end.x - start.x).abs() <= threshold && (end.y - start.y).abs() <= threshold {
            return false;
        }

        let area = Rect::from_points(
            self.view.screen_to_canvas(start),
            self.view.screen_to_canvas(end),
        );
        let hits: Vec<EntityId> = self
            .entities()
            .filter(|e| e.bounds().is_some_and(|b| bounds_overlap(b, area)))
            .map(|e| e.id())
            .collect();
        log::debug!("Marquee selected {} entities", hits.len());
        self.selection.replace(hits);
        true
    }

    /// Put every selected entity into one new group.
    ///
    /// Returns `None` when fewer than two entities are selected.
    pub fn group(&mut self) -> Option<GroupId> {
        if self.selection.len() < 2 {
            return None;
        }

        let group = Uuid::new_v4();
        let ids: Vec<EntityId> = self.selection.iter().collect();
        for id in &ids {
            if let Some(entity) = self.entity_mut(*id) {
                entity.set_group(Some(group));
            }
        }
        log::info!("Grouped {} entities into {}", ids.len(), group);
        Some(group)
    }

    /// Clear the group of every selected entity. Unselected members keep
    /// theirs. Returns how many entities were ungrouped.
    pub fn ungroup(&mut self) -> usize {
        let ids: Vec<EntityId> = self.selection.iter().collect();
        let mut count = 0;
        for id in ids {
            if let Some(entity) = self.entity_mut(id) {
                if entity.group().is_some() {
                    entity.set_group(None);
                    count += 1;
                }
            }
        }
        if count > 0 {
            log::info!("Ungrouped {} entities", count);
        }
        count
    }

    /// Entities under a canvas point, topmost first.
    pub fn entities_at_point(&self, point: Point) -> Vec<EntityId> {
        self.machines
            .iter()
            .rev()
            .map(|m| m as &dyn Placeable)
            .chain(self.layouts.iter().rev().map(|l| l as &dyn Placeable))
            .filter(|e| e.hit_test(point))
            .map(|e| e.id())
            .collect()
    }

    // --- Dragging ---

    /// Snap a candidate anchor position against the grid and every layout
    /// not listed in `excluded`.
    pub fn snap(&self, candidate: Point, excluded: &[EntityId]) -> SnapResult {
        snap::resolve(
            candidate,
            excluded,
            &self.layouts,
            &self.snapping,
            self.config.grid_size,
            self.config.snap_threshold,
        )
    }

    /// Start dragging `id`. An unselected entity is selected first, with its
    /// group, toggled into the selection when `shift` is held.
    pub fn begin_drag(&mut self, id: EntityId, shift: bool) -> EditorResult<()> {
        if self.entity(id).is_none() {
            return Err(EditorError::EntityNotFound(id));
        }
        if !self.selection.contains(id) {
            self.select(Some(id), shift, true)?;
        }

        let origins: Vec<(EntityId, Point)> = self
            .selection
            .iter()
            .filter_map(|sid| self.entity(sid).map(|e| (sid, e.position())))
            .collect();
        log::debug!("Drag started on {} with {} entities", id, origins.len());
        self.drag = Some(DragSession::new(id, origins));
        Ok(())
    }

    /// Move the dragged entity towards `candidate`, snapping it. Returns
    /// `None` when no drag is in progress.
    pub fn drag_to(&mut self, candidate: Point) -> Option<SnapResult> {
        if self.drag.is_none() {
            return None;
        }
        let snapped = self.snap(candidate, self.selection.ids());
        let drag = self.drag.as_mut()?;
        drag.move_to(snapped.point);
        Some(snapped)
    }

    /// Commit the drag: every moved entity lands at origin + delta.
    pub fn end_drag(&mut self) -> Vec<EntityId> {
        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };
        let delta = drag.delta();
        let mut committed = Vec::new();
        for (id, position) in drag.into_commits() {
            if let Some(entity) = self.entity_mut(id) {
                entity.set_position(position);
                committed.push(id);
            }
        }
        log::debug!("Drag committed {} entities by {:?}", committed.len(), delta);
        committed
    }

    /// Abandon the drag, leaving stored positions untouched.
    pub fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            log::debug!("Drag cancelled");
        }
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Position to draw an entity at, including any drag in flight.
    pub fn render_position(&self, id: EntityId) -> Option<Point> {
        self.drag
            .as_ref()
            .and_then(|drag| drag.render_position(id))
            .or_else(|| self.entity(id).map(|e| e.position()))
    }

    // --- Transforms ---

    /// Commit a finished resize/move gesture on a rectangle layout through
    /// the lock reconciler.
    pub fn apply_transform(
        &mut self,
        id: EntityId,
        proposal: &TransformProposal,
    ) -> EditorResult<Reconciled> {
        let index = self.layout_index(id, EditorError::NotARectangle)?;
        let reconciled = constraints::reconcile(
            &self.layouts[index],
            proposal,
            ReconcileLimits::from(&self.config),
        )?;

        let shape = &mut self.layouts[index];
        shape.position = reconciled.position;
        shape.rotation = reconciled.rotation;
        let mut resized = false;
        if let LayoutKind::Rectangle { width, height, .. } = &mut shape.kind {
            resized = *width != reconciled.width || *height != reconciled.height;
            *width = reconciled.width;
            *height = reconciled.height;
        }
        if resized {
            shape.bump_geometry();
        }
        if reconciled.area_needs_refresh {
            self.mark_area_stale(id);
        }
        Ok(reconciled)
    }

    // --- Polygon vertex editing ---

    /// Split the polygon edge nearest to `canvas_point` with a new vertex at
    /// that point. Returns the new vertex index.
    pub fn insert_vertex(&mut self, id: EntityId, canvas_point: Point) -> EditorResult<usize> {
        let index = self.layout_index(id, EditorError::NotAPolygon)?;
        let shape = &mut self.layouts[index];
        let local = unrotate(canvas_point, shape.position, shape.rotation) - shape.position.to_vec2();
        let LayoutKind::Polygon { points } = &mut shape.kind else {
            return Err(EditorError::NotAPolygon(id));
        };

        let at = geometry::nearest_segment_insertion_index(points, local)
            .map_or(points.len(), |hit| hit.insert_index);
        points.insert(at, local);
        shape.bump_geometry();
        self.mark_area_stale(id);
        log::debug!("Inserted vertex {} into {}", at, id);
        Ok(at)
    }

    /// Remove a vertex. Polygons never drop below the configured minimum
    /// vertex count.
    pub fn delete_vertex(&mut self, id: EntityId, vertex: usize) -> EditorResult<Point> {
        let min = self.config.min_polygon_vertices;
        let index = self.layout_index(id, EditorError::NotAPolygon)?;
        let shape = &mut self.layouts[index];
        let LayoutKind::Polygon { points } = &mut shape.kind else {
            return Err(EditorError::NotAPolygon(id));
        };

        if vertex >= points.len() {
            return Err(EditorError::VertexOutOfRange {
                index: vertex,
                len: points.len(),
            });
        }
        if points.len() <= min {
            return Err(EditorError::VertexFloor { min });
        }

        let removed = points.remove(vertex);
        shape.bump_geometry();
        self.mark_area_stale(id);
        Ok(removed)
    }

    /// Move a vertex to `local`, given relative to the polygon anchor.
    pub fn move_vertex(&mut self, id: EntityId, vertex: usize, local: Point) -> EditorResult<()> {
        let index = self.layout_index(id, EditorError::NotAPolygon)?;
        let shape = &mut self.layouts[index];
        let LayoutKind::Polygon { points } = &mut shape.kind else {
            return Err(EditorError::NotAPolygon(id));
        };

        let len = points.len();
        let slot = points
            .get_mut(vertex)
            .ok_or(EditorError::VertexOutOfRange { index: vertex, len })?;
        *slot = local;
        shape.bump_geometry();
        self.mark_area_stale(id);
        Ok(())
    }

    // --- Area tracking ---

    pub(crate) fn mark_area_stale(&mut self, id: EntityId) {
        if !self.pending_area.contains(&id) {
            self.pending_area.push(id);
        }
    }

    /// Layouts whose area must be recomputed, oldest first.
    pub fn pending_area_refresh(&self) -> &[EntityId] {
        &self.pending_area
    }

    /// Snapshot a layout's geometry for the area service.
    pub fn area_request(&self, id: EntityId) -> EditorResult<AreaRequest> {
        let index = self.layout_index(id, EditorError::NoArea)?;
        Ok(AreaRequest::for_shape(&self.layouts[index]))
    }

    /// Store the service's answer to `request`.
    ///
    /// Responses for an outdated geometry revision are dropped and the
    /// layout stays pending. A failed calculation stores 0.
    pub fn commit_area(&mut self, request: &AreaRequest, result: AreaResult<f64>) -> AreaCommit {
        let Some(shape) = self.layouts.iter_mut().find(|l| l.id == request.id) else {
            self.pending_area.retain(|pending| *pending != request.id);
            return AreaCommit::Missing;
        };

        if shape.geometry_revision != request.revision {
            log::debug!(
                "Discarding area for {} computed at revision {} (now {})",
                request.id,
                request.revision,
                shape.geometry_revision
            );
            return AreaCommit::Stale;
        }

        let commit = match result {
            Ok(area) => {
                shape.area = Some(area);
                AreaCommit::Applied(area)
            }
            Err(err) => {
                log::warn!("Area calculation for {} failed, storing 0: {}", request.id, err);
                shape.area = Some(0.0);
                AreaCommit::Fallback
            }
        };
        self.pending_area.retain(|pending| *pending != request.id);
        commit
    }

    /// Recompute and store one layout's area.
    pub async fn refresh_area(
        &mut self,
        id: EntityId,
        service: &dyn AreaService,
    ) -> EditorResult<AreaCommit> {
        let request = self.area_request(id)?;
        let result = request.compute(service).await;
        Ok(self.commit_area(&request, result))
    }

    /// Recompute every pending area.
    pub async fn refresh_pending_areas(
        &mut self,
        service: &dyn AreaService,
    ) -> Vec<(EntityId, AreaCommit)> {
        let pending = self.pending_area.clone();
        let mut results = Vec::with_capacity(pending.len());
        for id in pending {
            match self.refresh_area(id, service).await {
                Ok(commit) => results.push((id, commit)),
                Err(err) => {
                    log::warn!("Dropping area refresh for {}: {}", id, err);
                    self.pending_area.retain(|pending| *pending != id);
                }
            }
        }
        results
    }

    /// Ask the service for a layout's area without storing it.
    pub async fn measure_area(&self, id: EntityId, service: &dyn AreaService) -> EditorResult<f64> {
        let request = self.area_request(id)?;
        Ok(request.compute(service).await?)
    }
}
