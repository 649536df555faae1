//! Frame orchestration
//!
//! `WorldRenderer` ties the streaming pieces together: it keeps the
//! proximity set current, feeds dirty chunks to the background scheduler,
//! swaps finished builds onto the GPU, builds per-phase queues and drives
//! draw dispatch in a fixed pass order. Everything except the tessellation
//! itself runs on the caller's thread.

use std::sync::Arc;

use log::{debug, info, trace};

use crate::core::camera::{Camera, CameraMode};
use crate::core::config::StreamingConfig;
use crate::core::events::{EventSink, WorldTimeEvents};
use crate::core::stats::FrameStats;
use crate::core::types::Result;
use crate::math::Rect2i;
use crate::mesh::geometry::RenderPhase;
use crate::mesh::heap::GpuHeap;
use crate::mesh::lifecycle::{MeshLifecycle, MeshState};
use crate::render::queues::RenderQueues;
use crate::render::subscribers::{ChunkDraw, DrawPass, DrawSink, RenderSubscriber};
use crate::render::visibility;
use crate::streaming::budget::ResidencyBudget;
use crate::streaming::proximity::ProximityIndex;
use crate::streaming::scheduler::{BuildKind, BuildOutcome, UpdateScheduler};
use crate::world::chunk::{ChunkCoord, ChunkStatus, VerticalSlice};
use crate::world::provider::{ChunkProvider, Tessellator};

/// Owner and driver of the chunk streaming pipeline
pub struct WorldRenderer<P: ChunkProvider, H: GpuHeap> {
    provider: P,
    camera: Camera,
    config: StreamingConfig,
    proximity: ProximityIndex,
    lifecycle: MeshLifecycle,
    scheduler: UpdateScheduler<P::View>,
    budget: ResidencyBudget,
    heap: H,
    /// Kept for the synchronous pregeneration path; background builds go
    /// through the scheduler's own clone.
    tessellator: Arc<dyn Tessellator<P::View>>,
    time_events: WorldTimeEvents,
    stats: FrameStats,
}

impl<P: ChunkProvider, H: GpuHeap> WorldRenderer<P, H> {
    pub fn new(
        provider: P,
        tessellator: Arc<dyn Tessellator<P::View>>,
        camera: Camera,
        config: StreamingConfig,
        heap: H,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "world renderer starting (viewing distance {}, {} segments, {} workers)",
            config.viewing_distance, config.vertical_segments, config.build_workers
        );

        let scheduler = UpdateScheduler::new(
            tessellator.clone(),
            config.vertical_segments,
            config.build_workers,
        );

        Ok(Self {
            provider,
            camera,
            proximity: ProximityIndex::new(config.viewing_distance),
            lifecycle: MeshLifecycle::new(config.vertical_segments),
            scheduler,
            budget: ResidencyBudget::new(config.max_resident_chunks),
            heap,
            tessellator,
            time_events: WorldTimeEvents::new(),
            config,
            stats: FrameStats::default(),
        })
    }

    /// Advance the pipeline by one step
    ///
    /// Ticks the provider, recomputes the proximity set around the camera,
    /// ingests finished background builds and fires due world-time events.
    /// Proximity is recomputed before ingestion so a result arriving the
    /// frame the viewer leaves is judged against the current set, not the
    /// previous frame's. `time_in_days` is the world clock, whole days plus
    /// a day fraction.
    pub fn update(&mut self, time_in_days: f64, sink: &mut dyn EventSink) {
        self.provider.update();
        self.proximity.update(
            self.camera.chunk_coord(),
            self.camera.position,
            false,
            &self.provider,
        );
        self.ingest_build_results();
        self.time_events.fire(time_in_days, sink);
    }

    /// Drain completed builds into the lifecycle
    ///
    /// Results for chunks that already left the proximity set are dropped
    /// without storing their geometry.
    fn ingest_build_results(&mut self) {
        for outcome in self.scheduler.poll() {
            let coord = outcome.coord();
            if !self.proximity.contains(coord) {
                trace!("dropping stale build result for chunk {coord:?}");
                self.lifecycle.abort_build(coord);
                continue;
            }
            match outcome {
                BuildOutcome::Completed { coord, segments } => {
                    self.lifecycle.store_build(coord, segments);
                }
                BuildOutcome::Failed { coord } => {
                    debug!("build failed for chunk {coord:?}, will retry");
                    self.lifecycle.fail_build(coord);
                }
            }
        }
    }

    /// Walk the proximity set and build this frame's render queues
    ///
    /// For each visible, renderable chunk: swap in a finished build so the
    /// frame draws the freshest geometry, enqueue every phase that has
    /// triangles, and request a background rebuild if the chunk is dirty.
    /// Frame statistics are reset and recollected here.
    pub fn build_queues(&mut self) -> RenderQueues {
        self.stats.reset();
        let frustum = self.camera.frustum();
        let camera_pos = self.camera.position;
        let mut queues = RenderQueues::new();

        let coords: Vec<ChunkCoord> = self.proximity.coords().to_vec();
        for (rank, coord) in coords.into_iter().enumerate() {
            if !visibility::is_visible(coord, &frustum) {
                continue;
            }
            if !visibility::is_renderable(&self.provider, coord) {
                self.stats.chunks_not_ready += 1;
                continue;
            }
            self.stats.visible_chunks += 1;

            // Swap before enqueue: a mesh finished this frame is drawn this
            // frame, and the handles queued below stay valid all frame since
            // nothing disposes them until the next swap or eviction.
            self.lifecycle.upload_pending(coord, &mut self.heap);

            let (dirty, buildable) = {
                let mesh = self.lifecycle.entry(coord);
                mesh.set_animated(rank < self.config.max_animated_chunks);

                if mesh.has_active() {
                    self.stats.empty_segments +=
                        mesh.segments().iter().filter(|s| s.is_empty()).count() as u32;

                    let distance = coord.distance_to(camera_pos);
                    if mesh.triangle_count(RenderPhase::Opaque) > 0 {
                        queues.push_opaque(coord);
                    } else {
                        self.stats.ignored_phases += 1;
                    }
                    if mesh.triangle_count(RenderPhase::WaterAndIce) > 0 {
                        queues.push_water(coord, distance);
                    } else {
                        self.stats.ignored_phases += 1;
                    }
                    let billboard = mesh.triangle_count(RenderPhase::BillboardAndTranslucent);
                    if billboard > 0 && rank < self.config.max_billboard_chunks {
                        queues.push_billboard(coord, distance);
                    } else {
                        self.stats.ignored_phases += 1;
                    }
                }

                (
                    mesh.is_dirty(),
                    matches!(mesh.state(), MeshState::NoMesh | MeshState::Uploaded),
                )
            };

            if dirty {
                self.stats.dirty_chunks += 1;
                if buildable {
                    if let Some(view) = self.provider.view_around(coord) {
                        if self.lifecycle.begin_build(coord) {
                            self.scheduler.queue_build(coord, BuildKind::Default, view);
                        }
                    }
                }
            }
        }

        queues
    }

    /// Draw one frame in the fixed pass order
    ///
    /// Order: optional reflected scene, opaque chunks near to far, billboard
    /// chunks far to near, water far to near in two passes per chunk, then
    /// the overlay and (first-person cameras only) first-person stages.
    /// Subscribers run at their stage boundaries.
    pub fn render(
        &mut self,
        queues: RenderQueues,
        subscribers: &mut [&mut dyn RenderSubscriber],
        sink: &mut dyn DrawSink,
    ) {
        let lists = queues.drain();

        // The reflected scene is tagged through the pass so the sink can
        // target the reflection buffer with the mirrored view transform.
        if self.config.reflections_enabled {
            for &coord in &lists.opaque {
                self.draw_chunk(coord, RenderPhase::Opaque, DrawPass::Reflected, sink);
            }
            for &coord in &lists.billboard {
                self.draw_chunk(
                    coord,
                    RenderPhase::BillboardAndTranslucent,
                    DrawPass::Reflected,
                    sink,
                );
            }
        }

        for sub in subscribers.iter_mut() {
            sub.render_opaque();
        }
        for &coord in &lists.opaque {
            self.draw_chunk(coord, RenderPhase::Opaque, DrawPass::Color, sink);
        }
        for &coord in &lists.billboard {
            self.draw_chunk(coord, RenderPhase::BillboardAndTranslucent, DrawPass::Color, sink);
        }

        for sub in subscribers.iter_mut() {
            sub.render_transparent();
        }
        // Water draws twice per chunk: depth only, then color. The depth
        // prepass keeps back faces of overlapping water from blending twice.
        for &coord in &lists.water {
            self.draw_chunk(coord, RenderPhase::WaterAndIce, DrawPass::DepthOnly, sink);
            self.draw_chunk(coord, RenderPhase::WaterAndIce, DrawPass::Color, sink);
        }

        for sub in subscribers.iter_mut() {
            sub.render_overlay();
        }
        if self.camera.mode == CameraMode::FirstPerson {
            for sub in subscribers.iter_mut() {
                sub.render_first_person();
            }
        }
    }

    fn draw_chunk(
        &mut self,
        coord: ChunkCoord,
        phase: RenderPhase,
        pass: DrawPass,
        sink: &mut dyn DrawSink,
    ) {
        let mut triangles = 0u64;
        if let Some(mesh) = self.lifecycle.get(coord) {
            if !mesh.has_active() {
                return;
            }
            let draw = ChunkDraw {
                coord,
                segments: mesh.segments(),
                animated: mesh.is_animated(),
            };
            sink.draw_chunk(&draw, phase, pass);
            if pass != DrawPass::DepthOnly {
                triangles = u64::from(mesh.triangle_count(phase));
            }
        }
        self.stats.rendered_triangles += triangles;
    }

    /// Evict chunk meshes past the residency budget
    ///
    /// Returns the number of chunks disposed.
    pub fn enforce_budget(&mut self) -> usize {
        self.budget.enforce(&self.proximity, &mut self.lifecycle, &mut self.heap)
    }

    /// One full frame: update, build queues, render, enforce the budget
    pub fn frame(
        &mut self,
        time_in_days: f64,
        subscribers: &mut [&mut dyn RenderSubscriber],
        sink: &mut dyn DrawSink,
        events: &mut dyn EventSink,
    ) {
        self.update(time_in_days, events);
        let queues = self.build_queues();
        self.render(queues, subscribers, sink);
        self.enforce_budget();
    }

    /// Change the viewing distance and force a proximity rebuild
    pub fn change_viewing_distance(&mut self, viewing_distance: i32) -> Result<()> {
        let mut config = self.config.clone();
        config.viewing_distance = viewing_distance;
        config.validate()?;

        info!("viewing distance changed to {viewing_distance}");
        self.config = config;
        self.proximity.set_viewing_distance(viewing_distance);
        self.proximity.update(
            self.camera.chunk_coord(),
            self.camera.position,
            true,
            &self.provider,
        );
        Ok(())
    }

    /// Synchronously build one missing chunk mesh around the camera
    ///
    /// Used during loading screens: each call meshes and uploads at most one
    /// chunk, so the caller can interleave progress reporting. Returns `true`
    /// once every chunk in the region is generated and meshed.
    pub fn pregenerate(&mut self) -> bool {
        self.provider.update();
        let viewer = self.camera.chunk_coord();
        let half = self.config.viewing_distance / 2;
        let region = Rect2i::new(viewer.x - half, viewer.z - half, half * 2, half * 2);

        let mut complete = true;
        for (x, z) in region.coords() {
            let coord = ChunkCoord::new(x, z);
            if self.provider.status(coord) != ChunkStatus::Complete {
                complete = false;
                continue;
            }

            let needs_mesh = {
                let mesh = self.lifecycle.entry(coord);
                mesh.is_dirty()
                    && matches!(mesh.state(), MeshState::NoMesh | MeshState::Uploaded)
            };
            if !needs_mesh {
                continue;
            }

            let Some(view) = self.provider.view_around(coord) else {
                complete = false;
                continue;
            };

            let mut segments = Vec::with_capacity(self.config.vertical_segments);
            for slice in VerticalSlice::split(self.config.vertical_segments) {
                match self.tessellator.build(&view, coord, slice) {
                    Some(segment) => segments.push(segment),
                    // Missing data; the chunk stays dirty for a later call
                    None => return false,
                }
            }
            self.lifecycle.begin_build(coord);
            self.lifecycle.store_build(coord, segments);
            self.lifecycle.upload_pending(coord, &mut self.heap);
            debug!("pregenerated chunk {coord:?}");
            return false;
        }
        complete
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn proximity(&self) -> &ProximityIndex {
        &self.proximity
    }

    pub fn lifecycle(&self) -> &MeshLifecycle {
        &self.lifecycle
    }

    /// Mark a chunk's mesh dirty, scheduling a rebuild on the next frame
    pub fn invalidate_chunk(&mut self, coord: ChunkCoord) {
        self.lifecycle.entry(coord).mark_dirty();
    }

    /// Queue an immediate rebuild for a player-edited chunk
    ///
    /// Player-triggered builds jump ahead of regular streaming builds in the
    /// worker queue, so the edit shows up with minimal latency.
    pub fn chunk_edited(&mut self, coord: ChunkCoord) {
        let buildable = {
            let mesh = self.lifecycle.entry(coord);
            mesh.mark_dirty();
            matches!(mesh.state(), MeshState::NoMesh | MeshState::Uploaded)
        };
        if !buildable {
            return;
        }
        if let Some(view) = self.provider.view_around(coord) {
            if self.lifecycle.begin_build(coord) {
                self.scheduler.queue_build(coord, BuildKind::PlayerTriggered, view);
            }
        }
    }

    pub fn heap(&self) -> &H {
        &self.heap
    }

    /// Registry of day-fraction triggered events
    pub fn time_events_mut(&mut self) -> &mut WorldTimeEvents {
        &mut self.time_events
    }

    /// Number of background builds currently in flight
    pub fn pending_builds(&self) -> usize {
        self.scheduler.pending_count()
    }
}
