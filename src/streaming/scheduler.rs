//! Asynchronous mesh build scheduling
//!
//! Dirty chunks are handed to a pool of background workers that run the
//! external tessellator once per vertical segment. The render thread submits
//! requests and polls for finished geometry; it never blocks on a build, and
//! workers never touch GPU resources or chunk membership. There is no
//! cancellation: a build whose chunk left proximity runs to completion and
//! its result is discarded on arrival.

use std::collections::HashSet;
use std::sync::Arc;

use log::error;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::mesh::geometry::SegmentGeometry;
use crate::world::chunk::{ChunkCoord, VerticalSlice};
use crate::world::provider::Tessellator;

/// Why a build was requested; player edits jump the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildKind {
    Default,
    PlayerTriggered,
}

/// A queued build request carrying its data snapshot
struct BuildRequest<V> {
    coord: ChunkCoord,
    kind: BuildKind,
    view: V,
}

/// Result of a background build, polled by the render thread
#[derive(Debug)]
pub enum BuildOutcome {
    /// Geometry for every vertical segment, ready for the pending slot
    Completed {
        coord: ChunkCoord,
        segments: Vec<SegmentGeometry>,
    },
    /// The tessellator could not produce geometry; the chunk stays dirty
    Failed { coord: ChunkCoord },
}

impl BuildOutcome {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            BuildOutcome::Completed { coord, .. } => *coord,
            BuildOutcome::Failed { coord } => *coord,
        }
    }
}

/// Background build dispatcher with per-chunk de-duplication
pub struct UpdateScheduler<V> {
    request_tx: mpsc::UnboundedSender<BuildRequest<V>>,
    result_rx: mpsc::UnboundedReceiver<BuildOutcome>,
    /// Chunks with a build in flight
    pending: HashSet<ChunkCoord>,
    #[allow(dead_code)]
    runtime: Runtime,
}

impl<V: Send + 'static> UpdateScheduler<V> {
    /// Create a scheduler with its own worker runtime
    ///
    /// # Arguments
    /// * `tessellator` - geometry builder shared by all workers
    /// * `segment_count` - vertical segments produced per chunk
    /// * `max_concurrent` - maximum simultaneously running builds
    pub fn new(
        tessellator: Arc<dyn Tessellator<V>>,
        segment_count: usize,
        max_concurrent: usize,
    ) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<BuildRequest<V>>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<BuildOutcome>();

        let runtime = Runtime::new().expect("failed to create tokio runtime");

        runtime.spawn(async move {
            Self::worker_loop(
                tessellator,
                segment_count,
                max_concurrent.max(1),
                &mut request_rx,
                result_tx,
            )
            .await;
        });

        Self {
            request_tx,
            result_rx,
            pending: HashSet::new(),
            runtime,
        }
    }

    /// Worker loop dispatching builds with concurrency control
    async fn worker_loop(
        tessellator: Arc<dyn Tessellator<V>>,
        segment_count: usize,
        max_concurrent: usize,
        request_rx: &mut mpsc::UnboundedReceiver<BuildRequest<V>>,
        result_tx: mpsc::UnboundedSender<BuildOutcome>,
    ) {
        let mut active_tasks: JoinSet<BuildOutcome> = JoinSet::new();
        let mut queued: Vec<BuildRequest<V>> = Vec::new();

        loop {
            tokio::select! {
                Some(request) = request_rx.recv() => {
                    queued.push(request);
                }

                Some(result) = active_tasks.join_next(), if !active_tasks.is_empty() => {
                    match result {
                        Ok(outcome) => {
                            let _ = result_tx.send(outcome);
                        }
                        Err(e) => {
                            error!("mesh build task panicked: {e}");
                        }
                    }
                }

                else => {
                    if queued.is_empty() && active_tasks.is_empty() {
                        break;
                    }
                }
            }

            while active_tasks.len() < max_concurrent && !queued.is_empty() {
                // Player-triggered requests first, then submission order
                let next = queued
                    .iter()
                    .position(|r| r.kind == BuildKind::PlayerTriggered)
                    .unwrap_or(0);
                let request = queued.remove(next);

                let tessellator = tessellator.clone();
                active_tasks.spawn_blocking(move || {
                    Self::build_task(&*tessellator, segment_count, request)
                });
            }
        }
    }

    /// Build every vertical segment of one chunk
    fn build_task(
        tessellator: &dyn Tessellator<V>,
        segment_count: usize,
        request: BuildRequest<V>,
    ) -> BuildOutcome {
        let mut segments = Vec::with_capacity(segment_count);
        for slice in VerticalSlice::split(segment_count) {
            match tessellator.build(&request.view, request.coord, slice) {
                Some(segment) => segments.push(segment),
                None => return BuildOutcome::Failed { coord: request.coord },
            }
        }
        BuildOutcome::Completed { coord: request.coord, segments }
    }

    /// Queue a build for a chunk
    ///
    /// Returns `false` if a build for this chunk is already in flight.
    pub fn queue_build(&mut self, coord: ChunkCoord, kind: BuildKind, view: V) -> bool {
        if self.pending.contains(&coord) {
            return false;
        }
        self.pending.insert(coord);

        self.request_tx
            .send(BuildRequest { coord, kind, view })
            .expect("build worker loop died");
        true
    }

    /// Poll for finished builds (non-blocking)
    ///
    /// Returns all currently available outcomes; stale-result filtering is
    /// the caller's responsibility, since only the render thread knows the
    /// current proximity set.
    pub fn poll(&mut self) -> Vec<BuildOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.result_rx.try_recv() {
            self.pending.remove(&outcome.coord());
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Number of builds currently in flight
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a build for this chunk is in flight
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::geometry::test_support::segment_with_triangles;
    use std::time::{Duration, Instant};

    fn wait_for_outcomes<V: Send + 'static>(
        scheduler: &mut UpdateScheduler<V>,
        count: usize,
    ) -> Vec<BuildOutcome> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcomes = Vec::new();
        while outcomes.len() < count {
            outcomes.extend(scheduler.poll());
            if Instant::now() > deadline {
                panic!("timed out waiting for build outcomes");
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        outcomes
    }

    #[test]
    fn test_deduplicates_in_flight_builds() {
        let tessellator: Arc<dyn Tessellator<()>> = Arc::new(
            |_: &(), _: ChunkCoord, _: VerticalSlice| Some(SegmentGeometry::default()),
        );
        let mut scheduler = UpdateScheduler::new(tessellator, 2, 2);

        let coord = ChunkCoord::new(4, -3);
        assert!(scheduler.queue_build(coord, BuildKind::Default, ()));
        assert!(!scheduler.queue_build(coord, BuildKind::Default, ()));
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.is_pending(coord));
    }

    #[test]
    fn test_completed_build_produces_all_segments() {
        let tessellator: Arc<dyn Tessellator<u32>> = Arc::new(
            |value: &u32, _: ChunkCoord, _: VerticalSlice| {
                Some(segment_with_triangles(*value, 0, 0))
            },
        );
        let mut scheduler = UpdateScheduler::new(tessellator, 4, 2);

        let coord = ChunkCoord::new(1, 2);
        scheduler.queue_build(coord, BuildKind::Default, 3);

        let outcomes = wait_for_outcomes(&mut scheduler, 1);
        match &outcomes[0] {
            BuildOutcome::Completed { coord: c, segments } => {
                assert_eq!(*c, coord);
                assert_eq!(segments.len(), 4);
                assert!(segments.iter().all(|s| s.total_triangle_count() == 3));
            }
            other => panic!("expected completion, got {other:?}"),
        }
        // Pending entry is released, the chunk can be queued again
        assert!(!scheduler.is_pending(coord));
        assert!(scheduler.queue_build(coord, BuildKind::Default, 3));
    }

    #[test]
    fn test_failed_build_reports_failure() {
        let tessellator: Arc<dyn Tessellator<()>> =
            Arc::new(|_: &(), _: ChunkCoord, _: VerticalSlice| None);
        let mut scheduler = UpdateScheduler::new(tessellator, 2, 1);

        let coord = ChunkCoord::new(-7, 0);
        scheduler.queue_build(coord, BuildKind::Default, ());

        let outcomes = wait_for_outcomes(&mut scheduler, 1);
        match &outcomes[0] {
            BuildOutcome::Failed { coord: c } => assert_eq!(*c, coord),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_chunks_complete_independently() {
        let tessellator: Arc<dyn Tessellator<()>> = Arc::new(
            |_: &(), _: ChunkCoord, _: VerticalSlice| Some(SegmentGeometry::default()),
        );
        let mut scheduler = UpdateScheduler::new(tessellator, 1, 2);

        let coords = [ChunkCoord::new(0, 0), ChunkCoord::new(1, 0), ChunkCoord::new(2, 0)];
        for &coord in &coords {
            scheduler.queue_build(coord, BuildKind::Default, ());
        }

        let outcomes = wait_for_outcomes(&mut scheduler, 3);
        let mut done: Vec<ChunkCoord> = outcomes.iter().map(BuildOutcome::coord).collect();
        done.sort();
        assert_eq!(done, coords);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
