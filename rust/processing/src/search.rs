// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Candidate-frame search for the minimum-volume assembly bounding box.
//!
//! Every part's placement is tried as the reference frame. All vertices of
//! all parts are re-expressed in that frame (`reference⁻¹ · part`), an
//! axis-aligned box is accumulated, and the candidate with the smallest box
//! volume wins. Ties go to the candidate that comes first in assembly order.
//!
//! Each candidate evaluation is independent and returns its own
//! [`CandidateReport`]; reports are folded into one reduction value, which
//! is the same on the sequential path and on the rayon path.

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::model::Assembly;
use crate::provider::{load_assembly, AssemblyProvider};
use ifc_bbox_geometry::transform;
use ifc_bbox_geometry::{BoundingBox, BoundsAccumulator, Frame, Vector3};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Why a candidate frame took no part in the minimum search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    /// No part contributed a single vertex.
    NoGeometry,
    /// The candidate's own placement is degenerate (only possible for a part
    /// without geometry; a degenerate part with geometry fails the search).
    DegenerateFrame(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoGeometry => f.write_str("no geometry observed"),
            SkipReason::DegenerateFrame(msg) => write!(f, "degenerate frame ({msg})"),
        }
    }
}

/// A candidate that was excluded from the minimum search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub part_id: u32,
    pub reason: SkipReason,
}

/// Outcome of evaluating a single candidate frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CandidateResult {
    Bounded { frame: Frame, bbox: BoundingBox },
    Skipped(SkipReason),
}

/// One candidate frame and what it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateReport {
    /// Position of the candidate part in the assembly
    pub index: usize,
    pub part_id: u32,
    pub result: CandidateResult,
}

impl CandidateReport {
    pub fn volume(&self) -> Option<f64> {
        match &self.result {
            CandidateResult::Bounded { bbox, .. } => Some(bbox.volume()),
            CandidateResult::Skipped(_) => None,
        }
    }
}

/// Smallest bounding box found for an assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinBoundingBox {
    pub assembly_id: u32,
    pub reference_id: u32,
    pub reference_name: Option<String>,
    /// Local-to-global frame of the reference part
    pub reference_frame: Frame,
    /// Box in the reference part's local coordinates
    pub bbox: BoundingBox,
    pub dimensions: Vector3<f64>,
    pub volume: f64,
    pub candidates_evaluated: usize,
    pub skipped: Vec<SkippedCandidate>,
}

impl MinBoundingBox {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for MinBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = match &self.reference_name {
            Some(name) => format!("{} (#{})", name, self.reference_id),
            None => format!("#{}", self.reference_id),
        };
        writeln!(f, "Minimum bbox of assembly #{}", self.assembly_id)?;
        writeln!(f, "  Reference: {reference}")?;
        writeln!(
            f,
            "  Dimension: [{}, {}, {}]",
            self.dimensions.x, self.dimensions.y, self.dimensions.z
        )?;
        writeln!(f, "  Volume: {}", self.volume)?;
        writeln!(
            f,
            "  Bounding box: min [{}, {}, {}] max [{}, {}, {}]",
            self.bbox.min.x, self.bbox.min.y, self.bbox.min.z, self.bbox.max.x, self.bbox.max.y, self.bbox.max.z
        )?;
        write!(
            f,
            "  Candidates: {} evaluated, {} skipped",
            self.candidates_evaluated,
            self.skipped.len()
        )
    }
}

/// Best candidate seen so far
#[derive(Debug, Clone)]
struct Best {
    index: usize,
    volume: f64,
    frame: Frame,
    bbox: BoundingBox,
}

/// Reduction value threaded through the search.
#[derive(Debug, Clone, Default)]
struct SearchState {
    best: Option<Best>,
    evaluated: usize,
    skipped: Vec<SkippedCandidate>,
}

impl SearchState {
    fn from_report(report: CandidateReport) -> Self {
        match report.result {
            CandidateResult::Bounded { frame, bbox } => Self {
                best: Some(Best {
                    index: report.index,
                    volume: bbox.volume(),
                    frame,
                    bbox,
                }),
                evaluated: 1,
                skipped: Vec::new(),
            },
            CandidateResult::Skipped(reason) => Self {
                best: None,
                evaluated: 0,
                skipped: vec![SkippedCandidate {
                    part_id: report.part_id,
                    reason,
                }],
            },
        }
    }

    /// Combine two states; `self` must cover candidates before `other`.
    fn merge(mut self, other: SearchState) -> Self {
        self.best = match (self.best, other.best) {
            (Some(a), Some(b)) => {
                if b.volume < a.volume || (b.volume == a.volume && b.index < a.index) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (a, b) => a.or(b),
        };
        self.evaluated += other.evaluated;
        self.skipped.extend(other.skipped);
        self
    }
}

/// Local-to-global frame of every part, built once per search.
///
/// A part without geometry keeps its error; it can only fail as a candidate.
fn part_frames(
    assembly: &Assembly,
    config: &SearchConfig,
) -> Result<Vec<std::result::Result<Frame, ifc_bbox_geometry::Error>>> {
    assembly
        .parts
        .iter()
        .map(|part| {
            match Frame::from_placement(&part.placement, config.part_order, config.tolerance) {
                Ok(frame) => Ok(Ok(frame)),
                Err(e) if part.geometry.is_empty() => Ok(Err(e)),
                Err(e) => Err(Error::for_part(part.id, e)),
            }
        })
        .collect()
}

fn evaluate_candidate(
    assembly: &Assembly,
    frames: &[std::result::Result<Frame, ifc_bbox_geometry::Error>],
    index: usize,
    config: &SearchConfig,
) -> Result<CandidateReport> {
    let reference = &assembly.parts[index];
    let skipped = |reason: SkipReason| CandidateReport {
        index,
        part_id: reference.id,
        result: CandidateResult::Skipped(reason),
    };

    let reference_frame = if config.reference_order == config.part_order {
        frames[index].clone()
    } else {
        Frame::from_placement(&reference.placement, config.reference_order, config.tolerance)
    };
    let reference_frame = match reference_frame {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(part_id = reference.id, error = %e, "Skipping degenerate candidate frame");
            return Ok(skipped(SkipReason::DegenerateFrame(e.to_string())));
        }
    };
    let reference_inv = reference_frame
        .inverse()
        .map_err(|e| Error::for_part(reference.id, e))?;

    let mut bounds = BoundsAccumulator::new();
    for (part, frame) in assembly.parts.iter().zip(frames) {
        if part.geometry.is_empty() {
            continue;
        }
        let frame = frame
            .as_ref()
            .map_err(|e| Error::for_part(part.id, e.clone()))?;
        let to_reference = transform::multiply(&reference_inv, frame.matrix());
        for vertex in part.geometry.vertices() {
            let mapped = transform::transform_point(&to_reference, vertex);
            if !mapped.coords.iter().all(|c| c.is_finite()) {
                return Err(Error::NonFiniteVertex {
                    part_id: part.id,
                    vertex: [vertex.x, vertex.y, vertex.z],
                });
            }
            bounds.observe(&mapped);
        }
    }

    match bounds.finalize() {
        Some(bbox) => {
            tracing::debug!(
                part_id = reference.id,
                points = bounds.count(),
                volume = bbox.volume(),
                "Evaluated candidate frame"
            );
            Ok(CandidateReport {
                index,
                part_id: reference.id,
                result: CandidateResult::Bounded {
                    frame: reference_frame,
                    bbox,
                },
            })
        }
        None => {
            tracing::debug!(part_id = reference.id, "Candidate frame observed no geometry");
            Ok(skipped(SkipReason::NoGeometry))
        }
    }
}

/// Run `f` on a dedicated pool when one is configured, otherwise inline.
fn with_pool<T: Send>(config: &SearchConfig, f: impl FnOnce() -> Result<T> + Send) -> Result<T> {
    match config.worker_threads {
        Some(threads) if config.parallel => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| Error::ThreadPool(e.to_string()))?;
            pool.install(f)
        }
        _ => f(),
    }
}

/// Evaluate every candidate of `assembly` and fold the reports in assembly order.
///
/// `lift` turns one report into a partial result and `merge` combines two
/// adjacent partial results; both the sequential and the rayon path use them.
fn fold_candidates<S, L, M>(assembly: &Assembly, config: &SearchConfig, lift: L, merge: M) -> Result<S>
where
    S: Default + Send,
    L: Fn(CandidateReport) -> S + Sync,
    M: Fn(S, S) -> S + Sync,
{
    if assembly.is_empty() {
        return Err(Error::EmptyAssembly {
            assembly_id: assembly.id,
        });
    }

    tracing::info!(
        assembly_id = assembly.id,
        parts = assembly.len(),
        vertices = assembly.vertex_count(),
        parallel = config.parallel,
        "Starting minimum bounding box search"
    );

    let frames = part_frames(assembly, config)?;
    let indices = 0..assembly.len();
    let evaluate = |i: usize| evaluate_candidate(assembly, &frames, i, config).map(&lift);

    with_pool(config, || {
        if config.parallel {
            indices
                .into_par_iter()
                .map(evaluate)
                .try_reduce(S::default, |a, b| Ok(merge(a, b)))
        } else {
            indices
                .map(evaluate)
                .try_fold(S::default(), |acc, partial| -> Result<S> { Ok(merge(acc, partial?)) })
        }
    })
}

/// Evaluate every candidate frame and report each one, in assembly order.
pub fn evaluate_candidates(assembly: &Assembly, config: &SearchConfig) -> Result<Vec<CandidateReport>> {
    fold_candidates(
        assembly,
        config,
        |report| vec![report],
        |mut a: Vec<CandidateReport>, b| {
            a.extend(b);
            a
        },
    )
}

/// Find the part frame giving the smallest-volume bounding box of the assembly.
pub fn find_min_bbox(assembly: &Assembly, config: &SearchConfig) -> Result<MinBoundingBox> {
    let state = fold_candidates(assembly, config, SearchState::from_report, SearchState::merge)?;

    let best = state.best.ok_or(Error::NoGeometryObserved {
        assembly_id: assembly.id,
    })?;
    let reference = &assembly.parts[best.index];

    let result = MinBoundingBox {
        assembly_id: assembly.id,
        reference_id: reference.id,
        reference_name: reference.name.clone(),
        reference_frame: best.frame,
        bbox: best.bbox,
        dimensions: best.bbox.dimensions(),
        volume: best.volume,
        candidates_evaluated: state.evaluated,
        skipped: state.skipped,
    };

    tracing::info!(
        assembly_id = assembly.id,
        reference_id = result.reference_id,
        reference = %reference.label(),
        dx = result.dimensions.x,
        dy = result.dimensions.y,
        dz = result.dimensions.z,
        volume = result.volume,
        skipped = result.skipped.len(),
        "Minimum bounding box found"
    );

    Ok(result)
}

/// Load an assembly by id from a provider and search it.
pub fn find_assembly_bbox<P: AssemblyProvider + ?Sized>(
    provider: &P,
    assembly_id: u32,
    config: &SearchConfig,
) -> Result<MinBoundingBox> {
    let assembly = load_assembly(provider, assembly_id)?;
    find_min_bbox(&assembly, config)
}
