// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Search configuration, optionally loaded from environment variables.

use ifc_bbox_geometry::{ColumnOrder, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Bounding box search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Evaluate candidate frames on the rayon pool.
    pub parallel: bool,
    /// Run on a dedicated pool with this many threads instead of the global one.
    pub worker_threads: Option<usize>,
    /// Length below which a placement direction counts as zero or parallel.
    pub tolerance: f64,
    /// Column order for every part's local-to-global frame.
    pub part_order: ColumnOrder,
    /// Column order for the candidate reference frame.
    ///
    /// Setting this to [`ColumnOrder::AxisFirst`] while `part_order` stays
    /// [`ColumnOrder::Placement`] reproduces the asymmetric frames of older
    /// results. Compatibility shim only.
    pub reference_order: ColumnOrder,
}

impl SearchConfig {
    /// Load configuration from environment variables.
    ///
    /// - `IFC_BBOX_PARALLEL` (`true`/`false`, `1`/`0`)
    /// - `IFC_BBOX_WORKER_THREADS`
    /// - `IFC_BBOX_TOLERANCE`
    /// - `IFC_BBOX_REFERENCE_ORDER` (`placement` or `axis-first`)
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            parallel: lookup("IFC_BBOX_PARALLEL")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.parallel),
            worker_threads: lookup("IFC_BBOX_WORKER_THREADS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0),
            tolerance: lookup("IFC_BBOX_TOLERANCE")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|t| t.is_finite() && *t >= 0.0)
                .unwrap_or(defaults.tolerance),
            part_order: defaults.part_order,
            reference_order: lookup("IFC_BBOX_REFERENCE_ORDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reference_order),
        }
    }

    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_reference_order(mut self, order: ColumnOrder) -> Self {
        self.reference_order = order;
        self
    }

    pub fn with_part_order(mut self, order: ColumnOrder) -> Self {
        self.part_order = order;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            worker_threads: None,
            tolerance: DEFAULT_TOLERANCE,
            part_order: ColumnOrder::Placement,
            reference_order: ColumnOrder::Placement,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
