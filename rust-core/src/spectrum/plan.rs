//! Shared FFT plan cache
//!
//! Plans are expensive to build and cheap to share. Lookup and creation go
//! through one mutex; execution never does, because `rustfft` plans run through
//! `&self` and are `Send + Sync`. Every transform owns its own buffers and
//! scratch space, so concurrent execution of one plan is safe.

use crate::error::{AnalysisError, Result};
use log::debug;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::{Arc, Mutex};

/// Forward/inverse plan pair for one transform width
#[derive(Clone)]
pub struct TransformPlan {
    width: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl TransformPlan {
    /// Transform width (number of complex slots)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Forward (time → frequency) plan
    pub fn forward(&self) -> &Arc<dyn Fft<f64>> {
        &self.forward
    }

    /// Inverse (frequency → time) plan
    pub fn inverse(&self) -> &Arc<dyn Fft<f64>> {
        &self.inverse
    }

    /// Scratch length large enough for either direction
    pub fn scratch_len(&self) -> usize {
        self.forward
            .get_inplace_scratch_len()
            .max(self.inverse.get_inplace_scratch_len())
    }
}

/// Real-input plan pair, used by frequency-domain weighting
#[derive(Clone)]
pub struct RealTransformPlan {
    pub forward: Arc<dyn RealToComplex<f64>>,
    pub inverse: Arc<dyn ComplexToReal<f64>>,
}

/// Process-wide plan cache, passed explicitly to whoever builds transforms
pub struct PlanCache {
    planner: Mutex<FftPlanner<f64>>,
    real_planner: Mutex<RealFftPlanner<f64>>,
}

impl PlanCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
            real_planner: Mutex::new(RealFftPlanner::new()),
        }
    }

    /// Look up (or build) the plans for `width`
    ///
    /// Repeated calls for the same width return the same shared plans.
    pub fn plan(&self, width: usize) -> Result<TransformPlan> {
        if width == 0 {
            return Err(AnalysisError::InvalidWidth(width));
        }

        let mut planner = self
            .planner
            .lock()
            .map_err(|_| AnalysisError::PlanUnavailable("plan cache lock poisoned".into()))?;

        debug!("Planning complex FFT of width {}", width);
        let forward = planner.plan_fft_forward(width);
        let inverse = planner.plan_fft_inverse(width);

        Ok(TransformPlan {
            width,
            forward,
            inverse,
        })
    }
}

impl PlanCache {
    /// Look up (or build) the real-input plans for `width`
    pub fn real_plan(&self, width: usize) -> Result<RealTransformPlan> {
        if width == 0 {
            return Err(AnalysisError::InvalidWidth(width));
        }

        let mut planner = self
            .real_planner
            .lock()
            .map_err(|_| AnalysisError::PlanUnavailable("real plan cache lock poisoned".into()))?;

        debug!("Planning real FFT of width {}", width);
        Ok(RealTransformPlan {
            forward: planner.plan_fft_forward(width),
            inverse: planner.plan_fft_inverse(width),
        })
    }
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new()
    }
}
