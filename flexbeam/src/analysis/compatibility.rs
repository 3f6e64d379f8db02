//! Compatibility iteration for force-based elements
//!
//! Given a target basic deformation, find basic forces whose interpolated
//! section forces produce section deformations that integrate back to the
//! target. Each sub-increment is tried with the modes of
//! [`IterationMode::SEQUENCE`]; when all of them fail the increment is
//! divided and retried.
//!
//! Attempts work on value copies of the element state. The caller's state
//! is replaced only when the whole increment has been absorbed.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::{IterationMode, IterationOptions};
use crate::elements::{ElementFamily, ResponseCode, SectionSample, SectionStore};
use crate::error::{FlexError, FlexResult};
use crate::math::{invert, Mat, Vec};

/// Basic state of an element together with its section samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicState {
    /// Basic deformation `v` this state is compatible with
    pub deformation: Vec,
    /// Basic forces `Se`
    pub force: Vec,
    /// Basic stiffness `kv`
    pub stiffness: Mat,
    /// Basic flexibility `f`, the inverse of `kv`
    pub flexibility: Mat,
    /// Section samples, one per integration point
    pub samples: std::vec::Vec<SectionSample>,
}

impl BasicState {
    /// Commit every sample
    pub fn commit_samples(&mut self) {
        self.samples.iter_mut().for_each(SectionSample::commit);
    }
}

/// Element load contributions seen by the iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOffsets {
    /// Section forces of the simply supported basic system, one per sample
    pub section_forces: std::vec::Vec<Vec>,
    /// Basic deformation offsets `v0`
    pub v0: Vec,
    /// Basic reaction offsets `p0`
    pub p0: Vec,
    /// Set when the offsets change; cleared once a state compatible with
    /// them has been found
    #[serde(default)]
    pub changed: bool,
}

impl LoadOffsets {
    /// No load on an element with the given sample orders
    pub fn unloaded(family: ElementFamily, orders: impl IntoIterator<Item = usize>) -> Self {
        Self {
            section_forces: orders.into_iter().map(Vec::zeros).collect(),
            v0: Vec::zeros(family.nebd()),
            p0: Vec::zeros(family.reaction_len()),
            changed: false,
        }
    }

    /// Clear every contribution
    pub fn clear(&mut self) {
        self.section_forces.iter_mut().for_each(|sp| sp.fill(0.0));
        self.v0.fill(0.0);
        self.p0.fill(0.0);
        self.changed = true;
    }

    /// Whether any section carries load
    pub fn has_section_forces(&self) -> bool {
        self.section_forces.iter().any(|sp| sp.iter().any(|&v| v != 0.0))
    }

    /// Whether the loads alone call for an iteration at zero increment
    pub fn is_pending(&self) -> bool {
        self.changed || self.has_section_forces()
    }
}

/// Diagnostics of one successful compatibility iteration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationReport {
    /// Highest subdivision level reached (1 when no subdivision occurred)
    pub max_subdivision_level: usize,
    /// Number of accepted sub-increments
    pub substeps: usize,
    /// Passes over the sections, failed attempts included
    pub total_passes: usize,
    /// Mode that converged the last sub-increment
    pub last_mode: Option<IterationMode>,
    /// `|dW|` after each pass of the last accepted sub-increment
    pub energy_history: std::vec::Vec<f64>,
}

enum Attempt {
    Converged {
        state: BasicState,
        history: std::vec::Vec<f64>,
        passes: usize,
    },
    Exhausted {
        energy: f64,
        passes: usize,
    },
}

/// Compatibility solver bound to one element's geometry and sections
#[derive(Debug, Clone)]
pub struct CompatibilityIterator {
    family: ElementFamily,
    length: f64,
    options: IterationOptions,
    /// Force interpolation matrix of every sample
    interpolation: std::vec::Vec<Mat>,
    /// Sample weights times the length
    lengths: std::vec::Vec<f64>,
    initial_flexibility: std::vec::Vec<Mat>,
    /// Flexibility of any region integrated in closed form
    elastic_flexibility: Mat,
}

impl CompatibilityIterator {
    /// Bind the iteration to an element
    ///
    /// `codes`, `locations`, `weights` and `initial_flexibility` hold one
    /// entry per section sample.
    pub fn new(
        family: ElementFamily,
        length: f64,
        codes: &[&[ResponseCode]],
        locations: &[f64],
        weights: &[f64],
        initial_flexibility: std::vec::Vec<Mat>,
        elastic_flexibility: Mat,
        options: IterationOptions,
    ) -> FlexResult<Self> {
        options.validate()?;
        if !(length > 0.0) {
            return Err(FlexError::Configuration(format!(
                "element length must be positive, got {}",
                length
            )));
        }
        let n = codes.len();
        if locations.len() != n || weights.len() != n || initial_flexibility.len() != n {
            return Err(FlexError::Configuration(format!(
                "{} sections but {} locations, {} weights and {} flexibilities",
                n,
                locations.len(),
                weights.len(),
                initial_flexibility.len()
            )));
        }
        let nebd = family.nebd();
        if elastic_flexibility.shape() != (nebd, nebd) {
            return Err(FlexError::DimensionMismatch {
                expected: nebd,
                found: elastic_flexibility.nrows(),
            });
        }
        for (i, (c, fs)) in codes.iter().zip(&initial_flexibility).enumerate() {
            if fs.shape() != (c.len(), c.len()) {
                return Err(FlexError::Configuration(format!(
                    "section {} has order {} but a {}x{} flexibility",
                    i,
                    c.len(),
                    fs.nrows(),
                    fs.ncols()
                )));
            }
        }

        let interpolation = codes
            .iter()
            .zip(locations)
            .map(|(c, &xi)| family.force_interpolation(c, xi, length))
            .collect();
        let lengths = weights.iter().map(|w| w * length).collect();

        Ok(Self {
            family,
            length,
            options,
            interpolation,
            lengths,
            initial_flexibility,
            elastic_flexibility,
        })
    }

    pub fn family(&self) -> ElementFamily {
        self.family
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn options(&self) -> &IterationOptions {
        &self.options
    }

    /// Initial flexibility of sample `i`
    pub fn initial_section_flexibility(&self, i: usize) -> &Mat {
        &self.initial_flexibility[i]
    }

    /// Integrate the basic flexibility `f = Σ w L bᵀ F b` plus the
    /// closed-form contribution
    pub fn integrate_flexibility<'m>(&self, section_flexibility: impl IntoIterator<Item = &'m Mat>) -> Mat {
        let mut f = self.elastic_flexibility.clone();
        for ((b, fs), wl) in self
            .interpolation
            .iter()
            .zip(section_flexibility)
            .zip(&self.lengths)
        {
            f += b.tr_mul(&(fs * b)) * *wl;
        }
        f
    }

    /// Basic flexibility of the virgin element
    pub fn initial_basic_flexibility(&self) -> Mat {
        self.integrate_flexibility(&self.initial_flexibility)
    }

    /// Virgin basic state with the given samples
    pub fn initial_state(&self, samples: std::vec::Vec<SectionSample>) -> FlexResult<BasicState> {
        let flexibility = self.initial_basic_flexibility();
        let stiffness = invert(&flexibility).ok_or_else(|| {
            FlexError::Configuration("initial element flexibility is singular".to_string())
        })?;
        let nebd = self.family.nebd();
        Ok(BasicState {
            deformation: Vec::zeros(nebd),
            force: Vec::zeros(nebd),
            stiffness,
            flexibility,
            samples,
        })
    }

    /// Bring `state` into compatibility with the basic deformation `target`
    ///
    /// On success `state` holds the converged values and the sections hold
    /// the matching trial deformations. On failure `state` is untouched and
    /// its trial deformations are pushed back into the sections.
    pub fn solve(
        &self,
        store: &mut SectionStore,
        state: &mut BasicState,
        target: &Vec,
        loads: &LoadOffsets,
    ) -> FlexResult<IterationReport> {
        let nebd = self.family.nebd();
        if target.len() != nebd {
            return Err(FlexError::DimensionMismatch {
                expected: nebd,
                found: target.len(),
            });
        }

        let dv = target - &state.deformation;
        if dv.norm() <= f64::EPSILON && !loads.is_pending() {
            return Ok(IterationReport {
                max_subdivision_level: 1,
                ..IterationReport::default()
            });
        }

        match self.subdivide(store, state, dv, loads) {
            Ok((converged, report)) => {
                *state = converged;
                Ok(report)
            }
            Err(err) => {
                warn!("compatibility iteration failed: {}", err);
                if let Err(restore) = push_samples(store, &state.samples) {
                    warn!("sections could not be restored after failure: {}", restore);
                }
                Err(err)
            }
        }
    }

    fn subdivide(
        &self,
        store: &mut SectionStore,
        start: &BasicState,
        dv: Vec,
        loads: &LoadOffsets,
    ) -> FlexResult<(BasicState, IterationReport)> {
        let mut current = start.clone();
        let mut remaining = dv.clone();
        let mut dv_trial = dv;
        let mut level = 1;
        let mut report = IterationReport {
            max_subdivision_level: 1,
            ..IterationReport::default()
        };

        loop {
            let mut energy = f64::INFINITY;
            let mut accepted = None;

            for mode in IterationMode::SEQUENCE {
                match self.attempt(mode, store, &current, &dv_trial, loads) {
                    Ok(Attempt::Converged { state, history, passes }) => {
                        report.total_passes += passes;
                        report.last_mode = Some(mode);
                        report.energy_history = history;
                        accepted = Some(state);
                        break;
                    }
                    Ok(Attempt::Exhausted { energy: last, passes }) => {
                        report.total_passes += passes;
                        energy = last;
                        debug!("{:?} exhausted its budget at level {} (|dW| = {:e})", mode, level, last);
                    }
                    Err(err) if err.is_recoverable() => {
                        debug!("{:?} attempt failed at level {}: {}", mode, level, err);
                    }
                    Err(err) => return Err(err),
                }
            }

            match accepted {
                Some(state) => {
                    current = state;
                    report.substeps += 1;
                    remaining -= &dv_trial;
                    if remaining.norm() <= f64::EPSILON * (1.0 + current.deformation.norm()) {
                        return Ok((current, report));
                    }
                    dv_trial = remaining.clone();
                    level = 1;
                }
                None => {
                    level += 1;
                    if level > self.options.max_subdivisions {
                        return Err(FlexError::NonConvergence {
                            subdivisions: level - 1,
                            energy,
                        });
                    }
                    dv_trial /= self.options.subdivision_factor;
                    report.max_subdivision_level = report.max_subdivision_level.max(level);
                    debug!("subdividing increment to level {}", level);
                }
            }
        }
    }

    /// One mode on one sub-increment, starting from `start`
    fn attempt(
        &self,
        mode: IterationMode,
        store: &mut SectionStore,
        start: &BasicState,
        dv_trial: &Vec,
        loads: &LoadOffsets,
    ) -> FlexResult<Attempt> {
        let mut work = start.clone();
        let v_target = &start.deformation + dv_trial;
        let mut se = &start.force + &start.stiffness * dv_trial;
        let mut history = std::vec::Vec::new();
        let mut energy = f64::INFINITY;
        let budget = self.options.budget(mode);

        for pass in 0..budget {
            let use_initial = mode.uses_initial_flexibility(pass);
            let mut f = self.elastic_flexibility.clone();
            let mut vr = loads.v0.clone();

            for (i, sample) in work.samples.iter_mut().enumerate() {
                let b = &self.interpolation[i];
                let mut s = b * &se;
                if let Some(sp) = loads.section_forces.get(i) {
                    s += sp;
                }

                let ds = &s - &sample.trial_resultant;
                let de = if use_initial {
                    &self.initial_flexibility[i] * &ds
                } else {
                    &sample.flexibility * &ds
                };
                sample.trial_deformation += de;

                let (resultant, flexibility) = store.set_trial_deformation(i, &sample.trial_deformation)?;
                sample.trial_resultant = resultant;
                sample.flexibility = flexibility;

                let wl = self.lengths[i];
                f += b.tr_mul(&(&sample.flexibility * b)) * wl;
                let residual = &sample.flexibility * (&s - &sample.trial_resultant);
                vr += b.tr_mul(&(&sample.trial_deformation + residual)) * wl;
            }

            let kv = invert(&f).ok_or(FlexError::SingularFlexibility)?;
            let dv_total = &v_target - &vr;
            let dse = &kv * &dv_total;
            se += &dse;
            let dw = dv_total.dot(&dse);
            energy = dw.abs();
            history.push(energy);
            trace!("{:?} pass {}: |dW| = {:e}", mode, pass, energy);

            if energy < self.options.tolerance {
                work.deformation = v_target;
                work.force = se;
                work.stiffness = kv;
                work.flexibility = f;
                return Ok(Attempt::Converged {
                    state: work,
                    history,
                    passes: pass + 1,
                });
            }
        }

        Ok(Attempt::Exhausted {
            energy,
            passes: budget,
        })
    }
}

/// Push every sample's trial deformation back into its section
pub fn push_samples(store: &mut SectionStore, samples: &[SectionSample]) -> FlexResult<()> {
    for (i, sample) in samples.iter().enumerate() {
        store.set_trial_deformation(i, &sample.trial_deformation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{BilinearSection, ElasticSection, SectionResponse};
    use approx::assert_relative_eq;

    const CODES: [ResponseCode; 2] = [ResponseCode::Axial, ResponseCode::MomentZ];

    fn setup(
        sections: std::vec::Vec<Box<dyn SectionResponse>>,
        options: IterationOptions,
    ) -> (CompatibilityIterator, SectionStore, BasicState) {
        let locations = [0.0, 1.0];
        let weights = [0.5, 0.5];
        let flex: std::vec::Vec<Mat> = sections.iter().map(|s| s.initial_flexibility()).collect();
        let codes: std::vec::Vec<&[ResponseCode]> = vec![&CODES, &CODES];
        let iter = CompatibilityIterator::new(
            ElementFamily::Planar,
            2.0,
            &codes,
            &locations,
            &weights,
            flex.clone(),
            Mat::zeros(3, 3),
            options,
        )
        .unwrap();
        let samples = flex
            .into_iter()
            .zip(locations.iter().zip(&weights))
            .map(|(f, (&x, &w))| SectionSample::new(&CODES, x, w, f))
            .collect();
        let state = iter.initial_state(samples).unwrap();
        (iter, SectionStore::new(sections), state)
    }

    fn elastic() -> std::vec::Vec<Box<dyn SectionResponse>> {
        vec![
            Box::new(ElasticSection::planar(100.0, 10.0).unwrap()),
            Box::new(ElasticSection::planar(100.0, 10.0).unwrap()),
        ]
    }

    fn yielding() -> std::vec::Vec<Box<dyn SectionResponse>> {
        let section = BilinearSection::new()
            .with_component(ResponseCode::Axial, 100.0, 1.0, 0.05)
            .unwrap()
            .with_component(ResponseCode::MomentZ, 10.0, 0.5, 0.02)
            .unwrap();
        vec![Box::new(section.clone()), Box::new(section)]
    }

    #[test]
    fn test_elastic_converges_in_one_pass() {
        let (iter, mut store, mut state) = setup(elastic(), IterationOptions::default());
        let loads = LoadOffsets::unloaded(ElementFamily::Planar, [2, 2]);
        let report = iter
            .solve(&mut store, &mut state, &Vec::from_vec(vec![0.01, 0.0, 0.0]), &loads)
            .unwrap();
        assert_eq!(report.substeps, 1);
        assert_eq!(report.last_mode, Some(IterationMode::Newton));
        assert!(report.energy_history.len() <= 2);
        // EA / L
        assert_relative_eq!(state.force[0], 100.0 / 2.0 * 0.01, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_increment_is_noop() {
        let (iter, mut store, mut state) = setup(elastic(), IterationOptions::default());
        let loads = LoadOffsets::unloaded(ElementFamily::Planar, [2, 2]);
        let before = state.clone();
        let report = iter.solve(&mut store, &mut state, &Vec::zeros(3), &loads).unwrap();
        assert_eq!(report.total_passes, 0);
        assert_eq!(state, before);
    }

    #[test]
    fn test_yielding_state_is_compatible() {
        let (iter, mut store, mut state) = setup(yielding(), IterationOptions::default());
        let loads = LoadOffsets::unloaded(ElementFamily::Planar, [2, 2]);
        let target = Vec::from_vec(vec![0.05, 0.2, -0.1]);
        iter.solve(&mut store, &mut state, &target, &loads).unwrap();

        // Section forces follow the interpolated basic forces
        for (i, sample) in state.samples.iter().enumerate() {
            let s = &iter.interpolation[i] * &state.force;
            assert_relative_eq!(s, sample.trial_resultant, epsilon = 1e-4);
        }
        assert_relative_eq!(state.deformation, target);
        assert!(state.force[0] > 1.0);
    }

    #[test]
    fn test_failure_leaves_state_untouched() {
        let options = IterationOptions::default()
            .with_max_iterations(1)
            .with_initial_tangent_factor(1)
            .with_max_subdivisions(1);
        let (iter, mut store, mut state) = setup(yielding(), options);
        let loads = LoadOffsets::unloaded(ElementFamily::Planar, [2, 2]);
        let before = state.clone();
        let err = iter
            .solve(&mut store, &mut state, &Vec::from_vec(vec![0.2, 0.5, 0.5]), &loads)
            .unwrap_err();
        assert!(matches!(err, FlexError::NonConvergence { subdivisions: 1, .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_mismatched_inputs() {
        let codes: std::vec::Vec<&[ResponseCode]> = vec![&CODES];
        let err = CompatibilityIterator::new(
            ElementFamily::Planar,
            1.0,
            &codes,
            &[0.5, 0.6],
            &[1.0],
            vec![Mat::identity(2, 2)],
            Mat::zeros(3, 3),
            IterationOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FlexError::Configuration(_)));
    }
}
