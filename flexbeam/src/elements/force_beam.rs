//! Force-based beam-column element
//!
//! The element interpolates section forces from its basic forces, so
//! equilibrium along the element is exact and compatibility is enforced
//! iteratively by [`CompatibilityIterator`].

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ElementFamily, SectionSample, SectionStore};
use crate::analysis::compatibility::{BasicState, LoadOffsets};
use crate::analysis::{CompatibilityIterator, IterationOptions, IterationReport};
use crate::error::{FlexError, FlexResult};
use crate::integration::BeamIntegration;
use crate::loads::ElementLoad;
use crate::math::{Mat, Vec};
use crate::sections::SectionResponse;
use crate::transform::CrdTransformation;

/// Where the element is in its trial / committed lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Never updated since construction or `revert_to_start`
    Uninitialized,
    /// Trial state is compatible with the last update
    Converged,
    /// Committed state was loaded from a snapshot; sections must be
    /// re-evaluated before the next update
    RestoredNeedsRecompute,
}

/// Serializable snapshot of an element's committed state
///
/// Sections are re-evaluated at the stored committed deformations when the
/// snapshot is restored. Sections with their own history must be restored
/// by their owner beforehand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    pub tag: usize,
    pub committed: BasicState,
}

/// Force-based (flexibility) beam-column element
#[derive(Debug, Clone)]
pub struct ForceBeamColumn {
    tag: usize,
    transformation: Box<dyn CrdTransformation>,
    integration: Box<dyn BeamIntegration>,
    store: SectionStore,
    iterator: CompatibilityIterator,
    trial: BasicState,
    committed: BasicState,
    loads: LoadOffsets,
    lifecycle: Lifecycle,
    /// Nodal stiffness from the initial section flexibilities
    initial_stiffness: Mat,
    last_report: Option<IterationReport>,
}

impl ForceBeamColumn {
    /// Create an element from its geometry, integration scheme and sections
    ///
    /// Fails with a configuration error for a zero length, an empty or
    /// unsuitable section list, a transformation whose basic or nodal size
    /// does not match its family, an integration scheme that does not fit
    /// the length, or a singular initial flexibility.
    pub fn new(
        tag: usize,
        transformation: Box<dyn CrdTransformation>,
        integration: Box<dyn BeamIntegration>,
        sections: std::vec::Vec<Box<dyn SectionResponse>>,
        options: IterationOptions,
    ) -> FlexResult<Self> {
        let family = transformation.family();
        if transformation.nebd() != family.nebd() {
            return Err(FlexError::Configuration(format!(
                "element {}: transformation has {} basic freedoms, {:?} elements need {}",
                tag,
                transformation.nebd(),
                family,
                family.nebd()
            )));
        }
        let num_dofs = 2 * family.dofs_per_node();
        if transformation.num_dofs() != num_dofs {
            return Err(FlexError::Configuration(format!(
                "element {}: transformation has {} nodal freedoms, {:?} elements need {}",
                tag,
                transformation.num_dofs(),
                family,
                num_dofs
            )));
        }
        let length = transformation.initial_length();
        if !(length > 0.0) || !length.is_finite() {
            return Err(FlexError::Configuration(format!(
                "element {} has length {}",
                tag, length
            )));
        }
        if sections.is_empty() {
            return Err(FlexError::Configuration(format!("element {} has no sections", tag)));
        }
        integration.check_sections(sections.len())?;
        integration.check_length(length)?;
        if let Some(i) = sections.iter().position(|s| s.order() == 0) {
            return Err(FlexError::Configuration(format!(
                "element {}: section {} has no response components",
                tag, i
            )));
        }

        let n = sections.len();
        let locations = integration.section_locations(n, length)?;
        let weights = integration.section_weights(n, length)?;
        let mut elastic_flexibility = Mat::zeros(family.nebd(), family.nebd());
        integration.add_elastic_flexibility(family, length, &mut elastic_flexibility);

        let store = SectionStore::new(sections);
        let codes: std::vec::Vec<_> = (0..n).map(|i| store.codes(i)).collect();
        let initial_flexibility: std::vec::Vec<Mat> = (0..n).map(|i| store.initial_flexibility(i)).collect();

        let iterator = CompatibilityIterator::new(
            family,
            length,
            &codes,
            &locations,
            &weights,
            initial_flexibility.clone(),
            elastic_flexibility,
            options,
        )?;

        let samples = (0..n)
            .map(|i| SectionSample::new(store.codes(i), locations[i], weights[i], initial_flexibility[i].clone()))
            .collect();
        let loads = LoadOffsets::unloaded(family, (0..n).map(|i| store.codes(i).len()));
        let trial = iterator.initial_state(samples)?;
        let initial_stiffness = transformation.initial_global_stiffness(&trial.stiffness);

        debug!(
            "element {}: {:?}, L = {}, {} sections, {} integration",
            tag,
            family,
            length,
            n,
            integration.name()
        );

        Ok(Self {
            tag,
            transformation,
            integration,
            store,
            iterator,
            committed: trial.clone(),
            trial,
            loads,
            lifecycle: Lifecycle::Uninitialized,
            initial_stiffness,
            last_report: None,
        })
    }

    pub fn tag(&self) -> usize {
        self.tag
    }

    pub fn family(&self) -> ElementFamily {
        self.iterator.family()
    }

    pub fn length(&self) -> f64 {
        self.iterator.length()
    }

    pub fn num_sections(&self) -> usize {
        self.store.len()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Update the element to trial nodal displacements
    ///
    /// On failure every part of the element, the transformation included,
    /// is left as it was before the call.
    pub fn update(&mut self, nodal: &Vec) -> FlexResult<()> {
        if self.lifecycle == Lifecycle::RestoredNeedsRecompute {
            self.revert_to_last_commit()?;
        }

        let saved = self.transformation.clone();
        self.transformation.update(nodal)?;
        let v = self.transformation.basic_trial_displacement();

        match self.iterator.solve(&mut self.store, &mut self.trial, &v, &self.loads) {
            Ok(report) => {
                self.loads.changed = false;
                self.last_report = Some(report);
                self.lifecycle = Lifecycle::Converged;
                Ok(())
            }
            Err(err) => {
                self.transformation = saved;
                Err(err)
            }
        }
    }

    /// Nodal resisting forces, including basic reaction offsets
    pub fn resisting_force(&self) -> Vec {
        self.transformation
            .global_resisting_force(&self.trial.force, &self.loads.p0)
    }

    /// Nodal tangent stiffness
    pub fn tangent_stiff(&self) -> Mat {
        self.transformation
            .global_stiffness(&self.trial.stiffness, &self.trial.force)
    }

    /// Nodal stiffness from the initial section flexibilities
    pub fn initial_stiff(&self) -> Mat {
        self.initial_stiffness.clone()
    }

    /// Accept the trial state
    ///
    /// Sections are committed on a copy of the store, which replaces the
    /// element's sections only once every commit succeeded. A failed
    /// commit leaves the element and all of its sections unchanged.
    pub fn commit_state(&mut self) -> FlexResult<()> {
        let mut staged = self.store.clone();
        for i in 0..staged.len() {
            staged.commit(i)?;
        }
        self.store = staged;
        self.trial.commit_samples();
        self.committed = self.trial.clone();
        self.transformation.commit_state();
        Ok(())
    }

    /// Discard the trial state and re-evaluate sections at their committed
    /// deformations
    pub fn revert_to_last_commit(&mut self) -> FlexResult<()> {
        for i in 0..self.store.len() {
            self.store.revert_to_last_commit(i)?;
        }

        let mut state = self.committed.clone();
        for (i, sample) in state.samples.iter_mut().enumerate() {
            sample.trial_deformation.copy_from(&sample.committed_deformation);
            let (resultant, flexibility) = self.store.set_trial_deformation(i, &sample.trial_deformation)?;
            sample.trial_resultant = resultant;
            sample.flexibility = flexibility;
        }
        self.trial = state;
        self.transformation.revert_to_last_commit();

        if self.lifecycle == Lifecycle::RestoredNeedsRecompute {
            self.lifecycle = Lifecycle::Converged;
        }
        Ok(())
    }

    /// Return to the unstressed state
    pub fn revert_to_start(&mut self) -> FlexResult<()> {
        for i in 0..self.store.len() {
            self.store.revert_to_start(i)?;
        }
        let mut samples = std::mem::take(&mut self.trial.samples);
        for (i, sample) in samples.iter_mut().enumerate() {
            sample.reset(self.iterator.initial_section_flexibility(i).clone());
        }
        self.trial = self.iterator.initial_state(samples)?;
        self.committed = self.trial.clone();
        self.transformation.revert_to_start();
        self.lifecycle = Lifecycle::Uninitialized;
        self.last_report = None;
        Ok(())
    }

    /// Remove all element loads
    pub fn zero_load(&mut self) {
        self.loads.clear();
    }

    /// Add `factor` times `load`
    pub fn add_load(&mut self, load: &ElementLoad, factor: f64) -> FlexResult<()> {
        let family = self.family();
        let length = self.length();
        load.validate(family)?;

        let mut v0 = self.loads.v0.clone();
        self.integration
            .add_elastic_deformations(family, load, factor, length, &mut v0)?;
        if let Some(v) = load.basic_deformation() {
            v0 += Vec::from_row_slice(v) * factor;
        }

        for (sp, sample) in self.loads.section_forces.iter_mut().zip(&self.trial.samples) {
            *sp += load.section_forces(family, &sample.codes, sample.location, length, factor);
        }
        load.add_reactions(family, length, factor, &mut self.loads.p0);
        self.loads.v0 = v0;
        self.loads.changed = true;
        Ok(())
    }

    /// Basic forces `Se`
    pub fn basic_force(&self) -> &Vec {
        &self.trial.force
    }

    /// Basic stiffness `kv`
    pub fn basic_stiffness(&self) -> &Mat {
        &self.trial.stiffness
    }

    /// Basic flexibility `f`
    pub fn basic_flexibility(&self) -> &Mat {
        &self.trial.flexibility
    }

    /// Basic deformation `v` of the trial state
    pub fn basic_deformation(&self) -> &Vec {
        &self.trial.deformation
    }

    /// Basic deformation not recovered by elastic unloading
    pub fn plastic_deformation(&self) -> Vec {
        &self.trial.deformation - self.iterator.initial_basic_flexibility() * &self.trial.force
    }

    /// Trial deformation of section `i`
    pub fn section_deformation(&self, i: usize) -> Option<&Vec> {
        self.trial.samples.get(i).map(|s| &s.trial_deformation)
    }

    /// Trial resultant of section `i`
    pub fn section_resultant(&self, i: usize) -> Option<&Vec> {
        self.trial.samples.get(i).map(|s| &s.trial_resultant)
    }

    /// Section samples of the trial state
    pub fn samples(&self) -> &[SectionSample] {
        &self.trial.samples
    }

    /// Distances of the sections from node i
    pub fn integration_points(&self) -> std::vec::Vec<f64> {
        let length = self.length();
        self.trial.samples.iter().map(|s| s.location * length).collect()
    }

    /// Section weights as fractions of the length
    pub fn integration_weights(&self) -> std::vec::Vec<f64> {
        self.trial.samples.iter().map(|s| s.weight).collect()
    }

    /// Diagnostics of the last successful update
    pub fn last_report(&self) -> Option<&IterationReport> {
        self.last_report.as_ref()
    }

    /// Snapshot of the committed state
    pub fn state(&self) -> ElementState {
        ElementState {
            tag: self.tag,
            committed: self.committed.clone(),
        }
    }

    /// Load a committed state snapshot
    ///
    /// The trial state becomes the snapshot; sections are re-evaluated on
    /// the next update or revert. Every vector and matrix of the snapshot
    /// must have the size this element uses.
    pub fn restore_state(&mut self, state: ElementState) -> FlexResult<()> {
        let nebd = self.family().nebd();
        let restored = state.committed;
        check_len(restored.force.len(), nebd)?;
        check_len(restored.deformation.len(), nebd)?;
        check_shape(&restored.stiffness, nebd)?;
        check_shape(&restored.flexibility, nebd)?;
        if restored.samples.len() != self.store.len() {
            return Err(FlexError::DimensionMismatch {
                expected: self.store.len(),
                found: restored.samples.len(),
            });
        }
        for (i, sample) in restored.samples.iter().enumerate() {
            if sample.codes.as_slice() != self.store.codes(i) {
                return Err(FlexError::InvalidInput(format!(
                    "snapshot section {} has codes {:?}, element has {:?}",
                    i,
                    sample.codes,
                    self.store.codes(i)
                )));
            }
            let order = sample.order();
            check_len(sample.committed_deformation.len(), order)?;
            check_len(sample.trial_deformation.len(), order)?;
            check_len(sample.committed_resultant.len(), order)?;
            check_len(sample.trial_resultant.len(), order)?;
            check_shape(&sample.flexibility, order)?;
        }

        self.trial = restored.clone();
        self.committed = restored;
        self.lifecycle = Lifecycle::RestoredNeedsRecompute;
        self.last_report = None;
        Ok(())
    }
}

fn check_len(found: usize, expected: usize) -> FlexResult<()> {
    if found != expected {
        return Err(FlexError::DimensionMismatch { expected, found });
    }
    Ok(())
}

fn check_shape(m: &Mat, expected: usize) -> FlexResult<()> {
    check_len(m.nrows(), expected)?;
    check_len(m.ncols(), expected)
}
