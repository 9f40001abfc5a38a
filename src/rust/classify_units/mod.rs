//! Classify-units: the per-paragraph records a job ad is split into, and the
//! single training unit every training sample carries.
//!
//! Units of job ads live in a [`UnitArena`]; a [`JobAd`] only holds the ids of
//! its children and all mutation goes through the arena.

pub mod feature_vectors;
pub mod manager;
pub mod paragraphs;

use ndarray::Array1;

use crate::feature_units::convert;
use crate::feature_units::FeatureUnits;

pub use manager::{classify, ClassifyUnitManager};
pub use paragraphs::{LineParagraphSplitter, ParagraphSplitter};

pub type ClassId = i64;

/// Class id of a unit nobody has classified yet.
pub const UNCLASSIFIED: ClassId = 0;

/// Index of a classify-unit inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

/// One paragraph of a job ad with its derived representations.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyUnit {
    paragraph: String,
    pub class_id: ClassId,
    featureunits: Vec<String>,
    pub featurevector: Option<Array1<f32>>,
}

impl ClassifyUnit {
    pub fn new(paragraph: impl Into<String>) -> Self {
        Self {
            paragraph: paragraph.into(),
            class_id: UNCLASSIFIED,
            featureunits: Vec::new(),
            featurevector: None,
        }
    }

    pub fn paragraph(&self) -> &str {
        &self.paragraph
    }

    /// Resets the feature-units to the cleaned paragraph.
    pub(crate) fn reseed(&mut self) {
        self.featureunits = vec![convert::replace(&self.paragraph)];
    }
}

impl FeatureUnits for ClassifyUnit {
    fn featureunits(&self) -> &[String] {
        &self.featureunits
    }

    fn set_featureunits(&mut self, fus: Vec<String>) {
        self.featureunits = fus;
    }
}

/// The classify-unit of a training sample. Its class id is the true label.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyUnitTrain {
    content: String,
    pub class_id: ClassId,
    featureunits: Vec<String>,
    pub featurevector: Option<Array1<f32>>,
}

impl ClassifyUnitTrain {
    pub fn new(content: impl Into<String>, class_id: ClassId) -> Self {
        Self {
            content: content.into(),
            class_id,
            featureunits: Vec::new(),
            featurevector: None,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl FeatureUnits for ClassifyUnitTrain {
    fn featureunits(&self) -> &[String] {
        &self.featureunits
    }

    fn set_featureunits(&mut self, fus: Vec<String>) {
        self.featureunits = fus;
    }
}

/// Owner of classify-units. Removed slots are never reused, so a stale
/// [`UnitId`] can only miss, never alias another unit.
#[derive(Debug, Default)]
pub struct UnitArena {
    slots: Vec<Option<ClassifyUnit>>,
}

impl UnitArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: ClassifyUnit) -> UnitId {
        self.slots.push(Some(unit));
        UnitId(self.slots.len() - 1)
    }

    pub fn get(&self, id: UnitId) -> Option<&ClassifyUnit> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut ClassifyUnit> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: UnitId) -> Option<ClassifyUnit> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    /// Number of live units
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A job advertisement and the ids of its classify-units, in paragraph order.
#[derive(Debug, Clone, PartialEq)]
pub struct JobAd {
    pub id: i64,
    pub content: String,
    children: Vec<UnitId>,
}

impl JobAd {
    pub fn new(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[UnitId] {
        &self.children
    }

    /// Iterates the live child units in order.
    pub fn units<'a>(&'a self, arena: &'a UnitArena) -> impl Iterator<Item = &'a ClassifyUnit> + 'a {
        self.children.iter().filter_map(move |&id| arena.get(id))
    }

    /// Finds the child whose paragraph equals `paragraph`.
    pub fn find_child(&self, arena: &UnitArena, paragraph: &str) -> Option<UnitId> {
        self.children
            .iter()
            .copied()
            .find(|&id| arena.get(id).map_or(false, |cu| cu.paragraph() == paragraph))
    }

    pub(crate) fn attach(&mut self, id: UnitId) {
        self.children.push(id);
    }

    /// Destroys every child unit.
    pub fn drop_children(&mut self, arena: &mut UnitArena) {
        for id in self.children.drain(..) {
            arena.remove(id);
        }
    }
}
