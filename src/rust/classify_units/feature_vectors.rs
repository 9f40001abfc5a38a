use log::warn;

use super::ClassifyUnit;
use crate::feature_units::FeatureUnits;
use crate::training::Model;

/// Vectorizes the feature-units of `cu` with the model's vectorizer.
///
/// On failure the unit keeps no feature vector.
pub fn get_featurevectors(cu: &mut ClassifyUnit, model: &Model) {
    match model.featurevector(cu.featureunits()) {
        Ok(vector) => cu.featurevector = Some(vector),
        Err(e) => {
            warn!("Feature vector for paragraph '{}' failed: {}", cu.paragraph(), e);
            cu.featurevector = None;
        }
    }
}
