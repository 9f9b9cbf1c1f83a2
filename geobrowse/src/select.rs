//! Sublayer selection and layer materialization.
//!
//! A resolved source with several layers needs a decision about which of
//! them to load. [`plan_selection`] turns the source and the configured
//! prompt mode into a [`SelectionPlan`] the caller can act on without
//! this crate owning any user interface.

use tracing::warn;

use crate::backend::LayerKind;
use crate::config::PromptMode;
use crate::location::{parse_location, LocationParams};
use crate::source::DataSource;

/// One row of a sublayer choice presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SublayerInfo {
    pub id: usize,
    pub name: String,
    pub kind: LayerKind,
    pub description: String,
}

/// What to do with a resolved source's layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPlan {
    /// The source holds no layers; load nothing.
    Nothing,
    /// Load these layer names without asking.
    Auto(Vec<String>),
    /// Ask the user to choose among these sublayers.
    Choose(Vec<SublayerInfo>),
    /// Several layers exist but prompting is disabled; load nothing.
    Declined,
}

/// Decide how the layers of a source should be selected.
///
/// A single layer is always loaded without prompting, whatever the mode.
pub fn plan_selection(source: &DataSource, mode: PromptMode) -> SelectionPlan {
    let names: Vec<String> = source.layer_names().to_vec();
    match names.len() {
        0 => SelectionPlan::Nothing,
        1 => SelectionPlan::Auto(names),
        _ => match mode {
            PromptMode::All => SelectionPlan::Auto(names),
            PromptMode::Never => SelectionPlan::Declined,
            PromptMode::Ask => SelectionPlan::Choose(
                source
                    .iter()
                    .enumerate()
                    .map(|(id, layer)| SublayerInfo {
                        id,
                        name: layer.name.clone(),
                        kind: layer.kind,
                        description: layer.description.clone(),
                    })
                    .collect(),
            ),
        },
    }
}

/// A layer ready to hand to a map, detached from the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayer {
    pub name: String,
    pub uri: String,
    pub kind: LayerKind,
    pub backend_id: String,
    pub params: LocationParams,
}

/// Materialize the chosen layers of a source into loadable map layers.
///
/// Layers come out in reverse choice order, so that when the caller adds
/// them to a map top-down the first chosen layer ends up on top of the
/// stack. Names the source does not know are skipped with a warning.
pub fn materialize_layers(source: &DataSource, chosen: &[String]) -> Vec<MapLayer> {
    let mut layers = Vec::with_capacity(chosen.len());
    for name in chosen.iter().rev() {
        let Some(layer) = source.layer(name) else {
            warn!(name = %name, "skipping unknown layer name in selection");
            continue;
        };
        let parsed = parse_location(&layer.open_string);
        let uri = match layer.kind {
            // Raster parameters travel out-of-band; the open string is
            // reduced to its base.
            LayerKind::Raster => parsed.base.clone(),
            LayerKind::Vector => layer.open_string.clone(),
        };
        layers.push(MapLayer {
            name: layer.name.clone(),
            uri,
            kind: layer.kind,
            backend_id: layer.backend_id.clone(),
            params: parsed.params,
        });
    }
    layers
}
