//! Tracker core: pure job store, panel state machine and geometry helpers.
mod effect;
mod geometry;
mod job;
mod msg;
mod state;
mod store;
mod update;
mod view_model;

pub use effect::Effect;
pub use geometry::{
    layer_name, project_links, CoordinateConverter, Feature, FeatureCollection, Geometry,
    LinkRecord, Passthrough, ProjectionError, LAYER_PREFIX,
};
pub use job::{Job, JobId, JobStatus, UnknownStatus};
pub use msg::{ActionFailure, Msg};
pub use state::PanelState;
pub use store::JobSet;
pub use update::update;
pub use view_model::{JobRowView, PanelViewModel};
