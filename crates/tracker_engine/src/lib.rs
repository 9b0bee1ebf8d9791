//! Tracker engine: remote calls, polling loop and user actions.
mod controller;
mod gate;
mod layer;
mod poller;
mod projector;
mod rpc;
mod single_point;
mod tracker;
mod types;
mod wire;

pub use controller::{CalculationRequest, LifecycleController};
pub use gate::{augment, ParameterGate, ParameterSet, SharedParameters};
pub use layer::{DisplayedLayer, LayerSink};
pub use poller::{CycleReport, Poller, PollerHandle, POLL_INTERVAL};
pub use projector::{ResultProjector, Toggle};
pub use rpc::{ReqwestRpcClient, RpcClient, RpcSettings};
pub use single_point::{
    decode_profile, LinkProfile, ProfilePoint, ProfileRow, SinglePointCalculator, SinglePointRequest,
};
pub use tracker::{SharedPanel, Tracker};
pub use types::{ActionError, BlockReason, Route, RpcError};
pub use wire::{decode_job, decode_job_list, decode_results, WireError};
