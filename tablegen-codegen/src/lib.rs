//! Generation planning and code emission for tablegen.
//!
//! [`plan`] turns introspected schema metadata plus per-table options into a
//! deterministic [`GenerationPlan`]; [`emit`] realizes a plan as Rust service
//! modules, owning only the marker-delimited regions inside each file.

mod emit;
mod markers;
mod naming;
mod plan;
mod render;
mod type_map;

pub use emit::{ConflictReason, EmitReport, Emitter, PreviewFile, WriteConflict, emit, preview};
pub use markers::{ManagedFile, MarkerError, Region, Segment, checksum};
pub use naming::{field_ident, struct_name};
pub use plan::{GenerationPlan, Mode, PlanEntry, PlanError, TablePlan, plan};
pub use render::render_table;
pub use type_map::{field_type, rust_type};
