mod dialog;
mod module_flow;
mod router;
pub(crate) mod widgets;

pub use dialog::{
    ButtonStyle, DialogButton, DialogKind, DialogOutcome, DialogRequest, DialogService,
    DialogState, PendingDialog,
};
pub use module_flow::{ModuleContent, ModuleFlowVm, format_clock, next_module};
pub use router::{RoutePhase, RouterTimings, ViewId, ViewRouter, guard};
pub use widgets::{AudioProgress, Dropdown, WordCountVm, WordRange, word_count};
