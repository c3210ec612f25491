use thiserror::Error;

use crate::model::{CefrLevelParseError, ModuleNameParseError, RegisterError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    ModuleName(#[from] ModuleNameParseError),
    #[error(transparent)]
    CefrLevel(#[from] CefrLevelParseError),
}
