mod action;
mod build_actions;
mod build_mapping;
mod files_mapping;
mod merge_dirs;

pub use self::{
    action::*, build_actions::*, build_mapping::*, files_mapping::*, merge_dirs::*,
};
