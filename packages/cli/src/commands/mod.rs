pub mod edit;
pub mod info;
pub mod projects;
pub mod transfer;

pub use edit::{redo, set, undo, SetArgs};
pub use info::{migrate, templates};
pub use projects::{
    delete, duplicate, list, new, rename, show, switch, DeleteArgs, DuplicateArgs, NewArgs,
    RenameArgs, ShowArgs, SwitchArgs,
};
pub use transfer::{export, import, ExportArgs, ImportArgs};
