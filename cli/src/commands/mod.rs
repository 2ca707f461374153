mod entry;
mod helpers;
mod view;

pub(crate) use entry::{cmd_add, cmd_clear, cmd_delete};
pub(crate) use view::{cmd_summary, cmd_view};
