//! IMAP command handlers for the fake server.
//!
//! Each module processes the commands a synchronization run issues:
//! LOGIN, LIST, SELECT and UID FETCH, plus the any-state commands
//! CAPABILITY, NOOP and LOGOUT.

mod anystate;
mod list;
mod select;

pub use anystate::{handle_capability, handle_logout, handle_noop};
pub use list::handle_list;
pub use login::handle_login;
pub use select::handle_select;
pub use uid_fetch::handle_uid_fetch;
