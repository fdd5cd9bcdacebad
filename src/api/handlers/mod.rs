mod callbacks;
mod notify;
mod users;

pub use callbacks::{bot_callback, login_callback, BOT_CALLBACK_PATH, LOGIN_CALLBACK_PATH};
pub use notify::{health, list_history, trigger_notify};
pub use users::{bot_status, get_display_name, revoke_bot, revoke_user, verify_user};
