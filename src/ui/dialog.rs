/// Native yes/no prompt
///
/// Blocks the UI thread until answered.
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

pub fn confirm(message: &str) -> bool {
    let answer = MessageDialog::new()
        .set_title("확인")
        .set_description(message)
        .set_buttons(MessageButtons::OkCancel)
        .set_level(MessageLevel::Warning)
        .show();

    matches!(answer, MessageDialogResult::Ok | MessageDialogResult::Yes)
}
