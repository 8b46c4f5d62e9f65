// Confirmation gate for destructive actions

use async_trait::async_trait;
use std::fmt;

/// Fixed, action-specific prompt shown before a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPrompt {
    DeleteGroup,
    BanUser,
    UnbanUser,
}

impl ConfirmationPrompt {
    /// Prompt for toggling a user whose last-seen flag is `currently_banned`
    pub fn for_ban_toggle(currently_banned: bool) -> Self {
        if currently_banned {
            ConfirmationPrompt::UnbanUser
        } else {
            ConfirmationPrompt::BanUser
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ConfirmationPrompt::DeleteGroup => {
                "Delete this group permanently? All of its messages will be lost."
            }
            ConfirmationPrompt::BanUser => "BAN this user from the site?",
            ConfirmationPrompt::UnbanUser => "Unban this user?",
        }
    }
}

impl fmt::Display for ConfirmationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Ask the operator; `true` means proceed
    async fn confirm(&self, prompt: ConfirmationPrompt) -> bool;
}

/// Answer carried with the request itself, as an acknowledgment flag the
/// operator sets after reading the prompt.
#[derive(Debug, Clone, Copy)]
pub struct Acknowledgement {
    acknowledged: bool,
}

impl Acknowledgement {
    pub fn new(acknowledged: bool) -> Self {
        Self { acknowledged }
    }
}

#[async_trait]
impl Confirmer for Acknowledgement {
    async fn confirm(&self, _prompt: ConfirmationPrompt) -> bool {
        self.acknowledged
    }
}
