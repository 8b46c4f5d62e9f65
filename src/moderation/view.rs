use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// The two mutually exclusive operator tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectedView {
    #[default]
    Groups,
    Users,
}

impl SelectedView {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectedView::Groups => "groups",
            SelectedView::Users => "users",
        }
    }

    /// Tab caption shown to the operator
    pub fn label(&self) -> &'static str {
        match self {
            SelectedView::Groups => "Groups",
            SelectedView::Users => "Users",
        }
    }
}

impl fmt::Display for SelectedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectedView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groups" => Ok(SelectedView::Groups),
            "users" => Ok(SelectedView::Users),
            other => Err(format!("unknown view '{}', expected groups or users", other)),
        }
    }
}

/// Currently selected tab. Switching is purely local state.
#[derive(Debug, Default)]
pub struct ViewState {
    selected: AtomicU8,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> SelectedView {
        match self.selected.load(Ordering::Relaxed) {
            1 => SelectedView::Users,
            _ => SelectedView::Groups,
        }
    }

    pub fn select(&self, view: SelectedView) {
        let raw = match view {
            SelectedView::Groups => 0,
            SelectedView::Users => 1,
        };
        self.selected.store(raw, Ordering::Relaxed);
    }
}
