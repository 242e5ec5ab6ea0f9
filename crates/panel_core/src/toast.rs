pub type ToastId = u64;

/// Visual flavour of a toast, mirroring the alert classes of the web panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
            ToastKind::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    /// Lifetime elapsed; removed once the fade delay passes.
    Fading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastRecord {
    pub id: ToastId,
    pub title: String,
    pub message: String,
    pub kind: ToastKind,
    pub phase: ToastPhase,
}
