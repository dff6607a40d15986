//! Toast notification state: one transient message at a time, errors dwell
//! longer than successes, and a new toast replaces the previous one.

use std::time::{Duration, Instant};

const SUCCESS_DWELL: Duration = Duration::from_secs(3);
const ERROR_DWELL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn dwell(self) -> Duration {
        match self {
            ToastKind::Success => SUCCESS_DWELL,
            ToastKind::Error => ERROR_DWELL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ToastHost {
    current: Option<(Toast, Instant)>,
}

impl ToastHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast, destroying whatever was visible before.
    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.current = Some((
            Toast {
                kind,
                message: message.into(),
            },
            Instant::now(),
        ));
    }

    pub fn visible(&self) -> Option<&Toast> {
        self.visible_at(Instant::now())
    }

    fn visible_at(&self, now: Instant) -> Option<&Toast> {
        let (toast, shown_at) = self.current.as_ref()?;
        if now.duration_since(*shown_at) < toast.kind.dwell() {
            Some(toast)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_dwells_longer_than_success() {
        assert!(ToastKind::Error.dwell() > ToastKind::Success.dwell());
    }

    #[test]
    fn test_new_toast_replaces_previous() {
        let mut host = ToastHost::new();
        host.show(ToastKind::Success, "Producto agregado al carrito");
        host.show(ToastKind::Error, "Solo quedan 2 unidades disponibles");

        let toast = host.visible().expect("toast visible");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Solo quedan 2 unidades disponibles");
    }

    #[test]
    fn test_toast_expires_after_dwell() {
        let mut host = ToastHost::new();
        host.show(ToastKind::Success, "ok");
        let shown_at = host.current.as_ref().expect("toast stored").1;

        assert!(host.visible_at(shown_at).is_some());
        assert!(host
            .visible_at(shown_at + SUCCESS_DWELL + Duration::from_millis(1))
            .is_none());
    }

    #[test]
    fn test_empty_host_shows_nothing() {
        assert!(ToastHost::new().visible().is_none());
    }
}
