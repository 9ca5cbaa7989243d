//! Customer-facing notifications: transactional emails and UI toasts.

pub mod email;
pub mod toast;

pub use email::{Audience, EmailError, EmailMessage};
pub use toast::{Toast, ToastKind};
