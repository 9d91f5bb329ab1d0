//! User notifier port: toasts and alerts the user must see.

use std::future::Future;
use std::sync::Arc;

use loopctl_domain::notice::UserNotice;

/// Surfaces a notice to the user. Delivery cannot be refused: a notice
/// about a failed pump command must never be dropped.
pub trait UserNotifier {
    fn notify(&self, notice: UserNotice) -> impl Future<Output = ()> + Send;
}

impl<T: UserNotifier + Send + Sync> UserNotifier for Arc<T> {
    fn notify(&self, notice: UserNotice) -> impl Future<Output = ()> + Send {
        (**self).notify(notice)
    }
}
