//! UI-thread-confined instance registry.
//!
//! Webview state is only ever touched from the UI thread, so instances
//! live in a thread-local map instead of behind locks. Dispatched jobs
//! carry the instance id and look the state up here once they run on the
//! UI thread; a missing id means the instance was destroyed while the
//! job was in flight.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glaze_common::{DispatchError, WebViewId};

use super::Inner;

thread_local! {
    static INSTANCES: RefCell<HashMap<WebViewId, Rc<RefCell<Inner>>>> =
        RefCell::new(HashMap::new());
}

pub(crate) fn insert(id: WebViewId, inner: Rc<RefCell<Inner>>) {
    INSTANCES.with(|map| map.borrow_mut().insert(id, inner));
}

pub(crate) fn remove(id: WebViewId) -> bool {
    INSTANCES.with(|map| map.borrow_mut().remove(&id)).is_some()
}

/// Run `f` against the instance state.
///
/// The instance `Rc` is cloned out of the map first, so `f` may touch
/// the registry (e.g. destroy another instance) without re-borrowing the
/// map. It must not re-enter the same instance; callers keep user
/// callbacks outside this scope.
pub(crate) fn with<R>(
    id: WebViewId,
    f: impl FnOnce(&mut Inner) -> R,
) -> Result<R, DispatchError> {
    let instance = INSTANCES
        .with(|map| map.borrow().get(&id).cloned())
        .ok_or(DispatchError::Destroyed)?;
    let mut inner = instance.borrow_mut();
    Ok(f(&mut inner))
}
