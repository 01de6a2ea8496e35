//! Typed, multi-consumer event bus.
//!
//! Each observable webview state change is one event kind with its own
//! payload type and its own subscriber list. Native listeners feeding a
//! kind are attached lazily on the first `on`/`once` and detached again by
//! `clear`, so unused events never pay native callback overhead.
//!
//! Firing never runs a callback while the bus (or the owning webview
//! state) is borrowed: callbacks are checked out one at a time with
//! [`EventChannel::checkout`] and returned with [`EventChannel::restore`],
//! which makes it safe for a callback to add or remove subscribers of the
//! same kind mid-fire.

use crate::handle::Icon;

/// Identifies one subscription within its event kind.
pub type SubscriptionId = u64;

pub type EventCallback<A> = Box<dyn FnMut(&A) + Send>;

/// Runtime discriminator for the webview event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebEvent {
    UrlChanged,
    LoadStarted,
    LoadFinished,
    DomReady,
    TitleChanged,
    IconChanged,
}

struct Subscriber<A> {
    id: SubscriptionId,
    once: bool,
    // None while the callback is checked out by an in-progress fire.
    callback: Option<EventCallback<A>>,
}

/// Subscriber list for one event kind.
pub struct EventChannel<A> {
    next_id: SubscriptionId,
    subscribers: Vec<Subscriber<A>>,
    attached: bool,
}

impl<A> Default for EventChannel<A> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
            attached: false,
        }
    }
}

impl<A> EventChannel<A> {
    /// Register a persistent subscriber; fires until removed.
    pub fn add(&mut self, callback: EventCallback<A>) -> SubscriptionId {
        self.push(callback, false)
    }

    /// Register a subscriber that removes itself after its first fire.
    pub fn once(&mut self, callback: EventCallback<A>) -> SubscriptionId {
        self.push(callback, true)
    }

    fn push(&mut self, callback: EventCallback<A>, once: bool) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            once,
            callback: Some(callback),
        });
        id
    }

    /// Remove one subscriber; no-op if the id is absent or already fired.
    pub fn remove(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|s| s.id != id);
    }

    /// Drop every subscriber. Native detach bookkeeping is separate; see
    /// [`EventChannel::mark_detached`].
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Ids of the subscribers currently registered, in registration order.
    /// A fire iterates this snapshot, so subscribers added mid-fire wait
    /// for the next fire.
    pub fn snapshot(&self) -> Vec<SubscriptionId> {
        self.subscribers.iter().map(|s| s.id).collect()
    }

    /// Take a subscriber's callback out for invocation. Returns `None`
    /// when the subscriber was removed (or checked out) since the
    /// snapshot was taken.
    pub fn checkout(&mut self, id: SubscriptionId) -> Option<(EventCallback<A>, bool)> {
        let sub = self.subscribers.iter_mut().find(|s| s.id == id)?;
        let once = sub.once;
        sub.callback.take().map(|cb| (cb, once))
    }

    /// Return a checked-out callback after invocation. One-shot
    /// subscribers are dropped here; so are callbacks whose subscriber
    /// was removed while it ran.
    pub fn restore(&mut self, id: SubscriptionId, callback: EventCallback<A>, once: bool) {
        if once {
            self.remove(id);
            return;
        }
        if let Some(sub) = self.subscribers.iter_mut().find(|s| s.id == id) {
            sub.callback = Some(callback);
        }
    }

    /// Record that the native listener for this kind is now attached.
    /// Returns true when this call did the transition.
    pub fn mark_attached(&mut self) -> bool {
        !std::mem::replace(&mut self.attached, true)
    }

    /// Record that the native listener is detached again. Returns true
    /// when this call did the transition.
    pub fn mark_detached(&mut self) -> bool {
        std::mem::replace(&mut self.attached, false)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Type-erased channel operations for enum-addressed access.
pub trait ChannelOps {
    fn remove(&mut self, id: SubscriptionId);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn mark_detached(&mut self) -> bool;
}

impl<A> ChannelOps for EventChannel<A> {
    fn remove(&mut self, id: SubscriptionId) {
        EventChannel::remove(self, id);
    }

    fn clear(&mut self) {
        EventChannel::clear(self);
    }

    fn len(&self) -> usize {
        EventChannel::len(self)
    }

    fn mark_detached(&mut self) -> bool {
        EventChannel::mark_detached(self)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// One webview event kind with its typed payload.
///
/// Implemented only by the marker types below; the set of kinds is part
/// of the cross-backend contract.
pub trait WebEventKind: sealed::Sealed + 'static {
    const KIND: WebEvent;
    type Payload: Send + 'static;

    fn channel(events: &mut WebViewEvents) -> &mut EventChannel<Self::Payload>;
}

macro_rules! web_event_kinds {
    ($($marker:ident => $field:ident : $payload:ty),+ $(,)?) => {
        $(
            pub struct $marker;

            impl sealed::Sealed for $marker {}

            impl WebEventKind for $marker {
                const KIND: WebEvent = WebEvent::$marker;
                type Payload = $payload;

                fn channel(events: &mut WebViewEvents) -> &mut EventChannel<$payload> {
                    &mut events.$field
                }
            }
        )+

        /// All event channels of one webview instance.
        #[derive(Default)]
        pub struct WebViewEvents {
            $($field: EventChannel<$payload>,)+
        }

        impl WebViewEvents {
            pub fn new() -> Self {
                Self::default()
            }

            /// Typed access for `on`/`once`/fire.
            pub fn channel<E: WebEventKind>(&mut self) -> &mut EventChannel<E::Payload> {
                E::channel(self)
            }

            /// Enum-addressed access for `remove`/`clear`.
            pub fn by_kind(&mut self, kind: WebEvent) -> &mut dyn ChannelOps {
                match kind {
                    $(WebEvent::$marker => &mut self.$field,)+
                }
            }
        }
    };
}

web_event_kinds! {
    UrlChanged => url_changed: String,
    LoadStarted => load_started: (),
    LoadFinished => load_finished: (),
    DomReady => dom_ready: (),
    TitleChanged => title_changed: String,
    IconChanged => icon_changed: Icon,
}
