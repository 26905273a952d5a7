use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use leptos::logging::{error, log, warn};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use super::channel::{handshake_url, Action, ChannelCore, ListenerRegistry};
use super::events::{
    ConnectionPayload, DriverLiveLocation, JoinRideRoom, LeaveRideRoom, LocationUpdate,
    DRIVER_LIVE_LOCATION, JOIN_RIDE_ROOM, LEAVE_RIDE_ROOM, UPDATE_DRIVER_LOCATION,
};
use super::{PushError, PushSettings, ReconnectPolicy};

type Listener = Rc<dyn Fn(Value)>;

struct SocketHandlers {
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

struct Inner {
    settings: PushSettings,
    url: Option<String>,
    socket: Option<WebSocket>,
    handlers: Option<SocketHandlers>,
    // kept one generation so a handler is never freed while it runs
    retired_handlers: Option<SocketHandlers>,
    core: ChannelCore,
    listeners: ListenerRegistry<Listener>,
    reconnect_timer: Option<i32>,
    heartbeat_timer: Option<i32>,
}

fn clear_timer(timer: &mut Option<i32>) {
    if let Some(handle) = timer.take() {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(handle);
        }
    }
}

impl Inner {
    fn retire_socket(&mut self) {
        clear_timer(&mut self.heartbeat_timer);
        if let Some(socket) = self.socket.take() {
            socket.set_onmessage(None);
            socket.set_onclose(None);
            socket.set_onerror(None);
            let _ = socket.close();
        }
        self.retired_handlers = self.handlers.take();
    }

    fn cancel_reconnect(&mut self) {
        clear_timer(&mut self.reconnect_timer);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel_reconnect();
        self.retire_socket();
    }
}

/// Socket.IO style client for the ride tracking feed, bound to a browser
/// `WebSocket`. Cloning shares the same connection.
#[derive(Clone)]
pub struct PushChannel {
    inner: Rc<RefCell<Inner>>,
}

fn js_error(err: JsValue) -> PushError {
    PushError::Socket(format!("{err:?}"))
}

impl PushChannel {
    pub fn new(settings: PushSettings) -> Self {
        let core = ChannelCore::new(ReconnectPolicy::from(&settings));
        Self {
            inner: Rc::new(RefCell::new(Inner {
                settings,
                url: None,
                socket: None,
                handlers: None,
                retired_handlers: None,
                core,
                listeners: ListenerRegistry::default(),
                reconnect_timer: None,
                heartbeat_timer: None,
            })),
        }
    }

    pub fn initialize_connection(&self, payload: &ConnectionPayload) -> Result<(), PushError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.core.is_connected() {
                warn!("push channel already connected");
                return Ok(());
            }

            let url = handshake_url(&inner.settings.url, &payload.query())?;
            log!("initializing push channel for ride {}", payload.ride_id);

            inner.cancel_reconnect();
            inner.retire_socket();
            inner.core = ChannelCore::new(ReconnectPolicy::from(&inner.settings));
            inner.url = Some(url);
        }
        self.open_socket()
    }

    fn open_socket(&self) -> Result<(), PushError> {
        let url = self
            .inner
            .borrow()
            .url
            .clone()
            .ok_or(PushError::NotInitialized)?;
        let socket = WebSocket::new(&url).map_err(js_error)?;

        let weak = Rc::downgrade(&self.inner);
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match event.data().as_string() {
                Some(frame) => PushChannel { inner }.handle_frame(&frame),
                None => warn!("ignoring binary push frame"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);

        let weak = Rc::downgrade(&self.inner);
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            if let Some(inner) = weak.upgrade() {
                PushChannel { inner }.handle_close(event.code(), event.reason());
            }
        }) as Box<dyn FnMut(CloseEvent)>);

        let on_error = Closure::wrap(Box::new(move |_event: Event| {
            error!("push channel connection error");
        }) as Box<dyn FnMut(Event)>);

        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let mut inner = self.inner.borrow_mut();
        inner.core.opening();
        inner.socket = Some(socket);
        inner.handlers = Some(SocketHandlers {
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        });
        Ok(())
    }

    fn handle_frame(&self, frame: &str) {
        let result = self.inner.borrow_mut().core.on_frame(frame);
        match result {
            Ok(actions) => actions.into_iter().for_each(|action| self.apply(action)),
            Err(err) => warn!("dropping push frame: {err}"),
        }
    }

    fn apply(&self, action: Action) {
        match action {
            Action::Send(frame) => self.send_frame(&frame),
            Action::Dispatch { event, payload } => {
                // released before the call so listeners may use the channel
                let listener = self.inner.borrow().listeners.get(&event).cloned();
                if let Some(listener) = listener {
                    listener(payload);
                }
            }
            Action::Connected => log!("push channel connected"),
            Action::ConnectError(message) => error!("push channel connect error: {message}"),
            Action::Disconnected(reason) => {
                warn!("push channel disconnected: {reason}");
                if let Some(socket) = self.inner.borrow().socket.as_ref() {
                    let _ = socket.close();
                }
            }
            Action::ArmHeartbeat(deadline) => self.arm_heartbeat(deadline),
        }
    }

    fn arm_heartbeat(&self, deadline: Duration) {
        clear_timer(&mut self.inner.borrow_mut().heartbeat_timer);
        let Some(window) = web_sys::window() else {
            return;
        };
        let weak = Rc::downgrade(&self.inner);
        let callback = Closure::once_into_js(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.borrow_mut().heartbeat_timer = None;
            PushChannel { inner }.handle_ping_timeout();
        });
        let millis = i32::try_from(deadline.as_millis()).unwrap_or(i32::MAX);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis,
        ) {
            Ok(handle) => self.inner.borrow_mut().heartbeat_timer = Some(handle),
            Err(err) => error!("could not arm push channel heartbeat: {err:?}"),
        }
    }

    /// The server went quiet without closing the websocket.
    fn handle_ping_timeout(&self) {
        let actions = self.inner.borrow_mut().core.on_ping_timeout();
        if actions.is_empty() {
            return;
        }
        warn!("push channel missed the server heartbeat");
        self.transport_lost("ping timeout".to_string());
    }

    fn handle_close(&self, code: u16, reason: String) {
        self.transport_lost(format!("code {code} {reason}"));
    }

    fn transport_lost(&self, why: String) {
        let delay = {
            let mut inner = self.inner.borrow_mut();
            inner.retire_socket();
            inner.core.on_transport_closed()
        };
        match delay {
            Some(delay) => {
                warn!(
                    "push channel closed ({why}), reconnecting in {}ms",
                    delay.as_millis()
                );
                self.schedule_reconnect(delay);
            }
            None => log!("push channel closed ({why})"),
        }
    }

    fn schedule_reconnect(&self, delay: Duration) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let weak = Rc::downgrade(&self.inner);
        let callback = Closure::once_into_js(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.borrow_mut().reconnect_timer = None;
            if let Err(err) = (PushChannel { inner }).open_socket() {
                error!("push channel reconnect failed: {err}");
            }
        });
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis,
        ) {
            Ok(handle) => self.inner.borrow_mut().reconnect_timer = Some(handle),
            Err(err) => error!("could not schedule push channel reconnect: {err:?}"),
        }
    }

    fn send_frame(&self, frame: &str) {
        let inner = self.inner.borrow();
        match inner.socket.as_ref() {
            Some(socket) => {
                if let Err(err) = socket.send_with_str(frame) {
                    error!("push channel send failed: {}", js_error(err));
                }
            }
            None => warn!("no open socket, dropping frame"),
        }
    }

    pub fn disconnect(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.url.is_none() {
            return;
        }
        log!("disconnecting push channel");

        inner.listeners.clear();
        if let Some(frame) = inner.core.close() {
            if let Some(socket) = inner.socket.as_ref() {
                let _ = socket.send_with_str(&frame);
            }
        }
        inner.cancel_reconnect();
        inner.retire_socket();
        inner.url = None;
    }

    pub fn emit_event<T: Serialize + ?Sized>(&self, event: &str, data: &T) {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(err) => {
                error!("cannot encode {event} payload: {err}");
                return;
            }
        };
        let frame = {
            let mut inner = self.inner.borrow_mut();
            if inner.url.is_none() {
                error!("push channel not initialized, dropping {event}");
                return;
            }
            inner.core.emit(event, data)
        };
        match frame {
            Ok(Some(frame)) => {
                log!("emitting {event}");
                self.send_frame(&frame);
            }
            Ok(None) => log!("queued {event} until the channel connects"),
            Err(err) => error!("dropping {event}: {err}"),
        }
    }

    pub fn on_event(
        &self,
        event: &str,
        callback: impl Fn(Value) + 'static,
    ) -> Result<(), PushError> {
        let mut inner = self.inner.borrow_mut();
        if inner.url.is_none() {
            error!("push channel not initialized, cannot listen for {event}");
            return Err(PushError::NotInitialized);
        }
        if inner.listeners.on(event, Rc::new(callback)).is_some() {
            log!("replaced existing listener for {event}");
        } else {
            log!("listening for {event}");
        }
        Ok(())
    }

    pub fn off_event(&self, event: &str) {
        if self.inner.borrow_mut().listeners.off(event).is_some() {
            log!("removed listener for {event}");
        }
    }

    pub fn remove_all_listeners(&self) {
        let removed = self.inner.borrow_mut().listeners.clear();
        log!("removed {removed} push listeners");
    }

    pub fn join_ride_tracking_room(&self, ride_id: &str) {
        if ride_id.trim().is_empty() {
            warn!("ride id is required to join the ride tracking room");
            return;
        }
        self.inner.borrow_mut().core.track_room(ride_id);
        self.emit_event(JOIN_RIDE_ROOM, ride_id);
    }

    pub fn leave_ride_tracking_room(&self, ride_id: &str) {
        if ride_id.trim().is_empty() {
            return;
        }
        self.inner.borrow_mut().core.untrack_room(ride_id);
        self.emit_event(LEAVE_RIDE_ROOM, ride_id);
    }

    pub fn on_ride_location_update(
        &self,
        callback: impl Fn(LocationUpdate) + 'static,
    ) -> Result<(), PushError> {
        self.on_event(UPDATE_DRIVER_LOCATION, move |payload| {
            let update = LocationUpdate::from_payload(&payload);
            if update.position().is_none() {
                warn!("location update without a usable position: {payload}");
            }
            callback(update);
        })
    }

    pub fn send_driver_live_location(&self, location: &DriverLiveLocation) {
        self.emit_event(DRIVER_LIVE_LOCATION, location);
    }

    pub fn join_ride_room(&self, ride_id: &str, driver_id: &str) {
        self.emit_event(JOIN_RIDE_ROOM, &JoinRideRoom { ride_id, driver_id });
    }

    pub fn leave_ride_room(&self, ride_id: &str) {
        self.emit_event(LEAVE_RIDE_ROOM, &LeaveRideRoom { ride_id });
    }
}
