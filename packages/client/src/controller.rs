//! Room controller: binds one room at a time to one connection session.
//!
//! All mutation goes through `&mut self`, so the embedding application
//! serializes commands and transport events by driving the controller
//! from a single task. Transport events from superseded sessions are
//! recognized by their [`SessionId`] and discarded.

use std::sync::Arc;

use clustertalk_shared::time::{Clock, SystemClock};

use crate::{
    codec::{self, EncodeError, OutboundMessage},
    config::ClientConfig,
    domain::{
        ChatEvent, MessageLog, RoomId, SessionId, SessionState, Timestamp,
        ValueObjectError,
    },
    observer::{Notification, ObserverId, ObserverRegistry, SessionObserver},
    session::{ConnectionSession, SendError},
    transport::{EventSender, Transport, TransportError, TransportEvent},
};

/// Why an outbound message was not handed to the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Text was empty or whitespace-only
    EmptyText,
    /// No room has been joined
    NoRoom,
    /// Current session is not Open
    NotOpen(SessionState),
    Encode(EncodeError),
    Transport(TransportError),
}

/// Result of [`RoomController::send_message`].
///
/// Dropping is silent for observers; the outcome only exists so callers
/// and tests can tell what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Dropped(DropReason),
}

/// Owns the active room, its session and its message log
pub struct RoomController {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    events: EventSender,
    clock: Arc<dyn Clock>,
    observers: ObserverRegistry,
    session: Option<ConnectionSession>,
    room: Option<RoomId>,
    log: MessageLog,
    last_session_id: SessionId,
}

impl RoomController {
    /// Create a controller using the system clock
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>, events: EventSender) -> Self {
        Self::with_clock(config, transport, events, Arc::new(SystemClock))
    }

    /// Create a controller with an injected clock
    pub fn with_clock(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        events: EventSender,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            transport,
            events,
            clock,
            observers: ObserverRegistry::new(),
            session: None,
            room: None,
            log: MessageLog::new(),
            last_session_id: SessionId::default(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Bind `room` and open a new session for it.
    ///
    /// The current session, if any, is torn down first. The room binding,
    /// the log and the current session switch together before this returns.
    pub fn join(&mut self, room: RoomId) {
        self.retire_current_session();

        let id = self.last_session_id.next();
        self.last_session_id = id;

        tracing::info!("Joining room '{}' (session {})", room, id);
        self.log.clear();
        self.room = Some(room.clone());

        let mut session = ConnectionSession::new(id, room);
        let notification =
            session.connect(self.transport.as_ref(), &self.config.server_url, self.events.clone());
        self.session = Some(session);

        if let Some(notification) = notification {
            self.observers.notify(&notification);
        }
    }

    /// Validate a room name and join it
    pub fn join_str(&mut self, room: &str) -> Result<(), ValueObjectError> {
        let room = RoomId::new(room.to_string())?;
        self.join(room);
        Ok(())
    }

    /// Close the current session. The message log is left as is.
    pub fn leave(&mut self) {
        if self.session.is_none() {
            tracing::debug!("Leave requested without an active session");
            return;
        }
        self.retire_current_session();
        tracing::info!("Left the room");
    }

    /// Encode `text` for the bound room and send it on the current session.
    ///
    /// Never queues and never retries; anything that cannot go out now is
    /// dropped and reported through the returned outcome.
    pub fn send_message(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            tracing::debug!("Dropping empty message");
            return SendOutcome::Dropped(DropReason::EmptyText);
        }

        let (Some(session), Some(room)) = (&self.session, &self.room) else {
            tracing::debug!("Dropping message: no room joined");
            return SendOutcome::Dropped(DropReason::NoRoom);
        };

        if session.state() != SessionState::Open {
            tracing::debug!("Dropping message: session is {}", session.state());
            return SendOutcome::Dropped(DropReason::NotOpen(session.state()));
        }

        let message = OutboundMessage {
            text: text.to_string(),
            room: room.clone(),
            sender: self.config.sender.clone(),
            timestamp: Some(Timestamp::new(self.clock.now_unix_secs())),
        };

        let frame = match codec::encode(&message) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode message: {}", e);
                return SendOutcome::Dropped(DropReason::Encode(e));
            }
        };

        match session.send(frame) {
            Ok(()) => SendOutcome::Sent,
            Err(SendError::NotOpen(state)) => SendOutcome::Dropped(DropReason::NotOpen(state)),
            Err(SendError::Transport(e)) => {
                tracing::warn!("Failed to send message: {}", e);
                SendOutcome::Dropped(DropReason::Transport(e))
            }
        }
    }

    /// Apply one transport event.
    ///
    /// Events from any session other than the current one are discarded.
    pub fn handle_event(&mut self, event: TransportEvent) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("Discarding event from session {}: no active session", event.session);
            return;
        };

        if session.id() != event.session {
            tracing::debug!(
                "Discarding stale event from session {} (current {})",
                event.session,
                session.id()
            );
            return;
        }

        let Some(notification) = session.apply(event.event) else {
            return;
        };

        if let Notification::MessageAppended(chat_event) = &notification {
            self.log.append(chat_event.clone());
        }
        self.observers.notify(&notification);
    }

    /// State of the current session; Idle when there is none
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, ConnectionSession::state)
    }

    /// Currently bound room
    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    /// Id of the current session
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(ConnectionSession::id)
    }

    /// Read-only view of the message log
    pub fn messages(&self) -> &MessageLog {
        &self.log
    }

    /// Owned copy of the message log
    pub fn snapshot(&self) -> Vec<ChatEvent> {
        self.log.snapshot()
    }

    fn retire_current_session(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        tracing::debug!("Retiring session {} for room '{}'", session.id(), session.room());
        if let Some(notification) = session.close() {
            self.observers.notify(&notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Sender,
        observer::ChannelObserver,
        transport::{MockSocketHandle, SocketEvent, SocketHandle, event_channel},
    };
    use clustertalk_shared::time::FixedClock;
    use std::sync::Mutex;

    /// Transport that records endpoints and hands out permissive mocks
    #[derive(Default)]
    struct RecordingTransport {
        endpoints: Mutex<Vec<String>>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for RecordingTransport {
        fn connect(
            &self,
            endpoint: &str,
            _session: SessionId,
            _events: EventSender,
        ) -> Result<Box<dyn SocketHandle>, TransportError> {
            self.endpoints.lock().unwrap().push(endpoint.to_string());
            let sent = self.sent.clone();
            let mut handle = MockSocketHandle::new();
            handle.expect_send().returning(move |frame| {
                sent.lock().unwrap().push(frame);
                Ok(())
            });
            handle.expect_close().return_const(());
            Ok(Box::new(handle))
        }
    }

    fn create_controller() -> (RoomController, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let (events, _rx) = event_channel();
        let config = ClientConfig::new(
            "ws://localhost:8080/ws",
            Sender::new("alice".to_string()).unwrap(),
        );
        let controller = RoomController::with_clock(
            config,
            transport.clone(),
            events,
            Arc::new(FixedClock::new(1_700_000_000)),
        );
        (controller, transport)
    }

    fn room(name: &str) -> RoomId {
        RoomId::new(name.to_string()).unwrap()
    }

    fn opened(controller: &RoomController) -> TransportEvent {
        TransportEvent::new(controller.session_id().unwrap(), SocketEvent::Opened)
    }

    fn frame(controller: &RoomController, payload: &str, room_id: &str) -> TransportEvent {
        TransportEvent::new(
            controller.session_id().unwrap(),
            SocketEvent::Frame(format!(
                r#"{{"type":"message","payload":"{}","room_id":"{}","sender":"bob","timestamp":1000}}"#,
                payload, room_id
            )),
        )
    }

    #[test]
    fn test_initial_state_is_idle() {
        // テスト項目: 初期状態は Idle でルームも未設定
        // given (前提条件):
        let (controller, _) = create_controller();

        // when (操作):
        let state = controller.state();

        // then (期待する結果):
        assert_eq!(state, SessionState::Idle);
        assert_eq!(controller.room(), None);
        assert!(controller.messages().is_empty());
    }

    #[test]
    fn test_join_connects_to_room_endpoint() {
        // テスト項目: join でルームをクエリに含むエンドポイントへ接続する
        // given (前提条件):
        let (mut controller, transport) = create_controller();

        // when (操作):
        controller.join(room("general"));

        // then (期待する結果):
        assert_eq!(controller.state(), SessionState::Connecting);
        assert_eq!(controller.room(), Some(&room("general")));
        assert_eq!(
            *transport.endpoints.lock().unwrap(),
            vec!["ws://localhost:8080/ws?room=general".to_string()]
        );
    }

    #[test]
    fn test_join_str_rejects_invalid_room() {
        // テスト項目: 不正なルーム名では join されない
        // given (前提条件):
        let (mut controller, transport) = create_controller();

        // when (操作):
        let result = controller.join_str("bad room");

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(transport.endpoints.lock().unwrap().is_empty());
    }

    #[test]
    fn test_join_assigns_increasing_session_ids() {
        // テスト項目: join のたびに新しいセッション ID が割り当てられる
        // given (前提条件):
        let (mut controller, _) = create_controller();

        // when (操作):
        controller.join(room("general"));
        let first = controller.session_id().unwrap();
        controller.join(room("tech"));
        let second = controller.session_id().unwrap();

        // then (期待する結果):
        assert!(second > first);
    }

    #[test]
    fn test_send_message_while_open_stamps_room_sender_and_clock() {
        // テスト項目: Open 中の送信でルーム・送信者・時計のタイムスタンプを含むフレームが送られる
        // given (前提条件):
        let (mut controller, transport) = create_controller();
        controller.join(room("general"));
        controller.handle_event(opened(&controller));

        // when (操作):
        let outcome = controller.send_message("hello");

        // then (期待する結果):
        assert_eq!(outcome, SendOutcome::Sent);
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["payload"], "hello");
        assert_eq!(value["room_id"], "general");
        assert_eq!(value["sender"], "alice");
        assert_eq!(value["timestamp"], 1_700_000_000);
    }

    #[test]
    fn test_send_message_rejects_blank_text() {
        // テスト項目: 空白のみのメッセージは送信されない
        // given (前提条件):
        let (mut controller, transport) = create_controller();
        controller.join(room("general"));
        controller.handle_event(opened(&controller));

        // when (操作):
        let empty = controller.send_message("");
        let blank = controller.send_message("  \t ");

        // then (期待する結果):
        assert_eq!(empty, SendOutcome::Dropped(DropReason::EmptyText));
        assert_eq!(blank, SendOutcome::Dropped(DropReason::EmptyText));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_message_without_room_is_dropped() {
        // テスト項目: ルーム未参加時の送信は破棄される
        // given (前提条件):
        let (mut controller, transport) = create_controller();

        // when (操作):
        let outcome = controller.send_message("hello");

        // then (期待する結果):
        assert_eq!(outcome, SendOutcome::Dropped(DropReason::NoRoom));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_send_message_while_connecting_is_dropped() {
        // テスト項目: 接続中（Open 前）の送信はトランスポートを呼ばずに破棄される
        // given (前提条件):
        let (mut controller, transport) = create_controller();
        controller.join(room("general"));

        // when (操作):
        let outcome = controller.send_message("too early");

        // then (期待する結果):
        assert_eq!(
            outcome,
            SendOutcome::Dropped(DropReason::NotOpen(SessionState::Connecting))
        );
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_inbound_frames_append_in_order_and_skip_malformed() {
        // テスト項目: 受信フレームが到着順にログへ追加され、不正なフレームは除外される
        // given (前提条件):
        let (mut controller, _) = create_controller();
        controller.join(room("general"));
        controller.handle_event(opened(&controller));
        let session = controller.session_id().unwrap();

        // when (操作):
        controller.handle_event(frame(&controller, "one", "general"));
        controller.handle_event(TransportEvent::new(
            session,
            SocketEvent::Frame("garbage".to_string()),
        ));
        controller.handle_event(frame(&controller, "two", "general"));
        controller.handle_event(frame(&controller, "", "general"));
        controller.handle_event(frame(&controller, "three", "general"));

        // then (期待する結果):
        let payloads: Vec<String> = controller
            .messages()
            .iter()
            .map(|e| e.payload.as_str().to_string())
            .collect();
        assert_eq!(payloads, vec!["one", "two", "three"]);
        assert_eq!(controller.state(), SessionState::Open);
    }

    #[test]
    fn test_fractional_timestamp_frame_is_appended() {
        // テスト項目: timestamp が小数のフレームもログに追加され、通知される
        // given (前提条件):
        let (mut controller, _) = create_controller();
        let (observer, mut rx) = ChannelObserver::new();
        controller.subscribe(Arc::new(observer));
        controller.join(room("general"));
        controller.handle_event(opened(&controller));
        let session = controller.session_id().unwrap();

        // when (操作):
        controller.handle_event(TransportEvent::new(
            session,
            SocketEvent::Frame(
                r#"{"type":"message","payload":"hi","room_id":"general","sender":"web","timestamp":1700000000.25}"#
                    .to_string(),
            ),
        ));

        // then (期待する結果):
        assert_eq!(controller.messages().len(), 1);
        let event = controller.messages().last().unwrap();
        assert_eq!(event.sender.as_str(), "web");
        assert_eq!(event.timestamp, Timestamp::new(1_700_000_000));
        let notifications: Vec<Notification> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(matches!(
            notifications.last(),
            Some(Notification::MessageAppended(e)) if e.payload.as_str() == "hi"
        ));
    }

    #[test]
    fn test_join_clears_log_and_rejects_stale_events() {
        // テスト項目: ルーム切り替えでログがクリアされ、旧セッションのイベントは破棄される
        // given (前提条件):
        let (mut controller, _) = create_controller();
        let (observer, mut rx) = ChannelObserver::new();
        controller.subscribe(Arc::new(observer));
        controller.join(room("general"));
        controller.handle_event(opened(&controller));
        let stale_frame = frame(&controller, "late", "general");
        let stale_close = TransportEvent::new(controller.session_id().unwrap(), SocketEvent::Closed);
        controller.handle_event(frame(&controller, "hi", "general"));
        assert_eq!(controller.messages().len(), 1);

        // when (操作):
        controller.join(room("tech"));
        controller.handle_event(stale_frame);
        controller.handle_event(stale_close);

        // then (期待する結果):
        assert!(controller.messages().is_empty());
        assert_eq!(controller.state(), SessionState::Connecting);
        let notifications: Vec<Notification> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(notifications.len(), 3);
        assert_eq!(notifications[0], Notification::Connected);
        assert!(matches!(notifications[1], Notification::MessageAppended(_)));
        assert_eq!(notifications[2], Notification::Disconnected);
    }

    #[test]
    fn test_leave_sets_idle_and_keeps_log() {
        // テスト項目: leave で Idle になり、ログはそのまま残る
        // given (前提条件):
        let (mut controller, _) = create_controller();
        let (observer, mut rx) = ChannelObserver::new();
        controller.subscribe(Arc::new(observer));
        controller.join(room("general"));
        controller.handle_event(opened(&controller));
        controller.handle_event(frame(&controller, "hi", "general"));

        // when (操作):
        controller.leave();

        // then (期待する結果):
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(controller.messages().len(), 1);
        let notifications: Vec<Notification> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(notifications.last(), Some(&Notification::Disconnected));
        assert_eq!(controller.send_message("anyone?"), SendOutcome::Dropped(DropReason::NoRoom));
    }

    #[test]
    fn test_leave_without_session_is_noop() {
        // テスト項目: セッションがない状態での leave は何もしない
        // given (前提条件):
        let (mut controller, _) = create_controller();
        let (observer, mut rx) = ChannelObserver::new();
        controller.subscribe(Arc::new(observer));

        // when (操作):
        controller.leave();

        // then (期待する結果):
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_peer_close_notifies_once() {
        // テスト項目: サーバー側のエラーとクローズが続いても Disconnected は一度だけ通知される
        // given (前提条件):
        let (mut controller, _) = create_controller();
        let (observer, mut rx) = ChannelObserver::new();
        controller.subscribe(Arc::new(observer));
        controller.join(room("general"));
        controller.handle_event(opened(&controller));
        let session = controller.session_id().unwrap();

        // when (操作):
        controller.handle_event(TransportEvent::new(
            session,
            SocketEvent::Failed("reset".to_string()),
        ));
        controller.handle_event(TransportEvent::new(session, SocketEvent::Closed));

        // then (期待する結果):
        let notifications: Vec<Notification> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            notifications,
            vec![Notification::Connected, Notification::Disconnected]
        );
        assert_eq!(controller.state(), SessionState::Closed);
    }
}
