//! Shared wiring for service-level tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use taberna_domain::{CombatId, ConnectionId, PlayerId};
use taberna_protocol::ServerMessage;

use crate::api::connections::ConnectionManager;
use crate::app::{App, AppConfig};
use crate::infrastructure::ports::{
    ClockPort, ItemCatalogPort, MockItemCatalogPort, MockProgressionPort, ProgressionPort,
};

/// Queue depth for test connections; deep enough that a whole duel fits.
const TEST_CHANNEL_BUFFER: usize = 256;

/// Clock the tests wind forward by hand.
pub(crate) struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now = *now + by;
    }
}

impl ClockPort for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

pub(crate) struct Harness {
    pub(crate) app: Arc<App>,
    pub(crate) clock: Arc<SteppingClock>,
}

/// App wired with a stepping clock, a seeded rng and quiet mocks on the
/// outbound ports.
pub(crate) fn harness() -> Harness {
    harness_with(default_catalog(), default_progression())
}

pub(crate) fn harness_with(
    catalog: Arc<dyn ItemCatalogPort>,
    progression: Arc<dyn ProgressionPort>,
) -> Harness {
    let clock = Arc::new(SteppingClock::new(Utc::now()));
    let app = Arc::new(App::new(
        AppConfig::default(),
        Arc::new(ConnectionManager::new()),
        clock.clone(),
        catalog,
        progression,
        StdRng::seed_from_u64(7),
    ));
    Harness { app, clock }
}

pub(crate) fn default_catalog() -> Arc<dyn ItemCatalogPort> {
    let mut catalog = MockItemCatalogPort::new();
    catalog.expect_eligible_items().returning(|_| Vec::new());
    Arc::new(catalog)
}

pub(crate) fn default_progression() -> Arc<dyn ProgressionPort> {
    let mut progression = MockProgressionPort::new();
    progression
        .expect_record_combat_result()
        .returning(|_, _, _, _| Ok(()));
    Arc::new(progression)
}

/// Register a raw connection and keep the receiving end.
pub(crate) async fn open_connection(app: &App) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
    let connection_id = ConnectionId::new();
    let (tx, rx) = mpsc::channel(TEST_CHANNEL_BUFFER);
    app.connections.register(connection_id, tx).await;
    (connection_id, rx)
}

pub(crate) async fn join(app: &App, connection_id: ConnectionId, name: &str) -> PlayerId {
    app.use_cases
        .lobby
        .join(connection_id, name)
        .await
        .expect("join")
}

/// A joined player with their message queue, join noise already drained.
pub(crate) struct Seat {
    pub(crate) player: PlayerId,
    pub(crate) rx: mpsc::Receiver<ServerMessage>,
}

pub(crate) async fn seat(app: &App, name: &str) -> Seat {
    let (connection_id, mut rx) = open_connection(app).await;
    let player = join(app, connection_id, name).await;
    drain(&mut rx);
    Seat { player, rx }
}

/// Everything currently queued for this connection.
pub(crate) fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        out.push(message);
    }
    out
}

/// First queued message matching the predicate; everything else queued so
/// far is discarded.
pub(crate) fn find(
    rx: &mut mpsc::Receiver<ServerMessage>,
    predicate: impl Fn(&ServerMessage) -> bool,
) -> Option<ServerMessage> {
    drain(rx).into_iter().find(|message| predicate(message))
}

/// Challenge, accept and return the running combat's id with both queues
/// cleared.
pub(crate) async fn start_duel(app: &App, a: &mut Seat, b: &mut Seat) -> CombatId {
    let id = app
        .use_cases
        .duel
        .challenge(a.player, b.player)
        .await
        .expect("challenge");
    app.use_cases
        .duel
        .respond(b.player, id, true)
        .await
        .expect("accept");
    drain(&mut a.rx);
    drain(&mut b.rx);
    app.combats
        .combat_for(a.player)
        .await
        .expect("combat running")
}
