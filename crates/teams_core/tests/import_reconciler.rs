use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use teams_core::db::{open_db, open_db_in_memory};
use teams_core::sequence::{self, SequenceResult};
use teams_core::{
    Event, GroupService, ImportOptions, ImportOutcome, ImportReconciler, InMemorySequenceAllocator,
    InvitationStatus, LegacySnapshot, Player, RepoError, RepoResult, RepositoryGateway,
    SequenceAllocator, SequenceError, ShirtSet, SqliteRepository, SqliteSequenceAllocator,
    Trainer,
};

fn create_group(conn: &rusqlite::Connection, name: &str) -> String {
    let service = GroupService::new(SqliteSequenceAllocator::new(conn), SqliteRepository::new(conn));
    service.create_group(name, None).unwrap().id
}

fn snapshot(value: serde_json::Value) -> LegacySnapshot {
    LegacySnapshot::from_value(value).unwrap()
}

fn player(id: &str, first_name: &str) -> serde_json::Value {
    json!({"id": id, "firstName": first_name, "lastName": "Doe", "birthYear": 2010, "level": 3})
}

fn scenario_snapshot() -> LegacySnapshot {
    snapshot(json!({
        "players": [player("p1", "John"), player("p2", "Jane")],
        "trainers": [{"id": "t1", "firstName": "Coach", "lastName": "Wilson"}],
        "events": [{
            "id": "e1",
            "name": "Training Match",
            "date": "2025-01-15",
            "maxPlayersPerTeam": 5,
            "teams": [{
                "id": "team-1",
                "name": "Team Red",
                "strength": 2,
                "startTime": "09:00",
                "selectedPlayers": ["p1"],
                "trainerId": "t1"
            }],
            "invitations": [{"id": "i1", "playerId": "p2", "status": "accepted"}]
        }]
    }))
}

/// Gateway wrapper that fails chosen player and event calls (1-based).
struct FlakyGateway<'conn> {
    inner: SqliteRepository<'conn>,
    failing_player_calls: HashSet<usize>,
    player_calls: Cell<usize>,
    failing_event_calls: HashSet<usize>,
    event_calls: Cell<usize>,
}

impl<'conn> FlakyGateway<'conn> {
    fn new(conn: &'conn rusqlite::Connection) -> Self {
        Self {
            inner: SqliteRepository::new(conn),
            failing_player_calls: HashSet::new(),
            player_calls: Cell::new(0),
            failing_event_calls: HashSet::new(),
            event_calls: Cell::new(0),
        }
    }

    fn failing_players(mut self, calls: &[usize]) -> Self {
        self.failing_player_calls.extend(calls);
        self
    }

    fn failing_events(mut self, calls: &[usize]) -> Self {
        self.failing_event_calls.extend(calls);
        self
    }
}

fn next_call(counter: &Cell<usize>, failing: &HashSet<usize>) -> RepoResult<()> {
    let call = counter.get() + 1;
    counter.set(call);
    if failing.contains(&call) {
        return Err(RepoError::InvalidData("simulated store failure".to_string()));
    }
    Ok(())
}

impl RepositoryGateway for FlakyGateway<'_> {
    fn create_player(&self, player: Player) -> RepoResult<Player> {
        next_call(&self.player_calls, &self.failing_player_calls)?;
        self.inner.create_player(player)
    }

    fn create_trainer(&self, trainer: Trainer) -> RepoResult<Trainer> {
        self.inner.create_trainer(trainer)
    }

    fn create_shirt_set(&self, shirt_set: ShirtSet) -> RepoResult<ShirtSet> {
        self.inner.create_shirt_set(shirt_set)
    }

    fn create_event(&self, event: Event) -> RepoResult<Event> {
        next_call(&self.event_calls, &self.failing_event_calls)?;
        self.inner.create_event(event)
    }
}

/// Gateway that records call order and keeps written entities in memory.
#[derive(Default)]
struct RecordingGateway {
    calls: RefCell<Vec<&'static str>>,
    players: RefCell<Vec<Player>>,
    trainers: RefCell<Vec<Trainer>>,
    shirt_sets: RefCell<Vec<ShirtSet>>,
    events: RefCell<Vec<Event>>,
}

impl RecordingGateway {
    fn all_ids_before_first_event(&self) -> bool {
        let calls = self.calls.borrow();
        match calls.iter().position(|call| *call == "event") {
            Some(first_event) => calls[first_event..].iter().all(|call| *call == "event"),
            None => true,
        }
    }
}

impl RepositoryGateway for RecordingGateway {
    fn create_player(&self, player: Player) -> RepoResult<Player> {
        self.calls.borrow_mut().push("player");
        self.players.borrow_mut().push(player.clone());
        Ok(player)
    }

    fn create_trainer(&self, trainer: Trainer) -> RepoResult<Trainer> {
        self.calls.borrow_mut().push("trainer");
        self.trainers.borrow_mut().push(trainer.clone());
        Ok(trainer)
    }

    fn create_shirt_set(&self, shirt_set: ShirtSet) -> RepoResult<ShirtSet> {
        self.calls.borrow_mut().push("shirt_set");
        self.shirt_sets.borrow_mut().push(shirt_set.clone());
        Ok(shirt_set)
    }

    fn create_event(&self, event: Event) -> RepoResult<Event> {
        self.calls.borrow_mut().push("event");
        self.events.borrow_mut().push(event.clone());
        Ok(event)
    }
}

/// Allocator that refuses the next `refusals` calls in one namespace.
struct RefusingAllocator {
    inner: InMemorySequenceAllocator,
    refused: &'static str,
    refusals: Cell<usize>,
}

impl RefusingAllocator {
    fn new(refused: &'static str, refusals: usize) -> Self {
        Self {
            inner: InMemorySequenceAllocator::new(),
            refused,
            refusals: Cell::new(refusals),
        }
    }
}

impl SequenceAllocator for RefusingAllocator {
    fn allocate(&self, namespace: &str) -> SequenceResult<String> {
        if namespace == self.refused && self.refusals.get() > 0 {
            self.refusals.set(self.refusals.get() - 1);
            return Err(SequenceError::InvalidNamespace(namespace.to_string()));
        }
        self.inner.allocate(namespace)
    }
}

#[test]
fn scenario_rewrites_team_and_invitation_references() {
    let conn = open_db_in_memory().unwrap();
    let group_id = create_group(&conn, "U12");
    let repo = SqliteRepository::new(&conn);
    let reconciler = ImportReconciler::new(SqliteSequenceAllocator::new(&conn), &repo);

    let summary = reconciler.import(&group_id, &scenario_snapshot());

    assert_eq!(summary.players_imported, 2);
    assert_eq!(summary.trainers_imported, 1);
    assert_eq!(summary.events_imported, 1);
    assert_eq!(summary.shirt_sets_imported, 0);
    assert!(summary.errors.is_empty(), "{:?}", summary.errors);
    assert!(summary.unresolved_references.is_empty());
    assert_eq!(summary.outcome(), ImportOutcome::Complete);

    // Players and trainers share the members namespace.
    let players = repo.list_players(&group_id).unwrap();
    let trainers = repo.list_trainers(&group_id).unwrap();
    assert_eq!(
        players.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );
    assert_eq!(players[0].first_name, "John");
    assert_eq!(trainers[0].id, "3");

    let events = repo.list_events(&group_id).unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.id, "1");
    assert_eq!(event.teams[0].id, "1");
    assert_eq!(event.teams[0].selected_players, vec![players[0].id.clone()]);
    assert_eq!(event.teams[0].trainer_id.as_deref(), Some(trainers[0].id.as_str()));
    assert_eq!(event.invitations[0].id, "1");
    assert_eq!(event.invitations[0].player_id, players[1].id);
    assert_eq!(event.invitations[0].status, InvitationStatus::Accepted);
}

#[test]
fn every_reference_resolves_when_snapshot_is_closed() {
    let gateway = RecordingGateway::default();
    let reconciler = ImportReconciler::new(InMemorySequenceAllocator::new(), &gateway);
    let snapshot = snapshot(json!({
        "players": [player("a", "A"), player("b", "B"), player("c", "C")],
        "trainers": [{"id": "coach", "firstName": "T", "lastName": "R"}],
        "shirtSets": [{"id": "kit", "sponsor": "Nike", "color": "Red",
                        "shirts": [{"number": 1, "size": "M", "isGoalkeeper": true}]}],
        "events": [{
            "id": "e", "name": "Cup", "date": "2025-03-01", "maxPlayersPerTeam": 4,
            "teams": [
                {"id": "t-a", "name": "A", "strength": 1, "startTime": "10:00",
                 "selectedPlayers": ["a", "b"], "trainerId": "coach", "shirtSetId": "kit",
                 "shirtAssignments": [{"playerId": "a", "shirtNumber": 1}, {"playerId": "b", "shirtNumber": 2}]},
                {"id": "t-b", "name": "B", "strength": 3, "startTime": "11:00",
                 "selectedPlayers": ["c"], "shirtSetId": "kit"}
            ],
            "invitations": [
                {"id": "i-a", "playerId": "a", "status": "accepted"},
                {"id": "i-c", "playerId": "c", "status": "declined"}
            ]
        }]
    }));

    let summary = reconciler.import("1", &snapshot);
    assert_eq!(summary.outcome(), ImportOutcome::Complete);

    let players = gateway.players.borrow();
    let new_id_of = |first_name: &str| {
        players
            .iter()
            .find(|p| p.first_name == first_name)
            .map(|p| p.id.clone())
            .unwrap()
    };
    let trainer_id = gateway.trainers.borrow()[0].id.clone();
    let shirt_set_id = gateway.shirt_sets.borrow()[0].id.clone();
    let events = gateway.events.borrow();
    let event = &events[0];

    let known: HashSet<String> = players
        .iter()
        .map(|p| p.id.clone())
        .chain([trainer_id.clone(), shirt_set_id.clone()])
        .collect();
    for team in &event.teams {
        for id in team
            .selected_players
            .iter()
            .chain(team.shirt_assignments.iter().map(|a| &a.player_id))
            .chain(team.trainer_id.iter())
            .chain(team.shirt_set_id.iter())
        {
            assert!(known.contains(id), "reference {id} was not rewritten");
        }
    }

    assert_eq!(event.teams[0].selected_players, vec![new_id_of("A"), new_id_of("B")]);
    assert_eq!(event.teams[0].trainer_id.as_deref(), Some(trainer_id.as_str()));
    assert_eq!(event.teams[0].shirt_set_id.as_deref(), Some(shirt_set_id.as_str()));
    assert_eq!(event.teams[0].shirt_assignments[1].player_id, new_id_of("B"));
    assert_eq!(event.teams[1].selected_players, vec![new_id_of("C")]);
    assert_eq!(event.invitations[1].player_id, new_id_of("C"));
    assert_eq!(
        event.teams.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );
}

#[test]
fn unknown_references_pass_through_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let group_id = create_group(&conn, "U10");
    let repo = SqliteRepository::new(&conn);
    let reconciler = ImportReconciler::new(SqliteSequenceAllocator::new(&conn), &repo);
    let snapshot = snapshot(json!({
        "players": [player("p1", "John")],
        "events": [{
            "id": "e1", "name": "Friendly", "date": "2025-02-01", "maxPlayersPerTeam": 6,
            "teams": [{"id": "team-1", "name": "Blue", "strength": 2, "startTime": "09:30",
                       "selectedPlayers": ["p1", "ghost-player"], "trainerId": "ghost-trainer",
                       "shirtAssignments": [{"playerId": "ghost-player", "shirtNumber": 4}]}],
            "invitations": [{"id": "i1", "playerId": "ghost-player", "status": "open"}]
        }]
    }));

    let summary = reconciler.import(&group_id, &snapshot);

    assert_eq!(summary.events_imported, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.unresolved_references.len(), 4);
    assert!(summary
        .unresolved_references
        .iter()
        .all(|warning| warning.contains("legacy id kept")));

    let event = repo.list_events(&group_id).unwrap().remove(0);
    let team = &event.teams[0];
    assert_eq!(team.selected_players, vec!["1".to_string(), "ghost-player".to_string()]);
    assert_eq!(team.trainer_id.as_deref(), Some("ghost-trainer"));
    assert_eq!(team.shirt_assignments[0].player_id, "ghost-player");
    assert_eq!(event.invitations[0].player_id, "ghost-player");
}

#[test]
fn failed_player_write_is_isolated() {
    let conn = open_db_in_memory().unwrap();
    let group_id = create_group(&conn, "U14");
    let gateway = FlakyGateway::new(&conn).failing_players(&[2]);
    let reconciler = ImportReconciler::new(SqliteSequenceAllocator::new(&conn), &gateway);
    let snapshot = snapshot(json!({
        "players": [player("p1", "One"), player("p2", "Two"), player("p3", "Three")]
    }));

    let summary = reconciler.import(&group_id, &snapshot);

    assert_eq!(summary.players_imported, 2);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("`p2`"), "{}", summary.errors[0]);
    assert!(summary.errors[0].contains("simulated store failure"));
    assert_eq!(summary.outcome(), ImportOutcome::Partial);

    // Id "2" was allocated for p2 and is burned.
    let repo = SqliteRepository::new(&conn);
    let players = repo.list_players(&group_id).unwrap();
    let names: Vec<_> = players.iter().map(|p| (p.id.as_str(), p.first_name.as_str())).collect();
    assert_eq!(names, vec![("1", "One"), ("3", "Three")]);
}

#[test]
fn events_run_after_every_other_kind() {
    let gateway = RecordingGateway::default();
    let reconciler = ImportReconciler::new(InMemorySequenceAllocator::new(), &gateway);
    // Events listed first in the document must still be processed last.
    let snapshot = LegacySnapshot::from_json(
        r#"{
            "events": [{"id": "e1", "name": "Cup", "date": "2025-05-05", "maxPlayersPerTeam": 3,
                        "teams": [{"id": "x", "name": "X", "strength": 2, "startTime": "08:00",
                                   "selectedPlayers": ["p1"], "trainerId": "t1", "shirtSetId": "s1"}]}],
            "shirtSets": [{"id": "s1", "sponsor": "Adidas", "color": "Blue", "shirts": []}],
            "trainers": [{"id": "t1", "firstName": "T", "lastName": "One"}],
            "players": [{"id": "p1", "firstName": "P", "lastName": "One", "birthYear": 2012, "level": 2}]
        }"#,
    )
    .unwrap();

    let summary = reconciler.import("1", &snapshot);

    assert_eq!(summary.outcome(), ImportOutcome::Complete);
    assert_eq!(
        *gateway.calls.borrow(),
        vec!["player", "trainer", "shirt_set", "event"]
    );
    assert!(gateway.all_ids_before_first_event());
    let team = gateway.events.borrow()[0].teams[0].clone();
    assert_eq!(team.selected_players, vec![gateway.players.borrow()[0].id.clone()]);
    assert_eq!(team.trainer_id, Some(gateway.trainers.borrow()[0].id.clone()));
    assert_eq!(team.shirt_set_id, Some(gateway.shirt_sets.borrow()[0].id.clone()));
}

#[test]
fn allocation_failure_is_reported_and_reference_falls_back() {
    let gateway = RecordingGateway::default();
    let allocator = RefusingAllocator::new(sequence::SHIRT_SETS, usize::MAX);
    let reconciler = ImportReconciler::new(allocator, &gateway);
    let snapshot = snapshot(json!({
        "shirtSets": [{"id": "s1", "sponsor": "Puma", "color": "Green", "shirts": []}],
        "events": [{"id": "e1", "name": "Cup", "date": "2025-06-01", "maxPlayersPerTeam": 5,
                    "teams": [{"id": "x", "name": "X", "strength": 2, "startTime": "08:00",
                               "selectedPlayers": [], "shirtSetId": "s1"}]}]
    }));

    let summary = reconciler.import("1", &snapshot);

    assert_eq!(summary.shirt_sets_imported, 0);
    assert_eq!(summary.events_imported, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("failed to import shirt set `s1`"));
    assert_eq!(
        gateway.events.borrow()[0].teams[0].shirt_set_id.as_deref(),
        Some("s1")
    );
}

#[test]
fn records_in_one_phase_get_ids_in_snapshot_order() {
    let gateway = RecordingGateway::default();
    let allocator = InMemorySequenceAllocator::new();
    allocator.allocate(sequence::MEMBERS).unwrap();
    let reconciler = ImportReconciler::new(&allocator, &gateway);
    let snapshot = snapshot(json!({
        "players": [player("z", "Zed"), player("a", "Amy"), player("m", "Max")]
    }));

    reconciler.import("1", &snapshot);

    let assigned: Vec<(String, String)> = gateway
        .players
        .borrow()
        .iter()
        .map(|p| (p.first_name.clone(), p.id.clone()))
        .collect();
    assert_eq!(
        assigned,
        vec![
            ("Zed".to_string(), "2".to_string()),
            ("Amy".to_string(), "3".to_string()),
            ("Max".to_string(), "4".to_string()),
        ]
    );
}

#[test]
fn expired_deadline_skips_remaining_records() {
    let gateway = RecordingGateway::default();
    let allocator = InMemorySequenceAllocator::new();
    let reconciler = ImportReconciler::new(&allocator, &gateway).with_options(ImportOptions {
        deadline: Some(Instant::now()),
    });

    let summary = reconciler.import("1", &scenario_snapshot());

    assert_eq!(summary.imported_total(), 0);
    assert_eq!(summary.errors.len(), 4);
    assert!(summary.errors.iter().all(|e| e.contains("deadline exceeded")));
    assert_eq!(summary.outcome(), ImportOutcome::Failed);
    assert!(gateway.calls.borrow().is_empty());
    assert_eq!(allocator.current(sequence::MEMBERS).unwrap(), 0);
}

#[test]
fn generous_deadline_does_not_interfere() {
    let gateway = RecordingGateway::default();
    let reconciler = ImportReconciler::new(InMemorySequenceAllocator::new(), &gateway)
        .with_options(ImportOptions {
            deadline: Some(Instant::now() + Duration::from_secs(600)),
        });

    let summary = reconciler.import("1", &scenario_snapshot());
    assert_eq!(summary.outcome(), ImportOutcome::Complete);
}

#[test]
fn concurrent_imports_into_different_groups_never_share_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("teams.db");
    let group_ids: Vec<String> = {
        let conn = open_db(&path).unwrap();
        (0..4).map(|i| create_group(&conn, &format!("G{i}"))).collect()
    };

    std::thread::scope(|scope| {
        for group_id in &group_ids {
            let path = path.clone();
            scope.spawn(move || {
                let conn = open_db(&path).unwrap();
                let repo = SqliteRepository::new(&conn);
                let reconciler =
                    ImportReconciler::new(SqliteSequenceAllocator::new(&conn), &repo);
                let summary = reconciler.import(group_id, &scenario_snapshot());
                assert_eq!(summary.outcome(), ImportOutcome::Complete, "{:?}", summary.errors);
            });
        }
    });

    let conn = open_db(&path).unwrap();
    let repo = SqliteRepository::new(&conn);
    let mut member_ids = HashSet::new();
    let mut team_ids = HashSet::new();
    for group_id in &group_ids {
        for player in repo.list_players(group_id).unwrap() {
            assert!(member_ids.insert(player.id));
        }
        for trainer in repo.list_trainers(group_id).unwrap() {
            assert!(member_ids.insert(trainer.id));
        }
        let events = repo.list_events(group_id).unwrap();
        assert_eq!(events.len(), 1);
        for team in &events[0].teams {
            assert!(team_ids.insert(team.id.clone()));
            // Team references stay inside the importing group.
            let player = repo.get_player(&team.selected_players[0]).unwrap().unwrap();
            assert_eq!(&player.group_id, group_id);
        }
    }
    assert_eq!(member_ids.len(), 12);
    assert_eq!(team_ids.len(), 4);
}

fn two_event_snapshot() -> LegacySnapshot {
    snapshot(json!({
        "players": [player("p1", "John")],
        "events": [
            {"id": "e1", "name": "Morning", "date": "2025-04-01", "maxPlayersPerTeam": 5,
             "teams": [{"id": "team-1", "name": "Red", "strength": 1, "startTime": "09:00",
                        "selectedPlayers": ["p1", "ghost"]}],
             "invitations": [{"id": "i1", "playerId": "p1", "status": "open"}]},
            {"id": "e2", "name": "Evening", "date": "2025-04-01", "maxPlayersPerTeam": 5,
             "teams": [{"id": "team-2", "name": "Blue", "strength": 2, "startTime": "18:00",
                        "selectedPlayers": ["p1"]}],
             "invitations": [{"id": "i2", "playerId": "p1", "status": "accepted"}]}
        ]
    }))
}

#[test]
fn team_allocation_failure_drops_only_that_event() {
    let conn = open_db_in_memory().unwrap();
    let group_id = create_group(&conn, "U11");
    let repo = SqliteRepository::new(&conn);
    let reconciler =
        ImportReconciler::new(RefusingAllocator::new(sequence::TEAMS, 1), &repo);

    let summary = reconciler.import(&group_id, &two_event_snapshot());

    assert_eq!(summary.players_imported, 1);
    assert_eq!(summary.events_imported, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("failed to import event `e1`"), "{}", summary.errors[0]);
    // The ghost reference lived in the dropped event.
    assert!(summary.unresolved_references.is_empty());
    assert_eq!(summary.outcome(), ImportOutcome::Partial);

    let events = repo.list_events(&group_id).unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.id, "2", "event id 1 is burned");
    assert_eq!(event.name, "Evening");
    assert_eq!(event.teams[0].id, "1");
    assert_eq!(event.teams[0].selected_players, vec!["1".to_string()]);
    assert_eq!(event.invitations[0].id, "1");
    assert_eq!(event.invitations[0].player_id, "1");
}

#[test]
fn event_write_failure_drops_only_that_event() {
    let conn = open_db_in_memory().unwrap();
    let group_id = create_group(&conn, "U11");
    let gateway = FlakyGateway::new(&conn).failing_events(&[1]);
    let reconciler = ImportReconciler::new(SqliteSequenceAllocator::new(&conn), &gateway);

    let summary = reconciler.import(&group_id, &two_event_snapshot());

    assert_eq!(summary.events_imported, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("failed to import event `e1`"));
    assert!(summary.errors[0].contains("simulated store failure"));
    assert!(summary.unresolved_references.is_empty());

    let repo = SqliteRepository::new(&conn);
    assert!(repo.get_event("1").unwrap().is_none());
    let events = repo.list_events(&group_id).unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.id, "2");
    // Team and invitation ids of the failed event are burned as well.
    assert_eq!(event.teams[0].id, "2");
    assert_eq!(event.invitations[0].id, "2");
    assert_eq!(event.teams[0].selected_players, vec!["1".to_string()]);
    assert_eq!(event.invitations[0].player_id, "1");
}

#[test]
fn failed_player_keeps_its_burned_id_in_later_references() {
    let conn = open_db_in_memory().unwrap();
    let group_id = create_group(&conn, "U13");
    let gateway = FlakyGateway::new(&conn).failing_players(&[1]);
    let reconciler = ImportReconciler::new(SqliteSequenceAllocator::new(&conn), &gateway);
    let snapshot = snapshot(json!({
        "players": [player("p1", "Lost"), player("p2", "Kept")],
        "events": [{"id": "e1", "name": "Cup", "date": "2025-07-01", "maxPlayersPerTeam": 5,
                    "teams": [{"id": "x", "name": "X", "strength": 2, "startTime": "10:00",
                               "selectedPlayers": ["p1", "p2"]}],
                    "invitations": [{"id": "i1", "playerId": "p1", "status": "open"}]}]
    }));

    let summary = reconciler.import(&group_id, &snapshot);

    assert_eq!(summary.players_imported, 1);
    assert_eq!(summary.events_imported, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("`p1`"));
    // The mapping exists, so nothing is reported as unresolved.
    assert!(summary.unresolved_references.is_empty());

    let repo = SqliteRepository::new(&conn);
    assert!(repo.get_player("1").unwrap().is_none());
    assert_eq!(repo.get_player("2").unwrap().unwrap().first_name, "Kept");
    let event = repo.list_events(&group_id).unwrap().remove(0);
    assert_eq!(event.invitations[0].player_id, "1");
    assert_eq!(
        event.teams[0].selected_players,
        vec!["1".to_string(), "2".to_string()]
    );
}
