//! Legacy snapshot import and reference reconciliation.
//!
//! # Responsibility
//! - Replay a legacy export into one group, allocating fresh ids for every
//!   record through the shared sequence allocator.
//! - Rewrite team, invitation and shirt-assignment references from legacy ids
//!   to the newly allocated ids.
//! - Report per-record failures without aborting the run.
//!
//! # Invariants
//! - Phases run as players, trainers, shirt sets, then events. Events can
//!   only read a [`FrozenTranslation`], which exists once the first three
//!   phases have returned.
//! - Within a phase records are processed in snapshot order, so allocation
//!   order follows input order.
//! - A reference without a mapping keeps its legacy value and is reported
//!   as a warning, never as a failure.
//! - No rollback: records persisted before a failure stay persisted, and
//!   ids allocated for failed records are burned.
//! - The translation table lives for one call only.

use crate::model::event::{Event, Invitation, ShirtAssignment, Team};
use crate::model::legacy::{
    LegacyEvent, LegacyId, LegacyPlayer, LegacyShirtSet, LegacySnapshot, LegacyTeam,
    LegacyTrainer,
};
use crate::model::member::{Player, Trainer};
use crate::model::shirt_set::ShirtSet;
use crate::model::EntityId;
use crate::repo::{RepoError, RepositoryGateway};
use crate::sequence::{self, SequenceAllocator, SequenceError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Result of one import call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub players_imported: usize,
    pub trainers_imported: usize,
    pub events_imported: usize,
    pub shirt_sets_imported: usize,
    /// One entry per failed or skipped record, in processing order.
    pub errors: Vec<String>,
    /// References kept as legacy values because nothing in the snapshot
    /// mapped them. Informational only.
    #[serde(default)]
    pub unresolved_references: Vec<String>,
}

/// Coarse classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    /// Snapshot contained nothing to import.
    Empty,
    /// Every record was imported.
    Complete,
    /// Some records imported, some failed.
    Partial,
    /// Nothing imported, every record failed.
    Failed,
}

impl ImportSummary {
    pub fn imported_total(&self) -> usize {
        self.players_imported
            + self.trainers_imported
            + self.events_imported
            + self.shirt_sets_imported
    }

    pub fn outcome(&self) -> ImportOutcome {
        match (self.imported_total(), self.errors.len()) {
            (0, 0) => ImportOutcome::Empty,
            (_, 0) => ImportOutcome::Complete,
            (0, _) => ImportOutcome::Failed,
            _ => ImportOutcome::Partial,
        }
    }
}

/// Tunables for one import call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Checked before each record starts. Records reached after the deadline
    /// are skipped and reported; a record already started always finishes.
    pub deadline: Option<Instant>,
}

/// Failure of a single record.
#[derive(Debug)]
pub enum RecordError {
    Allocation(SequenceError),
    Persistence(RepoError),
    DeadlineExceeded,
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::DeadlineExceeded => write!(f, "skipped, import deadline exceeded"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::DeadlineExceeded => None,
        }
    }
}

impl From<SequenceError> for RecordError {
    fn from(value: SequenceError) -> Self {
        Self::Allocation(value)
    }
}

impl From<RepoError> for RecordError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportPhase {
    Players,
    Trainers,
    ShirtSets,
    Events,
}

impl ImportPhase {
    fn as_str(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Trainers => "trainers",
            Self::ShirtSets => "shirt_sets",
            Self::Events => "events",
        }
    }

    fn record_label(self) -> &'static str {
        match self {
            Self::Players => "player",
            Self::Trainers => "trainer",
            Self::ShirtSets => "shirt set",
            Self::Events => "event",
        }
    }
}

/// Entity kinds a team or invitation can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ReferenceKind {
    Player,
    Trainer,
    ShirtSet,
}

impl ReferenceKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Trainer => "trainer",
            Self::ShirtSet => "shirt set",
        }
    }
}

/// Write side of the legacy → new id mapping, filled during phases 1-3.
#[derive(Debug, Default)]
pub(crate) struct TranslationTable {
    entries: HashMap<(ReferenceKind, LegacyId), EntityId>,
}

impl TranslationTable {
    fn record(&mut self, kind: ReferenceKind, legacy_id: &str, new_id: &str) {
        let previous = self
            .entries
            .insert((kind, legacy_id.to_string()), new_id.to_string());
        if let Some(previous) = previous {
            debug!(
                "event=import_translation module=import status=overwrite kind={} old_id={} new_id={}",
                kind.as_str(),
                previous,
                new_id
            );
        }
    }

    /// Ends the write side. Only the frozen table can resolve references.
    pub(crate) fn freeze(self) -> FrozenTranslation {
        FrozenTranslation {
            entries: self.entries,
        }
    }
}

/// Read-only mapping consulted while rewriting event references.
#[derive(Debug)]
pub(crate) struct FrozenTranslation {
    entries: HashMap<(ReferenceKind, LegacyId), EntityId>,
}

impl FrozenTranslation {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn lookup(&self, kind: ReferenceKind, legacy_id: &str) -> Option<&EntityId> {
        self.entries.get(&(kind, legacy_id.to_string()))
    }
}

/// Rewrites references of one event, collecting the ones left unmapped.
struct ReferenceRewriter<'t> {
    table: &'t FrozenTranslation,
    event_legacy_id: &'t str,
    unresolved: Vec<String>,
}

impl<'t> ReferenceRewriter<'t> {
    fn new(table: &'t FrozenTranslation, event_legacy_id: &'t str) -> Self {
        Self {
            table,
            event_legacy_id,
            unresolved: Vec::new(),
        }
    }

    fn rewrite(&mut self, kind: ReferenceKind, field: &str, legacy_id: &str) -> EntityId {
        match self.table.lookup(kind, legacy_id) {
            Some(new_id) => new_id.clone(),
            None => {
                self.unresolved.push(format!(
                    "event `{}`: {field} references unknown {} `{legacy_id}`; legacy id kept",
                    self.event_legacy_id,
                    kind.as_str()
                ));
                legacy_id.to_string()
            }
        }
    }

    fn rewrite_team(&mut self, legacy: &LegacyTeam, new_id: EntityId) -> Team {
        let field_prefix = format!("team `{}`", legacy.legacy_id);
        let selected_players = legacy
            .selected_players
            .iter()
            .map(|player_id| {
                self.rewrite(
                    ReferenceKind::Player,
                    &format!("{field_prefix} selectedPlayers"),
                    player_id,
                )
            })
            .collect();
        let trainer_id = legacy.trainer_id.as_deref().map(|trainer_id| {
            self.rewrite(
                ReferenceKind::Trainer,
                &format!("{field_prefix} trainerId"),
                trainer_id,
            )
        });
        let shirt_set_id = legacy.shirt_set_id.as_deref().map(|shirt_set_id| {
            self.rewrite(
                ReferenceKind::ShirtSet,
                &format!("{field_prefix} shirtSetId"),
                shirt_set_id,
            )
        });
        let shirt_assignments = legacy
            .shirt_assignments
            .iter()
            .map(|assignment| ShirtAssignment {
                player_id: self.rewrite(
                    ReferenceKind::Player,
                    &format!("{field_prefix} shirtAssignments"),
                    &assignment.player_id,
                ),
                shirt_number: assignment.shirt_number,
            })
            .collect();

        Team {
            id: new_id,
            name: legacy.name.clone(),
            strength: legacy.strength,
            start_time: legacy.start_time.clone(),
            selected_players,
            trainer_id,
            shirt_set_id,
            shirt_assignments,
        }
    }
}

/// Mutable state of one import call.
struct ImportRun {
    summary: ImportSummary,
    deadline: Option<Instant>,
}

impl ImportRun {
    fn deadline_passed(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn record_failure(
        &mut self,
        phase: ImportPhase,
        legacy_id: &str,
        label: &str,
        err: &RecordError,
    ) {
        warn!(
            "event=import_record module=import status=error phase={} legacy_id={} error={}",
            phase.as_str(),
            legacy_id,
            err
        );
        self.summary.errors.push(format!(
            "failed to import {} `{legacy_id}` ({label}): {err}",
            phase.record_label()
        ));
    }
}

/// Replays legacy snapshots into the group-scoped store.
pub struct ImportReconciler<A: SequenceAllocator, G: RepositoryGateway> {
    allocator: A,
    gateway: G,
    options: ImportOptions,
}

impl<A: SequenceAllocator, G: RepositoryGateway> ImportReconciler<A, G> {
    pub fn new(allocator: A, gateway: G) -> Self {
        Self {
            allocator,
            gateway,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Imports `snapshot` into `group_id`.
    ///
    /// The caller guarantees the group exists. Per-record failures are
    /// reported in the returned summary; this call itself does not fail.
    pub fn import(&self, group_id: &str, snapshot: &LegacySnapshot) -> ImportSummary {
        let started_at = Instant::now();
        info!(
            "event=import module=import status=start group_id={} players={} trainers={} shirt_sets={} events={}",
            group_id,
            snapshot.players.len(),
            snapshot.trainers.len(),
            snapshot.shirt_sets.len(),
            snapshot.events.len()
        );

        let mut run = ImportRun {
            summary: ImportSummary::default(),
            deadline: self.options.deadline,
        };
        let mut table = TranslationTable::default();

        self.run_phase(&mut run, ImportPhase::Players, &snapshot.players, |run, player| {
            self.import_player(run, &mut table, group_id, player)
        });
        self.run_phase(&mut run, ImportPhase::Trainers, &snapshot.trainers, |run, trainer| {
            self.import_trainer(run, &mut table, group_id, trainer)
        });
        self.run_phase(
            &mut run,
            ImportPhase::ShirtSets,
            &snapshot.shirt_sets,
            |run, shirt_set| self.import_shirt_set(run, &mut table, group_id, shirt_set),
        );

        // Barrier: the table is complete for every referenced kind from here on.
        let translation = table.freeze();
        debug!(
            "event=import_barrier module=import status=ok mapped={}",
            translation.len()
        );

        self.run_phase(&mut run, ImportPhase::Events, &snapshot.events, |run, event| {
            self.import_event(run, &translation, group_id, event)
        });

        let summary = run.summary;
        info!(
            "event=import module=import status=ok group_id={} outcome={:?} imported={} failed={} unresolved={} duration_ms={}",
            group_id,
            summary.outcome(),
            summary.imported_total(),
            summary.errors.len(),
            summary.unresolved_references.len(),
            started_at.elapsed().as_millis()
        );
        summary
    }

    fn run_phase<T>(
        &self,
        run: &mut ImportRun,
        phase: ImportPhase,
        records: &[T],
        mut import_one: impl FnMut(&mut ImportRun, &T) -> bool,
    ) where
        T: LegacyRecord,
    {
        let started_at = Instant::now();
        let mut imported = 0usize;
        let mut failed = 0usize;

        for record in records {
            if run.deadline_passed() {
                run.record_failure(
                    phase,
                    record.legacy_id(),
                    &record.label(),
                    &RecordError::DeadlineExceeded,
                );
                failed += 1;
                continue;
            }
            if import_one(run, record) {
                imported += 1;
            } else {
                failed += 1;
            }
        }

        info!(
            "event=import_phase module=import status=ok phase={} imported={} failed={} duration_ms={}",
            phase.as_str(),
            imported,
            failed,
            started_at.elapsed().as_millis()
        );
    }

    fn import_player(
        &self,
        run: &mut ImportRun,
        table: &mut TranslationTable,
        group_id: &str,
        legacy: &LegacyPlayer,
    ) -> bool {
        let result = self
            .allocate_mapped(table, ReferenceKind::Player, sequence::MEMBERS, &legacy.legacy_id)
            .and_then(|id| {
                let player = Player {
                    id,
                    group_id: group_id.to_string(),
                    first_name: legacy.first_name.clone(),
                    last_name: legacy.last_name.clone(),
                    birth_year: Some(legacy.birth_year),
                    birth_date: legacy.birth_date.clone(),
                    level: legacy.level,
                };
                Ok(self.gateway.create_player(player)?)
            });
        match result {
            Ok(_) => {
                run.summary.players_imported += 1;
                true
            }
            Err(err) => {
                run.record_failure(ImportPhase::Players, &legacy.legacy_id, &legacy.label(), &err);
                false
            }
        }
    }

    fn import_trainer(
        &self,
        run: &mut ImportRun,
        table: &mut TranslationTable,
        group_id: &str,
        legacy: &LegacyTrainer,
    ) -> bool {
        let result = self
            .allocate_mapped(table, ReferenceKind::Trainer, sequence::MEMBERS, &legacy.legacy_id)
            .and_then(|id| {
                let trainer = Trainer {
                    id,
                    group_id: group_id.to_string(),
                    first_name: legacy.first_name.clone(),
                    last_name: legacy.last_name.clone(),
                    email: legacy.email.clone(),
                };
                Ok(self.gateway.create_trainer(trainer)?)
            });
        match result {
            Ok(_) => {
                run.summary.trainers_imported += 1;
                true
            }
            Err(err) => {
                run.record_failure(ImportPhase::Trainers, &legacy.legacy_id, &legacy.label(), &err);
                false
            }
        }
    }

    fn import_shirt_set(
        &self,
        run: &mut ImportRun,
        table: &mut TranslationTable,
        group_id: &str,
        legacy: &LegacyShirtSet,
    ) -> bool {
        let result = self
            .allocate_mapped(
                table,
                ReferenceKind::ShirtSet,
                sequence::SHIRT_SETS,
                &legacy.legacy_id,
            )
            .and_then(|id| {
                let shirt_set = ShirtSet {
                    id,
                    group_id: group_id.to_string(),
                    sponsor: legacy.sponsor.clone(),
                    color: legacy.color.clone(),
                    shirts: legacy.shirts.clone(),
                };
                Ok(self.gateway.create_shirt_set(shirt_set)?)
            });
        match result {
            Ok(_) => {
                run.summary.shirt_sets_imported += 1;
                true
            }
            Err(err) => {
                run.record_failure(ImportPhase::ShirtSets, &legacy.legacy_id, &legacy.label(), &err);
                false
            }
        }
    }

    fn import_event(
        &self,
        run: &mut ImportRun,
        translation: &FrozenTranslation,
        group_id: &str,
        legacy: &LegacyEvent,
    ) -> bool {
        let mut rewriter = ReferenceRewriter::new(translation, &legacy.legacy_id);
        let result = self
            .build_event(&mut rewriter, group_id, legacy)
            .and_then(|event| Ok(self.gateway.create_event(event)?));

        match result {
            Ok(event) => {
                debug!(
                    "event=import_record module=import status=ok phase=events legacy_id={} new_id={} teams={} invitations={}",
                    legacy.legacy_id,
                    event.id,
                    event.teams.len(),
                    event.invitations.len()
                );
                if !rewriter.unresolved.is_empty() {
                    warn!(
                        "event=import_reference module=import status=unresolved legacy_id={} count={}",
                        legacy.legacy_id,
                        rewriter.unresolved.len()
                    );
                }
                run.summary
                    .unresolved_references
                    .append(&mut rewriter.unresolved);
                run.summary.events_imported += 1;
                true
            }
            Err(err) => {
                run.record_failure(ImportPhase::Events, &legacy.legacy_id, &legacy.label(), &err);
                false
            }
        }
    }

    /// Allocates every id the event needs and assembles the rewritten document.
    fn build_event(
        &self,
        rewriter: &mut ReferenceRewriter<'_>,
        group_id: &str,
        legacy: &LegacyEvent,
    ) -> Result<Event, RecordError> {
        let event_id = self.allocator.allocate(sequence::EVENTS)?;

        let mut teams = Vec::with_capacity(legacy.teams.len());
        for legacy_team in &legacy.teams {
            let team_id = self.allocator.allocate(sequence::TEAMS)?;
            teams.push(rewriter.rewrite_team(legacy_team, team_id));
        }

        let mut invitations = Vec::with_capacity(legacy.invitations.len());
        for legacy_invitation in &legacy.invitations {
            let invitation_id = self.allocator.allocate(sequence::INVITATIONS)?;
            let player_id = rewriter.rewrite(
                ReferenceKind::Player,
                &format!("invitation `{}` playerId", legacy_invitation.legacy_id),
                &legacy_invitation.player_id,
            );
            invitations.push(Invitation {
                id: invitation_id,
                player_id,
                status: legacy_invitation.status,
            });
        }

        Ok(Event {
            id: event_id,
            group_id: group_id.to_string(),
            name: legacy.name.clone(),
            date: legacy.date.clone(),
            max_players_per_team: legacy.max_players_per_team,
            location: legacy.location.clone(),
            teams,
            invitations,
        })
    }

    /// Allocates an id and maps it before the record is persisted.
    fn allocate_mapped(
        &self,
        table: &mut TranslationTable,
        kind: ReferenceKind,
        namespace: &str,
        legacy_id: &str,
    ) -> Result<EntityId, RecordError> {
        let new_id = self.allocator.allocate(namespace)?;
        table.record(kind, legacy_id, &new_id);
        Ok(new_id)
    }
}

/// Identity of a top-level legacy record for reporting.
trait LegacyRecord {
    fn legacy_id(&self) -> &str;
    fn label(&self) -> String;
}

impl LegacyRecord for LegacyPlayer {
    fn legacy_id(&self) -> &str {
        &self.legacy_id
    }

    fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl LegacyRecord for LegacyTrainer {
    fn legacy_id(&self) -> &str {
        &self.legacy_id
    }

    fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl LegacyRecord for LegacyShirtSet {
    fn legacy_id(&self) -> &str {
        &self.legacy_id
    }

    fn label(&self) -> String {
        format!("{} {}", self.sponsor, self.color)
    }
}

impl LegacyRecord for LegacyEvent {
    fn legacy_id(&self) -> &str {
        &self.legacy_id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{ImportOutcome, ImportSummary, ReferenceKind, ReferenceRewriter, TranslationTable};
    use crate::model::legacy::{LegacyShirtAssignment, LegacyTeam};

    fn legacy_team() -> LegacyTeam {
        LegacyTeam {
            legacy_id: "team-1".to_string(),
            name: "Red".to_string(),
            strength: 2,
            start_time: "09:00".to_string(),
            selected_players: vec!["p1".to_string(), "ghost".to_string()],
            trainer_id: Some("t1".to_string()),
            shirt_set_id: Some("s1".to_string()),
            shirt_assignments: vec![LegacyShirtAssignment {
                player_id: "p1".to_string(),
                shirt_number: 9,
            }],
        }
    }

    #[test]
    fn rewriter_maps_known_ids_and_keeps_unknown_ones() {
        let mut table = TranslationTable::default();
        table.record(ReferenceKind::Player, "p1", "10");
        table.record(ReferenceKind::Trainer, "t1", "11");
        let frozen = table.freeze();
        assert_eq!(frozen.len(), 2);

        let mut rewriter = ReferenceRewriter::new(&frozen, "e1");
        let team = rewriter.rewrite_team(&legacy_team(), "5".to_string());

        assert_eq!(team.id, "5");
        assert_eq!(team.selected_players, vec!["10", "ghost"]);
        assert_eq!(team.trainer_id.as_deref(), Some("11"));
        assert_eq!(team.shirt_set_id.as_deref(), Some("s1"));
        assert_eq!(team.shirt_assignments[0].player_id, "10");
        assert_eq!(rewriter.unresolved.len(), 2);
        assert!(rewriter.unresolved[0].contains("`ghost`"));
        assert!(rewriter.unresolved[1].contains("shirtSetId"));
    }

    #[test]
    fn lookups_are_scoped_by_reference_kind() {
        let mut table = TranslationTable::default();
        table.record(ReferenceKind::Trainer, "x", "3");
        let frozen = table.freeze();

        assert_eq!(frozen.lookup(ReferenceKind::Trainer, "x").map(String::as_str), Some("3"));
        assert_eq!(frozen.lookup(ReferenceKind::Player, "x"), None);
    }

    #[test]
    fn outcome_distinguishes_empty_complete_partial_failed() {
        let mut summary = ImportSummary::default();
        assert_eq!(summary.outcome(), ImportOutcome::Empty);

        summary.errors.push("failed".to_string());
        assert_eq!(summary.outcome(), ImportOutcome::Failed);

        summary.players_imported = 2;
        assert_eq!(summary.outcome(), ImportOutcome::Partial);

        summary.errors.clear();
        assert_eq!(summary.outcome(), ImportOutcome::Complete);
    }

    #[test]
    fn summary_serializes_with_camel_case_counters() {
        let summary = ImportSummary {
            shirt_sets_imported: 1,
            ..ImportSummary::default()
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["shirtSetsImported"], 1);
        assert_eq!(value["playersImported"], 0);
        assert!(value["errors"].as_array().unwrap().is_empty());
    }
}
