//! SQLite implementation of the group-scoped store.
//!
//! Embedded substructures (shirts, teams, invitations) are stored as JSON
//! documents on their parent row, so each create is a single `INSERT`.

use super::{GroupRepository, RepoError, RepoResult, RepositoryGateway};
use crate::model::event::{Event, Invitation, Team};
use crate::model::group::Group;
use crate::model::member::{MemberRole, Player, Trainer};
use crate::model::shirt_set::{Shirt, ShirtSet};
use crate::model::GroupId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    id,
    group_id,
    role,
    first_name,
    last_name,
    email,
    birth_year,
    birth_date,
    level
FROM members";

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    group_id,
    name,
    event_date,
    max_players_per_team,
    location,
    teams_json,
    invitations_json
FROM events";

const SHIRT_SET_SELECT_SQL: &str = "SELECT
    id,
    group_id,
    sponsor,
    color,
    shirts_json
FROM shirt_sets";

/// SQLite-backed store for groups, members, shirt sets and events.
pub struct SqliteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepository<'conn> {
    /// Wraps a migrated connection obtained from [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn get_player(&self, id: &str) -> RepoResult<Option<Player>> {
        self.get_member(id, MemberRole::Player)?
            .map(|row| row.into_player())
            .transpose()
    }

    pub fn get_trainer(&self, id: &str) -> RepoResult<Option<Trainer>> {
        Ok(self
            .get_member(id, MemberRole::Trainer)?
            .map(MemberRow::into_trainer))
    }

    /// Lists players of one group ordered by numeric id.
    pub fn list_players(&self, group_id: &str) -> RepoResult<Vec<Player>> {
        self.list_members(group_id, MemberRole::Player)?
            .into_iter()
            .map(MemberRow::into_player)
            .collect()
    }

    /// Lists trainers of one group ordered by numeric id.
    pub fn list_trainers(&self, group_id: &str) -> RepoResult<Vec<Trainer>> {
        Ok(self
            .list_members(group_id, MemberRole::Trainer)?
            .into_iter()
            .map(MemberRow::into_trainer)
            .collect())
    }

    pub fn get_shirt_set(&self, id: &str) -> RepoResult<Option<ShirtSet>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SHIRT_SET_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_shirt_set_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_shirt_sets(&self, group_id: &str) -> RepoResult<Vec<ShirtSet>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SHIRT_SET_SELECT_SQL}
             WHERE group_id = ?1
             ORDER BY CAST(id AS INTEGER) ASC;"
        ))?;
        let mut rows = stmt.query([group_id])?;
        let mut shirt_sets = Vec::new();
        while let Some(row) = rows.next()? {
            shirt_sets.push(parse_shirt_set_row(row)?);
        }
        Ok(shirt_sets)
    }

    pub fn get_event(&self, id: &str) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_event_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_events(&self, group_id: &str) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE group_id = ?1
             ORDER BY CAST(id AS INTEGER) ASC;"
        ))?;
        let mut rows = stmt.query([group_id])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn get_member(&self, id: &str, role: MemberRole) -> RepoResult<Option<MemberRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE id = ?1 AND role = ?2;"))?;
        let mut rows = stmt.query(params![id, role.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_member_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_members(&self, group_id: &str, role: MemberRole) -> RepoResult<Vec<MemberRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             WHERE group_id = ?1 AND role = ?2
             ORDER BY CAST(id AS INTEGER) ASC;"
        ))?;
        let mut rows = stmt.query(params![group_id, role.as_str()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }
}

impl RepositoryGateway for SqliteRepository<'_> {
    fn create_player(&self, player: Player) -> RepoResult<Player> {
        player.validate()?;
        self.conn.execute(
            "INSERT INTO members (
                id,
                group_id,
                role,
                first_name,
                last_name,
                birth_year,
                birth_date,
                level
            ) VALUES (?1, ?2, 'player', ?3, ?4, ?5, ?6, ?7);",
            params![
                player.id,
                player.group_id,
                player.first_name,
                player.last_name,
                player.birth_year,
                player.birth_date,
                player.level,
            ],
        )?;
        Ok(player)
    }

    fn create_trainer(&self, trainer: Trainer) -> RepoResult<Trainer> {
        trainer.validate()?;
        self.conn.execute(
            "INSERT INTO members (
                id,
                group_id,
                role,
                first_name,
                last_name,
                email
            ) VALUES (?1, ?2, 'trainer', ?3, ?4, ?5);",
            params![
                trainer.id,
                trainer.group_id,
                trainer.first_name,
                trainer.last_name,
                trainer.email,
            ],
        )?;
        Ok(trainer)
    }

    fn create_shirt_set(&self, shirt_set: ShirtSet) -> RepoResult<ShirtSet> {
        shirt_set.validate()?;
        let shirts_json = serde_json::to_string(&shirt_set.shirts)?;
        self.conn.execute(
            "INSERT INTO shirt_sets (id, group_id, sponsor, color, shirts_json)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                shirt_set.id,
                shirt_set.group_id,
                shirt_set.sponsor,
                shirt_set.color,
                shirts_json,
            ],
        )?;
        Ok(shirt_set)
    }

    fn create_event(&self, event: Event) -> RepoResult<Event> {
        event.validate()?;
        let teams_json = serde_json::to_string(&event.teams)?;
        let invitations_json = serde_json::to_string(&event.invitations)?;
        self.conn.execute(
            "INSERT INTO events (
                id,
                group_id,
                name,
                event_date,
                max_players_per_team,
                location,
                teams_json,
                invitations_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                event.id,
                event.group_id,
                event.name,
                event.date,
                event.max_players_per_team,
                event.location,
                teams_json,
                invitations_json,
            ],
        )?;
        Ok(event)
    }
}

impl GroupRepository for SqliteRepository<'_> {
    fn create_group(&self, group: &Group) -> RepoResult<Group> {
        group.validate()?;
        self.conn.execute(
            "INSERT INTO groups (id, name, club) VALUES (?1, ?2, ?3);",
            params![group.id, group.name, group.club],
        )?;
        self.get_group(&group.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created group `{}` not found in read-back", group.id))
        })
    }

    fn get_group(&self, id: &str) -> RepoResult<Option<Group>> {
        self.conn
            .query_row(
                "SELECT id, name, club, created_at FROM groups WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Group {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        club: row.get("club")?,
                        created_at: row.get("created_at")?,
                    })
                },
            )
            .optional()
            .map_err(RepoError::from)
    }
}

/// Raw `members` row before role-specific projection.
struct MemberRow {
    id: String,
    group_id: GroupId,
    first_name: String,
    last_name: String,
    email: Option<String>,
    birth_year: Option<i32>,
    birth_date: Option<String>,
    level: Option<i32>,
}

impl MemberRow {
    fn into_player(self) -> RepoResult<Player> {
        let level = self.level.ok_or_else(|| {
            RepoError::InvalidData(format!("player `{}` has no level in members.level", self.id))
        })?;
        Ok(Player {
            id: self.id,
            group_id: self.group_id,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_year: self.birth_year,
            birth_date: self.birth_date,
            level,
        })
    }

    fn into_trainer(self) -> Trainer {
        Trainer {
            id: self.id,
            group_id: self.group_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<MemberRow> {
    let role_text: String = row.get("role")?;
    if MemberRole::parse(&role_text).is_none() {
        return Err(RepoError::InvalidData(format!(
            "invalid member role `{role_text}` in members.role"
        )));
    }

    Ok(MemberRow {
        id: row.get("id")?,
        group_id: row.get("group_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        birth_year: row.get("birth_year")?,
        birth_date: row.get("birth_date")?,
        level: row.get("level")?,
    })
}

fn parse_shirt_set_row(row: &Row<'_>) -> RepoResult<ShirtSet> {
    let shirts_json: String = row.get("shirts_json")?;
    let shirts: Vec<Shirt> = serde_json::from_str(&shirts_json)?;
    Ok(ShirtSet {
        id: row.get("id")?,
        group_id: row.get("group_id")?,
        sponsor: row.get("sponsor")?,
        color: row.get("color")?,
        shirts,
    })
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let teams_json: String = row.get("teams_json")?;
    let invitations_json: String = row.get("invitations_json")?;
    let teams: Vec<Team> = serde_json::from_str(&teams_json)?;
    let invitations: Vec<Invitation> = serde_json::from_str(&invitations_json)?;

    let event = Event {
        id: row.get("id")?,
        group_id: row.get("group_id")?,
        name: row.get("name")?,
        date: row.get("event_date")?,
        max_players_per_team: row.get("max_players_per_team")?,
        location: row.get("location")?,
        teams,
        invitations,
    };
    event.validate()?;
    Ok(event)
}
