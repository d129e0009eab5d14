//! In-process implementation of every repository trait.
//!
//! Mirrors the PostgreSQL schema rules: unique keys, foreign keys and cascading
//! deletes. Each compound write happens under a single write lock.

use crate::error::{RepoResult, RepositoryError};
use crate::models::{Bet, Comment, Event, Group, Member, User, UserProfile};
use crate::repositories::{
    BetRepository, CommentRepository, EventRepository, GroupRepository, MemberRepository,
    UserRepository,
};
use crate::scoring::{self, Scoreline};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, UserProfile>,
    /// token digest -> user id
    tokens: HashMap<String, Uuid>,
    groups: HashMap<Uuid, Group>,
    /// (group id, user id) -> member
    members: HashMap<(Uuid, Uuid), Member>,
    events: HashMap<Uuid, Event>,
    bets: HashMap<Uuid, Bet>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn require_user(&self, id: Uuid) -> RepoResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::ConstraintViolation(format!("user {} does not exist", id)))
        }
    }

    fn require_group(&self, id: Uuid) -> RepoResult<()> {
        if self.groups.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::ConstraintViolation(format!("group {} does not exist", id)))
        }
    }

    fn remove_event_cascade(&mut self, id: Uuid) -> bool {
        if self.events.remove(&id).is_none() {
            return false;
        }
        self.bets.retain(|_, bet| bet.event_id != id);
        true
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(
        &self,
        user: &User,
        profile: &UserProfile,
        token_digest: &str,
    ) -> RepoResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Duplicate(format!(
                "username {} is taken",
                user.username
            )));
        }
        if t.tokens.contains_key(token_digest) {
            return Err(RepositoryError::Duplicate("token already issued".to_string()));
        }
        t.users.insert(user.id, user.clone());
        t.profiles.insert(
            user.id,
            UserProfile {
                user_id: user.id,
                ..profile.clone()
            },
        );
        t.tokens.insert(token_digest.to_string(), user.id);
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_token_digest(&self, digest: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.tokens.get(digest).and_then(|id| t.users.get(id)).cloned())
    }

    async fn replace_token(&self, user_id: Uuid, token_digest: &str) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(RepositoryError::NotFound("User not found".to_string()));
        }
        t.tokens.retain(|_, owner| *owner != user_id);
        t.tokens.insert(token_digest.to_string(), user_id);
        Ok(())
    }

    async fn find_many(&self, ids: &[Uuid]) -> RepoResult<Vec<User>> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = ids.iter().filter_map(|id| t.users.get(id)).cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users.dedup_by_key(|u| u.id);
        Ok(users)
    }

    async fn find_profile(&self, user_id: Uuid) -> RepoResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn find_profiles(&self, user_ids: &[Uuid]) -> RepoResult<Vec<UserProfile>> {
        let t = self.tables.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| t.profiles.get(id))
            .cloned()
            .collect())
    }

    async fn update_profile(&self, profile: &UserProfile) -> RepoResult<UserProfile> {
        let mut t = self.tables.write().await;
        let stored = t
            .profiles
            .get_mut(&profile.user_id)
            .ok_or_else(|| RepositoryError::NotFound("Profile not found".to_string()))?;
        stored.image = profile.image.clone();
        stored.bio = profile.bio.clone();
        Ok(stored.clone())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: &Group, founder: &Member) -> RepoResult<Group> {
        let mut t = self.tables.write().await;
        if t
            .groups
            .values()
            .any(|g| g.name == group.name && g.location == group.location)
        {
            return Err(RepositoryError::Duplicate(format!(
                "group {} in {} already exists",
                group.name, group.location
            )));
        }
        t.require_user(founder.user_id)?;
        t.groups.insert(group.id, group.clone());
        t.members.insert(
            (group.id, founder.user_id),
            Member {
                group_id: group.id,
                ..founder.clone()
            },
        );
        Ok(group.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Group>> {
        let t = self.tables.read().await;
        let mut groups: Vec<Group> = t.groups.values().cloned().collect();
        groups.sort_by(|a, b| (&a.name, &a.location).cmp(&(&b.name, &b.location)));
        Ok(groups)
    }

    async fn update(&self, group: &Group) -> RepoResult<Group> {
        let mut t = self.tables.write().await;
        if t.groups.values().any(|g| {
            g.id != group.id && g.name == group.name && g.location == group.location
        }) {
            return Err(RepositoryError::Duplicate(format!(
                "group {} in {} already exists",
                group.name, group.location
            )));
        }
        let stored = t
            .groups
            .get_mut(&group.id)
            .ok_or_else(|| RepositoryError::NotFound("Group not found".to_string()))?;
        stored.name = group.name.clone();
        stored.location = group.location.clone();
        stored.description = group.description.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        if t.groups.remove(&id).is_none() {
            return Ok(false);
        }
        t.members.retain(|(group_id, _), _| *group_id != id);
        t.comments.retain(|_, c| c.group_id != id);
        let event_ids: Vec<Uuid> = t
            .events
            .values()
            .filter(|e| e.group_id == id)
            .map(|e| e.id)
            .collect();
        for event_id in event_ids {
            t.remove_event_cascade(event_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn add(&self, member: &Member) -> RepoResult<Member> {
        let mut t = self.tables.write().await;
        t.require_group(member.group_id)?;
        t.require_user(member.user_id)?;
        let key = (member.group_id, member.user_id);
        if t.members.contains_key(&key) {
            return Err(RepositoryError::Duplicate("already a member".to_string()));
        }
        t.members.insert(key, member.clone());
        Ok(member.clone())
    }

    async fn remove(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        Ok(t.members.remove(&(group_id, user_id)).is_some())
    }

    async fn find(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<Option<Member>> {
        Ok(self.tables.read().await.members.get(&(group_id, user_id)).cloned())
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Member>> {
        let t = self.tables.read().await;
        let mut members: Vec<Member> = t
            .members
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, event: &Event) -> RepoResult<Event> {
        let mut t = self.tables.write().await;
        t.require_group(event.group_id)?;
        t.events.insert(event.id, event.clone());
        Ok(event.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Event>> {
        let t = self.tables.read().await;
        let mut events: Vec<Event> = t
            .events
            .values()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.time);
        Ok(events)
    }

    async fn update(&self, event: &Event) -> RepoResult<Event> {
        let mut t = self.tables.write().await;
        let stored = t
            .events
            .get_mut(&event.id)
            .ok_or_else(|| RepositoryError::NotFound("Event not found".to_string()))?;
        stored.team1 = event.team1.clone();
        stored.team2 = event.team2.clone();
        stored.time = event.time;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        Ok(t.remove_event_cascade(id))
    }

    async fn finalize(&self, id: Uuid, result: Scoreline) -> RepoResult<(Event, Vec<Bet>)> {
        let mut t = self.tables.write().await;
        let event = t
            .events
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound("Event not found".to_string()))?;
        event.set_result(result);
        let event = event.clone();

        let mut bets: Vec<&mut Bet> = t.bets.values_mut().filter(|b| b.event_id == id).collect();
        bets.sort_by_key(|b| b.created_at);
        let scored =
            scoring::score_predictions(result, bets.iter().map(|b| (b.id, b.prediction())));
        for (bet, (_, points)) in bets.iter_mut().zip(scored) {
            bet.points = Some(points);
        }
        let bets = bets.into_iter().map(|b| b.clone()).collect();

        Ok((event, bets))
    }
}

#[async_trait]
impl BetRepository for MemoryStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        prediction: Scoreline,
    ) -> RepoResult<(Bet, bool)> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        if !t.events.contains_key(&event_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "event {} does not exist",
                event_id
            )));
        }

        if let Some(bet) = t
            .bets
            .values_mut()
            .find(|b| b.user_id == user_id && b.event_id == event_id)
        {
            bet.score1 = prediction.score1;
            bet.score2 = prediction.score2;
            bet.updated_at = Utc::now();
            return Ok((bet.clone(), false));
        }

        let bet = Bet::new(user_id, event_id, prediction);
        t.bets.insert(bet.id, bet.clone());
        Ok((bet, true))
    }

    async fn find_by_event(&self, event_id: Uuid) -> RepoResult<Vec<Bet>> {
        let t = self.tables.read().await;
        let mut bets: Vec<Bet> = t
            .bets
            .values()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect();
        bets.sort_by_key(|b| b.created_at);
        Ok(bets)
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Bet>> {
        let t = self.tables.read().await;
        let mut bets: Vec<Bet> = t
            .bets
            .values()
            .filter(|b| {
                t.events
                    .get(&b.event_id)
                    .map_or(false, |e| e.group_id == group_id)
            })
            .cloned()
            .collect();
        bets.sort_by_key(|b| b.created_at);
        Ok(bets)
    }

    async fn count_by_event(&self, event_id: Uuid) -> RepoResult<i64> {
        let t = self.tables.read().await;
        Ok(t.bets.values().filter(|b| b.event_id == event_id).count() as i64)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: &Comment) -> RepoResult<Comment> {
        let mut t = self.tables.write().await;
        t.require_group(comment.group_id)?;
        t.require_user(comment.user_id)?;
        t.comments.insert(comment.id, comment.clone());
        Ok(comment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Comment>> {
        let t = self.tables.read().await;
        let mut comments: Vec<Comment> = t
            .comments
            .values()
            .filter(|c| c.group_id == group_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        Ok(t.comments.remove(&id).is_some())
    }
}
