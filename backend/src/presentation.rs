//! Read models returned by the API.

use crate::models::{Bet, Comment, Event, Group, Member, User, UserProfile};
use crate::scoring;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Public profile fragment embedded in user summaries
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub image: Option<String>,
}

/// User as shown next to bets, members and comments
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub profile: ProfileSummary,
}

impl UserSummary {
    pub fn new(user: &User, profile: Option<&UserProfile>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            profile: ProfileSummary {
                image: profile.and_then(|p| p.image.clone()),
            },
        }
    }

    /// Placeholder for a user row that disappeared between queries
    fn unknown(id: Uuid) -> Self {
        Self {
            id,
            username: String::new(),
            profile: ProfileSummary { image: None },
        }
    }
}

/// Full user view with profile
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub user: UserSummary,
    pub admin: bool,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub user: UserSummary,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BetView {
    pub id: Uuid,
    pub user: UserSummary,
    pub score1: i32,
    pub score2: i32,
    pub points: Option<i32>,
}

/// Group with its events, members (with cumulative points) and comments
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub events: Vec<Event>,
    pub members: Vec<MemberView>,
    pub comments: Vec<CommentView>,
    /// Requester's own membership; both false for anonymous requests
    pub is_member: bool,
    pub is_admin: bool,
}

/// Event with the bets the requester may see
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub bets: Vec<BetView>,
    pub is_admin: bool,
    pub num_bets: i64,
}

/// Users resolved for one response, keyed by id
pub struct UserDirectory {
    users: HashMap<Uuid, UserSummary>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>, profiles: Vec<UserProfile>) -> Self {
        let profiles: HashMap<Uuid, UserProfile> =
            profiles.into_iter().map(|p| (p.user_id, p)).collect();
        let users = users
            .iter()
            .map(|u| (u.id, UserSummary::new(u, profiles.get(&u.id))))
            .collect();
        Self { users }
    }

    pub fn summary(&self, id: Uuid) -> UserSummary {
        self.users
            .get(&id)
            .cloned()
            .unwrap_or_else(|| UserSummary::unknown(id))
    }
}

/// Before kick-off only the requester's own bet is visible; afterwards, all bets.
pub fn visible_bets(event: &Event, bets: Vec<Bet>, requester: Uuid, now: DateTime<Utc>) -> Vec<Bet> {
    if event.has_started(now) {
        bets
    } else {
        bets.into_iter().filter(|b| b.user_id == requester).collect()
    }
}

/// Members with their point totals across `bets` (all bets of the group).
/// Highest total first, then by join time.
pub fn member_standings(
    members: &[Member],
    bets: &[Bet],
    directory: &UserDirectory,
) -> Vec<MemberView> {
    let totals = scoring::tally_points(
        members.iter().map(|m| m.user_id),
        bets.iter().map(|b| (b.user_id, b.points)),
    );

    let mut ranked: Vec<(&Member, i64)> = members
        .iter()
        .map(|m| (m, totals.get(&m.user_id).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|(a, pa), (b, pb)| pb.cmp(pa).then(a.joined_at.cmp(&b.joined_at)));

    ranked
        .into_iter()
        .map(|(m, points)| MemberView {
            user: directory.summary(m.user_id),
            admin: m.admin,
            points,
        })
        .collect()
}

pub fn bet_views(bets: Vec<Bet>, directory: &UserDirectory) -> Vec<BetView> {
    bets.into_iter()
        .map(|b| BetView {
            id: b.id,
            user: directory.summary(b.user_id),
            score1: b.score1,
            score2: b.score2,
            points: b.points,
        })
        .collect()
}

pub fn comment_views(comments: Vec<Comment>, directory: &UserDirectory) -> Vec<CommentView> {
    comments
        .into_iter()
        .map(|c| CommentView {
            id: c.id,
            user: directory.summary(c.user_id),
            description: c.description,
            created_at: c.created_at,
        })
        .collect()
}
