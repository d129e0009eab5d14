use crate::error::{AppError, AppResult};
use crate::models::{Comment, Group, Member, User};
use crate::presentation::{self, CommentView, GroupDetail};
use crate::repositories::Repositories;
use crate::services::{load_directory, require_admin};
use tracing::info;
use uuid::Uuid;

/// Group fields to change; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Service for groups, their membership and comments
pub struct GroupService {
    repos: Repositories,
}

impl GroupService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create a group. The creator becomes its first member and admin.
    pub async fn create_group(
        &self,
        creator: &User,
        name: &str,
        location: &str,
        description: &str,
    ) -> AppResult<Group> {
        info!(
            "Creating group: name={}, location={}, creator={}",
            name, location, creator.id
        );

        let group = Group::new(
            name.trim().to_string(),
            location.trim().to_string(),
            description.to_string(),
        );
        group.validate().map_err(AppError::Validation)?;

        let founder = Member::new(group.id, creator.id, true);
        let group = self.repos.groups.create(&group, &founder).await?;

        info!("Group created: id={}", group.id);
        Ok(group)
    }

    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        Ok(self.repos.groups.list().await?)
    }

    async fn get_group(&self, group_id: Uuid) -> AppResult<Group> {
        self.repos
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))
    }

    /// Group with its events, members ranked by points, and comments newest first
    pub async fn group_detail(
        &self,
        group_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<GroupDetail> {
        let group = self.get_group(group_id).await?;
        let events = self.repos.events.find_by_group(group_id).await?;
        let members = self.repos.members.find_by_group(group_id).await?;
        let bets = self.repos.bets.find_by_group(group_id).await?;
        let comments = self.repos.comments.find_by_group(group_id).await?;

        let user_ids = members
            .iter()
            .map(|m| m.user_id)
            .chain(comments.iter().map(|c| c.user_id))
            .collect();
        let directory = load_directory(&self.repos, user_ids).await?;
        let membership = viewer.and_then(|id| members.iter().find(|m| m.user_id == id));

        Ok(GroupDetail {
            is_member: membership.is_some(),
            is_admin: membership.map(|m| m.admin).unwrap_or(false),
            group,
            events,
            members: presentation::member_standings(&members, &bets, &directory),
            comments: presentation::comment_views(comments, &directory),
        })
    }

    pub async fn update_group(
        &self,
        requester: &User,
        group_id: Uuid,
        update: GroupUpdate,
    ) -> AppResult<Group> {
        let mut group = self.get_group(group_id).await?;
        require_admin(&self.repos, group_id, requester.id).await?;

        if let Some(name) = update.name {
            group.name = name.trim().to_string();
        }
        if let Some(location) = update.location {
            group.location = location.trim().to_string();
        }
        if let Some(description) = update.description {
            group.description = description;
        }
        group.validate().map_err(AppError::Validation)?;

        let group = self.repos.groups.update(&group).await?;
        info!("Group updated: id={}", group.id);
        Ok(group)
    }

    /// Delete a group with its events, bets, members and comments
    pub async fn delete_group(&self, requester: &User, group_id: Uuid) -> AppResult<()> {
        self.get_group(group_id).await?;
        require_admin(&self.repos, group_id, requester.id).await?;

        if !self.repos.groups.delete(group_id).await? {
            return Err(AppError::NotFound(format!("Group {} not found", group_id)));
        }
        info!("Group deleted: id={}", group_id);
        Ok(())
    }

    /// Add `user_id` to a group. Users may add themselves; admins may add anyone.
    pub async fn join(&self, requester: &User, group_id: Uuid, user_id: Uuid) -> AppResult<Member> {
        self.get_group(group_id).await?;
        if user_id != requester.id {
            require_admin(&self.repos, group_id, requester.id).await?;
        }
        if self.repos.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        let member = self
            .repos
            .members
            .add(&Member::new(group_id, user_id, false))
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict("User is already a member of this group".to_string())
                }
                other => other,
            })?;

        info!("User {} joined group {}", user_id, group_id);
        Ok(member)
    }

    /// Remove `user_id` from a group. Users may leave; admins may remove anyone.
    pub async fn leave(&self, requester: &User, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.get_group(group_id).await?;
        if user_id != requester.id {
            require_admin(&self.repos, group_id, requester.id).await?;
        }

        if !self.repos.members.remove(group_id, user_id).await? {
            return Err(AppError::NotFound(
                "User is not a member of this group".to_string(),
            ));
        }

        info!("User {} left group {}", user_id, group_id);
        Ok(())
    }

    /// Post to a group's board. Members only.
    pub async fn post_comment(
        &self,
        author: &User,
        group_id: Uuid,
        description: &str,
    ) -> AppResult<CommentView> {
        self.get_group(group_id).await?;
        if self.repos.members.find(group_id, author.id).await?.is_none() {
            return Err(AppError::Forbidden(
                "Only group members can comment".to_string(),
            ));
        }

        let comment = Comment::new(group_id, author.id, description.trim().to_string());
        comment.validate().map_err(AppError::Validation)?;
        let comment = self.repos.comments.create(&comment).await?;

        let directory = load_directory(&self.repos, vec![author.id]).await?;
        let mut views = presentation::comment_views(vec![comment], &directory);
        views
            .pop()
            .ok_or_else(|| AppError::Message("comment was not stored".to_string()))
    }

    pub async fn delete_comment(&self, requester: &User, comment_id: Uuid) -> AppResult<()> {
        let comment = self
            .repos
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

        if comment.user_id != requester.id {
            return Err(AppError::Forbidden(
                "Only the author can delete a comment".to_string(),
            ));
        }

        self.repos.comments.delete(comment_id).await?;
        Ok(())
    }
}
