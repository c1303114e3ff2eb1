use crate::repository::{Member, MemberRepository, MemberUpdate, NewMember, SequenceRepository};
use crate::services::id_service::IdService;
use crate::services::CoreError;
use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollMemberRequest {
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub branch: Option<String>,
}

#[derive(Clone)]
pub struct MemberService<M: MemberRepository, S: SequenceRepository> {
    pub repo: Arc<M>,
    pub ids: IdService<S>,
}

impl<M: MemberRepository, S: SequenceRepository> MemberService<M, S> {
    pub fn new(repo: Arc<M>, ids: IdService<S>) -> Self {
        Self { repo, ids }
    }

    pub async fn enroll(&self, req: EnrollMemberRequest) -> Result<Member> {
        if req.full_name.trim().is_empty() {
            return Err(CoreError::invalid("member name must not be empty"));
        }

        let member_no = self.ids.next_member_no().await?;
        let new_member = NewMember {
            external_id: Uuid::new_v4(),
            member_no,
            full_name: req.full_name,
            phone: req.phone,
            address: req.address,
            branch: req.branch,
        };

        self.repo.insert_member(new_member).await
    }

    pub async fn get(&self, member_no: &str) -> Result<Member> {
        self.repo
            .find_by_member_no(member_no)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("member `{}` not found", member_no)))
    }

    pub async fn list(&self, branch: Option<&str>) -> Result<Vec<Member>> {
        self.repo.list_members(branch).await
    }

    pub async fn update(&self, member_no: &str, update: MemberUpdate) -> Result<Member> {
        self.repo
            .update_member(member_no, update)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("member `{}` not found", member_no)))
    }

    pub async fn deactivate(&self, member_no: &str) -> Result<()> {
        let changed = self.repo.set_active(member_no, false).await?;
        if !changed {
            return Err(CoreError::not_found(format!(
                "member `{}` not found",
                member_no
            )));
        }
        Ok(())
    }
}
