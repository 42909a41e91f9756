//! CLI commands
//!
//! Each command parses raw operator input, runs one engine operation and
//! returns the rendered reply.

use roster_core::{parse_batch, GameId, LinkedIdentity, Rank};
use roster_engine::{AddRequest, BanRequest, RankRequest, RemoveRequest, UnbanRequest, WarnRequest};

use crate::context::AppContext;
use crate::render;

fn game_id(raw: &str) -> Result<GameId, anyhow::Error> {
    Ok(GameId::new(raw)?)
}

fn linked(raw: Option<&str>) -> Result<Option<LinkedIdentity>, anyhow::Error> {
    Ok(raw.map(LinkedIdentity::new).transpose()?)
}

/// Add members; `ids` is whitespace-separated
pub async fn add(
    ctx: &AppContext,
    ids: &str,
    linked_identity: Option<&str>,
    day: Option<&str>,
    rank: Option<Rank>,
    note: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut req = AddRequest::new(parse_batch(ids)?);
    req.linked_identity = linked(linked_identity)?;
    req.day = day.map(str::to_string);
    req.rank = rank;
    req.note = note.map(str::to_string);

    let outcome = ctx.engine.add(&ctx.actor, req).await?;
    Ok(render::added(&outcome))
}

pub async fn remove(
    ctx: &AppContext,
    ids: &str,
    day: Option<&str>,
    note: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut req = RemoveRequest::new(parse_batch(ids)?);
    req.day = day.map(str::to_string);
    req.note = note.map(str::to_string);

    let outcome = ctx.engine.remove(&ctx.actor, req).await?;
    Ok(render::removed(&outcome))
}

pub async fn list(ctx: &AppContext) -> Result<String, anyhow::Error> {
    Ok(render::listing(&ctx.engine.list().await?))
}

pub async fn ban_check(ctx: &AppContext, raw_id: &str) -> Result<String, anyhow::Error> {
    let id = game_id(raw_id)?;
    let status = ctx.engine.ban_check(&id).await?;
    Ok(render::ban_status(id.as_str(), &status))
}

pub async fn list_bans(ctx: &AppContext) -> Result<String, anyhow::Error> {
    Ok(render::ban_list(&ctx.engine.list_bans().await?))
}

pub async fn warn(
    ctx: &AppContext,
    raw_id: &str,
    reason: &str,
    linked_identity: Option<&str>,
    evidence: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut req = WarnRequest::new(game_id(raw_id)?, reason);
    req.linked_identity = linked(linked_identity)?;
    req.evidence_ref = evidence.map(str::to_string);

    let outcome = ctx.engine.warn(&ctx.actor, req).await?;
    Ok(render::warned(&outcome))
}

pub async fn unwarn(ctx: &AppContext, raw_id: &str, index: usize) -> Result<String, anyhow::Error> {
    let outcome = ctx
        .engine
        .unwarn(&ctx.actor, &game_id(raw_id)?, index)
        .await?;
    Ok(render::unwarned(&outcome))
}

pub async fn warnlog(ctx: &AppContext, raw_id: &str) -> Result<String, anyhow::Error> {
    let log = ctx.engine.warnlog(&game_id(raw_id)?).await?;
    Ok(render::warnlog(&log))
}

pub async fn ban(
    ctx: &AppContext,
    raw_id: &str,
    reason: &str,
    linked_identity: Option<&str>,
    evidence: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut req = BanRequest::new(game_id(raw_id)?, reason);
    req.linked_identity = linked(linked_identity)?;
    req.evidence_ref = evidence.map(str::to_string);

    let outcome = ctx.engine.ban(&ctx.actor, req).await?;
    Ok(render::banned(&outcome))
}

pub async fn unban(
    ctx: &AppContext,
    raw_id: &str,
    reason: Option<&str>,
    linked_identity: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut req = UnbanRequest::new(game_id(raw_id)?);
    req.reason = reason.map(str::to_string);
    req.linked_identity = linked(linked_identity)?;

    let outcome = ctx.engine.unban(&ctx.actor, req).await?;
    Ok(render::unbanned(&outcome))
}

pub async fn promote(
    ctx: &AppContext,
    rank: Rank,
    raw_id: &str,
    linked_identity: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut req = RankRequest::new(game_id(raw_id)?, rank);
    req.linked_identity = linked(linked_identity)?;

    let outcome = ctx.engine.promote(&ctx.actor, req).await?;
    Ok(render::rank_changed("Promoted", &outcome))
}

pub async fn demote(
    ctx: &AppContext,
    rank: Rank,
    raw_id: &str,
    linked_identity: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut req = RankRequest::new(game_id(raw_id)?, rank);
    req.linked_identity = linked(linked_identity)?;

    let outcome = ctx.engine.demote(&ctx.actor, req).await?;
    Ok(render::rank_changed("Demoted", &outcome))
}
