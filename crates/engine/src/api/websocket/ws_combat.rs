use super::*;

use taberna_domain::{ChallengeId, CombatError, CombatId};
use taberna_protocol::CombatActionDto;

use crate::use_cases::combat::CombatServiceError;
use crate::use_cases::duel::ChallengeError;

pub(super) async fn handle_challenge_player(
    state: &WsState,
    player: PlayerId,
    target_id: Uuid,
) -> Option<ServerMessage> {
    let target = PlayerId::from_uuid(target_id);
    match state.app.use_cases.duel.challenge(player, target).await {
        Ok(_) => None,
        Err(e) => Some(challenge_error_reply(e)),
    }
}

pub(super) async fn handle_respond_to_challenge(
    state: &WsState,
    player: PlayerId,
    challenge_id: Uuid,
    accepted: bool,
) -> Option<ServerMessage> {
    let challenge_id = ChallengeId::from_uuid(challenge_id);
    match state
        .app
        .use_cases
        .duel
        .respond(player, challenge_id, accepted)
        .await
    {
        Ok(()) => None,
        Err(e) => Some(challenge_error_reply(e)),
    }
}

pub(super) async fn handle_combat_action(
    state: &WsState,
    player: PlayerId,
    combat_id: Uuid,
    action: CombatActionDto,
) -> Option<ServerMessage> {
    let combat_id = CombatId::from_uuid(combat_id);
    match state
        .app
        .use_cases
        .combat
        .submit_action(player, combat_id, action.to_domain())
        .await
    {
        Ok(()) => None,
        Err(e) => Some(combat_error_reply(e)),
    }
}

fn challenge_error_reply(e: ChallengeError) -> ServerMessage {
    let code = match e {
        ChallengeError::UnknownTarget => ErrorCode::UnknownTarget,
        ChallengeError::SelfChallenge => ErrorCode::SelfChallenge,
        ChallengeError::ChallengePending => ErrorCode::ChallengePending,
        ChallengeError::PlayerBusy => ErrorCode::PlayerBusy,
        ChallengeError::UnknownChallenge => ErrorCode::UnknownChallenge,
    };
    ServerMessage::error(code, e.to_string())
}

fn combat_error_reply(e: CombatServiceError) -> ServerMessage {
    let code = match e {
        CombatServiceError::UnknownCombat => ErrorCode::UnknownCombat,
        CombatServiceError::Combat(CombatError::NotYourTurn) => ErrorCode::NotYourTurn,
        CombatServiceError::Combat(CombatError::CombatNotActive) => ErrorCode::CombatNotActive,
    };
    ServerMessage::error(code, e.to_string())
}
