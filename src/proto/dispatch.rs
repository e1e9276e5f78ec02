//! Command parsing and the referee event loop (spec.md §6's command
//! table). Mirrors the teacher's dispatch-by-parsed-enum shape rather
//! than the original's string-keyed handler map
//! (`original_source/python-port/speedclue/playerproxy.py`).

use log::{debug, error};

use crate::agent::Agent;
use crate::cards::{self, CardId, Category};
use crate::error::{ProtocolError, Result};
use crate::kb::PlayerId;
use crate::proto::messager::Messager;

#[derive(Debug, Clone)]
enum Command {
    Reset {
        player_count: usize,
        self_id: usize,
        own_cards: Vec<CardId>,
    },
    Suggest,
    Suggestion {
        suggester: PlayerId,
        triple: [CardId; 3],
        disprover: Option<PlayerId>,
        revealed: Option<CardId>,
    },
    Disprove {
        suggester: PlayerId,
        triple: [CardId; 3],
    },
    Accuse,
    Accusation {
        accuser: PlayerId,
        triple: [CardId; 3],
        correct: bool,
    },
    Done,
}

fn parse_card(token: &str) -> Result<CardId> {
    cards::by_token(token).ok_or_else(|| ProtocolError::malformed(format!("unknown card token: {token}")))
}

fn parse_player(token: &str) -> Result<PlayerId> {
    token
        .parse::<u8>()
        .map(PlayerId)
        .map_err(|_| ProtocolError::malformed(format!("not a player id: {token}")))
}

fn parse_usize(token: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| ProtocolError::malformed(format!("not a number: {token}")))
}

/// Parses a (suspect, weapon, room) triple (spec.md §6's fixed ordering)
/// and rejects any token whose card isn't in the slot's category, so a
/// malformed wire triple fails here with `ProtocolError::Malformed`
/// instead of panicking later in `bitset::triple_to_index`.
fn parse_triple(tokens: &[&str]) -> Result<[CardId; 3]> {
    if tokens.len() != 3 {
        return Err(ProtocolError::malformed(format!(
            "expected 3 cards, got {}",
            tokens.len()
        )));
    }
    const SLOTS: [Category; 3] = [Category::Suspect, Category::Weapon, Category::Room];
    let mut triple = [CardId(0); 3];
    for (i, &slot) in SLOTS.iter().enumerate() {
        let card = parse_card(tokens[i])?;
        if cards::category(card) != slot {
            return Err(ProtocolError::malformed(format!(
                "{} is a {}, expected a {slot} in triple position {i}",
                tokens[i],
                cards::category(card)
            )));
        }
        triple[i] = card;
    }
    Ok(triple)
}

fn parse_command(line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (head, rest) = tokens
        .split_first()
        .ok_or_else(|| ProtocolError::malformed("empty message"))?;

    match *head {
        "reset" => {
            if rest.len() < 2 {
                return Err(ProtocolError::malformed("reset: missing arguments"));
            }
            let player_count = parse_usize(rest[0])?;
            let self_id = parse_usize(rest[1])?;
            let own_cards = rest[2..]
                .iter()
                .map(|t| parse_card(t))
                .collect::<Result<Vec<_>>>()?;
            Ok(Command::Reset {
                player_count,
                self_id,
                own_cards,
            })
        }
        "suggest" => Ok(Command::Suggest),
        "suggestion" => {
            if rest.len() < 5 {
                return Err(ProtocolError::malformed("suggestion: missing arguments"));
            }
            let suggester = parse_player(rest[0])?;
            let triple = parse_triple(&rest[1..4])?;
            let disprover = match rest[4] {
                "-" => None,
                token => Some(parse_player(token)?),
            };
            let revealed = rest.get(5).map(|t| parse_card(t)).transpose()?;
            Ok(Command::Suggestion {
                suggester,
                triple,
                disprover,
                revealed,
            })
        }
        "disprove" => {
            if rest.len() != 4 {
                return Err(ProtocolError::malformed("disprove: expected suggester + 3 cards"));
            }
            let suggester = parse_player(rest[0])?;
            let triple = parse_triple(&rest[1..4])?;
            Ok(Command::Disprove { suggester, triple })
        }
        "accuse" => Ok(Command::Accuse),
        "accusation" => {
            if rest.len() != 5 {
                return Err(ProtocolError::malformed("accusation: missing arguments"));
            }
            let accuser = parse_player(rest[0])?;
            let triple = parse_triple(&rest[1..4])?;
            let correct = match rest[4] {
                "+" => true,
                "-" => false,
                token => return Err(ProtocolError::malformed(format!("accusation result: {token}"))),
            };
            Ok(Command::Accusation {
                accuser,
                triple,
                correct,
            })
        }
        "done" => Ok(Command::Done),
        other => Err(ProtocolError::unknown_command(other)),
    }
}

fn format_triple(triple: [CardId; 3]) -> String {
    triple.map(cards::token).join(" ")
}

/// Drives one agent through messages from a [`Messager`] until `done` or
/// the connection closes. Returns once the game ends; any
/// [`ProtocolError`] is fatal and propagated to the caller (spec.md §7).
pub fn run(name: &str, agent: &mut dyn Agent, messager: &mut dyn Messager) -> Result<()> {
    messager.write_message(&format!("{name} alive"))?;

    loop {
        let Some(line) = messager.read_message()? else {
            debug!("connection closed by referee");
            return Ok(());
        };
        let command = parse_command(&line)?;
        debug!("<- {line}");

        let reply = match command {
            Command::Reset {
                player_count,
                self_id,
                own_cards,
            } => {
                agent.reset(player_count, self_id, &own_cards)?;
                "ok".to_string()
            }
            Command::Suggest => {
                let triple = agent.suggest();
                format!("suggest {}", format_triple(triple))
            }
            Command::Suggestion {
                suggester,
                triple,
                disprover,
                revealed,
            } => {
                agent.on_suggestion(suggester, triple, disprover, revealed)?;
                "ok".to_string()
            }
            Command::Disprove { suggester, triple } => {
                let shown = agent.disprove(suggester, triple)?;
                format!("show {}", cards::token(shown))
            }
            Command::Accuse => match agent.accuse() {
                Some(triple) => format!("accuse {}", format_triple(triple)),
                None => "-".to_string(),
            },
            Command::Accusation {
                accuser,
                triple,
                correct,
            } => {
                agent.on_accusation(accuser, triple, correct)?;
                "ok".to_string()
            }
            Command::Done => {
                let (suggested, fell_back) = agent.suggestion_stats();
                debug!("suggestion stats: {suggested} made, {fell_back} fell back to an unused triple");
                messager.write_message("dead")?;
                debug!("-> dead");
                return Ok(());
            }
        };

        debug!("-> {reply}");
        if let Err(e) = messager.write_message(&reply) {
            error!("failed to write reply: {e}");
            return Err(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::by_token;

    fn card(token: &str) -> CardId {
        by_token(token).unwrap()
    }

    #[test]
    fn parses_reset() {
        let cmd = parse_command("reset 3 0 Gr Ca Ba").unwrap();
        match cmd {
            Command::Reset {
                player_count,
                self_id,
                own_cards,
            } => {
                assert_eq!(player_count, 3);
                assert_eq!(self_id, 0);
                assert_eq!(own_cards, vec![card("Gr"), card("Ca"), card("Ba")]);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn parses_suggestion_with_no_disprover() {
        let cmd = parse_command("suggestion 1 Pe Pi Li -").unwrap();
        match cmd {
            Command::Suggestion {
                suggester,
                disprover,
                revealed,
                ..
            } => {
                assert_eq!(suggester, PlayerId(1));
                assert_eq!(disprover, None);
                assert_eq!(revealed, None);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn parses_suggestion_with_revealed_card() {
        let cmd = parse_command("suggestion 0 Mu Kn Ha 1 Mu").unwrap();
        match cmd {
            Command::Suggestion {
                disprover, revealed, ..
            } => {
                assert_eq!(disprover, Some(PlayerId(1)));
                assert_eq!(revealed, Some(card("Mu")));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_command_is_protocol_violation() {
        let err = parse_command("frobnicate").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ProtocolViolation);
    }

    #[test]
    fn empty_message_is_protocol_violation() {
        let err = parse_command("").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ProtocolViolation);
    }

    #[test]
    fn triple_with_cards_out_of_category_order_is_rejected() {
        // Two weapons where a weapon and a room are expected: every token
        // is individually a valid card, so only the slot check catches it.
        let err = parse_command("suggestion 1 Mu Ca Kn -").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ProtocolViolation);
    }
}
