// Wire protocol DTOs and conversions for the public WebSocket messages.
//
// Every message is a JSON object discriminated by its `type` field; field
// names are camelCase. Conversions are stateless.

use crate::domain::{
    Collectible, HeldKeys, Npc, NpcMode, Player, PlayerInput, Projectile, WorldEvent, WorldSnapshot,
};
use crate::use_cases::{FireballRequest, JoinAck, PlayerCommand, ServerEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    UpdateInput(UpdateInputDto),
    ShootFireball(ShootFireballDto),
    Teleport(TeleportDto),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInputDto {
    #[serde(default)]
    pub keys: Option<HashMap<String, bool>>,
    #[serde(default)]
    pub mouse_x: Option<f32>,
    #[serde(default)]
    pub mouse_y: Option<f32>,
    #[serde(default)]
    pub direction: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShootFireballDto {
    pub x: f32,
    pub y: f32,
    pub direction: f32,
    #[serde(default)]
    pub size: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeleportDto {
    pub x: f32,
    pub y: f32,
}

/// A client message that parsed but carried unusable numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCommand(pub &'static str);

impl fmt::Display for InvalidCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "non-finite {}", self.0)
    }
}

fn finite(value: f32, field: &'static str) -> Result<f32, InvalidCommand> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidCommand(field))
    }
}

impl TryFrom<ClientMessage> for PlayerCommand {
    type Error = InvalidCommand;

    fn try_from(message: ClientMessage) -> Result<Self, Self::Error> {
        match message {
            ClientMessage::UpdateInput(dto) => {
                let keys = dto.keys.unwrap_or_default();
                let input = PlayerInput {
                    keys: HeldKeys::from_pressed(keys.iter().map(|(k, v)| (k.as_str(), *v))),
                    mouse_x: finite(dto.mouse_x.unwrap_or(0.0), "mouseX")?,
                    mouse_y: finite(dto.mouse_y.unwrap_or(0.0), "mouseY")?,
                };
                let direction = dto.direction.map(|d| finite(d, "direction")).transpose()?;
                Ok(PlayerCommand::UpdateInput { input, direction })
            }
            ClientMessage::ShootFireball(dto) => Ok(PlayerCommand::ShootFireball(FireballRequest {
                x: finite(dto.x, "x")?,
                y: finite(dto.y, "y")?,
                direction: finite(dto.direction, "direction")?,
                // A bad size falls back to the player's own fireball size.
                size: dto.size.filter(|s| s.is_finite()),
            })),
            ClientMessage::Teleport(dto) => Ok(PlayerCommand::Teleport {
                x: finite(dto.x, "x")?,
                y: finite(dto.y, "y")?,
            }),
        }
    }
}

/// Parses one text frame into a validated command.
pub fn parse_client_message(text: &str) -> Result<PlayerCommand, ParseError> {
    let message = serde_json::from_str::<ClientMessage>(text).map_err(ParseError::Json)?;
    PlayerCommand::try_from(message).map_err(ParseError::Invalid)
}

#[derive(Debug)]
pub enum ParseError {
    Json(serde_json::Error),
    Invalid(InvalidCommand),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Json(e) => write!(f, "malformed message: {e}"),
            ParseError::Invalid(e) => write!(f, "invalid message: {e}"),
        }
    }
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    // Sent once to a new connection.
    Init {
        player_id: String,
        #[serde(flatten)]
        world: SnapshotDto,
        world_width: f32,
        world_height: f32,
    },
    // Full view, every tick and on every join.
    GameUpdate(SnapshotDto),
    FireballShot {
        fireball: FireballDto,
    },
    PlayerTeleported {
        player_id: String,
        x: f32,
        y: f32,
    },
    CoinCollected {
        coin_id: String,
        player_id: String,
        new_coins: u32,
        new_level: u32,
    },
    PlayerLeft {
        player_id: String,
    },
}

impl From<&JoinAck> for ServerMessage {
    fn from(ack: &JoinAck) -> Self {
        ServerMessage::Init {
            player_id: ack.player_id.to_string(),
            world: SnapshotDto::from(&ack.snapshot),
            world_width: ack.world_width,
            world_height: ack.world_height,
        }
    }
}

impl From<&WorldEvent> for ServerMessage {
    fn from(event: &WorldEvent) -> Self {
        match event {
            WorldEvent::FireballShot(projectile) => ServerMessage::FireballShot {
                fireball: FireballDto::from(projectile),
            },
            WorldEvent::PlayerTeleported { player_id, x, y } => ServerMessage::PlayerTeleported {
                player_id: player_id.to_string(),
                x: *x,
                y: *y,
            },
            WorldEvent::CoinCollected {
                coin_id,
                player_id,
                coins,
                level,
            } => ServerMessage::CoinCollected {
                coin_id: coin_id.to_string(),
                player_id: player_id.to_string(),
                new_coins: *coins,
                new_level: *level,
            },
            WorldEvent::PlayerLeft { player_id } => ServerMessage::PlayerLeft {
                player_id: player_id.to_string(),
            },
        }
    }
}

impl From<&ServerEvent> for ServerMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::Snapshot(snapshot) => ServerMessage::GameUpdate(snapshot.into()),
            ServerEvent::Notice(event) => event.into(),
        }
    }
}

/// Snapshot body shared by `init` and `gameUpdate`.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub tick: u64,
    pub players: Vec<PlayerDto>,
    pub fireballs: Vec<FireballDto>,
    pub coins: Vec<CoinDto>,
    pub bots: Vec<BotDto>,
}

impl From<&WorldSnapshot> for SnapshotDto {
    fn from(snapshot: &WorldSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            players: snapshot.players.iter().map(PlayerDto::from).collect(),
            fireballs: snapshot.projectiles.iter().map(FireballDto::from).collect(),
            coins: snapshot.collectibles.iter().map(CoinDto::from).collect(),
            bots: snapshot.npcs.iter().map(BotDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub direction: f32,
    pub coins: u32,
    pub level: u32,
    pub coins_to_next_level: u32,
    pub fireball_size: f32,
    pub teleport_cooldown: u32,
    pub teleport_max_cooldown: u32,
    pub teleport_distance: f32,
    pub shoot_cooldown: u32,
    pub shoot_max_cooldown: u32,
    pub alive: bool,
    pub mouse_x: f32,
    pub mouse_y: f32,
}

impl From<&Player> for PlayerDto {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.to_string(),
            x: p.x,
            y: p.y,
            width: p.width,
            height: p.height,
            speed: p.speed,
            health: p.health,
            max_health: p.max_health,
            direction: p.direction,
            coins: p.coins,
            level: p.level,
            coins_to_next_level: p.coins_to_next_level,
            fireball_size: p.fireball_size,
            teleport_cooldown: p.teleport_cooldown,
            teleport_max_cooldown: p.teleport_max_cooldown,
            teleport_distance: p.teleport_distance,
            shoot_cooldown: p.shoot_cooldown,
            shoot_max_cooldown: p.shoot_max_cooldown,
            alive: p.alive,
            mouse_x: p.input.mouse_x,
            mouse_y: p.input.mouse_y,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireballDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub direction: f32,
    pub speed: f32,
    pub size: f32,
    pub lifetime: i32,
    pub is_player_fireball: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    pub damage: i32,
}

impl From<&Projectile> for FireballDto {
    fn from(p: &Projectile) -> Self {
        let owner = p.owner_player();
        Self {
            id: p.id.to_string(),
            x: p.x,
            y: p.y,
            direction: p.direction,
            speed: p.speed,
            size: p.size,
            lifetime: p.lifetime,
            is_player_fireball: owner.is_some(),
            player_id: owner.map(|id| id.to_string()),
            damage: p.damage,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub collected: bool,
    pub bob_offset: f32,
}

impl From<&Collectible> for CoinDto {
    fn from(c: &Collectible) -> Self {
        Self {
            id: c.id.to_string(),
            x: c.x,
            y: c.y,
            size: c.size,
            collected: c.collected,
            bob_offset: c.bob_offset,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub direction: f32,
    pub coins: u32,
    pub last_shot: u32,
    pub shoot_cooldown: u32,
    pub state: NpcModeDto,
    pub alive: bool,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NpcModeDto {
    Wander,
    Pursue,
}

impl From<NpcMode> for NpcModeDto {
    fn from(mode: NpcMode) -> Self {
        match mode {
            NpcMode::Wander => NpcModeDto::Wander,
            NpcMode::Pursue => NpcModeDto::Pursue,
        }
    }
}

impl From<&Npc> for BotDto {
    fn from(n: &Npc) -> Self {
        Self {
            id: n.id.to_string(),
            x: n.x,
            y: n.y,
            width: n.width,
            height: n.height,
            speed: n.speed,
            health: n.health,
            max_health: n.max_health,
            direction: n.direction,
            coins: n.coins,
            last_shot: n.attack_timer,
            shoot_cooldown: n.attack_cooldown,
            state: n.mode.into(),
            alive: n.alive,
            color: n.color,
        }
    }
}
